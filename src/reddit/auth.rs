// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Logging in to Reddit.

use crate::thing;
use serde::Deserialize;
use serde_json::Value;

/// Message used when Reddit refuses a login without saying why.
pub const UNKNOWN_LOGIN_ERROR: &str = "unknown";

/// An authenticated session.
///
/// The modhash must accompany every request that changes state on Reddit,
/// such as voting. The session cookie itself lives in the HTTP client's
/// cookie store; the copy kept here is informational.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    modhash: String,
    cookie: String,
}

impl Session {
    /// Creates a session from the credentials returned by a login.
    pub fn new(modhash: impl Into<String>, cookie: impl Into<String>) -> Self {
        let modhash = modhash.into();
        let cookie = cookie.into();
        Self { modhash, cookie }
    }

    /// The session's modhash.
    pub fn modhash(&self) -> &str {
        &self.modhash
    }

    /// The session cookie Reddit reported when logging in.
    pub fn cookie(&self) -> &str {
        &self.cookie
    }
}

/// A response from `/api/login`.
///
/// A successful login looks like
///
/// ```json
/// {"json": {"errors": [], "data": {"modhash": "...", "cookie": "..."}}}
/// ```
///
/// while a failed login carries an empty `data` object and a list of
/// errors, each of which is a list like `["WRONG_PASSWORD", "invalid password", "passwd"]`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    json: LoginBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginBody {
    errors: Vec<Vec<Value>>,
    data: LoginData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginData {
    modhash: Option<String>,
    cookie: Option<String>,
}

impl LoginResponse {
    /// Parses a text response from the login endpoint.
    pub fn parse(data: &str) -> thing::Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Errors reported by Reddit, each rendered as a single line.
    pub fn errors(&self) -> impl Iterator<Item = String> {
        self.json.errors.iter().map(|error| describe(error))
    }

    /// Converts the response into a session.
    ///
    /// A response carrying a modhash is a success, regardless of any errors
    /// that come with it. Otherwise the first error Reddit reported is
    /// returned, or [`UNKNOWN_LOGIN_ERROR`] if it reported none.
    pub fn into_session(self) -> Result<Session, String> {
        let LoginBody { errors, data } = self.json;
        match data.modhash.filter(|modhash| !modhash.is_empty()) {
            Some(modhash) => Ok(Session::new(modhash, data.cookie.unwrap_or_default())),
            None => Err(errors
                .first()
                .map(|error| describe(error))
                .unwrap_or_else(|| String::from(UNKNOWN_LOGIN_ERROR))),
        }
    }
}

fn describe(error: &[Value]) -> String {
    error
        .iter()
        .filter_map(|part| match part {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
