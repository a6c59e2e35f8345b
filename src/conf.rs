// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Environment and configuration utilities.

use crate::gate;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Where requests are sent unless configured otherwise.
pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

/// Overrides the user agent.
pub const USER_AGENT_VAR: &str = "SNOOGATE_USER_AGENT";

/// Overrides the base URL.
pub const BASE_URL_VAR: &str = "SNOOGATE_BASE_URL";

/// Overrides the minimum interval between requests, in milliseconds.
pub const INTERVAL_VAR: &str = "SNOOGATE_INTERVAL_MS";

/// Sets a transport timeout, in milliseconds.
pub const TIMEOUT_VAR: &str = "SNOOGATE_TIMEOUT_MS";

/// An appropriate user agent to use when making HTTP requests.
pub fn default_user_agent() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Client configuration.
#[derive(Clone, Debug)]
pub struct Config {
    user_agent: String,
    base_url: Url,
    min_interval: Duration,
    timeout: Option<Duration>,
}

impl Config {
    /// Incrementally builds a new configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use snoogate::conf::Config;
    /// use std::time::Duration;
    ///
    /// let config = Config::build()
    ///     .user_agent("linux:my-bot:v1.0 (by /u/someone)")
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.base_url().as_str(), "https://www.reddit.com/");
    /// ```
    pub fn build() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Builds a configuration from the defaults, overridden by any
    /// `SNOOGATE_*` variables set in the environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::build().env()?.build()
    }

    /// The string identifying this client to Reddit.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Base URL against which request paths are resolved.
    ///
    /// Always ends in a slash.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The minimum delay between requests.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// How long a single request may take before it is abandoned, if
    /// limited at all.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for Config {
    fn default() -> Self {
        let base_url =
            Url::parse(&format!("{DEFAULT_BASE_URL}/")).expect("invalid default base URL");
        Self {
            user_agent: default_user_agent(),
            base_url,
            min_interval: gate::DEFAULT_INTERVAL,
            timeout: None,
        }
    }
}

/// A builder for client configuration.
///
/// You probably don't want to use this directly; call [`Config::build()`]
/// and construct it incrementally instead.
#[derive(Debug)]
#[must_use]
pub struct ConfigBuilder {
    user_agent: String,
    base_url: String,
    min_interval: Duration,
    timeout: Option<Duration>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            base_url: String::from(DEFAULT_BASE_URL),
            min_interval: gate::DEFAULT_INTERVAL,
            timeout: None,
        }
    }
}

impl ConfigBuilder {
    /// Sets the user agent. Reddit asks for something unique and descriptive.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the base URL, mostly useful for pointing the client at a test server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the minimum delay between requests.
    pub fn min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Abandons requests that take longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides settings with any `SNOOGATE_*` variables set in the
    /// environment.
    ///
    /// Returns an error if a variable is set but cannot be understood.
    pub fn env(mut self) -> Result<Self, Error> {
        if let Some(user_agent) = var(USER_AGENT_VAR)? {
            self.user_agent = user_agent;
        }
        if let Some(base_url) = var(BASE_URL_VAR)? {
            self.base_url = base_url;
        }
        if let Some(ms) = var(INTERVAL_VAR)? {
            self.min_interval = millis(INTERVAL_VAR, &ms)?;
        }
        if let Some(ms) = var(TIMEOUT_VAR)? {
            self.timeout = Some(millis(TIMEOUT_VAR, &ms)?);
        }
        Ok(self)
    }

    /// Validates the settings and returns the finished configuration.
    pub fn build(self) -> Result<Config, Error> {
        let user_agent = self.user_agent.trim();
        if user_agent.is_empty() {
            return Err(Error::EmptyUserAgent);
        }

        // Url::join() drops the last path segment unless it ends in a slash.
        let base_url = if self.base_url.ends_with('/') {
            self.base_url
        } else {
            format!("{}/", self.base_url)
        };
        let base_url =
            Url::parse(&base_url).map_err(|err| Error::InvalidBaseUrl(base_url.clone(), err))?;

        Ok(Config {
            user_agent: user_agent.to_string(),
            base_url,
            min_interval: self.min_interval,
            timeout: self.timeout,
        })
    }
}

fn var(name: &'static str) -> Result<Option<String>, Error> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::Env(name, err)),
    }
}

fn millis(name: &'static str, value: &str) -> Result<Duration, Error> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| Error::InvalidValue(name, value.to_string()))
}

/// Indicates an invalid configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// The user agent was empty or only whitespace.
    #[error("user agent must not be empty")]
    EmptyUserAgent,

    /// The base URL could not be parsed.
    #[error("invalid base URL {0:?}: {1}")]
    InvalidBaseUrl(String, url::ParseError),

    /// An environment variable could not be read.
    #[error("could not read ${0}: {1}")]
    Env(&'static str, env::VarError),

    /// An environment variable held a value that could not be understood.
    #[error("invalid value for ${0}: {1:?}")]
    InvalidValue(&'static str, String),
}
