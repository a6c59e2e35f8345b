// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Errors and results for communicating with APIs using HTTP.

use reqwest::header;
use std::{error, fmt};

/// The result of an HTTP request.
pub type HTTPResult<T> = Result<T, HTTPError>;

/// Indicates an error has occurred when making an HTTP call.
#[derive(Debug)]
pub enum HTTPError {
    /// An error retrieving the body of a response.
    Body(reqwest::Error),

    /// An error that occurred while making an HTTP request.
    Request(reqwest::Error),

    /// A request path that could not be joined to the service's base URL.
    Url(url::ParseError),

    /// An unsuccessful HTTP status code in an HTTP response.
    Http(reqwest::StatusCode),

    /// A missing Content-Type header in a response.
    MissingContentType,

    /// An invalid Content-Type header.
    InvalidContentType(header::ToStrError),

    /// A Content-Type that is not understood by the service.
    UnexpectedContentType(String),
}

impl From<reqwest::Error> for HTTPError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_body() || error.is_decode() {
            HTTPError::Body(error)
        } else {
            HTTPError::Request(error)
        }
    }
}

impl From<url::ParseError> for HTTPError {
    fn from(error: url::ParseError) -> Self {
        HTTPError::Url(error)
    }
}

impl From<header::ToStrError> for HTTPError {
    fn from(error: header::ToStrError) -> Self {
        HTTPError::InvalidContentType(error)
    }
}

impl fmt::Display for HTTPError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HTTPError::Body(err) => write!(f, "Error retrieving body of HTTP response: {err}"),
            HTTPError::Request(err) => write!(f, "Error while making HTTP request: {err}"),
            HTTPError::Url(err) => write!(f, "Invalid request URL: {err}"),
            HTTPError::Http(status) => write!(f, "Request returned HTTP {status}"),
            HTTPError::MissingContentType => write!(f, "Missing Content-Type header"),
            HTTPError::InvalidContentType(err) => {
                write!(f, "Invalid Content-Type header value: {err}")
            }
            HTTPError::UnexpectedContentType(content_type) => {
                write!(f, "Unexpected content type: {content_type}")
            }
        }
    }
}

impl error::Error for HTTPError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            HTTPError::Body(err) => Some(err),
            HTTPError::Request(err) => Some(err),
            HTTPError::Url(err) => Some(err),
            HTTPError::Http(_) => None,
            HTTPError::MissingContentType => None,
            HTTPError::InvalidContentType(err) => Some(err),
            HTTPError::UnexpectedContentType(_) => None,
        }
    }
}
