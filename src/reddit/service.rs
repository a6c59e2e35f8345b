// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! HTTPS connector for the Reddit API.
//!
//! Service structures in this module provide a low-level way to interact
//! with the Reddit API over HTTPS, essentially a specialized HTTPS client
//! specifically for Reddit. They know nothing about rate limits or
//! sessions; [`Client`](crate::reddit::Client) layers those on top.

use crate::conf::Config;
use crate::http::{HTTPError, HTTPResult};
use log::trace;
use reqwest::{ClientBuilder, Response, header};
use url::Url;

/// Query parameters for a request.
pub type Params<'a> = &'a [(&'a str, String)];

/// A service for sending requests to Reddit.
///
/// Using this trait, clients can implement different ways of connecting
/// to the Reddit API, such as an actual connector for production code,
/// and a mocked connector for testing purposes. Paths are relative to the
/// service's base URL, e.g., `r/rust/hot.json`.
pub trait Service {
    /// Performs a GET request and returns the raw body.
    fn get(&self, path: &str, params: Params<'_>)
    -> impl Future<Output = HTTPResult<String>> + Send;

    /// Performs a POST request and returns the raw body.
    ///
    /// Parameters are sent in the query string, as Reddit's legacy API
    /// expects.
    fn post(
        &self,
        path: &str,
        params: Params<'_>,
    ) -> impl Future<Output = HTTPResult<String>> + Send;
}

/// A service that contacts the Reddit API directly.
///
/// Cookies set by Reddit are kept for the lifetime of the service, so a
/// session established by logging in carries over to later requests.
#[derive(Debug)]
pub struct RedditService {
    client: reqwest::Client,
    base_url: Url,
}

impl RedditService {
    /// Creates a new Reddit service.
    ///
    /// Returns an error if the underlying HTTP client cannot be initialized.
    pub fn new(config: &Config) -> HTTPResult<Self> {
        let builder = ClientBuilder::new()
            .user_agent(config.user_agent())
            .cookie_store(true);
        let builder = match config.timeout() {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        let client = builder.build().map_err(HTTPError::Request)?;
        let base_url = config.base_url().clone();
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> HTTPResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn body(resp: Response) -> HTTPResult<String> {
        if !resp.status().is_success() {
            Err(HTTPError::Http(resp.status()))
        } else {
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .ok_or(HTTPError::MissingContentType)?
                .to_str()?;
            if !content_type.starts_with("application/json") {
                Err(HTTPError::UnexpectedContentType(content_type.to_string()))
            } else {
                resp.text().await.map_err(HTTPError::Body)
            }
        }
    }
}

impl Service for RedditService {
    async fn get(&self, path: &str, params: Params<'_>) -> HTTPResult<String> {
        let url = self.url(path)?;
        trace!("GET {url}");
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(HTTPError::Request)?;
        Self::body(resp).await
    }

    async fn post(&self, path: &str, params: Params<'_>) -> HTTPResult<String> {
        let url = self.url(path)?;
        trace!("POST {url}");
        let resp = self
            .client
            .post(url)
            .query(params)
            .send()
            .await
            .map_err(HTTPError::Request)?;
        Self::body(resp).await
    }
}
