// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! A rate-limited client for the Reddit API.

use crate::conf::{self, Config};
use crate::gate::RequestGate;
use crate::http;
use crate::reddit::auth::{LoginResponse, Session};
use crate::reddit::options::{CommentSort, ListingOptions, Sort};
use crate::reddit::service::{Params, RedditService, Service};
use crate::thing::{self, Comment, Listing, Post};
use log::{debug, warn};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Body Reddit returns for a successful vote.
const VOTE_OK: &str = "{}";

/// A client for the Reddit API.
///
/// Every request passes through a [`RequestGate`], so requests from the
/// same client never overlap and are spaced at least
/// [`Config::min_interval()`] apart, even when the client is shared
/// between tasks.
#[derive(Debug)]
pub struct Client<S: Service = RedditService> {
    service: S,
    gate: RequestGate,
    session: RwLock<Option<Session>>,
}

impl Client {
    /// Creates a new client that talks to Reddit over HTTPS.
    ///
    /// Returns an [`enum@Error`] if the HTTP client cannot be initialized.
    pub fn new(config: Config) -> Result<Self, Error> {
        let service = RedditService::new(&config)?;
        Ok(Self::with_service(service, &config))
    }

    /// Creates a new client configured from the environment.
    ///
    /// See [`Config::from_env()`] for the variables that are consulted.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(Config::from_env()?)
    }
}

impl<S: Service> Client<S> {
    /// Creates a new client that sends requests through `service`.
    ///
    /// Only the throttling settings in `config` are used; the rest are
    /// the service's responsibility.
    pub fn with_service(service: S, config: &Config) -> Self {
        let gate = RequestGate::new(config.min_interval());
        let session = RwLock::new(None);
        Self {
            service,
            gate,
            session,
        }
    }

    /// The gate throttling this client's requests.
    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// The current session, if logged in.
    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True if a login has succeeded.
    pub fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    async fn get(&self, path: &str, params: Params<'_>) -> Result<String, Error> {
        let permit = self.gate.acquire().await;
        debug!("GET {path}");
        let body = self.service.get(path, params).await;
        permit.release();
        Ok(body?)
    }

    async fn post(&self, path: &str, params: Params<'_>) -> Result<String, Error> {
        let permit = self.gate.acquire().await;
        debug!("POST {path}");
        let body = self.service.post(path, params).await;
        permit.release();
        Ok(body?)
    }

    /// Logs in as `user`.
    ///
    /// On success, the session is stored and later authenticated requests,
    /// such as [votes](Client::vote), are allowed. A failed login leaves any
    /// existing session in place.
    pub async fn login(&self, user: &str, password: &str) -> Result<(), Error> {
        let params = [
            ("api_type", String::from("json")),
            ("user", user.to_string()),
            ("passwd", password.to_string()),
        ];
        let body = self.post("api/login", &params).await?;
        let response = LoginResponse::parse(&body)?;

        match response.into_session() {
            Ok(session) => {
                debug!("logged in as {user}");
                *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
                Ok(())
            }
            Err(message) => {
                warn!("login failed for {user}: {message}");
                Err(Error::Auth(message))
            }
        }
    }

    /// Retrieves one page of a subreddit listing, along with the cursors
    /// needed to fetch the adjacent pages.
    pub async fn subreddit(&self, name: &str, options: &ListingOptions) -> Result<Listing, Error> {
        let path = format!("r/{name}/{}.json", options.sort());
        let body = self.get(&path, &options.query()).await?;
        Ok(Listing::parse(&body)?)
    }

    /// Retrieves up to `limit` posts from the subreddit `name`.
    pub async fn list_subreddit(
        &self,
        name: &str,
        sort: Sort,
        limit: u32,
    ) -> Result<Vec<Post>, Error> {
        let options = ListingOptions::build().sort(sort).limit(limit).build();
        Ok(self.subreddit(name, &options).await?.into_posts())
    }

    /// Retrieves the top-level comments on a post.
    ///
    /// `post_id` may be either a bare ID or a full name (`t3_...`). Replies
    /// are not expanded; use [`Comment::replies()`] to descend into the tree.
    pub async fn get_comments(
        &self,
        post_id: &str,
        sort: CommentSort,
        limit: u32,
    ) -> Result<Vec<Comment>, Error> {
        let id = post_id.strip_prefix("t3_").unwrap_or(post_id);
        let path = format!("comments/{id}.json");
        let params = [("limit", limit.to_string()), ("sort", sort.to_string())];
        let body = self.get(&path, &params).await?;
        Ok(thing::parse_comments_envelope(&body)?.into_comments())
    }

    /// Votes on the post or comment with the full name `thing_id`.
    ///
    /// Requires a prior successful [login](Client::login); without one,
    /// no request is sent.
    pub async fn vote(&self, thing_id: &str, direction: Direction) -> Result<(), Error> {
        let modhash = self
            .session()
            .map(|session| session.modhash().to_string())
            .ok_or(Error::AuthRequired)?;

        let params = [
            ("id", thing_id.to_string()),
            ("dir", direction.to_string()),
            ("uh", modhash),
        ];
        let body = self.post("api/vote", &params).await?;

        if body.trim() == VOTE_OK {
            debug!("voted {direction} on {thing_id}");
            Ok(())
        } else {
            warn!("vote on {thing_id} failed: {body}");
            Err(Error::VoteFailed(body))
        }
    }
}

/// The direction of a vote.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// An upvote.
    Up,

    /// Withdraws an earlier vote.
    Clear,

    /// A downvote.
    Down,
}

impl Direction {
    /// The direction as Reddit expects it: 1, 0, or -1.
    pub fn value(&self) -> i8 {
        match self {
            Direction::Up => 1,
            Direction::Clear => 0,
            Direction::Down => -1,
        }
    }
}

impl TryFrom<i8> for Direction {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Direction::Up),
            0 => Ok(Direction::Clear),
            -1 => Ok(Direction::Down),
            _ => Err(Error::InvalidDirection(value)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A client error.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the underlying HTTP service.
    #[error("Transport error: {0}")]
    Transport(#[from] http::HTTPError),

    /// A response that could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] thing::Error),

    /// Reddit rejected a login.
    #[error("Login failed: {0}")]
    Auth(String),

    /// An authenticated request was attempted before logging in.
    #[error("Login required")]
    AuthRequired,

    /// Reddit did not accept a vote.
    #[error("Vote failed: {0}")]
    VoteFailed(String),

    /// A vote direction other than 1, 0, or -1.
    #[error("Invalid vote direction: {0}")]
    InvalidDirection(i8),

    /// The client was configured incorrectly.
    #[error("Configuration error: {0}")]
    Config(#[from] conf::Error),
}
