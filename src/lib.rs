// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! snoogate is a small client for Reddit's JSON API. It can log in, list a
//! subreddit's posts, fetch a post's comments, and vote, all while obeying
//! Reddit's request that clients wait at least two seconds between
//! requests.
//!
//! Every request made by a [`Client`](reddit::Client) passes through a
//! single [`RequestGate`](gate::RequestGate), so a client can be shared
//! freely between tasks without overrunning the rate limit.
//!
//! # Examples
//!
//! List the current hot posts in a subreddit:
//!
//! ```no_run
//! use snoogate::conf::Config;
//! use snoogate::reddit::{Client, Sort};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), snoogate::reddit::Error> {
//! let config = Config::build()
//!     .user_agent("linux:my-bot:v1.0 (by /u/someone)")
//!     .build()?;
//! let client = Client::new(config)?;
//! for post in client.list_subreddit("rust", Sort::Hot, 10).await? {
//!     println!("{} ({})", post.title(), post.score());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Walk a comment tree. Replies are decoded only when asked for:
//!
//! ```no_run
//! # use snoogate::reddit::{Client, CommentSort};
//! # #[tokio::main]
//! # async fn main() -> Result<(), snoogate::reddit::Error> {
//! # let client = Client::from_env()?;
//! let comments = client.get_comments("1aaaaa", CommentSort::Top, 25).await?;
//! for comment in &comments {
//!     println!("{}: {}", comment.author(), comment.body());
//!     for reply in comment.reply_comments()? {
//!         println!("  {}: {}", reply.author(), reply.body());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Log in and upvote a post:
//!
//! ```no_run
//! # use snoogate::reddit::{Client, Direction};
//! # #[tokio::main]
//! # async fn main() -> Result<(), snoogate::reddit::Error> {
//! # let client = Client::from_env()?;
//! client.login("reddit_user", "hunter2").await?;
//! client.vote("t3_1aaaaa", Direction::Up).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Reddit asks that every client identify itself with a unique, descriptive
//! user agent. See [`Config`](conf::Config) for this and the other settings,
//! which can also be read from `SNOOGATE_*` environment variables.
//!
//! # License
//!
//! snoogate is licensed under the terms of the [Apache License 2.0]. Please
//! see the LICENSE file accompanying this source code or visit the previous
//! link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0

pub mod clock;
pub mod conf;
pub mod gate;
pub mod http;
pub mod reddit;
pub mod text;
pub mod thing;

#[cfg(test)]
mod test_utils;
