// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Reddit API clients and services for communicating with Reddit over HTTP.

pub mod auth;
pub mod client;
pub mod options;
pub mod service;

pub use client::{Client, Direction, Error};
pub use options::{CommentSort, ListingOptions, Sort};
