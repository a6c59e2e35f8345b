// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! A "thing" in the Reddit sense.
//!
//! Historically in the Reddit API and its old source code, a "Thing" was
//! any element of the Reddit system: users, posts, comments, etc. Every
//! thing arrives wrapped in an envelope of the form `{"kind": ..., "data": ...}`,
//! where `kind` is a short discriminator such as `t1` (a comment) or `t3`
//! (a link or self post). Collections of things arrive as a [`Listing`],
//! which is itself an envelope with the kind `Listing`.
//!
//! Comment trees are decoded lazily. Only the top level of a listing is
//! parsed; each [`Comment`] keeps its `replies` field as raw JSON until
//! [`Comment::replies()`] is called. Reddit represents "no replies" with an
//! empty string rather than an empty listing, so the raw field may not even
//! be a listing at all.

use crate::clock::{self, DateTime, HasAge, Utc};
use crate::text::convert_html_entities;
use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;
use std::fmt;
use thiserror::Error;

/// Author name Reddit substitutes for comments whose author deleted them.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// The result of decoding a response.
pub type Result<T> = std::result::Result<T, Error>;

/// Indicates a response that could not be decoded.
#[derive(Debug, Error)]
pub enum Error {
    /// The response was not valid JSON, or did not have the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The comments endpoint returned something other than a post listing
    /// followed by a comment listing.
    #[error("expected a two-element comments envelope, found {0} elements")]
    Envelope(usize),
}

/// Discriminates between the types of things.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
pub enum Kind {
    /// A collection of things.
    Listing,

    /// A comment.
    #[serde(rename = "t1")]
    Comment,

    /// A user account.
    #[serde(rename = "t2")]
    Account,

    /// A link or self post.
    #[serde(rename = "t3")]
    Link,

    /// A private message.
    #[serde(rename = "t4")]
    Message,

    /// A subreddit.
    #[serde(rename = "t5")]
    Subreddit,

    /// An award.
    #[serde(rename = "t6")]
    Award,

    /// A placeholder for comments that were not included in a response.
    #[serde(rename = "more")]
    More,
}

impl Kind {
    /// The discriminator as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Listing => "Listing",
            Kind::Comment => "t1",
            Kind::Account => "t2",
            Kind::Link => "t3",
            Kind::Message => "t4",
            Kind::Subreddit => "t5",
            Kind::Award => "t6",
            Kind::More => "more",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A paginated collection of things.
///
/// Pagination cursors are always present: when there is no further page
/// in a given direction, the cursor is an empty string.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "ListingEnvelope")]
pub struct Listing {
    kind: Kind,
    modhash: String,
    before: String,
    after: String,
    children: Vec<Thing>,
}

#[derive(Deserialize)]
struct ListingEnvelope {
    kind: Kind,
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default, deserialize_with = "empty_if_null")]
    modhash: String,
    children: Vec<Thing>,
    #[serde(default, deserialize_with = "empty_if_null")]
    after: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    before: String,
}

impl TryFrom<ListingEnvelope> for Listing {
    type Error = String;

    fn try_from(envelope: ListingEnvelope) -> std::result::Result<Self, Self::Error> {
        if envelope.kind != Kind::Listing {
            return Err(format!("expected a Listing, found {}", envelope.kind));
        }
        let ListingData {
            modhash,
            children,
            after,
            before,
        } = envelope.data;
        Ok(Self {
            kind: envelope.kind,
            modhash,
            before,
            after,
            children,
        })
    }
}

fn empty_if_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Listing {
    /// Parses a text response from the Reddit API into a listing.
    pub fn parse(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// The kind of the envelope, which is always [`Kind::Listing`].
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The modhash sent along with the listing, if any.
    pub fn modhash(&self) -> &str {
        &self.modhash
    }

    /// Cursor for the previous page, or an empty string if this is the first page.
    pub fn before(&self) -> &str {
        &self.before
    }

    /// Cursor for the next page, or an empty string if this is the last page.
    pub fn after(&self) -> &str {
        &self.after
    }

    /// Number of things in the listing.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if the listing contains no things at all.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Things in the listing, in the order Reddit returned them.
    pub fn children(&self) -> impl Iterator<Item = &Thing> {
        self.children.iter()
    }

    /// Posts in the listing; other kinds of things are skipped.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.children.iter().filter_map(Thing::as_post)
    }

    /// Comments in the listing; other kinds of things are skipped.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.children.iter().filter_map(Thing::as_comment)
    }

    /// Consumes the listing and returns its posts.
    pub fn into_posts(self) -> Vec<Post> {
        self.children
            .into_iter()
            .filter_map(|thing| match thing {
                Thing::Post(post) => Some(post),
                _ => None,
            })
            .collect()
    }

    /// Consumes the listing and returns its comments.
    pub fn into_comments(self) -> Vec<Comment> {
        self.children
            .into_iter()
            .filter_map(|thing| match thing {
                Thing::Comment(comment) => Some(comment),
                _ => None,
            })
            .collect()
    }
}

impl IntoIterator for Listing {
    type Item = Thing;
    type IntoIter = std::vec::IntoIter<Thing>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.into_iter()
    }
}

/// A single entry in a listing.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "RawThing")]
pub enum Thing {
    /// A comment.
    Comment(Comment),

    /// A link or self post.
    Post(Post),

    /// A stub standing in for comments left out of the response.
    More(More),
}

// The payload stays as JSON text until the kind is known, so a comment's
// replies can be borrowed as raw JSON whichever key comes first.
#[derive(Deserialize)]
struct RawThing {
    kind: Kind,
    data: Box<RawValue>,
}

impl TryFrom<RawThing> for Thing {
    type Error = String;

    fn try_from(raw: RawThing) -> std::result::Result<Self, Self::Error> {
        let data = raw.data.get();
        let thing = match raw.kind {
            Kind::Comment => serde_json::from_str(data).map(Thing::Comment),
            Kind::Link => serde_json::from_str(data).map(Thing::Post),
            Kind::More => serde_json::from_str(data).map(Thing::More),
            kind => return Err(format!("unsupported kind {kind} in listing")),
        };
        thing.map_err(|err| format!("invalid {} data: {err}", raw.kind))
    }
}

impl Thing {
    /// The thing's kind discriminator.
    pub fn kind(&self) -> Kind {
        match self {
            Thing::Comment(_) => Kind::Comment,
            Thing::Post(_) => Kind::Link,
            Thing::More(_) => Kind::More,
        }
    }

    /// The thing's full name, e.g., `t3_15bfi0`.
    pub fn name(&self) -> &str {
        match self {
            Thing::Comment(comment) => comment.name(),
            Thing::Post(post) => post.name(),
            Thing::More(more) => more.name(),
        }
    }

    /// The thing as a post, if it is one.
    pub fn as_post(&self) -> Option<&Post> {
        match self {
            Thing::Post(post) => Some(post),
            _ => None,
        }
    }

    /// The thing as a comment, if it is one.
    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Thing::Comment(comment) => Some(comment),
            _ => None,
        }
    }
}

/// A Reddit post: either a link or a self (text) post.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Post {
    id: String,
    name: String,
    permalink: String,
    title: String,
    domain: String,
    url: String,
    subreddit: String,
    author: String,
    selftext: String,
    score: i64,
    ups: i64,
    downs: i64,
    likes: Option<bool>,
    created: f64,
    created_utc: f64,
    is_self: bool,
    over_18: bool,
    hidden: bool,
    num_comments: u64,
}

impl Post {
    /// The post's ID, e.g., `15bfi0`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The post's full name, e.g., `t3_15bfi0`, as used when voting.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path to the post's comments, relative to the Reddit site root.
    pub fn permalink(&self) -> &str {
        &self.permalink
    }

    /// The post's title, with HTML entities converted.
    pub fn title(&self) -> String {
        convert_html_entities(&self.title)
    }

    /// Domain the post links to, or `self.<subreddit>` for self posts.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// URL the post links to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Subreddit the post was submitted to.
    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// Username of the post's author.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Text of a self post, in Markdown. Empty for link posts.
    pub fn selftext(&self) -> &str {
        &self.selftext
    }

    /// Net score.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Number of upvotes.
    pub fn ups(&self) -> i64 {
        self.ups
    }

    /// Number of downvotes.
    pub fn downs(&self) -> i64 {
        self.downs
    }

    /// The logged-in user's vote: `Some(true)` for an upvote, `Some(false)`
    /// for a downvote, and `None` if they have not voted.
    pub fn likes(&self) -> Option<bool> {
        self.likes
    }

    /// Creation time, in seconds since the epoch, as reported by Reddit.
    pub fn created(&self) -> f64 {
        self.created
    }

    /// True for self (text) posts.
    pub fn is_self(&self) -> bool {
        self.is_self
    }

    /// True if the post is marked NSFW.
    pub fn is_over_18(&self) -> bool {
        self.over_18
    }

    /// True if the logged-in user has hidden the post.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Number of comments on the post.
    pub fn num_comments(&self) -> u64 {
        self.num_comments
    }
}

impl HasAge for Post {
    fn created_utc(&self) -> DateTime<Utc> {
        clock::from_timestamp(self.created_utc)
    }
}

/// A Reddit comment.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Comment {
    id: String,
    name: String,
    author: String,
    body: String,
    body_html: String,
    subreddit: String,
    link_id: String,
    parent_id: String,
    permalink: String,
    score: i64,
    ups: i64,
    downs: i64,
    likes: Option<bool>,
    created: f64,
    created_utc: f64,
    replies: Option<Box<RawValue>>,
}

impl Comment {
    /// The comment's ID, e.g., `c0b6xx0`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The comment's full name, e.g., `t1_c0b6xx0`, as used when voting.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Username of the comment's author.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// True if the comment's author has deleted it.
    pub fn is_deleted(&self) -> bool {
        self.author == DELETED_AUTHOR
    }

    /// The comment's body, in Markdown.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The comment's body rendered as HTML, with the entities Reddit uses
    /// to escape the markup converted back.
    pub fn body_html(&self) -> String {
        convert_html_entities(&self.body_html)
    }

    /// Subreddit the comment was posted in.
    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// Full name of the post the comment belongs to.
    pub fn link_id(&self) -> &str {
        &self.link_id
    }

    /// Full name of the comment's parent: either the post or another comment.
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Path to the comment, relative to the Reddit site root.
    pub fn permalink(&self) -> &str {
        &self.permalink
    }

    /// Net score.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Number of upvotes.
    pub fn ups(&self) -> i64 {
        self.ups
    }

    /// Number of downvotes.
    pub fn downs(&self) -> i64 {
        self.downs
    }

    /// The logged-in user's vote, if any.
    pub fn likes(&self) -> Option<bool> {
        self.likes
    }

    /// Creation time, in seconds since the epoch, as reported by Reddit.
    pub fn created(&self) -> f64 {
        self.created
    }

    /// Decodes the comment's replies.
    ///
    /// Reddit sends an empty string instead of a listing when a comment has
    /// no replies; that (along with `null`, `{}`, or a missing field) yields
    /// [`Replies::Empty`]. Anything else must be a listing.
    pub fn replies(&self) -> Result<Replies> {
        match &self.replies {
            Some(raw) if !is_no_replies(raw.get()) => {
                Ok(Replies::Listing(Listing::parse(raw.get())?))
            }
            _ => Ok(Replies::Empty),
        }
    }

    /// Decodes the comment's direct replies into a list of comments.
    ///
    /// Returns an empty list if the comment has no replies.
    pub fn reply_comments(&self) -> Result<Vec<Comment>> {
        Ok(self.replies()?.into_comments())
    }
}

impl HasAge for Comment {
    fn created_utc(&self) -> DateTime<Utc> {
        clock::from_timestamp(self.created_utc)
    }
}

fn is_no_replies(raw: &str) -> bool {
    match raw.trim() {
        "\"\"" | "null" => true,
        raw => raw
            .strip_prefix('{')
            .and_then(|raw| raw.strip_suffix('}'))
            .is_some_and(|inner| inner.trim().is_empty()),
    }
}

/// The decoded replies to a comment.
#[derive(Clone, Debug)]
pub enum Replies {
    /// The comment has no replies.
    Empty,

    /// A listing of replies.
    Listing(Listing),
}

impl Replies {
    /// True if there are no replies.
    pub fn is_empty(&self) -> bool {
        match self {
            Replies::Empty => true,
            Replies::Listing(listing) => listing.is_empty(),
        }
    }

    /// Consumes the replies and returns the comments among them.
    pub fn into_comments(self) -> Vec<Comment> {
        match self {
            Replies::Empty => vec![],
            Replies::Listing(listing) => listing.into_comments(),
        }
    }
}

/// Comments that were left out of a response, usually because the thread
/// was too large or too deep.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct More {
    id: String,
    name: String,
    parent_id: String,
    count: u64,
    depth: u32,
    children: Vec<String>,
}

impl More {
    /// The stub's full name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full name of the comment (or post) the missing comments reply to.
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Total number of comments that were left out.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Depth of the missing comments in the tree.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// IDs of the missing comments.
    pub fn children(&self) -> &[String] {
        &self.children
    }
}

/// Decodes the comment listing from a response to the comments endpoint.
///
/// The endpoint returns a two-element array: a listing containing the post
/// itself, followed by a listing of its top-level comments. Only the
/// latter is decoded.
pub fn parse_comments_envelope(data: &str) -> Result<Listing> {
    let parts: Vec<&RawValue> = serde_json::from_str(data)?;
    match parts.as_slice() {
        [_post, comments] => Listing::parse(comments.get()),
        parts => Err(Error::Envelope(parts.len())),
    }
}

/// Flattens comment trees into a single list, depth first.
///
/// Comments by [deleted](DELETED_AUTHOR) authors are dropped, but their
/// replies are kept. Replies that cannot be decoded are skipped.
pub fn flatten_comments(comments: &[Comment]) -> Vec<Comment> {
    let mut flat = Vec::new();
    flatten_into(comments, &mut flat);
    flat
}

fn flatten_into(comments: &[Comment], flat: &mut Vec<Comment>) {
    for comment in comments {
        if !comment.is_deleted() {
            flat.push(comment.clone());
        }
        match comment.reply_comments() {
            Ok(replies) => flatten_into(&replies, flat),
            Err(err) => warn!("skipping undecodable replies to {}: {err}", comment.name()),
        }
    }
}
