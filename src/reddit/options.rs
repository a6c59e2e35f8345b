// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Options for listing requests.

use std::fmt;

/// Order in which a subreddit's posts are listed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Sort {
    /// Posts that are currently popular.
    #[default]
    Hot,

    /// Newest posts first.
    New,

    /// Highest scoring posts first.
    Top,

    /// Posts that are quickly gaining popularity.
    Rising,

    /// Posts with the most even mix of up- and downvotes.
    Controversial,
}

impl Sort {
    /// The sort as it appears in a listing path, e.g., `/r/rust/hot.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Hot => "hot",
            Sort::New => "new",
            Sort::Top => "top",
            Sort::Rising => "rising",
            Sort::Controversial => "controversial",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which a post's comments are listed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CommentSort {
    /// Reddit's "best" ordering.
    #[default]
    Confidence,

    /// Highest scoring comments first.
    Top,

    /// Newest comments first.
    New,

    /// Comments with the most even mix of up- and downvotes.
    Controversial,

    /// Oldest comments first.
    Old,

    /// Comments by the post's author, and what they replied to, first.
    Qa,
}

impl CommentSort {
    /// The sort as it appears in the `sort` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSort::Confidence => "confidence",
            CommentSort::Top => "top",
            CommentSort::New => "new",
            CommentSort::Controversial => "controversial",
            CommentSort::Old => "old",
            CommentSort::Qa => "qa",
        }
    }
}

impl fmt::Display for CommentSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of items Reddit returns when no limit is given.
pub const DEFAULT_LIMIT: u32 = 25;

/// Options for fetching a page of a subreddit listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingOptions {
    sort: Sort,
    limit: u32,
    after: String,
    before: String,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self::build().build()
    }
}

impl ListingOptions {
    /// Incrementally builds a new set of listing options.
    ///
    /// # Examples
    ///
    /// ```
    /// use snoogate::reddit::{ListingOptions, Sort};
    /// let opts = ListingOptions::build().sort(Sort::New).limit(10).build();
    /// assert_eq!(opts.sort(), Sort::New);
    /// ```
    pub fn build() -> ListingOptionsBuilder {
        ListingOptionsBuilder::default()
    }

    /// Listing order.
    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// Maximum number of items to return.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Return items after this full name.
    pub fn after(&self) -> &str {
        &self.after
    }

    /// Return items before this full name.
    pub fn before(&self) -> &str {
        &self.before
    }

    /// The options as query parameters. Empty cursors are left out.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.limit.to_string())];
        if !self.after.is_empty() {
            query.push(("after", self.after.clone()));
        }
        if !self.before.is_empty() {
            query.push(("before", self.before.clone()));
        }
        query
    }
}

/// A builder for listing options.
///
/// You probably don't want to use this directly; call [`ListingOptions::build()`]
/// and construct it incrementally instead.
#[derive(Debug)]
#[must_use]
pub struct ListingOptionsBuilder {
    sort: Sort,
    limit: u32,
    after: String,
    before: String,
}

impl Default for ListingOptionsBuilder {
    fn default() -> Self {
        Self {
            sort: Sort::default(),
            limit: DEFAULT_LIMIT,
            after: String::new(),
            before: String::new(),
        }
    }
}

impl ListingOptionsBuilder {
    /// Sets the listing order.
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the maximum number of items to return.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Fetches the page after the given cursor, usually [`Listing::after()`].
    ///
    /// [`Listing::after()`]: crate::thing::Listing::after
    pub fn after(mut self, after: impl Into<String>) -> Self {
        self.after = after.into();
        self
    }

    /// Fetches the page before the given cursor, usually [`Listing::before()`].
    ///
    /// [`Listing::before()`]: crate::thing::Listing::before
    pub fn before(mut self, before: impl Into<String>) -> Self {
        self.before = before.into();
        self
    }

    /// Builds the listing options.
    pub fn build(self) -> ListingOptions {
        ListingOptions {
            sort: self.sort,
            limit: self.limit,
            after: self.after,
            before: self.before,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn it_renders_sorts_for_paths() {
        let sorts: Vec<_> = [Sort::Hot, Sort::New, Sort::Top, Sort::Rising, Sort::Controversial]
            .iter()
            .map(Sort::to_string)
            .collect();
        assert_eq!(sorts, vec!["hot", "new", "top", "rising", "controversial"]);
    }

    #[test]
    fn it_uses_confidence_as_the_default_comment_sort() {
        assert_eq!(CommentSort::default().as_str(), "confidence");
    }

    #[test]
    fn it_uses_the_default_limit() {
        let opts = ListingOptions::default();
        assert_eq!(opts.sort(), Sort::Hot);
        assert_eq!(opts.query(), vec![("limit", String::from("25"))]);
    }

    #[test]
    fn it_includes_cursors_in_the_query() {
        let opts = ListingOptions::build()
            .limit(5)
            .after("t3_abc")
            .before("t3_xyz")
            .build();
        assert_eq!(
            opts.query(),
            vec![
                ("limit", String::from("5")),
                ("after", String::from("t3_abc")),
                ("before", String::from("t3_xyz")),
            ]
        );
    }
}
