// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Decoding for the HTML that Reddit escapes inside JSON.

use htmlentity::entity::{self, ICodedDataTrait};

/// Decodes the HTML entities Reddit uses to escape titles and rendered
/// comment bodies, trimming surrounding whitespace.
///
/// Text that cannot be decoded is returned trimmed but otherwise as is.
///
/// # Examples
///
/// ```
/// use snoogate::text::convert_html_entities;
/// let raw = " &lt;div class=\"md\"&gt;&lt;p&gt;R&amp;D&lt;/p&gt;&lt;/div&gt; ";
/// let converted = convert_html_entities(raw);
/// assert_eq!(converted, "<div class=\"md\"><p>R&D</p></div>");
/// ```
pub fn convert_html_entities(text: &str) -> String {
    let text = text.trim();
    entity::decode(text.as_bytes())
        .to_string()
        .unwrap_or_else(|_| text.to_string())
}
