// ABOUTME: HTML utility functions for feed descriptions.
// ABOUTME: Strips tag markup in one regex pass, then decodes the common named entities.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Entities decoded after tag removal, in replacement order.
const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&nbsp;", " "),
];

/// Strips HTML tags from a string and returns trimmed plain text.
///
/// Tags go first so that entities inside removed attributes never matter;
/// entities in text nodes are decoded afterwards.
pub fn strip_html(s: &str) -> String {
    let without_tags = TAG_RE.replace_all(s, "");
    decode_entities(&without_tags).trim().to_string()
}

/// Decodes `&amp; &lt; &gt; &quot; &#39; &nbsp;`.
pub fn decode_entities(s: &str) -> String {
    ENTITIES
        .iter()
        .fold(s.to_string(), |acc, (entity, replacement)| {
            acc.replace(entity, replacement)
        })
}
