// ABOUTME: Total, panic-free extractors that pull scalar values out of XmlNode lists.
// ABOUTME: Absence is always an empty string (or None for images), never an error.

use crate::xml_tree::XmlNode;

/// Trimmed text of the first node, or `""` when the list is empty.
pub fn extract_text(nodes: &[XmlNode]) -> String {
    nodes
        .first()
        .map(|node| node.text.trim().to_string())
        .unwrap_or_default()
}

/// Trimmed value of `attr` on the first node, or `""`.
pub fn extract_attribute(nodes: &[XmlNode], attr: &str) -> String {
    nodes
        .first()
        .and_then(|node| node.attr(attr))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Media URL from the first `<enclosure url="...">`. A bare `<link>` never counts.
pub fn extract_audio_url(enclosures: &[XmlNode]) -> String {
    extract_attribute(enclosures, "url")
}

/// Image URL from an image element: `href` attribute first (iTunes
/// convention), then a nested `<url>` text child (RSS `<image>`).
pub fn extract_image_url(nodes: &[XmlNode]) -> Option<String> {
    let href = extract_attribute(nodes, "href");
    if !href.is_empty() {
        return Some(href);
    }

    let nested = nodes
        .first()
        .map(|node| extract_text(node.get("url")))
        .unwrap_or_default();
    if nested.is_empty() {
        None
    } else {
        Some(nested)
    }
}

/// Categories of a channel: iTunes `text` attributes (sub-categories follow
/// their parent) then plain `<category>` text, in feed order. Empty values
/// are dropped; duplicates are kept.
pub fn extract_categories(channel: &XmlNode) -> Vec<String> {
    let mut categories = Vec::new();
    collect_itunes_categories(channel.get("itunes:category"), &mut categories);

    categories.extend(
        channel
            .get("category")
            .iter()
            .map(|node| node.text.trim().to_string())
            .filter(|name| !name.is_empty()),
    );

    categories
}

fn collect_itunes_categories(nodes: &[XmlNode], out: &mut Vec<String>) {
    for node in nodes {
        if let Some(name) = node.attr("text").map(str::trim) {
            if !name.is_empty() {
                out.push(name.to_string());
            }
        }
        collect_itunes_categories(node.get("itunes:category"), out);
    }
}

/// Returns the first non-empty candidate, or `""`.
pub fn first_non_empty<I>(candidates: I) -> String
where
    I: IntoIterator<Item = String>,
{
    candidates
        .into_iter()
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}
