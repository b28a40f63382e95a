// ABOUTME: Generic XML tree built from raw feed text with quick-xml.
// ABOUTME: Each element keeps its text, attributes and children grouped by literal tag name.

use std::borrow::Cow;
use std::collections::HashMap;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::FeedError;

/// One XML element reduced to the shape the extractors consume.
///
/// Tags are keyed by their literal qualified name (`itunes:duration`,
/// `content:encoded`); no namespace resolution happens. Repeated tags keep
/// document order inside their `Vec`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub text: String,
    pub attributes: HashMap<String, String>,
    pub children: HashMap<String, Vec<XmlNode>>,
}

impl XmlNode {
    /// Node for an element that carried only plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Node for an element whose content was a CDATA section.
    ///
    /// CDATA is stored verbatim, so it is indistinguishable from plain text
    /// once parsed.
    pub fn cdata(content: impl Into<String>) -> Self {
        Self::text(content)
    }

    /// Node for an element with attributes and (possibly empty) text content.
    pub fn with_attributes<K, V>(
        text: impl Into<String>,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            text: text.into(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            children: HashMap::new(),
        }
    }

    /// Appends a child element, builder style.
    pub fn with_child(mut self, tag: impl Into<String>, child: XmlNode) -> Self {
        self.push_child(tag, child);
        self
    }

    /// Appends a child element under `tag`, after any existing siblings of that tag.
    pub fn push_child(&mut self, tag: impl Into<String>, child: XmlNode) {
        self.children.entry(tag.into()).or_default().push(child);
    }

    /// All children with the given tag, in document order. Empty when absent.
    pub fn get(&self, tag: &str) -> &[XmlNode] {
        self.children.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First child with the given tag.
    pub fn first(&self, tag: &str) -> Option<&XmlNode> {
        self.get(tag).first()
    }

    /// Attribute value by literal name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Parses raw XML into a synthetic document node whose children hold the root element.
///
/// Malformed input fails as a whole; there is no partial-tree recovery.
pub fn parse_xml(xml: &str) -> Result<XmlNode, FeedError> {
    let mut reader = Reader::from_str(xml);

    // (tag, node) for every element still open; index 0 is the document.
    let mut stack: Vec<(String, XmlNode)> = vec![(String::new(), XmlNode::default())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(open_element(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let (tag, node) = open_element(&e)?;
                attach(&mut stack, tag, node);
            }
            Ok(Event::End(_)) => {
                if stack.len() <= 1 {
                    return Err(FeedError::xml("closing tag without matching opening tag"));
                }
                if let Some((tag, node)) = stack.pop() {
                    attach(&mut stack, tag, node);
                }
            }
            Ok(Event::Text(e)) => {
                let raw = e.decode().map_err(FeedError::xml)?;
                let text = unescape(&raw)
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| raw.into_owned());
                append_text(&mut stack, &text);
            }
            Ok(Event::CData(e)) => {
                append_text(&mut stack, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) => {
                let resolved = match e.resolve_char_ref().map_err(FeedError::xml)? {
                    Some(ch) => ch.to_string(),
                    None => {
                        let name = e.decode().map_err(FeedError::xml)?;
                        match resolve_predefined_entity(&name) {
                            Some(value) => value.to_string(),
                            // HTML entities such as &nbsp; are left for strip_html.
                            None => format!("&{};", name),
                        }
                    }
                };
                append_text(&mut stack, &resolved);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FeedError::xml(format!(
                    "{} at position {}",
                    e,
                    reader.error_position()
                )))
            }
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack.last().map(|(tag, _)| tag.as_str()).unwrap_or_default();
        return Err(FeedError::xml(format!(
            "unexpected end of document: <{}> is not closed",
            open
        )));
    }

    Ok(stack.pop().map(|(_, doc)| doc).unwrap_or_default())
}

fn open_element(e: &BytesStart) -> Result<(String, XmlNode), FeedError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut node = XmlNode::default();

    for attr in e.attributes() {
        let attr = attr.map_err(FeedError::xml)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)
            .map(Cow::into_owned)
            .unwrap_or_else(|_| raw.to_string());
        node.attributes.insert(key, value);
    }

    Ok((tag, node))
}

fn attach(stack: &mut [(String, XmlNode)], tag: String, node: XmlNode) {
    if let Some((_, parent)) = stack.last_mut() {
        parent.push_child(tag, node);
    }
}

fn append_text(stack: &mut [(String, XmlNode)], text: &str) {
    if let Some((_, current)) = stack.last_mut() {
        current.text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_tags_keep_document_order() {
        let doc = parse_xml(
            "<rss><channel><category>A</category><category>B</category></channel></rss>",
        )
        .unwrap();
        let channel = doc.first("rss").and_then(|r| r.first("channel")).unwrap();
        let names: Vec<&str> = channel
            .get("category")
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn namespaced_tags_are_literal_keys() {
        let doc = parse_xml(
            r#"<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd"><itunes:duration>12:00</itunes:duration><itunes:image href="https://x/a.jpg"/></rss>"#,
        )
        .unwrap();
        let rss = doc.first("rss").unwrap();
        assert_eq!(rss.first("itunes:duration").unwrap().text, "12:00");
        assert_eq!(
            rss.first("itunes:image").unwrap().attr("href"),
            Some("https://x/a.jpg")
        );
        assert!(rss.first("duration").is_none());
    }

    #[test]
    fn cdata_matches_plain_text() {
        let plain = parse_xml("<d>&lt;p&gt;Hi &amp; bye&lt;/p&gt;</d>").unwrap();
        let cdata = parse_xml("<d><![CDATA[<p>Hi & bye</p>]]></d>").unwrap();
        assert_eq!(plain.first("d").unwrap().text, "<p>Hi & bye</p>");
        assert_eq!(plain, cdata);
    }

    #[test]
    fn char_refs_resolve_and_html_entities_survive() {
        let doc = parse_xml("<t>caf&#233; &#x26; bar&nbsp;baz</t>").unwrap();
        assert_eq!(doc.first("t").unwrap().text, "café & bar&nbsp;baz");
    }

    #[test]
    fn attribute_values_are_unescaped() {
        let doc = parse_xml(r#"<enclosure url="https://cdn/a.mp3?x=1&amp;y=2"/>"#).unwrap();
        assert_eq!(
            doc.first("enclosure").unwrap().attr("url"),
            Some("https://cdn/a.mp3?x=1&y=2")
        );
    }

    #[test]
    fn mismatched_tags_fail() {
        let err = parse_xml("<rss><channel></rss>").unwrap_err();
        assert!(matches!(err, FeedError::XmlSyntax(_)));
    }

    #[test]
    fn unclosed_document_fails() {
        let err = parse_xml("<rss><channel><title>x</title>").unwrap_err();
        assert!(matches!(err, FeedError::XmlSyntax(_)));
    }

    #[test]
    fn constructors_cover_encodings() {
        let plain = XmlNode::text("Show");
        let cdata = XmlNode::cdata("Show");
        let attrs = XmlNode::with_attributes("Show", [("href", "https://x")]);
        assert_eq!(plain, cdata);
        assert_eq!(attrs.text, "Show");
        assert_eq!(attrs.attr("href"), Some("https://x"));
    }
}
