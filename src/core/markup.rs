//! A small, forgiving element tree over quick-xml events.
//!
//! Package documents in the wild mix namespace prefixes, upper-case tag names
//! and HTML entities, so names are stored as lower-cased local names and
//! character data is decoded with HTML entity rules.

use crate::utils::error::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attrs: HashMap<String, String>,
    pub children: Vec<Node>,
}

fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    let local = name.rsplit(':').next().unwrap_or(&name);
    local.to_ascii_lowercase()
}

fn decode(raw: &[u8]) -> String {
    html_escape::decode_html_entities(&String::from_utf8_lossy(raw)).into_owned()
}

fn element_from(start: &BytesStart<'_>) -> Element {
    let attrs = start
        .attributes()
        .with_checks(false)
        .flatten()
        .map(|attr| (local_name(attr.key.as_ref()), decode(&attr.value)))
        .collect();

    Element {
        name: local_name(start.name().as_ref()),
        attrs,
        children: Vec::new(),
    }
}

/// Parse a document into a synthetic root element holding the top-level nodes.
pub fn parse_document(bytes: &[u8]) -> Result<Element> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut stack: Vec<Element> = vec![Element::default()];

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from(&start)),
            Event::Empty(start) => {
                let element = element_from(&start);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Element(element));
                }
            }
            Event::End(_) => {
                // stray end tags at the top level are ignored
                if stack.len() > 1 {
                    if let Some(element) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(Node::Element(element));
                        }
                    }
                }
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(decode(&text)));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(Node::Text(String::from_utf8_lossy(&data).into_owned()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // close anything left open by a truncated document
    while stack.len() > 1 {
        if let Some(element) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(Node::Element(element));
            }
        }
    }

    Ok(stack.pop().unwrap_or_default())
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First descendant with the given local name, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given local name, in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.name == name {
                found.push(child);
            }
            child.collect(name, found);
        }
    }

    /// Concatenated character data of the element and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.push_text(out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_lowercased_local_names() {
        let doc = parse_document(
            br#"<?xml version="1.0"?><package><metadata><dc:Title>Moby Dick</dc:Title></metadata></package>"#,
        )
        .unwrap();

        let title = doc.find("title").unwrap();
        assert_eq!(title.text(), "Moby Dick");
    }

    #[test]
    fn test_attributes_decode_html_entities() {
        let doc = parse_document(br#"<item href="a&amp;b.xhtml" Media-Type="text/x"/>"#).unwrap();

        let item = doc.find("item").unwrap();
        assert_eq!(item.attr("href"), Some("a&b.xhtml"));
        assert_eq!(item.attr("media-type"), Some("text/x"));
    }

    #[test]
    fn test_text_decodes_html_named_entities() {
        let doc = parse_document(b"<text>Fish&nbsp;&amp;&nbsp;Chips</text>").unwrap();
        assert_eq!(doc.find("text").unwrap().text(), "Fish\u{a0}&\u{a0}Chips");
    }

    #[test]
    fn test_find_all_is_document_order_and_recursive() {
        let doc = parse_document(
            br#"<navMap><navPoint id="a"><navPoint id="b"/></navPoint><navPoint id="c"/></navMap>"#,
        )
        .unwrap();

        let ids: Vec<_> = doc
            .find_all("navpoint")
            .iter()
            .filter_map(|p| p.attr("id"))
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_truncated_document_keeps_open_elements() {
        let doc = parse_document(b"<root><rootfile full-path=\"x.opf\"/><open>text").unwrap();

        assert_eq!(doc.find("rootfile").unwrap().attr("full-path"), Some("x.opf"));
        assert_eq!(doc.find("open").unwrap().text(), "text");
    }
}
