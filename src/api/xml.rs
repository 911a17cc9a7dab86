// Owned XML document tree for XML responses.
// CDATA sections are merged into element text rather than kept as separate nodes.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::error::{Result, VimeoError};

/// An XML element with its attributes, text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlElement {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a document and return its root element.
    pub fn parse(data: &str) -> Result<Self> {
        let mut reader = Reader::from_str(data);
        reader.config_mut().trim_text(true);

        // Open elements, innermost last
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Self::open(&start)?),
                Event::Empty(start) => {
                    let element = Self::open(&start)?;
                    Self::close(element, &mut stack, &mut root);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        Self::close(element, &mut stack, &mut root);
                    }
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        root.ok_or(VimeoError::EmptyXml)
    }

    fn open(start: &BytesStart) -> Result<Self> {
        let mut element = XmlElement {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Default::default()
        };

        for attribute in start.attributes() {
            let attribute = attribute?;
            element.attributes.push((
                String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
                attribute.unescape_value()?.into_owned(),
            ));
        }

        Ok(element)
    }

    fn close(element: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => {
                root.get_or_insert(element);
            }
        }
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All child elements with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text of the first child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|child| child.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEOS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<videos>
  <video id="1">
    <title><![CDATA[Cats & <Dogs>]]></title>
    <url>http://vimeo.com/1</url>
  </video>
  <video id="2">
    <title>Birds &amp; Bees</title>
    <url>http://vimeo.com/2</url>
    <tags/>
  </video>
</videos>"#;

    #[test]
    fn test_parse_tree() {
        let root = XmlElement::parse(VIDEOS).unwrap();
        assert_eq!(root.name, "videos");

        let videos: Vec<_> = root.children_named("video").collect();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].attr("id"), Some("1"));
        assert_eq!(videos[1].child_text("url"), Some("http://vimeo.com/2"));
        assert!(videos[1].child("tags").is_some());
    }

    #[test]
    fn test_cdata_is_plain_text() {
        let root = XmlElement::parse(VIDEOS).unwrap();
        let first = root.child("video").unwrap();

        assert_eq!(first.child_text("title"), Some("Cats & <Dogs>"));
        assert!(first.child("title").unwrap().children.is_empty());
    }

    #[test]
    fn test_entities_unescaped() {
        let root = XmlElement::parse(VIDEOS).unwrap();
        let second = root.children_named("video").nth(1).unwrap();
        assert_eq!(second.child_text("title"), Some("Birds & Bees"));
    }

    #[test]
    fn test_serializes_without_empty_fields() {
        let root = XmlElement::parse(r#"<user id="7"><name>Brad</name><bio/></user>"#).unwrap();

        let value = serde_json::to_value(&root).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "user",
                "attributes": [["id", "7"]],
                "children": [
                    { "name": "name", "text": "Brad" },
                    { "name": "bio" }
                ]
            })
        );
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(XmlElement::parse(""), Err(VimeoError::EmptyXml)));
    }

    #[test]
    fn test_malformed_document() {
        assert!(XmlElement::parse("<videos><video></videos>").is_err());
    }
}
