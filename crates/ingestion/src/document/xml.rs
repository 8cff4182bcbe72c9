//! Owned XML element tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

use super::{read_text, DocumentError};
use crate::error::{IngestionError, Result};

/// One element with its attributes, trimmed text and children.
///
/// Names are local names: any namespace prefix is dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(e: &BytesStart<'_>) -> std::result::Result<Self, quick_xml::Error> {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    /// Elements matching a `/`-separated path of child names, relative to
    /// this element, in document order. `*` matches any child.
    pub fn find_all(&self, path: &str) -> Vec<&XmlElement> {
        let mut current: Vec<&XmlElement> = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|el| el.children.iter())
                .filter(|child| segment == "*" || child.name == segment)
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// First element matching `path`.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        self.find_all(path).into_iter().next()
    }

    /// Trimmed text content; `None` when empty.
    pub fn text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text of the first element matching `path`.
    pub fn child_text(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(XmlElement::text)
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn parse(text: &str) -> std::result::Result<Self, DocumentError> {
        let mut reader = Reader::from_str(text);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => stack.push(XmlElement::from_start(&e)?),
                Event::Empty(e) => {
                    let element = XmlElement::from_start(&e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DocumentError::Structure("unbalanced end tag".into()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(t) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(DocumentError::Structure(
                "document ended inside an open element".into(),
            ));
        }
        root.map(|root| Self { root })
            .ok_or_else(|| DocumentError::Structure("no root element".into()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        Self::parse(&text).map_err(|e| IngestionError::document(path, e))
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Paths are relative to the root element, as in ElementTree.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        self.root.find(path)
    }

    pub fn find_all(&self, path: &str) -> Vec<&XmlElement> {
        self.root.find_all(path)
    }

    pub fn child_text(&self, path: &str) -> Option<&str> {
        self.root.child_text(path)
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> std::result::Result<(), DocumentError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(DocumentError::Structure("multiple root elements".into()))
    }
}
