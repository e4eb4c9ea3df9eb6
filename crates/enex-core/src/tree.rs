//! Element tree and pull reader shared by the ENEX parser and the ENML renderer.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::XmlError;

/// Element in a parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementNode {
    /// Element tag name.
    pub tag: String,
    /// Direct text content (before the first child).
    pub text: String,
    /// Text after the closing tag, before the next sibling.
    pub tail: String,
    /// Element attributes.
    pub attrs: HashMap<String, String>,
    /// Child elements in document order.
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// Create a new node with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set tail content.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Add a single attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// All text inside this element, depth-first in document order.
    ///
    /// Includes the tails of descendants but not this element's own tail.
    #[must_use]
    pub fn descendant_text(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }

    /// Serialize the content of this element (text and children, with their
    /// tails) back to XML.
    ///
    /// Attributes are written in name order.
    #[must_use]
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        self.write_inner(&mut out);
        out
    }

    fn write_inner(&self, out: &mut String) {
        out.push_str(&partial_escape(self.text.as_str()));
        for child in &self.children {
            child.write_outer(out);
            out.push_str(&partial_escape(child.tail.as_str()));
        }
    }

    fn write_outer(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);

        let mut attrs: Vec<_> = self.attrs.iter().collect();
        attrs.sort_unstable();
        for (key, value) in attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }

        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        self.write_inner(out);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// Event produced by [`ElementReader`].
#[derive(Debug)]
pub enum ElementEvent {
    /// An element was opened; its tag and attributes are available through
    /// [`ElementReader::current`].
    Start,
    /// An element was closed. The node carries its text and attached children
    /// but not yet its tail.
    End(ElementNode),
}

/// Forward-only reader that turns XML into start/end element events.
///
/// Open elements are kept on a stack. After each [`ElementEvent::End`] the
/// caller decides whether the finished node is kept in its parent
/// ([`attach`](Self::attach)) or dropped ([`discard`](Self::discard)).
pub struct ElementReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    stack: Vec<ElementNode>,
    root: Option<ElementNode>,
    pending_end: bool,
    skip_tail: bool,
}

impl<'a> ElementReader<&'a [u8]> {
    /// Create a reader over an in-memory document.
    #[must_use]
    pub fn from_xml(xml: &'a str) -> Self {
        Self::new(xml.as_bytes())
    }
}

impl<R: BufRead> ElementReader<R> {
    /// Create a reader over a buffered source.
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
            stack: Vec::new(),
            root: None,
            pending_end: false,
            skip_tail: false,
        }
    }

    /// The innermost open element.
    #[must_use]
    pub fn current(&self) -> Option<&ElementNode> {
        self.stack.last()
    }

    /// Number of currently open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Read the next element event, or `None` at end of document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not well-formed, including input
    /// that ends while elements are still open.
    pub fn next_event(&mut self) -> Result<Option<ElementEvent>, XmlError> {
        if self.pending_end {
            self.pending_end = false;
            return Ok(self.stack.pop().map(ElementEvent::End));
        }

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => {
                    let node = start_node(&self.reader, &e)?;
                    self.stack.push(node);
                    self.skip_tail = false;
                    return Ok(Some(ElementEvent::Start));
                }
                Event::Empty(e) => {
                    let node = start_node(&self.reader, &e)?;
                    self.stack.push(node);
                    self.skip_tail = false;
                    self.pending_end = true;
                    return Ok(Some(ElementEvent::Start));
                }
                Event::End(_) => {
                    self.skip_tail = false;
                    if let Some(node) = self.stack.pop() {
                        return Ok(Some(ElementEvent::End(node)));
                    }
                }
                Event::Text(e) => {
                    let text = self.reader.decoder().decode(&e)?.into_owned();
                    append_text(&mut self.stack, self.skip_tail, &text);
                }
                Event::GeneralRef(e) => {
                    let entity = self.reader.decoder().decode(&e)?.into_owned();
                    let text = decode_entity(&entity);
                    append_text(&mut self.stack, self.skip_tail, &text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    append_text(&mut self.stack, self.skip_tail, &text);
                }
                Event::Eof => {
                    return match self.stack.last() {
                        Some(open) => Err(XmlError::UnclosedElement(open.tag.clone())),
                        None => Ok(None),
                    };
                }
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    /// Keep a finished node as the last child of its parent.
    ///
    /// A node closed at the top level becomes the document root.
    pub fn attach(&mut self, node: ElementNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root = Some(node),
        }
    }

    /// Drop a finished node together with the tail text that follows it.
    pub fn discard(&mut self, node: ElementNode) {
        drop(node);
        self.skip_tail = true;
    }

    /// Read the whole document, keeping every element.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not well-formed.
    pub fn read_tree(mut self) -> Result<Option<ElementNode>, XmlError> {
        while let Some(event) = self.next_event()? {
            if let ElementEvent::End(node) = event {
                self.attach(node);
            }
        }
        Ok(self.root)
    }
}

/// Append text to the open element's text or its last child's tail.
fn append_text(stack: &mut [ElementNode], skip_tail: bool, text: &str) {
    if skip_tail {
        return;
    }
    let Some(node) = stack.last_mut() else {
        // Whitespace around the document element
        return;
    };
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

fn start_node<R>(reader: &Reader<R>, e: &BytesStart) -> Result<ElementNode, XmlError> {
    let tag = decode_name(reader, e.name().as_ref());
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = decode_name(reader, attr.key.as_ref());
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            Cow::into_owned,
        );
        attrs.insert(key, value);
    }
    Ok(ElementNode {
        tag,
        attrs,
        ..Default::default()
    })
}

fn decode_name<R>(reader: &Reader<R>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        Cow::into_owned,
    )
}

/// Decode XML entity references to their character values.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        // Unknown entity, preserve as-is
        _ => format!("&{entity};"),
    }
}
