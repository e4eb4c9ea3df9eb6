//! ENML body parser.

use super::entities::convert_html_entities;
use crate::error::RenderError;
use crate::tree::{ElementNode, ElementReader};

/// Root element of every ENML document.
pub const ENML_ROOT: &str = "en-note";

/// Parses ENML bodies into element trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnmlParser;

impl EnmlParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse an ENML body and return its `<en-note>` root.
    ///
    /// XML declaration lines are dropped first (exports can carry them in
    /// positions where they are not valid), every remaining line is trimmed,
    /// and HTML named entities are converted to characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not well-formed XML or its root is not
    /// `<en-note>`.
    pub fn parse(&self, enml: &str) -> Result<ElementNode, RenderError> {
        let cleaned = convert_html_entities(&strip_xml_declarations(enml));

        let root = ElementReader::from_xml(&cleaned)
            .read_tree()?
            .ok_or(RenderError::Empty)?;

        if root.tag != ENML_ROOT {
            return Err(RenderError::UnexpectedRootElement(root.tag));
        }
        Ok(root)
    }
}

/// Drop lines holding an XML declaration and trim the rest.
fn strip_xml_declarations(enml: &str) -> String {
    enml.lines()
        .filter(|line| !line.contains("<?xml "))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}
