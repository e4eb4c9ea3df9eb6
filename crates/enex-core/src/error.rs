//! Error types for ENEX parsing and ENML rendering.

use crate::enex::ListenerError;

/// Low-level XML reading error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum XmlError {
    /// XML syntax error.
    #[error("XML parse error: {0}")]
    Syntax(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Encoding error during XML decoding.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Input ended while an element was still open.
    #[error("unexpected end of input, <{0}> is not closed")]
    UnclosedElement(String),
}

/// Error raised while parsing an ENEX export.
///
/// Every variant aborts the remaining traversal; notes already handed to the
/// listener stay delivered.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The export could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The export is not well-formed XML.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// A `created` or `updated` value is not `YYYYMMDDThhmmssZ`.
    #[error("malformed timestamp {value:?}, expected YYYYMMDDThhmmssZ")]
    MalformedTimestamp {
        /// The offending text.
        value: String,
    },

    /// An element appeared outside the record it belongs to.
    #[error("malformed nesting: <{element}> {reason}")]
    MalformedNesting {
        /// Element name whose event could not be applied.
        element: &'static str,
        /// What was missing or already open.
        reason: &'static str,
    },

    /// The listener rejected a finished note.
    #[error("note listener failed: {0}")]
    Listener(#[source] ListenerError),
}

/// Error raised while rendering an ENML body.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The body is not well-formed XML.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// The body's root element is not `<en-note>`.
    #[error("unexpected root element <{0}>, expected <en-note>")]
    UnexpectedRootElement(String),

    /// The body contains no element at all.
    #[error("ENML body contains no root element")]
    Empty,
}
