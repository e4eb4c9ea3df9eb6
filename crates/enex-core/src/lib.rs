//! Core of the ENEX to markdown converter.
//!
//! This crate provides the two halves of the conversion:
//! - [`EnexParser`]: streaming parser that turns an Evernote export (`.enex`)
//!   into [`Note`] records, handing each finished note to a [`NoteListener`]
//! - [`EnmlRenderer`]: renders a note's ENML body to normalized markdown
//!
//! # Example
//!
//! ```
//! use enex_core::{EnexParser, Note, render};
//!
//! let xml = r#"<en-export>
//!   <note>
//!     <title>Groceries</title>
//!     <content><![CDATA[<en-note><div>Milk</div></en-note>]]></content>
//!     <created>20130730T205204Z</created>
//!   </note>
//! </en-export>"#;
//!
//! let mut notes: Vec<Note> = Vec::new();
//! EnexParser::new().parse_str(xml, &mut notes)?;
//!
//! let body = render(notes[0].content.as_deref().unwrap_or_default())?;
//! assert_eq!(body, "\n\nMilk\n\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Element payload and pull reader shared by both parsers
mod tree;
pub use tree::{ElementEvent, ElementNode, ElementReader};

// Note and attachment records
mod model;
pub use model::{Attachment, Note};

// Streaming ENEX parser
pub mod enex;
pub use enex::{EnexParser, ListenerError, NoteListener, ParseSummary, parse_timestamp};

// ENML rendering
pub mod enml;
pub use enml::{EnmlParser, EnmlRenderer, render};

// Errors
pub mod error;
pub use error::{ParseError, RenderError, XmlError};
