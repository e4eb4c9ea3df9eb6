//! Streaming parser for Evernote exports (`.enex`).
//!
//! The export is read as a forward-only sequence of element start/end events.
//! Each event is dispatched by element name ([`TagKind`]) to update the note
//! being built; when a note closes it is handed to the registered
//! [`NoteListener`] and dropped, so only one note's elements are held in
//! memory at a time.

mod accumulator;
mod dispatch;
mod listener;
mod timestamp;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub use dispatch::{Action, TagKind};
pub use listener::{ListenerError, NoteListener};
pub use timestamp::{TIMESTAMP_FORMAT, parse_timestamp};

use accumulator::NoteAccumulator;

use crate::error::ParseError;
use crate::tree::{ElementEvent, ElementReader};

/// Counts reported after a successful parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Notes handed to the listener.
    pub notes: usize,
    /// Attachments across all of those notes.
    pub attachments: usize,
}

/// Parser for ENEX exports.
///
/// Holds no state between calls; each parse gets its own accumulator, so one
/// parser can be reused for any number of exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnexParser;

impl EnexParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse an export file.
    ///
    /// The file is closed when the parse returns, successfully or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or the
    /// listener fails. Notes delivered before the failure stay delivered.
    pub fn parse_file<L>(&self, path: &Path, listener: &mut L) -> Result<ParseSummary, ParseError>
    where
        L: NoteListener + ?Sized,
    {
        let file = File::open(path)?;
        tracing::info!(path = %path.display(), "Parsing export");
        self.parse_reader(BufReader::new(file), listener)
    }

    /// Parse an export held in memory.
    ///
    /// # Errors
    ///
    /// Same as [`parse_file`](Self::parse_file).
    pub fn parse_str<L>(&self, xml: &str, listener: &mut L) -> Result<ParseSummary, ParseError>
    where
        L: NoteListener + ?Sized,
    {
        self.parse_reader(xml.as_bytes(), listener)
    }

    /// Parse an export from any buffered source.
    ///
    /// # Errors
    ///
    /// Same as [`parse_file`](Self::parse_file).
    pub fn parse_reader<R, L>(&self, source: R, listener: &mut L) -> Result<ParseSummary, ParseError>
    where
        R: BufRead,
        L: NoteListener + ?Sized,
    {
        let mut reader = ElementReader::new(source);
        let mut acc = NoteAccumulator::default();
        let mut summary = ParseSummary::default();

        while let Some(event) = reader.next_event()? {
            match event {
                ElementEvent::Start => {
                    let Some(element) = reader.current() else {
                        continue;
                    };
                    let kind = TagKind::from_name(&element.tag);
                    tracing::trace!(tag = %element.tag, ?kind, "start");
                    kind.handle(Action::Start, element, &mut acc)?;
                }
                ElementEvent::End(element) => {
                    let kind = TagKind::from_name(&element.tag);
                    tracing::trace!(tag = %element.tag, ?kind, "end");

                    if let Some(note) = kind.handle(Action::End, &element, &mut acc)? {
                        summary.notes += 1;
                        summary.attachments += note.attachments.len();
                        tracing::debug!(
                            title = note.title.as_deref().unwrap_or_default(),
                            tags = note.tags.len(),
                            attachments = note.attachments.len(),
                            "Parsed note"
                        );
                        listener.add_note(note).map_err(ParseError::Listener)?;
                    }

                    // Keep elements only while their note is being built
                    if kind == TagKind::Note || reader.depth() <= 1 {
                        reader.discard(element);
                    } else {
                        reader.attach(element);
                    }
                }
            }
        }
        acc.finish()?;

        tracing::info!(
            notes = summary.notes,
            attachments = summary.attachments,
            "Export parsed"
        );
        Ok(summary)
    }
}
