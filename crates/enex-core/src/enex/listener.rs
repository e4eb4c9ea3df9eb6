//! Hand-off point between the parser and whatever consumes notes.

use crate::model::Note;

/// Error returned by a [`NoteListener`].
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives notes from [`EnexParser`](super::EnexParser) as they complete.
///
/// Decouples parsing from conversion so the parser can be tested without
/// writing anything.
pub trait NoteListener {
    /// Called once per finished note, in document order, after all of the
    /// note's fields and attachments are populated.
    ///
    /// Returning an error aborts the parse.
    fn add_note(&mut self, note: Note) -> Result<(), ListenerError>;
}

/// Collects notes in memory.
impl NoteListener for Vec<Note> {
    fn add_note(&mut self, note: Note) -> Result<(), ListenerError> {
        self.push(note);
        Ok(())
    }
}
