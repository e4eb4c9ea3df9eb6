//! In-progress records built up while the parser walks an export.

use crate::error::ParseError;
use crate::model::{Attachment, Note};

/// The note being built and, inside it, the attachment being built.
///
/// Scoped to a single parse; every nesting violation fails fast with
/// [`ParseError::MalformedNesting`].
#[derive(Debug, Default)]
pub(crate) struct NoteAccumulator {
    note: Option<Note>,
    attachment: Option<Attachment>,
}

impl NoteAccumulator {
    pub(crate) fn begin_note(&mut self) -> Result<(), ParseError> {
        if self.note.is_some() {
            return Err(nesting("note", "opened while another note is open"));
        }
        self.note = Some(Note::default());
        Ok(())
    }

    pub(crate) fn finish_note(&mut self) -> Result<Note, ParseError> {
        if self.attachment.is_some() {
            return Err(nesting("note", "closed while a resource is still open"));
        }
        self.note
            .take()
            .ok_or_else(|| nesting("note", "closed without an open note"))
    }

    pub(crate) fn note_mut(&mut self, element: &'static str) -> Result<&mut Note, ParseError> {
        self.note
            .as_mut()
            .ok_or_else(|| nesting(element, "outside of a note"))
    }

    pub(crate) fn begin_attachment(&mut self) -> Result<(), ParseError> {
        self.note_mut("resource")?;
        if self.attachment.is_some() {
            return Err(nesting("resource", "opened while another resource is open"));
        }
        self.attachment = Some(Attachment::default());
        Ok(())
    }

    pub(crate) fn finish_attachment(&mut self) -> Result<(), ParseError> {
        let attachment = self
            .attachment
            .take()
            .ok_or_else(|| nesting("resource", "closed without an open resource"))?;
        self.note_mut("resource")?.attachments.push(attachment);
        Ok(())
    }

    pub(crate) fn attachment_mut(
        &mut self,
        element: &'static str,
    ) -> Result<&mut Attachment, ParseError> {
        self.attachment
            .as_mut()
            .ok_or_else(|| nesting(element, "outside of a resource"))
    }

    /// Check that nothing is left open once the input is exhausted.
    pub(crate) fn finish(&self) -> Result<(), ParseError> {
        if self.note.is_some() {
            return Err(nesting("note", "not closed before end of input"));
        }
        Ok(())
    }
}

fn nesting(element: &'static str, reason: &'static str) -> ParseError {
    ParseError::MalformedNesting { element, reason }
}
