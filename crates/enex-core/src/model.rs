//! Note and attachment records produced by the ENEX parser.

use chrono::{DateTime, Utc};

/// A single note from an export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    /// Note title.
    pub title: Option<String>,
    /// Creation time.
    pub created: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated: Option<DateTime<Utc>>,
    /// Tags in document order, duplicates kept.
    pub tags: Vec<String>,
    /// Raw ENML body, unrendered.
    pub content: Option<String>,
    /// Embedded attachments in document order.
    pub attachments: Vec<Attachment>,
}

impl Note {
    /// Timestamp identifying the note: creation time, else last update.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created.or(self.updated)
    }
}

/// A binary attachment (`<resource>`) embedded in a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    /// Base64 payload with all whitespace removed.
    pub data: Option<String>,
    /// MIME type, e.g. `image/png`.
    pub mime: Option<String>,
    /// Original filename.
    pub filename: Option<String>,
}

impl Attachment {
    /// Whether the attachment is an image that markdown can show inline.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime
            .as_deref()
            .is_some_and(|mime| mime.starts_with("image/"))
    }
}
