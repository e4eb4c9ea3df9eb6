//! Error types for note output.

/// Error while writing a note or its attachments.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The note cannot be placed without a timestamp.
    #[error("note {title:?} has neither a created nor an updated timestamp")]
    MissingTimestamp {
        /// Title of the note, empty if it has none.
        title: String,
    },

    /// An attachment payload is not valid base64.
    #[error("invalid base64 data in attachment {name}")]
    Base64 {
        /// Output name of the attachment.
        name: String,
        /// Decoding error.
        #[source]
        source: base64::DecodeError,
    },
}
