//! Output side of the ENEX converter.
//!
//! [`NoteWriter`] implements [`enex_core::NoteListener`]: every parsed note is
//! rendered to markdown and written either into a directory tree
//! (`{root}/{year}/{stamp}.md` plus extracted attachments) or to a single
//! stream.

mod attachment;
mod error;
mod markdown;
mod writer;

pub use error::WriteError;
pub use writer::{NoteWriter, WriterOptions};
