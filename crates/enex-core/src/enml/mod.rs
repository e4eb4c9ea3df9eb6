//! ENML (Evernote Markup Language) rendering.
//!
//! ENML is a restricted XHTML. Only links, `<div>` and `<br>` carry meaning
//! for the markdown output; every other element contributes its text.

mod entities;
mod parser;
mod renderer;

pub use parser::{ENML_ROOT, EnmlParser};
pub use renderer::{EnmlRenderer, render};
