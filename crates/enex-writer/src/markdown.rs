//! Markdown layout of a converted note.

use enex_core::Note;

/// Display format for note timestamps.
const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Assemble the markdown document for a note.
///
/// Sections (header, body, attachment links) are separated by one blank
/// line; empty sections are left out.
pub(crate) fn compose(note: &Note, body: Option<&str>, links: &[String]) -> String {
    let mut sections = Vec::with_capacity(3);

    let header = header_lines(note);
    if !header.is_empty() {
        sections.push(header.join("\n"));
    }

    if let Some(body) = body.map(|b| b.trim_matches('\n')).filter(|b| !b.trim().is_empty()) {
        sections.push(body.to_owned());
    }

    if !links.is_empty() {
        sections.push(links.join("\n"));
    }

    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}

fn header_lines(note: &Note) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(title) = &note.title {
        lines.push(format!("# {title}"));
    }
    if let Some(created) = note.created {
        lines.push(format!("Created: {}", created.format(DISPLAY_TIME_FORMAT)));
    }
    if let Some(updated) = note.updated {
        lines.push(format!("Updated: {}", updated.format(DISPLAY_TIME_FORMAT)));
    }
    if !note.tags.is_empty() {
        lines.push(format!("Tags: {}", note.tags.join(", ")));
    }
    lines
}
