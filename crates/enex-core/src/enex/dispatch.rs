//! Tag dispatch: what each recognized ENEX element does on start and end.

use super::accumulator::NoteAccumulator;
use super::timestamp::parse_timestamp;
use crate::error::ParseError;
use crate::model::Note;
use crate::tree::ElementNode;

/// Which side of an element an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Opening tag.
    Start,
    /// Closing tag, with the element's text and children available.
    End,
}

/// ENEX element kinds the parser understands.
///
/// Everything else maps to [`TagKind::Unknown`] and is ignored, so exports
/// carrying fields we do not model still parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Note,
    Created,
    Updated,
    Title,
    Tag,
    Content,
    Resource,
    Data,
    Mime,
    FileName,
    Unknown,
}

impl TagKind {
    /// Look up the kind for an element name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "note" => Self::Note,
            "created" => Self::Created,
            "updated" => Self::Updated,
            "title" => Self::Title,
            "tag" => Self::Tag,
            "content" => Self::Content,
            "resource" => Self::Resource,
            "data" => Self::Data,
            "mime" => Self::Mime,
            "file-name" => Self::FileName,
            _ => Self::Unknown,
        }
    }

    /// Apply an event for this kind to the accumulator.
    ///
    /// Returns the finished note when a `</note>` completes one.
    pub(crate) fn handle(
        self,
        action: Action,
        element: &ElementNode,
        acc: &mut NoteAccumulator,
    ) -> Result<Option<Note>, ParseError> {
        match (self, action) {
            (Self::Note, Action::Start) => acc.begin_note()?,
            (Self::Note, Action::End) => return acc.finish_note().map(Some),
            (Self::Created, Action::End) => {
                acc.note_mut("created")?.created = Some(parse_timestamp(&element.text)?);
            }
            (Self::Updated, Action::End) => {
                acc.note_mut("updated")?.updated = Some(parse_timestamp(&element.text)?);
            }
            (Self::Title, Action::End) => {
                acc.note_mut("title")?.title = non_empty(&element.text);
            }
            (Self::Tag, Action::End) => {
                let note = acc.note_mut("tag")?;
                if let Some(tag) = non_empty(&element.text) {
                    note.tags.push(tag);
                }
            }
            (Self::Content, Action::End) => {
                // Bodies usually arrive as CDATA text; literal markup arrives
                // as child elements and is serialized back
                let body = if element.children.is_empty() {
                    non_empty(&element.text)
                } else {
                    Some(element.inner_xml())
                };
                acc.note_mut("content")?.content = body;
            }
            (Self::Resource, Action::Start) => acc.begin_attachment()?,
            (Self::Resource, Action::End) => acc.finish_attachment()?,
            (Self::Data, Action::End) => {
                // Exports wrap base64 payloads across lines
                let data: String = element
                    .descendant_text()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                acc.attachment_mut("data")?.data = Some(data);
            }
            (Self::Mime, Action::End) => {
                acc.attachment_mut("mime")?.mime = non_empty(&element.text);
            }
            (Self::FileName, Action::End) => {
                acc.attachment_mut("file-name")?.filename = non_empty(&element.text);
            }
            _ => {}
        }
        Ok(None)
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_owned())
}
