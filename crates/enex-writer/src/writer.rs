//! Note writer.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use enex_core::enex::TIMESTAMP_FORMAT;
use enex_core::{EnmlRenderer, ListenerError, Note, NoteListener};

use crate::attachment::{attachment_link, attachment_name, decode_data};
use crate::error::WriteError;
use crate::markdown::compose;

/// Options controlling what a [`NoteWriter`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Decode attachments and write them next to their note (directory
    /// output only).
    pub extract_attachments: bool,
    /// Render ENML bodies to markdown. When disabled the raw body is written.
    pub render: bool,
    /// Work out output paths without touching the filesystem.
    pub dry_run: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            extract_attachments: true,
            render: true,
            dry_run: false,
        }
    }
}

enum Target<W> {
    Dir(PathBuf),
    Stream(W),
}

/// Writes parsed notes as markdown.
///
/// In directory mode each note becomes `{root}/{year}/{stamp}.md`, where the
/// stamp is the note's creation time (or last update) in export format.
/// Attachments are written next to the note as `{stamp}-{filename}`.
///
/// In stream mode every note is appended to one writer and no attachment
/// files are produced; links are still emitted.
pub struct NoteWriter<W = io::Sink> {
    target: Target<W>,
    options: WriterOptions,
    renderer: EnmlRenderer,
    stamps: HashMap<String, usize>,
    written: Vec<PathBuf>,
    notes: usize,
}

impl NoteWriter<io::Sink> {
    /// Write notes into a directory tree rooted at `root`.
    pub fn to_dir(root: impl Into<PathBuf>) -> Self {
        Self::with_target(Target::Dir(root.into()))
    }
}

impl<W: Write> NoteWriter<W> {
    /// Write all notes to a single stream.
    pub fn to_stream(writer: W) -> Self {
        Self::with_target(Target::Stream(writer))
    }

    fn with_target(target: Target<W>) -> Self {
        Self {
            target,
            options: WriterOptions::default(),
            renderer: EnmlRenderer::new(),
            stamps: HashMap::new(),
            written: Vec::new(),
            notes: 0,
        }
    }

    /// Replace the writer options.
    #[must_use]
    pub fn with_options(mut self, options: WriterOptions) -> Self {
        self.options = options;
        self
    }

    /// Number of notes handled so far.
    #[must_use]
    pub fn notes_written(&self) -> usize {
        self.notes
    }

    /// Files written so far (or that would be written, in a dry run).
    #[must_use]
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }

    /// Consume the writer, returning the underlying stream if any.
    pub fn into_inner(self) -> Option<W> {
        match self.target {
            Target::Stream(writer) => Some(writer),
            Target::Dir(_) => None,
        }
    }

    /// Convert and write one note.
    ///
    /// # Errors
    ///
    /// Returns an error if the note has no timestamp in directory mode, an
    /// attachment payload is not valid base64, or writing fails.
    pub fn write_note(&mut self, note: &Note) -> Result<(), WriteError> {
        let stamp = note
            .timestamp()
            .map(|ts| self.unique_stamp(&ts.format(TIMESTAMP_FORMAT).to_string()));

        let names: Vec<String> = note
            .attachments
            .iter()
            .enumerate()
            .map(|(index, attachment)| attachment_name(attachment, index, stamp.as_deref()))
            .collect();
        let links: Vec<String> = note
            .attachments
            .iter()
            .zip(&names)
            .map(|(attachment, name)| attachment_link(attachment, name))
            .collect();

        let body = self.body(note);
        let document = compose(note, body.as_deref(), &links);

        match &mut self.target {
            Target::Stream(writer) => {
                if self.notes > 0 {
                    writer.write_all(b"\n")?;
                }
                writer.write_all(document.as_bytes())?;
            }
            Target::Dir(root) => {
                let (Some(stamp), Some(timestamp)) = (stamp.as_deref(), note.timestamp()) else {
                    return Err(WriteError::MissingTimestamp {
                        title: note.title.clone().unwrap_or_default(),
                    });
                };
                let dir = root.join(timestamp.format("%Y").to_string());
                let path = dir.join(format!("{stamp}.md"));

                // Every payload decodes before any file is written
                let mut payloads = Vec::new();
                if self.options.extract_attachments {
                    for (attachment, name) in note.attachments.iter().zip(&names) {
                        match decode_data(attachment, name)? {
                            Some(data) => payloads.push((name, data)),
                            None => {
                                tracing::warn!(attachment = %name, "Attachment has no data, skipping");
                            }
                        }
                    }
                }

                let dry_run = self.options.dry_run;
                if !dry_run {
                    fs::create_dir_all(&dir)?;
                    fs::write(&path, &document)?;
                }
                tracing::debug!(path = %path.display(), "Wrote note");
                self.written.push(path);

                for (name, data) in payloads {
                    let path = write_attachment(&dir, name, &data, dry_run)?;
                    self.written.push(path);
                }
            }
        }

        self.notes += 1;
        Ok(())
    }

    fn body(&self, note: &Note) -> Option<String> {
        let content = note.content.as_deref()?;
        if !self.options.render {
            return Some(content.to_owned());
        }
        match self.renderer.render(content) {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(
                    title = note.title.as_deref().unwrap_or_default(),
                    error = %e,
                    "Failed to render note body, writing header only"
                );
                None
            }
        }
    }

    /// First use of a stamp keeps it; later uses get `-2`, `-3`, ...
    fn unique_stamp(&mut self, stamp: &str) -> String {
        let count = self.stamps.entry(stamp.to_owned()).or_insert(0);
        *count += 1;
        if *count == 1 {
            stamp.to_owned()
        } else {
            format!("{stamp}-{count}")
        }
    }
}

fn write_attachment(dir: &Path, name: &str, data: &[u8], dry_run: bool) -> Result<PathBuf, WriteError> {
    let path = dir.join(name);
    if !dry_run {
        fs::write(&path, data)?;
    }
    tracing::debug!(path = %path.display(), bytes = data.len(), "Wrote attachment");
    Ok(path)
}

impl<W: Write> NoteListener for NoteWriter<W> {
    fn add_note(&mut self, note: Note) -> Result<(), ListenerError> {
        self.write_note(&note)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use enex_core::{Attachment, EnexParser};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    // "%PDF-1.4\n" and the 8-byte PNG signature
    const PDF_DATA: &str = "JVBERi0xLjQK";
    const PNG_DATA: &str = "iVBORw0KGgo=";

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn resource(filename: &str, mime: &str, data: &str) -> Attachment {
        Attachment {
            data: Some(data.to_owned()),
            mime: Some(mime.to_owned()),
            filename: Some(filename.to_owned()),
        }
    }

    fn stream_output(note: &Note) -> String {
        let mut writer = NoteWriter::to_stream(Vec::new());
        writer.write_note(note).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_output_filename() {
        let temp = TempDir::new().unwrap();
        let note = Note {
            created: Some(at(2010, 1, 1, 0, 0, 0)),
            ..Default::default()
        };

        let mut writer = NoteWriter::to_dir(temp.path());
        writer.write_note(&note).unwrap();

        let expected = temp.path().join("2010").join("20100101T000000Z.md");
        assert!(expected.exists());
        assert_eq!(writer.written_files(), [expected]);
    }

    #[test]
    fn test_output_filename_falls_back_to_updated() {
        let temp = TempDir::new().unwrap();
        let note = Note {
            updated: Some(at(2012, 5, 6, 7, 8, 9)),
            ..Default::default()
        };

        NoteWriter::to_dir(temp.path()).write_note(&note).unwrap();

        assert!(temp.path().join("2012/20120506T070809Z.md").exists());
    }

    #[test]
    fn test_missing_timestamp_in_dir_mode() {
        let temp = TempDir::new().unwrap();
        let note = Note {
            title: Some("Undated".to_owned()),
            ..Default::default()
        };

        let err = NoteWriter::to_dir(temp.path()).write_note(&note).unwrap_err();

        assert!(matches!(err, WriteError::MissingTimestamp { ref title } if title == "Undated"));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_duplicate_stamps_get_suffix() {
        let temp = TempDir::new().unwrap();
        let note = Note {
            created: Some(at(2010, 1, 1, 0, 0, 0)),
            ..Default::default()
        };

        let mut writer = NoteWriter::to_dir(temp.path());
        for _ in 0..3 {
            writer.write_note(&note).unwrap();
        }

        let year = temp.path().join("2010");
        assert!(year.join("20100101T000000Z.md").exists());
        assert!(year.join("20100101T000000Z-2.md").exists());
        assert!(year.join("20100101T000000Z-3.md").exists());
        assert_eq!(writer.notes_written(), 3);
    }

    #[test]
    fn test_output_title() {
        let note = Note {
            title: Some("Test title".to_owned()),
            ..Default::default()
        };
        assert_eq!(stream_output(&note), "# Test title\n");
    }

    #[test]
    fn test_output_content() {
        let note = Note {
            content: Some("<en-note>Test content</en-note>".to_owned()),
            ..Default::default()
        };
        assert_eq!(stream_output(&note), "Test content\n");
    }

    #[test]
    fn test_output_raw_content_when_render_disabled() {
        let note = Note {
            content: Some("<en-note>Test content</en-note>".to_owned()),
            ..Default::default()
        };
        let mut writer = NoteWriter::to_stream(Vec::new()).with_options(WriterOptions {
            render: false,
            ..Default::default()
        });
        writer.write_note(&note).unwrap();

        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(output, "<en-note>Test content</en-note>\n");
    }

    #[test]
    fn test_output_created_and_updated() {
        let note = Note {
            created: Some(at(2010, 1, 1, 0, 0, 0)),
            updated: Some(at(2010, 1, 1, 0, 0, 0)),
            ..Default::default()
        };
        let output = stream_output(&note);
        assert!(output.contains("Created: 2010-01-01 00:00:00"));
        assert!(output.contains("Updated: 2010-01-01 00:00:00"));
    }

    #[test]
    fn test_output_tags() {
        let note = Note {
            tags: vec!["hello".to_owned(), "world".to_owned()],
            ..Default::default()
        };
        assert_eq!(stream_output(&note), "Tags: hello, world\n");
    }

    #[test]
    fn test_output_resource_links() {
        let note = Note {
            created: Some(at(2010, 1, 1, 0, 0, 0)),
            attachments: vec![
                resource("Test-page-color-Final.pdf", "application/pdf", PDF_DATA),
                resource("Color Splash PNG Free Download.png", "image/png", PNG_DATA),
                resource("", "image/png", PNG_DATA),
            ],
            ..Default::default()
        };

        let output = stream_output(&note);

        assert!(output.contains(
            "\n[20100101T000000Z-Test-page-color-Final.pdf](20100101T000000Z-Test-page-color-Final.pdf)\n"
        ));
        assert!(output.contains(
            "![20100101T000000Z-Color Splash PNG Free Download.png](20100101T000000Z-Color%20Splash%20PNG%20Free%20Download.png)"
        ));
        assert!(output.contains("![20100101T000000Z-file-2.png](20100101T000000Z-file-2.png)"));
    }

    #[test]
    fn test_render_error_keeps_header() {
        let note = Note {
            title: Some("Broken".to_owned()),
            content: Some("<en-note><div></en-note>".to_owned()),
            attachments: vec![resource("a.pdf", "application/pdf", PDF_DATA)],
            ..Default::default()
        };
        assert_eq!(stream_output(&note), "# Broken\n\n[a.pdf](a.pdf)\n");
    }

    #[test]
    fn test_stream_separates_notes() {
        let mut writer = NoteWriter::to_stream(Vec::new());
        for title in ["One", "Two"] {
            let note = Note {
                title: Some(title.to_owned()),
                ..Default::default()
            };
            writer.write_note(&note).unwrap();
        }
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(output, "# One\n\n# Two\n");
    }

    #[test]
    fn test_output_resource_files() {
        let temp = TempDir::new().unwrap();
        let note = Note {
            created: Some(at(2001, 2, 3, 4, 5, 6)),
            attachments: vec![
                resource("Test-page-color-Final.pdf", "asdf", PDF_DATA),
                resource("Color-Splash-PNG-Free-Download.png", "asdf", PNG_DATA),
            ],
            ..Default::default()
        };

        NoteWriter::to_dir(temp.path()).write_note(&note).unwrap();

        let year = temp.path().join("2001");
        assert_eq!(
            fs::read(year.join("20010203T040506Z-Test-page-color-Final.pdf")).unwrap(),
            b"%PDF-1.4\n"
        );
        assert_eq!(
            fs::read(year.join("20010203T040506Z-Color-Splash-PNG-Free-Download.png")).unwrap(),
            b"\x89PNG\r\n\x1a\n"
        );
    }

    #[test]
    fn test_attachment_without_data_is_skipped() {
        let temp = TempDir::new().unwrap();
        let note = Note {
            created: Some(at(2001, 2, 3, 4, 5, 6)),
            attachments: vec![Attachment {
                filename: Some("empty.txt".to_owned()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let mut writer = NoteWriter::to_dir(temp.path());
        writer.write_note(&note).unwrap();

        let year = temp.path().join("2001");
        assert!(!year.join("20010203T040506Z-empty.txt").exists());
        let markdown = fs::read_to_string(year.join("20010203T040506Z.md")).unwrap();
        assert!(markdown.contains("[20010203T040506Z-empty.txt](20010203T040506Z-empty.txt)"));
        assert_eq!(writer.written_files().len(), 1);
    }

    #[test]
    fn test_extraction_disabled() {
        let temp = TempDir::new().unwrap();
        let note = Note {
            created: Some(at(2001, 2, 3, 4, 5, 6)),
            attachments: vec![resource("a.pdf", "application/pdf", PDF_DATA)],
            ..Default::default()
        };

        NoteWriter::to_dir(temp.path())
            .with_options(WriterOptions {
                extract_attachments: false,
                ..Default::default()
            })
            .write_note(&note)
            .unwrap();

        let year = temp.path().join("2001");
        assert!(year.join("20010203T040506Z.md").exists());
        assert!(!year.join("20010203T040506Z-a.pdf").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let note = Note {
            created: Some(at(2001, 2, 3, 4, 5, 6)),
            attachments: vec![resource("a.pdf", "application/pdf", PDF_DATA)],
            ..Default::default()
        };

        let mut writer = NoteWriter::to_dir(temp.path()).with_options(WriterOptions {
            dry_run: true,
            ..Default::default()
        });
        writer.write_note(&note).unwrap();

        let year = temp.path().join("2001");
        assert_eq!(
            writer.written_files(),
            [
                year.join("20010203T040506Z.md"),
                year.join("20010203T040506Z-a.pdf")
            ]
        );
        assert!(!year.exists());
    }

    #[test]
    fn test_invalid_attachment_data() {
        let temp = TempDir::new().unwrap();
        let note = Note {
            created: Some(at(2001, 2, 3, 4, 5, 6)),
            attachments: vec![
                resource("good.pdf", "application/pdf", PDF_DATA),
                resource("a.pdf", "application/pdf", "***"),
            ],
            ..Default::default()
        };

        let mut writer = NoteWriter::to_dir(temp.path());
        let err = writer.write_note(&note).unwrap_err();

        assert!(matches!(err, WriteError::Base64 { ref name, .. } if name == "20010203T040506Z-a.pdf"));
        assert!(!temp.path().join("2001").exists());
        assert!(writer.written_files().is_empty());
        assert_eq!(writer.notes_written(), 0);
    }

    #[test]
    fn test_as_parser_listener() {
        let temp = TempDir::new().unwrap();
        let xml = r#"<en-export>
  <note>
    <title>Groceries</title>
    <content><![CDATA[<en-note><div>Milk</div><a href="http://shop.example">Shop</a></en-note>]]></content>
    <created>20130730T205204Z</created>
    <tag>errands</tag>
    <resource>
      <data encoding="base64">
        JVBERi0x
        LjQK
      </data>
      <mime>application/pdf</mime>
      <resource-attributes><file-name>list.pdf</file-name></resource-attributes>
    </resource>
  </note>
</en-export>"#;

        let mut writer = NoteWriter::to_dir(temp.path());
        let summary = EnexParser::new().parse_str(xml, &mut writer).unwrap();
        assert_eq!(summary.notes, 1);

        let year = temp.path().join("2013");
        let markdown = fs::read_to_string(year.join("20130730T205204Z.md")).unwrap();
        assert_eq!(
            markdown,
            "# Groceries\n\
             Created: 2013-07-30 20:52:04\n\
             Tags: errands\n\
             \n\
             Milk\n\
             \n\
             \n\
             [Shop](http://shop.example)\n\
             \n\
             [20130730T205204Z-list.pdf](20130730T205204Z-list.pdf)\n"
        );
        assert_eq!(
            fs::read(year.join("20130730T205204Z-list.pdf")).unwrap(),
            b"%PDF-1.4\n"
        );
    }
}
