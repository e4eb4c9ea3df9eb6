//! Attachment naming, linking and decoding.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use enex_core::Attachment;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::WriteError;

/// Characters escaped in markdown link targets.
const LINK_TARGET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'`');

/// Extension used when the mime type is unknown.
const FALLBACK_EXTENSION: &str = "bin";

/// Output filename for an attachment.
///
/// `{stamp}-{filename}`, or `{stamp}-file-{index}.{ext}` when the attachment
/// has no filename. Without a stamp the prefix is left out.
pub(crate) fn attachment_name(attachment: &Attachment, index: usize, stamp: Option<&str>) -> String {
    let base = match attachment.filename.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => sanitize_filename(name),
        _ => format!("file-{index}.{}", extension_for(attachment.mime.as_deref())),
    };
    match stamp {
        Some(stamp) => format!("{stamp}-{base}"),
        None => base,
    }
}

/// Markdown link to an attachment, shown inline for images.
pub(crate) fn attachment_link(attachment: &Attachment, name: &str) -> String {
    let bang = if attachment.is_image() { "!" } else { "" };
    let target = utf8_percent_encode(name, LINK_TARGET);
    format!("{bang}[{name}]({target})")
}

/// Decode an attachment's base64 payload.
///
/// Returns `None` when the attachment carries no data.
pub(crate) fn decode_data(attachment: &Attachment, name: &str) -> Result<Option<Vec<u8>>, WriteError> {
    let Some(data) = attachment.data.as_deref() else {
        return Ok(None);
    };
    BASE64_STANDARD
        .decode(data)
        .map(Some)
        .map_err(|source| WriteError::Base64 {
            name: name.to_owned(),
            source,
        })
}

fn extension_for(mime: Option<&str>) -> &'static str {
    let Some(mime) = mime else {
        return FALLBACK_EXTENSION;
    };
    let Some(extensions) = mime_guess::get_mime_extensions_str(mime) else {
        return FALLBACK_EXTENSION;
    };
    // Prefer the subtype itself (image/jpeg -> jpeg) over aliases
    let subtype = mime.split_once('/').map_or(mime, |(_, sub)| sub);
    extensions
        .iter()
        .find(|ext| **ext == subtype)
        .or_else(|| extensions.first())
        .copied()
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Replace characters that would escape the output directory or break paths.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
