//! Content-type detection for attachments.
//!
//! The type is determined from the file's leading bytes, not from its
//! extension: a renamed binary must still be labeled by what it contains.
//! `mime_guess` is only consulted as a fallback when no signature matches
//! and the data is not plain text.

use crate::error::{Error, Result};
use std::path::Path;

/// How many leading bytes participate in detection.
const SNIFF_LEN: usize = 512;

/// Magic-byte signatures, checked in order.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1F\x8B", "application/gzip"),
    (b"OggS", "application/ogg"),
    (b"\x25\x21PS", "application/postscript"),
];

/// Detects the MIME content type of attachment data.
///
/// # Errors
///
/// Returns [`Error::ContentSniff`] when the data is empty, since there is
/// nothing to classify (zero-byte sentinel files are rejected rather than
/// silently labeled).
pub fn detect_content_type(path: &Path, data: &[u8]) -> Result<String> {
    if data.is_empty() {
        return Err(Error::ContentSniff {
            path: path.to_path_buf(),
        });
    }

    let head = &data[..data.len().min(SNIFF_LEN)];

    for (magic, mime) in SIGNATURES {
        if head.starts_with(magic) {
            return Ok((*mime).to_string());
        }
    }

    // RIFF containers: WEBP and WAV share the outer signature.
    if head.len() >= 12 && head.starts_with(b"RIFF") {
        match &head[8..12] {
            b"WEBP" => return Ok("image/webp".to_string()),
            b"WAVE" => return Ok("audio/wav".to_string()),
            _ => {}
        }
    }

    if looks_like_text(head) {
        return Ok("text/plain; charset=utf-8".to_string());
    }

    // Unrecognized binary: fall back to the extension, then octet-stream.
    Ok(mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string())
}

/// A conservative text heuristic: valid UTF-8 (allowing a trailing cut-off
/// sequence at the sniff window edge) with no control bytes other than
/// whitespace.
fn looks_like_text(head: &[u8]) -> bool {
    let valid = match std::str::from_utf8(head) {
        Ok(_) => true,
        // The window may end mid code point.
        Err(e) => e.error_len().is_none() && head.len() == SNIFF_LEN,
    };
    valid
        && !head
            .iter()
            .any(|&b| b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r')
}
