//! Byte-order-mark detection and text decoding for uploads
//!
//! Desktop accounting packages export XML as UTF-16 with a BOM and CSV as
//! UTF-8 with or without one; everything is normalized to UTF-8 text here
//! before any format parser sees it.

use tracing::debug;

use crate::types::{ImportError, ImportResult};

/// Decode an uploaded text file to UTF-8, honoring any byte-order mark
///
/// Recognizes the UTF-8 (`EF BB BF`), UTF-16LE (`FF FE`) and UTF-16BE
/// (`FE FF`) marks and defaults to UTF-8 when none is present. Decoding is
/// lossy; an upload that decodes to nothing but whitespace is rejected as
/// fatal.
pub fn decode_text(bytes: &[u8]) -> ImportResult<String> {
    let text = match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ImportError::FatalInput(
            "empty or corrupted file".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| from_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Drop any stray bytes preceding the first `<` of an XML document
///
/// Some exports carry junk ahead of the declaration (stale BOM remnants,
/// printer control bytes). The number of characters dropped is logged.
pub fn strip_to_xml_start(text: &str) -> &str {
    match text.find('<') {
        Some(0) | None => text,
        Some(index) => {
            debug!(dropped = index, "dropped leading bytes before XML start");
            &text[index..]
        }
    }
}
