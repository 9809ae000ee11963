//! Text extraction from uploaded documents

pub mod document_parser;
mod slides;

pub use document_parser::{DocumentParser, ExtractedDocument, SourceFormat};

/// Extract best-effort plain text; empty on any failure
pub fn extract_text(bytes: &[u8], extension: &str) -> String {
    DocumentParser::new().parse(bytes, extension).text
}

/// Lowercased text after the last `.` of a file name.
/// A name without a dot is returned whole, so it falls through to UTF-8 decoding.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(filename)
        .to_lowercase()
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Cut text to at most `limit` characters without splitting a code point
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
