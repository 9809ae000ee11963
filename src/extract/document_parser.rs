//! Document Parser
//!
//! Pure Rust text extraction from uploaded documents. Dispatch is driven by
//! the declared file extension only; the bytes are never sniffed.
//!
//! ## Supported Formats
//! - PDF: text extraction via pdf-extract
//! - Slides: .pptx (and .ppt, which fails over to empty text) via zip + xml-rs
//! - Word: .docx (and .doc, likewise) via docx-rs
//! - Anything else: strict UTF-8 decode
//!
//! Extraction never returns an error. Every failure is logged and collapses
//! to an empty string; the caller decides what a blank result means.

use super::slides::extract_pptx_text;

/// Which extractor handled a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Presentation,
    WordProcessing,
    PlainText,
}

impl SourceFormat {
    /// Map a lowercased extension to its extractor
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "pdf" => Self::Pdf,
            "ppt" | "pptx" => Self::Presentation,
            "doc" | "docx" => Self::WordProcessing,
            _ => Self::PlainText,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Presentation => "presentation",
            Self::WordProcessing => "word",
            Self::PlainText => "text",
        }
    }
}

/// Result of running an extractor over a document
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Extracted text, empty when nothing could be read
    pub text: String,
    /// Extractor that produced the text
    pub format: SourceFormat,
    pub word_count: usize,
}

impl ExtractedDocument {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extension-dispatching text extractor
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract text from raw bytes using the declared extension
    pub fn parse(&self, bytes: &[u8], extension: &str) -> ExtractedDocument {
        let ext = extension.trim().trim_start_matches('.').to_lowercase();
        let format = SourceFormat::from_extension(&ext);

        let result = match format {
            SourceFormat::Pdf => Self::extract_pdf(bytes),
            SourceFormat::Presentation => extract_pptx_text(bytes),
            SourceFormat::WordProcessing => Self::extract_docx(bytes),
            SourceFormat::PlainText => Self::decode_utf8(bytes),
        };

        let text = match result {
            Ok(text) if text.trim().is_empty() => String::new(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "[DocumentParser] {} extraction failed for .{} ({} bytes): {}",
                    format.as_str(),
                    ext,
                    bytes.len(),
                    e
                );
                String::new()
            }
        };

        let word_count = text.split_whitespace().count();

        tracing::debug!(
            "[DocumentParser] {} extraction: {} bytes -> {} chars, {} words",
            format.as_str(),
            bytes.len(),
            text.len(),
            word_count
        );

        ExtractedDocument {
            text,
            format,
            word_count,
        }
    }

    /// Extract text from PDF using pdf-extract
    /// Wrapped in catch_unwind since malformed fonts can panic inside the crate
    fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
        let text = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        })) {
            Ok(Ok(t)) => t,
            Ok(Err(e)) => return Err(format!("PDF extraction failed: {}", e)),
            Err(_panic) => {
                tracing::error!("[DocumentParser] PDF extraction PANICKED - likely malformed font/glyph");
                return Err("PDF extraction panicked".to_string());
            }
        };

        let raw_len = text.len();
        let text = Self::clean_text(&text);

        tracing::debug!(
            "[DocumentParser] PDF raw extraction: {} chars -> {} chars after cleaning",
            raw_len,
            text.len()
        );

        Ok(text)
    }

    /// Extract body paragraph text from DOCX using docx-rs
    fn extract_docx(bytes: &[u8]) -> Result<String, String> {
        let doc = docx_rs::read_docx(bytes).map_err(|e| format!("Failed to parse DOCX: {}", e))?;

        let paragraphs: Vec<String> = doc
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(para) => Some(Self::paragraph_text(para)),
                _ => None,
            })
            .collect();

        Ok(paragraphs.join("\n"))
    }

    fn paragraph_text(para: &docx_rs::Paragraph) -> String {
        let mut output = String::new();
        for child in &para.children {
            match child {
                docx_rs::ParagraphChild::Run(run) => Self::push_run_text(run, &mut output),
                docx_rs::ParagraphChild::Hyperlink(link) => {
                    for run in &link.children {
                        if let docx_rs::ParagraphChild::Run(r) = run {
                            Self::push_run_text(r, &mut output);
                        }
                    }
                }
                _ => {}
            }
        }
        output
    }

    fn push_run_text(run: &docx_rs::Run, output: &mut String) {
        for run_child in &run.children {
            match run_child {
                docx_rs::RunChild::Text(text) => output.push_str(&text.text),
                docx_rs::RunChild::Tab(_) => output.push('\t'),
                docx_rs::RunChild::Break(_) => output.push('\n'),
                _ => {}
            }
        }
    }

    fn decode_utf8(bytes: &[u8]) -> Result<String, String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| format!("not valid UTF-8: {}", e))
    }

    /// Trim every line and drop the empty ones
    fn clean_text(text: &str) -> String {
        text.lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = docx_rs::Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)),
            );
        }
        let mut buffer = Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_plain_text_decoding() {
        let parser = DocumentParser::new();
        let parsed = parser.parse("Photosynthesis converts light.".as_bytes(), "txt");
        assert_eq!(parsed.text, "Photosynthesis converts light.");
        assert_eq!(parsed.format, SourceFormat::PlainText);
        assert_eq!(parsed.word_count, 3);
    }

    #[test]
    fn test_unknown_extension_falls_back_to_utf8() {
        let parser = DocumentParser::new();
        let parsed = parser.parse("# Heading\nbody".as_bytes(), "md");
        assert_eq!(parsed.text, "# Heading\nbody");
    }

    #[test]
    fn test_invalid_utf8_yields_empty_text() {
        let parser = DocumentParser::new();
        let parsed = parser.parse(&[0xff, 0xfe, 0x00, 0x9f], "txt");
        assert_eq!(parsed.text, "");
        assert!(parsed.is_blank());
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(SourceFormat::from_extension("pdf"), SourceFormat::Pdf);
        let parser = DocumentParser::new();
        assert_eq!(parser.parse(b"", "PDF").format, SourceFormat::Pdf);
        assert_eq!(parser.parse(b"", ".DocX").format, SourceFormat::WordProcessing);
    }

    #[test]
    fn test_empty_documents_yield_empty_text() {
        let parser = DocumentParser::new();
        for ext in ["pdf", "ppt", "pptx", "doc", "docx", "txt"] {
            let parsed = parser.parse(b"", ext);
            assert_eq!(parsed.text, "", "extension {}", ext);
        }
    }

    #[test]
    fn test_garbage_binary_yields_empty_text() {
        let parser = DocumentParser::new();
        let garbage = b"not a real office or pdf payload";
        assert_eq!(parser.parse(garbage, "pdf").text, "");
        assert_eq!(parser.parse(garbage, "pptx").text, "");
        assert_eq!(parser.parse(garbage, "docx").text, "");
    }

    #[test]
    fn test_docx_paragraphs_joined_by_newline() {
        let bytes = docx_bytes(&["Cell biology", "Mitochondria produce ATP"]);
        let parsed = DocumentParser::new().parse(&bytes, "docx");
        assert_eq!(parsed.text, "Cell biology\nMitochondria produce ATP");
        assert_eq!(parsed.format, SourceFormat::WordProcessing);
    }

    #[test]
    fn test_docx_without_text_is_empty() {
        let bytes = docx_bytes(&["", ""]);
        let parsed = DocumentParser::new().parse(&bytes, "docx");
        assert_eq!(parsed.text, "");
    }

    #[test]
    fn test_clean_text() {
        let messy = "  Line 1  \n\n  Line 2  \n  \n  Line 3  ";
        let cleaned = DocumentParser::clean_text(messy);
        assert_eq!(cleaned, "Line 1\nLine 2\nLine 3");
    }
}
