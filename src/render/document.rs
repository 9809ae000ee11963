//! Document layout for summaries and notes
//!
//! Walks model text line by line and classifies each line into a block style
//! with ordered pattern checks. The resulting blocks carry inline markup
//! (`<b>`, `<i>`, `<font name="Courier">`) that the PDF backend turns into
//! font runs.

use once_cell::sync::Lazy;
use regex::Regex;

/// Points per inch
pub const INCH: f32 = 72.0;

static BOLD_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[•\-*]\s*\*\*([^*]+)\*\*:?\s*$").expect("valid bullet regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic regex"));
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.+?)`").expect("valid code regex"));

/// RGB colour with 0-255 channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const INDIGO: Rgb = Rgb(0x4f, 0x46, 0xe5);
    pub const VIOLET: Rgb = Rgb(0x63, 0x66, 0xf1);
    pub const SLATE: Rgb = Rgb(0x0f, 0x17, 0x2a);

    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

/// Visual class of a rendered block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Title,
    Heading,
    SubHeading,
    Body,
    Bullet,
}

/// Concrete paragraph metrics for a block style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphStyle {
    pub font_size: f32,
    pub leading: f32,
    pub color: Rgb,
    pub bold: bool,
    pub space_before: f32,
    pub space_after: f32,
    pub left_indent: f32,
    pub alignment: Alignment,
}

impl BlockStyle {
    pub fn paragraph_style(&self) -> ParagraphStyle {
        match self {
            Self::Title => ParagraphStyle {
                font_size: 24.0,
                leading: 28.8,
                color: Rgb::INDIGO,
                bold: true,
                space_before: 0.0,
                space_after: 30.0,
                left_indent: 0.0,
                alignment: Alignment::Center,
            },
            Self::Heading => ParagraphStyle {
                font_size: 16.0,
                leading: 19.2,
                color: Rgb::INDIGO,
                bold: true,
                space_before: 12.0,
                space_after: 12.0,
                left_indent: 0.0,
                alignment: Alignment::Left,
            },
            Self::SubHeading => ParagraphStyle {
                font_size: 13.0,
                leading: 15.6,
                color: Rgb::VIOLET,
                bold: true,
                space_before: 8.0,
                space_after: 8.0,
                left_indent: 0.0,
                alignment: Alignment::Left,
            },
            Self::Body => ParagraphStyle {
                font_size: 11.0,
                leading: 16.0,
                color: Rgb::SLATE,
                bold: false,
                space_before: 0.0,
                space_after: 8.0,
                left_indent: 0.0,
                alignment: Alignment::Left,
            },
            Self::Bullet => ParagraphStyle {
                font_size: 11.0,
                leading: 14.0,
                color: Rgb::SLATE,
                bold: false,
                space_before: 0.0,
                space_after: 6.0,
                left_indent: 20.0,
                alignment: Alignment::Left,
            },
        }
    }
}

/// One laid-out element of a document
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph { style: BlockStyle, markup: String },
    Spacer { height: f32 },
}

/// Result of classifying one trimmed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    /// Markdown heading, level 1-3, with its markers removed
    Heading { level: u8, text: String },
    /// Bullet whose whole text is bold, e.g. `- **Key terms:**`
    BoldBullet(String),
    /// Upper-case line treated as a section heading
    AllCaps(String),
    Bullet(String),
    Numbered(String),
    Paragraph(String),
}

impl LineClass {
    /// Map a classification onto its visual block
    pub fn into_block(self) -> Block {
        match self {
            Self::Blank => Block::Spacer { height: 0.1 * INCH },
            Self::Heading { level: 3, text } => paragraph(BlockStyle::SubHeading, &text),
            Self::Heading { text, .. } => paragraph(BlockStyle::Heading, &text),
            Self::BoldBullet(text) => Block::Paragraph {
                style: BlockStyle::SubHeading,
                markup: format!("• {}", inline_markup(&text)),
            },
            Self::AllCaps(text) => paragraph(BlockStyle::Heading, &text),
            Self::Bullet(text) => Block::Paragraph {
                style: BlockStyle::Bullet,
                markup: format!("• {}", inline_markup(&text)),
            },
            Self::Numbered(text) => paragraph(BlockStyle::Bullet, &text),
            Self::Paragraph(text) => paragraph(BlockStyle::Body, &text),
        }
    }
}

fn paragraph(style: BlockStyle, text: &str) -> Block {
    Block::Paragraph {
        style,
        markup: inline_markup(text),
    }
}

/// Classify a single line. Checks run in a fixed order; the first match wins.
pub fn classify_line(line: &str) -> LineClass {
    let line = line.trim();
    if line.is_empty() {
        return LineClass::Blank;
    }

    if line.starts_with("###") {
        return LineClass::Heading {
            level: 3,
            text: line.replace("###", "").trim().to_string(),
        };
    }
    if line.starts_with("##") {
        return LineClass::Heading {
            level: 2,
            text: line.replace("##", "").trim().to_string(),
        };
    }
    if line.starts_with('#') {
        return LineClass::Heading {
            level: 1,
            text: line.replace('#', "").trim().to_string(),
        };
    }

    if let Some(caps) = BOLD_BULLET.captures(line) {
        return LineClass::BoldBullet(caps[1].to_string());
    }

    if is_all_caps_heading(line) {
        return LineClass::AllCaps(line.to_string());
    }

    for marker in ["- ", "• ", "* "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return LineClass::Bullet(rest.trim().to_string());
        }
    }

    if is_numbered_item(line) {
        return LineClass::Numbered(line.to_string());
    }

    LineClass::Paragraph(line.to_string())
}

/// At least one cased letter, no lower-case letters, 4-99 chars, not a bullet
fn is_all_caps_heading(line: &str) -> bool {
    let len = line.chars().count();
    let has_upper = line.chars().any(char::is_uppercase);
    let has_lower = line.chars().any(char::is_lowercase);
    has_upper
        && !has_lower
        && len > 3
        && len < 100
        && !line.starts_with(['•', '-', '*'])
}

/// `1. Item`, `2) Item`; any Unicode digit counts
fn is_numbered_item(line: &str) -> bool {
    let mut chars = line.chars();
    let first = chars.next();
    let second = chars.next();
    line.chars().count() > 2
        && first.is_some_and(char::is_numeric)
        && matches!(second, Some('.') | Some(')'))
}

/// Escape XML specials, then translate markdown emphasis into inline markup
pub fn inline_markup(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    let bold = BOLD.replace_all(&escaped, "<b>${1}</b>");
    let italic = ITALIC.replace_all(&bold, "<i>${1}</i>");
    CODE.replace_all(&italic, r#"<font name="Courier">${1}</font>"#)
        .into_owned()
}

/// Lay out a titled document from model text
pub fn layout_document(content: &str, title: &str) -> Vec<Block> {
    let mut blocks = vec![
        Block::Paragraph {
            style: BlockStyle::Title,
            markup: inline_markup(title),
        },
        Block::Spacer { height: 0.3 * INCH },
    ];

    blocks.extend(content.split('\n').map(|line| classify_line(line).into_block()));

    tracing::debug!(
        "[DocumentLayout] {} blocks laid out for {:?}",
        blocks.len(),
        title
    );

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_of(line: &str) -> Option<BlockStyle> {
        match classify_line(line).into_block() {
            Block::Paragraph { style, .. } => Some(style),
            Block::Spacer { .. } => None,
        }
    }

    #[test]
    fn test_markdown_headings() {
        assert_eq!(
            classify_line("### Key Terms"),
            LineClass::Heading {
                level: 3,
                text: "Key Terms".into()
            }
        );
        assert_eq!(style_of("### Key Terms"), Some(BlockStyle::SubHeading));
        assert_eq!(style_of("## Overview"), Some(BlockStyle::Heading));
        assert_eq!(style_of("# Chapter 1"), Some(BlockStyle::Heading));
    }

    #[test]
    fn test_all_caps_matches_level_two_heading() {
        assert_eq!(
            classify_line("PHOTOSYNTHESIS"),
            LineClass::AllCaps("PHOTOSYNTHESIS".into())
        );
        assert_eq!(style_of("PHOTOSYNTHESIS"), style_of("## Photosynthesis"));
        assert_eq!(style_of("KEY IDEAS: 2024"), Some(BlockStyle::Heading));
    }

    #[test]
    fn test_short_or_bulleted_caps_are_not_headings() {
        assert_eq!(classify_line("DNA"), LineClass::Paragraph("DNA".into()));
        assert_eq!(classify_line("- NOTE"), LineClass::Bullet("NOTE".into()));
        assert_eq!(classify_line("1234"), LineClass::Paragraph("1234".into()));
    }

    #[test]
    fn test_bold_bullet_is_sub_heading() {
        assert_eq!(
            classify_line("• **Cell Structure:**"),
            LineClass::BoldBullet("Cell Structure:".into())
        );
        match classify_line("- **Enzymes**").into_block() {
            Block::Paragraph { style, markup } => {
                assert_eq!(style, BlockStyle::SubHeading);
                assert_eq!(markup, "• Enzymes");
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_bullets_and_numbered_items() {
        assert_eq!(classify_line("- first"), LineClass::Bullet("first".into()));
        assert_eq!(classify_line("• second"), LineClass::Bullet("second".into()));
        assert_eq!(classify_line("* third"), LineClass::Bullet("third".into()));
        assert_eq!(
            classify_line("1. Define terms"),
            LineClass::Numbered("1. Define terms".into())
        );
        assert_eq!(style_of("2) Compare"), Some(BlockStyle::Bullet));
        assert_eq!(classify_line("3."), LineClass::Paragraph("3.".into()));
        assert_eq!(
            classify_line("٣. Arabic-Indic numbering"),
            LineClass::Numbered("٣. Arabic-Indic numbering".into())
        );
    }

    #[test]
    fn test_plain_paragraph() {
        assert_eq!(style_of("Cells are the basic unit of life."), Some(BlockStyle::Body));
    }

    #[test]
    fn test_blank_line_is_spacer() {
        assert_eq!(
            classify_line("   ").into_block(),
            Block::Spacer { height: 0.1 * INCH }
        );
    }

    #[test]
    fn test_inline_markup_escapes_first() {
        assert_eq!(
            inline_markup("a < b & **bold** *it* `x<y`"),
            r#"a &lt; b &amp; <b>bold</b> <i>it</i> <font name="Courier">x&lt;y</font>"#
        );
    }

    #[test]
    fn test_layout_starts_with_title() {
        let blocks = layout_document("## Intro\ntext", "Summary");
        assert_eq!(blocks.len(), 4);
        assert_eq!(
            blocks[0],
            Block::Paragraph {
                style: BlockStyle::Title,
                markup: "Summary".into()
            }
        );
        assert_eq!(blocks[1], Block::Spacer { height: 0.3 * INCH });
    }
}
