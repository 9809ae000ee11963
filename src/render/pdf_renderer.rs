//! PDF Rendering Module
//!
//! Turns laid-out document blocks into a paginated PDF using the base-14
//! Helvetica and Courier fonts, so no font files need to ship with the crate.
//! Inline markup is split into font runs, words are wrapped greedily against
//! approximate glyph widths, and pages break when the cursor reaches the
//! bottom margin.

use super::document::{layout_document, Alignment, Block, ParagraphStyle};
use crate::error::RenderError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// US Letter, in points
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;

/// Base-14 font faces used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Mono,
}

impl FontFace {
    const ALL: [FontFace; 5] = [
        Self::Regular,
        Self::Bold,
        Self::Italic,
        Self::BoldItalic,
        Self::Mono,
    ];

    fn resource_name(&self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
            Self::BoldItalic => "F4",
            Self::Mono => "F5",
        }
    }

    fn base_font(&self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Italic => "Helvetica-Oblique",
            Self::BoldItalic => "Helvetica-BoldOblique",
            Self::Mono => "Courier",
        }
    }

    fn select(bold: bool, italic: bool, mono: bool) -> Self {
        match (mono, bold, italic) {
            (true, _, _) => Self::Mono,
            (false, true, true) => Self::BoldItalic,
            (false, true, false) => Self::Bold,
            (false, false, true) => Self::Italic,
            (false, false, false) => Self::Regular,
        }
    }

    /// Approximate advance width in thousandths of an em
    fn char_width(&self, c: char) -> f32 {
        if *self == Self::Mono {
            return 600.0;
        }
        let base = match c {
            ' ' | '!' | '.' | ',' | ':' | ';' | 'I' | 'f' | 't' | '/' | '\\' | '[' | ']' => 278.0,
            'i' | 'j' | 'l' | '\'' | '|' => 222.0,
            '-' | '(' | ')' | 'r' | '`' => 333.0,
            '"' => 355.0,
            '•' => 350.0,
            'm' | 'M' => 833.0,
            'W' => 944.0,
            'w' | 'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722.0,
            'G' | 'O' | 'Q' => 778.0,
            'F' | 'T' | 'Z' => 611.0,
            'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500.0,
            'L' => 556.0,
            '%' => 889.0,
            '@' => 1015.0,
            c if c.is_ascii_uppercase() => 667.0,
            _ => 556.0,
        };
        match self {
            Self::Bold | Self::BoldItalic => base * 1.06,
            _ => base,
        }
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c)).sum::<f32>() * size / 1000.0
    }
}

/// A stretch of text in one font face
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub face: FontFace,
}

/// Split inline markup into font runs. Unknown tags are kept as literal text.
pub fn parse_markup(markup: &str, base_bold: bool) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    let mut bold = 0usize;
    let mut italic = 0usize;
    let mut fonts: Vec<bool> = Vec::new();
    let mut buffer = String::new();

    let flush = |buffer: &mut String, runs: &mut Vec<Run>, face: FontFace| {
        if buffer.is_empty() {
            return;
        }
        match runs.last_mut() {
            Some(last) if last.face == face => last.text.push_str(buffer),
            _ => runs.push(Run {
                text: buffer.clone(),
                face,
            }),
        }
        buffer.clear();
    };

    let mut rest = markup;
    while let Some(c) = rest.chars().next() {
        let face = FontFace::select(base_bold || bold > 0, italic > 0, fonts.iter().any(|m| *m));

        if c == '<' {
            if let Some(end) = rest.find('>') {
                let tag = &rest[1..end];
                let recognised = match tag {
                    "b" => {
                        bold += 1;
                        true
                    }
                    "/b" => {
                        bold = bold.saturating_sub(1);
                        true
                    }
                    "i" => {
                        italic += 1;
                        true
                    }
                    "/i" => {
                        italic = italic.saturating_sub(1);
                        true
                    }
                    "/font" => {
                        fonts.pop();
                        true
                    }
                    t if t.starts_with("font") => {
                        fonts.push(t.contains("Courier"));
                        true
                    }
                    _ => false,
                };
                if recognised {
                    flush(&mut buffer, &mut runs, face);
                    rest = &rest[end + 1..];
                    continue;
                }
            }
        }

        if c == '&' {
            let entity = [("&amp;", '&'), ("&lt;", '<'), ("&gt;", '>'), ("&quot;", '"')]
                .into_iter()
                .find(|(name, _)| rest.starts_with(name));
            if let Some((name, decoded)) = entity {
                buffer.push(decoded);
                rest = &rest[name.len()..];
                continue;
            }
        }

        buffer.push(c);
        rest = &rest[c.len_utf8()..];
    }

    let face = FontFace::select(base_bold || bold > 0, italic > 0, fonts.iter().any(|m| *m));
    flush(&mut buffer, &mut runs, face);
    runs
}

#[derive(Debug, Clone)]
struct Segment {
    face: FontFace,
    text: String,
    width: f32,
}

#[derive(Debug, Clone, Default)]
struct LaidLine {
    segments: Vec<Segment>,
    width: f32,
}

impl LaidLine {
    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn push(&mut self, face: FontFace, text: &str, width: f32) {
        match self.segments.last_mut() {
            Some(last) if last.face == face => {
                last.text.push_str(text);
                last.width += width;
            }
            _ => self.segments.push(Segment {
                face,
                text: text.to_string(),
                width,
            }),
        }
        self.width += width;
    }
}

struct Word {
    face: FontFace,
    text: String,
    space_before: bool,
}

fn split_words(runs: &[Run]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pending_space = false;
    for run in runs {
        let mut current = String::new();
        for c in run.text.chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    words.push(Word {
                        face: run.face,
                        text: std::mem::take(&mut current),
                        space_before: pending_space,
                    });
                }
                pending_space = true;
            } else {
                current.push(c);
            }
        }
        if !current.is_empty() {
            words.push(Word {
                face: run.face,
                text: current,
                space_before: pending_space,
            });
            pending_space = false;
        }
    }
    words
}

/// Greedy line breaking against `max_width`
fn wrap_runs(runs: &[Run], size: f32, max_width: f32) -> Vec<LaidLine> {
    let mut lines = Vec::new();
    let mut line = LaidLine::default();

    for word in split_words(runs) {
        let word_width = word.face.text_width(&word.text, size);
        let space_width = if word.space_before && !line.is_empty() {
            word.face.text_width(" ", size)
        } else {
            0.0
        };

        if !line.is_empty() && line.width + space_width + word_width > max_width {
            lines.push(std::mem::take(&mut line));
        }

        if word_width > max_width {
            for chunk in hard_break(&word.text, word.face, size, max_width) {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let width = word.face.text_width(&chunk, size);
                line.push(word.face, &chunk, width);
            }
            continue;
        }

        if word.space_before && !line.is_empty() {
            line.push(word.face, " ", space_width);
        }
        line.push(word.face, &word.text, word_width);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split a word wider than the line into line-sized chunks
fn hard_break(text: &str, face: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let w = face.char_width(c) * size / 1000.0;
        if !current.is_empty() && width + w > max_width {
            chunks.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(c);
        width += w;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Map text onto WinAnsiEncoding bytes; unmapped characters become `?`
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Accumulates drawing operations page by page
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn at_top(&self) -> bool {
        self.y >= PAGE_HEIGHT - MARGIN
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Vertical gap; dropped at the top of a page
    fn space(&mut self, height: f32) {
        if self.at_top() {
            return;
        }
        self.y -= height;
        if self.y < MARGIN {
            self.new_page();
        }
    }

    fn paragraph(&mut self, markup: &str, style: &ParagraphStyle) {
        let runs = parse_markup(markup, style.bold);
        let max_width = PAGE_WIDTH - 2.0 * MARGIN - style.left_indent;
        let lines = wrap_runs(&runs, style.font_size, max_width);
        if lines.is_empty() {
            return;
        }

        if !self.at_top() {
            self.y -= style.space_before;
        }

        for line in &lines {
            if self.y - style.leading < MARGIN {
                self.new_page();
            }
            let baseline = self.y - style.font_size;
            let mut x = match style.alignment {
                Alignment::Left => MARGIN + style.left_indent,
                Alignment::Center => MARGIN + (max_width - line.width).max(0.0) / 2.0,
            };
            for segment in &line.segments {
                self.text(segment, x, baseline, style);
                x += segment.width;
            }
            self.y -= style.leading;
        }

        self.y -= style.space_after;
    }

    fn text(&mut self, segment: &Segment, x: f32, baseline: f32, style: &ParagraphStyle) {
        let (r, g, b) = style.color.to_unit();
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![segment.face.resource_name().into(), style.font_size.into()],
            ),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(&segment.text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// PDF renderer for summaries and notes
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Lay out model text and render it as a titled PDF
    pub fn render_document(&self, content: &str, title: &str) -> Result<Vec<u8>, RenderError> {
        let blocks = layout_document(content, title);
        self.render(&blocks, title)
    }

    /// Render on the blocking pool; layout and encoding are CPU-bound
    pub async fn render_document_async(
        &self,
        content: String,
        title: String,
    ) -> Result<Vec<u8>, RenderError> {
        let renderer = *self;
        tokio::task::spawn_blocking(move || renderer.render_document(&content, &title))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))?
    }

    /// Render pre-laid-out blocks
    pub fn render(&self, blocks: &[Block], title: &str) -> Result<Vec<u8>, RenderError> {
        let mut writer = PageWriter::new();
        for block in blocks {
            match block {
                Block::Paragraph { style, markup } => {
                    writer.paragraph(markup, &style.paragraph_style())
                }
                Block::Spacer { height } => writer.space(*height),
            }
        }
        let pages = writer.finish();
        let page_count = pages.len();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = lopdf::Dictionary::new();
        for face in FontFace::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(face.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(page_count);
        for operations in pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(win_ansi(title)),
            "Producer" => Object::string_literal("studymate"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;

        tracing::info!(
            "[PdfRenderer] Rendered {:?}: {} blocks, {} pages, {} bytes",
            title,
            blocks.len(),
            page_count,
            buffer.len()
        );

        Ok(buffer)
    }
}
