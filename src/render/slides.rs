//! Slide deck model for flashcard exports
//!
//! Every card becomes two slides: the question, large and centred, then the
//! answer, left-aligned with one paragraph per line. Both carry a running
//! footer naming the deck, the card number and the side.

use crate::artifacts::Flashcard;
use std::fmt;

/// English Metric Units per inch
pub const EMU_PER_INCH: i64 = 914_400;

/// 10 x 7.5 in, the 4:3 default deck size
pub const SLIDE_WIDTH: i64 = 10 * EMU_PER_INCH;
pub const SLIDE_HEIGHT: i64 = 7 * EMU_PER_INCH + EMU_PER_INCH / 2;

const QUESTION_SIZE_PT: u32 = 32;
const ANSWER_SIZE_PT: u32 = 22;
const FOOTER_SIZE_PT: u32 = 12;

fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSide {
    Question,
    Answer,
}

impl fmt::Display for CardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question => f.write_str("Question"),
            Self::Answer => f.write_str("Answer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideParagraph {
    pub text: String,
    pub size_pt: u32,
    pub bold: bool,
    pub align: TextAlign,
    /// Explicit sRGB colour; theme text colour when absent
    pub color: Option<[u8; 3]>,
}

/// A positioned, word-wrapped text box (EMU coordinates)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub paragraphs: Vec<SlideParagraph>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// 1-based card number
    pub card: usize,
    pub side: CardSide,
    pub body: TextBox,
    pub footer: TextBox,
}

impl Slide {
    pub fn footer_text(&self) -> &str {
        self.footer
            .paragraphs
            .first()
            .map(|p| p.text.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDeck {
    pub title: String,
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Build a two-slides-per-card deck
pub fn build_deck(cards: &[Flashcard], title: &str) -> SlideDeck {
    let mut slides = Vec::with_capacity(cards.len() * 2);

    for (index, card) in cards.iter().enumerate() {
        let number = index + 1;

        slides.push(Slide {
            card: number,
            side: CardSide::Question,
            body: TextBox {
                x: inches(0.5),
                y: inches(2.0),
                width: inches(9.0),
                height: inches(3.0),
                paragraphs: vec![SlideParagraph {
                    text: card.question.clone(),
                    size_pt: QUESTION_SIZE_PT,
                    bold: true,
                    align: TextAlign::Center,
                    color: None,
                }],
            },
            footer: footer(title, number, CardSide::Question),
        });

        slides.push(Slide {
            card: number,
            side: CardSide::Answer,
            body: TextBox {
                x: inches(0.5),
                y: inches(1.5),
                width: inches(9.0),
                height: inches(4.0),
                paragraphs: answer_lines(&card.answer)
                    .into_iter()
                    .map(|line| SlideParagraph {
                        text: line,
                        size_pt: ANSWER_SIZE_PT,
                        bold: false,
                        align: TextAlign::Left,
                        color: Some([0, 0, 0]),
                    })
                    .collect(),
            },
            footer: footer(title, number, CardSide::Answer),
        });
    }

    tracing::debug!(
        "[SlideRenderer] Built {} slides from {} cards",
        slides.len(),
        cards.len()
    );

    SlideDeck {
        title: title.to_string(),
        slides,
    }
}

/// Non-blank answer lines; literal `\n` sequences count as line breaks
fn answer_lines(answer: &str) -> Vec<String> {
    answer
        .replace("\\n", "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn footer(title: &str, number: usize, side: CardSide) -> TextBox {
    TextBox {
        x: inches(0.5),
        y: inches(6.5),
        width: inches(9.0),
        height: inches(0.5),
        paragraphs: vec![SlideParagraph {
            text: format!("{} - Card {} ({})", title, number, side),
            size_pt: FOOTER_SIZE_PT,
            bold: false,
            align: TextAlign::Left,
            color: None,
        }],
    }
}
