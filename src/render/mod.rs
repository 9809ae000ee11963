//! Output renderers: PDF documents, flashcard slide decks and JSON exports

pub mod document;
pub mod pdf_renderer;
pub mod pptx;
pub mod slides;

pub use document::{classify_line, layout_document, Block, BlockStyle, LineClass};
pub use pdf_renderer::PdfRenderer;
pub use pptx::{write_pptx, PPTX_CONTENT_TYPE};
pub use slides::{build_deck, CardSide, Slide, SlideDeck};

use crate::artifacts::Flashcard;
use crate::error::RenderError;
use serde::Serialize;

/// Pretty-printed JSON export of any artifact record
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render flashcards as a `.pptx` deck in one step
pub fn flashcards_to_pptx(cards: &[Flashcard], title: &str) -> Result<Vec<u8>, RenderError> {
    write_pptx(&build_deck(cards, title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{MindMapNode, Quiz, QuizQuestion};

    #[test]
    fn test_pretty_json_exports() {
        let quiz = Quiz {
            questions: vec![QuizQuestion {
                question: "2 + 2?".into(),
                options: vec!["3".into(), "4".into(), "5".into(), "22".into()],
                correct: 1,
                explanation: "Arithmetic".into(),
            }],
        };
        let json = to_pretty_json(&quiz).unwrap();
        assert!(json.contains("\n"));
        assert_eq!(serde_json::from_str::<Quiz>(&json).unwrap(), quiz);

        let map = MindMapNode::with_children("Cells", vec![MindMapNode::leaf("Nucleus")]);
        let json = to_pretty_json(&map).unwrap();
        assert!(json.contains("\"Nucleus\""));
        assert!(!json.contains("\"children\": []"));
    }

    #[test]
    fn test_flashcards_to_pptx_is_zip() {
        let bytes = flashcards_to_pptx(&[Flashcard::new("Q", "A")], "Deck").unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
