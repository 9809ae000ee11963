//! Study artifacts: typed records and the parser that produces them

pub mod parser;
pub mod types;
pub mod utils;

pub use parser::{
    parse_flashcards, parse_flashcards_strict, parse_mind_map, parse_quiz, serialize_flashcards,
};
pub use types::{
    ArtifactKind, Flashcard, MindMapNode, OutputFormat, Quiz, QuizIssue, QuizQuestion,
};
pub use utils::strip_code_fences;
