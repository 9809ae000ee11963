//! Artifact Parser
//!
//! Best-effort conversion of model output into typed records. JSON is always
//! tried first. Flashcards additionally fall back to a line scanner for the
//! `FRONT:`/`BACK:` text format the flashcard prompt asks for.

use super::types::{Flashcard, MindMapNode, Quiz, QuizQuestion};
use super::utils::{extract_json_object, strip_code_fences};
use crate::error::ParseError;
use serde_json::Value;

/// Root name used when a mind map arrives as a bare list of branches
pub const DEFAULT_MIND_MAP_ROOT: &str = "Mind Map";

const QUESTION_PREFIXES: [&str; 3] = ["FRONT:", "Q:", "QUESTION:"];
const ANSWER_PREFIXES: [&str; 3] = ["BACK:", "A:", "ANSWER:"];

/// Parse flashcards from model output.
///
/// JSON (a list, or an object with a `flashcards` key) wins when it parses.
/// Otherwise lines are scanned: marker prefixes assign fields, unmarked lines
/// fill the first empty field, and a blank line closes a card once both
/// fields are present. Incomplete cards at end of input are dropped.
pub fn parse_flashcards(text: &str) -> Vec<Flashcard> {
    if let Some(cards) = flashcards_from_json(&strip_code_fences(text)) {
        tracing::debug!("[ArtifactParser] Parsed {} flashcards from JSON", cards.len());
        return cards;
    }

    let cards = scan_flashcard_lines(text);
    tracing::debug!(
        "[ArtifactParser] Parsed {} flashcards from marker text",
        cards.len()
    );
    cards
}

/// Schema-first flashcard parsing: JSON only, every card complete
pub fn parse_flashcards_strict(text: &str) -> Result<Vec<Flashcard>, ParseError> {
    let value: Value = serde_json::from_str(&strip_code_fences(text))?;
    let cards: Vec<Flashcard> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        Value::Object(mut map) => match map.remove("flashcards") {
            Some(list) => serde_json::from_value(list)?,
            None => return Err(ParseError::Shape("missing `flashcards` key".to_string())),
        },
        other => return Err(ParseError::Shape(json_kind(&other).to_string())),
    };

    for (index, card) in cards.iter().enumerate() {
        if card.question.trim().is_empty() {
            return Err(ParseError::IncompleteCard {
                index,
                field: "question",
            });
        }
        if card.answer.trim().is_empty() {
            return Err(ParseError::IncompleteCard {
                index,
                field: "answer",
            });
        }
    }

    Ok(cards)
}

/// Write cards back out in the marker text format
pub fn serialize_flashcards(cards: &[Flashcard]) -> String {
    cards
        .iter()
        .map(|card| format!("FRONT: {}\nBACK: {}", card.question, card.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn flashcards_from_json(text: &str) -> Option<Vec<Flashcard>> {
    let value: Value = serde_json::from_str(text).ok()?;
    match value {
        Value::Array(_) => serde_json::from_value(value).ok(),
        Value::Object(mut map) => map
            .remove("flashcards")
            .and_then(|list| serde_json::from_value(list).ok()),
        _ => None,
    }
}

#[derive(Default)]
struct PendingCard {
    question: Option<String>,
    answer: Option<String>,
}

impl PendingCard {
    fn take_complete(&mut self) -> Option<Flashcard> {
        if self.question.is_some() && self.answer.is_some() {
            let card = std::mem::take(self);
            return Some(Flashcard {
                question: card.question.unwrap_or_default(),
                answer: card.answer.unwrap_or_default(),
            });
        }
        None
    }
}

fn scan_flashcard_lines(text: &str) -> Vec<Flashcard> {
    let mut cards = Vec::new();
    let mut pending = PendingCard::default();

    for line in text.trim().lines().map(str::trim) {
        if line.is_empty() {
            cards.extend(pending.take_complete());
            continue;
        }

        if let Some(value) = marker_value(line, &QUESTION_PREFIXES) {
            pending.question = Some(value);
        } else if let Some(value) = marker_value(line, &ANSWER_PREFIXES) {
            pending.answer = Some(value);
        } else if pending.question.is_none() {
            pending.question = Some(line.to_string());
        } else if pending.answer.is_none() {
            pending.answer = Some(line.to_string());
        }
    }

    cards.extend(pending.take_complete());
    cards
}

/// Text after the first `:` if the line starts with one of the prefixes
fn marker_value(line: &str, prefixes: &[&str]) -> Option<String> {
    let matched = prefixes.iter().any(|prefix| {
        line.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    });
    if !matched {
        return None;
    }
    line.split_once(':').map(|(_, rest)| rest.trim().to_string())
}

/// Parse a quiz without structural validation
pub fn parse_quiz(text: &str) -> Result<Quiz, ParseError> {
    let cleaned = strip_code_fences(text);
    match quiz_from_str(&cleaned) {
        Ok(quiz) => Ok(quiz),
        Err(first) => {
            let embedded = extract_json_object(&cleaned).ok_or(first)?;
            tracing::debug!("[ArtifactParser] Quiz JSON recovered from surrounding text");
            quiz_from_str(&embedded)
        }
    }
}

fn quiz_from_str(text: &str) -> Result<Quiz, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    let questions: Vec<QuizQuestion> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        Value::Object(mut map) => match map.remove("questions") {
            Some(list) => serde_json::from_value(list)?,
            None => return Err(ParseError::Shape("missing `questions` key".to_string())),
        },
        other => return Err(ParseError::Shape(json_kind(&other).to_string())),
    };
    Ok(Quiz { questions })
}

/// Parse a mind map tree
pub fn parse_mind_map(text: &str) -> Result<MindMapNode, ParseError> {
    let cleaned = strip_code_fences(text);
    match mind_map_from_str(&cleaned) {
        Ok(root) => Ok(root),
        Err(first) => {
            let embedded = extract_json_object(&cleaned).ok_or(first)?;
            tracing::debug!("[ArtifactParser] Mind map JSON recovered from surrounding text");
            mind_map_from_str(&embedded)
        }
    }
}

fn mind_map_from_str(text: &str) -> Result<MindMapNode, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(_) => {
            let children: Vec<MindMapNode> = serde_json::from_value(value)?;
            Ok(MindMapNode::with_children(DEFAULT_MIND_MAP_ROOT, children))
        }
        Value::Object(mut map) => {
            if !map.contains_key("name") {
                if let Some(inner) = map.remove("mindmap") {
                    return Ok(serde_json::from_value(inner)?);
                }
                return Err(ParseError::Shape("object has no `name`".to_string()));
            }
            Ok(serde_json::from_value(Value::Object(map))?)
        }
        other => Err(ParseError::Shape(json_kind(&other).to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_format() {
        let text = "FRONT: What is ATP?\nBACK: The cell's energy currency\n\nFRONT: Define osmosis\nBACK: Diffusion of water across a membrane";
        let cards = parse_flashcards(text);
        assert_eq!(
            cards,
            vec![
                Flashcard::new("What is ATP?", "The cell's energy currency"),
                Flashcard::new("Define osmosis", "Diffusion of water across a membrane"),
            ]
        );
    }

    #[test]
    fn test_round_trip_is_stable() {
        let text = "FRONT: Mitosis\nBACK: Division producing two identical cells\n\nFRONT: Meiosis\nBACK: Division producing gametes";
        let first = parse_flashcards(text);
        let second = parse_flashcards(&serialize_flashcards(&first));
        assert_eq!(first, second);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_prefixes_are_case_insensitive() {
        let cards = parse_flashcards("q: Capital of France?\nanswer: Paris");
        assert_eq!(cards, vec![Flashcard::new("Capital of France?", "Paris")]);
    }

    #[test]
    fn test_unmarked_lines_fill_first_empty_field() {
        let cards = parse_flashcards("Newton's first law\nAn object stays at rest\nextra detail ignored");
        assert_eq!(
            cards,
            vec![Flashcard::new("Newton's first law", "An object stays at rest")]
        );
    }

    #[test]
    fn test_incomplete_card_carries_over_blank_line() {
        let cards = parse_flashcards("FRONT: Term\n\nBACK: Definition");
        assert_eq!(cards, vec![Flashcard::new("Term", "Definition")]);
    }

    #[test]
    fn test_incomplete_trailing_card_dropped() {
        let cards = parse_flashcards("FRONT: One\nBACK: 1\n\nFRONT: Two");
        assert_eq!(cards, vec![Flashcard::new("One", "1")]);
    }

    #[test]
    fn test_json_list_and_object() {
        let list = r#"[{"question": "H2O?", "answer": "Water"}]"#;
        assert_eq!(parse_flashcards(list), vec![Flashcard::new("H2O?", "Water")]);

        let object = r#"{"flashcards": [{"front": "NaCl?", "back": "Salt"}]}"#;
        assert_eq!(parse_flashcards(object), vec![Flashcard::new("NaCl?", "Salt")]);
    }

    #[test]
    fn test_json_of_other_shape_falls_back_to_lines() {
        assert_eq!(parse_flashcards("42"), Vec::<Flashcard>::new());
        let cards = parse_flashcards("\"lone string\"");
        assert!(cards.is_empty());
    }

    #[test]
    fn test_strict_rejects_incomplete_cards() {
        let text = r#"[{"question": "A?", "answer": "a"}, {"question": "B?"}]"#;
        match parse_flashcards_strict(text) {
            Err(ParseError::IncompleteCard { index, field }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "answer");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(parse_flashcards_strict("FRONT: x\nBACK: y").is_err());
    }

    #[test]
    fn test_strict_accepts_fenced_json() {
        let text = "```json\n{\"flashcards\": [{\"question\": \"A?\", \"answer\": \"a\"}]}\n```";
        assert_eq!(parse_flashcards_strict(text).unwrap().len(), 1);
    }

    #[test]
    fn test_quiz_accepts_malformed_questions() {
        let text = r#"{"questions": [
            {"question": "Short?", "options": ["yes", "no"], "correct": 9, "explanation": ""}
        ]}"#;
        let quiz = parse_quiz(text).unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz.questions[0].options.len(), 2);
        assert_eq!(quiz.questions[0].correct, 9);
        assert_eq!(quiz.validate().len(), 2);
    }

    #[test]
    fn test_quiz_from_fenced_list() {
        let text = "```json\n[{\"question\": \"Q\", \"options\": [\"a\",\"b\",\"c\",\"d\"], \"correct\": 1}]\n```";
        let quiz = parse_quiz(text).unwrap();
        assert_eq!(quiz.questions[0].correct_option(), Some("b"));
        assert_eq!(quiz.questions[0].explanation, "");
    }

    #[test]
    fn test_quiz_recovered_from_prose() {
        let text = "Sure! Here is your quiz:\n{\"questions\": []}\nEnjoy.";
        assert!(parse_quiz(text).unwrap().is_empty());
    }

    #[test]
    fn test_quiz_garbage_is_an_error() {
        assert!(parse_quiz("not json at all").is_err());
        assert!(matches!(parse_quiz("{\"items\": []}"), Err(ParseError::Shape(_))));
    }

    #[test]
    fn test_mind_map_shapes() {
        let tree = r#"{"name": "Physics", "children": [{"name": "Mechanics", "children": [{"name": "Kinematics"}]}]}"#;
        let root = parse_mind_map(tree).unwrap();
        assert_eq!(root.name, "Physics");
        assert_eq!(root.depth(), 3);

        let wrapped = r#"{"mindmap": {"name": "Chemistry"}}"#;
        assert_eq!(parse_mind_map(wrapped).unwrap().name, "Chemistry");

        let branches = r#"[{"name": "A"}, {"name": "B"}]"#;
        let root = parse_mind_map(branches).unwrap();
        assert_eq!(root.name, DEFAULT_MIND_MAP_ROOT);
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_mind_map_fenced() {
        let text = "```json\n{\"name\": \"Root\", \"children\": []}\n```";
        assert_eq!(parse_mind_map(text).unwrap(), MindMapNode::leaf("Root"));
    }
}
