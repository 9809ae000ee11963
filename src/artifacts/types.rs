//! Typed records for generated study artifacts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerated artifact type selected for an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Summarize,
    Notes,
    Mcq,
    Flashcards,
    Mindmap,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        Self::Summarize,
        Self::Mcq,
        Self::Notes,
        Self::Flashcards,
        Self::Mindmap,
    ];

    /// Form value used by the upload selector
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Notes => "notes",
            Self::Mcq => "mcq",
            Self::Flashcards => "flashcards",
            Self::Mindmap => "mindmap",
        }
    }

    /// Parse a form value; anything outside the fixed set is rejected
    pub fn from_form_value(value: &str) -> Option<Self> {
        match value {
            "summarize" => Some(Self::Summarize),
            "notes" => Some(Self::Notes),
            "mcq" => Some(Self::Mcq),
            "flashcards" => Some(Self::Flashcards),
            "mindmap" => Some(Self::Mindmap),
            _ => None,
        }
    }

    /// Display title, also used in output keys and slide footers
    pub fn title(&self) -> &'static str {
        match self {
            Self::Summarize => "Summary",
            Self::Notes => "Notes",
            Self::Mcq => "MCQ Quiz",
            Self::Flashcards => "Flash Cards",
            Self::Mindmap => "Mind Map",
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        match self {
            Self::Summarize | Self::Notes => OutputFormat::Pdf,
            Self::Mcq | Self::Mindmap => OutputFormat::Json,
            Self::Flashcards => OutputFormat::Text,
        }
    }

    /// Summary and notes are rendered into paginated documents
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Summarize | Self::Notes)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File format an artifact is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Json,
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Json => "application/json",
            Self::Text => "text/plain",
        }
    }
}

/// One question/answer study card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(default, alias = "front")]
    pub question: String,
    #[serde(default, alias = "back")]
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A multiple choice question as returned by the model.
/// Nothing here is checked on the way in; see [`Quiz::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Index into `options`, unchecked
    #[serde(default)]
    pub correct: i64,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    pub fn correct_option(&self) -> Option<&str> {
        usize::try_from(self.correct)
            .ok()
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

/// Structural problem in a quiz, reported but never enforced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizIssue {
    OptionCount { index: usize, found: usize },
    CorrectOutOfRange { index: usize, correct: i64 },
}

impl fmt::Display for QuizIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OptionCount { index, found } => {
                write!(f, "question {} has {} options, expected 4", index + 1, found)
            }
            Self::CorrectOutOfRange { index, correct } => {
                write!(f, "question {} marks option {} as correct", index + 1, correct)
            }
        }
    }
}

/// Number of options the quiz prompt asks for
pub const QUIZ_OPTION_COUNT: usize = 4;

impl Quiz {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// List structural issues without rejecting the quiz
    pub fn validate(&self) -> Vec<QuizIssue> {
        let mut issues = Vec::new();
        for (index, q) in self.questions.iter().enumerate() {
            if q.options.len() != QUIZ_OPTION_COUNT {
                issues.push(QuizIssue::OptionCount {
                    index,
                    found: q.options.len(),
                });
            }
            if q.correct_option().is_none() {
                issues.push(QuizIssue::CorrectOutOfRange {
                    index,
                    correct: q.correct,
                });
            }
        }
        issues
    }
}

/// Mind map node; depth and fan-out are unbounded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapNode {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MindMapNode>,
}

impl MindMapNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<MindMapNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Levels in the tree, counting this node as 1
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_form_values() {
        for kind in ArtifactKind::ALL {
            assert_eq!(ArtifactKind::from_form_value(kind.as_str()), Some(kind));
        }
        assert_eq!(ArtifactKind::from_form_value("essay"), None);
        assert_eq!(ArtifactKind::from_form_value("MCQ"), None);
    }

    #[test]
    fn test_kind_output_formats() {
        assert_eq!(ArtifactKind::Summarize.output_format(), OutputFormat::Pdf);
        assert_eq!(ArtifactKind::Notes.output_format(), OutputFormat::Pdf);
        assert_eq!(ArtifactKind::Mcq.output_format(), OutputFormat::Json);
        assert_eq!(ArtifactKind::Mindmap.output_format(), OutputFormat::Json);
        assert_eq!(ArtifactKind::Flashcards.output_format(), OutputFormat::Text);
        assert_eq!(ArtifactKind::Mcq.title(), "MCQ Quiz");
    }

    #[test]
    fn test_quiz_validate_reports_without_rejecting() {
        let quiz = Quiz {
            questions: vec![
                QuizQuestion {
                    question: "Q1".into(),
                    options: vec!["a".into(), "b".into()],
                    correct: 7,
                    explanation: String::new(),
                },
                QuizQuestion {
                    question: "Q2".into(),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct: 3,
                    explanation: String::new(),
                },
            ],
        };
        let issues = quiz.validate();
        assert_eq!(
            issues,
            vec![
                QuizIssue::OptionCount { index: 0, found: 2 },
                QuizIssue::CorrectOutOfRange { index: 0, correct: 7 },
            ]
        );
        assert_eq!(quiz.questions[1].correct_option(), Some("d"));
    }

    #[test]
    fn test_mind_map_metrics() {
        let map = MindMapNode::with_children(
            "Biology",
            vec![
                MindMapNode::with_children("Cells", vec![MindMapNode::leaf("Organelles")]),
                MindMapNode::leaf("Genetics"),
            ],
        );
        assert_eq!(map.depth(), 3);
        assert_eq!(map.node_count(), 4);
    }
}
