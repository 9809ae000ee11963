use crate::artifacts::ArtifactKind;
use crate::extract::truncate_chars;

/// Instruction for summaries
pub const SUMMARY_PROMPT: &str = "Summarize into concise bullet points with clear headings:";

/// Instruction for study notes
pub const NOTES_PROMPT: &str =
    "Convert into well-structured study notes with sections, subheadings, terms, and brief definitions:";

/// Instruction for multiple choice quizzes
pub const QUIZ_PROMPT: &str = r#"Create 15 multiple choice questions from the following content. Return ONLY valid JSON (no markdown, no backticks) in this exact format:
{
  "questions": [
    {
      "question": "What is the main concept?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correct": 0,
      "explanation": "Brief explanation of why this is correct"
    }
  ]
}

Rules:
- Create 15 questions total
- Each question must have exactly 4 options
- 'correct' is the index (0-3) of the correct answer
- Include brief explanation for each answer
- Mix easy, medium, and hard difficulty questions
- Cover different aspects of the content"#;

/// Instruction for flashcards in the FRONT/BACK marker format
pub const FLASHCARD_PROMPT: &str = r#"Create 15-20 flashcards from the following content. Format each flashcard as:
FRONT: [Question/Term/Concept]
BACK: [Answer/Definition/Explanation]

Make the flashcards concise, clear, and focused on key concepts. Include important terms, definitions, formulas, and key facts."#;

/// Instruction for hierarchical mind maps
pub const MIND_MAP_PROMPT: &str = r#"Create a comprehensive hierarchical mind map structure from the following content. Return ONLY valid JSON (no markdown, no backticks, no explanation) in this exact format:
{
  "name": "Central Topic",
  "children": [
    {
      "name": "Main Branch 1",
      "children": [
        {
          "name": "Sub-topic 1.1",
          "children": [
            {
              "name": "Detail 1.1.1",
              "children": [
                {"name": "Concept 1.1.1.1"},
                {"name": "Concept 1.1.1.2"}
              ]
            }
          ]
        },
        {"name": "Sub-topic 1.2"}
      ]
    },
    {"name": "Main Branch 2"}
  ]
}

Rules:
- Keep names concise (max 60 characters per node)
- Create 4-6 main branches from central topic
- Each main branch should have 3-5 sub-topics
- Continue breaking down complex concepts up to 7 levels deep
- Go deeper for complex topics - aim for 5-7 levels where content supports it
- Use shorter phrases for deeper levels
- Focus on key concepts, definitions, examples, and relationships
- Ensure comprehensive coverage of the content"#;

/// Build the full prompt for an artifact kind.
/// Document text beyond `char_limit` characters is dropped.
pub fn build_prompt(kind: ArtifactKind, text: &str, char_limit: usize) -> String {
    let content = truncate_chars(text, char_limit);

    match kind {
        ArtifactKind::Summarize => format!("{}\n\n{}", SUMMARY_PROMPT, content),
        ArtifactKind::Notes => format!("{}\n\n{}", NOTES_PROMPT, content),
        ArtifactKind::Flashcards => format!("{}\n\n{}", FLASHCARD_PROMPT, content),
        ArtifactKind::Mcq => format!("{}\n\nContent:\n{}", QUIZ_PROMPT, content),
        ArtifactKind::Mindmap => format!("{}\n\nContent:\n{}", MIND_MAP_PROMPT, content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_kind_gets_its_instruction() {
        let text = "Mitochondria produce ATP.";
        assert!(build_prompt(ArtifactKind::Summarize, text, 100).starts_with("Summarize into"));
        assert!(build_prompt(ArtifactKind::Notes, text, 100).contains("study notes"));
        assert!(build_prompt(ArtifactKind::Mcq, text, 100).contains("exactly 4 options"));
        assert!(build_prompt(ArtifactKind::Flashcards, text, 100).contains("FRONT:"));
        assert!(build_prompt(ArtifactKind::Mindmap, text, 100).contains("7 levels deep"));

        for kind in ArtifactKind::ALL {
            assert!(build_prompt(kind, text, 100).ends_with(text));
        }
    }

    #[test]
    fn test_document_text_is_truncated() {
        let text = "é".repeat(50);
        let prompt = build_prompt(ArtifactKind::Notes, &text, 10);
        assert!(prompt.ends_with(&"é".repeat(10)));
        assert!(!prompt.contains(&"é".repeat(11)));
    }
}
