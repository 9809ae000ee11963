//! Helpers for pulling JSON out of model responses

use once_cell::sync::Lazy;
use regex::Regex;

static JSON_FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json\s*").expect("valid fence regex"));
static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\s*$").expect("valid fence regex"));

/// Remove every "```json" marker and a trailing "```" marker, then trim.
///
/// This is the only cleaning quiz and mind map payloads get before being
/// handed to a viewer. A bare opening "```" is left in place.
pub fn strip_code_fences(text: &str) -> String {
    let without_open = JSON_FENCE_OPEN.replace_all(text, "");
    FENCE_CLOSE.replace(&without_open, "").trim().to_string()
}

/// Extract a JSON object from a response that might contain markdown or other text
///
/// Handles:
/// - ```json code blocks
/// - Plain ``` code blocks
/// - Raw JSON objects embedded in prose
pub fn extract_json_object(text: &str) -> Option<String> {
    if let Some(start) = text.find("```json") {
        let json_start = start + 7;
        if let Some(end) = text[json_start..].find("```") {
            return Some(text[json_start..json_start + end].trim().to_string());
        }
    }

    if let Some(start) = text.find("```") {
        let block_start = start + 3;
        let content_start = text[block_start..]
            .find('\n')
            .map(|i| block_start + i + 1)
            .unwrap_or(block_start);
        if let Some(end) = text[content_start..].find("```") {
            return Some(text[content_start..content_start + end].trim().to_string());
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| text[start..=end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        let text = "```json\n{\"name\": \"Root\"}\n```\n";
        assert_eq!(strip_code_fences(text), "{\"name\": \"Root\"}");
    }

    #[test]
    fn test_strip_code_fences_leaves_clean_json() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fences_keeps_plain_opening_fence() {
        assert_eq!(strip_code_fences("```\n[1]\n```"), "```\n[1]");
    }

    #[test]
    fn test_extract_json_object_from_code_block() {
        let text = "Here you go:\n```json\n{\"questions\": []}\n```\nGood luck!";
        assert_eq!(extract_json_object(text).unwrap(), "{\"questions\": []}");
    }

    #[test]
    fn test_extract_json_object_from_plain_block() {
        let text = "```\n{\"name\": \"x\"}\n```";
        assert_eq!(extract_json_object(text).unwrap(), "{\"name\": \"x\"}");
    }

    #[test]
    fn test_extract_json_object_raw() {
        let text = r#"Result: {"name": "test"} done"#;
        assert_eq!(extract_json_object(text).unwrap(), r#"{"name": "test"}"#);
    }

    #[test]
    fn test_no_json_returns_none() {
        assert!(extract_json_object("No JSON here!").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }
}
