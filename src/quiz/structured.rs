//! Coercing free-form model output into valid JSON.
//!
//! LLM completions are not guaranteed well-formed JSON even when explicitly
//! instructed, so parsing degrades in tiers: strict parse, then heuristic
//! extraction (drop code fences, slice the outer bracket pair), then strict
//! parse of the extracted slice. Unparseable text yields `None`, never an
//! error; the one model-assisted repair attempt lives in the pipeline.

use serde_json::Value;

/// Which outer bracket pair the expected payload uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// A JSON array, `[` .. `]`. The usual quiz shape.
    Array,
    /// A JSON object, `{` .. `}`.
    Object,
}

impl Bracket {
    fn open(self) -> char {
        match self {
            Bracket::Array => '[',
            Bracket::Object => '{',
        }
    }

    fn close(self) -> char {
        match self {
            Bracket::Array => ']',
            Bracket::Object => '}',
        }
    }
}

/// Strip Markdown code-fence markers and slice from the first opening bracket
/// to the last closing one. Assumes a single payload of the given shape; if
/// no bracket pair is found the cleaned text is returned as-is.
pub fn extract_json_block(text: &str, bracket: Bracket) -> String {
    let cleaned = text
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string();

    let start = cleaned.find(bracket.open());
    let end = cleaned.rfind(bracket.close());

    match (start, end) {
        (Some(start), Some(end)) if start < end => cleaned[start..=end].to_string(),
        _ => cleaned,
    }
}

/// Parse raw model text expected to contain a single JSON payload.
///
/// Returns `None` when every parse attempt fails; the caller decides whether
/// to spend the one repair call.
pub fn parse_structured(raw: &str, bracket: Bracket) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }

    let extracted = extract_json_block(raw, bracket);
    match serde_json::from_str(&extracted) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Could not parse JSON even after cleaning");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_json_parses_directly() {
        let raw = r#"[{"question": "Q?", "options": ["a","b","c","d"], "correct_index": 1}]"#;
        let value = parse_structured(raw, Bracket::Array).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_fenced_array_with_prose_is_recovered() {
        let raw = "Sure! Here is your quiz:\n```json\n[{\"question\": \"Q?\"}]\n```\nLet me know if you need more.";
        let value = parse_structured(raw, Bracket::Array).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["question"], "Q?");
    }

    #[test]
    fn test_trailing_prose_after_array_is_dropped() {
        let raw = "[1, 2, 3] and that concludes the quiz";
        let value = parse_structured(raw, Bracket::Array).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_object_bracket_mode() {
        let raw = "```\n{\"summary\": \"short\"}\n```";
        let value = parse_structured(raw, Bracket::Object).unwrap();
        assert_eq!(value["summary"], "short");
    }

    #[test]
    fn test_garbage_without_brackets_returns_none() {
        assert!(parse_structured("I'm sorry, I cannot do that.", Bracket::Array).is_none());
    }

    #[test]
    fn test_mismatched_brackets_return_none() {
        assert!(parse_structured("here ] comes [ nothing", Bracket::Array).is_none());
    }

    #[test]
    fn test_extract_prefers_outermost_pair() {
        let raw = "noise [ [1], [2] ] noise";
        assert_eq!(extract_json_block(raw, Bracket::Array), "[ [1], [2] ]");
    }
}
