//! Quiz shapes: normalization of raw model output into canonical questions,
//! and the two validation profiles the endpoints apply.

pub mod structured;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Canonical multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
    /// Anchor time in seconds, present for timed lessons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
}

/// Validation profile applied after normalization.
///
/// The two entry points evolved independently and keep distinct rules:
/// the plain generate flow demands exactly 4 options with an in-bounds
/// answer index, the timed flow accepts whatever option count the model
/// produced and never checks the index. The timed consumer would render
/// even a single-choice entry, but one button is not a question, so
/// lenient still enforces a floor of two options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizProfile {
    Strict,
    Lenient,
}

/// Option items arrive either as plain strings or as `{"text": ...}`
/// objects depending on model mood; both map to the bare text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOption {
    Text(String),
    Labeled { text: String },
}

impl RawOption {
    fn into_text(self) -> String {
        match self {
            RawOption::Text(text) => text,
            RawOption::Labeled { text } => text,
        }
    }
}

/// The union of field spellings the two prompt families produce.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(alias = "prompt")]
    question: Option<String>,
    #[serde(alias = "choices")]
    options: Option<Vec<RawOption>>,
    #[serde(alias = "answer_index")]
    correct_index: Option<i64>,
    explanation: Option<String>,
    start: Option<f64>,
}

/// Map a parsed JSON array of raw entries to canonical questions, dropping
/// every entry that fails the profile's shape check. Never fails: an empty
/// result is the caller's signal that the quiz is unusable.
pub fn normalize_quiz(value: &Value, profile: QuizProfile) -> Vec<QuizQuestion> {
    let entries = match value.as_array() {
        Some(entries) => entries,
        None => return Vec::new(),
    };

    let mut questions = Vec::new();

    for entry in entries {
        let raw: RawQuestion = match serde_json::from_value(entry.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Dropping unreadable quiz entry: {}", e);
                continue;
            }
        };

        let options: Vec<String> = raw
            .options
            .unwrap_or_default()
            .into_iter()
            .map(RawOption::into_text)
            .collect();

        let correct_index = raw.correct_index.unwrap_or(0).max(0) as usize;

        let keep = match profile {
            QuizProfile::Strict => options.len() == 4 && correct_index < options.len(),
            QuizProfile::Lenient => options.len() >= 2,
        };

        if !keep {
            debug!("Dropping quiz entry with {} options", options.len());
            continue;
        }

        questions.push(QuizQuestion {
            id: format!("q{}", questions.len() + 1),
            question: raw.question.unwrap_or_default().trim().to_string(),
            options,
            correct_index,
            explanation: raw.explanation.unwrap_or_default().trim().to_string(),
            start: raw.start,
        });
    }

    questions
}
