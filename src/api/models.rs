//! API data models

use serde::{Deserialize, Serialize};

use crate::pipeline::{StudyPack, TimedLesson, Translation};
use crate::quiz::QuizQuestion;
use crate::transcript::TranscriptSegment;

fn default_num_questions() -> u32 {
    5
}

fn default_difficulty() -> String {
    "mixed".to_string()
}

/// Strict notes-and-quiz request over a raw transcript blob.
#[derive(Debug, Deserialize)]
pub struct GenerateIn {
    pub video_url: String,
    #[serde(default)]
    pub title: String,
    pub transcript: String,
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateOut {
    pub notes_markdown: String,
    pub quiz: Vec<QuizQuestion>,
    pub source_words: usize,
    pub source_language: String,
}

impl From<StudyPack> for GenerateOut {
    fn from(pack: StudyPack) -> Self {
        Self {
            notes_markdown: pack.notes_markdown,
            quiz: pack.quiz,
            source_words: pack.source_words,
            source_language: pack.source_language,
        }
    }
}

/// Timed request over ordered caption segments.
#[derive(Debug, Deserialize)]
pub struct TimedGenerateIn {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    pub transcript: Vec<TranscriptSegment>,
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

#[derive(Debug, Serialize)]
pub struct TimedGenerateOut {
    pub notes: String,
    pub questions: Vec<QuizQuestion>,
    pub source_words: usize,
    pub source_language: String,
}

impl From<TimedLesson> for TimedGenerateOut {
    fn from(lesson: TimedLesson) -> Self {
        Self {
            notes: lesson.notes,
            questions: lesson.questions,
            source_words: lesson.source_words,
            source_language: lesson.source_language,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummarizeIn {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SummarizeOut {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct ProofreadIn {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ProofreadOut {
    pub corrected_text: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateIn {
    pub text: String,
    /// e.g. Hindi, Spanish, French
    pub target_language: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateOut {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<Translation> for TranslateOut {
    fn from(t: Translation) -> Self {
        Self {
            original_text: t.original_text,
            translated_text: t.translated_text,
            source_language: t.source_language,
            target_language: t.target_language,
            note: t.note,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TranscriptOut {
    pub video_id: String,
    pub transcript: Vec<TranscriptSegment>,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub api_version: String,
    pub model: String,
    pub timestamp: String,
}

/// Uniform error body; every failure surfaces as one explanatory message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
