//! Lecture Tutor - Rust Implementation
//!
//! Turns lecture/video transcripts into structured study notes and
//! multiple-choice quizzes through the Gemini generative-text endpoint,
//! with auxiliary summarize/proofread/translate operations and a
//! transcript auto-fetch helper.

pub mod api;
pub mod config;
pub mod error;
pub mod gemini;
pub mod pipeline;
pub mod prompts;
pub mod quiz;
pub mod transcript;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::error::TutorError;
pub use crate::gemini::client::HttpGeminiClient;
pub use crate::gemini::{GenerativeBackend, ModelBinding};
pub use crate::pipeline::{StudyPack, StudyRequest, TimedLesson, Translation, Tutor};
pub use crate::quiz::{QuizProfile, QuizQuestion};
pub use crate::transcript::{TranscriptFetcher, TranscriptSegment};
