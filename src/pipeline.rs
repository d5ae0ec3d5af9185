//! Request orchestration: language preparation, notes and quiz generation,
//! and the auxiliary text operations. Everything here is sequential per
//! request and all-or-nothing; the only shared state is the read-only model
//! binding pinned at startup.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::LimitsConfig;
use crate::error::{Result, TutorError};
use crate::gemini::{GenerativeBackend, ModelBinding};
use crate::prompts;
use crate::quiz::structured::{parse_structured, Bracket};
use crate::quiz::{normalize_quiz, QuizProfile, QuizQuestion};
use crate::transcript::{char_prefix, flatten_segments, render_timed, word_count, TranscriptSegment};

/// Sentinel language name when detection fails. Detection failure must not
/// abort the request.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Text prepared for English-assuming prompts.
#[derive(Debug, Clone)]
pub struct PreparedText {
    pub text: String,
    pub language: String,
}

/// Inputs for the strict notes-and-quiz flow.
#[derive(Debug, Clone)]
pub struct StudyRequest {
    pub video_url: String,
    pub title: String,
    pub transcript: String,
    pub num_questions: u32,
    pub difficulty: String,
}

/// Result of the strict flow.
#[derive(Debug, Clone)]
pub struct StudyPack {
    pub notes_markdown: String,
    pub quiz: Vec<QuizQuestion>,
    pub source_words: usize,
    pub source_language: String,
}

/// Result of the timed (lenient) flow.
#[derive(Debug, Clone)]
pub struct TimedLesson {
    pub notes: String,
    pub questions: Vec<QuizQuestion>,
    pub source_words: usize,
    pub source_language: String,
}

/// Result of the standalone translate operation.
#[derive(Debug, Clone)]
pub struct Translation {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    /// Present when translation was skipped because the text already is in
    /// the target language.
    pub note: Option<String>,
}

/// The generation orchestrator. Holds the pinned binding and the shared
/// backend; stateless per request.
pub struct Tutor {
    backend: Arc<dyn GenerativeBackend>,
    binding: ModelBinding,
    limits: LimitsConfig,
}

impl Tutor {
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        binding: ModelBinding,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            backend,
            binding,
            limits,
        }
    }

    /// The binding resolved at startup, for operational visibility.
    pub fn binding(&self) -> &ModelBinding {
        &self.binding
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.backend.generate(&self.binding, prompt).await
    }

    /// Reject transcripts below the minimum viable length before spending
    /// any remote call.
    fn validate_transcript(&self, text: &str) -> Result<()> {
        let words = word_count(text);
        if words < self.limits.min_transcript_words {
            return Err(TutorError::InvalidInput(format!(
                "transcript too short or missing ({} words, need {})",
                words, self.limits.min_transcript_words
            )));
        }
        Ok(())
    }

    fn clamp_questions(&self, requested: u32) -> u32 {
        requested.clamp(1, self.limits.max_questions)
    }

    /// Detect the language of a text prefix. Degrades to "Unknown" on any
    /// failure rather than propagating.
    pub async fn detect_language(&self, text: &str) -> String {
        let prefix = char_prefix(text, self.limits.detect_prefix_chars);
        match self.generate(&prompts::detect_language_prompt(prefix)).await {
            Ok(language) => language.trim().to_string(),
            Err(e) => {
                warn!("Language detection failed, degrading to Unknown: {}", e);
                UNKNOWN_LANGUAGE.to_string()
            }
        }
    }

    /// Detect, then translate to English unless the text already is English.
    /// Translation failure is a hard failure; downstream generation depends
    /// on the result.
    pub async fn prepare_english_text(&self, text: &str) -> Result<PreparedText> {
        let language = self.detect_language(text).await;

        if language.to_lowercase().contains("english") {
            debug!("Detected {}, skipping translation", language);
            return Ok(PreparedText {
                text: text.to_string(),
                language,
            });
        }

        let prefix = char_prefix(text, self.limits.translate_prefix_chars);
        let translated = self
            .generate(&prompts::translate_to_english_prompt(&language, prefix))
            .await?;

        Ok(PreparedText {
            text: translated.trim().to_string(),
            language,
        })
    }

    /// Generate the quiz: one generation call, tiered parsing, and at most
    /// one model-assisted repair call when the output is unparseable. Never
    /// a loop.
    async fn quiz_with_repair(&self, prompt: &str, profile: QuizProfile) -> Result<Vec<QuizQuestion>> {
        let raw = self.generate(prompt).await?;
        let raw = raw.trim();

        let parsed = match parse_structured(raw, Bracket::Array) {
            Some(value) => value,
            None => {
                warn!("Malformed quiz JSON, requesting one repair");
                let fixed = self.generate(&prompts::repair_json_prompt(raw)).await?;
                parse_structured(&fixed, Bracket::Array).ok_or_else(|| {
                    TutorError::QuizGeneration(
                        "quiz JSON could not be fixed even after retry".to_string(),
                    )
                })?
            }
        };

        let quiz = normalize_quiz(&parsed, profile);
        if quiz.is_empty() {
            return Err(TutorError::QuizGeneration(
                "no valid questions found after parse and repair".to_string(),
            ));
        }

        Ok(quiz)
    }

    /// Strict flow: markdown notes plus a quiz of exactly-4-option questions.
    pub async fn generate_study_pack(&self, request: &StudyRequest) -> Result<StudyPack> {
        self.validate_transcript(&request.transcript)?;

        let prepared = self.prepare_english_text(&request.transcript).await?;
        let num_questions = self.clamp_questions(request.num_questions);

        let header = prompts::header(
            &request.title,
            &request.video_url,
            num_questions,
            &request.difficulty,
        );

        let notes = self
            .generate(&prompts::notes_prompt(&header, &prepared.text))
            .await?
            .trim()
            .to_string();

        let quiz = self
            .quiz_with_repair(
                &prompts::quiz_prompt(&header, num_questions, &prepared.text),
                QuizProfile::Strict,
            )
            .await?;

        info!(
            "Study pack generated: {} questions, {} source words",
            quiz.len(),
            word_count(&prepared.text)
        );

        Ok(StudyPack {
            notes_markdown: notes,
            quiz,
            source_words: word_count(&prepared.text),
            source_language: prepared.language,
        })
    }

    /// Lenient flow over time-stamped segments: questions carry anchor
    /// times and keep whatever option count the model produced.
    pub async fn generate_timed_lesson(
        &self,
        video_id: &str,
        title: &str,
        segments: &[TranscriptSegment],
        num_questions: u32,
        difficulty: &str,
    ) -> Result<TimedLesson> {
        let flat = flatten_segments(segments);
        self.validate_transcript(&flat)?;

        let prepared = self.prepare_english_text(&flat).await?;
        let num_questions = self.clamp_questions(num_questions);

        let header = prompts::header(title, video_id, num_questions, difficulty);

        let notes = self
            .generate(&prompts::notes_prompt(&header, &prepared.text))
            .await?
            .trim()
            .to_string();

        // The timed quiz prompt sees the original offsets, not the flattened
        // translation, so anchors refer to real transcript seconds.
        let questions = self
            .quiz_with_repair(
                &prompts::timed_quiz_prompt(&header, num_questions, &render_timed(segments)),
                QuizProfile::Lenient,
            )
            .await?;

        Ok(TimedLesson {
            notes,
            questions,
            source_words: word_count(&prepared.text),
            source_language: prepared.language,
        })
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        Ok(self
            .generate(&prompts::summarize_prompt(text))
            .await?
            .trim()
            .to_string())
    }

    pub async fn proofread(&self, text: &str) -> Result<String> {
        Ok(self
            .generate(&prompts::proofread_prompt(text))
            .await?
            .trim()
            .to_string())
    }

    /// Standalone translation toward a caller-specified target language.
    pub async fn translate(&self, text: &str, target_language: &str) -> Result<Translation> {
        let detected = self.detect_language(text).await;

        if detected
            .to_lowercase()
            .contains(&target_language.to_lowercase())
        {
            return Ok(Translation {
                original_text: text.to_string(),
                translated_text: text.to_string(),
                source_language: detected,
                target_language: target_language.to_string(),
                note: Some("Skipped translation (already target language)".to_string()),
            });
        }

        let translated = self
            .generate(&prompts::translate_prompt(&detected, target_language, text))
            .await?;

        Ok(Translation {
            original_text: text.to_string(),
            translated_text: translated.trim().to_string(),
            source_language: detected,
            target_language: target_language.to_string(),
            note: None,
        })
    }
}
