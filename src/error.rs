//! Error taxonomy for the tutor service.
//!
//! A closed set of failure kinds; the API boundary is the only place that
//! turns these into user-facing responses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TutorError {
    /// Startup-only: missing credential or no usable model binding.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The generation endpoint answered with a non-success status.
    #[error("upstream generation error ({status}): {body}")]
    RemoteGeneration { status: u16, body: String },

    /// The call succeeded transport-wise but the expected text field was absent.
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),

    /// Structured quiz parse failed even after the single repair attempt,
    /// or no entry survived shape validation.
    #[error("quiz generation failed: {0}")]
    QuizGeneration(String),

    /// Caller-supplied input rejected before any remote call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No transcript could be recovered for the requested video.
    #[error("transcript not found for video '{0}'")]
    TranscriptNotFound(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl TutorError {
    /// Truncate an upstream body to a loggable excerpt.
    pub fn remote(status: u16, body: &str) -> Self {
        let excerpt: String = body.chars().take(180).collect();
        TutorError::RemoteGeneration {
            status,
            body: excerpt,
        }
    }
}

pub type Result<T> = std::result::Result<T, TutorError>;
