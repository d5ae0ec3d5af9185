//! Gemini access layer: wire client, startup model resolution, and the
//! backend trait the rest of the service is written against.

pub mod client;
pub mod resolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The (API version, model identifier) pair pinned at startup and used for
/// every generation call during the process lifetime. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelBinding {
    pub api_version: String,
    pub model: String,
}

impl ModelBinding {
    pub fn new(api_version: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            model: model.into(),
        }
    }
}

impl std::fmt::Display for ModelBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version, self.model)
    }
}

/// Remote generative-text endpoint boundary.
///
/// The HTTP implementation lives in [`client`]; tests drive the resolver and
/// pipeline with scripted in-memory implementations.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// List model identifiers the credential can use for text generation
    /// under the given API version.
    async fn list_models(&self, api_version: &str) -> Result<Vec<String>>;

    /// Minimal live generation call confirming the binding actually works.
    /// Listing alone does not guarantee the generation endpoint accepts it.
    async fn probe(&self, binding: &ModelBinding) -> bool;

    /// Single text-generation request. No retries at this level.
    async fn generate(&self, binding: &ModelBinding, prompt: &str) -> Result<String>;
}

/// Model names sometimes arrive as "models/gemini-1.5-flash"; the generation
/// URL wants the bare identifier.
pub fn strip_models_prefix(name: &str) -> String {
    name.replace("models/", "").trim().to_string()
}
