use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the Lecture Tutor service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Gemini endpoint settings
    pub gemini: GeminiConfig,

    /// Input and prompt size limits
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind the HTTP server on
    pub port: u16,

    /// Allowed CORS origins ("*" allows any)
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Operator-preferred model, probed first when available
    pub preferred_model: String,

    /// Request timeout in seconds for every remote call
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Minimum viable transcript length in words
    pub min_transcript_words: usize,

    /// Upper bound on requested quiz questions
    pub max_questions: u32,

    /// Character prefix sent to the language-detection prompt
    pub detect_prefix_chars: usize,

    /// Character prefix sent to the translation prompt
    pub translate_prefix_chars: usize,
}

impl Config {
    /// Load configuration from file, falling back to env overrides on defaults
    pub fn load() -> Result<Self> {
        let config_paths = [
            "lecture-tutor.toml",
            "config/lecture-tutor.toml",
            "/etc/lecture-tutor/config.toml",
        ];

        for path in &config_paths {
            if let Some(config) = Self::load_from_path(path) {
                return Ok(config.with_env_overrides());
            }
        }

        Ok(Self::default().with_env_overrides())
    }

    /// Read and parse one candidate config file. An unreadable or
    /// unparseable file yields `None` so the next path gets a chance.
    fn load_from_path(path: &str) -> Option<Self> {
        let config_str = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Config>(&config_str) {
            Ok(config) => {
                tracing::info!("Loaded configuration from: {}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file {}: {}", path, e);
                None
            }
        }
    }

    /// Apply environment-variable overrides on top of the current values.
    /// The API credential is deliberately not part of this struct; it is
    /// read separately via [`Config::api_key_from_env`].
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("LECTURE_TUTOR_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
            self.server.allowed_origins =
                origins.split(',').map(|o| o.trim().to_string()).collect();
        }

        if let Ok(model) = std::env::var("MODEL_NAME") {
            let model = model.trim();
            if !model.is_empty() {
                self.gemini.preferred_model = model.to_string();
            }
        }

        if let Ok(timeout) = std::env::var("LECTURE_TUTOR_TIMEOUT") {
            if let Ok(timeout) = timeout.parse() {
                self.gemini.timeout_seconds = timeout;
            }
        }

        self
    }

    /// Read the Gemini credential from the environment. Absence is fatal:
    /// the process must not start serving without it.
    pub fn api_key_from_env() -> Result<String> {
        std::env::var("GOOGLE_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .map_err(|_| anyhow!("GOOGLE_API_KEY (or GEMINI_API_KEY) missing"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_questions == 0 {
            return Err(anyhow!("max_questions must be greater than 0"));
        }

        if self.limits.min_transcript_words == 0 {
            return Err(anyhow!("min_transcript_words must be greater than 0"));
        }

        if self.gemini.timeout_seconds == 0 {
            return Err(anyhow!("timeout_seconds must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8000,
                allowed_origins: vec!["*".to_string()],
            },
            gemini: GeminiConfig {
                preferred_model: "gemini-1.5-flash".to_string(),
                timeout_seconds: 40,
            },
            limits: LimitsConfig {
                min_transcript_words: 50,
                max_questions: 12,
                detect_prefix_chars: 800,
                translate_prefix_chars: 4000,
            },
        }
    }
}
