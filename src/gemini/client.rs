use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{strip_models_prefix, GenerativeBackend, ModelBinding};
use crate::error::{Result, TutorError};

const API_BASE: &str = "https://generativelanguage.googleapis.com";

/// HTTP client for the Gemini generative-language endpoint.
///
/// One long-lived instance per process; safe for concurrent use and holds no
/// per-request state beyond the pooled connections.
pub struct HttpGeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    name: String,
    #[serde(rename = "supportedGenerationMethods", default)]
    supported_generation_methods: Vec<String>,
}

impl HttpGeminiClient {
    pub fn new(api_key: String, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: API_BASE.to_string(),
        })
    }

    fn generate_url(&self, binding: &ModelBinding) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url,
            binding.api_version,
            strip_models_prefix(&binding.model)
        )
    }

    async fn post_generate(&self, binding: &ModelBinding, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!("Sending generateContent request to {}", binding);

        let response = self
            .client
            .post(self.generate_url(binding))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::remote(status.as_u16(), &body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TutorError::MalformedResponse(e.to_string()))?;

        parsed
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|mut c| if c.parts.is_empty() { None } else { Some(c.parts.remove(0)) })
            .map(|p| p.text)
            .ok_or_else(|| {
                TutorError::MalformedResponse("no candidate text in response".to_string())
            })
    }
}

#[async_trait]
impl GenerativeBackend for HttpGeminiClient {
    async fn list_models(&self, api_version: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}/models", self.base_url, api_version);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::remote(status.as_u16(), &body));
        }

        let parsed: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| TutorError::MalformedResponse(e.to_string()))?;

        Ok(parsed
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .map(|m| strip_models_prefix(&m.name))
            .collect())
    }

    async fn probe(&self, binding: &ModelBinding) -> bool {
        match self.post_generate(binding, "ping").await {
            Ok(_) => true,
            Err(e) => {
                warn!("Probe {} failed: {}", binding, e);
                false
            }
        }
    }

    async fn generate(&self, binding: &ModelBinding, prompt: &str) -> Result<String> {
        self.post_generate(binding, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_strips_models_prefix() {
        let client = HttpGeminiClient::new("test-key".to_string(), 40).unwrap();
        let binding = ModelBinding::new("v1", "models/gemini-1.5-flash");
        assert_eq!(
            client.generate_url(&binding),
            "https://generativelanguage.googleapis.com/v1/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_response_shape_extracts_first_candidate_text() {
        let raw = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "pong"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .candidates
            .and_then(|mut c| Some(c.remove(0)))
            .and_then(|c| c.content)
            .map(|mut c| c.parts.remove(0).text);
        assert_eq!(text.as_deref(), Some("pong"));
    }

    #[test]
    fn test_list_models_filters_generation_support() {
        let raw = r#"{
            "models": [
                {"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent"]},
                {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]}
            ]
        }"#;
        let parsed: ListModelsResponse = serde_json::from_str(raw).unwrap();
        let usable: Vec<String> = parsed
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|x| x == "generateContent")
            })
            .map(|m| strip_models_prefix(&m.name))
            .collect();
        assert_eq!(usable, vec!["gemini-1.5-flash"]);
    }
}
