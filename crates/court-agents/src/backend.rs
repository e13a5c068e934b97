//! Remote completion backends.
//!
//! A backend performs exactly one request per call and reports raw failures;
//! classification and retry live in [`crate::adjudicator`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::CourtConfig;

/// Raw failure of a single backend request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("API key configuration missing")]
    MissingCredentials,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),
}

/// One request carrying fixed system framing plus a user prompt.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the response text, which may be empty.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, BackendError>;
}

/// Gemini `generateContent` over HTTPS.
pub struct GeminiBackend {
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(config: &CourtConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, BackendError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(BackendError::MissingCredentials)?;

        let request_body = serde_json::json!({
            "systemInstruction": {
                "parts": [{ "text": system }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": self.temperature
            }
        });

        debug!(model = %self.model, "Calling generateContent");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let resp_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(extract_text(&resp_json))
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(resp_json: &serde_json::Value) -> String {
    resp_json["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}
