//! Text-generation collaborator.
//!
//! The scoring and summarizing stages only need "prompt in, text out". This
//! module provides that seam:
//! - [`TextGenerator`]: Core trait for a single generation call
//! - [`OllamaClient`]: Talks to an Ollama-compatible `/api/generate` endpoint
//! - [`PacedGenerator`]: Decorator that spaces calls through a [`RateGate`]
//!
//! There is no retry. Every failure is reported as a [`GenerationError`] and
//! the caller substitutes its own fallback.

use crate::config::LlmConfig;
use crate::pacing::RateGate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Why a generation call produced no usable text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("endpoint returned HTTP {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("response contained no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else if e.is_decode() {
            GenerationError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            GenerationError::Status(status.as_u16())
        } else {
            GenerationError::Transport(e.to_string())
        }
    }
}

/// Trait for a single prompt-to-text call.
pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Client for Ollama's non-streaming generate API.
#[derive(Debug)]
pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        }
    }

    async fn call(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(prompt))
            .send()
            .await?
            .error_for_status()?;
        let body: GenerateResponse = response.json().await?;
        extract_text(body)
    }
}

impl TextGenerator for OllamaClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let t0 = Instant::now();
        let result = self.call(prompt).await;

        let dt = t0.elapsed();
        match &result {
            Ok(text) => debug!(
                elapsed_ms = dt.as_millis() as u64,
                chars = text.chars().count(),
                "Generation succeeded"
            ),
            Err(e) => warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "Generation call failed"),
        }
        result
    }
}

fn extract_text(body: GenerateResponse) -> Result<String, GenerationError> {
    match body.response {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerationError::EmptyResponse),
    }
}

/// Wrapper that waits on a [`RateGate`] before delegating to any [`TextGenerator`].
///
/// The gate is shared, so generators built over the same gate (the scorer's
/// and the summarizer's) are spaced against each other as well.
#[derive(Debug)]
pub struct PacedGenerator<T> {
    inner: T,
    gate: Arc<RateGate>,
}

impl<T> PacedGenerator<T>
where
    T: TextGenerator,
{
    pub fn new(inner: T, gate: Arc<RateGate>) -> Self {
        Self { inner, gate }
    }
}

impl<T> TextGenerator for PacedGenerator<T>
where
    T: TextGenerator,
{
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.gate.wait().await;
        self.inner.generate(prompt).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedGenerator;
    use super::*;
    use std::time::Duration;

    fn llm_config(base_url: &str) -> LlmConfig {
        LlmConfig {
            base_url: base_url.to_string(),
            model: "llama2".to_string(),
            max_tokens: 256,
            temperature: 0.5,
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_endpoint_and_body() {
        let client = OllamaClient::new(&llm_config("http://localhost:11434/")).unwrap();
        assert_eq!(client.endpoint, "http://localhost:11434/api/generate");

        let body = serde_json::to_value(client.request_body("안녕")).unwrap();
        assert_eq!(body["model"], "llama2");
        assert_eq!(body["prompt"], "안녕");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 256);
        assert_eq!(body["options"]["temperature"], 0.5);
    }

    #[test]
    fn test_extract_text() {
        let body: GenerateResponse = serde_json::from_str(r#"{"response":"어그로 점수: 70"}"#).unwrap();
        assert_eq!(extract_text(body).unwrap(), "어그로 점수: 70");

        let body: GenerateResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(extract_text(body), Err(GenerationError::EmptyResponse));

        let body: GenerateResponse = serde_json::from_str(r#"{"response":"  "}"#).unwrap();
        assert_eq!(extract_text(body), Err(GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let client = OllamaClient::new(&llm_config("http://127.0.0.1:1")).unwrap();
        let result = client.generate("prompt").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_paced_generator_delegates() {
        let paced = PacedGenerator::new(ScriptedGenerator::replying("ok"), Arc::new(RateGate::new(Duration::ZERO)));
        assert_eq!(paced.generate("first").await.unwrap(), "ok");
        assert_eq!(paced.generate("second").await.unwrap(), "ok");
        assert_eq!(*paced.inner.prompts.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_generators_on_one_gate_are_spaced() {
        let gate = Arc::new(RateGate::new(Duration::from_millis(80)));
        let scoring = PacedGenerator::new(ScriptedGenerator::replying("a"), Arc::clone(&gate));
        let summarizing = PacedGenerator::new(ScriptedGenerator::replying("b"), Arc::clone(&gate));

        scoring.generate("last score").await.unwrap();
        let t0 = std::time::Instant::now();
        summarizing.generate("first summary").await.unwrap();
        assert!(t0.elapsed() >= Duration::from_millis(75));
    }
}
