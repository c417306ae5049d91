// src/services/gemini.rs

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use url::Url;

use crate::config::Config;

/// Decoding parameters for one generation request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Tuned for bounded, mostly deterministic question authoring.
    pub fn exam() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }

    /// Low temperature: structured JSON output is wanted, not creativity.
    pub fn extraction() -> Self {
        Self {
            temperature: 0.2,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

/// Failures of the generative endpoint, kept separate from `AppError` so
/// the generator can decide to fall back instead of surfacing them.
#[derive(Debug)]
pub enum GeminiError {
    /// No API key configured; the remote path is unavailable.
    NotConfigured,
    /// Transport-level failure (DNS, connect, timeout, body read).
    Request(String),
    /// Non-2xx reply from the endpoint.
    Upstream { status: u16, message: String },
    /// 2xx reply whose envelope carries no generated text.
    EmptyResponse,
}

impl fmt::Display for GeminiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeminiError::NotConfigured => write!(f, "GEMINI_API_KEY is not configured"),
            GeminiError::Request(msg) => write!(f, "Gemini API request failed: {}", msg),
            GeminiError::Upstream { status, message } => {
                write!(f, "Gemini API error: {} - {}", status, message)
            }
            GeminiError::EmptyResponse => write!(f, "No content generated from Gemini API"),
        }
    }
}

impl std::error::Error for GeminiError {}

/// Thin client for the generateContent endpoint. Both generation paths
/// (exam questions, syllabus topics) go through here with different
/// prompts and decoding parameters.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            api_url: config.gemini_api_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one prompt and returns the generated text from
    /// `candidates[0].content.parts[0].text`.
    pub async fn generate_content(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GeminiError> {
        let url = self.endpoint_url()?;

        let body = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ],
            "generationConfig": {
                "temperature": config.temperature,
                "topK": config.top_k,
                "topP": config.top_p,
                "maxOutputTokens": config.max_output_tokens,
            }
        });

        let response = self
            .http
            .post(url)
            .json(&body)
            .timeout(Duration::from_secs(120))
            .send()
            .await
            .map_err(|e| GeminiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body: Value = response.json().await.unwrap_or(Value::Null);
            let message = error_body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            return Err(GeminiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| GeminiError::Request(e.to_string()))?;

        envelope
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or(GeminiError::EmptyResponse)
    }

    /// `{base}/models/{model}:generateContent?key={api_key}`.
    /// The key travels as a query-string parameter, matching the endpoint's
    /// authentication scheme.
    fn endpoint_url(&self) -> Result<Url, GeminiError> {
        let key = self.api_key.as_deref().ok_or(GeminiError::NotConfigured)?;
        let raw = format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        );
        Url::parse_with_params(&raw, [("key", key)])
            .map_err(|e| GeminiError::Request(e.to_string()))
    }
}
