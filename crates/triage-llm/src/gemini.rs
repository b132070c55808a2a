//! Gemini generation backend.
//!
//! Requires the `api` feature and a Gemini API key.

use crate::generate::{Generation, GenerationBackend, GenerationOutcome};
use crate::prompt::answer_prompt;
use crate::service::{ServiceError, ServiceResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
const TIMEOUT_SECS: u32 = 30;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// HTTP client for the Gemini generateContent API.
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(u64::from(TIMEOUT_SECS)))
            .build()
            .map_err(|e| ServiceError::ConnectionFailed(e.to_string()))?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        })
    }

    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> ServiceResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ServiceError::MissingApiKey("GEMINI_API_KEY"))?;
        Self::new(&api_key)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, query: &str, context: &str) -> ServiceResult<Generation> {
        let started = Instant::now();
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: answer_prompt(query, context),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                top_p: 0.95,
                top_k: 40,
                max_output_tokens: 1024,
            },
        };

        let url = format!(
            "{GEMINI_API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ServiceError::ConnectionFailed("cannot connect to Gemini API".to_string())
                } else if e.is_timeout() {
                    ServiceError::Timeout(TIMEOUT_SECS)
                } else {
                    ServiceError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ServiceError::AuthenticationFailed);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimited(60));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::ApiError(format!("{status}: {body}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| ServiceError::InvalidResponse("no candidates in response".to_string()))?;

        tracing::debug!(latency_ms, "generation call complete");

        Ok(Generation {
            outcome: GenerationOutcome::parse(text),
            latency_ms,
        })
    }
}
