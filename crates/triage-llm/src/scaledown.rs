//! ScaleDown compression backend.
//!
//! Requires the `api` feature and a ScaleDown API key.

use crate::compress::{Compressor, Condensed};
use crate::service::{ServiceError, ServiceResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const SCALEDOWN_API_URL: &str = "https://api.scaledown.xyz/compress/raw/";
const DEFAULT_TARGET_MODEL: &str = "gemini-2.5-flash";
const TIMEOUT_SECS: u32 = 30;

#[derive(Debug, Serialize)]
struct CompressRequest<'a> {
    text: &'a str,
    target_model: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompressResponse {
    compressed_text: String,
    #[serde(default)]
    original_tokens: Option<u32>,
    #[serde(default)]
    compressed_tokens: Option<u32>,
}

/// HTTP client for the ScaleDown compression API.
pub struct ScaleDownClient {
    api_key: String,
    target_model: String,
    client: reqwest::Client,
}

impl ScaleDownClient {
    pub fn new(api_key: &str) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(u64::from(TIMEOUT_SECS)))
            .build()
            .map_err(|e| ServiceError::ConnectionFailed(e.to_string()))?;
        Ok(Self {
            api_key: api_key.to_string(),
            target_model: DEFAULT_TARGET_MODEL.to_string(),
            client,
        })
    }

    /// Create from the `SCALEDOWN_API_KEY` environment variable.
    pub fn from_env() -> ServiceResult<Self> {
        let api_key = std::env::var("SCALEDOWN_API_KEY")
            .map_err(|_| ServiceError::MissingApiKey("SCALEDOWN_API_KEY"))?;
        Self::new(&api_key)
    }

    pub fn with_target_model(mut self, model: &str) -> Self {
        self.target_model = model.to_string();
        self
    }
}

#[async_trait]
impl Compressor for ScaleDownClient {
    fn name(&self) -> &str {
        "scaledown"
    }

    async fn compress(&self, text: &str) -> ServiceResult<Condensed> {
        let started = Instant::now();
        let request = CompressRequest {
            text,
            target_model: &self.target_model,
        };

        let response = self
            .client
            .post(SCALEDOWN_API_URL)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ServiceError::ConnectionFailed("cannot connect to ScaleDown API".to_string())
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

        let parsed: CompressResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        // Token counts are optional in the response; fall back to
        // whitespace counts the way the service's own docs do.
        let original_tokens = parsed
            .original_tokens
            .unwrap_or_else(|| text.split_whitespace().count() as u32);
        let condensed_tokens = parsed
            .compressed_tokens
            .unwrap_or_else(|| parsed.compressed_text.split_whitespace().count() as u32);

        tracing::debug!(
            original_tokens,
            condensed_tokens,
            latency_ms,
            "compression call complete"
        );

        Ok(Condensed {
            text: parsed.compressed_text,
            original_tokens,
            condensed_tokens,
            latency_ms,
        })
    }
}
