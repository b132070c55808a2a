//! Text compression collaborator.

use crate::service::ServiceResult;
use async_trait::async_trait;

/// Result of compressing one piece of text.
#[derive(Debug, Clone)]
pub struct Condensed {
    pub text: String,
    pub original_tokens: u32,
    pub condensed_tokens: u32,
    /// Wall-clock latency of the compression call, in milliseconds.
    pub latency_ms: f64,
}

impl Condensed {
    /// Condensed over original token count; 0 when no original tokens.
    pub fn ratio(&self) -> f64 {
        if self.original_tokens > 0 {
            f64::from(self.condensed_tokens) / f64::from(self.original_tokens)
        } else {
            0.0
        }
    }
}

/// Compresses text ahead of indexing and generation.
#[async_trait]
pub trait Compressor: Send + Sync {
    fn name(&self) -> &str;

    async fn compress(&self, text: &str) -> ServiceResult<Condensed>;
}

/// No-op compressor: passes text through unchanged with whitespace token
/// counts. Used when no compression credential is configured, and by tests.
pub struct PassthroughCompressor;

#[async_trait]
impl Compressor for PassthroughCompressor {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn compress(&self, text: &str) -> ServiceResult<Condensed> {
        let tokens = text.split_whitespace().count() as u32;
        Ok(Condensed {
            text: text.to_string(),
            original_tokens: tokens,
            condensed_tokens: tokens,
            latency_ms: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passthrough_keeps_text_and_counts() {
        let c = PassthroughCompressor.compress("reset your password now").await.unwrap();
        assert_eq!(c.text, "reset your password now");
        assert_eq!(c.original_tokens, 4);
        assert_eq!(c.condensed_tokens, 4);
        assert_eq!(c.ratio(), 1.0);
    }

    #[test]
    fn ratio_handles_zero() {
        let c = Condensed {
            text: String::new(),
            original_tokens: 0,
            condensed_tokens: 0,
            latency_ms: 0.0,
        };
        assert_eq!(c.ratio(), 0.0);
    }
}
