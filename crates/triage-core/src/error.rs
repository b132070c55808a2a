//! Error types for triage operations.
//!
//! Structured errors instead of panics. The live query path never surfaces
//! these to the end user; they drive fallbacks (empty retrieval,
//! escalate-only mode, rebuild-from-store).

use std::error::Error;
use std::fmt;

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;

/// Errors that can occur during triage operations.
#[derive(Debug, Clone)]
pub enum TriageError {
    /// Term-index errors.
    Index(IndexError),
    /// Backing-store errors.
    Store(String),
    /// Configuration errors (missing credentials).
    Config(ConfigError),
    /// I/O errors (wrapped).
    Io(String),
    /// Serialization errors.
    Serialization(String),
}

impl fmt::Display for TriageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriageError::Index(e) => write!(f, "Index error: {}", e),
            TriageError::Store(msg) => write!(f, "Store error: {}", msg),
            TriageError::Config(e) => write!(f, "Config error: {}", e),
            TriageError::Io(msg) => write!(f, "I/O error: {}", msg),
            TriageError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for TriageError {}

impl From<std::io::Error> for TriageError {
    fn from(e: std::io::Error) -> Self {
        TriageError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for TriageError {
    fn from(e: serde_json::Error) -> Self {
        TriageError::Serialization(e.to_string())
    }
}

impl From<IndexError> for TriageError {
    fn from(e: IndexError) -> Self {
        TriageError::Index(e)
    }
}

/// Term-index errors.
#[derive(Debug, Clone)]
pub enum IndexError {
    /// Build was asked to index zero chunks.
    NoChunks,
    /// No persisted artifact at the expected path.
    ArtifactMissing(String),
    /// Persisted artifact is malformed or internally inconsistent
    /// (e.g. mismatched matrix dimensions). Treated as "index
    /// unavailable", triggering a rebuild from the store.
    Integrity(String),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::NoChunks => write!(f, "no chunks to index"),
            IndexError::ArtifactMissing(path) => write!(f, "index artifact missing: {}", path),
            IndexError::Integrity(msg) => write!(f, "index artifact inconsistent: {}", msg),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A required external credential is not set. The query path degrades
    /// to escalate-only mode rather than crashing.
    MissingCredential(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingCredential(var) => {
                write!(f, "missing credential: {} is not set", var)
            }
        }
    }
}

// Convenience constructors
impl TriageError {
    pub fn no_chunks() -> Self {
        TriageError::Index(IndexError::NoChunks)
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        TriageError::Index(IndexError::Integrity(msg.into()))
    }

    pub fn store(e: impl fmt::Display) -> Self {
        TriageError::Store(e.to_string())
    }

    pub fn missing_credential(var: impl Into<String>) -> Self {
        TriageError::Config(ConfigError::MissingCredential(var.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let e = TriageError::no_chunks();
        assert_eq!(e.to_string(), "Index error: no chunks to index");

        let e = TriageError::missing_credential("GEMINI_API_KEY");
        assert!(e.to_string().contains("GEMINI_API_KEY"));
    }
}
