//! External collaborators for the triage decision core: a text compression
//! service and a grounded answer generator.
//!
//! Both collaborators sit behind async traits so the decision engine can be
//! tested without network access. The live backends (ScaleDown for
//! compression, Gemini for generation) are behind the `api` feature.

mod compress;
mod generate;
mod prompt;
mod service;

#[cfg(feature = "api")]
mod gemini;
#[cfg(feature = "api")]
mod scaledown;

pub use compress::{Compressor, Condensed, PassthroughCompressor};
pub use generate::{Generation, GenerationBackend, GenerationOutcome, MockGenerator};
pub use prompt::answer_prompt;
pub use service::{ServiceError, ServiceResult};

#[cfg(feature = "api")]
pub use gemini::GeminiClient;
#[cfg(feature = "api")]
pub use scaledown::ScaleDownClient;
