//! Trait for the external text-generation provider.

use thiserror::Error;

/// Why a generation attempt produced no text.
///
/// `Display` carries only the status or the failure kind; the underlying
/// detail (which may include the endpoint URL or a response body) is kept in
/// the variant for `Debug` output.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("status {0}")]
    Status(u16),

    #[error("transport failure")]
    Transport(String),

    #[error("unreadable response")]
    InvalidResponse(String),

    #[error("no generations returned")]
    Empty,
}

/// Generates free text for a prompt.
///
/// Implementations return an error for any transport failure or non-2xx
/// response; callers treat every error as a signal to use the fallback
/// narrative.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
