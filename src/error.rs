//! Fatal pipeline errors.
//!
//! Only load and validation failures abort a run; everything below the
//! snapshot level degrades to warnings or fallback results instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load snapshot from '{path}': {reason}")]
    Load { path: String, reason: String },

    #[error("snapshot is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("snapshot rejected by validation: {}", errors.join("; "))]
    InvalidSnapshot { errors: Vec<String> },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
