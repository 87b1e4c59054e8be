//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Inference paths never
//! surface them to callers; they log and degrade instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Log store error: {0}")]
    Repo(String),

    /// Missing, unreachable or malformed model artifact.
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Shape mismatch or numerically invalid output during a forward pass.
    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Input error: {0}")]
    Input(String),
}
