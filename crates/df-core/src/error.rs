//! # AppError
//!
//! Centralized error handling for the DevForum ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all df-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Question, Answer, Community)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., vote value outside {1, -1}, missing field)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Permission failure (e.g., accepting an answer on someone else's question)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate username or community name)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for the NotFound variant with a displayable id.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(kind.to_string(), id.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// A specialized Result type for DevForum logic.
pub type Result<T> = std::result::Result<T, AppError>;
