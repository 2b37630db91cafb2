use crate::uniqueness::Conflict;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClinicaError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{0}")]
    Conflict(Conflict),

    #[error("Duplicate {kind}: {message}")]
    Duplicate { kind: String, message: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Not modified: {message}")]
    NotModified { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ClinicaError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(kind: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.to_string(),
        }
    }

    pub fn not_modified(message: impl Into<String>) -> Self {
        Self::NotModified {
            message: message.into(),
        }
    }

    /// Short machine-readable name used in error bodies and audit entries
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Conflict(_) => "conflict",
            Self::Duplicate { .. } => "duplicate",
            Self::NotFound { .. } => "not-found",
            Self::NotModified { .. } => "not-modified",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Storage(_) => "storage",
            Self::InvalidJson(_) => "invalid-json",
        }
    }
}

pub type Result<T> = std::result::Result<T, ClinicaError>;
