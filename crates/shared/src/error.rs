use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidState,
    InvalidField,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("invalid field '{name}': {reason}")]
    InvalidField { name: String, reason: String },
}

impl SequenceError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn invalid_field(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::InvalidField { .. } => ErrorCode::InvalidField,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl From<SequenceError> for ErrorReport {
    fn from(value: SequenceError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}
