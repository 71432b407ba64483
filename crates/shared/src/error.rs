use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 409 | 422 => Self::Validation,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }

    pub fn is_auth_failure(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

/// A non-2xx answer from the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_auth_statuses() {
        assert!(ErrorCode::from_status(401).is_auth_failure());
        assert!(ErrorCode::from_status(403).is_auth_failure());
        assert!(!ErrorCode::from_status(400).is_auth_failure());
        assert_eq!(ErrorCode::from_status(500), ErrorCode::Internal);
    }

    #[test]
    fn displays_message_verbatim() {
        let err = ApiError::new(ErrorCode::Validation, "Email already registered");
        assert_eq!(err.to_string(), "Email already registered");
    }
}
