use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The request never produced an HTTP response.
    Network,
    /// The server answered with a non-2xx status.
    Rejected,
    /// The stored token was refused by an authenticated endpoint.
    InvalidOrExpiredToken,
    /// A 2xx response whose body could not be decoded.
    Malformed,
    /// Client-side form validation failed; nothing was sent.
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::new(AuthErrorKind::Network, err.to_string())
    }

    pub fn malformed(err: impl std::fmt::Display) -> Self {
        Self::new(AuthErrorKind::Malformed, err.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Validation, message)
    }

    pub fn invalid_or_expired_token(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::InvalidOrExpiredToken, message)
    }

    pub fn rejected(err: ApiError) -> Self {
        Self::new(AuthErrorKind::Rejected, err.message)
    }

    /// Classifies a failure of a request that carried the bearer token.
    ///
    /// 401/403 always mean the token is unusable. Servers that answer token
    /// problems with another status are still recognised by their message.
    pub fn from_authenticated_failure(err: ApiError) -> Self {
        let lower = err.message.to_ascii_lowercase();
        if err.code.is_auth_failure() || lower.contains("invalid") || lower.contains("expired") {
            Self::invalid_or_expired_token(err.message)
        } else {
            Self::rejected(err)
        }
    }

    pub fn is_invalid_or_expired_token(&self) -> bool {
        self.kind == AuthErrorKind::InvalidOrExpiredToken
    }
}
