use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Token, UserProfile},
    error::{ApiError, ErrorCode},
    protocol::{AuthResponse, ErrorBody, LoginRequest, RegisterRequest},
};
use tracing::debug;

use crate::error::AuthError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
const FALLBACK_ERROR_MESSAGE: &str = "Request failed";

/// Remote authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError>;
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError>;
    async fn profile(&self, token: &Token) -> Result<UserProfile, AuthError>;
}

pub struct HttpAuthApi {
    http: Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        debug!(email = %request.email, "POST /login");
        let res = self
            .http
            .post(self.endpoint("/login"))
            .json(&request)
            .send()
            .await
            .map_err(AuthError::network)?;
        decode(res).await.map_err(Failure::unauthenticated)
    }

    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        debug!(email = %request.email, "POST /register");
        let res = self
            .http
            .post(self.endpoint("/register"))
            .json(&request)
            .send()
            .await
            .map_err(AuthError::network)?;
        decode(res).await.map_err(Failure::unauthenticated)
    }

    async fn profile(&self, token: &Token) -> Result<UserProfile, AuthError> {
        debug!("GET /profile");
        let res = self
            .http
            .get(self.endpoint("/profile"))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(AuthError::network)?;
        decode(res).await.map_err(Failure::authenticated)
    }
}

enum Failure {
    Api(ApiError),
    Other(AuthError),
}

impl Failure {
    fn unauthenticated(self) -> AuthError {
        match self {
            Failure::Api(err) => AuthError::rejected(err),
            Failure::Other(err) => err,
        }
    }

    fn authenticated(self) -> AuthError {
        match self {
            Failure::Api(err) => AuthError::from_authenticated_failure(err),
            Failure::Other(err) => err,
        }
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, Failure> {
    let status = res.status();
    if status.is_success() {
        return res
            .json::<T>()
            .await
            .map_err(|err| Failure::Other(AuthError::malformed(err)));
    }

    let body = res.json::<ErrorBody>().await.unwrap_or_default();
    let message = body
        .message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
    debug!(status = status.as_u16(), %message, "api request failed");
    Err(Failure::Api(ApiError::new(
        ErrorCode::from_status(status.as_u16()),
        message,
    )))
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
