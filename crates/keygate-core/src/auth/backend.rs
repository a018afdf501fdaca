//! Authentication backend seam.
//!
//! The gate only needs "submit credentials, receive a token". Two backends
//! are provided: a simulated one that stands in for the real service, and
//! an HTTP one used when an auth URL is configured.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::BackendError;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Credentials submitted to the backend. `password` carries the verifier,
/// never the raw password.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthResponse, BackendError>;
}

/// Build the backend described by `config`.
pub fn from_config(config: &Config) -> Result<Arc<dyn AuthBackend>, BackendError> {
    match config.auth_url {
        Some(ref url) => {
            info!(%url, "Using HTTP authentication backend");
            let timeout = Duration::from_secs(config.request_timeout_secs);
            Ok(Arc::new(HttpBackend::new(url.clone(), timeout)?))
        }
        None => {
            info!("No auth URL configured, using simulated authentication backend");
            let latency = Duration::from_millis(config.simulated_latency_ms);
            Ok(Arc::new(SimulatedBackend::new(latency)))
        }
    }
}

// ============================================================================
// Simulated backend
// ============================================================================

/// Accepts any credentials after an artificial network delay.
pub struct SimulatedBackend {
    latency: Duration,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl AuthBackend for SimulatedBackend {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthResponse, BackendError> {
        let latency_ms = self.latency.as_millis() as u64;
        debug!(username = %request.username, latency_ms, "Simulating authentication");
        tokio::time::sleep(self.latency).await;

        let bytes: [u8; 32] = rand::random();
        Ok(AuthResponse {
            token: hex::encode(bytes),
        })
    }
}

// ============================================================================
// HTTP backend
// ============================================================================

/// Posts the credentials as JSON and expects `{"token": "..."}` back.
/// Clone is cheap - reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: String, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, url })
    }

    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let end = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated)", &body[..end])
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Unreachable(err.to_string())
        } else {
            BackendError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthResponse, BackendError> {
        let response = self.client.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = Self::truncate_body(&body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Rejected(body),
                _ => BackendError::Other(format!("Status {}: {}", status, body)),
            });
        }

        response.json::<AuthResponse>().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Other(format!("Invalid auth response: {}", e))
            }
        })
    }
}
