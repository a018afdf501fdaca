//! Error types for the session gate and their classification into
//! short, user-facing messages.
//!
//! Every failure that can reach a front-end falls into one of four
//! [`ErrorKind`]s. Read-only queries swallow store failures; login turns
//! them into a message via [`GateError::user_message`].

use thiserror::Error;

/// Coarse classification of a failure, as reported across the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The credential store is unreachable or denied access.
    StoreAccess,
    /// The authentication backend could not be reached.
    NetworkUnreachable,
    /// The authentication backend did not answer in time.
    Timeout,
    /// Anything else, including rejected credentials and malformed input.
    Unclassified,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("Credential store denied access: {0}")]
    AccessDenied(String),
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Unable to reach authentication server: {0}")]
    Unreachable(String),

    #[error("Authentication request timed out")]
    Timeout,

    #[error("Credentials rejected: {0}")]
    Rejected(String),

    #[error("Authentication failed: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum GateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Failed to derive password verifier: {0}")]
    Verifier(String),
}

impl GateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::Store(_) => ErrorKind::StoreAccess,
            GateError::Backend(BackendError::Unreachable(_)) => ErrorKind::NetworkUnreachable,
            GateError::Backend(BackendError::Timeout) => ErrorKind::Timeout,
            GateError::Backend(_) | GateError::Verifier(_) => ErrorKind::Unclassified,
        }
    }

    /// Human-readable message suitable for the login surface.
    pub fn user_message(&self) -> String {
        match (self.kind(), self) {
            (ErrorKind::StoreAccess, _) => {
                "Unable to access secure credential storage.".to_string()
            }
            (ErrorKind::NetworkUnreachable, _) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            (ErrorKind::Timeout, _) => "Connection timed out. Please try again.".to_string(),
            (_, GateError::Backend(BackendError::Rejected(_))) => {
                "Invalid username or password".to_string()
            }
            (_, e) => format!("Login failed: {}", e),
        }
    }
}
