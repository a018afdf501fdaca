//! The operations a front-end may invoke, with boundary-friendly results.
//!
//! Nothing here returns an error: failures become `success: false`, empty
//! strings or a [`Completion::Failed`] signal, and are logged.

use tracing::warn;

use crate::fingerprint;
use crate::gate::{Completion, SessionGate};
use crate::models::{AuthStatus, LoginResponse, MachineCodeResponse};

pub struct Commands {
    gate: SessionGate,
}

impl Commands {
    pub fn new(gate: SessionGate) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub async fn login(&self, username: &str, password: &str, remember: bool) -> LoginResponse {
        match self.gate.login(username, password, remember).await {
            Ok(()) => LoginResponse {
                success: true,
                message: "Login successful".to_string(),
            },
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Login failed");
                LoginResponse {
                    success: false,
                    message: e.user_message(),
                }
            }
        }
    }

    pub async fn logout(&self) -> Completion {
        self.gate.logout().await
    }

    pub async fn check_auth(&self) -> AuthStatus {
        self.gate.check_auth().await.into()
    }

    pub async fn get_stored_username(&self) -> String {
        self.gate.stored_username().await
    }

    pub fn get_machine_code(&self) -> MachineCodeResponse {
        fingerprint::device_identity().into()
    }

    pub async fn get_auth_token(&self) -> String {
        self.gate.auth_token().await
    }

    pub async fn clear_auth_token(&self) -> Completion {
        self.gate.clear_auth_token().await
    }
}
