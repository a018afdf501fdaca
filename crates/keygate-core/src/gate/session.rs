//! The session gate: decides which surface is visible and mutates the
//! stored credential in response to user actions.
//!
//! Authentication is never cached. Every decision re-reads the credential
//! store, so an external change to the store (another process logging out)
//! is picked up by the next lifecycle event.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::{derive_verifier, AuthBackend, AuthRequest, SecretKey, SecretStore};
use crate::config::Config;
use crate::error::{GateError, StoreError};

use super::surface::{Presentation, Surface};

/// Which surface is currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    NoSurface,
    LoginVisible,
    MainVisible,
}

/// Derived from the store on every read: authenticated iff a token exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Authenticated { token: String },
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Completion signal for commands whose callers usually ignore the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Completed,
    Failed,
}

pub struct SessionGate {
    store: Arc<dyn SecretStore>,
    backend: Arc<dyn AuthBackend>,
    surfaces: Arc<dyn Presentation>,
    service_name: String,
    token_key: SecretKey,
    username_key: SecretKey,
}

impl SessionGate {
    pub fn new(
        config: &Config,
        store: Arc<dyn SecretStore>,
        backend: Arc<dyn AuthBackend>,
        surfaces: Arc<dyn Presentation>,
    ) -> Self {
        Self {
            store,
            backend,
            surfaces,
            service_name: config.service_name.clone(),
            token_key: config.token_key(),
            username_key: config.username_key(),
        }
    }

    pub fn state(&self) -> GateState {
        if self.surfaces.is_visible(Surface::Main) {
            GateState::MainVisible
        } else if self.surfaces.is_visible(Surface::Login) {
            GateState::LoginVisible
        } else {
            GateState::NoSurface
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Read the session state, surfacing store failures.
    pub async fn session_state(&self) -> Result<SessionState, StoreError> {
        Ok(match self.store.get(&self.token_key).await? {
            Some(token) => SessionState::Authenticated { token },
            None => SessionState::Unauthenticated,
        })
    }

    /// Read the session state; an unreadable store counts as unauthenticated.
    pub async fn check_auth(&self) -> SessionState {
        match self.session_state().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Failed to read auth token, treating as signed out");
                SessionState::Unauthenticated
            }
        }
    }

    /// The stored token, or an empty string if none or unreadable.
    pub async fn auth_token(&self) -> String {
        match self.check_auth().await {
            SessionState::Authenticated { token } => token,
            SessionState::Unauthenticated => String::new(),
        }
    }

    /// The remembered username, or an empty string if none or unreadable.
    pub async fn stored_username(&self) -> String {
        match self.store.get(&self.username_key).await {
            Ok(username) => username.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Failed to read remembered username");
                String::new()
            }
        }
    }

    // =========================================================================
    // Lifecycle events
    // =========================================================================

    /// Application ready: show whichever surface the stored credential calls for.
    pub async fn start(&self) -> GateState {
        if self.check_auth().await.is_authenticated() {
            info!("Stored credential found, opening main surface");
            self.switch_to(Surface::Main);
        } else {
            info!("No stored credential, opening login surface");
            self.switch_to(Surface::Login);
        }
        self.state()
    }

    /// Window re-activation: behaves like startup once every surface is closed.
    pub async fn reactivate(&self) -> GateState {
        if self.surfaces.any_visible() {
            debug!("Surface already visible, nothing to reopen");
            return self.state();
        }
        self.start().await
    }

    /// Exchange credentials for a token and switch to the main surface.
    ///
    /// Steps run strictly in order and nothing is rolled back: the token is
    /// only written after the backend accepted the credentials.
    pub async fn login(&self, username: &str, password: &str, remember: bool) -> Result<(), GateError> {
        let username = username.trim();

        let verifier = derive_verifier(&self.service_name, username, password)?;
        let request = AuthRequest {
            username: username.to_string(),
            password: verifier,
        };

        let response = self.backend.authenticate(&request).await?;
        self.store.set(&self.token_key, &response.token).await?;

        let remembered = if remember {
            self.store.set(&self.username_key, username).await
        } else {
            self.store.delete(&self.username_key).await
        };
        if let Err(e) = remembered {
            warn!(error = %e, remember, "Failed to update remembered username");
        }

        self.switch_to(Surface::Main);
        info!(%username, "Login successful");
        Ok(())
    }

    /// Delete the token and return to the login surface. The remembered
    /// username is kept so the login surface can pre-fill it.
    pub async fn logout(&self) -> Completion {
        let completion = self.delete_token().await;
        self.switch_to(Surface::Login);
        info!("Logged out");
        completion
    }

    /// Delete the token without touching any surface.
    pub async fn clear_auth_token(&self) -> Completion {
        self.delete_token().await
    }

    async fn delete_token(&self) -> Completion {
        match self.store.delete(&self.token_key).await {
            Ok(()) => Completion::Completed,
            Err(e) => {
                warn!(error = %e, "Failed to delete auth token");
                Completion::Failed
            }
        }
    }

    fn switch_to(&self, surface: Surface) {
        for other in Surface::ALL.iter().filter(|s| **s != surface) {
            self.surfaces.close(*other);
        }
        self.surfaces.show(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, ErrorKind};
    use crate::testing::{Harness, BACKEND_TOKEN};

    #[tokio::test]
    async fn test_start_without_credential_shows_login() {
        let h = Harness::new();
        assert_eq!(h.gate.start().await, GateState::LoginVisible);
        assert!(!h.surfaces.is_visible(Surface::Main));
    }

    #[tokio::test]
    async fn test_start_with_credential_shows_main() {
        let h = Harness::new();
        h.store.insert(h.config.token_key(), "saved-token");
        assert_eq!(h.gate.start().await, GateState::MainVisible);
        assert!(!h.surfaces.is_visible(Surface::Login));
    }

    #[tokio::test]
    async fn test_start_with_unreachable_store_shows_login() {
        let h = Harness::new();
        h.store.set_unreachable(true);
        assert_eq!(h.gate.start().await, GateState::LoginVisible);
    }

    #[tokio::test]
    async fn test_check_auth_reads_store_fresh() {
        let h = Harness::new();
        assert_eq!(h.gate.check_auth().await, SessionState::Unauthenticated);

        h.store.insert(h.config.token_key(), "external");
        assert_eq!(
            h.gate.check_auth().await,
            SessionState::Authenticated { token: "external".to_string() }
        );
    }

    #[tokio::test]
    async fn test_check_auth_unreachable_store_is_unauthenticated() {
        let h = Harness::new();
        h.store.insert(h.config.token_key(), "saved-token");
        h.store.set_unreachable(true);
        assert_eq!(h.gate.check_auth().await, SessionState::Unauthenticated);
        assert!(h.gate.session_state().await.is_err());
    }

    #[tokio::test]
    async fn test_login_stores_token_and_shows_main() {
        let h = Harness::new();
        h.gate.start().await;

        h.gate.login("  alice  ", "pw123", true).await.unwrap();

        assert_eq!(h.gate.state(), GateState::MainVisible);
        assert!(!h.surfaces.is_visible(Surface::Login));
        assert_eq!(
            h.gate.check_auth().await,
            SessionState::Authenticated { token: BACKEND_TOKEN.to_string() }
        );
        assert_eq!(h.gate.stored_username().await, "alice");
    }

    #[tokio::test]
    async fn test_login_sends_trimmed_username_and_verifier() {
        let h = Harness::new();
        h.gate.login("  alice  ", "pw123", false).await.unwrap();

        let requests = h.backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].username, "alice");
        assert_ne!(requests[0].password, "pw123");
        assert_eq!(
            requests[0].password,
            derive_verifier(&h.config.service_name, "alice", "pw123").unwrap()
        );
    }

    #[tokio::test]
    async fn test_login_without_remember_deletes_username() {
        let h = Harness::new();
        h.gate.login("alice", "pw123", true).await.unwrap();
        assert_eq!(h.gate.stored_username().await, "alice");

        h.gate.login("alice", "pw123", false).await.unwrap();
        assert_eq!(h.gate.stored_username().await, "");
        assert!(h.store.peek(&h.config.username_key()).is_none());
    }

    #[tokio::test]
    async fn test_login_empty_username_is_passed_through() {
        let h = Harness::new();
        h.gate.login("   ", "pw", false).await.unwrap();
        assert_eq!(h.backend.requests()[0].username, "");
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_unchanged() {
        let h = Harness::new();
        h.gate.start().await;
        h.backend.fail_next(BackendError::Timeout);

        let err = h.gate.login("alice", "pw123", true).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(h.gate.state(), GateState::LoginVisible);
        assert!(h.store.peek(&h.config.token_key()).is_none());
        assert!(h.store.peek(&h.config.username_key()).is_none());
    }

    #[tokio::test]
    async fn test_login_with_unreachable_store_fails_with_store_access() {
        let h = Harness::new();
        h.gate.start().await;
        h.store.set_unreachable(true);

        let err = h.gate.login("alice", "pw123", true).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StoreAccess);
        assert_eq!(h.gate.state(), GateState::LoginVisible);
    }

    #[tokio::test]
    async fn test_logout_clears_token_and_keeps_username() {
        let h = Harness::new();
        h.gate.login("alice", "pw123", true).await.unwrap();

        assert_eq!(h.gate.logout().await, Completion::Completed);

        assert_eq!(h.gate.state(), GateState::LoginVisible);
        assert_eq!(h.gate.check_auth().await, SessionState::Unauthenticated);
        assert_eq!(h.gate.stored_username().await, "alice");
    }

    #[tokio::test]
    async fn test_double_logout_is_safe() {
        let h = Harness::new();
        h.gate.login("alice", "pw123", false).await.unwrap();

        assert_eq!(h.gate.logout().await, Completion::Completed);
        assert_eq!(h.gate.logout().await, Completion::Completed);
        assert_eq!(h.gate.state(), GateState::LoginVisible);
        assert_eq!(h.gate.check_auth().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_with_unreachable_store_still_shows_login() {
        let h = Harness::new();
        h.gate.login("alice", "pw123", false).await.unwrap();
        h.store.set_unreachable(true);

        assert_eq!(h.gate.logout().await, Completion::Failed);
        assert_eq!(h.gate.state(), GateState::LoginVisible);
    }

    #[tokio::test]
    async fn test_clear_auth_token_with_unreachable_store_fails_quietly() {
        let h = Harness::new();
        h.gate.login("alice", "pw123", false).await.unwrap();
        h.store.set_unreachable(true);

        assert_eq!(h.gate.clear_auth_token().await, Completion::Failed);
        assert_eq!(h.gate.state(), GateState::MainVisible);
    }

    #[tokio::test]
    async fn test_clear_auth_token_keeps_surface() {
        let h = Harness::new();
        h.gate.login("alice", "pw123", false).await.unwrap();

        assert_eq!(h.gate.clear_auth_token().await, Completion::Completed);

        assert_eq!(h.gate.state(), GateState::MainVisible);
        assert_eq!(h.gate.auth_token().await, "");
    }

    #[tokio::test]
    async fn test_reactivate_with_visible_surface_is_noop() {
        let h = Harness::new();
        h.gate.start().await;
        h.store.insert(h.config.token_key(), "appeared-later");

        assert_eq!(h.gate.reactivate().await, GateState::LoginVisible);
    }

    #[tokio::test]
    async fn test_reactivate_after_all_closed_rechecks_store() {
        let h = Harness::new();
        h.gate.login("alice", "pw123", false).await.unwrap();
        h.surfaces.close(Surface::Main);
        assert_eq!(h.gate.state(), GateState::NoSurface);

        assert_eq!(h.gate.reactivate().await, GateState::MainVisible);

        h.surfaces.close(Surface::Main);
        h.gate.clear_auth_token().await;
        assert_eq!(h.gate.reactivate().await, GateState::LoginVisible);
    }
}
