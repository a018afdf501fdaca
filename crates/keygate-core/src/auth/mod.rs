//! Authentication collaborators used by the session gate.
//!
//! This module provides:
//! - `SecretStore`: secure (service, account) keyed storage, with an OS
//!   keychain implementation via keyring
//! - `AuthBackend`: exchanges a username and password verifier for a token
//! - `derive_verifier`: one-way hashing of the password before submission

pub mod backend;
pub mod credentials;
pub mod verifier;

pub use backend::{AuthBackend, AuthRequest, AuthResponse, HttpBackend, SimulatedBackend};
pub use credentials::{KeyringStore, SecretKey, SecretStore};
pub use verifier::derive_verifier;
