//! Keygate core - gates a main application surface behind a stored credential.
//!
//! The [`gate::SessionGate`] decides on every lifecycle event (startup,
//! login, logout, re-activation) whether the login or the main surface is
//! shown, re-reading the credential store each time. The
//! [`fingerprint`] module derives a stable machine code for the host.
//! [`commands::Commands`] exposes both to a front-end.

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod gate;
pub mod models;

#[cfg(test)]
mod testing;

pub use commands::Commands;
pub use config::Config;
pub use error::{BackendError, ErrorKind, GateError, StoreError};
pub use fingerprint::DeviceIdentity;
pub use gate::{Completion, GateState, SessionGate, SessionState, Surface};
