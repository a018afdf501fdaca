//! One-way password verifier sent to the backend in place of the password.

use argon2::Argon2;
use sha2::{Digest, Sha256};

use crate::error::GateError;

/// Output length of the verifier in bytes.
const VERIFIER_LEN: usize = 32;

/// Salt length taken from the per-user digest.
const SALT_LEN: usize = 16;

/// Derive the verifier for `password`.
///
/// Argon2id with a salt fixed per (service, username), so the same
/// credentials always produce the same verifier and the backend can compare it.
pub fn derive_verifier(service: &str, username: &str, password: &str) -> Result<String, GateError> {
    let digest = Sha256::new()
        .chain_update(service.as_bytes())
        .chain_update(b":")
        .chain_update(username.as_bytes())
        .finalize();

    let mut out = [0u8; VERIFIER_LEN];
    Argon2::default()
        .hash_password_into(password.as_bytes(), &digest[..SALT_LEN], &mut out)
        .map_err(|e| GateError::Verifier(e.to_string()))?;

    Ok(hex::encode(out))
}
