// src/services/password.rs

//! Password hashing and verification.
//!
//! The rest of the crate treats this as an opaque one-way hash + verify
//! capability; only the credential stores and the admin invite codes call
//! into it.

use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,   // The main trait for hashing
    PasswordVerifier, // The main trait for verifying
    SaltString,
  },
  Argon2,
};
use tracing::{debug, error, instrument};

use crate::errors::{AppError, Result};

/// Hashes a plain-text secret using Argon2 with a fresh random salt.
#[instrument(name = "password::hash_secret", skip(secret), err(Display))]
pub fn hash_secret(secret: &str) -> Result<String> {
  if secret.is_empty() {
    return Err(AppError::invalid("password", "must not be empty"));
  }

  let salt = SaltString::generate(&mut OsRng);
  let hasher = Argon2::default();

  match hasher.hash_password(secret.as_bytes(), &salt) {
    Ok(hash) => Ok(hash.to_string()),
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 hashing failed.");
      Err(AppError::Internal(format!("password hashing failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text secret against a stored Argon2 PHC string.
///
/// Returns `Ok(false)` on a mismatch; an unparseable stored hash is an
/// internal error (stored data is corrupt), not an authentication result.
#[instrument(name = "password::verify_secret", skip_all, err(Display))]
pub fn verify_secret(stored_hash: &str, candidate: &str) -> Result<bool> {
  if stored_hash.is_empty() || candidate.is_empty() {
    debug!("Empty hash or candidate; verification fails closed.");
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash.");
    AppError::Internal(format!("invalid stored password hash: {}", parse_err))
  })?;

  match Argon2::default().verify_password(candidate.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other) => {
      error!(error = %other, "Argon2 verification errored.");
      Err(AppError::Internal(format!("password verification failed: {}", other)))
    }
  }
}
