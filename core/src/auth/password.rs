// marketplace/core/src/auth/password.rs

//! Password hashing and verification for every identity table.

use crate::error::MarketError;
use argon2::{
  password_hash::{
    rand_core::OsRng, // For generating random salts
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    SaltString,
  },
  Argon2,
};
use tracing::{debug, error, instrument};

/// Hashes a plain-text password using Argon2 with a fresh random salt.
///
/// Returns the PHC string form of the hash, which embeds the salt and the
/// algorithm parameters.
#[instrument(name = "password::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, MarketError> {
  if password.is_empty() {
    return Err(MarketError::BadRequest(
      "Password cannot be empty for hashing.".to_string(),
    ));
  }

  let salt = SaltString::generate(&mut OsRng);

  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(hash) => {
      debug!("Password hashed successfully.");
      Ok(hash.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(MarketError::Internal(format!(
        "Password hashing process failed: {}",
        argon_err
      )))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// `Ok(false)` means the password does not match. A stored hash that cannot
/// be parsed is an internal error, not an authentication failure.
#[instrument(
  name = "password::verify_password",
  skip(hashed_password, provided_password),
  err(Display),
  fields(hash_len = hashed_password.len())
)]
pub fn verify_password(hashed_password: &str, provided_password: &str) -> Result<bool, MarketError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    MarketError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(MarketError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}
