//! Password hashing and verification on argon2id.
//!
//! Hashing salts freshly per call, so the same password never produces the
//! same PHC string twice. Verification delegates the digest comparison to
//! the argon2 verifier, which is constant-time-safe; a mismatch is a normal
//! `Ok(false)`, and only a malformed hash string is an error.
//!
//! Both functions are CPU-expensive by construction. Async callers run them
//! through `spawn_blocking` (see [`crate::session`]) so they never stall a
//! runtime worker thread.

use agora_core::{Error, Result};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::SaltString;
use rand_core::OsRng;

/// Hash `plaintext` into a PHC string (`$argon2id$v=19$…`) with a fresh
/// random salt and the default cost parameters.
pub fn hash_password(plaintext: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(plaintext.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Storage(e.to_string().into()))
}

/// Check `plaintext` against a stored PHC string.
pub fn verify_password(plaintext: &str, hashed: &str) -> Result<bool> {
  let parsed = PasswordHash::new(hashed)
    .map_err(|e| Error::validation(format!("malformed password hash: {e}")))?;

  match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(e) => Err(Error::validation(format!("malformed password hash: {e}"))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashing_is_salted_per_call() {
    let a = hash_password("hunter2").unwrap();
    let b = hash_password("hunter2").unwrap();
    assert_ne!(a, b);
  }

  #[test]
  fn verify_accepts_the_original_password() {
    let hash = hash_password("hunter2").unwrap();
    assert!(verify_password("hunter2", &hash).unwrap());
  }

  #[test]
  fn verify_rejects_a_wrong_password_without_erroring() {
    let hash = hash_password("hunter2").unwrap();
    assert!(!verify_password("hunter3", &hash).unwrap());
  }

  #[test]
  fn verify_errors_on_a_malformed_hash() {
    let err = verify_password("hunter2", "not-a-phc-string").unwrap_err();
    assert!(matches!(err, agora_core::Error::Validation(_)));
  }
}
