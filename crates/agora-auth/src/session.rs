//! [`SessionManager`] — token issue, resolution, revocation, and login
//! checks over any [`ForumStore`].
//!
//! Session state machine: Anonymous → (login success) → Authenticated →
//! (logout/revoke) → Anonymous. A failed login leaves the actor Anonymous.
//! The manager enforces no expiry; TTL policy, if wanted, belongs to the
//! caller.

use std::sync::Arc;

use agora_core::{
  Error, Result,
  model::{NewUser, UserProfile},
  store::ForumStore,
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use rand_core::{OsRng, RngCore as _};
use tracing::debug;
use uuid::Uuid;

use crate::credentials;

/// Token entropy: 32 bytes from the OS CSPRNG, well above the 128-bit
/// minimum the contract requires.
const TOKEN_BYTES: usize = 32;

fn generate_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  B64.encode(bytes)
}

/// Issues and validates opaque session tokens tied to a user identity.
///
/// Exclusively owns session rows; nothing else in the workspace reads or
/// writes them. Never returns a password hash — everything outward is a
/// [`UserProfile`].
pub struct SessionManager<S> {
  store: Arc<S>,
}

impl<S: ForumStore> SessionManager<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Create an account: hash the password (on the blocking pool) and
  /// persist the user. A taken username surfaces as `Error::Conflict`.
  pub async fn register(&self, username: &str, password: &str) -> Result<UserProfile> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || credentials::hash_password(&password))
      .await
      .map_err(|e| Error::Storage(e.to_string().into()))??;

    let user = self
      .store
      .create_user(NewUser { username: username.to_owned(), password_hash: hash })
      .await?;

    debug!(username = %user.username, "registered user");
    Ok(user.profile())
  }

  /// Verify a username/password pair.
  ///
  /// An unknown username and a wrong password fail identically
  /// (`Error::Auth`, one fixed message) so callers cannot probe which
  /// usernames exist.
  pub async fn check_login(&self, username: &str, password: &str) -> Result<UserProfile> {
    let Some(user) = self.store.user_by_username(username).await? else {
      return Err(Error::Auth);
    };

    let password = password.to_owned();
    let hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || credentials::verify_password(&password, &hash))
      .await
      .map_err(|e| Error::Storage(e.to_string().into()))??;

    if !ok {
      return Err(Error::Auth);
    }
    Ok(user.profile())
  }

  /// Issue a fresh session token for `user_id` and persist it.
  pub async fn create_session(&self, user_id: Uuid) -> Result<String> {
    let token = generate_token();
    self.store.insert_session(&token, user_id).await?;
    debug!(%user_id, "created session");
    Ok(token)
  }

  /// `check_login` + `create_session` in one step — the login flow as the
  /// HTTP layer consumes it.
  pub async fn login(&self, username: &str, password: &str) -> Result<(UserProfile, String)> {
    let profile = self.check_login(username, password).await?;
    let token = self.create_session(profile.user_id).await?;
    Ok((profile, token))
  }

  /// Resolve a session token to the owning user's public profile. An
  /// unknown token is `Error::SessionNotFound`; callers treat that as
  /// "anonymous".
  pub async fn resolve_session(&self, token: &str) -> Result<UserProfile> {
    self
      .store
      .session_user(token)
      .await?
      .ok_or(Error::SessionNotFound)
  }

  /// Delete every session belonging to the user.
  ///
  /// Not idempotent: revoking when the user has no live session is
  /// `Error::SessionNotFound`, so a double logout is visible to the
  /// caller rather than silently succeeding.
  pub async fn revoke_sessions(&self, user: &UserProfile) -> Result<()> {
    let deleted = self.store.delete_sessions_for_user(user.user_id).await?;
    if deleted == 0 {
      return Err(Error::SessionNotFound);
    }
    debug!(user_id = %user.user_id, deleted, "revoked sessions");
    Ok(())
  }
}
