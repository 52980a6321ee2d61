//! Error taxonomy for `agora-core`.
//!
//! Storage backends classify their raw driver errors into this taxonomy at
//! their own boundary; nothing above the storage adapter ever sees a backend
//! error code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or missing input, rejected before (or classified at) the
  /// storage boundary.
  #[error("{0}")]
  Validation(String),

  /// Credential mismatch or unknown username. Always the same message, so a
  /// caller cannot tell which half was wrong.
  #[error("username or password incorrect")]
  Auth,

  /// No session matched the given token, or a revocation affected no rows.
  #[error("session not found")]
  SessionNotFound,

  /// A unique constraint (username, subreddit name) was violated.
  #[error("{0}")]
  Conflict(String),

  /// Any other persistence failure, surfaced unchanged.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self {
    Error::Validation(msg.into())
  }

  pub fn conflict(msg: impl Into<String>) -> Self {
    Error::Conflict(msg.into())
  }

  pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
