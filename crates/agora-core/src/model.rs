//! Persisted entities and the input records used to create them.
//!
//! Ids are UUIDv4, assigned by the store at creation. All timestamps are
//! UTC and set by the store, never by callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Users ───────────────────────────────────────────────────────────────────

/// A full user row, including the password hash.
///
/// Deliberately not serialisable: the hash must never leave the
/// credential/session boundary. Everything outward-facing uses
/// [`UserProfile`].
#[derive(Debug, Clone)]
pub struct User {
  pub user_id:       Uuid,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl User {
  /// The public shape of this user — everything except the password hash.
  pub fn profile(&self) -> UserProfile {
    UserProfile {
      user_id:    self.user_id,
      username:   self.username.clone(),
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

/// The public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:    Uuid,
  pub username:   String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input for user creation. The hash is produced by the credential store;
/// plaintext passwords never reach the forum store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
}

// ─── Subreddits ──────────────────────────────────────────────────────────────

/// A named sub-community that owns posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subreddit {
  pub subreddit_id: Uuid,
  pub name:         String,
  pub description:  Option<String>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubreddit {
  pub name:        String,
  pub description: Option<String>,
}

// ─── Posts ───────────────────────────────────────────────────────────────────

/// A link posted by a user under a subreddit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:      Uuid,
  pub title:        String,
  pub url:          String,
  pub user_id:      Uuid,
  pub subreddit_id: Uuid,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
  pub user_id:      Uuid,
  pub title:        String,
  pub url:          String,
  pub subreddit_id: Uuid,
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub text:       String,
  pub user_id:    Uuid,
  pub post_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub user_id: Uuid,
  pub post_id: Uuid,
  pub text:    String,
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// A vote direction. The only representable values are the three the ledger
/// accepts; arbitrary integers go through [`VoteDirection::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
  Up,
  Clear,
  Down,
}

impl VoteDirection {
  pub fn as_i64(self) -> i64 {
    match self {
      VoteDirection::Up => 1,
      VoteDirection::Clear => 0,
      VoteDirection::Down => -1,
    }
  }
}

impl TryFrom<i64> for VoteDirection {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    match value {
      1 => Ok(VoteDirection::Up),
      0 => Ok(VoteDirection::Clear),
      -1 => Ok(VoteDirection::Down),
      other => Err(Error::validation(format!(
        "vote direction must be one of -1, 0, 1 (got {other})"
      ))),
    }
  }
}

/// Input for a vote cast. One row per (user, post) pair; a repeat cast
/// overwrites the direction in place.
#[derive(Debug, Clone, Copy)]
pub struct NewVote {
  pub user_id:   Uuid,
  pub post_id:   Uuid,
  pub direction: VoteDirection,
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// A live login session. Created on login, deleted on logout; the core
/// enforces no expiry.
#[derive(Debug, Clone)]
pub struct Session {
  pub token:      String,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
}
