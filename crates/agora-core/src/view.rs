//! Derived view objects — the nested, aggregated shapes handed to callers.
//!
//! Views are computed on read and never persisted. The storage layer
//! produces them from flat multi-table join rows; see the `encode` module of
//! `agora-store-sqlite` for the row-to-view mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Post, Subreddit, UserProfile};

/// A post with its author, subreddit, and vote tallies embedded.
///
/// `vote_score` is the sum of vote directions over all votes for the post
/// (0 when none exist) and always equals
/// `num_upvotes as i64 - num_downvotes as i64`. Cleared votes (direction 0)
/// count toward neither tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
  #[serde(flatten)]
  pub post:          Post,
  pub user:          UserProfile,
  pub subreddit:     Subreddit,
  pub vote_score:    i64,
  pub num_upvotes:   u32,
  pub num_downvotes: u32,
}

/// A comment with the minimal author embed.
///
/// Intentionally lighter than [`PostView`]: comment listings only need the
/// author's id and username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
  pub comment_id: Uuid,
  pub text:       String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub user:       CommentAuthor,
}

/// The id/username pair embedded in a [`CommentView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
  pub user_id:  Uuid,
  pub username: String,
}
