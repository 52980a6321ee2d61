//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns, plus the flat row
//! structs produced by multi-table joins.
//!
//! All timestamps are stored as RFC 3339 strings; UUIDs as hyphenated
//! lowercase strings. The `Raw*` structs hold exactly what a query returns,
//! column for column; their `into_*` methods are the pure flat-to-nested
//! mapping and have no database dependency.

use agora_core::{
  Error, Result,
  model::{Post, Subreddit, User, UserProfile},
  view::{CommentAuthor, CommentView, PostView},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(Error::storage)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(Error::storage)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings for a user's public columns (no password hash selected).
pub struct RawProfile {
  pub user_id:    String,
  pub username:   String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<UserProfile> {
    Ok(UserProfile {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from a `subreddits` row.
pub struct RawSubreddit {
  pub subreddit_id: String,
  pub name:         String,
  pub description:  Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawSubreddit {
  pub fn into_subreddit(self) -> Result<Subreddit> {
    Ok(Subreddit {
      subreddit_id: decode_uuid(&self.subreddit_id)?,
      name:         self.name,
      description:  self.description,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// One flat row of the aggregated post query: posts × users × subreddits
/// with grouped vote tallies.
pub struct RawPostView {
  // posts columns
  pub post_id:         String,
  pub title:           String,
  pub url:             String,
  pub post_created:    String,
  pub post_updated:    String,
  // users join
  pub user_id:         String,
  pub username:        String,
  pub user_created:    String,
  pub user_updated:    String,
  // subreddits join
  pub subreddit_id:    String,
  pub subreddit_name:  String,
  pub subreddit_desc:  Option<String>,
  pub subreddit_created: String,
  pub subreddit_updated: String,
  // vote aggregates
  pub vote_score:      i64,
  pub num_upvotes:     i64,
  pub num_downvotes:   i64,
}

impl RawPostView {
  /// Reshape the flat row into the nested [`PostView`].
  pub fn into_view(self) -> Result<PostView> {
    let user_id = decode_uuid(&self.user_id)?;
    let subreddit_id = decode_uuid(&self.subreddit_id)?;

    Ok(PostView {
      post: Post {
        post_id:      decode_uuid(&self.post_id)?,
        title:        self.title,
        url:          self.url,
        user_id,
        subreddit_id,
        created_at:   decode_dt(&self.post_created)?,
        updated_at:   decode_dt(&self.post_updated)?,
      },
      user: UserProfile {
        user_id,
        username:   self.username,
        created_at: decode_dt(&self.user_created)?,
        updated_at: decode_dt(&self.user_updated)?,
      },
      subreddit: Subreddit {
        subreddit_id,
        name:         self.subreddit_name,
        description:  self.subreddit_desc,
        created_at:   decode_dt(&self.subreddit_created)?,
        updated_at:   decode_dt(&self.subreddit_updated)?,
      },
      vote_score:    self.vote_score,
      num_upvotes:   u32::try_from(self.num_upvotes).map_err(Error::storage)?,
      num_downvotes: u32::try_from(self.num_downvotes).map_err(Error::storage)?,
    })
  }
}

/// One flat row of the comment listing query: comments × users.
pub struct RawComment {
  pub comment_id: String,
  pub text:       String,
  pub created_at: String,
  pub updated_at: String,
  pub user_id:    String,
  pub username:   String,
}

impl RawComment {
  pub fn into_view(self) -> Result<CommentView> {
    Ok(CommentView {
      comment_id: decode_uuid(&self.comment_id)?,
      text:       self.text,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      user:       CommentAuthor {
        user_id:  decode_uuid(&self.user_id)?,
        username: self.username,
      },
    })
  }
}
