//! [`SqliteStore`] — the SQLite implementation of [`ForumStore`].

use std::path::Path;

use agora_core::{
  Result,
  model::{
    Comment, NewComment, NewPost, NewSubreddit, NewUser, NewVote, Post,
    Subreddit, User, UserProfile,
  },
  rank,
  store::{ForumStore, LISTING_LIMIT, PostFilter, PostSort},
  view::{CommentView, PostView},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  encode::{
    RawComment, RawPostView, RawProfile, RawSubreddit, RawUser, encode_dt,
    encode_uuid,
  },
  error::{Constraints, classify, storage},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Agora forum store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The
/// database is the only serialisation point; the store itself holds no
/// other shared mutable state.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_owned();
    let conn = tokio_rusqlite::Connection::open(path.clone())
      .await
      .map_err(storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    info!(path = %path.display(), "opened forum store");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(storage)
  }
}

// ─── Aggregated post query ───────────────────────────────────────────────────

/// Shared SELECT for [`PostView`] rows: posts × users × subreddits with all
/// votes left-joined and grouped per post. Callers append a WHERE clause,
/// the GROUP BY, and ordering.
const POST_VIEW_SELECT: &str = "
  SELECT
    p.post_id, p.title, p.url, p.created_at, p.updated_at,
    u.user_id, u.username, u.created_at, u.updated_at,
    s.subreddit_id, s.name, s.description, s.created_at, s.updated_at,
    COALESCE(SUM(v.direction), 0)                AS vote_score,
    COUNT(CASE WHEN v.direction = 1  THEN 1 END) AS num_upvotes,
    COUNT(CASE WHEN v.direction = -1 THEN 1 END) AS num_downvotes
  FROM posts p
    JOIN users u      ON u.user_id = p.user_id
    JOIN subreddits s ON s.subreddit_id = p.subreddit_id
    LEFT JOIN votes v ON v.post_id = p.post_id";

fn raw_post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPostView> {
  Ok(RawPostView {
    post_id:           row.get(0)?,
    title:             row.get(1)?,
    url:               row.get(2)?,
    post_created:      row.get(3)?,
    post_updated:      row.get(4)?,
    user_id:           row.get(5)?,
    username:          row.get(6)?,
    user_created:      row.get(7)?,
    user_updated:      row.get(8)?,
    subreddit_id:      row.get(9)?,
    subreddit_name:    row.get(10)?,
    subreddit_desc:    row.get(11)?,
    subreddit_created: row.get(12)?,
    subreddit_updated: row.get(13)?,
    vote_score:        row.get(14)?,
    num_upvotes:       row.get(15)?,
    num_downvotes:     row.get(16)?,
  })
}

fn raw_subreddit_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawSubreddit> {
  Ok(RawSubreddit {
    subreddit_id: row.get(0)?,
    name:         row.get(1)?,
    description:  row.get(2)?,
    created_at:   row.get(3)?,
    updated_at:   row.get(4)?,
  })
}

// ─── ForumStore impl ─────────────────────────────────────────────────────────

impl ForumStore for SqliteStore {
  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let now = Utc::now();
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      password_hash: input.password_hash,
      created_at:    now,
      updated_at:    now,
    };

    let id_str   = encode_uuid(user.user_id);
    let at_str   = encode_dt(now);
    let username = user.username.clone();
    let hash     = user.password_hash.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, password_hash, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![id_str, username, hash, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        classify(e, Constraints {
          unique: Some("a user with this username already exists"),
          ..Default::default()
        })
      })?;

    debug!(username = %user.username, "created user");
    Ok(user)
  }

  async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
    let name = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, password_hash, created_at, updated_at
               FROM users WHERE username = ?1",
              rusqlite::params![name],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                  created_at:    row.get(3)?,
                  updated_at:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Subreddits ────────────────────────────────────────────────────────────

  async fn create_subreddit(&self, input: NewSubreddit) -> Result<Subreddit> {
    let now = Utc::now();
    let subreddit = Subreddit {
      subreddit_id: Uuid::new_v4(),
      name:         input.name,
      description:  input.description,
      created_at:   now,
      updated_at:   now,
    };

    let id_str = encode_uuid(subreddit.subreddit_id);
    let at_str = encode_dt(now);
    let name   = subreddit.name.clone();
    let desc   = subreddit.description.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subreddits (subreddit_id, name, description, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![id_str, name, desc, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        classify(e, Constraints {
          unique: Some("a subreddit with this name already exists"),
          ..Default::default()
        })
      })?;

    debug!(name = %subreddit.name, "created subreddit");
    Ok(subreddit)
  }

  async fn list_subreddits(&self) -> Result<Vec<Subreddit>> {
    let raws: Vec<RawSubreddit> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT subreddit_id, name, description, created_at, updated_at
           FROM subreddits ORDER BY name ASC",
        )?;
        let rows = stmt
          .query_map([], raw_subreddit_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;

    raws.into_iter().map(RawSubreddit::into_subreddit).collect()
  }

  async fn subreddit_by_name(&self, name: &str) -> Result<Option<Subreddit>> {
    let name = name.to_owned();

    let raw: Option<RawSubreddit> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subreddit_id, name, description, created_at, updated_at
               FROM subreddits WHERE name = ?1",
              rusqlite::params![name],
              raw_subreddit_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;

    raw.map(RawSubreddit::into_subreddit).transpose()
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let now = Utc::now();
    let post = Post {
      post_id:      Uuid::new_v4(),
      title:        input.title,
      url:          input.url,
      user_id:      input.user_id,
      subreddit_id: input.subreddit_id,
      created_at:   now,
      updated_at:   now,
    };

    let id_str  = encode_uuid(post.post_id);
    let uid_str = encode_uuid(post.user_id);
    let sid_str = encode_uuid(post.subreddit_id);
    let at_str  = encode_dt(now);
    let title   = post.title.clone();
    let url     = post.url.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (post_id, user_id, subreddit_id, title, url, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, uid_str, sid_str, title, url, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        classify(e, Constraints {
          foreign_key: Some("post references a missing subreddit or user"),
          ..Default::default()
        })
      })?;

    debug!(post_id = %post.post_id, "created post");
    Ok(post)
  }

  async fn list_posts(
    &self,
    filter: PostFilter,
    sort: PostSort,
  ) -> Result<Vec<PostView>> {
    let sid_str = filter.subreddit_id.map(encode_uuid);
    let where_clause =
      if sid_str.is_some() { "WHERE p.subreddit_id = ?1" } else { "" };

    // Hot is ordered in Rust so the age clamp stays explicit; its cap is
    // applied after sorting.
    let tail = match sort {
      PostSort::New => format!("ORDER BY p.created_at DESC LIMIT {LISTING_LIMIT}"),
      PostSort::Top => format!("ORDER BY vote_score DESC LIMIT {LISTING_LIMIT}"),
      PostSort::Hot => String::new(),
    };

    let sql = format!(
      "{POST_VIEW_SELECT}\n  {where_clause}\n  GROUP BY p.post_id\n  {tail}"
    );

    let raws: Vec<RawPostView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = match &sid_str {
          Some(sid) => stmt
            .query_map(rusqlite::params![sid], raw_post_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], raw_post_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await
      .map_err(storage)?;

    let mut views = raws
      .into_iter()
      .map(RawPostView::into_view)
      .collect::<Result<Vec<_>>>()?;

    if sort == PostSort::Hot {
      rank::sort_by_hot(&mut views, Utc::now());
      views.truncate(LISTING_LIMIT as usize);
    }

    Ok(views)
  }

  async fn get_post(&self, post_id: Uuid) -> Result<Option<PostView>> {
    let id_str = encode_uuid(post_id);
    let sql = format!("{POST_VIEW_SELECT}\n  WHERE p.post_id = ?1\n  GROUP BY p.post_id");

    let raw: Option<RawPostView> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], raw_post_from_row)
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;

    raw.map(RawPostView::into_view).transpose()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn create_comment(&self, input: NewComment) -> Result<Comment> {
    let now = Utc::now();
    let comment = Comment {
      comment_id: Uuid::new_v4(),
      text:       input.text,
      user_id:    input.user_id,
      post_id:    input.post_id,
      created_at: now,
      updated_at: now,
    };

    let id_str  = encode_uuid(comment.comment_id);
    let uid_str = encode_uuid(comment.user_id);
    let pid_str = encode_uuid(comment.post_id);
    let at_str  = encode_dt(now);
    let text    = comment.text.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, user_id, post_id, text, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, uid_str, pid_str, text, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        classify(e, Constraints {
          foreign_key: Some("comment references a missing post or user"),
          ..Default::default()
        })
      })?;

    Ok(comment)
  }

  async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
    let pid_str = encode_uuid(post_id);
    let sql = format!(
      "SELECT c.comment_id, c.text, c.created_at, c.updated_at, u.user_id, u.username
       FROM comments c
         JOIN users u ON u.user_id = c.user_id
       WHERE c.post_id = ?1
       ORDER BY c.created_at DESC
       LIMIT {LISTING_LIMIT}"
    );

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![pid_str], |row| {
            Ok(RawComment {
              comment_id: row.get(0)?,
              text:       row.get(1)?,
              created_at: row.get(2)?,
              updated_at: row.get(3)?,
              user_id:    row.get(4)?,
              username:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(storage)?;

    raws.into_iter().map(RawComment::into_view).collect()
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn cast_vote(&self, vote: NewVote) -> Result<()> {
    let uid_str   = encode_uuid(vote.user_id);
    let pid_str   = encode_uuid(vote.post_id);
    let direction = vote.direction.as_i64();
    let at_str    = encode_dt(Utc::now());

    // One statement: the upsert is atomic at the storage layer, so two
    // concurrent casts by the same user cannot interleave a read and a
    // write. The original created_at survives repeat casts.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO votes (user_id, post_id, direction, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)
           ON CONFLICT (user_id, post_id) DO UPDATE SET
             direction  = excluded.direction,
             updated_at = excluded.updated_at",
          rusqlite::params![uid_str, pid_str, direction, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        classify(e, Constraints {
          foreign_key: Some("vote references a missing post or user"),
          ..Default::default()
        })
      })?;

    debug!(post_id = %vote.post_id, direction, "cast vote");
    Ok(())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn insert_session(&self, token: &str, user_id: Uuid) -> Result<()> {
    let token   = token.to_owned();
    let uid_str = encode_uuid(user_id);
    let at_str  = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![token, uid_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        classify(e, Constraints {
          foreign_key: Some("session references a missing user"),
          ..Default::default()
        })
      })
  }

  async fn session_user(&self, token: &str) -> Result<Option<UserProfile>> {
    let token = token.to_owned();

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT u.user_id, u.username, u.created_at, u.updated_at
               FROM sessions s
                 JOIN users u ON u.user_id = s.user_id
               WHERE s.token = ?1",
              rusqlite::params![token],
              |row| {
                Ok(RawProfile {
                  user_id:    row.get(0)?,
                  username:   row.get(1)?,
                  created_at: row.get(2)?,
                  updated_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(storage)?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn delete_sessions_for_user(&self, user_id: Uuid) -> Result<u64> {
    let uid_str = encode_uuid(user_id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n =
          conn.execute("DELETE FROM sessions WHERE user_id = ?1", rusqlite::params![uid_str])?;
        Ok(n as u64)
      })
      .await
      .map_err(storage)?;

    debug!(user_id = %user_id, deleted, "revoked sessions");
    Ok(deleted)
  }
}
