//! SQL schema for the Agora SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` pragma.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subreddits (
    subreddit_id TEXT PRIMARY KEY,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    post_id      TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(user_id),
    subreddit_id TEXT NOT NULL REFERENCES subreddits(subreddit_id),
    title        TEXT NOT NULL,
    url          TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    post_id    TEXT NOT NULL REFERENCES posts(post_id),
    text       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- At most one vote per (user, post); repeat casts update the row in place
-- through the upsert in cast_vote.
CREATE TABLE IF NOT EXISTS votes (
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    post_id    TEXT NOT NULL REFERENCES posts(post_id),
    direction  INTEGER NOT NULL,   -- -1 | 0 | 1
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, post_id)
);

CREATE TABLE IF NOT EXISTS sessions (
    token      TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_subreddit_idx ON posts(subreddit_id);
CREATE INDEX IF NOT EXISTS posts_created_idx   ON posts(created_at);
CREATE INDEX IF NOT EXISTS comments_post_idx   ON comments(post_id);
CREATE INDEX IF NOT EXISTS votes_post_idx      ON votes(post_id);
CREATE INDEX IF NOT EXISTS sessions_user_idx   ON sessions(user_id);

PRAGMA user_version = 1;
";
