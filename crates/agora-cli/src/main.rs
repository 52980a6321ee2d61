//! `agora` — admin tool for the Agora forum store.
//!
//! Opens the SQLite store named in `agora.toml` (or `--config`, or
//! `AGORA_STORE_PATH`) and runs one maintenance command against it:
//! registering users, creating subreddits, seeding demo data, printing
//! listings as JSON, or hashing a password. This binary is the only process-bootstrap surface in
//! the workspace; it serves nothing over the network.

use std::{path::PathBuf, sync::Arc};

use agora_auth::{SessionManager, credentials};
use agora_core::model::{NewComment, NewPost, NewSubreddit, NewVote, VoteDirection};
use agora_core::store::{ForumStore, PostFilter, PostSort};
use agora_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "agora", about = "Admin tool for the Agora forum store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "agora.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create (or migrate) the database file and exit.
  Init,

  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,

  /// Register a user; the password is read from stdin.
  AddUser { username: String },

  /// Create a subreddit.
  AddSubreddit {
    name: String,
    #[arg(long)]
    description: Option<String>,
  },

  /// Print all subreddits as JSON.
  Subreddits,

  /// Populate the store with a demo user, subreddit, and a few voted and
  /// commented posts.
  Seed,

  /// Print a post listing as JSON.
  Posts {
    /// Restrict to one subreddit, by name.
    #[arg(long)]
    subreddit: Option<String>,

    /// Ordering: new, top, or hot.
    #[arg(long, default_value = "new")]
    sort: String,
  },

  /// Print one post and its comments as JSON.
  Post { post_id: uuid::Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `agora.toml` with `AGORA_*`
/// environment overrides.
#[derive(Deserialize)]
struct CliConfig {
  store_path: PathBuf,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit, no store needed.
  if matches!(cli.command, Command::HashPassword) {
    let password = read_password()?;
    println!("{}", credentials::hash_password(&password)?);
    return Ok(());
  }

  let settings = config::Config::builder()
    .set_default("store_path", "agora.db")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("AGORA"))
    .build()
    .context("failed to read config")?;
  let cfg: CliConfig = settings
    .try_deserialize()
    .context("failed to deserialise config")?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let store = Arc::new(store);

  match cli.command {
    Command::HashPassword => unreachable!("handled above"),

    Command::Init => {
      // Opening already ran the schema.
      println!("store ready at {}", cfg.store_path.display());
    }

    Command::AddUser { username } => {
      let sessions = SessionManager::new(store.clone());
      let password = read_password()?;
      let profile = sessions.register(&username, &password).await?;
      println!("{}", serde_json::to_string_pretty(&profile)?);
    }

    Command::AddSubreddit { name, description } => {
      let subreddit = store
        .create_subreddit(NewSubreddit { name, description })
        .await?;
      println!("{}", serde_json::to_string_pretty(&subreddit)?);
    }

    Command::Subreddits => {
      let all = store.list_subreddits().await?;
      println!("{}", serde_json::to_string_pretty(&all)?);
    }

    Command::Seed => {
      let sessions = SessionManager::new(store.clone());
      seed_demo(&*store, &sessions).await?;
      println!("seeded demo data into {}", cfg.store_path.display());
    }

    Command::Posts { subreddit, sort } => {
      let subreddit_id = match subreddit {
        Some(name) => Some(
          store
            .subreddit_by_name(&name)
            .await?
            .with_context(|| format!("no subreddit named {name:?}"))?
            .subreddit_id,
        ),
        None => None,
      };
      let views = store
        .list_posts(PostFilter { subreddit_id }, parse_sort(&sort)?)
        .await?;
      println!("{}", serde_json::to_string_pretty(&views)?);
    }

    Command::Post { post_id } => {
      let view = store
        .get_post(post_id)
        .await?
        .with_context(|| format!("no post with id {post_id}"))?;
      let comments = store.comments_for_post(post_id).await?;
      let out = serde_json::json!({ "post": view, "comments": comments });
      println!("{}", serde_json::to_string_pretty(&out)?);
    }
  }

  Ok(())
}

/// Fill an empty store with enough data to browse: one user, one
/// subreddit, and three posts each carrying a vote and a comment.
async fn seed_demo<S: ForumStore>(
  store: &S,
  sessions: &SessionManager<S>,
) -> anyhow::Result<()> {
  let demo = sessions.register("demo", "demo-password").await?;
  let cats = store
    .create_subreddit(NewSubreddit {
      name:        "cats".into(),
      description: Some("feline links".into()),
    })
    .await?;

  for (title, url) in [
    ("cute", "http://example.com/cute"),
    ("aloof", "http://example.com/aloof"),
    ("asleep", "http://example.com/asleep"),
  ] {
    let post = store
      .create_post(NewPost {
        user_id:      demo.user_id,
        title:        title.into(),
        url:          url.into(),
        subreddit_id: cats.subreddit_id,
      })
      .await?;
    store
      .cast_vote(NewVote {
        user_id:   demo.user_id,
        post_id:   post.post_id,
        direction: VoteDirection::Up,
      })
      .await?;
    store
      .create_comment(NewComment {
        user_id: demo.user_id,
        post_id: post.post_id,
        text:    format!("first look at {title}"),
      })
      .await?;
  }

  Ok(())
}

fn parse_sort(s: &str) -> anyhow::Result<PostSort> {
  match s {
    "new" => Ok(PostSort::New),
    "top" => Ok(PostSort::Top),
    "hot" => Ok(PostSort::Hot),
    other => anyhow::bail!("unknown sort {other:?} (expected new, top, or hot)"),
  }
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
  }

  #[tokio::test]
  async fn seed_populates_a_browsable_store() {
    let store = store().await;
    let sessions = SessionManager::new(store.clone());

    seed_demo(&*store, &sessions).await.unwrap();

    let views = store
      .list_posts(PostFilter::default(), PostSort::Top)
      .await
      .unwrap();
    assert_eq!(views.len(), 3);
    assert!(views.iter().all(|v| v.subreddit.name == "cats"));
    assert!(views.iter().all(|v| v.user.username == "demo"));
    assert!(views.iter().all(|v| v.vote_score == 1));

    let comments = store
      .comments_for_post(views[0].post.post_id)
      .await
      .unwrap();
    assert_eq!(comments.len(), 1);
  }

  #[tokio::test]
  async fn seeded_credentials_log_in() {
    let store = store().await;
    let sessions = SessionManager::new(store.clone());

    seed_demo(&*store, &sessions).await.unwrap();

    let (profile, token) = sessions.login("demo", "demo-password").await.unwrap();
    assert_eq!(profile.username, "demo");
    assert_eq!(sessions.resolve_session(&token).await.unwrap(), profile);
  }

  #[test]
  fn parse_sort_accepts_each_ordering() {
    assert!(matches!(parse_sort("new"), Ok(PostSort::New)));
    assert!(matches!(parse_sort("top"), Ok(PostSort::Top)));
    assert!(matches!(parse_sort("hot"), Ok(PostSort::Hot)));
    assert!(parse_sort("controversial").is_err());
  }
}
