//! The `ForumStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `agora-store-sqlite`).
//! Higher layers (`agora-auth`, the admin binary, an HTTP layer) depend on
//! this abstraction, not on any concrete backend.
//!
//! Every method is one atomic read or write; the store provides no
//! cross-statement transactions. A listing and a concurrent vote cast are
//! therefore not mutually ordered — an accepted property, not a bug. The
//! one place atomicity matters, the vote upsert, must be a single
//! conflict-handling statement at the storage layer.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result,
  model::{
    Comment, NewComment, NewPost, NewSubreddit, NewUser, NewVote, Post,
    Subreddit, User, UserProfile,
  },
  view::{CommentView, PostView},
};

/// Listings (posts, comments) are capped at this many rows.
pub const LISTING_LIMIT: u32 = 25;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Row filter for [`ForumStore::list_posts`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
  /// Restrict the listing to one subreddit.
  pub subreddit_id: Option<Uuid>,
}

/// Ordering for [`ForumStore::list_posts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
  /// Most recently created first.
  #[default]
  New,
  /// Highest vote score first.
  Top,
  /// Highest decay-weighted score first; see [`crate::rank::hot_rank`].
  Hot,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Agora storage backend.
///
/// Implementations classify their raw driver errors into the
/// [`crate::Error`] taxonomy at this boundary: unique-constraint hits
/// become `Conflict`, dangling references become `Validation`, and anything
/// else becomes `Storage`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait ForumStore: Send + Sync {
  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user with an already-hashed password. A duplicate
  /// username fails with `Conflict`.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User>> + Send + '_;

  /// Look up a user (including the password hash) by username. Returns
  /// `None` if absent. Only the credential/session layer should call this;
  /// everything outward uses [`UserProfile`].
  fn user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>>> + Send + 'a;

  // ── Subreddits ────────────────────────────────────────────────────────

  /// Persist a new subreddit. A duplicate name fails with `Conflict`.
  fn create_subreddit(
    &self,
    input: NewSubreddit,
  ) -> impl Future<Output = Result<Subreddit>> + Send + '_;

  /// All subreddits, ordered by name ascending.
  fn list_subreddits(
    &self,
  ) -> impl Future<Output = Result<Vec<Subreddit>>> + Send + '_;

  /// Look up a subreddit by its unique name. Returns `None` if absent.
  fn subreddit_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Subreddit>>> + Send + 'a;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Persist a new post. A `subreddit_id` that references no subreddit
  /// fails with `Validation`.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post>> + Send + '_;

  /// Aggregated post listing: author and subreddit embedded, vote tallies
  /// computed, ordered by `sort`, capped at [`LISTING_LIMIT`].
  fn list_posts(
    &self,
    filter: PostFilter,
    sort: PostSort,
  ) -> impl Future<Output = Result<Vec<PostView>>> + Send + '_;

  /// The same aggregation restricted to one post. Returns `None` (not an
  /// error) when the post does not exist.
  fn get_post(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Option<PostView>>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn create_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment>> + Send + '_;

  /// Comments on a post, newest first, capped at [`LISTING_LIMIT`], each
  /// carrying only the minimal author embed.
  fn comments_for_post(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CommentView>>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Record or overwrite this user's vote on a post. Must be a single
  /// atomic upsert: after any number of casts by the same (user, post)
  /// pair, exactly one row exists, holding the last direction.
  fn cast_vote(
    &self,
    vote: NewVote,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Persist a (token, user) session row.
  fn insert_session<'a>(
    &'a self,
    token: &'a str,
    user_id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Resolve a session token to the owning user's public profile. Returns
  /// `None` if no session matches; the session manager maps that to
  /// `SessionNotFound`.
  fn session_user<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<UserProfile>>> + Send + 'a;

  /// Delete every session belonging to `user_id`, returning how many rows
  /// were removed.
  fn delete_sessions_for_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<u64>> + Send + '_;
}
