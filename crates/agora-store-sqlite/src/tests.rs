//! Integration tests for `SqliteStore` against an in-memory database.

use std::time::Duration;

use agora_core::{
  Error,
  model::{
    NewComment, NewPost, NewSubreddit, NewUser, NewVote, Post, Subreddit,
    User, VoteDirection,
  },
  store::{ForumStore, LISTING_LIMIT, PostFilter, PostSort},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

async fn user(s: &SqliteStore, username: &str) -> User {
  s.create_user(NewUser {
    username:      username.into(),
    password_hash: format!("$argon2id$fake-hash-for-{username}"),
  })
  .await
  .unwrap()
}

async fn subreddit(s: &SqliteStore, name: &str) -> Subreddit {
  s.create_subreddit(NewSubreddit {
    name:        name.into(),
    description: Some(format!("all about {name}")),
  })
  .await
  .unwrap()
}

async fn post(s: &SqliteStore, author: &User, sub: &Subreddit, title: &str) -> Post {
  s.create_post(NewPost {
    user_id:      author.user_id,
    title:        title.into(),
    url:          format!("http://example.com/{title}"),
    subreddit_id: sub.subreddit_id,
  })
  .await
  .unwrap()
}

async fn vote(s: &SqliteStore, voter: &User, p: &Post, direction: i64) {
  s.cast_vote(NewVote {
    user_id:   voter.user_id,
    post_id:   p.post_id,
    direction: VoteDirection::try_from(direction).unwrap(),
  })
  .await
  .unwrap()
}

// Creation timestamps order the "new" listing; keep them distinct.
async fn tick() {
  tokio::time::sleep(Duration::from_millis(3)).await;
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_fetch_user() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let fetched = s.user_by_username("alice").await.unwrap().unwrap();
  assert_eq!(fetched.user_id, alice.user_id);
  assert_eq!(fetched.username, "alice");
  assert_eq!(fetched.password_hash, alice.password_hash);
}

#[tokio::test]
async fn unknown_username_returns_none() {
  let s = store().await;
  assert!(s.user_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
  let s = store().await;
  user(&s, "alice").await;

  let err = s
    .create_user(NewUser {
      username:      "alice".into(),
      password_hash: "another-hash".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

// ─── Subreddits ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_list_subreddits_round_trips() {
  let s = store().await;
  let cats = subreddit(&s, "cats").await;

  let all = s.list_subreddits().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].subreddit_id, cats.subreddit_id);
  assert_eq!(all[0].name, "cats");
  assert_eq!(all[0].description.as_deref(), Some("all about cats"));
}

#[tokio::test]
async fn subreddits_list_in_name_order() {
  let s = store().await;
  subreddit(&s, "zebras").await;
  subreddit(&s, "aquaria").await;
  subreddit(&s, "cats").await;

  let names: Vec<_> = s
    .list_subreddits()
    .await
    .unwrap()
    .into_iter()
    .map(|sub| sub.name)
    .collect();
  assert_eq!(names, ["aquaria", "cats", "zebras"]);
}

#[tokio::test]
async fn duplicate_subreddit_name_is_a_conflict() {
  let s = store().await;
  subreddit(&s, "cats").await;

  let err = s
    .create_subreddit(NewSubreddit { name: "cats".into(), description: None })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn subreddit_by_name_lookup() {
  let s = store().await;
  let cats = subreddit(&s, "cats").await;

  let found = s.subreddit_by_name("cats").await.unwrap().unwrap();
  assert_eq!(found, cats);
  assert!(s.subreddit_by_name("dogs").await.unwrap().is_none());
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_post_builds_the_nested_view() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let cats = subreddit(&s, "cats").await;
  let p = post(&s, &alice, &cats, "cute").await;

  let view = s.get_post(p.post_id).await.unwrap().unwrap();
  assert_eq!(view.post.post_id, p.post_id);
  assert_eq!(view.post.title, "cute");
  assert_eq!(view.post.url, "http://example.com/cute");
  assert_eq!(view.user.username, "alice");
  assert_eq!(view.subreddit.name, "cats");
  assert_eq!(view.vote_score, 0);
  assert_eq!(view.num_upvotes, 0);
  assert_eq!(view.num_downvotes, 0);
}

#[tokio::test]
async fn get_post_missing_returns_none() {
  let s = store().await;
  assert!(s.get_post(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn post_into_unknown_subreddit_is_a_validation_error() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let err = s
    .create_post(NewPost {
      user_id:      alice.user_id,
      title:        "lost".into(),
      url:          "http://example.com/lost".into(),
      subreddit_id: Uuid::new_v4(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn repeat_votes_overwrite_in_place() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let cats = subreddit(&s, "cats").await;
  let p = post(&s, &alice, &cats, "cute").await;

  vote(&s, &alice, &p, 1).await;
  vote(&s, &alice, &p, 1).await;
  vote(&s, &alice, &p, -1).await;

  // Exactly one row survives, holding the last direction.
  let view = s.get_post(p.post_id).await.unwrap().unwrap();
  assert_eq!(view.vote_score, -1);
  assert_eq!(view.num_upvotes, 0);
  assert_eq!(view.num_downvotes, 1);
}

#[tokio::test]
async fn opposing_votes_cancel_but_both_count() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let cats = subreddit(&s, "cats").await;
  let p = post(&s, &alice, &cats, "cute").await;

  vote(&s, &alice, &p, 1).await;
  vote(&s, &bob, &p, -1).await;

  let view = s.get_post(p.post_id).await.unwrap().unwrap();
  assert_eq!(view.vote_score, 0);
  assert_eq!(view.num_upvotes, 1);
  assert_eq!(view.num_downvotes, 1);
}

#[tokio::test]
async fn cleared_votes_count_toward_neither_tally() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let carol = user(&s, "carol").await;
  let cats = subreddit(&s, "cats").await;
  let p = post(&s, &alice, &cats, "cute").await;

  vote(&s, &alice, &p, 1).await;
  vote(&s, &bob, &p, 1).await;
  vote(&s, &carol, &p, 1).await;
  vote(&s, &carol, &p, 0).await;

  let view = s.get_post(p.post_id).await.unwrap().unwrap();
  assert_eq!(view.vote_score, 2);
  assert_eq!(view.num_upvotes, 2);
  assert_eq!(view.num_downvotes, 0);
  assert_eq!(
    view.vote_score,
    i64::from(view.num_upvotes) - i64::from(view.num_downvotes)
  );
}

#[tokio::test]
async fn vote_on_unknown_post_is_a_validation_error() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let err = s
    .cast_vote(NewVote {
      user_id:   alice.user_id,
      post_id:   Uuid::new_v4(),
      direction: VoteDirection::Up,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_listing_is_newest_first() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let cats = subreddit(&s, "cats").await;

  post(&s, &alice, &cats, "first").await;
  tick().await;
  post(&s, &alice, &cats, "second").await;
  tick().await;
  post(&s, &alice, &cats, "third").await;

  let titles: Vec<_> = s
    .list_posts(PostFilter::default(), PostSort::New)
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.post.title)
    .collect();
  assert_eq!(titles, ["third", "second", "first"]);
}

#[tokio::test]
async fn top_listing_is_highest_score_first() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let cats = subreddit(&s, "cats").await;

  let low = post(&s, &alice, &cats, "low").await;
  let high = post(&s, &alice, &cats, "high").await;
  let mid = post(&s, &alice, &cats, "mid").await;

  vote(&s, &alice, &high, 1).await;
  vote(&s, &bob, &high, 1).await;
  vote(&s, &alice, &mid, 1).await;
  vote(&s, &bob, &low, -1).await;

  let views = s
    .list_posts(PostFilter::default(), PostSort::Top)
    .await
    .unwrap();
  let titles: Vec<_> = views.iter().map(|v| v.post.title.as_str()).collect();
  assert_eq!(titles, ["high", "mid", "low"]);

  let scores: Vec<_> = views.iter().map(|v| v.vote_score).collect();
  assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn hot_listing_ranks_fresh_posts_by_score() {
  // All posts here are younger than the 1-second age floor, so hot rank
  // degenerates to the raw score — which makes the ordering deterministic.
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let cats = subreddit(&s, "cats").await;

  let quiet = post(&s, &alice, &cats, "quiet").await;
  let loud = post(&s, &alice, &cats, "loud").await;

  vote(&s, &alice, &loud, 1).await;
  vote(&s, &bob, &loud, 1).await;
  vote(&s, &alice, &quiet, 1).await;

  let titles: Vec<_> = s
    .list_posts(PostFilter::default(), PostSort::Hot)
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.post.title)
    .collect();
  assert_eq!(titles, ["loud", "quiet"]);
}

#[tokio::test]
async fn listing_filters_by_subreddit() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let cats = subreddit(&s, "cats").await;
  let dogs = subreddit(&s, "dogs").await;

  post(&s, &alice, &cats, "meow").await;
  post(&s, &alice, &dogs, "woof").await;

  let views = s
    .list_posts(
      PostFilter { subreddit_id: Some(cats.subreddit_id) },
      PostSort::New,
    )
    .await
    .unwrap();
  assert_eq!(views.len(), 1);
  assert_eq!(views[0].post.title, "meow");
  assert_eq!(views[0].subreddit.subreddit_id, cats.subreddit_id);
}

#[tokio::test]
async fn listing_is_capped() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let cats = subreddit(&s, "cats").await;

  for i in 0..(LISTING_LIMIT + 5) {
    post(&s, &alice, &cats, &format!("post-{i}")).await;
  }

  let views = s
    .list_posts(PostFilter::default(), PostSort::New)
    .await
    .unwrap();
  assert_eq!(views.len(), LISTING_LIMIT as usize);
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comments_list_newest_first_with_minimal_author() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let bob = user(&s, "bob").await;
  let cats = subreddit(&s, "cats").await;
  let p = post(&s, &alice, &cats, "cute").await;

  s.create_comment(NewComment {
    user_id: alice.user_id,
    post_id: p.post_id,
    text:    "so cute".into(),
  })
  .await
  .unwrap();
  tick().await;
  s.create_comment(NewComment {
    user_id: bob.user_id,
    post_id: p.post_id,
    text:    "agreed".into(),
  })
  .await
  .unwrap();

  let comments = s.comments_for_post(p.post_id).await.unwrap();
  assert_eq!(comments.len(), 2);
  assert_eq!(comments[0].text, "agreed");
  assert_eq!(comments[0].user.username, "bob");
  assert_eq!(comments[0].user.user_id, bob.user_id);
  assert_eq!(comments[1].text, "so cute");
  assert_eq!(comments[1].user.username, "alice");
}

#[tokio::test]
async fn comment_listing_is_capped() {
  let s = store().await;
  let alice = user(&s, "alice").await;
  let cats = subreddit(&s, "cats").await;
  let p = post(&s, &alice, &cats, "busy").await;

  for i in 0..(LISTING_LIMIT + 5) {
    s.create_comment(NewComment {
      user_id: alice.user_id,
      post_id: p.post_id,
      text:    format!("comment-{i}"),
    })
    .await
    .unwrap();
  }

  let comments = s.comments_for_post(p.post_id).await.unwrap();
  assert_eq!(comments.len(), LISTING_LIMIT as usize);
}

#[tokio::test]
async fn comment_on_unknown_post_is_a_validation_error() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  let err = s
    .create_comment(NewComment {
      user_id: alice.user_id,
      post_id: Uuid::new_v4(),
      text:    "into the void".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_rows_resolve_to_the_public_profile() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  s.insert_session("tok-1", alice.user_id).await.unwrap();

  let profile = s.session_user("tok-1").await.unwrap().unwrap();
  assert_eq!(profile, alice.profile());
}

#[tokio::test]
async fn unknown_token_resolves_to_none() {
  let s = store().await;
  assert!(s.session_user("no-such-token").await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_sessions_reports_affected_rows() {
  let s = store().await;
  let alice = user(&s, "alice").await;

  s.insert_session("tok-1", alice.user_id).await.unwrap();
  s.insert_session("tok-2", alice.user_id).await.unwrap();

  assert_eq!(s.delete_sessions_for_user(alice.user_id).await.unwrap(), 2);
  assert_eq!(s.delete_sessions_for_user(alice.user_id).await.unwrap(), 0);
  assert!(s.session_user("tok-1").await.unwrap().is_none());
}
