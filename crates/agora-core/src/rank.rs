//! Hot-score ranking.
//!
//! The hot score rewards both vote magnitude and recency: it is the vote
//! score divided by the post's age. Computing it here, rather than in SQL,
//! keeps the divide-by-zero policy explicit and unit-testable.

use chrono::{DateTime, Utc};

use crate::view::PostView;

/// Floor applied to a post's age before division. A post created in the
/// same instant as the query (or, with a skewed clock, after it) ranks as
/// if it were one second old instead of dividing by zero.
pub const MIN_AGE_SECS: f64 = 1.0;

/// Decay-weighted rank for a post: `vote_score / max(age_secs, 1)`.
pub fn hot_rank(vote_score: i64, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
  let age_secs = (now - created_at).num_milliseconds() as f64 / 1000.0;
  vote_score as f64 / age_secs.max(MIN_AGE_SECS)
}

/// Sort `posts` by descending hot score as of `now`. Ties keep the
/// incoming (storage) order.
pub fn sort_by_hot(posts: &mut [PostView], now: DateTime<Utc>) {
  posts.sort_by(|a, b| {
    let ra = hot_rank(a.vote_score, a.post.created_at, now);
    let rb = hot_rank(b.vote_score, b.post.created_at, now);
    rb.total_cmp(&ra)
  });
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  fn at(now: DateTime<Utc>, age_secs: i64) -> DateTime<Utc> {
    now - Duration::seconds(age_secs)
  }

  #[test]
  fn score_decays_with_age() {
    let now = Utc::now();
    let fresh = hot_rank(10, at(now, 10), now);
    let stale = hot_rank(10, at(now, 1000), now);
    assert!(fresh > stale);
  }

  #[test]
  fn higher_score_wins_at_equal_age() {
    let now = Utc::now();
    assert!(hot_rank(10, at(now, 60), now) > hot_rank(3, at(now, 60), now));
  }

  #[test]
  fn zero_age_is_clamped_not_infinite() {
    let now = Utc::now();
    let rank = hot_rank(5, now, now);
    assert!(rank.is_finite());
    assert_eq!(rank, 5.0);
  }

  #[test]
  fn future_created_at_is_clamped() {
    let now = Utc::now();
    let rank = hot_rank(5, now + Duration::seconds(30), now);
    assert!(rank.is_finite());
    assert_eq!(rank, 5.0);
  }

  #[test]
  fn negative_scores_rank_below_zero_scores() {
    let now = Utc::now();
    assert!(hot_rank(-4, at(now, 60), now) < hot_rank(0, at(now, 60), now));
  }
}
