//! Score derivation: vote counts, time-decayed question rank, and the
//! display order of answers within a thread.
//!
//! The decayed score is a pure function of (votes, created_at, now) computed
//! at read time; nothing is stored, so it can never go stale between writes.

use chrono::{DateTime, Utc};

use crate::models::{Answer, Vote};

/// Sum of the vote set. Displayed as the entity's score.
pub fn vote_count(votes: &[Vote]) -> i64 {
    votes.iter().map(|v| v.value.as_i64()).sum()
}

/// Recency-weighted rank: vote count minus age in fractional days.
pub fn decayed_score(votes: &[Vote], created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_days = (now - created_at).num_milliseconds() as f64 / 86_400_000.0;
    vote_count(votes) as f64 - age_days
}

/// Orders answers for display: accepted first, then descending vote count.
pub fn rank_answers(answers: &mut [Answer]) {
    answers.sort_by(|a, b| {
        b.is_accepted
            .cmp(&a.is_accepted)
            .then_with(|| vote_count(&b.votes).cmp(&vote_count(&a.votes)))
    });
}
