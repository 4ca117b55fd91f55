//! Reputation policy: fixed deltas keyed off the vote's resulting state.
//!
//! Note the deliberate asymmetry, carried over from the observed system:
//! a fresh or flipped vote awards the full delta for its value, but
//! removing a vote (un-vote) awards nothing and reverses nothing.

use crate::models::VoteValue;

use super::vote::VoteOutcome;

/// Awarded to the author when someone upvotes their post.
pub const UPVOTE_REP: i64 = 10;
/// Applied to the author when someone downvotes their post.
pub const DOWNVOTE_REP: i64 = -2;
/// Awarded to an answer's author when the question author accepts it.
pub const ACCEPT_BONUS: i64 = 15;

/// Reputation delta for the author of the voted-on entity. Keys off the
/// final vote state, not the score delta: a flip Down awards -2, not -12.
pub fn vote_reputation_delta(outcome: VoteOutcome) -> i64 {
    match outcome {
        VoteOutcome::Cast(VoteValue::Up) | VoteOutcome::Flipped(VoteValue::Up) => UPVOTE_REP,
        VoteOutcome::Cast(VoteValue::Down) | VoteOutcome::Flipped(VoteValue::Down) => DOWNVOTE_REP,
        VoteOutcome::Removed(_) => 0,
    }
}

/// Reputation never goes negative; the floor is a silent clamp, not an error.
pub fn clamp_reputation(reputation: i64) -> i64 {
    reputation.max(0)
}
