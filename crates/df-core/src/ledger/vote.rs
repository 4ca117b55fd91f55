//! Vote mutator: applies one user's vote intent to a vote set.
//!
//! Semantics are an idempotent toggle: voting the same way twice removes
//! the vote, voting the other way flips it.

use uuid::Uuid;

use crate::models::{Vote, VoteValue};

/// What `apply_vote` did to the vote set, carrying the requested value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// No prior vote from this user; one was inserted.
    Cast(VoteValue),
    /// Prior vote had the same value; it was removed (un-vote).
    Removed(VoteValue),
    /// Prior vote had the opposite value; it was replaced.
    Flipped(VoteValue),
}

impl VoteOutcome {
    /// Net change to the vote count caused by this mutation.
    pub fn score_delta(self) -> i64 {
        match self {
            VoteOutcome::Cast(v) => v.as_i64(),
            VoteOutcome::Removed(v) => -v.as_i64(),
            VoteOutcome::Flipped(v) => 2 * v.as_i64(),
        }
    }
}

/// Applies `user_id`'s vote of `value` to `votes`, preserving the
/// one-entry-per-user invariant. Returns what happened so the caller can
/// propagate reputation.
pub fn apply_vote(votes: &mut Vec<Vote>, user_id: Uuid, value: VoteValue) -> VoteOutcome {
    match votes.iter().position(|v| v.user_id == user_id) {
        Some(idx) if votes[idx].value == value => {
            votes.remove(idx);
            VoteOutcome::Removed(value)
        }
        Some(idx) => {
            votes[idx].value = value;
            VoteOutcome::Flipped(value)
        }
        None => {
            votes.push(Vote { user_id, value });
            VoteOutcome::Cast(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::score::vote_count;

    #[test]
    fn fresh_vote_is_inserted() {
        let mut votes = Vec::new();
        let user = Uuid::now_v7();
        let outcome = apply_vote(&mut votes, user, VoteValue::Up);
        assert_eq!(outcome, VoteOutcome::Cast(VoteValue::Up));
        assert_eq!(outcome.score_delta(), 1);
        assert_eq!(vote_count(&votes), 1);
    }

    #[test]
    fn repeat_vote_removes_itself() {
        let mut votes = Vec::new();
        let user = Uuid::now_v7();
        apply_vote(&mut votes, user, VoteValue::Up);
        let outcome = apply_vote(&mut votes, user, VoteValue::Up);
        assert_eq!(outcome, VoteOutcome::Removed(VoteValue::Up));
        assert_eq!(outcome.score_delta(), -1);
        assert!(votes.is_empty());
    }

    #[test]
    fn opposite_vote_flips_with_double_delta() {
        let mut votes = Vec::new();
        let user = Uuid::now_v7();
        apply_vote(&mut votes, user, VoteValue::Up);
        let outcome = apply_vote(&mut votes, user, VoteValue::Down);
        assert_eq!(outcome, VoteOutcome::Flipped(VoteValue::Down));
        assert_eq!(outcome.score_delta(), -2);
        assert_eq!(vote_count(&votes), -1);
        // Still exactly one entry for this user.
        assert_eq!(votes.len(), 1);
    }

    #[test]
    fn one_entry_per_user_across_many_users() {
        let mut votes = Vec::new();
        let (a, b, c) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        apply_vote(&mut votes, a, VoteValue::Up);
        apply_vote(&mut votes, b, VoteValue::Up);
        apply_vote(&mut votes, c, VoteValue::Down);
        apply_vote(&mut votes, b, VoteValue::Down); // flip
        assert_eq!(votes.len(), 3);
        assert_eq!(vote_count(&votes), -1);
    }
}
