//! # Voting & Reputation Ledger
//!
//! The pure half of the ledger: vote-set mutation, reputation policy, and
//! score derivation. These functions touch no I/O; the services crate
//! applies their results to the persistence port.

pub mod reputation;
pub mod score;
pub mod vote;

pub use reputation::{clamp_reputation, vote_reputation_delta, ACCEPT_BONUS, DOWNVOTE_REP, UPVOTE_REP};
pub use score::{decayed_score, rank_answers, vote_count};
pub use vote::{apply_vote, VoteOutcome};
