//! devforum/crates/df-core/src/lib.rs
//!
//! The central domain logic and interface definitions for DevForum:
//! entity models, the voting/reputation ledger, and the ports that
//! plugins implement.

pub mod error;
pub mod ledger;
pub mod models;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn test_question_creation_v7() {
        let author = Uuid::now_v7();
        let q = Question::new(
            author,
            "How do I borrow twice?".to_string(),
            "The checker says no.".to_string(),
            vec!["rust".to_string()],
        );
        assert_eq!(q.author_id, author);
        assert!(q.votes.is_empty());
        assert!(!q.is_answered);
        assert!(q.selected_answer_id.is_none());
    }

    #[test]
    fn test_vote_value_domain() {
        assert!(VoteValue::try_from(1).is_ok());
        assert!(VoteValue::try_from(-1).is_ok());
        assert!(VoteValue::try_from(0).is_err());
        assert!(VoteValue::try_from(2).is_err());
    }
}
