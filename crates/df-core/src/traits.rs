//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Answer, Comment, Community, Question, User};

/// How a question listing is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionSort {
    #[default]
    Newest,
    Oldest,
    MostViewed,
}

/// Filter + pagination parameters for question listings.
#[derive(Debug, Clone, Default)]
pub struct QuestionQuery {
    /// Substring match against title and body.
    pub search: Option<String>,
    /// Exact match against a normalized tag.
    pub tag: Option<String>,
    pub sort: QuestionSort,
    pub limit: i64,
    pub offset: i64,
}

/// Data persistence contract for users, questions, answers, comments,
/// and communities. The store is a plain CRUD collaborator: it guarantees
/// no atomicity across calls and no atomic increments. All bookkeeping
/// invariants live in the ledger/services, not here.
#[async_trait]
pub trait ForumRepo: Send + Sync {
    // User operations
    async fn create_user(&self, user: User) -> anyhow::Result<()>;
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn update_user(&self, user: &User) -> anyhow::Result<()>;

    // Question operations
    async fn create_question(&self, question: Question) -> anyhow::Result<()>;
    async fn get_question(&self, id: Uuid) -> anyhow::Result<Option<Question>>;
    async fn update_question(&self, question: &Question) -> anyhow::Result<()>;
    async fn delete_question(&self, id: Uuid) -> anyhow::Result<()>;
    async fn list_questions(&self, query: &QuestionQuery) -> anyhow::Result<Vec<Question>>;
    async fn count_questions(&self, query: &QuestionQuery) -> anyhow::Result<i64>;
    async fn questions_by_author(&self, author_id: Uuid, limit: i64, offset: i64) -> anyhow::Result<Vec<Question>>;
    async fn count_questions_by_author(&self, author_id: Uuid) -> anyhow::Result<i64>;
    async fn count_questions_with_tag(&self, tag: &str) -> anyhow::Result<i64>;
    /// Tag usage counts across all questions, most used first.
    async fn tag_counts(&self, limit: i64) -> anyhow::Result<Vec<(String, i64)>>;

    // Answer operations
    async fn create_answer(&self, answer: Answer) -> anyhow::Result<()>;
    async fn get_answer(&self, id: Uuid) -> anyhow::Result<Option<Answer>>;
    async fn update_answer(&self, answer: &Answer) -> anyhow::Result<()>;
    async fn delete_answer(&self, id: Uuid) -> anyhow::Result<()>;
    async fn answers_for_question(&self, question_id: Uuid) -> anyhow::Result<Vec<Answer>>;
    async fn delete_answers_for_question(&self, question_id: Uuid) -> anyhow::Result<()>;
    async fn answers_by_author(&self, author_id: Uuid, limit: i64, offset: i64) -> anyhow::Result<Vec<Answer>>;
    async fn count_answers_by_author(&self, author_id: Uuid) -> anyhow::Result<i64>;
    /// Clears `is_accepted` on every answer of the question except `except`.
    async fn unaccept_other_answers(&self, question_id: Uuid, except: Uuid) -> anyhow::Result<()>;

    // Comment operations
    async fn create_comment(&self, comment: Comment) -> anyhow::Result<()>;
    async fn get_comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>>;
    async fn comments_for_answer(&self, answer_id: Uuid) -> anyhow::Result<Vec<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> anyhow::Result<()>;
    async fn delete_comments_for_answer(&self, answer_id: Uuid) -> anyhow::Result<()>;

    // Community operations
    async fn create_community(&self, community: Community) -> anyhow::Result<()>;
    async fn get_community_by_name(&self, name: &str) -> anyhow::Result<Option<Community>>;
    async fn update_community(&self, community: &Community) -> anyhow::Result<()>;
    async fn list_communities(&self, search: Option<&str>, limit: i64, offset: i64) -> anyhow::Result<Vec<Community>>;
    async fn count_communities(&self, search: Option<&str>) -> anyhow::Result<i64>;
    /// All public communities, most members first (used by the popular feed).
    async fn list_public_communities(&self) -> anyhow::Result<Vec<Community>>;
}

/// Identity contract: password credentials and opaque bearer tokens.
/// Token issuance/verification is a collaborator, not part of the ledger.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn hash_password(&self, password: &str) -> anyhow::Result<String>;
    fn verify_password(&self, password: &str, hash: &str) -> bool;
    /// Issues a bearer token carrying the user id.
    fn issue_token(&self, user_id: Uuid) -> anyhow::Result<String>;
    /// Returns the user id the token was issued for, or None if invalid/expired.
    fn verify_token(&self, token: &str) -> Option<Uuid>;
}
