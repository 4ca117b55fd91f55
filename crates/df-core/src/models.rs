//! # Domain Models
//!
//! These structs represent the core entities of DevForum.
//! We use UUID v7 for time-ordered, globally unique identification.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::error::AppError;

/// A registered account. `reputation` is mutated only by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string; never serialized to clients.
    pub password_hash: String,
    /// Non-negative; the ledger clamps every adjustment at 0.
    pub reputation: i64,
    pub bio: String,
    pub avatar: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// One user's vote on a question or answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: Uuid,
    pub value: VoteValue,
}

/// The only two legal vote values. Anything else is rejected at the
/// boundary before it reaches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i64(self) -> i64 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(v: VoteValue) -> i64 {
        v.as_i64()
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = AppError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(AppError::ValidationError(format!(
                "vote value must be 1 or -1, got {other}"
            ))),
        }
    }
}

/// A tagged question. Tags are normalized (lowercase, trimmed) on creation
/// and double as community names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author_id: Uuid,
    pub tags: Vec<String>,
    /// At most one entry per user; enforced by `ledger::vote::apply_vote`.
    pub votes: Vec<Vote>,
    pub answer_ids: Vec<Uuid>,
    pub views: i64,
    pub is_answered: bool,
    pub selected_answer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn new(author_id: Uuid, title: String, body: String, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title,
            body,
            author_id,
            tags,
            votes: Vec::new(),
            answer_ids: Vec::new(),
            views: 0,
            is_answered: false,
            selected_answer_id: None,
            created_at: Utc::now(),
        }
    }
}

/// An answer to a question. At most one answer per question carries
/// `is_accepted = true` (enforced by the acceptance script, not the store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub body: String,
    pub question_id: Uuid,
    pub author_id: Uuid,
    pub votes: Vec<Vote>,
    pub comment_ids: Vec<Uuid>,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(question_id: Uuid, author_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            body,
            question_id,
            author_id,
            votes: Vec::new(),
            comment_ids: Vec::new(),
            is_accepted: false,
            created_at: Utc::now(),
        }
    }
}

/// A short remark attached to an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub body: String,
    pub author_id: Uuid,
    pub answer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A single community rule entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityRule {
    pub title: String,
    pub description: String,
}

/// An explicitly created community, keyed by a tag name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: Uuid,
    /// Lowercase, `[a-z0-9]+`, 2-30 chars; unique.
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub created_by: Uuid,
    pub moderators: Vec<Uuid>,
    pub member_count: i64,
    /// Eventually-consistent tag usage counter; recomputed from the
    /// question collection where exactness matters.
    pub post_count: i64,
    pub is_public: bool,
    pub rules: Vec<CommunityRule>,
    pub created_at: DateTime<Utc>,
}

/// Result of a community lookup by name. Tags with questions but no
/// Community row resolve to a read-only placeholder instead of failing.
#[derive(Debug, Clone)]
pub enum ResolvedCommunity {
    Stored(Community),
    Synthesized { name: String, post_count: i64 },
}

impl ResolvedCommunity {
    /// Capitalized display name for tag-derived placeholders.
    pub fn display_name_for(name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}
