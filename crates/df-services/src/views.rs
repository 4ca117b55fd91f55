//! Read models returned to the HTTP layer.
//!
//! Vote sets are never serialized to clients; only the derived vote count
//! leaves the service boundary. Field names are camelCase to match the
//! wire format the client expects.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use df_core::ledger::{decayed_score, vote_count};
use df_core::models::{Answer, Comment, Community, Question, ResolvedCommunity, User};

/// A page of results plus the pagination envelope fields.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: i64,
    pub current_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            total / limit + i64::from(total % limit != 0)
        } else {
            0
        };
        Self { items, total_pages, current_page: page }
    }
}

/// The author fields attached to posts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInfo {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
    pub reputation: i64,
}

impl AuthorInfo {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar: user.avatar.clone(),
            reputation: user.reputation,
        }
    }
}

/// Public profile view. Email only appears on the owner's own view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub reputation: i64,
    pub bio: String,
    pub avatar: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl UserView {
    pub fn public(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: None,
            reputation: user.reputation,
            bio: user.bio.clone(),
            avatar: user.avatar.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }

    pub fn owner(user: &User) -> Self {
        Self { email: Some(user.email.clone()), ..Self::public(user) }
    }
}

/// A question as it appears in feeds and after mutations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub author: Option<AuthorInfo>,
    pub vote_count: i64,
    pub answer_count: usize,
    pub views: i64,
    pub is_answered: bool,
    pub selected_answer_id: Option<Uuid>,
    /// Recency-weighted rank, derived at read time.
    pub score: f64,
    pub created_at: DateTime<Utc>,
}

impl QuestionSummary {
    pub fn build(question: &Question, author: Option<&User>, now: DateTime<Utc>) -> Self {
        Self {
            id: question.id,
            title: question.title.clone(),
            body: question.body.clone(),
            tags: question.tags.clone(),
            author: author.map(AuthorInfo::from_user),
            vote_count: vote_count(&question.votes),
            answer_count: question.answer_ids.len(),
            views: question.views,
            is_answered: question.is_answered,
            selected_answer_id: question.selected_answer_id,
            score: decayed_score(&question.votes, question.created_at, now),
            created_at: question.created_at,
        }
    }
}

/// An answer within a question thread or after a mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerView {
    pub id: Uuid,
    pub body: String,
    pub question_id: Uuid,
    pub author: Option<AuthorInfo>,
    pub vote_count: i64,
    pub comment_count: usize,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl AnswerView {
    pub fn build(answer: &Answer, author: Option<&User>) -> Self {
        Self {
            id: answer.id,
            body: answer.body.clone(),
            question_id: answer.question_id,
            author: author.map(AuthorInfo::from_user),
            vote_count: vote_count(&answer.votes),
            comment_count: answer.comment_ids.len(),
            is_accepted: answer.is_accepted,
            created_at: answer.created_at,
        }
    }
}

/// A full question thread: the question plus its ordered answers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: QuestionSummary,
    pub answers: Vec<AnswerView>,
}

/// An answer on a profile page, carrying its question's title for context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnswer {
    pub id: Uuid,
    pub body: String,
    pub question_id: Uuid,
    pub question_title: Option<String>,
    pub vote_count: i64,
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl ProfileAnswer {
    pub fn build(answer: &Answer, question_title: Option<String>) -> Self {
        Self {
            id: answer.id,
            body: answer.body.clone(),
            question_id: answer.question_id,
            question_title,
            vote_count: vote_count(&answer.votes),
            is_accepted: answer.is_accepted,
            created_at: answer.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub body: String,
    pub author: Option<AuthorInfo>,
    pub answer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl CommentView {
    pub fn build(comment: &Comment, author: Option<&User>) -> Self {
        Self {
            id: comment.id,
            body: comment.body.clone(),
            author: author.map(AuthorInfo::from_user),
            answer_id: comment.answer_id,
            created_at: comment.created_at,
        }
    }
}

/// One shape for both stored and tag-derived communities. Synthesized
/// placeholders have no id, no creator, and an empty moderator set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityProfile {
    pub id: Option<Uuid>,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub created_by: Option<Uuid>,
    pub moderators: Vec<Uuid>,
    pub member_count: i64,
    pub post_count: i64,
    pub is_public: bool,
}

impl CommunityProfile {
    pub fn from_stored(community: &Community) -> Self {
        Self {
            id: Some(community.id),
            name: community.name.clone(),
            display_name: community.display_name.clone(),
            description: community.description.clone(),
            created_by: Some(community.created_by),
            moderators: community.moderators.clone(),
            member_count: community.member_count,
            post_count: community.post_count,
            is_public: community.is_public,
        }
    }

    pub fn from_resolved(resolved: &ResolvedCommunity) -> Self {
        match resolved {
            ResolvedCommunity::Stored(c) => Self::from_stored(c),
            ResolvedCommunity::Synthesized { name, post_count } => Self {
                id: None,
                name: name.clone(),
                display_name: ResolvedCommunity::display_name_for(name),
                description: String::new(),
                created_by: None,
                moderators: Vec::new(),
                member_count: 0,
                post_count: *post_count,
                is_public: true,
            },
        }
    }
}

/// A tag with its usage count, for the popular-tags feed.
#[derive(Debug, Clone, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}
