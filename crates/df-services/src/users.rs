//! User scripts: registration, login, and profile reads/updates.
//! Reputation is never touched here; only the ledger mutates it.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use df_core::error::{AppError, Result};
use df_core::models::User;
use df_core::traits::{AuthProvider, ForumRepo};

use crate::views::{Page, ProfileAnswer, QuestionSummary, UserView};

/// A profile page: the user plus their most recent activity.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserView,
    pub questions: Vec<QuestionSummary>,
    pub answers: Vec<ProfileAnswer>,
}

pub struct UserService {
    repo: Arc<dyn ForumRepo>,
    auth: Arc<dyn AuthProvider>,
}

impl UserService {
    pub fn new(repo: Arc<dyn ForumRepo>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { repo, auth }
    }

    /// Registers a new account. Username and email must both be free.
    pub async fn register(&self, username: String, email: String, password: String) -> Result<User> {
        if self.repo.get_user_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict("username already taken".into()));
        }
        if self.repo.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".into()));
        }

        let user = User {
            id: Uuid::now_v7(),
            username,
            email,
            password_hash: self.auth.hash_password(&password)?,
            reputation: 0,
            bio: String::new(),
            avatar: String::new(),
            is_admin: false,
            created_at: Utc::now(),
        };
        self.repo.create_user(user.clone()).await?;
        log::info!("user {} registered", user.username);
        Ok(user)
    }

    /// Email + password login. Both unknown email and bad password collapse
    /// into the same Unauthorized, so the response leaks nothing.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid credentials".into()))?;
        if !self.auth.verify_password(password, &user.password_hash) {
            return Err(AppError::Unauthorized("invalid credentials".into()));
        }
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }

    /// Public profile: user plus five most recent questions and answers.
    pub async fn profile(&self, username: &str) -> Result<UserProfile> {
        let user = self
            .repo
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User", username))?;

        let now = Utc::now();
        let questions = self
            .repo
            .questions_by_author(user.id, 5, 0)
            .await?
            .iter()
            .map(|q| QuestionSummary::build(q, Some(&user), now))
            .collect();

        let answers = self.repo.answers_by_author(user.id, 5, 0).await?;
        let mut profile_answers = Vec::with_capacity(answers.len());
        for answer in &answers {
            let title = self
                .repo
                .get_question(answer.question_id)
                .await?
                .map(|q| q.title);
            profile_answers.push(ProfileAnswer::build(answer, title));
        }

        Ok(UserProfile {
            user: UserView::public(&user),
            questions,
            answers: profile_answers,
        })
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        bio: Option<String>,
        avatar: Option<String>,
    ) -> Result<UserView> {
        let mut user = self.get(id).await?;
        if let Some(bio) = bio {
            user.bio = bio;
        }
        if let Some(avatar) = avatar {
            user.avatar = avatar;
        }
        self.repo.update_user(&user).await?;
        Ok(UserView::owner(&user))
    }

    pub async fn questions_by(&self, username: &str, page: i64, limit: i64) -> Result<Page<QuestionSummary>> {
        let user = self
            .repo
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User", username))?;

        let limit = limit.max(1);
        let page = page.max(1);
        let questions = self
            .repo
            .questions_by_author(user.id, limit, (page - 1).saturating_mul(limit))
            .await?;
        let total = self.repo.count_questions_by_author(user.id).await?;

        let now = Utc::now();
        let summaries = questions
            .iter()
            .map(|q| QuestionSummary::build(q, Some(&user), now))
            .collect();
        Ok(Page::new(summaries, total, page, limit))
    }

    pub async fn answers_by(&self, username: &str, page: i64, limit: i64) -> Result<Page<ProfileAnswer>> {
        let user = self
            .repo
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User", username))?;

        let limit = limit.max(1);
        let page = page.max(1);
        let answers = self
            .repo
            .answers_by_author(user.id, limit, (page - 1).saturating_mul(limit))
            .await?;
        let total = self.repo.count_answers_by_author(user.id).await?;

        let mut views = Vec::with_capacity(answers.len());
        for answer in &answers {
            let title = self
                .repo
                .get_question(answer.question_id)
                .await?
                .map(|q| q.title);
            views.push(ProfileAnswer::build(answer, title));
        }
        Ok(Page::new(views, total, page, limit))
    }
}
