//! Question transaction scripts: listing, thread reads, creation with
//! community bookkeeping, voting, and cascading deletion.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use df_core::error::{AppError, Result};
use df_core::ledger::{apply_vote, clamp_reputation, rank_answers, vote_reputation_delta};
use df_core::models::{Question, User, VoteValue};
use df_core::traits::{ForumRepo, QuestionQuery};

use crate::views::{AnswerView, Page, QuestionDetail, QuestionSummary};

pub struct QuestionService {
    repo: Arc<dyn ForumRepo>,
}

impl QuestionService {
    pub fn new(repo: Arc<dyn ForumRepo>) -> Self {
        Self { repo }
    }

    /// Paginated feed with optional search and tag filters.
    pub async fn list(&self, query: QuestionQuery) -> Result<Page<QuestionSummary>> {
        let limit = query.limit.max(1);
        let page = (query.offset.max(0) / limit).saturating_add(1);
        let questions = self.repo.list_questions(&query).await?;
        let total = self.repo.count_questions(&query).await?;

        let now = Utc::now();
        let mut summaries = Vec::with_capacity(questions.len());
        for question in &questions {
            let author = self.repo.get_user(question.author_id).await?;
            summaries.push(QuestionSummary::build(question, author.as_ref(), now));
        }
        Ok(Page::new(summaries, total, page, limit))
    }

    /// Loads a full thread and bumps the view counter. Answers come back
    /// accepted-first, then by descending vote count.
    pub async fn get(&self, id: Uuid) -> Result<QuestionDetail> {
        let mut question = self
            .repo
            .get_question(id)
            .await?
            .ok_or_else(|| AppError::not_found("Question", id))?;

        question.views += 1;
        self.repo.update_question(&question).await?;

        let author = self.repo.get_user(question.author_id).await?;
        let mut answers = self.repo.answers_for_question(question.id).await?;
        rank_answers(&mut answers);

        let mut answer_views = Vec::with_capacity(answers.len());
        for answer in &answers {
            let answer_author = self.repo.get_user(answer.author_id).await?;
            answer_views.push(AnswerView::build(answer, answer_author.as_ref()));
        }

        Ok(QuestionDetail {
            question: QuestionSummary::build(&question, author.as_ref(), Utc::now()),
            answers: answer_views,
        })
    }

    /// Creates a question and bumps post counts on any communities whose
    /// name matches a tag. Communities are never created implicitly; the
    /// counter is best-effort bookkeeping, not a transactional invariant.
    pub async fn create(
        &self,
        author: &User,
        title: String,
        body: String,
        tags: Vec<String>,
    ) -> Result<QuestionSummary> {
        let tags = normalize_tags(tags);
        if tags.is_empty() {
            return Err(AppError::ValidationError("at least one tag is required".into()));
        }

        let question = Question::new(author.id, title, body, tags);
        self.repo.create_question(question.clone()).await?;

        for tag in &question.tags {
            if let Some(mut community) = self.repo.get_community_by_name(tag).await? {
                community.post_count += 1;
                self.repo.update_community(&community).await?;
            }
        }

        log::info!("question {} created by {}", question.id, author.username);
        Ok(QuestionSummary::build(&question, Some(author), Utc::now()))
    }

    /// Applies `actor`'s vote to the question and propagates reputation to
    /// the author. The vote-set write and the reputation write are two
    /// separate, non-atomic writes; concurrent voters on the same question
    /// can interleave (last write wins on the vote set).
    pub async fn vote(&self, id: Uuid, actor: Uuid, value: VoteValue) -> Result<QuestionSummary> {
        let mut question = self
            .repo
            .get_question(id)
            .await?
            .ok_or_else(|| AppError::not_found("Question", id))?;

        let outcome = apply_vote(&mut question.votes, actor, value);
        self.repo.update_question(&question).await?;

        // Self-votes are recorded but award nothing.
        if question.author_id != actor {
            let delta = vote_reputation_delta(outcome);
            if delta != 0 {
                if let Some(mut author) = self.repo.get_user(question.author_id).await? {
                    author.reputation = clamp_reputation(author.reputation + delta);
                    self.repo.update_user(&author).await?;
                }
            }
        }

        let author = self.repo.get_user(question.author_id).await?;
        Ok(QuestionSummary::build(&question, author.as_ref(), Utc::now()))
    }

    /// Deletes a question along with its answers and their comments.
    /// Only the author or an administrator may delete.
    pub async fn delete(&self, id: Uuid, actor: Uuid) -> Result<()> {
        let question = self
            .repo
            .get_question(id)
            .await?
            .ok_or_else(|| AppError::not_found("Question", id))?;

        let acting_user = self
            .repo
            .get_user(actor)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown user".into()))?;
        if question.author_id != actor && !acting_user.is_admin {
            return Err(AppError::Unauthorized("not the question author".into()));
        }

        for answer in self.repo.answers_for_question(id).await? {
            self.repo.delete_comments_for_answer(answer.id).await?;
        }
        self.repo.delete_answers_for_question(id).await?;
        self.repo.delete_question(id).await?;
        log::info!("question {id} removed by {}", acting_user.username);
        Ok(())
    }
}

/// Lowercases and trims tags, dropping any that end up empty.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_lowercased_and_trimmed() {
        let tags = normalize_tags(vec!["  Rust ".into(), "ASYNC".into(), "  ".into()]);
        assert_eq!(tags, vec!["rust".to_string(), "async".to_string()]);
    }
}
