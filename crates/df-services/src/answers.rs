//! Answer transaction scripts: creation, voting, acceptance exclusivity,
//! deletion, and comments.

use std::sync::Arc;

use uuid::Uuid;

use df_core::error::{AppError, Result};
use df_core::ledger::{apply_vote, clamp_reputation, vote_reputation_delta, ACCEPT_BONUS};
use df_core::models::{Answer, Comment, User, VoteValue};
use df_core::traits::ForumRepo;

use crate::views::{AnswerView, CommentView};

pub struct AnswerService {
    repo: Arc<dyn ForumRepo>,
}

impl AnswerService {
    pub fn new(repo: Arc<dyn ForumRepo>) -> Self {
        Self { repo }
    }

    /// Creates an answer and appends its id to the question's answer list
    /// (referential symmetry is maintained here, not by the store).
    pub async fn create(&self, question_id: Uuid, author: &User, body: String) -> Result<AnswerView> {
        let mut question = self
            .repo
            .get_question(question_id)
            .await?
            .ok_or_else(|| AppError::not_found("Question", question_id))?;

        let answer = Answer::new(question.id, author.id, body);
        self.repo.create_answer(answer.clone()).await?;

        question.answer_ids.push(answer.id);
        self.repo.update_question(&question).await?;

        Ok(AnswerView::build(&answer, Some(author)))
    }

    /// Same toggle + reputation flow as question voting.
    pub async fn vote(&self, id: Uuid, actor: Uuid, value: VoteValue) -> Result<AnswerView> {
        let mut answer = self
            .repo
            .get_answer(id)
            .await?
            .ok_or_else(|| AppError::not_found("Answer", id))?;

        let outcome = apply_vote(&mut answer.votes, actor, value);
        self.repo.update_answer(&answer).await?;

        if answer.author_id != actor {
            let delta = vote_reputation_delta(outcome);
            if delta != 0 {
                if let Some(mut author) = self.repo.get_user(answer.author_id).await? {
                    author.reputation = clamp_reputation(author.reputation + delta);
                    self.repo.update_user(&author).await?;
                }
            }
        }

        let author = self.repo.get_user(answer.author_id).await?;
        Ok(AnswerView::build(&answer, author.as_ref()))
    }

    /// Toggles acceptance. Only the question's author may call this.
    ///
    /// Accepting unaccepts every sibling first, awards the +15 bonus to the
    /// answer's author, and stamps the question. Un-accepting flips the flag
    /// only: the bonus is not revoked and the question stamps are left in
    /// place, matching the observed system (recorded in DESIGN.md).
    pub async fn accept(&self, id: Uuid, actor: Uuid) -> Result<AnswerView> {
        let mut answer = self
            .repo
            .get_answer(id)
            .await?
            .ok_or_else(|| AppError::not_found("Answer", id))?;
        let mut question = self
            .repo
            .get_question(answer.question_id)
            .await?
            .ok_or_else(|| AppError::not_found("Question", answer.question_id))?;

        if question.author_id != actor {
            return Err(AppError::Unauthorized("only the question author can accept".into()));
        }

        answer.is_accepted = !answer.is_accepted;

        if answer.is_accepted {
            self.repo.unaccept_other_answers(question.id, answer.id).await?;

            if let Some(mut author) = self.repo.get_user(answer.author_id).await? {
                author.reputation = clamp_reputation(author.reputation + ACCEPT_BONUS);
                self.repo.update_user(&author).await?;
            }

            question.is_answered = true;
            question.selected_answer_id = Some(answer.id);
            self.repo.update_question(&question).await?;
        }

        self.repo.update_answer(&answer).await?;

        let author = self.repo.get_user(answer.author_id).await?;
        Ok(AnswerView::build(&answer, author.as_ref()))
    }

    /// Deletes an answer (author or admin) and pulls its backreference
    /// from the question before the row disappears.
    pub async fn delete(&self, id: Uuid, actor: Uuid) -> Result<()> {
        let answer = self
            .repo
            .get_answer(id)
            .await?
            .ok_or_else(|| AppError::not_found("Answer", id))?;

        let acting_user = self
            .repo
            .get_user(actor)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown user".into()))?;
        if answer.author_id != actor && !acting_user.is_admin {
            return Err(AppError::Unauthorized("not the answer author".into()));
        }

        if let Some(mut question) = self.repo.get_question(answer.question_id).await? {
            question.answer_ids.retain(|aid| *aid != answer.id);
            self.repo.update_question(&question).await?;
        }

        self.repo.delete_comments_for_answer(answer.id).await?;
        self.repo.delete_answer(answer.id).await?;
        Ok(())
    }

    /// Attaches a comment to an answer.
    pub async fn add_comment(&self, answer_id: Uuid, author: &User, body: String) -> Result<CommentView> {
        let mut answer = self
            .repo
            .get_answer(answer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Answer", answer_id))?;

        let comment = Comment {
            id: Uuid::now_v7(),
            body,
            author_id: author.id,
            answer_id: answer.id,
            created_at: chrono::Utc::now(),
        };
        self.repo.create_comment(comment.clone()).await?;

        answer.comment_ids.push(comment.id);
        self.repo.update_answer(&answer).await?;

        Ok(CommentView::build(&comment, Some(author)))
    }

    pub async fn comments(&self, answer_id: Uuid) -> Result<Vec<CommentView>> {
        if self.repo.get_answer(answer_id).await?.is_none() {
            return Err(AppError::not_found("Answer", answer_id));
        }
        let comments = self.repo.comments_for_answer(answer_id).await?;
        let mut views = Vec::with_capacity(comments.len());
        for comment in &comments {
            let author = self.repo.get_user(comment.author_id).await?;
            views.push(CommentView::build(comment, author.as_ref()));
        }
        Ok(views)
    }

    pub async fn delete_comment(&self, id: Uuid, actor: Uuid) -> Result<()> {
        let comment = self
            .repo
            .get_comment(id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment", id))?;

        let acting_user = self
            .repo
            .get_user(actor)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown user".into()))?;
        if comment.author_id != actor && !acting_user.is_admin {
            return Err(AppError::Unauthorized("not the comment author".into()));
        }

        if let Some(mut answer) = self.repo.get_answer(comment.answer_id).await? {
            answer.comment_ids.retain(|cid| *cid != comment.id);
            self.repo.update_answer(&answer).await?;
        }
        self.repo.delete_comment(comment.id).await?;
        Ok(())
    }
}
