//! End-to-end ledger behavior against the real SQLite repo: vote toggling,
//! reputation propagation, acceptance exclusivity, and tag-derived
//! communities.
//!
//! The vote-set write and the reputation write are sequential and
//! non-atomic; these tests exercise the single-writer-per-request model
//! only and make no claims about concurrent interleavings.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use df_core::error::AppError;
use df_core::models::{ResolvedCommunity, User, VoteValue};
use df_core::traits::{AuthProvider, ForumRepo};
use df_db_sqlite::SqliteForumRepo;
use df_services::{AnswerService, CommunityService, QuestionService, UserService};

struct Fixture {
    repo: Arc<SqliteForumRepo>,
    questions: QuestionService,
    answers: AnswerService,
    communities: CommunityService,
}

async fn fixture() -> Fixture {
    let repo = Arc::new(SqliteForumRepo::new("sqlite::memory:").await.unwrap());
    Fixture {
        questions: QuestionService::new(repo.clone()),
        answers: AnswerService::new(repo.clone()),
        communities: CommunityService::new(repo.clone()),
        repo,
    }
}

/// Plaintext credentials and UUID-string tokens, enough to construct a
/// `UserService` for read paths that never touch passwords.
struct PlainAuth;

impl AuthProvider for PlainAuth {
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        Ok(password.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        password == hash
    }

    fn issue_token(&self, user_id: Uuid) -> anyhow::Result<String> {
        Ok(user_id.to_string())
    }

    fn verify_token(&self, token: &str) -> Option<Uuid> {
        Uuid::parse_str(token).ok()
    }
}

async fn create_user(repo: &dyn ForumRepo, username: &str) -> User {
    let user = User {
        id: Uuid::now_v7(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$test".to_string(),
        reputation: 0,
        bio: String::new(),
        avatar: String::new(),
        is_admin: false,
        created_at: Utc::now(),
    };
    repo.create_user(user.clone()).await.unwrap();
    user
}

async fn reputation_of(repo: &dyn ForumRepo, id: Uuid) -> i64 {
    repo.get_user(id).await.unwrap().unwrap().reputation
}

#[tokio::test]
async fn double_upvote_cancels_and_keeps_reputation() {
    let fx = fixture().await;
    let author = create_user(fx.repo.as_ref(), "author").await;
    let voter = create_user(fx.repo.as_ref(), "voter").await;

    let q = fx
        .questions
        .create(&author, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();

    let after_first = fx.questions.vote(q.id, voter.id, VoteValue::Up).await.unwrap();
    assert_eq!(after_first.vote_count, 1);
    assert_eq!(reputation_of(fx.repo.as_ref(), author.id).await, 10);

    // Same vote again: the vote is removed, but the award is not reversed.
    let after_second = fx.questions.vote(q.id, voter.id, VoteValue::Up).await.unwrap();
    assert_eq!(after_second.vote_count, 0);
    assert_eq!(reputation_of(fx.repo.as_ref(), author.id).await, 10);
}

#[tokio::test]
async fn flipping_a_vote_moves_the_count_by_two() {
    let fx = fixture().await;
    let author = create_user(fx.repo.as_ref(), "author").await;
    let voter = create_user(fx.repo.as_ref(), "voter").await;

    let q = fx
        .questions
        .create(&author, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();

    let up = fx.questions.vote(q.id, voter.id, VoteValue::Up).await.unwrap();
    let down = fx.questions.vote(q.id, voter.id, VoteValue::Down).await.unwrap();
    assert_eq!(down.vote_count, up.vote_count - 2);
    // +10 for the upvote, -2 for the flip.
    assert_eq!(reputation_of(fx.repo.as_ref(), author.id).await, 8);
}

#[tokio::test]
async fn self_votes_are_recorded_but_free() {
    let fx = fixture().await;
    let author = create_user(fx.repo.as_ref(), "author").await;

    let q = fx
        .questions
        .create(&author, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();

    let after = fx.questions.vote(q.id, author.id, VoteValue::Up).await.unwrap();
    assert_eq!(after.vote_count, 1);
    assert_eq!(reputation_of(fx.repo.as_ref(), author.id).await, 0);
}

#[tokio::test]
async fn reputation_never_goes_negative() {
    let fx = fixture().await;
    let author = create_user(fx.repo.as_ref(), "author").await;

    let q = fx
        .questions
        .create(&author, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();

    // Many downvoters against a zero-reputation author.
    for i in 0..5 {
        let voter = create_user(fx.repo.as_ref(), &format!("voter{i}")).await;
        fx.questions.vote(q.id, voter.id, VoteValue::Down).await.unwrap();
        assert_eq!(reputation_of(fx.repo.as_ref(), author.id).await, 0);
    }
}

#[tokio::test]
async fn answer_votes_propagate_to_the_answer_author() {
    let fx = fixture().await;
    let asker = create_user(fx.repo.as_ref(), "asker").await;
    let answerer = create_user(fx.repo.as_ref(), "answerer").await;
    let voter = create_user(fx.repo.as_ref(), "voter").await;

    let q = fx
        .questions
        .create(&asker, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();
    let a = fx.answers.create(q.id, &answerer, "use Arc".into()).await.unwrap();

    let view = fx.answers.vote(a.id, voter.id, VoteValue::Up).await.unwrap();
    assert_eq!(view.vote_count, 1);
    assert_eq!(reputation_of(fx.repo.as_ref(), answerer.id).await, 10);
    assert_eq!(reputation_of(fx.repo.as_ref(), asker.id).await, 0);
}

#[tokio::test]
async fn accepting_an_answer_is_exclusive_and_awards_the_bonus() {
    let fx = fixture().await;
    let asker = create_user(fx.repo.as_ref(), "asker").await;
    let first = create_user(fx.repo.as_ref(), "first").await;
    let second = create_user(fx.repo.as_ref(), "second").await;

    let q = fx
        .questions
        .create(&asker, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();
    let a1 = fx.answers.create(q.id, &first, "one".into()).await.unwrap();
    let a2 = fx.answers.create(q.id, &second, "two".into()).await.unwrap();

    // Accept A2 first, then move acceptance to A1.
    fx.answers.accept(a2.id, asker.id).await.unwrap();
    let accepted = fx.answers.accept(a1.id, asker.id).await.unwrap();
    assert!(accepted.is_accepted);

    let a1_row = fx.repo.get_answer(a1.id).await.unwrap().unwrap();
    let a2_row = fx.repo.get_answer(a2.id).await.unwrap().unwrap();
    assert!(a1_row.is_accepted);
    assert!(!a2_row.is_accepted);

    let q_row = fx.repo.get_question(q.id).await.unwrap().unwrap();
    assert!(q_row.is_answered);
    assert_eq!(q_row.selected_answer_id, Some(a1.id));

    // Both authors got the bonus; moving acceptance does not claw it back.
    assert_eq!(reputation_of(fx.repo.as_ref(), first.id).await, 15);
    assert_eq!(reputation_of(fx.repo.as_ref(), second.id).await, 15);
}

#[tokio::test]
async fn only_the_question_author_can_accept() {
    let fx = fixture().await;
    let asker = create_user(fx.repo.as_ref(), "asker").await;
    let answerer = create_user(fx.repo.as_ref(), "answerer").await;
    let stranger = create_user(fx.repo.as_ref(), "stranger").await;

    let q = fx
        .questions
        .create(&asker, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();
    let a = fx.answers.create(q.id, &answerer, "nope".into()).await.unwrap();

    let err = fx.answers.accept(a.id, stranger.id).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // No state change.
    let a_row = fx.repo.get_answer(a.id).await.unwrap().unwrap();
    assert!(!a_row.is_accepted);
    let q_row = fx.repo.get_question(q.id).await.unwrap().unwrap();
    assert!(!q_row.is_answered);
    assert_eq!(reputation_of(fx.repo.as_ref(), answerer.id).await, 0);
}

#[tokio::test]
async fn unaccepting_flips_the_flag_but_keeps_bonus_and_stamps() {
    let fx = fixture().await;
    let asker = create_user(fx.repo.as_ref(), "asker").await;
    let answerer = create_user(fx.repo.as_ref(), "answerer").await;

    let q = fx
        .questions
        .create(&asker, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();
    let a = fx.answers.create(q.id, &answerer, "yes".into()).await.unwrap();

    fx.answers.accept(a.id, asker.id).await.unwrap();
    let toggled = fx.answers.accept(a.id, asker.id).await.unwrap();
    assert!(!toggled.is_accepted);

    // Observed legacy behavior: the bonus stays and the question still
    // points at the un-accepted answer.
    assert_eq!(reputation_of(fx.repo.as_ref(), answerer.id).await, 15);
    let q_row = fx.repo.get_question(q.id).await.unwrap().unwrap();
    assert!(q_row.is_answered);
    assert_eq!(q_row.selected_answer_id, Some(a.id));
}

#[tokio::test]
async fn answers_keep_referential_symmetry_with_their_question() {
    let fx = fixture().await;
    let asker = create_user(fx.repo.as_ref(), "asker").await;
    let answerer = create_user(fx.repo.as_ref(), "answerer").await;

    let q = fx
        .questions
        .create(&asker, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();
    let a = fx.answers.create(q.id, &answerer, "body".into()).await.unwrap();

    let q_row = fx.repo.get_question(q.id).await.unwrap().unwrap();
    assert_eq!(q_row.answer_ids, vec![a.id]);

    fx.answers.delete(a.id, answerer.id).await.unwrap();
    let q_row = fx.repo.get_question(q.id).await.unwrap().unwrap();
    assert!(q_row.answer_ids.is_empty());
    assert!(fx.repo.get_answer(a.id).await.unwrap().is_none());
}

#[tokio::test]
async fn tag_without_community_resolves_to_a_placeholder() {
    let fx = fixture().await;
    let author = create_user(fx.repo.as_ref(), "author").await;

    fx.questions
        .create(&author, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();

    // Creating the question must not create a community row.
    assert!(fx.repo.get_community_by_name("rust").await.unwrap().is_none());

    match fx.communities.resolve("rust").await.unwrap() {
        ResolvedCommunity::Synthesized { name, post_count } => {
            assert_eq!(name, "rust");
            assert!(post_count >= 1);
        }
        ResolvedCommunity::Stored(_) => panic!("expected a synthesized placeholder"),
    }

    // A tag nobody used is still NotFound.
    let err = fx.communities.resolve("cobol").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));
}

#[tokio::test]
async fn stored_community_post_count_tracks_tag_usage() {
    let fx = fixture().await;
    let author = create_user(fx.repo.as_ref(), "author").await;

    fx.communities
        .create(&author, "rust".into(), "Rust".into(), String::new(), Vec::new())
        .await
        .unwrap();

    fx.questions
        .create(&author, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();

    // The create path bumped the stored counter.
    let stored = fx.repo.get_community_by_name("rust").await.unwrap().unwrap();
    assert_eq!(stored.post_count, 1);

    // Lookup recomputes from live tag usage either way.
    match fx.communities.resolve("rust").await.unwrap() {
        ResolvedCommunity::Stored(c) => assert_eq!(c.post_count, 1),
        ResolvedCommunity::Synthesized { .. } => panic!("expected the stored row"),
    }
}

#[tokio::test]
async fn popular_merges_stored_and_tag_derived_communities() {
    let fx = fixture().await;
    let author = create_user(fx.repo.as_ref(), "author").await;

    fx.communities
        .create(&author, "rust".into(), "Rust".into(), String::new(), Vec::new())
        .await
        .unwrap();
    fx.questions
        .create(&author, "a".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();
    fx.questions
        .create(&author, "c".into(), "d".into(), vec!["python".into(), "rust".into()])
        .await
        .unwrap();

    let popular = fx.communities.popular().await.unwrap();
    let rust = popular.iter().find(|c| c.name == "rust").unwrap();
    let python = popular.iter().find(|c| c.name == "python").unwrap();

    assert!(rust.id.is_some());
    assert!(python.id.is_none());
    assert_eq!(python.post_count, 1);
    assert_eq!(python.display_name, "Python");
    // Higher post count sorts first.
    let rust_pos = popular.iter().position(|c| c.name == "rust").unwrap();
    let python_pos = popular.iter().position(|c| c.name == "python").unwrap();
    assert!(rust_pos < python_pos);
}

#[tokio::test]
async fn leaving_a_community_floors_member_count_at_zero() {
    let fx = fixture().await;
    let author = create_user(fx.repo.as_ref(), "author").await;

    fx.communities
        .create(&author, "rust".into(), "Rust".into(), String::new(), Vec::new())
        .await
        .unwrap();

    assert_eq!(fx.communities.join("rust").await.unwrap(), 1);
    assert_eq!(fx.communities.leave("rust").await.unwrap(), 0);
    assert_eq!(fx.communities.leave("rust").await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_a_question_requires_author_or_admin_and_cascades() {
    let fx = fixture().await;
    let asker = create_user(fx.repo.as_ref(), "asker").await;
    let answerer = create_user(fx.repo.as_ref(), "answerer").await;
    let stranger = create_user(fx.repo.as_ref(), "stranger").await;

    let q = fx
        .questions
        .create(&asker, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();
    let a = fx.answers.create(q.id, &answerer, "body".into()).await.unwrap();

    let err = fx.questions.delete(q.id, stranger.id).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    fx.questions.delete(q.id, asker.id).await.unwrap();
    assert!(fx.repo.get_question(q.id).await.unwrap().is_none());
    assert!(fx.repo.get_answer(a.id).await.unwrap().is_none());
}

#[tokio::test]
async fn listing_survives_extreme_page_numbers() {
    let fx = fixture().await;
    let author = create_user(fx.repo.as_ref(), "author").await;
    let users = UserService::new(fx.repo.clone(), Arc::new(PlainAuth));

    fx.questions
        .create(&author, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();
    fx.communities
        .create(&author, "rust".into(), "Rust".into(), String::new(), Vec::new())
        .await
        .unwrap();

    // A page past the end is an empty page, for any i64 the client sends.
    let communities = fx.communities.list(None, i64::MAX, 10).await.unwrap();
    assert!(communities.items.is_empty());

    let questions = users.questions_by("author", i64::MAX, 10).await.unwrap();
    assert!(questions.items.is_empty());
    assert_eq!(questions.total_pages, 1);

    let answers = users.answers_by("author", i64::MAX, i64::MAX).await.unwrap();
    assert!(answers.items.is_empty());

    // Negative and zero inputs fall back to the first page.
    let first = fx.communities.list(None, -5, 0).await.unwrap();
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.current_page, 1);
}

#[tokio::test]
async fn thread_reads_bump_views_and_order_answers() {
    let fx = fixture().await;
    let asker = create_user(fx.repo.as_ref(), "asker").await;
    let answerer = create_user(fx.repo.as_ref(), "answerer").await;
    let voter = create_user(fx.repo.as_ref(), "voter").await;

    let q = fx
        .questions
        .create(&asker, "t".into(), "b".into(), vec!["rust".into()])
        .await
        .unwrap();
    let plain = fx.answers.create(q.id, &answerer, "plain".into()).await.unwrap();
    let popular = fx.answers.create(q.id, &answerer, "popular".into()).await.unwrap();
    let accepted = fx.answers.create(q.id, &answerer, "accepted".into()).await.unwrap();

    fx.answers.vote(popular.id, voter.id, VoteValue::Up).await.unwrap();
    fx.answers.accept(accepted.id, asker.id).await.unwrap();

    let detail = fx.questions.get(q.id).await.unwrap();
    assert_eq!(detail.question.views, 1);
    let order: Vec<_> = detail.answers.iter().map(|a| a.id).collect();
    assert_eq!(order, vec![accepted.id, popular.id, plain.id]);

    let again = fx.questions.get(q.id).await.unwrap();
    assert_eq!(again.question.views, 2);
}
