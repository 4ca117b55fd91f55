//! # df-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the service
//! layer. Handlers validate their payload, call exactly one service
//! method, and shape the response envelope.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use df_core::error::AppError;
use df_core::traits::{AuthProvider, ForumRepo, QuestionQuery};
use df_services::views::UserView;
use df_services::{AnswerService, CommunityPatch, CommunityService, QuestionService, UserService};

use crate::dto::*;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub users: UserService,
    pub questions: QuestionService,
    pub answers: AnswerService,
    pub communities: CommunityService,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ForumRepo>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            users: UserService::new(repo.clone(), auth.clone()),
            questions: QuestionService::new(repo.clone()),
            answers: AnswerService::new(repo.clone()),
            communities: CommunityService::new(repo),
            auth,
        }
    }
}

type ApiResult = Result<HttpResponse, ApiError>;

// ── Auth ─────────────────────────────────────────────────────────────────

pub async fn register(state: web::Data<AppState>, body: web::Json<RegisterRequest>) -> ApiResult {
    body.validate()?;
    let body = body.into_inner();
    let user = state
        .users
        .register(body.username.trim().to_string(), body.email.trim().to_lowercase(), body.password)
        .await?;
    let token = state.auth.issue_token(user.id).map_err(AppError::from)?;
    Ok(HttpResponse::Created().json(json!({ "token": token, "user": UserView::owner(&user) })))
}

pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> ApiResult {
    body.validate()?;
    let user = state
        .users
        .authenticate(body.email.trim(), &body.password)
        .await?;
    let token = state.auth.issue_token(user.id).map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(json!({ "token": token, "user": UserView::owner(&user) })))
}

// ── Users ────────────────────────────────────────────────────────────────

pub async fn me(state: web::Data<AppState>, auth: AuthUser) -> ApiResult {
    let user = state.users.get(auth.0).await?;
    Ok(HttpResponse::Ok().json(UserView::owner(&user)))
}

pub async fn user_profile(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let profile = state.users.profile(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn update_profile(
    state: web::Data<AppState>,
    auth: AuthUser,
    body: web::Json<UpdateProfileRequest>,
) -> ApiResult {
    body.validate()?;
    let body = body.into_inner();
    let view = state.users.update_profile(auth.0, body.bio, body.avatar).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn user_questions(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<PageParams>,
) -> ApiResult {
    let page = state
        .users
        .questions_by(&path.into_inner(), params.page(), params.limit())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "questions": page.items,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
    })))
}

pub async fn user_answers(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<PageParams>,
) -> ApiResult {
    let page = state
        .users
        .answers_by(&path.into_inner(), params.page(), params.limit())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "answers": page.items,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
    })))
}

// ── Questions ────────────────────────────────────────────────────────────

pub async fn list_questions(
    state: web::Data<AppState>,
    params: web::Query<QuestionListParams>,
) -> ApiResult {
    let limit = params.limit();
    let query = QuestionQuery {
        search: params.search.clone().filter(|s| !s.trim().is_empty()),
        tag: params.tag.as_deref().map(|t| t.trim().to_lowercase()),
        sort: params.sort_order(),
        limit,
        offset: (params.page() - 1) * limit,
    };
    let page = state.questions.list(query).await?;
    Ok(HttpResponse::Ok().json(json!({
        "questions": page.items,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
    })))
}

pub async fn get_question(state: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult {
    let detail = state.questions.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn create_question(
    state: web::Data<AppState>,
    auth: AuthUser,
    body: web::Json<CreateQuestionRequest>,
) -> ApiResult {
    body.validate()?;
    let body = body.into_inner();
    let author = state.users.get(auth.0).await?;
    let summary = state
        .questions
        .create(&author, body.title.trim().to_string(), body.body, body.tags)
        .await?;
    Ok(HttpResponse::Created().json(summary))
}

pub async fn vote_question(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<VoteRequest>,
) -> ApiResult {
    let value = body.vote_value()?;
    let summary = state.questions.vote(path.into_inner(), auth.0, value).await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub async fn delete_question(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> ApiResult {
    state.questions.delete(path.into_inner(), auth.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Question removed" })))
}

// ── Answers ──────────────────────────────────────────────────────────────

pub async fn create_answer(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<CreateAnswerRequest>,
) -> ApiResult {
    body.validate()?;
    let author = state.users.get(auth.0).await?;
    let view = state
        .answers
        .create(path.into_inner(), &author, body.into_inner().body)
        .await?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn vote_answer(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<VoteRequest>,
) -> ApiResult {
    let value = body.vote_value()?;
    let view = state.answers.vote(path.into_inner(), auth.0, value).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn accept_answer(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> ApiResult {
    let view = state.answers.accept(path.into_inner(), auth.0).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn delete_answer(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> ApiResult {
    state.answers.delete(path.into_inner(), auth.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Answer removed" })))
}

// ── Comments ─────────────────────────────────────────────────────────────

pub async fn add_comment(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> ApiResult {
    body.validate()?;
    let author = state.users.get(auth.0).await?;
    let view = state
        .answers
        .add_comment(path.into_inner(), &author, body.into_inner().body)
        .await?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn list_comments(state: web::Data<AppState>, path: web::Path<Uuid>) -> ApiResult {
    let views = state.answers.comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(views))
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> ApiResult {
    state.answers.delete_comment(path.into_inner(), auth.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Comment removed" })))
}

// ── Communities ──────────────────────────────────────────────────────────

pub async fn list_communities(
    state: web::Data<AppState>,
    params: web::Query<PageParams>,
) -> ApiResult {
    let page = state
        .communities
        .list(params.search.clone(), params.page(), params.limit())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "communities": page.items,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
    })))
}

pub async fn popular_communities(state: web::Data<AppState>) -> ApiResult {
    let profiles = state.communities.popular().await?;
    Ok(HttpResponse::Ok().json(profiles))
}

pub async fn get_community(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let (community, recent) = state.communities.profile(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "community": community,
        "recentQuestions": recent,
    })))
}

pub async fn create_community(
    state: web::Data<AppState>,
    auth: AuthUser,
    body: web::Json<CreateCommunityRequest>,
) -> ApiResult {
    body.validate()?;
    let body = body.into_inner();
    let creator = state.users.get(auth.0).await?;
    let profile = state
        .communities
        .create(
            &creator,
            body.name,
            body.display_name,
            body.description,
            body.rules.into_iter().map(Into::into).collect(),
        )
        .await?;
    Ok(HttpResponse::Created().json(profile))
}

pub async fn update_community(
    state: web::Data<AppState>,
    auth: AuthUser,
    path: web::Path<String>,
    body: web::Json<UpdateCommunityRequest>,
) -> ApiResult {
    body.validate()?;
    let body = body.into_inner();
    let patch = CommunityPatch {
        display_name: body.display_name,
        description: body.description,
        rules: body.rules.map(|rules| rules.into_iter().map(Into::into).collect()),
        is_public: body.is_public,
    };
    let profile = state
        .communities
        .update(&path.into_inner(), auth.0, patch)
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn join_community(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<String>,
) -> ApiResult {
    let member_count = state.communities.join(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Joined community", "memberCount": member_count })))
}

pub async fn leave_community(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<String>,
) -> ApiResult {
    let member_count = state.communities.leave(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Left community", "memberCount": member_count })))
}

// ── Tags ─────────────────────────────────────────────────────────────────

pub async fn popular_tags(state: web::Data<AppState>) -> ApiResult {
    let tags = state.communities.popular_tags().await?;
    Ok(HttpResponse::Ok().json(tags))
}
