//! devforum/crates/df-api/src/middleware.rs
//!
//! Bearer-token authentication extractor and the CORS policy.

use std::future::{ready, Ready};

use actix_cors::Cors;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use uuid::Uuid;

use df_core::error::AppError;

use crate::error::ApiError;
use crate::AppState;

/// The authenticated caller, extracted from `Authorization: Bearer <token>`.
/// Handlers that take this parameter are private routes.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req).map_err(ApiError::from);
        ready(result)
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state not configured".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

    state
        .auth
        .verify_token(token)
        .map(AuthUser)
        .ok_or_else(|| AppError::Unauthorized("invalid or expired token".into()))
}

// Configures CORS (Cross-Origin Resource Sharing)
// Important if the client and API ever live on different subdomains.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .max_age(3600)
}
