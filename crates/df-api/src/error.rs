//! Maps `AppError` onto HTTP status codes at the request boundary.
//! Every variant is recoverable and surfaced to the client; none are
//! fatal to the process.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use df_core::error::AppError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError(pub AppError);

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(..) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(..) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(..) => StatusCode::CONFLICT,
            AppError::Internal(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = &self.0 {
            log::error!("internal error: {detail}");
            // Don't leak infrastructure details to clients.
            return HttpResponse::InternalServerError().json(json!({ "message": "Server Error" }));
        }
        HttpResponse::build(self.status_code()).json(json!({ "message": self.0.to_string() }))
    }
}
