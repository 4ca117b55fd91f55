//! # df-api
//!
//! The web routing and orchestration layer for DevForum.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

pub use handlers::AppState;

use actix_web::web;

/// Configures the routes for the forum API.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::register))
                    .route("/login", web::post().to(handlers::login)),
            )
            .service(
                web::scope("/users")
                    .route("/me", web::get().to(handlers::me))
                    .route("/profile", web::put().to(handlers::update_profile))
                    .route("/{username}", web::get().to(handlers::user_profile))
                    .route("/{username}/questions", web::get().to(handlers::user_questions))
                    .route("/{username}/answers", web::get().to(handlers::user_answers)),
            )
            .service(
                web::scope("/questions")
                    .route("", web::get().to(handlers::list_questions))
                    .route("", web::post().to(handlers::create_question))
                    .route("/vote/{id}", web::put().to(handlers::vote_question))
                    .route("/{id}", web::get().to(handlers::get_question))
                    .route("/{id}", web::delete().to(handlers::delete_question)),
            )
            .service(
                web::scope("/answers")
                    .route("/vote/{id}", web::put().to(handlers::vote_answer))
                    .route("/accept/{id}", web::put().to(handlers::accept_answer))
                    .route("/{question_id}", web::post().to(handlers::create_answer))
                    .route("/{id}", web::delete().to(handlers::delete_answer)),
            )
            .service(
                web::scope("/comments")
                    .route("/{answer_id}", web::post().to(handlers::add_comment))
                    .route("/{answer_id}", web::get().to(handlers::list_comments))
                    .route("/{id}", web::delete().to(handlers::delete_comment)),
            )
            .service(
                web::scope("/communities")
                    .route("", web::get().to(handlers::list_communities))
                    .route("", web::post().to(handlers::create_community))
                    .route("/popular", web::get().to(handlers::popular_communities))
                    .route("/{name}", web::get().to(handlers::get_community))
                    .route("/{name}", web::put().to(handlers::update_community))
                    .route("/{name}/join", web::post().to(handlers::join_community))
                    .route("/{name}/leave", web::post().to(handlers::leave_community)),
            )
            .service(web::scope("/tags").route("/popular", web::get().to(handlers::popular_tags))),
    );
}
