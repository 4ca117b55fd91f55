//! # DevForum Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{middleware::Logger, web, App, HttpServer};
use df_api::{configure_routes, middleware::cors_policy, AppState};
use std::sync::Arc;

// Feature-gated imports: This is the "Compiled-to-Order" magic
#[cfg(feature = "db-sqlite")]
use df_db_sqlite::SqliteForumRepo;

#[cfg(feature = "auth-simple")]
use df_auth_simple::SimpleAuthProvider;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:devforum.db?mode=rwc".to_string());
    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        log::warn!("JWT_SECRET not set; using an insecure development default");
        "devforum-insecure-dev-secret".to_string()
    });
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteForumRepo::new(&database_url)
        .await
        .expect("Failed to init SQLite");

    // 2. Initialize Auth Implementation
    #[cfg(feature = "auth-simple")]
    let auth = SimpleAuthProvider::new(&jwt_secret);

    // 3. Wrap in AppState (Using dynamic dispatch for maximum flexibility)
    let state = web::Data::new(AppState::new(Arc::new(repo), Arc::new(auth)));

    log::info!("🚀 DevForum starting on http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(cors_policy())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
