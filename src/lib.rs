pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;

use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use crate::config::Settings;

pub use auth::AuthService;
pub use db::{InMemoryUserStore, PgUserStore, User, UserStore};

use auth::handlers::{json_error_handler, login, method_not_allowed, signup};
use crate::config::StoreBackend;

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let store: Arc<dyn UserStore> = match config.database.backend {
            StoreBackend::Postgres => Arc::new(PgUserStore::connect(&config.database).await?),
            StoreBackend::Memory => {
                info!("Using in-memory user store; records are lost on restart");
                Arc::new(InMemoryUserStore::new())
            }
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Settings, store: Arc<dyn UserStore>) -> Self {
        let auth_service = AuthService::from_settings(store, &config);
        Self {
            config: Arc::new(config),
            auth_service: Arc::new(auth_service),
        }
    }
}

/// Registers the auth routes. Each resource answers non-POST methods
/// with 405.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/health", web::get().to(health_check))
        .service(
            web::resource("/api/auth/signup")
                .route(web::post().to(signup))
                .default_service(web::to(method_not_allowed)),
        )
        .service(
            web::resource("/api/auth/login")
                .route(web::post().to(login))
                .default_service(web::to(method_not_allowed)),
        );
}
