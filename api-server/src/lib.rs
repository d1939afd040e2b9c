//! # Reelsync HTTP Server
//!
//! axum routes over [`core_service::CoreService`]:
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/health` | liveness |
//! | GET | `/users/{username}` | tracker profile |
//! | GET | `/users/{username}/watchlist` | paginated watchlist |
//! | GET | `/users/{username}/top-rated` | paginated rated and liked films |
//! | POST | `/jobs/sync-tmdb` | queue a catalog list sync |
//!
//! Errors are rendered as `{"error": {"message", "status"}}`.

pub mod errors;
pub mod handlers;
pub mod state;

pub use errors::{AppError, AppResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use handlers::{health, jobs, users};

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/users/{username}", get(users::profile_handler))
        .route("/users/{username}/watchlist", get(users::watchlist_handler))
        .route("/users/{username}/top-rated", get(users::top_rated_handler))
        .route("/jobs/sync-tmdb", post(jobs::sync_tmdb_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
