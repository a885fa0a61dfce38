use crate::api::auth::auth;
use crate::api::users::users;
use crate::health;
use crate::state::AppState;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Service banner
        .route("/", get(health::index))
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        // OAuth login lifecycle
        .route("/auth/login", get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout).post(auth::logout))
        // Users API
        .route("/api/v1/me", get(users::me))
        .route(
            "/api/v1/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/api/v1/users/count", get(users::count_users))
        .route("/api/v1/users/search", get(users::search_users))
        .route(
            "/api/v1/users/{identifier}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Add shared state
        .with_state(state)
        // CORS middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
