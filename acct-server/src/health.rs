use crate::state::AppState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET / - service banner; the web UI is a separate deployment.
pub async fn index() -> Response {
    let body = json!({
        "service": "acct-server",
        "version": env!("CARGO_PKG_VERSION"),
        "login": "/auth/login",
    });

    (StatusCode::OK, Json(body)).into_response()
}

/// GET /health - health check with component status
pub async fn health_check(State(state): State<AppState>) -> Response {
    let storage_ok = state.store.count_users().await.is_ok();

    let health = json!({
        "status": if storage_ok { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "components": {
            "storage": if storage_ok { "operational" } else { "unavailable" },
            "auth": "operational",
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    let status = if storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health)).into_response()
}

/// GET /live - liveness probe (is the process alive?)
pub async fn liveness_check() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - readiness probe (ready to accept traffic?)
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    match state.store.count_users().await {
        Ok(_) => (StatusCode::OK, "Ready").into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready").into_response(),
    }
}
