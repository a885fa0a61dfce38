//! Integration tests for the users API handlers
mod common;

use crate::common::{
    body_json, expired_login_cookie, login_cookie, seed_user, test_state, SESSION_COOKIE,
};

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;

use acct_server::build_router;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_create_user_returns_created_record() {
    let state = test_state();
    let app = build_router(state.clone());

    let request = json_request(
        "POST",
        "/api/v1/users",
        serde_json::json!({"email": "alice@x.com", "name": "Alice"}),
    );

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "alice@x.com");
    assert_eq!(json["user"]["name"], "Alice");
    // Provider tokens must never appear in API responses.
    assert!(json["user"].get("access_token").is_none());
    assert!(json["user"].get("refresh_token").is_none());
}

#[tokio::test]
async fn test_create_user_without_email_is_rejected() {
    let state = test_state();
    let app = build_router(state.clone());

    let request = json_request("POST", "/api/v1/users", serde_json::json!({"name": "Nobody"}));

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["field"], "email");
}

#[tokio::test]
async fn test_create_user_with_empty_email_is_rejected() {
    let state = test_state();
    let app = build_router(state.clone());

    let request = json_request("POST", "/api/v1/users", serde_json::json!({"email": ""}));

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users_requires_authentication() {
    let state = test_state();
    let app = build_router(state.clone());

    let response = app.oneshot(get_request("/api/v1/users")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn test_list_users_with_session_returns_all() {
    let state = test_state();
    seed_user(&state, "alice@x.com", "Alice").await;
    seed_user(&state, "bob@x.com", "Bob").await;
    let cookie = login_cookie(&state, "alice@x.com").await;

    let app = build_router(state.clone());

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/users")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bearer_session_id_is_accepted() {
    let state = test_state();
    seed_user(&state, "alice@x.com", "Alice").await;
    let cookie = login_cookie(&state, "alice@x.com").await;
    let session_id = cookie.trim_start_matches(&format!("{}=", SESSION_COOKIE)).to_string();

    let app = build_router(state.clone());

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", session_id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "alice@x.com");
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let state = test_state();
    seed_user(&state, "alice@x.com", "Alice").await;
    let cookie = expired_login_cookie(&state, "alice@x.com").await;

    let app = build_router(state.clone());

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/me")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_user_by_email_and_by_id() {
    let state = test_state();
    let stored = seed_user(&state, "alice@x.com", "Alice").await;

    let app = build_router(state.clone());

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/users/alice@x.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["name"], "Alice");

    let response = app
        .oneshot(get_request(&format!("/api/v1/users/{}", stored.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "alice@x.com");
}

#[tokio::test]
async fn test_get_unknown_user_returns_not_found() {
    let state = test_state();
    let app = build_router(state.clone());

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/users/ghost@x.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");

    // Not an email and not a UUID: still just a 404.
    let response = app
        .oneshot(get_request("/api/v1/users/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_user_applies_patch() {
    let state = test_state();
    seed_user(&state, "alice@x.com", "Alice").await;
    let cookie = login_cookie(&state, "alice@x.com").await;

    let app = build_router(state.clone());

    let mut request = json_request(
        "PUT",
        "/api/v1/users/alice@x.com",
        serde_json::json!({"name": "Alice Smith"}),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["user"]["name"], "Alice Smith");
    assert!(json["user"]["updated_at"].is_i64());
}

#[tokio::test]
async fn test_update_user_requires_authentication() {
    let state = test_state();
    seed_user(&state, "alice@x.com", "Alice").await;

    let app = build_router(state.clone());

    let request = json_request(
        "PUT",
        "/api/v1/users/alice@x.com",
        serde_json::json!({"name": "Hacked"}),
    );

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_unknown_user_returns_not_found() {
    let state = test_state();
    seed_user(&state, "alice@x.com", "Alice").await;
    let cookie = login_cookie(&state, "alice@x.com").await;

    let app = build_router(state.clone());

    let mut request = json_request(
        "PUT",
        "/api/v1/users/ghost@x.com",
        serde_json::json!({"name": "Ghost"}),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_revokes_their_sessions() {
    let state = test_state();
    seed_user(&state, "admin@x.com", "Admin").await;
    seed_user(&state, "bob@x.com", "Bob").await;
    let admin_cookie = login_cookie(&state, "admin@x.com").await;
    let bob_cookie = login_cookie(&state, "bob@x.com").await;

    let app = build_router(state.clone());

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/v1/users/bob@x.com")
        .header(header::COOKIE, admin_cookie.clone())
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["deleted"], true);

    // Bob's record is gone...
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/users/bob@x.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // ...and so is every session that referenced it.
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/me")
        .header(header::COOKIE, bob_cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_user_is_idempotent() {
    let state = test_state();
    seed_user(&state, "admin@x.com", "Admin").await;
    seed_user(&state, "bob@x.com", "Bob").await;
    let cookie = login_cookie(&state, "admin@x.com").await;

    let app = build_router(state.clone());

    for expected in [true, false] {
        let request = Request::builder()
            .method("DELETE")
            .uri("/api/v1/users/bob@x.com")
            .header(header::COOKIE, cookie.clone())
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        // Deleting an already-deleted user reports "nothing deleted", not an error.
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["deleted"], expected);
    }
}

#[tokio::test]
async fn test_count_users() {
    let state = test_state();
    seed_user(&state, "alice@x.com", "Alice").await;
    seed_user(&state, "bob@x.com", "Bob").await;

    let app = build_router(state.clone());

    let response = app.oneshot(get_request("/api/v1/users/count")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 2);
}

#[tokio::test]
async fn test_search_users_matches_name_case_insensitively() {
    let state = test_state();
    seed_user(&state, "alice@x.com", "Alice").await;
    seed_user(&state, "bob@x.com", "Bob").await;

    let app = build_router(state.clone());

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/users/search?q=a"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let users = json["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "alice@x.com");
}

#[tokio::test]
async fn test_search_without_query_is_rejected() {
    let state = test_state();
    let app = build_router(state.clone());

    let response = app
        .oneshot(get_request("/api/v1/users/search"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["field"], "q");
}

#[tokio::test]
async fn test_me_returns_own_profile() {
    let state = test_state();
    seed_user(&state, "alice@x.com", "Alice").await;
    let cookie = login_cookie(&state, "alice@x.com").await;

    let app = build_router(state.clone());

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/me")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "alice@x.com");
    assert_eq!(json["user"]["name"], "Alice");
}
