#![allow(dead_code)]

//! Test infrastructure for acct-server API tests

use acct_auth::{IdentityResolver, SessionManager, SessionMetadata};
use acct_config::GoogleConfig;
use acct_core::{Session, User, UserPatch};
use acct_db::{DbError, MemoryStore, Result as DbResult, Store};
use acct_server::oauth::GoogleClient;
use acct_server::{AppState, CookieSettings};

use std::panic::Location;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::SET_COOKIE;
use axum::response::Response;
use chrono::Duration;
use error_location::ErrorLocation;
use http_body_util::BodyExt;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "acct_session";

/// AppState over a fresh in-memory store, with an unconfigured OAuth client.
pub fn test_state() -> AppState {
    state_with(Arc::new(MemoryStore::new()), GoogleConfig::default())
}

/// AppState whose OAuth endpoints point at a mock provider.
pub fn test_state_with_google(google: GoogleConfig) -> AppState {
    state_with(Arc::new(MemoryStore::new()), google)
}

pub fn state_with(store: Arc<dyn Store>, google: GoogleConfig) -> AppState {
    AppState {
        resolver: IdentityResolver::new(store.clone()),
        sessions: SessionManager::new(store.clone(), Duration::days(30)),
        oauth: Arc::new(GoogleClient::new(google)),
        cookies: CookieSettings {
            name: SESSION_COOKIE.to_string(),
            secure: false,
        },
        store,
    }
}

/// Google config with every endpoint rewired to the mock provider.
pub fn google_config_for(mock_base: &str) -> GoogleConfig {
    GoogleConfig {
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        redirect_uri: "http://127.0.0.1:8000/auth/callback".to_string(),
        auth_url: format!("{}/auth", mock_base),
        token_url: format!("{}/token", mock_base),
        userinfo_url: format!("{}/userinfo", mock_base),
    }
}

/// Insert a user directly through the gateway.
pub async fn seed_user(state: &AppState, email: &str, name: &str) -> User {
    let mut user = User::new(email);
    user.name = Some(name.to_string());
    state.store.upsert_user(&user).await.unwrap()
}

/// Issue a session for `email` and return a ready-to-send Cookie header value.
pub async fn login_cookie(state: &AppState, email: &str) -> String {
    let session = state
        .sessions
        .issue(email, SessionMetadata::default())
        .await
        .unwrap();
    format!("{}={}", SESSION_COOKIE, session.session_id)
}

/// Plant an already-expired session and return its Cookie header value.
pub async fn expired_login_cookie(state: &AppState, email: &str) -> String {
    let mut session = Session::new("expired-session-id", email, Duration::days(30));
    session.created_at -= Duration::days(31);
    session.expires_at -= Duration::days(31);
    state.store.save_session(&session).await.unwrap();
    format!("{}={}", SESSION_COOKIE, session.session_id)
}

/// Collect the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Extract a Set-Cookie value by cookie name, if the response set one.
pub fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| {
            let pair = v.split(';').next()?;
            let (cookie_name, value) = pair.split_once('=')?;
            (cookie_name == name && !value.is_empty()).then(|| value.to_string())
        })
}

/// A gateway whose identity writes always fail; everything else delegates.
/// Used to exercise the "login succeeded but profile save failed" path.
pub struct FailingUpsertStore {
    inner: MemoryStore,
}

impl FailingUpsertStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
        }
    }
}

#[async_trait]
impl Store for FailingUpsertStore {
    async fn upsert_user(&self, _user: &User) -> DbResult<User> {
        Err(DbError::Initialization {
            message: "simulated backend outage".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        self.inner.find_user_by_email(email).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        self.inner.find_user_by_id(id).await
    }

    async fn list_users(&self) -> DbResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn update_user(&self, email: &str, patch: &UserPatch) -> DbResult<bool> {
        self.inner.update_user(email, patch).await
    }

    async fn delete_user(&self, email: &str) -> DbResult<bool> {
        self.inner.delete_user(email).await
    }

    async fn count_users(&self) -> DbResult<u64> {
        self.inner.count_users().await
    }

    async fn search_users(&self, query: &str) -> DbResult<Vec<User>> {
        self.inner.search_users(query).await
    }

    async fn save_session(&self, session: &Session) -> DbResult<()> {
        self.inner.save_session(session).await
    }

    async fn find_session(&self, session_id: &str) -> DbResult<Option<Session>> {
        self.inner.find_session(session_id).await
    }

    async fn delete_session(&self, session_id: &str) -> DbResult<()> {
        self.inner.delete_session(session_id).await
    }

    async fn delete_sessions_for_user(&self, email: &str) -> DbResult<u64> {
        self.inner.delete_sessions_for_user(email).await
    }
}
