//! OAuth login lifecycle handlers
//!
//! Redirect-based flow: `/auth/login` sends the browser to the provider with
//! an anti-CSRF state cookie, `/auth/callback` finishes the exchange, and
//! `/auth/logout` revokes the server-side session.
//!
//! Policy: a session is issued only if identity persistence succeeded. When
//! the gateway write fails the browser comes back with `?error=save_failed`
//! and no cookie - distinguishable from provider failures
//! (`?error=login_failed`).

use crate::api::error::{ApiError, Result as ApiResult};
use crate::state::AppState;

use acct_auth::{AuthError, SessionMetadata};

use std::panic::Location;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::response::Redirect;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use error_location::ErrorLocation;
use serde::Deserialize;

/// One-shot cookie holding the OAuth state between login and callback.
const STATE_COOKIE: &str = "oauth_state";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// GET /auth/login
///
/// Redirect the browser to the provider's authorization endpoint.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Redirect)> {
    if !state.oauth.is_configured() {
        return Err(ApiError::Unavailable {
            message: "Login is not configured".into(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let auth_request = state.oauth.authorization_request()?;

    let state_cookie = Cookie::build((STATE_COOKIE, auth_request.state))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.cookies.secure)
        .path("/auth")
        .build();

    Ok((jar.add(state_cookie), Redirect::to(&auth_request.url)))
}

/// GET /auth/callback
///
/// Finish the provider exchange and establish the session. Failures redirect
/// back to the index with an error tag instead of surfacing a JSON error -
/// this endpoint is only ever hit by a browser mid-login.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> (CookieJar, Redirect) {
    let stored_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());

    // The state cookie is one-shot; drop it no matter how the callback ends.
    let jar = jar.remove(Cookie::build((STATE_COOKIE, "")).path("/auth").build());

    if let Some(error) = &params.error {
        log::warn!("OAuth provider returned error: {}", error);
        return (jar, login_failed());
    }

    let Some(code) = params.code else {
        log::warn!("OAuth callback without authorization code");
        return (jar, login_failed());
    };

    let (Some(received_state), Some(expected_state)) = (params.state, stored_state) else {
        log::warn!("OAuth callback without state");
        return (jar, login_failed());
    };

    if received_state != expected_state {
        log::warn!("OAuth state mismatch");
        return (jar, login_failed());
    }

    let tokens = match state.oauth.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            log::error!("Token exchange failed: {}", e);
            return (jar, login_failed());
        }
    };

    let claims = match state
        .oauth
        .fetch_user_info(tokens.access_token.as_deref().unwrap_or_default())
        .await
    {
        Ok(claims) => claims,
        Err(e) => {
            log::error!("Userinfo fetch failed: {}", e);
            return (jar, login_failed());
        }
    };

    // Session only on a successful identity write.
    let user = match state.resolver.resolve_and_persist(&claims, &tokens).await {
        Ok(user) => user,
        Err(AuthError::MissingEmail { .. }) => {
            log::warn!("OAuth claims carried no email");
            return (jar, login_failed());
        }
        Err(e) => {
            log::error!("Login succeeded but profile save failed: {}", e);
            return (jar, save_failed());
        }
    };

    let session = match state
        .sessions
        .issue(&user.email, session_metadata(&headers))
        .await
    {
        Ok(session) => session,
        Err(e) => {
            log::error!("Session issue failed: {}", e);
            return (jar, save_failed());
        }
    };

    log::info!("Login: {}", user.email);

    let session_cookie = Cookie::build((state.cookies.name.clone(), session.session_id))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.cookies.secure)
        .path("/")
        .build();

    (jar.add(session_cookie), Redirect::to("/"))
}

/// GET|POST /auth/logout
///
/// Revoke the presented session (a no-op for unknown or absent ids) and
/// clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Redirect)> {
    if let Some(cookie) = jar.get(&state.cookies.name) {
        state.sessions.revoke(cookie.value()).await?;
        log::info!("Logout: session revoked");
    }

    let jar = jar.remove(Cookie::build((state.cookies.name.clone(), "")).path("/").build());

    Ok((jar, Redirect::to("/")))
}

fn login_failed() -> Redirect {
    Redirect::to("/?error=login_failed")
}

fn save_failed() -> Redirect {
    Redirect::to("/?error=save_failed")
}

/// Informational request details recorded on the session.
fn session_metadata(headers: &HeaderMap) -> SessionMetadata {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // First hop of X-Forwarded-For.
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string());

    SessionMetadata {
        user_agent,
        ip_address,
    }
}
