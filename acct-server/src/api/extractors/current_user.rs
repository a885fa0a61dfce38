//! Axum extractor gating protected operations on a valid session.

use crate::api::error::ApiError;
use crate::state::AppState;

use std::panic::Location;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use error_location::ErrorLocation;

/// The authenticated caller, established from the session cookie or an
/// `Authorization: Bearer <session_id>` header.
///
/// Use as an extractor on any protected handler. Rejects with 401 when no
/// usable session exists - an expired session and an unknown id are
/// indistinguishable to the caller. Holds no state of its own; it is purely
/// a decision function over the presented credential.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: String,
    pub user_email: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session_id =
            presented_session_id(parts, state).ok_or_else(|| ApiError::Unauthorized {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let session = state
            .sessions
            .validate(&session_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized {
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(CurrentUser {
            session_id: session.session_id,
            user_email: session.user_email,
        })
    }
}

/// The session id carried by the request: cookie first, bearer fallback.
fn presented_session_id(parts: &Parts, state: &AppState) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(&state.cookies.name) {
        return Some(cookie.value().to_string());
    }

    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
