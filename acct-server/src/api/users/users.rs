//! Users REST API handlers
//!
//! CRUD, count and search over the user collection. Listing, updating and
//! deleting are protected; the rest of the surface is public.

use crate::api::delete_response::DeleteResponse;
use crate::api::error::{ApiError, Result as ApiResult};
use crate::api::extractors::current_user::CurrentUser;
use crate::api::users::count_response::CountResponse;
use crate::api::users::create_user_request::CreateUserRequest;
use crate::api::users::search_query::SearchQuery;
use crate::api::users::update_user_request::UpdateUserRequest;
use crate::api::users::user_dto::UserDto;
use crate::api::users::user_list_response::UserListResponse;
use crate::api::users::user_response::UserResponse;
use crate::state::AppState;

use acct_core::{User, UserPatch};

use std::panic::Location;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use error_location::ErrorLocation;
use uuid::Uuid;

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/v1/users
///
/// Create (or upsert) a user record directly, without an OAuth login.
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let email = request
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::Validation {
            message: "Email is required".into(),
            field: Some("email".into()),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let mut candidate = User::new(email);
    candidate.name = request.name;
    candidate.picture = request.picture;

    let stored = state.store.upsert_user(&candidate).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user: stored.into(),
        }),
    ))
}

/// GET /api/v1/users
///
/// List all users, most recently created first.
pub async fn list_users(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<UserListResponse>> {
    let users = state.store.list_users().await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserDto::from).collect(),
    }))
}

/// GET /api/v1/users/count
pub async fn count_users(State(state): State<AppState>) -> ApiResult<Json<CountResponse>> {
    let count = state.store.count_users().await?;

    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/users/search?q=
///
/// Case-insensitive substring search over name or email, capped at 20 hits.
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<UserListResponse>> {
    let q = query
        .q
        .as_deref()
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::Validation {
            message: "Search query is required".into(),
            field: Some("q".into()),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let users = state.store.search_users(q).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserDto::from).collect(),
    }))
}

/// GET /api/v1/users/{identifier}
///
/// Look up a single user by email (identifier contains '@') or by id.
pub async fn get_user(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = if identifier.contains('@') {
        state.store.find_user_by_email(&identifier).await?
    } else {
        // Anything that is not an email and not a UUID cannot match a record.
        match Uuid::parse_str(&identifier) {
            Ok(id) => state.store.find_user_by_id(id).await?,
            Err(_) => None,
        }
    };

    let user = user.ok_or_else(|| ApiError::NotFound {
        message: format!("User {} not found", identifier),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(Json(UserResponse { user: user.into() }))
}

/// PUT /api/v1/users/{email}
///
/// Apply a partial profile update. Protected.
pub async fn update_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(email): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let patch = UserPatch::from(request);

    let updated = state.store.update_user(&email, &patch).await?;
    if !updated {
        return Err(ApiError::NotFound {
            message: format!("User {} not found", email),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: format!("User {} not found", email),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(Json(UserResponse { user: user.into() }))
}

/// DELETE /api/v1/users/{email}
///
/// Remove the record and explicitly revoke every session for it - session
/// records do not cascade from user deletion. Protected, idempotent.
pub async fn delete_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(email): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.store.delete_user(&email).await?;
    let revoked = state.sessions.revoke_all(&email).await?;

    if deleted {
        log::info!("Deleted user {} and revoked {} session(s)", email, revoked);
    }

    Ok(Json(DeleteResponse { deleted }))
}

/// GET /api/v1/me
///
/// The authenticated caller's own stored profile.
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    let profile = state
        .store
        .find_user_by_email(&user.user_email)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Profile not found".into(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(Json(UserResponse {
        user: profile.into(),
    }))
}
