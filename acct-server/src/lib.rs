pub mod api;
pub mod error;
pub mod health;
pub mod logger;
pub mod oauth;
pub mod routes;
pub mod state;

pub use api::{
    auth::auth::{callback, login, logout},
    delete_response::DeleteResponse,
    error::{ApiError, Result as ApiResult},
    extractors::current_user::CurrentUser,
    users::{
        count_response::CountResponse,
        create_user_request::CreateUserRequest,
        search_query::SearchQuery,
        update_user_request::UpdateUserRequest,
        user_dto::UserDto,
        user_list_response::UserListResponse,
        user_response::UserResponse,
        users::{
            count_users, create_user, delete_user, get_user, list_users, me, search_users,
            update_user,
        },
    },
};

pub use crate::oauth::GoogleClient;
pub use crate::routes::build_router;
pub use crate::state::{AppState, CookieSettings};
