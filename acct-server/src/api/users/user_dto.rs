use acct_core::User;

use serde::Serialize;

/// User DTO for JSON serialization.
///
/// Provider tokens are deliberately absent - they are stored on the record
/// but never leave the server.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: String,
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub email: String,
    pub picture: Option<String>,
    pub created_at: i64,
    pub last_login: i64,
    pub updated_at: Option<i64>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_string(),
            external_id: u.external_id,
            name: u.name,
            email: u.email,
            picture: u.picture,
            created_at: u.created_at.timestamp(),
            last_login: u.last_login.timestamp(),
            updated_at: u.updated_at.map(|dt| dt.timestamp()),
        }
    }
}
