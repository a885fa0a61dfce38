use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user identity established through an external OAuth provider.
///
/// `email` is the unique lookup key. `external_id` holds the provider's
/// subject claim and may be absent for records created before their first
/// OAuth login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub external_id: Option<String>,

    pub name: Option<String>,
    pub email: String,
    pub picture: Option<String>,

    /// Opaque provider tokens, stored verbatim.
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,

    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Advanced on every login.
    pub last_login: DateTime<Utc>,
    /// Set only by explicit profile edits, never by logins.
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            external_id: None,
            name: None,
            email: email.into(),
            picture: None,
            access_token: None,
            refresh_token: None,
            created_at: now,
            last_login: now,
            updated_at: None,
        }
    }
}

/// The fields an explicit profile update is allowed to touch.
///
/// Identity fields (`id`, `email`, `created_at`, `last_login`) are not
/// representable here, so callers cannot smuggle them through a partial
/// update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub picture: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.picture.is_none()
            && self.access_token.is_none()
            && self.refresh_token.is_none()
    }
}
