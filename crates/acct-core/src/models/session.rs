use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A server-side session record, independent of any transport cookie.
///
/// Validity is always computed from `expires_at` at read time; an expired
/// record may still exist in the store and must be treated as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque random token, the lookup key.
    pub session_id: String,
    /// Foreign reference to `User.email`, not an ownership relation.
    pub user_email: String,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,

    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl Session {
    pub fn new(session_id: impl Into<String>, user_email: impl Into<String>, validity: Duration) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            user_email: user_email.into(),
            created_at: now,
            expires_at: now + validity,
            user_agent: None,
            ip_address: None,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}
