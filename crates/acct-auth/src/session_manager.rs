use crate::Result as AuthErrorResult;
use crate::token::generate_session_id;

use acct_core::Session;
use acct_db::Store;

use std::sync::Arc;

use chrono::{Duration, Utc};

/// Request details recorded on a session for auditing. Purely informational;
/// never consulted during validation.
#[derive(Debug, Clone, Default)]
pub struct SessionMetadata {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Issues, validates and revokes server-side session records.
///
/// Sessions move `CREATED -> VALID -> EXPIRED` (by clock) or `-> REVOKED`
/// (by delete); there is no way back. Expiry is enforced lazily at read
/// time by the storage gateway - nothing sweeps expired rows.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn Store>,
    validity: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn Store>, validity: Duration) -> Self {
        Self { store, validity }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Create and persist a fresh session for `user_email`.
    ///
    /// Every login gets a brand-new random id - an existing session is never
    /// extended, so a pre-login session id can never survive into an
    /// authenticated one.
    pub async fn issue(
        &self,
        user_email: &str,
        metadata: SessionMetadata,
    ) -> AuthErrorResult<Session> {
        let mut session = Session::new(generate_session_id(), user_email, self.validity);
        session.user_agent = metadata.user_agent;
        session.ip_address = metadata.ip_address;

        self.store.save_session(&session).await?;
        Ok(session)
    }

    /// Look up a usable session. "Never existed" and "expired" are both
    /// `None` - callers cannot probe which ids once existed.
    pub async fn validate(&self, session_id: &str) -> AuthErrorResult<Option<Session>> {
        if session_id.is_empty() {
            return Ok(None);
        }

        let session = self.store.find_session(session_id).await?;
        Ok(session.filter(|s| s.is_valid_at(Utc::now())))
    }

    /// Delete one session. Idempotent; revoking an unknown id is a no-op.
    pub async fn revoke(&self, session_id: &str) -> AuthErrorResult<()> {
        self.store.delete_session(session_id).await?;
        Ok(())
    }

    /// Delete every session for one identity, e.g. when the account is
    /// removed or force-logged-out everywhere. Returns how many were revoked.
    pub async fn revoke_all(&self, user_email: &str) -> AuthErrorResult<u64> {
        let removed = self.store.delete_sessions_for_user(user_email).await?;
        Ok(removed)
    }
}
