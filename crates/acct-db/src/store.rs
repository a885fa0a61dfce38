//! Storage gateway contract over the `users` and `sessions` record sets.
//!
//! Two interchangeable implementations exist: [`crate::SqliteStore`] (durable,
//! relational) and [`crate::MemoryStore`] (in-process document map). The
//! bootstrap picks one from configuration and injects it everywhere as
//! `Arc<dyn Store>`.

use acct_core::{Session, User, UserPatch};

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert-or-update keyed by email.
    ///
    /// When no record with the candidate's email exists, the candidate is
    /// stored as-is. When one exists, only the mutable profile fields
    /// (`external_id`, `name`, `picture`, tokens, `last_login`) are replaced;
    /// `id`, `created_at` and `updated_at` are left untouched. Returns the
    /// merged record. "Not found" is a normal upsert case, never an error.
    async fn upsert_user(&self, user: &User) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// All users, most recently created first.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Apply an explicit profile edit. Only `Some` fields of the patch are
    /// written; `updated_at` is stamped. Returns false when no record matches.
    async fn update_user(&self, email: &str, patch: &UserPatch) -> Result<bool>;

    /// Idempotent; returns false when nothing was deleted.
    async fn delete_user(&self, email: &str) -> Result<bool>;

    async fn count_users(&self) -> Result<u64>;

    /// Case-insensitive substring match over name or email, capped at 20
    /// results, most recently created first.
    async fn search_users(&self, query: &str) -> Result<Vec<User>>;

    /// Upsert by session id.
    async fn save_session(&self, session: &Session) -> Result<()>;

    /// Returns the record only while `expires_at` is in the future. Expired
    /// records are reported as absent but are not eagerly purged.
    async fn find_session(&self, session_id: &str) -> Result<Option<Session>>;

    /// Idempotent point deletion.
    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// Idempotent bulk deletion; returns the number of sessions removed.
    async fn delete_sessions_for_user(&self, email: &str) -> Result<u64>;
}

/// Maximum number of rows a search may return.
pub const SEARCH_RESULT_LIMIT: usize = 20;
