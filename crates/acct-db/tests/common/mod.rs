#![allow(dead_code)]

//! Shared fixtures for storage gateway tests. Every scenario runs against
//! both backends, so helpers hand out either store behind the same trait.

use acct_core::User;
use acct_db::{MemoryStore, SqliteStore};

use chrono::Duration;

pub async fn sqlite_store() -> SqliteStore {
    SqliteStore::connect_in_memory()
        .await
        .expect("Failed to create in-memory SQLite store")
}

pub fn memory_store() -> MemoryStore {
    MemoryStore::new()
}

pub fn user_with(email: &str, name: &str) -> User {
    let mut user = User::new(email);
    user.name = Some(name.to_string());
    user
}

/// A user whose creation (and last login) happened `minutes` minutes ago.
/// Useful for asserting ordering and login-advancement without sleeping.
pub fn user_from_minutes_ago(email: &str, name: &str, minutes: i64) -> User {
    let mut user = user_with(email, name);
    user.created_at -= Duration::minutes(minutes);
    user.last_login = user.created_at;
    user
}
