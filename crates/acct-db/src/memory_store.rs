//! In-process storage gateway.
//!
//! Holds both record sets as document maps behind async RwLocks. Fills the
//! document-store role of the gateway contract; also what the test suites run
//! against. Nothing survives a process restart.

use crate::store::SEARCH_RESULT_LIMIT;
use crate::{Result, Store};

use acct_core::{Session, User, UserPatch};

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_user(&self, user: &User) -> Result<User> {
        // The whole upsert happens under one write lock, so concurrent logins
        // for the same email coalesce instead of racing.
        let mut users = self.users.write().await;

        match users.get_mut(&user.email) {
            Some(existing) => {
                existing.external_id = user.external_id.clone();
                existing.name = user.name.clone();
                existing.picture = user.picture.clone();
                existing.access_token = user.access_token.clone();
                existing.refresh_token = user.refresh_token.clone();
                existing.last_login = user.last_login;
                Ok(existing.clone())
            }
            None => {
                users.insert(user.email.clone(), user.clone());
                Ok(user.clone())
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_user(&self, email: &str, patch: &UserPatch) -> Result<bool> {
        let mut users = self.users.write().await;

        let Some(user) = users.get_mut(email) else {
            return Ok(false);
        };

        if let Some(name) = &patch.name {
            user.name = Some(name.clone());
        }
        if let Some(picture) = &patch.picture {
            user.picture = Some(picture.clone());
        }
        if let Some(access_token) = &patch.access_token {
            user.access_token = Some(access_token.clone());
        }
        if let Some(refresh_token) = &patch.refresh_token {
            user.refresh_token = Some(refresh_token.clone());
        }
        user.updated_at = Some(Utc::now());

        Ok(true)
    }

    async fn delete_user(&self, email: &str) -> Result<bool> {
        Ok(self.users.write().await.remove(email).is_some())
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let needle = query.to_lowercase();

        let mut matches: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| {
                u.email.to_lowercase().contains(&needle)
                    || u.name
                        .as_ref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(SEARCH_RESULT_LIMIT);
        Ok(matches)
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>> {
        // Lazy expiry: the record may still be present, validity is computed
        // at read time.
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .filter(|s| s.is_valid())
            .cloned())
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn delete_sessions_for_user(&self, email: &str) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_email != email);
        Ok((before - sessions.len()) as u64)
    }
}
