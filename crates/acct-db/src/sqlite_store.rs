//! SQLite-backed storage gateway.
//!
//! Timestamps are persisted as Unix seconds. Upsert-by-email is a single
//! `INSERT .. ON CONFLICT(email) DO UPDATE .. RETURNING` statement, so there
//! is no check-then-write window between concurrent logins for the same
//! account.

use crate::store::SEARCH_RESULT_LIMIT;
use crate::{DbError, Result, Store};

use acct_core::{Session, User, UserPatch};

use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use uuid::Uuid;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file and run migrations.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| DbError::Initialization {
                message: format!("Failed to create database directory: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// In-memory database, used by tests and throwaway environments.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true);

        // In-memory databases exist per connection; a single connection keeps
        // every operation on the same database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| DbError::Migration {
                message: format!("Migration failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert_user(&self, user: &User) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
                INSERT INTO users (
                    id, external_id, name, email, picture,
                    access_token, refresh_token, created_at, last_login, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(email) DO UPDATE SET
                    external_id = excluded.external_id,
                    name = excluded.name,
                    picture = excluded.picture,
                    access_token = excluded.access_token,
                    refresh_token = excluded.refresh_token,
                    last_login = excluded.last_login
                RETURNING id, external_id, name, email, picture,
                    access_token, refresh_token, created_at, last_login, updated_at
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.external_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.picture)
        .bind(&user.access_token)
        .bind(&user.refresh_token)
        .bind(user.created_at.timestamp())
        .bind(user.last_login.timestamp())
        .bind(user.updated_at.map(|dt| dt.timestamp()))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
                SELECT id, external_id, name, email, picture,
                    access_token, refresh_token, created_at, last_login, updated_at
                FROM users
                WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
                SELECT id, external_id, name, email, picture,
                    access_token, refresh_token, created_at, last_login, updated_at
                FROM users
                WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
                SELECT id, external_id, name, email, picture,
                    access_token, refresh_token, created_at, last_login, updated_at
                FROM users
                ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_user(&self, email: &str, patch: &UserPatch) -> Result<bool> {
        let result = sqlx::query(
            r#"
                UPDATE users SET
                    name = COALESCE(?1, name),
                    picture = COALESCE(?2, picture),
                    access_token = COALESCE(?3, access_token),
                    refresh_token = COALESCE(?4, refresh_token),
                    updated_at = ?5
                WHERE email = ?6
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.picture)
        .bind(&patch.access_token)
        .bind(&patch.refresh_token)
        .bind(Utc::now().timestamp())
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, email: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE email = ?1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_users(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let pattern = format!("%{}%", escape_like(query));

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
                SELECT id, external_id, name, email, picture,
                    access_token, refresh_token, created_at, last_login, updated_at
                FROM users
                WHERE name LIKE ?1 ESCAPE '\' OR email LIKE ?1 ESCAPE '\'
                ORDER BY created_at DESC
                LIMIT ?2
            "#,
        )
        .bind(&pattern)
        .bind(SEARCH_RESULT_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
                INSERT INTO sessions (
                    session_id, user_email, created_at, expires_at, user_agent, ip_address
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(session_id) DO UPDATE SET
                    user_email = excluded.user_email,
                    created_at = excluded.created_at,
                    expires_at = excluded.expires_at,
                    user_agent = excluded.user_agent,
                    ip_address = excluded.ip_address
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.user_email)
        .bind(session.created_at.timestamp())
        .bind(session.expires_at.timestamp())
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
                SELECT session_id, user_email, created_at, expires_at, user_agent, ip_address
                FROM sessions
                WHERE session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        // Lazy expiry: validity is decided here at read time, the expired row
        // stays in place until revoked or superseded.
        let session = row.map(Session::try_from).transpose()?;
        Ok(session.filter(|s| s.is_valid()))
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = ?1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_sessions_for_user(&self, email: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_email = ?1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    external_id: Option<String>,
    name: Option<String>,
    email: String,
    picture: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    created_at: i64,
    last_login: i64,
    updated_at: Option<i64>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: parse_uuid(&row.id, "users.id")?,
            external_id: row.external_id,
            name: row.name,
            email: row.email,
            picture: row.picture,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            created_at: parse_timestamp(row.created_at, "users.created_at")?,
            last_login: parse_timestamp(row.last_login, "users.last_login")?,
            updated_at: row
                .updated_at
                .map(|ts| parse_timestamp(ts, "users.updated_at"))
                .transpose()?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    user_email: String,
    created_at: i64,
    expires_at: i64,
    user_agent: Option<String>,
    ip_address: Option<String>,
}

impl TryFrom<SessionRow> for Session {
    type Error = DbError;

    fn try_from(row: SessionRow) -> Result<Self> {
        Ok(Session {
            session_id: row.session_id,
            user_email: row.user_email,
            created_at: parse_timestamp(row.created_at, "sessions.created_at")?,
            expires_at: parse_timestamp(row.expires_at, "sessions.expires_at")?,
            user_agent: row.user_agent,
            ip_address: row.ip_address,
        })
    }
}

#[track_caller]
fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode {
        message: format!("Invalid UUID in {}: {}", field, e),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn parse_timestamp(secs: i64, field: &'static str) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| DbError::Decode {
        message: format!("Invalid timestamp in {}", field),
        location: ErrorLocation::from(Location::caller()),
    })
}
