use crate::{ConfigError, ConfigErrorResult, DEFAULT_DATABASE_FILENAME};

use std::str::FromStr;

use serde::Deserialize;

/// Which Storage Gateway implementation the process constructs at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// Durable relational store (sqlx/SQLite).
    Sqlite,
    /// In-process document store; nothing survives a restart.
    Memory,
}

impl FromStr for DatabaseBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseBackend::Sqlite),
            "memory" => Ok(DatabaseBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// Database file path, relative to the config directory. Ignored by the
    /// memory backend.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            path: String::from(DEFAULT_DATABASE_FILENAME),
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.backend == DatabaseBackend::Sqlite {
            let path = std::path::Path::new(&self.path);
            if self.path.is_empty() {
                return Err(ConfigError::database("database.path must not be empty"));
            }
            if path.is_absolute() || self.path.contains("..") {
                return Err(ConfigError::database(
                    "database.path must be relative and cannot contain '..'",
                ));
            }
        }

        Ok(())
    }
}
