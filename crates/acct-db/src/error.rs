use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLx error: {source} {location}")]
    Sqlx {
        source: sqlx::Error,
        location: ErrorLocation,
    },

    #[error("Duplicate value for unique field '{field}' {location}")]
    Conflict {
        field: &'static str,
        location: ErrorLocation,
    },

    #[error("Row decode error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Migration error: {message} {location}")]
    Migration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Store initialization failed: {message} {location}")]
    Initialization {
        message: String,
        location: ErrorLocation,
    },
}

impl From<sqlx::Error> for DbError {
    #[track_caller]
    fn from(source: sqlx::Error) -> Self {
        // The only unique constraint in the schema is users.email; session ids
        // are written with an upsert and never collide on insert.
        if let sqlx::Error::Database(ref db_err) = source
            && db_err.is_unique_violation()
        {
            return Self::Conflict {
                field: "email",
                location: ErrorLocation::from(Location::caller()),
            };
        }

        Self::Sqlx {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
