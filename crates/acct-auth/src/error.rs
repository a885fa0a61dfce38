use acct_db::DbError;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The provider's claims carried no email. Email is the join key for
    /// identities, so nothing can be persisted; no storage call is made.
    #[error("OAuth claims are missing the required email {location}")]
    MissingEmail { location: ErrorLocation },

    /// The storage gateway failed. Kept distinct from provider failures so
    /// callers can surface "login succeeded but profile save failed".
    #[error("Storage gateway error: {source}")]
    Store {
        #[source]
        source: DbError,
    },
}

impl From<DbError> for AuthError {
    fn from(source: DbError) -> Self {
        Self::Store { source }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
