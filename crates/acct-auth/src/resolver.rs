use crate::{AuthError, Result as AuthErrorResult, TokenSet, UserClaims};

use acct_core::User;
use acct_db::Store;

use std::panic::Location;
use std::sync::Arc;

use error_location::ErrorLocation;

/// Turns an OAuth authorization result into a persisted identity.
///
/// The resolver holds no user data of its own; the storage gateway is the
/// sole owner of identity records. Constructed once at bootstrap with the
/// gateway injected, so tests can hand it any `Store`.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn Store>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Normalize the provider's claims and upsert them by email.
    ///
    /// Returns the merged identity as stored. A first login creates the
    /// record (`created_at == last_login`); later logins replace the profile
    /// fields and advance `last_login` only. Fails with `MissingEmail`
    /// before touching storage when the claims carry no email.
    pub async fn resolve_and_persist(
        &self,
        claims: &UserClaims,
        tokens: &TokenSet,
    ) -> AuthErrorResult<User> {
        let Some(email) = claims.email() else {
            return Err(AuthError::MissingEmail {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let mut candidate = User::new(email);
        candidate.external_id = claims.sub.clone();
        candidate.name = claims.name.clone();
        candidate.picture = claims.picture.clone();
        candidate.access_token = tokens.access_token.clone();
        candidate.refresh_token = tokens.refresh_token.clone();

        let stored = self.store.upsert_user(&candidate).await?;
        Ok(stored)
    }
}
