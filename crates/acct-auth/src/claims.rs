use serde::Deserialize;

/// Normalized identity claims as returned by the OAuth provider's userinfo
/// endpoint. Only `email` is load-bearing; the rest is profile decoration.
///
/// The resolver consumes these after the network exchange has already
/// happened - this type never drives a request itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserClaims {
    /// Provider subject claim, the stable external id.
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl UserClaims {
    /// The email, treating empty strings as absent.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}

/// Opaque token pair from the provider's token endpoint. Stored verbatim,
/// never interpreted. Unknown response fields (expiry, scope, id_token) are
/// dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenSet {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}
