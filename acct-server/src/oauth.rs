//! Outbound OAuth exchange: authorization URL, code-for-token, userinfo.
//!
//! This is the only part of the process that talks to the provider network.
//! The identity core consumes the resulting claims and tokens; it never sees
//! this client. Endpoint URLs come from config so tests can point the
//! exchange at a local mock provider.

use acct_auth::{TokenSet, UserClaims};
use acct_config::GoogleConfig;

use std::panic::Location;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use error_location::ErrorLocation;
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("OAuth request failed: {source} {location}")]
    Http {
        source: reqwest::Error,
        location: ErrorLocation,
    },

    #[error("OAuth provider returned {status}: {body} {location}")]
    Provider {
        status: u16,
        body: String,
        location: ErrorLocation,
    },

    #[error("Invalid OAuth endpoint URL: {message} {location}")]
    Url {
        message: String,
        location: ErrorLocation,
    },
}

impl From<reqwest::Error> for OAuthError {
    #[track_caller]
    fn from(source: reqwest::Error) -> Self {
        Self::Http {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, OAuthError>;

/// Authorization URL plus the anti-CSRF state the caller must stash in a
/// cookie and compare at callback time.
#[derive(Debug)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Google OAuth client (authorization-code flow with a client secret).
pub struct GoogleClient {
    config: GoogleConfig,
    http: reqwest::Client,
}

impl GoogleClient {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Build the provider authorization URL with a fresh state parameter.
    ///
    /// `access_type=offline` asks Google for a refresh token alongside the
    /// access token.
    pub fn authorization_request(&self) -> Result<AuthorizationRequest> {
        let state = generate_state();

        let url = reqwest::Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("access_type", "offline"),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| OAuthError::Url {
            message: format!("{}: {}", self.config.auth_url, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state,
        })
    }

    /// Exchange the callback code for the provider's token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        // Unknown response fields (expires_in, scope, id_token) are dropped.
        let tokens = response.json::<TokenSet>().await?;
        Ok(tokens)
    }

    /// Fetch the normalized identity claims for an access token.
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<UserClaims> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let claims = response.json::<UserClaims>().await?;
        Ok(claims)
    }
}

async fn provider_error(response: reqwest::Response) -> OAuthError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    OAuthError::Provider {
        status,
        body,
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Random anti-CSRF state: 16 bytes, base64url, 22 characters.
fn generate_state() -> String {
    let random_bytes: [u8; 16] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}
