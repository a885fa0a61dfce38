use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_REDIRECT_URI, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL,
    GOOGLE_USERINFO_URL,
};

use serde::Deserialize;

/// Google OAuth client settings.
///
/// The endpoint URLs default to Google's and exist as fields so tests can
/// point the exchange at a local mock provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,

    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::from(DEFAULT_REDIRECT_URI),
            auth_url: String::from(GOOGLE_AUTH_URL),
            token_url: String::from(GOOGLE_TOKEN_URL),
            userinfo_url: String::from(GOOGLE_USERINFO_URL),
        }
    }
}

impl GoogleConfig {
    /// True once a client id and secret have been provided. An unconfigured
    /// server still boots; only the login flow is disabled.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        // Half-configured credentials are a misconfiguration; fully absent
        // credentials just mean login is unavailable.
        if self.client_id.is_empty() != self.client_secret.is_empty() {
            return Err(ConfigError::google(
                "google.client_id and google.client_secret must be set together",
            ));
        }

        if self.is_configured() && self.redirect_uri.is_empty() {
            return Err(ConfigError::google("google.redirect_uri must not be empty"));
        }

        for (field, value) in [
            ("google.auth_url", &self.auth_url),
            ("google.token_url", &self.token_url),
            ("google.userinfo_url", &self.userinfo_url),
        ] {
            if value.is_empty() {
                return Err(ConfigError::google(format!("{} must not be empty", field)));
            }
        }

        Ok(())
    }
}
