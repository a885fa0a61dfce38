use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_SESSION_COOKIE_NAME, DEFAULT_SESSION_VALIDITY_DAYS,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Server-side session validity window in days.
    pub validity_days: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            validity_days: DEFAULT_SESSION_VALIDITY_DAYS,
            cookie_name: String::from(DEFAULT_SESSION_COOKIE_NAME),
            cookie_secure: false,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.validity_days < 1 {
            return Err(ConfigError::session(format!(
                "session.validity_days must be >= 1, got {}",
                self.validity_days
            )));
        }

        if self.cookie_name.is_empty() {
            return Err(ConfigError::session("session.cookie_name must not be empty"));
        }

        Ok(())
    }
}
