mod config;
mod database_config;
mod error;
mod log_level;
mod logging_config;
mod oauth_config;
mod server_config;
mod session_config;

pub use config::Config;
pub use database_config::{DatabaseBackend, DatabaseConfig};
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use oauth_config::GoogleConfig;
pub use server_config::ServerConfig;
pub use session_config::SessionConfig;

#[cfg(test)]
mod tests;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const MIN_PORT: u16 = 1024;
const DEFAULT_DATABASE_FILENAME: &str = "accounts.db";
const DEFAULT_SESSION_VALIDITY_DAYS: i64 = 30;
const DEFAULT_SESSION_COOKIE_NAME: &str = "acct_session";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8000/auth/callback";
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
