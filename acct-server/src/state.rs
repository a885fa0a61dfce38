use crate::oauth::GoogleClient;

use acct_auth::{IdentityResolver, SessionManager};
use acct_db::Store;

use std::sync::Arc;

/// Session cookie parameters, lifted out of config at startup.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

/// Shared application state.
///
/// The storage gateway is constructed exactly once at bootstrap and injected
/// here; nothing else in the process holds a connection of its own.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub resolver: IdentityResolver,
    pub sessions: SessionManager,
    pub oauth: Arc<GoogleClient>,
    pub cookies: CookieSettings,
}
