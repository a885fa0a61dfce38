use acct_auth::{IdentityResolver, SessionManager};
use acct_config::DatabaseBackend;
use acct_db::{MemoryStore, SqliteStore, Store};
use acct_server::oauth::GoogleClient;
use acct_server::{AppState, CookieSettings, build_router, logger};

use std::error::Error;
use std::sync::Arc;

use chrono::Duration;
use log::{info, warn};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env is a development convenience; absence is fine.
    let _ = dotenvy::dotenv();

    // Load and validate configuration
    let config = acct_config::Config::load()?;
    config.validate()?;

    // Construct log file path if configured
    let log_file_path: Option<std::path::PathBuf> = if let Some(ref filename) = config.logging.file
    {
        let config_dir = acct_config::Config::config_dir()?;
        let log_dir = config_dir.join(&config.logging.dir);

        // Ensure log directory exists
        std::fs::create_dir_all(&log_dir)?;

        Some(log_dir.join(filename))
    } else {
        None
    };

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting acct-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // Construct the storage gateway selected by config. This is the only
    // place a backend is built; everything downstream gets it injected.
    let store: Arc<dyn Store> = match config.database.backend {
        DatabaseBackend::Sqlite => {
            let database_path = config.database_path()?;
            info!("Connecting to database: {}", database_path.display());

            let store = SqliteStore::connect(&database_path).await?;
            info!("Database connection established");

            Arc::new(store)
        }
        DatabaseBackend::Memory => {
            warn!("Using the in-memory backend: data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    if !config.google.is_configured() {
        warn!("Google OAuth is not configured; /auth/login will be unavailable");
    }

    let state = AppState {
        resolver: IdentityResolver::new(store.clone()),
        sessions: SessionManager::new(store.clone(), Duration::days(config.session.validity_days)),
        oauth: Arc::new(GoogleClient::new(config.google.clone())),
        cookies: CookieSettings {
            name: config.session.cookie_name.clone(),
            secure: config.session.cookie_secure,
        },
        store,
    };

    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
