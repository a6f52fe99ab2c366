use std::sync::Arc;

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

use application::session::RosterSession;
use config::{BackendConfig, RosterConfig};
use domain::models::MonthCursor;
use infrastructure::repository::{MemoryBackend, RosterBackend};
use infrastructure::sqlite_repo::SqliteRosterRepository;
use infrastructure::webhook_repo::WebhookBackend;

pub use error::{Result, RosterError};

// =====================
// Wiring
// =====================

/// Builds the backend named in the config. Only SQLite does I/O here.
pub async fn open_backend(config: &BackendConfig) -> Result<Arc<dyn RosterBackend>> {
    let backend: Arc<dyn RosterBackend> = match config {
        BackendConfig::Memory => Arc::new(MemoryBackend::new()),
        BackendConfig::Sqlite { path } => Arc::new(SqliteRosterRepository::connect(path).await?),
        BackendConfig::Webhook { url, shape } => Arc::new(WebhookBackend::new(url, *shape)),
    };
    log::debug!("using {} backend", backend.name());
    Ok(backend)
}

/// Opens the configured backend and starts a session on `cursor`.
/// The session is not loaded yet; call `load()` to sync with the backend.
pub async fn open_session(config: &RosterConfig, cursor: MonthCursor) -> Result<RosterSession> {
    let rotation = config.rotation()?;
    let backend = open_backend(&config.backend).await?;
    Ok(RosterSession::new(backend, rotation, config.swap_policy, cursor))
}
