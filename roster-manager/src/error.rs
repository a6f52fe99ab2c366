use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Please confirm you have informed the person you are swapping with")]
    NotAcknowledged,

    #[error("Please select both dates")]
    MissingDate,

    #[error("{role} is not assigned to {date}")]
    NotAssigned { date: String, role: String },

    #[error("Cannot {action} while {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Malformed backend payload: {0}")]
    MalformedBackendPayload(String),

    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RosterError {
    /// Errors the store recovers from by falling back to generated defaults.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            RosterError::BackendUnavailable(_)
                | RosterError::MalformedBackendPayload(_)
                | RosterError::Database(_)
                | RosterError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
