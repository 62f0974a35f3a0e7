use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scrape of {source_name} failed: {message}")]
    Scrape { source_name: String, message: String },

    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    #[error("Unknown status: {0}")]
    InvalidStatus(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

impl HubError {
    /// Store-side failures end a collection run; everything else is per-source.
    pub fn is_persistence(&self) -> bool {
        matches!(self, HubError::Database(_) | HubError::Persistence(_))
    }
}

pub type Result<T> = std::result::Result<T, HubError>;
