use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankError {
    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    #[error("Explorer error on {action}: {message}")]
    Explorer { action: String, message: String },

    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Corrupt stored record: {0}")]
    CorruptRecord(String),

    #[error("No score store configured")]
    StoreUnavailable,
}

pub type Result<T> = std::result::Result<T, RankError>;

/// Failures inside a single ranking pass. These never leave the engine:
/// `rank_from_json` turns them into the default result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankingError {
    #[error("Malformed {list} record at index {index}")]
    MalformedRecord { list: &'static str, index: usize },

    #[error("Non-finite point total")]
    NonFinite,
}
