use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("provider rate limit hit: {detail}")]
    RateLimited { detail: String },

    #[error("search API error (status {status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },
}

impl HarvestError {
    /// Only rate-limit errors abort the whole run; everything else is
    /// handled at the cell or business level.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, HarvestError::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
