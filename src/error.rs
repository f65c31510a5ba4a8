use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown range: {0} (expected week, month or year)")]
    UnknownRange(String),

    #[error("Invalid timezone '{0}' (expected IANA name, e.g. America/New_York)")]
    InvalidTimezone(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Unknown friend: {0}")]
    UnknownFriend(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, OcrError>;
