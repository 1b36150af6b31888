use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrError {
    /// Resolution was invoked without any candidate merchants.
    #[error("no candidate merchants to resolve")]
    EmptyCandidateSet,
    /// The geolocation collaborator timed out, failed, or had no answer.
    /// Recovered inside the resolver and never returned to callers of `resolve`.
    #[error("geolocation unavailable: {0}")]
    GeolocationUnavailable(String),
    #[error("no merchants found for code: {0}")]
    UnknownCode(String),
    #[error("invalid configuration for {var}: {reason}")]
    Config { var: String, reason: String },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, QrError>;
