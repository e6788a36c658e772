//! Crate error type.
//!
//! Only fatal conditions live here: I/O, malformed files, and roster shape
//! problems. An unplannable relocation or an exhausted budget is a normal
//! engine outcome, not an error.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised while loading rosters, reading configuration, or writing
/// reports.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid roster: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Vec<ValidationError>> for Error {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
