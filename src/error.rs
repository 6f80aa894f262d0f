use std::time::Duration;

use thiserror::Error;

/// The interactive surface stopped giving usable answers.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input closed")]
    Closed,

    #[error("no valid answer after {attempts} attempts")]
    Exhausted { attempts: usize },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("completion request failed: {0}")]
    Completion(#[from] chatgpt::err::Error),

    #[error("generator output is not a JSON question list: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("question #{index} is invalid: {reason}")]
    Invalid { index: usize, reason: String },

    #[error("expected {expected} questions, generator returned {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("generator returned no questions")]
    Empty,

    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("wikipedia request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("wikipedia answered with status {0}")]
    Status(u16),

    #[error("requested {requested} categories but only {available} are available")]
    InsufficientCategories { requested: usize, available: usize },

    #[error("no categories available")]
    NoCategories,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("leaderboard serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unexpected leaderboard layout: {0}")]
    Format(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Errors that end a game session without handing control back normally.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Input(#[from] InputError),
}
