//! Unified error type for the FOMC edge bot.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Kalshi API error (status={status}): {message}")]
    KalshiApi { status: u16, message: String },

    #[error("Futures data error: {0}")]
    FuturesData(String),

    #[error("FOMC calendar error: {0}")]
    Calendar(String),

    #[error("No suitable event for the target date: {0}")]
    NoMatchingEvent(String),

    #[error("Missing upstream data: {0}")]
    MissingData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
