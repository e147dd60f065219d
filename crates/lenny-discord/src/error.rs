//! Error types for lenny-discord

use thiserror::Error;

/// Error type for the Discord session
#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("log channel is not resolved")]
    LogChannelUnresolved,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serenity error: {0}")]
    Serenity(#[from] serenity::Error),
}

/// Result type alias for lenny-discord
pub type Result<T> = std::result::Result<T, DiscordError>;
