//! Error type shared by the bot library.

use std::path::PathBuf;

/// Errors surfaced by storage, configuration and playback setup.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("background music {path:?} unusable: {source}")]
    Bgm {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("voice connection failed: {0}")]
    Voice(String),
    #[error("message delivery failed: {0}")]
    Send(String),
    #[error("invalid update: {0}")]
    Update(String),
    #[error("invalid sound effect pattern: {0}")]
    Pattern(#[from] globset::Error),
}

/// Library-wide result alias.
pub type Result<T> = std::result::Result<T, BotError>;
