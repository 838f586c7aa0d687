use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures inside the session synchronization layer.
///
/// None of these escape an inbound event handler; they are logged or
/// folded into the store's `connection_error` field.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("failed to decode '{event}' payload: {message}")]
    Decode { event: String, message: String },

    #[error("room creation failed: {0}")]
    RoomCreation(String),

    #[error("transport channel closed")]
    ChannelClosed,
}

#[derive(Debug, thiserror::Error)]
pub enum PokerSyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
