use thiserror::Error;

use crate::collection::EntryId;

pub type Result<T> = std::result::Result<T, RollerError>;

/// Failures surfaced by the roller and its collaborators.
///
/// None of these are retried. Each one means the panel/collection
/// correspondence could not be maintained and the caller must know.
#[derive(Debug, Error)]
pub enum RollerError {
    #[error("entry {id} is not part of the collection")]
    UnknownEntry { id: EntryId },

    #[error("panel stack out of sync at position {position}: {detail}")]
    OutOfSync { position: usize, detail: String },

    #[error("invalid roller config: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from loading a [`RollerConfig`](crate::config::RollerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}
