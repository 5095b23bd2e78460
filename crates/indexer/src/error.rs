use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("index request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] modsync_protocol::DecodeError),

    #[error("index returned no records since {}", .since.to_rfc3339())]
    EmptyPage { since: DateTime<Utc> },

    #[error("checkpoint {cursor:?}: {source}")]
    Checkpoint {
        cursor: String,
        #[source]
        source: CheckpointError,
    },

    #[error("sync cancelled")]
    Cancelled,

    #[error("sync deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    pub(crate) fn checkpoint(cursor: &str, source: impl Into<CheckpointError>) -> Self {
        Self::Checkpoint {
            cursor: cursor.to_string(),
            source: source.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("checkpoint state lock poisoned")]
    Poisoned,
}
