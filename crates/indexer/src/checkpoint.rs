use crate::CheckpointError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Durable cursor → watermark mapping.
///
/// Implementations must give read-your-writes for a single cursor. Runs that
/// share a cursor are serialized by the caller, not here.
#[async_trait]
pub trait TimeSaver: Send + Sync {
    /// `Ok(None)` when the cursor has never been written.
    async fn get(&self, cursor: &str) -> Result<Option<DateTime<Utc>>, CheckpointError>;

    async fn put(&self, cursor: &str, at: DateTime<Utc>) -> Result<(), CheckpointError>;
}

#[async_trait]
impl<T: TimeSaver + ?Sized> TimeSaver for Arc<T> {
    async fn get(&self, cursor: &str) -> Result<Option<DateTime<Utc>>, CheckpointError> {
        (**self).get(cursor).await
    }

    async fn put(&self, cursor: &str, at: DateTime<Utc>) -> Result<(), CheckpointError> {
        (**self).put(cursor, at).await
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedCheckpoints {
    pub updated_at_unix_ms: u64,
    #[serde(default)]
    pub cursors: BTreeMap<String, DateTime<Utc>>,
}

/// Stores every cursor in one JSON document, replaced atomically on write.
#[derive(Debug, Clone)]
pub struct FileTimeSaver {
    path: PathBuf,
}

impl FileTimeSaver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read_all(&self) -> Result<Option<PersistedCheckpoints>, CheckpointError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, state: &PersistedCheckpoints) -> Result<(), CheckpointError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TimeSaver for FileTimeSaver {
    async fn get(&self, cursor: &str) -> Result<Option<DateTime<Utc>>, CheckpointError> {
        Ok(self
            .read_all()
            .await?
            .and_then(|state| state.cursors.get(cursor).copied()))
    }

    async fn put(&self, cursor: &str, at: DateTime<Utc>) -> Result<(), CheckpointError> {
        let mut state = self.read_all().await?.unwrap_or_default();
        state.cursors.insert(cursor.to_string(), at);
        state.updated_at_unix_ms = unix_now_ms();
        self.write_all(&state).await
    }
}

/// Process-local store; watermarks vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryTimeSaver {
    cursors: Mutex<HashMap<String, DateTime<Utc>>>,
    writes: AtomicUsize,
}

impl MemoryTimeSaver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cursor(cursor: impl Into<String>, at: DateTime<Utc>) -> Self {
        let saver = Self::default();
        if let Ok(mut cursors) = saver.cursors.lock() {
            cursors.insert(cursor.into(), at);
        }
        saver
    }

    /// Number of successful `put` calls, for callers asserting on checkpoint traffic.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimeSaver for MemoryTimeSaver {
    async fn get(&self, cursor: &str) -> Result<Option<DateTime<Utc>>, CheckpointError> {
        let cursors = self.cursors.lock().map_err(|_| CheckpointError::Poisoned)?;
        Ok(cursors.get(cursor).copied())
    }

    async fn put(&self, cursor: &str, at: DateTime<Utc>) -> Result<(), CheckpointError> {
        self.cursors
            .lock()
            .map_err(|_| CheckpointError::Poisoned)?
            .insert(cursor.to_string(), at);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn unix_now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}
