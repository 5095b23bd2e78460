use crate::{Result, SyncError};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_INDEX_URL: &str = "https://index.golang.org/index";
pub const DEFAULT_CURSOR: &str = "index";

const DEFAULT_LOOKBACK_SECS: u64 = 10 * 24 * 60 * 60;
const DEFAULT_SETTLE_SECS: u64 = 5 * 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_INDEX_URL: &str = "MODSYNC_INDEX_URL";
const ENV_CURSOR: &str = "MODSYNC_CURSOR";

/// Tunables for one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Endpoint that accepts `?since=` and answers with NDJSON records.
    pub index_url: String,
    /// Checkpoint cursor the watermark is stored under.
    pub cursor: String,
    /// How far back a cursor with no stored watermark starts.
    pub lookback_secs: u64,
    /// Records newer than `now - settle` may still be in flux upstream.
    pub settle_secs: u64,
    /// Optional `limit` query parameter; the index picks its own page size otherwise.
    pub page_limit: Option<u32>,
    /// Let a page whose records were all filtered out move the watermark to
    /// its last raw record instead of failing the run with `EmptyPage`.
    pub advance_past_filtered: bool,
    pub request_timeout_secs: u64,
    /// Whole-run deadline. `None` leaves cancellation to the caller's token.
    pub deadline_secs: Option<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            cursor: DEFAULT_CURSOR.to_string(),
            lookback_secs: DEFAULT_LOOKBACK_SECS,
            settle_secs: DEFAULT_SETTLE_SECS,
            page_limit: None,
            advance_past_filtered: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            deadline_secs: None,
        }
    }
}

impl SyncConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| SyncError::Config(format!("parse failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SyncError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Apply `MODSYNC_INDEX_URL` / `MODSYNC_CURSOR` when set and non-empty.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = non_empty_env(ENV_INDEX_URL) {
            self.index_url = url;
        }
        if let Some(cursor) = non_empty_env(ENV_CURSOR) {
            self.cursor = cursor;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.cursor.trim().is_empty() {
            return Err(SyncError::Config("cursor must not be empty".into()));
        }
        let url = self.index_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SyncError::Config(format!(
                "index_url must be http(s): {url:?}"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(SyncError::Config(
                "request_timeout_secs must be positive".into(),
            ));
        }
        if self.page_limit == Some(0) {
            return Err(SyncError::Config("page_limit must be positive".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn lookback(&self) -> Duration {
        Duration::from_secs(self.lookback_secs)
    }

    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
