use crate::{IndexClient, Indexer, Result, SyncConfig, SyncError, TimeSaver};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use modsync_protocol::{format_since, IndexEntry};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Deduplicated entries seen during the run. Unordered.
    pub entries: HashSet<IndexEntry>,
    /// Watermark the run started from (stored or lookback default).
    pub started_from: DateTime<Utc>,
    /// Watermark written back to the checkpoint store.
    pub watermark: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub pages: usize,
    /// Raw records received across all pages, before filtering and dedup.
    pub records: usize,
}

impl SyncReport {
    /// Entries in index order, ties broken by path then version.
    #[must_use]
    pub fn sorted_entries(&self) -> Vec<IndexEntry> {
        let mut out: Vec<IndexEntry> = self.entries.iter().cloned().collect();
        out.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.path.cmp(&b.path))
                .then_with(|| a.version.cmp(&b.version))
        });
        out
    }
}

/// Pages through the index from the stored watermark up to `now - settle`.
///
/// The checkpoint is read once and written once, and only after every page
/// was fetched. Any failure leaves the stored watermark untouched, so the next
/// run re-reads the same range (at-least-once delivery).
pub struct IncrementalSync<I, S> {
    indexer: I,
    saver: S,
    config: SyncConfig,
}

impl<S: TimeSaver> IncrementalSync<IndexClient, S> {
    /// Sync against the HTTP index named in `config`.
    pub fn from_config(config: SyncConfig, saver: S) -> Result<Self> {
        let client = IndexClient::new(&config)?;
        Ok(Self::new(client, saver, config))
    }
}

impl<I: Indexer, S: TimeSaver> IncrementalSync<I, S> {
    pub fn new(indexer: I, saver: S, config: SyncConfig) -> Self {
        Self {
            indexer,
            saver,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub async fn run(&self, prefix: &str, cancel: &CancellationToken) -> Result<SyncReport> {
        self.run_at(prefix, Utc::now(), cancel).await
    }

    /// Same as [`run`](Self::run) with an explicit notion of "now".
    pub async fn run_at(
        &self,
        prefix: &str,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<SyncReport> {
        let outcome = match self.config.deadline() {
            Some(limit) => tokio::time::timeout(limit, self.sync(prefix, now, cancel))
                .await
                .unwrap_or(Err(SyncError::DeadlineExceeded(limit))),
            None => self.sync(prefix, now, cancel).await,
        };
        if let Err(err) = &outcome {
            warn!(
                "sync of cursor {:?} aborted, watermark left unchanged: {err}",
                self.config.cursor
            );
        }
        outcome
    }

    async fn sync(
        &self,
        prefix: &str,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<SyncReport> {
        let cursor = self.config.cursor.as_str();
        let cutoff = shift_back(now, self.config.settle())?;

        let stored = cancellable(cancel, self.saver.get(cursor))
            .await?
            .map_err(|e| SyncError::checkpoint(cursor, e))?;
        let started_from = match stored {
            Some(at) => at,
            None => shift_back(now, self.config.lookback())?,
        };

        info!(
            "Fetching index entries for cursor {cursor:?} since {}",
            format_since(started_from)
        );

        let mut since = started_from;
        let mut entries = HashSet::new();
        let mut pages = 0usize;
        let mut records = 0usize;
        loop {
            let page = cancellable(cancel, self.indexer.fetch(prefix, since)).await??;
            pages += 1;

            let last = if self.config.advance_past_filtered && page.has_records() {
                page.last_seen.or_else(|| page.last_kept())
            } else {
                page.last_kept()
            };
            let last = last.ok_or(SyncError::EmptyPage { since })?;

            debug!(
                "page {pages}: {} records, {} kept, last at {}",
                page.records,
                page.entries.len(),
                format_since(last)
            );

            // A misbehaving index must not drag the watermark backwards.
            since = since.max(last);
            records += page.records;
            entries.extend(page.entries);

            if since > cutoff {
                break;
            }
        }

        cancellable(cancel, self.saver.put(cursor, since))
            .await?
            .map_err(|e| SyncError::checkpoint(cursor, e))?;

        info!(
            "Parsed {pages} index pages up to {} ({} unique entries)",
            format_since(since),
            entries.len()
        );

        Ok(SyncReport {
            entries,
            started_from,
            watermark: since,
            cutoff,
            pages,
            records,
        })
    }
}

async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SyncError::Cancelled),
        out = fut => Ok(out),
    }
}

fn shift_back(now: DateTime<Utc>, by: Duration) -> Result<DateTime<Utc>> {
    chrono::Duration::from_std(by)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or_else(|| SyncError::Config(format!("duration {by:?} out of range")))
}
