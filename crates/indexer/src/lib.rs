//! # modsync indexer
//!
//! Incremental sync of a module index feed with a persisted watermark.
//!
//! ## Pipeline
//!
//! ```text
//! TimeSaver::get(cursor)            (or now - lookback)
//!     │
//!     ├──> Indexer::fetch(prefix, since)   repeated
//!     │      ├─ filter (prefix, internal, third_party, pseudo-versions)
//!     │      └─ since := last record timestamp
//!     │
//!     ├──> HashSet<IndexEntry>              dedup across pages
//!     │
//!     └──> TimeSaver::put(cursor, since)    once since > now - settle
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use modsync_indexer::{FileTimeSaver, IncrementalSync, SyncConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> modsync_indexer::Result<()> {
//!     let config = SyncConfig::default().with_env_overrides();
//!     let saver = FileTimeSaver::new("state/checkpoints.json");
//!     let sync = IncrementalSync::from_config(config, saver)?;
//!     let report = sync.run("cloud.google.com/go", &CancellationToken::new()).await?;
//!
//!     for entry in report.sorted_entries() {
//!         println!("{} {}", entry.path, entry.version);
//!     }
//!     Ok(())
//! }
//! ```

mod checkpoint;
mod client;
mod config;
mod error;
mod page;
mod sync;

pub use checkpoint::{FileTimeSaver, MemoryTimeSaver, PersistedCheckpoints, TimeSaver};
pub use client::{IndexClient, Indexer};
pub use config::{SyncConfig, DEFAULT_CURSOR, DEFAULT_INDEX_URL};
pub use error::{CheckpointError, Result, SyncError};
pub use modsync_protocol::{is_pseudo_version, EntryFilter, IndexEntry};
pub use page::Page;
pub use sync::{IncrementalSync, SyncReport};
