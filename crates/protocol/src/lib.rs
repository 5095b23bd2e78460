//! # modsync protocol
//!
//! Wire format of the module index feed.
//!
//! ```text
//! GET <index>?since=<RFC3339>
//!     │
//!     ├──> NDJSON body, one record per line
//!     │      {"Path": "...", "Version": "...", "Timestamp": "..."}
//!     │
//!     ├──> decode_ndjson ──> IndexEntry[] (index order)
//!     │
//!     └──> EntryFilter ──> entries worth reporting
//! ```

mod entry;
mod filter;
mod ndjson;

pub use entry::{format_since, IndexEntry};
pub use filter::{is_pseudo_version, EntryFilter};
pub use ndjson::{decode_ndjson, DecodeError};
