use crate::IndexEntry;

const EXCLUDED_PATH_SEGMENTS: &[&str] = &["internal", "third_party"];

/// Decides which index records are reported to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    prefix: String,
}

impl EntryFilter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// An empty prefix matches every path.
    #[must_use]
    pub fn allows(&self, entry: &IndexEntry) -> bool {
        if !entry.path.starts_with(&self.prefix) {
            return false;
        }
        if EXCLUDED_PATH_SEGMENTS
            .iter()
            .any(|needle| entry.path.contains(needle))
        {
            return false;
        }
        !is_pseudo_version(&entry.version)
    }
}

/// Pseudo-versions (and pre-releases) carry a hyphen; release tags never do.
#[must_use]
pub fn is_pseudo_version(version: &str) -> bool {
    version.contains('-')
}
