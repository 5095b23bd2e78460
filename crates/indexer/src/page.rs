use chrono::{DateTime, Utc};
use modsync_protocol::{EntryFilter, IndexEntry};

/// One response of the index, after filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Records that passed the filter, in index order.
    pub entries: Vec<IndexEntry>,
    /// Timestamp of the final raw record, filtered or not.
    pub last_seen: Option<DateTime<Utc>>,
    /// Raw record count before filtering.
    pub records: usize,
}

impl Page {
    pub fn from_records(records: Vec<IndexEntry>, filter: &EntryFilter) -> Self {
        let last_seen = records.last().map(|e| e.timestamp);
        let total = records.len();
        let entries = records.into_iter().filter(|e| filter.allows(e)).collect();
        Self {
            entries,
            last_seen,
            records: total,
        }
    }

    /// A page whose records all survived filtering.
    pub fn unfiltered(entries: Vec<IndexEntry>) -> Self {
        Self {
            last_seen: entries.last().map(|e| e.timestamp),
            records: entries.len(),
            entries,
        }
    }

    /// No record survived filtering.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamp of the final record that survived filtering.
    #[must_use]
    pub fn last_kept(&self) -> Option<DateTime<Utc>> {
        self.entries.last().map(|e| e.timestamp)
    }

    /// The index answered with records, whether or not any were kept.
    #[must_use]
    pub fn has_records(&self) -> bool {
        self.records > 0 || !self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn last_seen_tracks_raw_records() {
        let t0 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::seconds(5);
        let page = Page::from_records(
            vec![
                IndexEntry::new("example.com/foo", "v1.0.0", t0),
                IndexEntry::new("example.com/bar", "v1.0.0", t1),
            ],
            &EntryFilter::new("example.com/foo"),
        );
        assert_eq!(page.records, 2);
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.last_seen, Some(t1));
        assert_eq!(page.last_kept(), Some(t0));
        assert!(!page.is_empty());
        assert!(page.has_records());
    }

    #[test]
    fn no_records_is_empty() {
        let page = Page::from_records(Vec::new(), &EntryFilter::default());
        assert!(page.is_empty());
        assert!(!page.has_records());
        assert_eq!(page.last_seen, None);
    }

    #[test]
    fn fully_filtered_page_is_empty_but_has_records() {
        let t0 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let page = Page::from_records(
            vec![IndexEntry::new("example.com/bar", "v1.0.0", t0)],
            &EntryFilter::new("example.com/foo"),
        );
        assert!(page.is_empty());
        assert!(page.has_records());
        assert_eq!(page.last_seen, Some(t0));
        assert_eq!(page.last_kept(), None);
    }
}
