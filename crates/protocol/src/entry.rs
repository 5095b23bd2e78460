use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One line of the index feed: a module version and the time the index saw it.
///
/// Equality and hashing cover all three fields, so two records for the same
/// version observed at different times stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexEntry {
    pub path: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl IndexEntry {
    pub fn new(
        path: impl Into<String>,
        version: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            timestamp,
        }
    }
}

/// Render a timestamp for the `since` query parameter.
///
/// Sub-second digits are kept when present so a page boundary inside one
/// second is not rounded back to the start of that second.
#[must_use]
pub fn format_since(since: DateTime<Utc>) -> String {
    since.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_index_line() {
        let line = r#"{"Path":"golang.org/x/text","Version":"v0.3.7","Timestamp":"2021-08-10T14:34:56.123456Z"}"#;
        let entry: IndexEntry = serde_json::from_str(line).unwrap();
        assert_eq!(entry.path, "golang.org/x/text");
        assert_eq!(entry.version, "v0.3.7");
        assert_eq!(
            entry.timestamp,
            Utc.with_ymd_and_hms(2021, 8, 10, 14, 34, 56).unwrap()
                + chrono::Duration::microseconds(123_456)
        );
    }

    #[test]
    fn accepts_offset_timestamps() {
        let line = r#"{"Path":"a","Version":"v1.0.0","Timestamp":"2021-08-10T16:00:00+02:00"}"#;
        let entry: IndexEntry = serde_json::from_str(line).unwrap();
        assert_eq!(
            entry.timestamp,
            Utc.with_ymd_and_hms(2021, 8, 10, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn equality_includes_timestamp() {
        let t0 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::seconds(1);
        assert_eq!(
            IndexEntry::new("a", "v1.0.0", t0),
            IndexEntry::new("a", "v1.0.0", t0)
        );
        assert_ne!(
            IndexEntry::new("a", "v1.0.0", t0),
            IndexEntry::new("a", "v1.0.0", t1)
        );
    }

    #[test]
    fn since_keeps_subsecond_precision() {
        let whole = Utc.with_ymd_and_hms(2021, 8, 10, 14, 34, 56).unwrap();
        assert_eq!(format_since(whole), "2021-08-10T14:34:56Z");

        let fractional = whole + chrono::Duration::milliseconds(250);
        assert_eq!(format_since(fractional), "2021-08-10T14:34:56.250Z");
    }
}
