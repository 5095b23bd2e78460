use crate::IndexEntry;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("malformed index record on line {line}: {source}")]
pub struct DecodeError {
    /// 1-based line number within the response body.
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

/// Decode a newline-delimited response body into entries, in body order.
///
/// Blank lines are skipped. The first malformed record fails the whole body.
pub fn decode_ndjson(body: &str) -> Result<Vec<IndexEntry>, DecodeError> {
    let mut entries = Vec::new();
    for (idx, raw) in body.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let entry = serde_json::from_str::<IndexEntry>(raw).map_err(|source| DecodeError {
            line: idx + 1,
            source,
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_lines_in_order() {
        let body = concat!(
            r#"{"Path":"a","Version":"v1.0.0","Timestamp":"2021-01-01T00:00:00Z"}"#,
            "\n",
            r#"{"Path":"b","Version":"v2.0.0","Timestamp":"2021-01-01T00:00:01Z"}"#,
            "\n",
        );
        let entries = decode_ndjson(body).unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b"]);
    }

    #[test]
    fn skips_blank_lines_and_crlf() {
        let body = "\r\n{\"Path\":\"a\",\"Version\":\"v1.0.0\",\"Timestamp\":\"2021-01-01T00:00:00Z\"}\r\n\r\n";
        assert_eq!(decode_ndjson(body).unwrap().len(), 1);
    }

    #[test]
    fn interior_blank_lines_still_count_toward_line_numbers() {
        let body = concat!(
            r#"{"Path":"a","Version":"v1.0.0","Timestamp":"2021-01-01T00:00:00Z"}"#,
            "\n\n   \n",
            r#"{"Path":"b","Version":"#,
            "\n",
        );
        let err = decode_ndjson(body).unwrap_err();
        assert_eq!(err.line, 4);
    }

    #[test]
    fn empty_body_is_empty_page() {
        assert!(decode_ndjson("").unwrap().is_empty());
    }

    #[test]
    fn reports_line_of_bad_record() {
        let body = concat!(
            r#"{"Path":"a","Version":"v1.0.0","Timestamp":"2021-01-01T00:00:00Z"}"#,
            "\n",
            r#"{"Path":"b","Version":"v1.0.0","Timestamp":"yesterday"}"#,
            "\n",
        );
        let err = decode_ndjson(body).unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn missing_field_is_an_error() {
        let err = decode_ndjson(r#"{"Path":"a","Version":"v1.0.0"}"#).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.to_string().contains("Timestamp"));
    }
}
