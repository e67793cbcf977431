pub mod patterns;
pub mod structured;

use serde_json::Value;

use crate::model::CandidateRecord;
use crate::pipeline::decode;

/// Recover candidate records from a decoded value, falling back to pattern
/// matching over the raw text when structure yields nothing. Never fails;
/// an empty vec means the document had nothing recognizable.
pub fn extract(decoded: Option<&Value>, raw_text: &str, source: &str) -> Vec<CandidateRecord> {
    if let Some(value) = decoded {
        let records = structured::extract(value, source);
        if !records.is_empty() {
            return records;
        }
        // A wrapper whose inner payload never decoded: pattern-match the
        // inner text rather than the outer JSON envelope.
        let fallback = decode::raw_content_text(value).unwrap_or(raw_text);
        return patterns::extract(fallback, source);
    }
    patterns::extract(raw_text, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_wins_over_patterns() {
        let value: Value =
            serde_json::from_str(r#"{"tools": [{"name": "A", "link": "http://a.com"}]}"#).unwrap();
        let records = extract(Some(&value), "[B](http://b.com) - desc", "src");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "A");
    }

    #[test]
    fn falls_back_to_patterns_when_structure_empty() {
        let value: Value = serde_json::from_str(r#"{"unrelated": true}"#).unwrap();
        let records = extract(Some(&value), "[B](http://b.com) - desc", "src");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "B");
    }

    #[test]
    fn undecoded_wrapper_patterns_inner_text() {
        let value: Value =
            serde_json::from_str(r#"{"raw_content": "[C](http://c.com) - inner desc"}"#).unwrap();
        let records = extract(Some(&value), "outer text with no records", "src");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "C");
        assert_eq!(records[0].description, "inner desc");
    }

    #[test]
    fn no_structure_no_patterns_yields_empty() {
        assert!(extract(None, "nothing to see here", "src").is_empty());
    }
}
