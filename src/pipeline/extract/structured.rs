use serde_json::Value;

use crate::model::{CandidateRecord, CategoryValue};

/// Container keys probed in order; the first array found wins.
const CONTAINER_KEYS: &[&str] = &[
    "extracted_information_details",
    "tools",
    "ai_tools",
    "features",
    "extracted_information",
];

const NAME_KEYS: &[&str] = &["name", "tool_name", "title"];
const LINK_KEYS: &[&str] = &["link", "website", "website_url", "official_website_url", "url"];
const CATEGORY_KEYS: &[&str] = &["category", "categories", "category_tags", "category_classifications"];

/// Walk a decoded value and yield candidate records. Handles the container
/// shapes the source repositories actually produce: a bare array of record
/// objects, a `data`-wrapped object, category groups with nested tool
/// lists, and records keyed by any of several field-name synonyms.
pub fn extract(decoded: &Value, source: &str) -> Vec<CandidateRecord> {
    let root = decoded.get("data").unwrap_or(decoded);

    if let Some(items) = root.as_array() {
        return extract_list(items, None, source);
    }

    for &key in CONTAINER_KEYS {
        if let Some(items) = root.get(key).and_then(|v| v.as_array()) {
            return extract_list(items, None, source);
        }
    }

    Vec::new()
}

fn extract_list(
    items: &[Value],
    inherited: Option<&CategoryValue>,
    source: &str,
) -> Vec<CandidateRecord> {
    let mut records = Vec::new();

    for item in items {
        let Some(obj) = item.as_object() else { continue };

        // Category group: a label plus a nested tools list. Every record
        // inside inherits the group label, overriding its own category.
        if let Some(nested) = obj.get("tools").and_then(|v| v.as_array()) {
            let label = probe_category(item);
            records.extend(extract_list(nested, label.as_ref(), source));
            continue;
        }

        let mut record = record_from_object(item, source);
        if let Some(category) = inherited {
            record.category = Some(category.clone());
        }
        records.push(record);
    }

    records
}

/// Map whichever field-name synonyms are present onto the canonical record.
/// Missing name or link still produces a record; validation happens later.
fn record_from_object(value: &Value, source: &str) -> CandidateRecord {
    let (name, name_key) = probe_string_keyed(value, NAME_KEYS);
    let (link, _) = probe_string_keyed(value, LINK_KEYS);

    // `title` doubles as a description, but only when it wasn't consumed
    // for the name.
    let mut description = probe_string(value, "description");
    if description.is_empty() && name_key != Some("title") {
        description = probe_string(value, "title");
    }

    CandidateRecord {
        name,
        description,
        link: reject_placeholder_link(link),
        category: probe_category(value),
        popularity_score: value.get("popularity_score").and_then(|v| v.as_f64()),
        source: source.to_string(),
    }
}

fn probe_string(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}

fn probe_string_keyed<'a>(value: &Value, keys: &[&'a str]) -> (String, Option<&'a str>) {
    for &key in keys {
        let found = probe_string(value, key);
        if !found.is_empty() {
            return (found, Some(key));
        }
    }
    (String::new(), None)
}

fn probe_category(value: &Value) -> Option<CategoryValue> {
    for key in CATEGORY_KEYS {
        match value.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                return Some(CategoryValue::One(s.trim().to_string()));
            }
            Some(Value::Array(items)) => {
                let labels: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                if !labels.is_empty() {
                    return Some(CategoryValue::Many(labels));
                }
            }
            _ => {}
        }
    }
    None
}

/// The literal placeholder "null" (and empty strings) count as no link.
fn reject_placeholder_link(link: String) -> String {
    if link == "null" {
        String::new()
    } else {
        link
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn value(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn flat_tools_list() {
        let v = value(
            r#"{"tools": [
                {"name": "A", "link": "http://a.com", "description": "first"},
                {"name": "B", "link": "http://b.com"}
            ]}"#,
        );
        let records = extract(&v, "repo");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[0].description, "first");
        assert_eq!(records[1].source, "repo");
    }

    #[test]
    fn data_wrapper_descended() {
        let v = value(r#"{"data": {"ai_tools": [{"name": "A", "link": "http://a.com"}]}}"#);
        assert_eq!(extract(&v, "s").len(), 1);
    }

    #[test]
    fn bare_array_is_a_container() {
        let v = value(r#"[{"name": "A", "link": "http://a.com"}]"#);
        assert_eq!(extract(&v, "s").len(), 1);
    }

    #[test]
    fn category_groups_inherit_label() {
        let v = value(
            r#"{"data": {"extracted_information_details": [
                {"category": "Writing", "tools": [
                    {"name": "A", "link": "http://a.com", "category": "Own"},
                    {"name": "B", "link": "http://b.com"}
                ]}
            ]}}"#,
        );
        let records = extract(&v, "s");
        assert_eq!(records.len(), 2);
        for r in &records {
            assert_eq!(r.category, Some(CategoryValue::One("Writing".into())));
        }
    }

    #[test]
    fn field_synonyms_probed() {
        let v = value(
            r#"{"extracted_information": [
                {"tool_name": "T", "website_url": "http://t.com", "category_tags": ["Design", "Art"]}
            ]}"#,
        );
        let records = extract(&v, "s");
        assert_eq!(records[0].name, "T");
        assert_eq!(records[0].link, "http://t.com");
        assert_eq!(
            records[0].category,
            Some(CategoryValue::Many(vec!["Design".into(), "Art".into()]))
        );
    }

    #[test]
    fn title_stands_in_for_description_not_name() {
        let v = value(r#"{"tools": [{"name": "A", "title": "An assistant", "link": "http://a.com"}]}"#);
        let records = extract(&v, "s");
        assert_eq!(records[0].description, "An assistant");

        // When title supplied the name it must not also become the description.
        let v = value(r#"{"tools": [{"title": "OnlyTitle", "link": "http://t.com"}]}"#);
        let records = extract(&v, "s");
        assert_eq!(records[0].name, "OnlyTitle");
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn placeholder_link_treated_absent() {
        let v = value(r#"{"tools": [{"name": "A", "link": "null"}]}"#);
        assert_eq!(extract(&v, "s")[0].link, "");
    }

    #[test]
    fn missing_fields_still_emitted() {
        let v = value(r#"{"tools": [{"description": "orphan"}]}"#);
        let records = extract(&v, "s");
        assert_eq!(records.len(), 1);
        assert!(records[0].name.is_empty());
    }

    #[test]
    fn explicit_score_carried() {
        let v = value(r#"{"tools": [{"name": "A", "link": "http://a.com", "popularity_score": 7.5}]}"#);
        assert_eq!(extract(&v, "s")[0].popularity_score, Some(7.5));
    }

    #[test]
    fn unknown_shape_yields_nothing() {
        let v = value(r#"{"summary": "no records here"}"#);
        assert!(extract(&v, "s").is_empty());
    }
}
