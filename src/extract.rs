//! Notice extraction from raw notice board payloads.
//!
//! Feeds follow the Czech open-data notice board schema only loosely, so the
//! payload is walked as a plain [`serde_json::Value`] tree and every lookup
//! falls back to a default instead of failing:
//!
//! ```json
//! {
//!   "informace": [
//!     {
//!       "název": { "cs": "Oprava silnice" },
//!       "vyvěšení": { "datum": "2024-03-15" },
//!       "dokument": [
//!         { "název": { "cs": "Vyhláška" }, "url": "https://example.cz/vyhlaska.pdf" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::models::NoticeRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const NOTICES_KEY: &str = "informace";
const LANG: &str = "cs";

/// What to do with a notice that carries no document link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentPolicy {
    /// Keep the notice with empty document fields.
    #[default]
    Keep,
    /// Skip the notice entirely.
    Drop,
}

/// Extract every notice from a payload, in source order.
///
/// A payload without an `informace` array yields an empty vector. Entries
/// that are not JSON objects are discarded.
pub fn extract_notices(payload: &Value, policy: DocumentPolicy) -> Vec<NoticeRecord> {
    let Some(items) = payload.get(NOTICES_KEY).and_then(Value::as_array) else {
        debug!("Payload has no notice list");
        return Vec::new();
    };

    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for item in items {
        match extract_notice(item) {
            Some(record) if policy == DocumentPolicy::Drop && record.document_link.is_empty() => {
                skipped += 1;
            }
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(kept = records.len(), skipped, "Skipped notices");
    }
    records
}

fn extract_notice(item: &Value) -> Option<NoticeRecord> {
    if !item.is_object() {
        return None;
    }

    let document = first_document(item);
    let document_description = document
        .map(|d| localized(d.get("název")))
        .unwrap_or_default();
    let document_link = document
        .and_then(link_of)
        .or_else(|| link_of(item))
        .unwrap_or_default();

    Some(NoticeRecord {
        title: localized(item.get("název")),
        posting_date: posting_date(item),
        document_description,
        document_link,
    })
}

/// The first attached document. `dokument` is usually an array but some
/// feeds publish a single object.
fn first_document(item: &Value) -> Option<&Value> {
    match item.get("dokument")? {
        Value::Array(docs) => docs.first().filter(|d| d.is_object()),
        doc @ Value::Object(_) => Some(doc),
        _ => None,
    }
}

fn localized(node: Option<&Value>) -> String {
    node.and_then(|n| n.get(LANG))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn link_of(node: &Value) -> Option<String> {
    ["url", "uri"]
        .iter()
        .filter_map(|key| node.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|link| !link.is_empty())
        .map(str::to_string)
}

/// The raw posting date, tried in order: `vyvěšení.datum`,
/// `vyvěšení.datum_a_čas`, then top-level `datum_vyvěšení`.
fn posting_date(item: &Value) -> Option<String> {
    let posted = item.get("vyvěšení");
    [
        posted.and_then(|p| p.get("datum")),
        posted.and_then(|p| p.get("datum_a_čas")),
        item.get("datum_vyvěšení"),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .map(str::trim)
    .find(|d| !d.is_empty())
    .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_notice_list() {
        assert!(extract_notices(&json!({}), DocumentPolicy::Keep).is_empty());
        assert!(extract_notices(&json!({"informace": "nope"}), DocumentPolicy::Keep).is_empty());
        assert!(extract_notices(&json!([1, 2, 3]), DocumentPolicy::Keep).is_empty());
        assert!(extract_notices(&Value::Null, DocumentPolicy::Keep).is_empty());
    }

    #[test]
    fn test_full_notice() {
        let payload = json!({
            "informace": [{
                "název": {"cs": "Oprava silnice", "en": "Road repair"},
                "vyvěšení": {"datum": "2024-03-15"},
                "dokument": [
                    {"název": {"cs": "Vyhláška"}, "url": "https://example.cz/vyhlaska.pdf"},
                    {"název": {"cs": "Příloha"}, "url": "https://example.cz/priloha.pdf"}
                ]
            }]
        });
        let records = extract_notices(&payload, DocumentPolicy::Keep);
        assert_eq!(
            records,
            vec![NoticeRecord {
                title: "Oprava silnice".to_string(),
                posting_date: Some("2024-03-15".to_string()),
                document_description: "Vyhláška".to_string(),
                document_link: "https://example.cz/vyhlaska.pdf".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_intermediate_keys_default_to_empty() {
        let payload = json!({
            "informace": [
                {"název": {"en": "Only english"}},
                {"název": null},
                {"název": "flat string"},
                {"název": {"cs": 42}},
                {}
            ]
        });
        let records = extract_notices(&payload, DocumentPolicy::Keep);
        assert_eq!(records.len(), 5);
        for record in &records {
            assert_eq!(record.title, "");
            assert_eq!(record.document_link, "");
            assert_eq!(record.document_description, "");
            assert_eq!(record.posting_date, None);
        }
    }

    #[test]
    fn test_non_object_entries_discarded() {
        let payload = json!({
            "informace": ["garbage", 7, null, {"název": {"cs": "Platná"}}]
        });
        let records = extract_notices(&payload, DocumentPolicy::Keep);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Platná");
    }

    #[test]
    fn test_link_fallbacks() {
        let payload = json!({
            "informace": [
                {"dokument": [{"uri": "https://example.cz/a.pdf"}]},
                {"dokument": [], "url": "https://example.cz/b"},
                {"dokument": {"název": {"cs": "Jediný"}, "url": "https://example.cz/c.pdf"}},
                {"dokument": [{"url": "  "}], "uri": "https://example.cz/d"}
            ]
        });
        let links: Vec<_> = extract_notices(&payload, DocumentPolicy::Keep)
            .into_iter()
            .map(|r| r.document_link)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://example.cz/a.pdf",
                "https://example.cz/b",
                "https://example.cz/c.pdf",
                "https://example.cz/d",
            ]
        );
    }

    #[test]
    fn test_document_policy() {
        let payload = json!({
            "informace": [
                {"název": {"cs": "S dokumentem"}, "dokument": [{"url": "https://example.cz/a.pdf"}]},
                {"název": {"cs": "Bez dokumentu"}}
            ]
        });
        assert_eq!(extract_notices(&payload, DocumentPolicy::Keep).len(), 2);
        let dropped = extract_notices(&payload, DocumentPolicy::Drop);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].title, "S dokumentem");
    }

    #[test]
    fn test_posting_date_priority() {
        let payload = json!({
            "informace": [
                {"vyvěšení": {"datum": "2024-01-01", "datum_a_čas": "2024-02-02T10:00:00"}, "datum_vyvěšení": "2024-03-03"},
                {"vyvěšení": {"datum": "", "datum_a_čas": "2024-02-02T10:00:00Z"}},
                {"vyvěšení": {}, "datum_vyvěšení": "2024-03-03"},
                {"vyvěšení": {"datum": 20240101}}
            ]
        });
        let dates: Vec<_> = extract_notices(&payload, DocumentPolicy::Keep)
            .into_iter()
            .map(|r| r.posting_date)
            .collect();
        assert_eq!(
            dates,
            vec![
                Some("2024-01-01".to_string()),
                Some("2024-02-02T10:00:00Z".to_string()),
                Some("2024-03-03".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_source_order_and_duplicates_preserved() {
        let payload = json!({
            "informace": [
                {"název": {"cs": "B"}},
                {"název": {"cs": "A"}},
                {"název": {"cs": "B"}}
            ]
        });
        let titles: Vec<_> = extract_notices(&payload, DocumentPolicy::Keep)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["B", "A", "B"]);
    }

    #[test]
    fn test_document_policy_yaml_names() {
        let policy: DocumentPolicy = serde_yaml::from_str("drop").unwrap();
        assert_eq!(policy, DocumentPolicy::Drop);
    }
}
