//! Tolerant field decoders for provider JSON.
//!
//! Museum APIs disagree on field shapes (Europeana wraps most text in arrays
//! or language maps, MET mixes numbers and strings). Raw record fields use
//! these with `#[serde(default, deserialize_with = "...")]` so an odd shape
//! maps to "absent" instead of failing the whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes any scalar-ish JSON value to text.
///
/// Strings pass through, numbers and booleans are rendered, arrays yield
/// their first textual element, language maps yield their `def` entry (or
/// the first entry when `def` is missing), and `null` is absent.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_text))
}

/// Decodes a list of records, skipping `null` and undecodable entries.
///
/// A missing or non-array value decodes to an empty list.
pub(crate) fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(|item| !item.is_null())
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Decodes a nested object, mapping any other shape or a bad object to `None`.
pub(crate) fn record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(object @ Value::Object(_)) => serde_json::from_value(object).ok(),
        _ => None,
    })
}

/// Decodes an identifier list of numbers or numeric strings.
pub(crate) fn ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect())
}

pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items.iter().find_map(value_text),
        Value::Object(map) => map
            .get("def")
            .and_then(value_text)
            .or_else(|| map.values().find_map(value_text)),
        Value::Null => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "text")]
        field: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Item {
        id: u32,
    }

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "record")]
        nested: Option<Item>,
    }

    #[derive(Debug, Deserialize)]
    struct Page {
        #[serde(default, deserialize_with = "records")]
        data: Vec<Item>,
        #[serde(default, deserialize_with = "ids")]
        object_ids: Vec<String>,
    }

    fn text_of(value: serde_json::Value) -> Option<String> {
        serde_json::from_value::<Holder>(json!({ "field": value })).unwrap().field
    }

    #[test]
    fn test_text_accepts_every_shape() {
        assert_eq!(text_of(json!("Monet")), Some("Monet".to_string()));
        assert_eq!(text_of(json!(1889)), Some("1889".to_string()));
        assert_eq!(text_of(json!(true)), Some("true".to_string()));
        assert_eq!(text_of(json!(["first", "second"])), Some("first".to_string()));
        assert_eq!(text_of(json!([null, "later"])), Some("later".to_string()));
        assert_eq!(text_of(json!({"def": ["Rembrandt"], "en": ["R."]})), Some("Rembrandt".to_string()));
        assert_eq!(text_of(json!({"nl": "Vermeer"})), Some("Vermeer".to_string()));
        assert_eq!(text_of(json!(null)), None);
        assert_eq!(text_of(json!([])), None);
    }

    #[test]
    fn test_text_missing_field_is_none() {
        let holder: Holder = serde_json::from_value(json!({})).unwrap();
        assert_eq!(holder.field, None);
    }

    #[test]
    fn test_records_skips_null_and_bad_entries() {
        let page: Page = serde_json::from_value(json!({
            "data": [{"id": 1}, null, "garbage", {"id": 2}]
        }))
        .unwrap();
        let ids: Vec<u32> = page.data.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_records_non_array_is_empty() {
        let page: Page = serde_json::from_value(json!({"data": null})).unwrap();
        assert!(page.data.is_empty());
        let page: Page = serde_json::from_value(json!({"data": {"id": 1}})).unwrap();
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_ids_accepts_numbers_and_strings() {
        let page: Page = serde_json::from_value(json!({
            "object_ids": [437133, "436535", "", null, 1.5]
        }))
        .unwrap();
        assert_eq!(page.object_ids, vec!["437133", "436535", "1.5"]);
    }

    #[test]
    fn test_record_maps_odd_shapes_to_none() {
        let decode = |value: Value| serde_json::from_value::<Wrapper>(value).unwrap().nested;
        assert_eq!(decode(json!({"nested": {"id": 4}})).map(|i| i.id), Some(4));
        assert!(decode(json!({"nested": []})).is_none());
        assert!(decode(json!({"nested": "n/a"})).is_none());
        assert!(decode(json!({"nested": {"id": "x"}})).is_none());
        assert!(decode(json!({})).is_none());
    }
}
