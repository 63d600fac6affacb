//! Field extraction from arbitrarily shaped event JSON.
//!
//! Producers disagree on field naming (`page_type`, `pageType`, `page-type`,
//! …) and on nesting depth. Extraction walks the whole value, normalizes
//! known field-name variants to canonical names, and keeps the first value
//! seen for each canonical name.

use std::collections::BTreeMap;

use serde_json::Value;

/// Map a field-name variant to its canonical name.
///
/// Returns `None` for fields the intake layer does not care about.
pub(crate) fn normalize_field_name(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    let canonical = match lower.as_str() {
        "page_type" | "pagetype" | "page-type" | "page" | "type" => "page_type",
        "event" => "event",
        "eventtype" | "event_type" | "event-type" => "eventType",
        "eventcategory" | "event_category" | "event-category" | "category" => "eventCategory",
        "eventaction" | "event_action" | "event-action" | "action" => "eventAction",
        "eventlabel" | "event_label" | "event-label" | "label" | "name" => "eventLabel",
        "timestamp" | "time" => "timestamp",
        "userid" | "user_id" => "userId",
        "sessionid" | "session_id" => "sessionId",
        "url" => "url",
        "path" => "path",
        "value" => "value",
        _ => return None,
    };
    Some(canonical)
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_)
    )
}

/// Render a scalar as the string form used for page types and event names.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Recursively extract all recognized fields from an event of any structure.
///
/// The first occurrence of each canonical name wins. A recognized key whose
/// value is a single-entry object contributes that entry's scalar value.
pub fn extract_fields(event: &Value) -> BTreeMap<String, Value> {
    let mut extracted = BTreeMap::new();
    walk(event, &mut extracted);
    extracted
}

fn walk(value: &Value, extracted: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                if let Some(canonical) = normalize_field_name(key)
                    && !extracted.contains_key(canonical)
                {
                    if is_scalar(val) {
                        extracted.insert(canonical.to_string(), val.clone());
                    } else if let Value::Object(inner) = val
                        && inner.len() == 1
                    {
                        let single = inner.values().next().expect("len checked above");
                        if is_scalar(single) {
                            extracted.insert(canonical.to_string(), single.clone());
                        }
                    }
                }
                walk(val, extracted);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, extracted);
            }
        }
        _ => {}
    }
}

/// Recursively search for a page type anywhere in the event.
///
/// Direct keys at each object level win over nested occurrences.
pub fn find_page_type(event: &Value) -> Option<String> {
    match event {
        Value::Object(map) => {
            for (key, val) in map {
                if matches!(
                    key.to_ascii_lowercase().as_str(),
                    "page_type" | "pagetype" | "page-type"
                ) && is_scalar(val)
                {
                    return Some(scalar_to_string(val));
                }
            }
            map.values().find_map(find_page_type)
        }
        Value::Array(items) => items.iter().find_map(find_page_type),
        _ => None,
    }
}
