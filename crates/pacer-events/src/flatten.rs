//! Recursive event flattening for analytics.
//!
//! Mirrors the warehouse-side lateral flatten the analysis queries run on:
//! every nested entry becomes a `(key_path, key_name, value, value_type)` row,
//! with list indices normalized to `[]` so repeated elements aggregate under
//! one path.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

/// Type tag of a flattened value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    Varchar,
    Boolean,
    Integer,
    Decimal,
    Object,
    Array,
    Null,
}

impl ValueType {
    /// Return label value for reports.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ValueType::Varchar => "varchar",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Decimal => "decimal",
            ValueType::Object => "object",
            ValueType::Array => "array",
            ValueType::Null => "null",
        }
    }

    /// Scalar types carry analyzable values; containers and nulls do not.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ValueType::Varchar | ValueType::Boolean | ValueType::Integer | ValueType::Decimal
        )
    }

    fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueType::Varchar,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueType::Integer,
            Value::Number(_) => ValueType::Decimal,
            Value::Object(_) => ValueType::Object,
            Value::Array(_) => ValueType::Array,
            Value::Null => ValueType::Null,
        }
    }
}

/// One row of a recursively flattened event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedField {
    /// Lowercased dot path with list indices normalized to `[]`.
    pub key_path: String,
    /// Name of the entry itself; empty for anonymous list elements.
    pub key_name: String,
    pub value: Value,
    pub value_type: ValueType,
}

/// Flatten an event into rows, containers included.
///
/// Consumers interested only in analyzable values filter on
/// [`ValueType::is_scalar`].
pub fn flatten(event: &Value) -> Vec<FlattenedField> {
    let mut rows = Vec::new();
    descend(event, "", &mut rows);
    rows
}

fn descend(value: &Value, path: &str, rows: &mut Vec<FlattenedField>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let child_path = if path.is_empty() {
                    key.to_ascii_lowercase()
                } else {
                    format!("{path}.{}", key.to_ascii_lowercase())
                };
                rows.push(FlattenedField {
                    key_path: child_path.clone(),
                    key_name: key.clone(),
                    value: val.clone(),
                    value_type: ValueType::of(val),
                });
                descend(val, &child_path, rows);
            }
        }
        Value::Array(items) => {
            let child_path = format!("{path}[]");
            for item in items {
                rows.push(FlattenedField {
                    key_path: child_path.clone(),
                    key_name: String::new(),
                    value: item.clone(),
                    value_type: ValueType::of(item),
                });
                descend(item, &child_path, rows);
            }
        }
        _ => {}
    }
}

/// Aggregated shape statistics for one flattened field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStats {
    pub key_path: String,
    pub key_name: String,
    pub value_type: ValueType,
    /// Occurrences across all events.
    pub frequency: usize,
    /// Distinct values seen across all events.
    pub unique_values: usize,
}

/// Aggregate scalar fields across many events, most frequent first.
pub fn field_frequencies<'a, I>(events: I) -> Vec<FieldStats>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut groups: BTreeMap<(String, String, ValueType), BTreeSet<String>> = BTreeMap::new();
    let mut counts: BTreeMap<(String, String, ValueType), usize> = BTreeMap::new();

    for event in events {
        for row in flatten(event) {
            if !row.value_type.is_scalar() {
                continue;
            }
            let group = (row.key_path, row.key_name, row.value_type);
            *counts.entry(group.clone()).or_default() += 1;
            groups.entry(group).or_default().insert(row.value.to_string());
        }
    }

    let mut stats: Vec<FieldStats> = counts
        .into_iter()
        .map(|((key_path, key_name, value_type), frequency)| FieldStats {
            unique_values: groups[&(key_path.clone(), key_name.clone(), value_type)].len(),
            key_path,
            key_name,
            value_type,
            frequency,
        })
        .collect();
    stats.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    stats
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ValueType, field_frequencies, flatten};

    #[test]
    fn flattens_nested_objects_with_dot_paths() {
        let event = json!({"properties": {"pageType": "plp"}});
        let rows = flatten(&event);

        let leaf = rows
            .iter()
            .find(|r| r.key_name == "pageType")
            .expect("leaf row must exist");
        assert_eq!(leaf.key_path, "properties.pagetype");
        assert_eq!(leaf.value, json!("plp"));
        assert_eq!(leaf.value_type, ValueType::Varchar);
    }

    #[test]
    fn list_indices_normalize_to_brackets() {
        let event = json!({"items": [{"sku": 1}, {"sku": 2}]});
        let rows = flatten(&event);

        let skus: Vec<_> = rows.iter().filter(|r| r.key_name == "sku").collect();
        assert_eq!(skus.len(), 2);
        for row in skus {
            assert_eq!(row.key_path, "items[].sku");
        }
    }

    #[test]
    fn value_types_are_classified() {
        let event = json!({
            "s": "x", "b": true, "i": 3, "d": 1.5, "n": null,
            "o": {}, "a": []
        });
        let rows = flatten(&event);
        let type_of = |name: &str| {
            rows.iter()
                .find(|r| r.key_name == name)
                .map(|r| r.value_type)
                .unwrap()
        };

        assert_eq!(type_of("s"), ValueType::Varchar);
        assert_eq!(type_of("b"), ValueType::Boolean);
        assert_eq!(type_of("i"), ValueType::Integer);
        assert_eq!(type_of("d"), ValueType::Decimal);
        assert_eq!(type_of("n"), ValueType::Null);
        assert_eq!(type_of("o"), ValueType::Object);
        assert_eq!(type_of("a"), ValueType::Array);
    }

    #[test]
    fn frequencies_aggregate_across_events_and_sort_desc() {
        let a = json!({"page_type": "home", "items": [{"sku": 1}]});
        let b = json!({"page_type": "cart", "items": [{"sku": 1}, {"sku": 2}]});

        let stats = field_frequencies([&a, &b]);

        let sku = stats
            .iter()
            .find(|s| s.key_path == "items[].sku")
            .expect("sku stats must exist");
        assert_eq!(sku.frequency, 3);
        assert_eq!(sku.unique_values, 2);

        let page = stats.iter().find(|s| s.key_path == "page_type").unwrap();
        assert_eq!(page.frequency, 2);
        assert_eq!(page.unique_values, 2);

        assert!(
            stats.windows(2).all(|w| w[0].frequency >= w[1].frequency),
            "stats must be sorted most frequent first"
        );
    }

    #[test]
    fn containers_are_excluded_from_frequencies() {
        let event = json!({"wrapper": {"inner": "x"}});
        let stats = field_frequencies([&event]);
        assert!(stats.iter().all(|s| s.value_type.is_scalar()));
    }
}
