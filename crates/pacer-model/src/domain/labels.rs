use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

/// Structured key–value metadata based on [`BTreeMap`].
///
/// Attached to request contexts for routing / logging purposes; the controller
/// never interprets label values itself.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct Labels(pub BTreeMap<String, String>);

impl Labels {
    /// Create an empty set of labels.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if no labels are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or overwrite a label.
    ///
    /// Returns `self` for chaining.
    pub fn insert<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), val.into());
        self
    }

    /// Get the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    /// Iterate through all labels as `(&str, &str)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::Labels;

    #[test]
    fn insert_and_get() {
        let mut labels = Labels::new();
        labels.insert("page-tag", "autoship").insert("env", "qat");

        assert_eq!(labels.get("page-tag"), Some("autoship"));
        assert_eq!(labels.get("env"), Some("qat"));
        assert_eq!(labels.get("missing"), None);
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut labels = Labels::new();
        labels.insert("page-tag", "home");
        labels.insert("page-tag", "cart");

        assert_eq!(labels.get("page-tag"), Some("cart"));
    }

    #[test]
    fn serde_transparent_map() {
        let mut labels = Labels::new();
        labels.insert("page-tag", "plp");

        let json = serde_json::to_string(&labels).unwrap();
        assert_eq!(json, r#"{"page-tag":"plp"}"#);

        let back: Labels = serde_json::from_str(&json).unwrap();
        assert_eq!(back, labels);
    }
}
