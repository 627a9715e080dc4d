//! Defensive decoding for values that may arrive JSON-encoded as strings.
//!
//! Historical rows in the briefings table were written by revisions that
//! sometimes serialized a nested object to a JSON string before insert, at
//! any one nesting level. Read paths must accept both forms indefinitely.
//! [`MaybeEncoded`] models the shapes such a value can take on the wire;
//! [`MaybeEncoded::resolve`] collapses them to the target type. A decode
//! anomaly substitutes the default and logs; it never fails a read.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A value that should be a `T` but may arrive as a JSON-encoded string.
///
/// The variant is picked by JSON shape alone: objects try `T`, strings are
/// `Encoded`, null is `Absent`, and everything else lands in `Other`. In
/// particular an array never reaches `T`, where serde would otherwise fill
/// struct fields positionally from its elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MaybeEncoded<T> {
    /// Arrived structured.
    Decoded(T),
    /// Arrived as a JSON-encoded string, not parsed yet.
    Encoded(String),
    /// Arrived as JSON null.
    Absent,
    /// Arrived as some other JSON value (number, bool, array).
    Other(serde_json::Value),
}

impl<'de, T> Deserialize<'de> for MaybeEncoded<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Null => MaybeEncoded::Absent,
            serde_json::Value::String(text) => MaybeEncoded::Encoded(text),
            serde_json::Value::Object(_) => match serde_json::from_value(value.clone()) {
                Ok(inner) => MaybeEncoded::Decoded(inner),
                Err(_) => MaybeEncoded::Other(value),
            },
            other => MaybeEncoded::Other(other),
        })
    }
}

impl<T: Default> Default for MaybeEncoded<T> {
    fn default() -> Self {
        MaybeEncoded::Decoded(T::default())
    }
}

impl<T> MaybeEncoded<T>
where
    T: DeserializeOwned + Default,
{
    /// Collapses to the target type.
    ///
    /// `Encoded` text that fails to parse, and `Other` values, are replaced
    /// with `T::default()` and logged under `field`.
    pub fn resolve(self, field: &str) -> T {
        match self {
            MaybeEncoded::Decoded(value) => value,
            MaybeEncoded::Encoded(text) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!(
                        "{} held a string that is not valid JSON ({}); substituting default",
                        field,
                        e
                    );
                    T::default()
                }
            },
            MaybeEncoded::Absent => T::default(),
            MaybeEncoded::Other(_) => {
                log::warn!(
                    "{} held a JSON value of the wrong shape; substituting default",
                    field
                );
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Section {
        #[serde(default)]
        label: String,
    }

    #[derive(Debug, Default, Deserialize)]
    struct Parent {
        #[serde(default)]
        section: MaybeEncoded<Section>,
    }

    #[test]
    fn test_structured_value_passes_through() {
        let parent: Parent = serde_json::from_value(json!({
            "section": { "label": "deadlines" }
        }))
        .unwrap();

        assert_eq!(
            parent.section.resolve("section"),
            Section {
                label: "deadlines".to_string()
            }
        );
    }

    #[test]
    fn test_string_encoded_value_is_parsed() {
        let parent: Parent = serde_json::from_value(json!({
            "section": "{\"label\":\"deadlines\"}"
        }))
        .unwrap();

        assert!(matches!(parent.section, MaybeEncoded::Encoded(_)));
        assert_eq!(
            parent.section.resolve("section"),
            Section {
                label: "deadlines".to_string()
            }
        );
    }

    #[test]
    fn test_unparseable_string_substitutes_default() {
        let parent: Parent = serde_json::from_value(json!({
            "section": "not json at all"
        }))
        .unwrap();

        assert_eq!(parent.section.resolve("section"), Section::default());
    }

    #[test]
    fn test_null_substitutes_default() {
        let parent: Parent = serde_json::from_value(json!({ "section": null })).unwrap();

        assert_eq!(parent.section, MaybeEncoded::Absent);
        assert_eq!(parent.section.resolve("section"), Section::default());
    }

    #[test]
    fn test_missing_key_substitutes_default() {
        let parent: Parent = serde_json::from_value(json!({})).unwrap();

        assert_eq!(parent.section.resolve("section"), Section::default());
    }

    #[test]
    fn test_wrong_shape_substitutes_default() {
        let parent: Parent = serde_json::from_value(json!({ "section": 42 })).unwrap();

        assert!(matches!(parent.section, MaybeEncoded::Other(_)));
        assert_eq!(parent.section.resolve("section"), Section::default());
    }

    #[test]
    fn test_array_does_not_fill_fields_positionally() {
        let parent: Parent = serde_json::from_value(json!({ "section": ["deadlines"] })).unwrap();

        assert!(matches!(parent.section, MaybeEncoded::Other(_)));
        assert_eq!(parent.section.resolve("section"), Section::default());
    }

    #[test]
    fn test_empty_array_is_not_mistaken_for_a_value() {
        let parent: Parent = serde_json::from_value(json!({ "section": [] })).unwrap();

        assert!(matches!(parent.section, MaybeEncoded::Other(_)));
        assert_eq!(parent.section.resolve("section"), Section::default());
    }

    #[test]
    fn test_decoded_serializes_as_structured_value() {
        let value = serde_json::to_value(MaybeEncoded::Decoded(Section {
            label: "budget".to_string(),
        }))
        .unwrap();

        assert_eq!(value, json!({ "label": "budget" }));
    }
}
