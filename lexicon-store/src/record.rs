//! Translation records

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persisted translation.
///
/// A record without a value is a stub: the key was requested but nobody has
/// translated it yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Locale identifier, e.g. `"en"`
    pub locale: String,
    /// Canonical key, unique within the locale
    pub key: String,
    /// Translated value; `None` for stubs
    #[serde(default)]
    pub value: Option<Value>,
    /// Argument names the translation is known to require
    #[serde(default)]
    pub interpolations: Vec<String>,
    /// `value` is source for a [`ValueEvaluator`](crate::ValueEvaluator)
    #[serde(default)]
    pub is_procedural: bool,
}

impl TranslationRecord {
    /// Create a literal translation. A JSON `null` value is stored as absent.
    pub fn new(locale: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            locale: locale.into(),
            key: key.into(),
            value: (!value.is_null()).then_some(value),
            interpolations: Vec::new(),
            is_procedural: false,
        }
    }

    /// Create a stub awaiting translation.
    pub fn stub(locale: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            key: key.into(),
            value: None,
            interpolations: Vec::new(),
            is_procedural: false,
        }
    }

    /// Create a procedural translation whose value is produced at read time.
    pub fn procedural(
        locale: impl Into<String>,
        key: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            locale: locale.into(),
            key: key.into(),
            value: Some(Value::String(source.into())),
            interpolations: Vec::new(),
            is_procedural: true,
        }
    }

    /// Set the interpolation names, dropping duplicates but keeping order.
    pub fn with_interpolations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interpolations.clear();
        for name in names {
            let name = name.into();
            if !self.interpolations.contains(&name) {
                self.interpolations.push(name);
            }
        }
        self
    }

    /// Whether this record is still waiting for a translation.
    pub fn is_stub(&self) -> bool {
        self.value.is_none()
    }

    /// Whether the translation is known to use the named argument.
    pub fn interpolates(&self, name: &str) -> bool {
        self.interpolations.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_value_is_stub() {
        let record = TranslationRecord::new("es", "blank", Value::Null);
        assert!(record.is_stub());
        assert!(!TranslationRecord::new("es", "flag", json!(false)).is_stub());
    }

    #[test]
    fn test_interpolations_are_distinct() {
        let record =
            TranslationRecord::stub("en", "foo").with_interpolations(["count", "name", "count"]);
        assert_eq!(record.interpolations, vec!["count", "name"]);
        assert!(record.interpolates("name"));
        assert!(!record.interpolates("cow"));
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let record: TranslationRecord =
            serde_json::from_str(r#"{"locale":"en","key":"foo"}"#).unwrap();
        assert_eq!(record, TranslationRecord::stub("en", "foo"));
    }
}
