//! Backend chaining
//!
//! A [`Chain`] asks several backends in priority order, e.g. the database
//! store first and bundled translations after it.

use crate::{Key, KeyNormalizer, LookupOptions, MissingTranslation, Resolve, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Ordered list of translation backends.
///
/// A scalar hit is returned as soon as one backend has it. Namespace hits
/// (objects) are merged across all backends, earlier backends winning per
/// key. A miss everywhere is reported with the first backend's miss.
#[derive(Clone, Default)]
pub struct Chain {
    backends: Vec<Arc<dyn Resolve>>,
    normalizer: KeyNormalizer,
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("backends", &self.backends.len())
            .field("normalizer", &self.normalizer)
            .finish()
    }
}

impl Chain {
    /// Create a chain from backends in priority order.
    pub fn new(backends: Vec<Arc<dyn Resolve>>) -> Self {
        Self {
            backends,
            normalizer: KeyNormalizer::default(),
        }
    }

    /// Separator for requests that do not set one. Only used to report a
    /// miss when the chain has no backends.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.normalizer = KeyNormalizer::new(separator);
        self
    }

    /// Append a lower priority backend.
    pub fn push(&mut self, backend: Arc<dyn Resolve>) {
        self.backends.push(backend);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, backend: Arc<dyn Resolve>) -> Self {
        self.push(backend);
        self
    }

    /// Number of backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the chain has no backends.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Resolve for Chain {
    fn resolve(&self, locale: &str, key: &Key, options: &LookupOptions) -> Result<Value> {
        let mut namespace: Option<Map<String, Value>> = None;
        let mut first_miss = None;

        for backend in &self.backends {
            match backend.resolve(locale, key, options) {
                Ok(Value::Object(found)) => match namespace.as_mut() {
                    Some(merged) => merge_into(merged, found),
                    None => namespace = Some(found),
                },
                Ok(value) if namespace.is_none() => return Ok(value),
                Ok(_) => {}
                Err(e) if e.is_missing() => {
                    first_miss.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }

        match (namespace, first_miss) {
            (Some(merged), _) => Ok(Value::Object(merged)),
            (None, Some(miss)) => Err(miss),
            (None, None) => {
                let canonical = self.normalizer.flatten(
                    key,
                    options.scope.as_ref(),
                    options.separator.as_deref(),
                );
                Err(MissingTranslation::new(locale, key.clone(), canonical, options.clone()).into())
            }
        }
    }

    fn available_locales(&self) -> BTreeSet<String> {
        self.backends
            .iter()
            .flat_map(|backend| backend.available_locales())
            .collect()
    }
}

fn merge_into(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            Some(Value::Object(existing)) => {
                if let Value::Object(nested) = value {
                    merge_into(existing, nested);
                }
            }
            Some(existing) if existing.is_null() => *existing = value,
            Some(_) => {}
            None => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryRepository, Resolver, StoreError};
    use serde_json::json;

    fn backend(data: Value) -> Arc<dyn Resolve> {
        let resolver = Resolver::new(Arc::new(MemoryRepository::new()));
        resolver.store_translations("en", &data).unwrap();
        Arc::new(resolver)
    }

    fn resolve(chain: &Chain, key: &str) -> Result<Value> {
        chain.resolve("en", &Key::from(key), &LookupOptions::new())
    }

    #[test]
    fn test_first_backend_wins() {
        let chain = Chain::new(vec![
            backend(json!({ "greeting": "Hello" })),
            backend(json!({ "greeting": "Hi", "farewell": "Bye" })),
        ]);

        assert_eq!(resolve(&chain, "greeting").unwrap(), json!("Hello"));
        assert_eq!(resolve(&chain, "farewell").unwrap(), json!("Bye"));
    }

    #[test]
    fn test_namespaces_merge() {
        let chain = Chain::new(vec![
            backend(json!({ "foo": { "bar": "db", "deep": { "a": "db" } } })),
            backend(json!({ "foo": { "bar": "bundled", "baz": "bundled", "deep": { "b": "bundled" } } })),
        ]);

        assert_eq!(
            resolve(&chain, "foo").unwrap(),
            json!({ "bar": "db", "baz": "bundled", "deep": { "a": "db", "b": "bundled" } })
        );
    }

    #[test]
    fn test_miss_everywhere() {
        let chain = Chain::default()
            .with(backend(json!({ "a": "a" })))
            .with(backend(json!({ "b": "b" })));

        let err = resolve(&chain, "c").unwrap_err();
        assert!(err.is_missing());
        assert_eq!(err.to_string(), "translation missing: en.c");
    }

    #[test]
    fn test_empty_chain_misses() {
        assert!(resolve(&Chain::default(), "a").unwrap_err().is_missing());
        assert!(Chain::default().is_empty());
    }

    #[test]
    fn test_empty_chain_uses_its_separator() {
        let chain = Chain::default().with_separator("/");
        let err = resolve(&chain, "a/b").unwrap_err();
        assert_eq!(err.as_missing().unwrap().canonical_key, "a\u{1}b");
    }

    #[test]
    fn test_null_gives_way_to_later_value() {
        struct NullForms;

        impl Resolve for NullForms {
            fn resolve(&self, _: &str, _: &Key, _: &LookupOptions) -> Result<Value> {
                Ok(json!({ "one": null, "other": null }))
            }
        }

        let nulls: Arc<dyn Resolve> = Arc::new(NullForms);
        let chain = Chain::new(vec![
            nulls,
            backend(json!({ "apples": { "one": "one apple", "other": "%{count} apples" } })),
        ]);
        assert_eq!(
            resolve(&chain, "apples").unwrap(),
            json!({ "one": "one apple", "other": "%{count} apples" })
        );
    }

    #[test]
    fn test_failures_propagate() {
        struct Broken;

        impl Resolve for Broken {
            fn resolve(&self, _: &str, _: &Key, _: &LookupOptions) -> Result<Value> {
                Err(StoreError::RepositoryUnavailable("down".to_string()))
            }
        }

        let broken: Arc<dyn Resolve> = Arc::new(Broken);
        let chain = Chain::new(vec![broken, backend(json!({ "a": "a" }))]);
        assert!(matches!(
            resolve(&chain, "a"),
            Err(StoreError::RepositoryUnavailable(_))
        ));
    }

    #[test]
    fn test_available_locales_union() {
        let de = Resolver::new(Arc::new(MemoryRepository::new()));
        de.store_translations("de", &json!({ "a": "a" })).unwrap();

        let de: Arc<dyn Resolve> = Arc::new(de);
        let chain = Chain::new(vec![backend(json!({ "a": "a" })), de]);
        assert_eq!(
            chain.available_locales().into_iter().collect::<Vec<_>>(),
            vec!["de", "en"]
        );
    }
}
