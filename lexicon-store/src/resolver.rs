//! Translation lookup
//!
//! [`Resolver`] answers lookups straight from a [`TranslationRepository`]:
//! an exact record wins, otherwise every record below the key is gathered
//! into a nested object. A miss is reported as [`StoreError::Missing`] and
//! nothing else happens; defaults, stub recording and fallbacks belong to
//! the layers composed around it.

use crate::config::{AmbiguousKeyPolicy, StoreConfig};
use crate::key::{child_key, display_key, expand, is_descendant, KeyNormalizer, SEPARATOR};
use crate::{
    Key, MissingTranslation, Result, StoreError, TranslationRecord, TranslationRepository,
    ValueEvaluator,
};
use lexicon_log::{debug, trace};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Option names that steer resolution and are never interpolation
/// arguments.
pub const RESERVED_KEYS: &[&str] = &[
    "count",
    "scope",
    "default",
    "separator",
    "locale",
    "resolve",
    "object",
    "fallback",
    "format",
    "cascade",
    "throw",
    "raise",
];

/// Fallback used by [`Translator`](crate::Translator) when every backend
/// misses.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Translate this key instead
    Key(Key),
    /// Use this value as is
    Value(Value),
}

/// Per-request lookup options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupOptions {
    /// Count for plural selection; also available as `%{count}`
    pub count: Option<f64>,
    /// Key prefix applied before the key
    pub scope: Option<Key>,
    /// Caller separator for this request
    pub separator: Option<String>,
    /// Fallback when the key is missing
    pub default: Option<DefaultValue>,
    /// Interpolation arguments
    pub args: BTreeMap<String, Value>,
}

impl LookupOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the count.
    pub fn count(mut self, count: impl Into<f64>) -> Self {
        self.count = Some(count.into());
        self
    }

    /// Set the scope.
    pub fn scope(mut self, scope: impl Into<Key>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the separator.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Fall back to another key.
    pub fn default_key(mut self, key: impl Into<Key>) -> Self {
        self.default = Some(DefaultValue::Key(key.into()));
        self
    }

    /// Fall back to a literal value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Add an interpolation argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Argument names a translation of this request would need to support:
    /// every argument except reserved option names.
    pub fn interpolation_names(&self) -> Vec<String> {
        self.args
            .keys()
            .filter(|name| !RESERVED_KEYS.contains(&name.as_str()))
            .cloned()
            .collect()
    }
}

/// Something that can resolve translation keys.
///
/// Misses must be reported as [`StoreError::Missing`] so that callers can
/// tell them apart from stored `false` or empty values and try elsewhere.
pub trait Resolve: Send + Sync {
    /// Resolve `key` for `locale`.
    fn resolve(&self, locale: &str, key: &Key, options: &LookupOptions) -> Result<Value>;

    /// Locales this backend has translations for.
    fn available_locales(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

impl<T: Resolve + ?Sized> Resolve for Arc<T> {
    fn resolve(&self, locale: &str, key: &Key, options: &LookupOptions) -> Result<Value> {
        (**self).resolve(locale, key, options)
    }

    fn available_locales(&self) -> BTreeSet<String> {
        (**self).available_locales()
    }
}

/// Repository-backed translation lookup.
pub struct Resolver<R> {
    repository: Arc<R>,
    normalizer: KeyNormalizer,
    policy: AmbiguousKeyPolicy,
    evaluator: Option<Arc<dyn ValueEvaluator>>,
}

impl<R> std::fmt::Debug for Resolver<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("normalizer", &self.normalizer)
            .field("policy", &self.policy)
            .field("evaluator", &self.evaluator.is_some())
            .finish_non_exhaustive()
    }
}

impl<R> Clone for Resolver<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            normalizer: self.normalizer.clone(),
            policy: self.policy,
            evaluator: self.evaluator.clone(),
        }
    }
}

impl<R: TranslationRepository> Resolver<R> {
    /// Create a resolver with the default configuration.
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_config(repository, &StoreConfig::default())
    }

    /// Create a resolver using the separator and ambiguous key policy of
    /// `config`.
    pub fn with_config(repository: Arc<R>, config: &StoreConfig) -> Self {
        Self {
            repository,
            normalizer: KeyNormalizer::new(config.default_separator.clone()),
            policy: config.ambiguous_keys,
            evaluator: None,
        }
    }

    /// Evaluate procedural records with `evaluator`.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn ValueEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// The backing repository.
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// The key normalizer.
    pub fn normalizer(&self) -> &KeyNormalizer {
        &self.normalizer
    }

    /// Canonical key of a request.
    pub fn canonical_key(&self, key: &Key, options: &LookupOptions) -> String {
        self.normalizer
            .flatten(key, options.scope.as_ref(), options.separator.as_deref())
    }

    /// Look up a translation.
    ///
    /// # Returns
    ///
    /// The stored value, a nested object assembled from the records below the
    /// key, or [`StoreError::Missing`]. Stubs count as missing: a stub at the
    /// key is a miss, and stubs below it are left out of the object.
    pub fn lookup(&self, locale: &str, key: &Key, options: &LookupOptions) -> Result<Value> {
        let canonical = self.canonical_key(key, options);
        trace!("Looking up {}.{}", locale, display_key(&canonical, "."));

        if canonical.is_empty() {
            return Err(self.missing(locale, key, canonical, options));
        }

        // An exact record decides the lookup, even when it is only a stub.
        if let Some(record) = self.repository.find_exact(locale, &canonical)? {
            return match self.materialize(&record, options)? {
                Some(value) => Ok(value),
                None => Err(self.missing(locale, key, canonical, options)),
            };
        }

        let mut tree = Map::new();
        let mut found = false;
        for record in self.repository.find_by_prefix(locale, &canonical)? {
            if !is_descendant(&record.key, &canonical) {
                continue;
            }
            let Some(value) = self.materialize(&record, options)? else {
                continue;
            };
            found = true;
            let suffix = &record.key[canonical.len() + SEPARATOR.len_utf8()..];
            insert_nested(&mut tree, suffix, value);
        }

        if found {
            Ok(Value::Object(tree))
        } else {
            Err(self.missing(locale, key, canonical, options))
        }
    }

    /// Store a nested translation tree for `locale`.
    ///
    /// Non-empty objects are walked; every other value (strings, arrays,
    /// booleans, empty objects, `null`) is stored as a leaf under its path.
    /// Conflicts between a leaf and nested translations are handled by the
    /// configured [`AmbiguousKeyPolicy`].
    ///
    /// Returns the number of leaves written.
    pub fn store_translations(&self, locale: &str, data: &Value) -> Result<usize> {
        let Value::Object(map) = data else {
            return Err(StoreError::InvalidData(format!(
                "translations for {} must be an object",
                locale
            )));
        };

        let mut leaves = Vec::new();
        flatten_tree(map, "", &mut leaves);

        // A rejected tree must not be written in part.
        if self.policy == AmbiguousKeyPolicy::Reject {
            for (key, _) in &leaves {
                self.check_unambiguous(locale, key)?;
            }
        }

        for (key, value) in &leaves {
            self.write_leaf(locale, key, value.clone())?;
        }

        debug!("Stored {} translations for {}", leaves.len(), locale);
        Ok(leaves.len())
    }

    /// Delete translations, optionally limited to a locale and a key
    /// subtree.
    pub fn delete_translations(&self, locale: Option<&str>, key: Option<&Key>) -> Result<usize> {
        let prefix = key.map(|k| self.normalizer.flatten(k, None, None));
        self.repository.delete_all(locale, prefix.as_deref())
    }

    /// Locales present in the repository.
    pub fn available_locales(&self) -> BTreeSet<String> {
        self.repository.available_locales()
    }

    fn write_leaf(&self, locale: &str, key: &str, value: Value) -> Result<()> {
        let ancestors = expand(key);
        let ancestors = &ancestors[..ancestors.len().saturating_sub(1)];

        let existing = self.repository.find_exact(locale, key)?;

        for ancestor in ancestors {
            if self.repository.delete_exact(locale, ancestor)? {
                debug!(
                    "Replaced leaf {}.{} with nested translations",
                    locale,
                    display_key(ancestor, ".")
                );
            }
        }
        let removed = self.repository.delete_all(Some(locale), Some(key))?;
        if removed > usize::from(existing.is_some()) {
            debug!(
                "Replaced nested translations under {}.{} with a leaf",
                locale,
                display_key(key, ".")
            );
        }

        let mut record = TranslationRecord::new(locale, key, value);
        if let Some(existing) = existing {
            record.interpolations = existing.interpolations;
        }
        self.repository.upsert(record)
    }

    fn check_unambiguous(&self, locale: &str, key: &str) -> Result<()> {
        let ambiguous = || StoreError::AmbiguousKey {
            locale: locale.to_string(),
            key: display_key(key, "."),
        };

        let ancestors = expand(key);
        for ancestor in &ancestors[..ancestors.len().saturating_sub(1)] {
            if let Some(record) = self.repository.find_exact(locale, ancestor)? {
                if !record.is_stub() {
                    return Err(ambiguous());
                }
            }
        }

        let has_descendants = self
            .repository
            .find_by_prefix(locale, key)?
            .iter()
            .any(|record| is_descendant(&record.key, key) && !record.is_stub());
        if has_descendants {
            return Err(ambiguous());
        }

        Ok(())
    }

    fn materialize(
        &self,
        record: &TranslationRecord,
        options: &LookupOptions,
    ) -> Result<Option<Value>> {
        if record.value.is_none() || !record.is_procedural {
            return Ok(record.value.clone());
        }

        match &self.evaluator {
            Some(evaluator) => evaluator.evaluate(record, options),
            None => Err(StoreError::Evaluation(format!(
                "no evaluator configured for procedural translation {}.{}",
                record.locale,
                display_key(&record.key, ".")
            ))),
        }
    }

    fn missing(
        &self,
        locale: &str,
        key: &Key,
        canonical: String,
        options: &LookupOptions,
    ) -> StoreError {
        MissingTranslation::new(locale, key.clone(), canonical, options.clone()).into()
    }
}

impl<R: TranslationRepository> Resolve for Resolver<R> {
    fn resolve(&self, locale: &str, key: &Key, options: &LookupOptions) -> Result<Value> {
        self.lookup(locale, key, options)
    }

    fn available_locales(&self) -> BTreeSet<String> {
        Resolver::available_locales(self)
    }
}

fn flatten_tree(map: &Map<String, Value>, prefix: &str, leaves: &mut Vec<(String, Value)>) {
    for (segment, value) in map {
        let key = child_key(prefix, segment);
        match value {
            Value::Object(children) if !children.is_empty() => {
                flatten_tree(children, &key, leaves)
            }
            _ => leaves.push((key, value.clone())),
        }
    }
}

fn insert_nested(tree: &mut Map<String, Value>, suffix: &str, value: Value) {
    let mut segments = suffix.split(SEPARATOR).peekable();
    let mut node = tree;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            node.insert(segment.to_string(), value);
            return;
        }

        let child = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        let Value::Object(next) = child else {
            return;
        };
        node = next;
    }
}
