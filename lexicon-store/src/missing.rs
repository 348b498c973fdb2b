//! Missing translation capture
//!
//! [`RecordingResolver`] wraps a [`Resolver`] and turns every miss into stub
//! records, so the keys an application asks for show up in the store waiting
//! for a translator. A miss with a count creates one stub per plural form of
//! the locale instead of one for the bare key.
//!
//! Recording is best effort. Whatever happens while writing stubs, the caller
//! still gets the original [`StoreError::Missing`].

use crate::key::{child_key, display_key};
use crate::{
    Key, LookupOptions, PluralFormExpander, Resolve, Resolver, Result, StoreConfig, StoreError,
    TranslationRecord, TranslationRepository,
};
use lexicon_log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Resolver that records stubs for missing translations.
pub struct RecordingResolver<R> {
    inner: Arc<Resolver<R>>,
    plurals: PluralFormExpander,
    enabled: bool,
}

impl<R> std::fmt::Debug for RecordingResolver<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingResolver")
            .field("inner", &self.inner)
            .field("plurals", &self.plurals)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl<R: TranslationRepository + 'static> RecordingResolver<R> {
    /// Wrap `inner`, reading plural forms through `inner` itself.
    pub fn new(inner: Resolver<R>) -> Self {
        Self::with_config(inner, &StoreConfig::default())
    }

    /// Wrap `inner` using the plural keys key and recording switch of
    /// `config`.
    pub fn with_config(inner: Resolver<R>, config: &StoreConfig) -> Self {
        let inner = Arc::new(inner);
        let source: Arc<dyn Resolve> = inner.clone();
        Self {
            plurals: PluralFormExpander::with_key(source, config.plural_keys_key.as_str()),
            inner,
            enabled: config.record_missing,
        }
    }

    /// Read plural forms from `source` instead, e.g. a chain that also holds
    /// bundled defaults.
    ///
    /// `source` must not route back into this resolver.
    pub fn with_plural_source(mut self, source: Arc<dyn Resolve>) -> Self {
        self.plurals = PluralFormExpander::with_key(source, self.plurals.key().clone());
        self
    }

    /// Turn recording on or off.
    pub fn with_recording(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The wrapped resolver.
    pub fn inner(&self) -> &Resolver<R> {
        &self.inner
    }

    /// Whether misses create stubs.
    pub fn is_recording(&self) -> bool {
        self.enabled
    }

    /// Create stubs for a miss on `key`.
    ///
    /// # Returns
    ///
    /// Canonical keys of the stubs actually inserted. Existing records are
    /// left alone; repository failures are logged and skipped.
    pub fn on_miss(&self, locale: &str, key: &Key, options: &LookupOptions) -> Vec<String> {
        let canonical = self.inner.canonical_key(key, options);
        if canonical.is_empty() {
            return Vec::new();
        }

        let repository = self.inner.repository();
        match repository.find_exact(locale, &canonical) {
            Ok(Some(_)) => return Vec::new(),
            Ok(None) => {}
            Err(e) => {
                warn!(
                    "Skipping stubs for {}.{}: {}",
                    locale,
                    display_key(&canonical, "."),
                    e
                );
                return Vec::new();
            }
        }

        let keys = match options.count {
            Some(_) => match self.plurals.forms_for(locale) {
                Ok(forms) => forms
                    .iter()
                    .map(|form| child_key(&canonical, form))
                    .collect(),
                Err(StoreError::NoPluralConfig(_)) => vec![canonical],
                Err(e) => {
                    warn!("Plural forms for {} unavailable: {}", locale, e);
                    vec![canonical]
                }
            },
            None => vec![canonical],
        };

        let interpolations = options.interpolation_names();
        let mut created = Vec::new();
        for stub_key in keys {
            let stub = TranslationRecord::stub(locale, stub_key.as_str())
                .with_interpolations(interpolations.iter().cloned());
            match repository.insert_if_absent(stub) {
                Ok(true) => {
                    debug!(
                        "Recorded missing translation {}.{}",
                        locale,
                        display_key(&stub_key, ".")
                    );
                    created.push(stub_key);
                }
                Ok(false) => {}
                Err(e) => warn!(
                    "Failed to record missing translation {}.{}: {}",
                    locale,
                    display_key(&stub_key, "."),
                    e
                ),
            }
        }
        created
    }
}

impl<R: TranslationRepository + 'static> Resolve for RecordingResolver<R> {
    fn resolve(&self, locale: &str, key: &Key, options: &LookupOptions) -> Result<Value> {
        match self.inner.lookup(locale, key, options) {
            Err(e) if e.is_missing() => {
                if self.enabled {
                    self.on_miss(locale, key, options);
                }
                Err(e)
            }
            other => other,
        }
    }

    fn available_locales(&self) -> BTreeSet<String> {
        self.inner.available_locales()
    }
}
