//! Ready-made translation stack assembled from a [`StoreConfig`].

use lexicon_log::info;
use lexicon_store::{
    Chain, JsonFileRepository, Key, LookupOptions, MemoryRepository, RecordingResolver, Resolve,
    Resolver, Result, StoreConfig, TranslationRepository, Translator,
};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Repository picked by the configuration.
pub type DynRepository = Box<dyn TranslationRepository>;

/// The database store, missing translation capture and any bundled
/// backends, wired together.
///
/// Lookups go through the store first (recording misses there) and then
/// through bundled backends in the order they were added. Plural forms for
/// stubs are read from the store and the bundled backends, never through the
/// recorder.
pub struct Lexicon {
    config: StoreConfig,
    resolver: Resolver<DynRepository>,
    bundled: Vec<Arc<dyn Resolve>>,
    translator: Translator,
}

impl std::fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon")
            .field("config", &self.config)
            .field("bundled", &self.bundled.len())
            .finish_non_exhaustive()
    }
}

impl Lexicon {
    /// Open the store described by `config`: the JSON snapshot at
    /// `store_path` if set, otherwise an in-memory store. Logging is
    /// configured from the environment first.
    pub fn open(config: StoreConfig) -> Result<Self> {
        lexicon_log::init();
        config.validate()?;

        let repository: DynRepository = match &config.store_path {
            Some(path) => Box::new(JsonFileRepository::open(path)?),
            None => Box::new(MemoryRepository::new()),
        };
        let records = repository.count(None)?;
        info!(
            "Translation store ready (default locale {}, {} records)",
            config.default_locale, records
        );

        let resolver = Resolver::with_config(Arc::new(repository), &config);
        let translator = assemble(&config, &resolver, &[]);
        Ok(Self {
            config,
            resolver,
            bundled: Vec::new(),
            translator,
        })
    }

    /// Open the store configured through `LEXICON_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::open(StoreConfig::from_env()?)
    }

    /// Add a lower priority backend, e.g. translations shipped with the
    /// application.
    pub fn with_bundled(mut self, backend: Arc<dyn Resolve>) -> Self {
        self.bundled.push(backend);
        self.translator = assemble(&self.config, &self.resolver, &self.bundled);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The store resolver, for administrative reads and writes.
    pub fn resolver(&self) -> &Resolver<DynRepository> {
        &self.resolver
    }

    /// The translator over the whole stack.
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Store a nested translation tree in the store.
    pub fn store_translations(&self, locale: &str, data: &Value) -> Result<usize> {
        self.resolver.store_translations(locale, data)
    }

    /// Translate through the whole stack.
    pub fn translate(&self, locale: &str, key: &Key, options: &LookupOptions) -> Result<Value> {
        self.translator.translate(locale, key, options)
    }

    /// Translate to display text for the default locale.
    pub fn t(&self, key: impl Into<Key>) -> String {
        self.translator.t(&self.config.default_locale, key)
    }

    /// Locales known to the store or any bundled backend.
    pub fn available_locales(&self) -> BTreeSet<String> {
        let mut locales = self.resolver.available_locales();
        for backend in &self.bundled {
            locales.extend(backend.available_locales());
        }
        locales
    }
}

fn assemble(
    config: &StoreConfig,
    resolver: &Resolver<DynRepository>,
    bundled: &[Arc<dyn Resolve>],
) -> Translator {
    let plain: Arc<dyn Resolve> = Arc::new(resolver.clone());
    let plural_source: Arc<dyn Resolve> = Arc::new(
        bundled
            .iter()
            .cloned()
            .fold(Chain::new(vec![plain]), Chain::with)
            .with_separator(config.default_separator.clone()),
    );

    let recorder: Arc<dyn Resolve> = Arc::new(
        RecordingResolver::with_config(resolver.clone(), config).with_plural_source(plural_source),
    );
    let chain = bundled
        .iter()
        .cloned()
        .fold(Chain::new(vec![recorder]), Chain::with)
        .with_separator(config.default_separator.clone());

    Translator::new(Arc::new(chain))
        .with_default_locale(config.default_locale.clone())
        .with_separator(config.default_separator.clone())
}
