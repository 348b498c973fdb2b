//! Error types for translation store operations

use crate::key::display_key;
use crate::resolver::LookupOptions;
use crate::Key;
use thiserror::Error;

/// Errors that can occur while resolving or storing translations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record (and no descendants) for the requested key.
    ///
    /// Expected and recoverable: chains move on to the next backend and the
    /// missing-translation recorder creates stubs before passing it along.
    #[error("{0}")]
    Missing(Box<MissingTranslation>),

    /// The locale has no usable `i18n.plural.keys` entry
    #[error("No plural configuration for locale: {0}")]
    NoPluralConfig(String),

    /// A write would leave both a leaf and descendants under one key
    #[error("Ambiguous key {key} for locale {locale}: a leaf and nested translations cannot share it")]
    AmbiguousKey { locale: String, key: String },

    /// The backing store cannot be reached or written
    #[error("Translation repository unavailable: {0}")]
    RepositoryUnavailable(String),

    /// A `%{name}` placeholder had no matching argument
    #[error("Missing interpolation argument {name} for {key}")]
    MissingInterpolationArgument { key: String, name: String },

    /// Procedural value could not be evaluated
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Translation data of the wrong shape
    #[error("Invalid translation data: {0}")]
    InvalidData(String),

    /// Invalid store configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this is a lookup miss rather than a failure.
    pub fn is_missing(&self) -> bool {
        matches!(self, StoreError::Missing(_))
    }

    /// The miss details, if this is a miss.
    pub fn as_missing(&self) -> Option<&MissingTranslation> {
        match self {
            StoreError::Missing(missing) => Some(missing),
            _ => None,
        }
    }
}

impl From<MissingTranslation> for StoreError {
    fn from(missing: MissingTranslation) -> Self {
        StoreError::Missing(Box::new(missing))
    }
}

/// Details of a lookup miss: everything needed to record stubs for it.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingTranslation {
    /// Requested locale
    pub locale: String,
    /// Key as the caller gave it
    pub key: Key,
    /// Canonical form of `key` (scope applied)
    pub canonical_key: String,
    /// Options of the failed request
    pub options: LookupOptions,
}

impl MissingTranslation {
    /// Create a miss for an already-canonicalized key.
    pub fn new(
        locale: impl Into<String>,
        key: Key,
        canonical_key: impl Into<String>,
        options: LookupOptions,
    ) -> Self {
        Self {
            locale: locale.into(),
            key,
            canonical_key: canonical_key.into(),
            options,
        }
    }
}

impl std::fmt::Display for MissingTranslation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "translation missing: {}.{}",
            self.locale,
            display_key(&self.canonical_key, ".")
        )
    }
}
