//! Store configuration.

use crate::key::{DEFAULT_SEPARATOR, SEPARATOR};
use crate::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Well-known key holding a locale's plural forms.
pub const PLURAL_KEYS_KEY: &str = "i18n.plural.keys";

/// Environment variable prefix read by [`StoreConfig::from_env`].
pub const ENV_PREFIX: &str = "LEXICON";

/// What the store operation does when a leaf and nested translations would
/// share one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguousKeyPolicy {
    /// Last write wins: writing a leaf removes its descendants, writing
    /// nested translations removes the leaf above them.
    #[default]
    Replace,
    /// Refuse the write with [`StoreError::AmbiguousKey`]. Stubs never
    /// conflict and are replaced.
    Reject,
}

impl AmbiguousKeyPolicy {
    /// Parse `replace` / `reject`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" | "last-write-wins" => Some(Self::Replace),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Translation store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Locale used when a caller does not name one
    pub default_locale: String,

    /// Caller-facing key separator
    pub default_separator: String,

    /// Key holding each locale's plural forms
    pub plural_keys_key: String,

    /// Leaf vs. nested conflict handling on store
    pub ambiguous_keys: AmbiguousKeyPolicy,

    /// Whether lookup misses create stub records
    pub record_missing: bool,

    /// Snapshot file for [`JsonFileRepository`](crate::JsonFileRepository)
    pub store_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            default_separator: DEFAULT_SEPARATOR.to_string(),
            plural_keys_key: PLURAL_KEYS_KEY.to_string(),
            ambiguous_keys: AmbiguousKeyPolicy::Replace,
            record_missing: true,
            store_path: None,
        }
    }
}

impl StoreConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default locale.
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Set the caller-facing separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.default_separator = separator.into();
        self
    }

    /// Set the key holding plural forms.
    pub fn with_plural_keys_key(mut self, key: impl Into<String>) -> Self {
        self.plural_keys_key = key.into();
        self
    }

    /// Set the ambiguous key policy.
    pub fn with_ambiguous_keys(mut self, policy: AmbiguousKeyPolicy) -> Self {
        self.ambiguous_keys = policy;
        self
    }

    /// Enable or disable stub recording.
    pub fn with_record_missing(mut self, enabled: bool) -> Self {
        self.record_missing = enabled;
        self
    }

    /// Set the snapshot file path.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Parse a JSON configuration; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `LEXICON_*` environment variables on top of the defaults.
    ///
    /// - `LEXICON_DEFAULT_LOCALE`
    /// - `LEXICON_SEPARATOR`
    /// - `LEXICON_PLURAL_KEYS`
    /// - `LEXICON_AMBIGUOUS_KEYS` (`replace` or `reject`)
    /// - `LEXICON_RECORD_MISSING` (`1`/`true` or `0`/`false`)
    /// - `LEXICON_STORE_PATH`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(locale) = env_var("DEFAULT_LOCALE") {
            config.default_locale = locale;
        }
        if let Some(separator) = env_var("SEPARATOR") {
            config.default_separator = separator;
        }
        if let Some(key) = env_var("PLURAL_KEYS") {
            config.plural_keys_key = key;
        }
        if let Some(policy) = env_var("AMBIGUOUS_KEYS") {
            config.ambiguous_keys = AmbiguousKeyPolicy::parse(&policy).ok_or_else(|| {
                StoreError::InvalidConfig(format!("unknown ambiguous key policy: {}", policy))
            })?;
        }
        if let Some(flag) = env_var("RECORD_MISSING") {
            config.record_missing = flag == "1" || flag.eq_ignore_ascii_case("true");
        }
        if let Some(path) = env_var("STORE_PATH") {
            config.store_path = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the store cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_locale.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "default_locale must not be empty".to_string(),
            ));
        }
        if self.default_separator.is_empty() {
            return Err(StoreError::InvalidConfig(
                "default_separator must not be empty".to_string(),
            ));
        }
        if self.default_separator.contains(SEPARATOR) && self.default_separator.len() > 1 {
            return Err(StoreError::InvalidConfig(
                "default_separator may only contain the canonical separator on its own"
                    .to_string(),
            ));
        }
        if self.plural_keys_key.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "plural_keys_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(format!("{}_{}", ENV_PREFIX, name))
        .ok()
        .filter(|v| !v.is_empty())
}
