//! Plural forms
//!
//! Two concerns live here. [`PluralFormExpander`] reads the plural form
//! tokens a locale stores under `i18n.plural.keys`; those decide which stubs
//! a miss with a count creates. [`plural_category`] picks the CLDR category
//! for a count when a translation is rendered.

use crate::config::PLURAL_KEYS_KEY;
use crate::{Key, LookupOptions, Resolve, Result, StoreError};
use lexicon_log::trace;
use serde_json::Value;
use std::sync::Arc;

/// Reads a locale's ordered plural form tokens.
#[derive(Clone)]
pub struct PluralFormExpander {
    source: Arc<dyn Resolve>,
    key: Key,
}

impl std::fmt::Debug for PluralFormExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluralFormExpander")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PluralFormExpander {
    /// Read forms from `source` under the default `i18n.plural.keys` key.
    pub fn new(source: Arc<dyn Resolve>) -> Self {
        Self::with_key(source, PLURAL_KEYS_KEY)
    }

    /// Read forms from `source` under `key` (dot separated).
    pub fn with_key(source: Arc<dyn Resolve>, key: impl Into<Key>) -> Self {
        Self {
            source,
            key: key.into(),
        }
    }

    /// Key the forms are read from.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The plural form tokens of `locale`, in stored order.
    ///
    /// Anything but a non-empty array of strings, including a lookup
    /// failure, is [`StoreError::NoPluralConfig`].
    pub fn forms_for(&self, locale: &str) -> Result<Vec<String>> {
        let options = LookupOptions::new().separator(".");
        let no_config = || StoreError::NoPluralConfig(locale.to_string());

        let value = match self.source.resolve(locale, &self.key, &options) {
            Ok(value) => value,
            Err(e) => {
                trace!("No plural forms for {}: {}", locale, e);
                return Err(no_config());
            }
        };

        let Value::Array(tokens) = value else {
            return Err(no_config());
        };
        if tokens.is_empty() {
            return Err(no_config());
        }

        tokens
            .into_iter()
            .map(|token| match token {
                Value::String(form) if !form.is_empty() => Ok(form),
                _ => Err(no_config()),
            })
            .collect()
    }
}

/// CLDR plural categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    /// Zero items (Arabic, Welsh)
    Zero,
    /// One item
    One,
    /// Two items (Arabic, Welsh)
    Two,
    /// Few items (Slavic, Arabic, Welsh)
    Few,
    /// Many items (Slavic, Arabic, Welsh)
    Many,
    /// Everything else
    Other,
}

impl PluralCategory {
    /// Parse a category name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Some(Self::Zero),
            "one" => Some(Self::One),
            "two" => Some(Self::Two),
            "few" => Some(Self::Few),
            "many" => Some(Self::Many),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// The form token for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleFamily {
    OneOther,
    Invariant,
    French,
    EastSlavic,
    Polish,
    Czech,
    Welsh,
    Arabic,
}

impl RuleFamily {
    fn for_language(language: &str) -> Self {
        match language {
            "ja" | "ko" | "zh" | "vi" | "th" | "id" | "ms" => Self::Invariant,
            "fr" => Self::French,
            "ru" | "uk" | "be" => Self::EastSlavic,
            "pl" => Self::Polish,
            "cs" | "sk" => Self::Czech,
            "cy" => Self::Welsh,
            "ar" => Self::Arabic,
            _ => Self::OneOther,
        }
    }

    fn category(self, n: f64) -> PluralCategory {
        use PluralCategory::*;

        let whole = n.fract() == 0.0;
        let i = n.abs() as u64;
        let mod10 = i % 10;
        let mod100 = i % 100;
        let slavic_few = (2..=4).contains(&mod10) && !(12..=14).contains(&mod100);

        match self {
            Self::Invariant => Other,
            Self::OneOther => {
                if whole && i == 1 {
                    One
                } else {
                    Other
                }
            }
            Self::French => {
                if whole && i <= 1 {
                    One
                } else {
                    Other
                }
            }
            Self::EastSlavic if !whole => Other,
            Self::EastSlavic => {
                if mod10 == 1 && mod100 != 11 {
                    One
                } else if slavic_few {
                    Few
                } else {
                    Many
                }
            }
            Self::Polish if !whole => Other,
            Self::Polish => {
                if i == 1 {
                    One
                } else if slavic_few {
                    Few
                } else {
                    Many
                }
            }
            Self::Czech if !whole => Many,
            Self::Czech => match i {
                1 => One,
                2..=4 => Few,
                _ => Other,
            },
            Self::Welsh if !whole => Other,
            Self::Welsh => match i {
                0 => Zero,
                1 => One,
                2 => Two,
                3 => Few,
                6 => Many,
                _ => Other,
            },
            Self::Arabic if !whole => Other,
            Self::Arabic => match i {
                0 => Zero,
                1 => One,
                2 => Two,
                _ if (3..=10).contains(&mod100) => Few,
                _ if (11..=99).contains(&mod100) => Many,
                _ => Other,
            },
        }
    }
}

/// Language part of a locale identifier: `pt-BR` and `pt_BR` give `pt`.
pub fn language_of(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_ascii_lowercase()
}

/// CLDR plural category of `n` for a locale or language code.
///
/// # Example
///
/// ```
/// use lexicon_store::{plural_category, PluralCategory};
///
/// assert_eq!(plural_category(1, "en"), PluralCategory::One);
/// assert_eq!(plural_category(0, "fr-CA"), PluralCategory::One);
/// assert_eq!(plural_category(5, "ru"), PluralCategory::Many);
/// ```
pub fn plural_category(n: impl Into<f64>, locale: &str) -> PluralCategory {
    RuleFamily::for_language(&language_of(locale)).category(n.into())
}
