//! Persistent translation store for Lexicon
//!
//! Translations live as flat records keyed by locale and a canonical key.
//! Nested data goes in through [`Resolver::store_translations`] and comes
//! back out either leaf by leaf or as a whole namespace.
//!
//! - **Key normalization**: `"a.b.c"`, `["a", "b.c"]` and a scope all map to
//!   one canonical key
//! - **Lookup**: exact records first, then the sub-tree below the key
//! - **Missing translation capture**: misses leave stub records behind,
//!   one per plural form when a count is given
//! - **Chaining**: several backends in priority order, namespaces merged
//! - **Rendering**: defaults, CLDR plural selection and `%{name}`
//!   interpolation
//!
//! # Quick Start
//!
//! ```
//! use lexicon_store::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> lexicon_store::Result<()> {
//! let resolver = Resolver::new(Arc::new(MemoryRepository::new()));
//! resolver.store_translations("en", &json!({
//!     "i18n": { "plural": { "keys": ["one", "other"] } },
//!     "inbox": { "one": "One message", "other": "%{count} messages" }
//! }))?;
//!
//! let recorder = Arc::new(RecordingResolver::new(resolver));
//! let translator = Translator::new(recorder.clone());
//!
//! let options = LookupOptions::new().count(3);
//! assert_eq!(translator.translate("en", &Key::from("inbox"), &options)?, json!("3 messages"));
//!
//! // A miss with a count records one stub per plural form.
//! assert!(translator.translate("en", &Key::from("outbox"), &options).is_err());
//! let stubs = recorder.inner().repository().find_by_prefix("en", "outbox")?;
//! assert_eq!(stubs.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Persistence
//!
//! ```no_run
//! use lexicon_store::{JsonFileRepository, Resolver};
//! use std::sync::Arc;
//!
//! # fn main() -> lexicon_store::Result<()> {
//! let repository = JsonFileRepository::open("locales/translations.json")?;
//! let resolver = Resolver::new(Arc::new(repository));
//! # Ok(())
//! # }
//! ```

mod chain;
mod config;
mod error;
mod evaluator;
mod key;
mod missing;
mod plural;
mod record;
mod repository;
mod resolver;
mod translator;

pub use chain::Chain;
pub use config::{AmbiguousKeyPolicy, ENV_PREFIX, PLURAL_KEYS_KEY, StoreConfig};
pub use error::{MissingTranslation, StoreError};
pub use evaluator::{FnEvaluator, ValueEvaluator};
pub use key::{
    DEFAULT_SEPARATOR, Key, KeyNormalizer, SEPARATOR, SEPARATOR_ESCAPE, display_key, expand,
    join_segments,
};
pub use missing::RecordingResolver;
pub use plural::{PluralCategory, PluralFormExpander, language_of, plural_category};
pub use record::TranslationRecord;
pub use repository::{JsonFileRepository, MemoryRepository, TranslationRepository};
pub use resolver::{DefaultValue, LookupOptions, RESERVED_KEYS, Resolve, Resolver};
pub use translator::{Translator, interpolate};

/// Result type for translation store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AmbiguousKeyPolicy, Chain, Key, LookupOptions, MemoryRepository, RecordingResolver,
        Resolve, Resolver, Result, StoreConfig, StoreError, TranslationRecord,
        TranslationRepository, Translator,
    };
}
