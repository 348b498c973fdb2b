//! Translation repository trait and implementations.

mod file;
mod memory;

pub use file::JsonFileRepository;
pub use memory::MemoryRepository;

use crate::{Result, TranslationRecord};
use std::collections::BTreeSet;

/// Persistent store of translation records keyed by (locale, canonical key).
///
/// Implementations must make each operation atomic per (locale, key); no
/// cross-key locking is expected.
pub trait TranslationRepository: Send + Sync {
    /// Get the record stored exactly at `key`.
    fn find_exact(&self, locale: &str, key: &str) -> Result<Option<TranslationRecord>>;

    /// Get every record whose key equals `prefix` or lies below it
    /// (`prefix` followed by the canonical separator), ordered by key.
    fn find_by_prefix(&self, locale: &str, prefix: &str) -> Result<Vec<TranslationRecord>>;

    /// Insert `record` unless its (locale, key) is taken.
    ///
    /// # Returns
    ///
    /// `true` if the record was inserted, `false` if one already existed.
    fn insert_if_absent(&self, record: TranslationRecord) -> Result<bool>;

    /// Insert or replace the record at its (locale, key).
    fn upsert(&self, record: TranslationRecord) -> Result<()>;

    /// Delete the record stored exactly at `key`.
    fn delete_exact(&self, locale: &str, key: &str) -> Result<bool>;

    /// Delete records, optionally restricted to a locale and/or a key prefix
    /// (same prefix semantics as [`find_by_prefix`](Self::find_by_prefix)).
    ///
    /// Returns the number of deleted records.
    fn delete_all(&self, locale: Option<&str>, key_prefix: Option<&str>) -> Result<usize>;

    /// Number of records, optionally for one locale.
    fn count(&self, locale: Option<&str>) -> Result<usize>;

    /// Locales with at least one record.
    ///
    /// Must not fail: an unreachable or not-yet-created store yields an empty
    /// set.
    fn available_locales(&self) -> BTreeSet<String>;
}

impl<T: TranslationRepository + ?Sized> TranslationRepository for Box<T> {
    fn find_exact(&self, locale: &str, key: &str) -> Result<Option<TranslationRecord>> {
        (**self).find_exact(locale, key)
    }

    fn find_by_prefix(&self, locale: &str, prefix: &str) -> Result<Vec<TranslationRecord>> {
        (**self).find_by_prefix(locale, prefix)
    }

    fn insert_if_absent(&self, record: TranslationRecord) -> Result<bool> {
        (**self).insert_if_absent(record)
    }

    fn upsert(&self, record: TranslationRecord) -> Result<()> {
        (**self).upsert(record)
    }

    fn delete_exact(&self, locale: &str, key: &str) -> Result<bool> {
        (**self).delete_exact(locale, key)
    }

    fn delete_all(&self, locale: Option<&str>, key_prefix: Option<&str>) -> Result<usize> {
        (**self).delete_all(locale, key_prefix)
    }

    fn count(&self, locale: Option<&str>) -> Result<usize> {
        (**self).count(locale)
    }

    fn available_locales(&self) -> BTreeSet<String> {
        (**self).available_locales()
    }
}
