//! In-memory repository

use super::TranslationRepository;
use crate::key::is_within;
use crate::{Result, TranslationRecord};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

type Records = BTreeMap<String, BTreeMap<String, TranslationRecord>>;

/// Ordered, thread-safe in-memory repository.
///
/// Records are kept sorted by key per locale, so prefix lookups are range
/// scans.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: RwLock<Records>,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `records`; later duplicates win.
    pub fn from_records(records: impl IntoIterator<Item = TranslationRecord>) -> Self {
        let repository = Self::new();
        {
            let mut map = repository.records.write();
            for record in records {
                map.entry(record.locale.clone())
                    .or_default()
                    .insert(record.key.clone(), record);
            }
        }
        repository
    }

    /// Copy of every record, ordered by locale then key.
    pub fn snapshot(&self) -> Vec<TranslationRecord> {
        self.records
            .read()
            .values()
            .flat_map(|keys| keys.values().cloned())
            .collect()
    }
}

fn scan<'a>(
    keys: &'a BTreeMap<String, TranslationRecord>,
    prefix: &'a str,
) -> impl Iterator<Item = &'a TranslationRecord> + 'a {
    keys.range(prefix.to_string()..)
        .take_while(move |(key, _)| key.starts_with(prefix))
        .filter(move |(key, _)| is_within(key, prefix))
        .map(|(_, record)| record)
}

impl TranslationRepository for MemoryRepository {
    fn find_exact(&self, locale: &str, key: &str) -> Result<Option<TranslationRecord>> {
        Ok(self
            .records
            .read()
            .get(locale)
            .and_then(|keys| keys.get(key))
            .cloned())
    }

    fn find_by_prefix(&self, locale: &str, prefix: &str) -> Result<Vec<TranslationRecord>> {
        let records = self.records.read();
        Ok(records
            .get(locale)
            .map(|keys| scan(keys, prefix).cloned().collect())
            .unwrap_or_default())
    }

    fn insert_if_absent(&self, record: TranslationRecord) -> Result<bool> {
        let mut records = self.records.write();
        let keys = records.entry(record.locale.clone()).or_default();
        if keys.contains_key(&record.key) {
            return Ok(false);
        }
        keys.insert(record.key.clone(), record);
        Ok(true)
    }

    fn upsert(&self, record: TranslationRecord) -> Result<()> {
        self.records
            .write()
            .entry(record.locale.clone())
            .or_default()
            .insert(record.key.clone(), record);
        Ok(())
    }

    fn delete_exact(&self, locale: &str, key: &str) -> Result<bool> {
        let mut records = self.records.write();
        let Some(keys) = records.get_mut(locale) else {
            return Ok(false);
        };
        let removed = keys.remove(key).is_some();
        if keys.is_empty() {
            records.remove(locale);
        }
        Ok(removed)
    }

    fn delete_all(&self, locale: Option<&str>, key_prefix: Option<&str>) -> Result<usize> {
        let mut records = self.records.write();
        let mut deleted = 0;

        for (record_locale, keys) in records.iter_mut() {
            if locale.is_some_and(|l| l != record_locale.as_str()) {
                continue;
            }
            let before = keys.len();
            match key_prefix {
                Some(prefix) => keys.retain(|key, _| !is_within(key, prefix)),
                None => keys.clear(),
            }
            deleted += before - keys.len();
        }

        records.retain(|_, keys| !keys.is_empty());
        Ok(deleted)
    }

    fn count(&self, locale: Option<&str>) -> Result<usize> {
        let records = self.records.read();
        Ok(match locale {
            Some(locale) => records.get(locale).map_or(0, BTreeMap::len),
            None => records.values().map(BTreeMap::len).sum(),
        })
    }

    fn available_locales(&self) -> BTreeSet<String> {
        self.records.read().keys().cloned().collect()
    }
}
