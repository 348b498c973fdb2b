//! JSON snapshot repository
//!
//! Keeps records in a [`MemoryRepository`] and rewrites a JSON snapshot file
//! after every mutation (temp file + rename, so readers never see a torn
//! file).

use super::{MemoryRepository, TranslationRepository};
use crate::{Result, StoreError, TranslationRecord};
use lexicon_log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    records: Vec<TranslationRecord>,
}

/// File-backed repository.
///
/// The in-memory copy is authoritative while the process runs. A failed
/// snapshot write is reported as [`StoreError::RepositoryUnavailable`] and
/// the next successful mutation writes the full state again.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    records: MemoryRepository,
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    /// Open the snapshot at `path`. A missing file is an empty store; the
    /// file and its parent directories are created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let records = match fs::read_to_string(&path) {
            Ok(content) => {
                let snapshot: Snapshot = serde_json::from_str(&content)?;
                if snapshot.version != SNAPSHOT_VERSION {
                    return Err(StoreError::RepositoryUnavailable(format!(
                        "unsupported snapshot version {} in {:?}",
                        snapshot.version, path
                    )));
                }
                snapshot.records
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No translation snapshot at {:?}, starting empty", path);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!("Opened translation snapshot {:?} ({} records)", path, records.len());

        Ok(Self {
            path,
            records: MemoryRepository::from_records(records),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock();

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            records: self.records.snapshot(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;

        self.write_atomic(json.as_bytes()).map_err(|e| {
            warn!("Failed to write translation snapshot {:?}: {}", self.path, e);
            StoreError::RepositoryUnavailable(format!("{:?}: {}", self.path, e))
        })
    }

    fn write_atomic(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)
    }
}

impl TranslationRepository for JsonFileRepository {
    fn find_exact(&self, locale: &str, key: &str) -> Result<Option<TranslationRecord>> {
        self.records.find_exact(locale, key)
    }

    fn find_by_prefix(&self, locale: &str, prefix: &str) -> Result<Vec<TranslationRecord>> {
        self.records.find_by_prefix(locale, prefix)
    }

    fn insert_if_absent(&self, record: TranslationRecord) -> Result<bool> {
        let inserted = self.records.insert_if_absent(record)?;
        if inserted {
            self.persist()?;
        }
        Ok(inserted)
    }

    fn upsert(&self, record: TranslationRecord) -> Result<()> {
        self.records.upsert(record)?;
        self.persist()
    }

    fn delete_exact(&self, locale: &str, key: &str) -> Result<bool> {
        let deleted = self.records.delete_exact(locale, key)?;
        if deleted {
            self.persist()?;
        }
        Ok(deleted)
    }

    fn delete_all(&self, locale: Option<&str>, key_prefix: Option<&str>) -> Result<usize> {
        let deleted = self.records.delete_all(locale, key_prefix)?;
        if deleted > 0 {
            self.persist()?;
        }
        Ok(deleted)
    }

    fn count(&self, locale: Option<&str>) -> Result<usize> {
        self.records.count(locale)
    }

    fn available_locales(&self) -> BTreeSet<String> {
        self.records.available_locales()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let repository = JsonFileRepository::open(dir.path().join("translations.json")).unwrap();

        assert_eq!(repository.count(None).unwrap(), 0);
        assert!(repository.available_locales().is_empty());
        assert!(!repository.path().exists());
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("translations.json");

        {
            let repository = JsonFileRepository::open(&path).unwrap();
            repository
                .upsert(TranslationRecord::new("en", "foo\u{1}bar", json!("bar")))
                .unwrap();
            repository
                .insert_if_absent(
                    TranslationRecord::stub("en", "missing").with_interpolations(["name"]),
                )
                .unwrap();
        }

        let reopened = JsonFileRepository::open(&path).unwrap();
        assert_eq!(reopened.count(Some("en")).unwrap(), 2);
        let stub = reopened.find_exact("en", "missing").unwrap().unwrap();
        assert!(stub.is_stub());
        assert!(stub.interpolates("name"));
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translations.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonFileRepository::open(&path),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_unwritable_location_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translations.json");
        let repository = JsonFileRepository::open(&path).unwrap();
        fs::create_dir(dir.path().join("translations.json.tmp")).unwrap();

        let result = repository.upsert(TranslationRecord::stub("en", "foo"));

        assert!(matches!(result, Err(StoreError::RepositoryUnavailable(_))));
        assert!(repository.find_exact("en", "foo").unwrap().is_some());
    }
}
