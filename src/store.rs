//! Patient store gateway: the whole collection lives in one JSON file.
//!
//! `load` reads and re-validates every record; `save` replaces the file
//! atomically (temp file in the same directory, then rename). Mutations go
//! through `update`, which holds a process-wide lock across the
//! load → modify → save cycle so two concurrent requests cannot lose
//! each other's writes.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::models::Patient;

/// Records keyed by id, iterated in ascending id order.
pub type PatientMap = BTreeMap<String, Patient>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store file not found: {0}")]
    Missing(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupted store file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty collection if the file does not exist yet.
    /// Returns `true` when a file was created.
    pub fn ensure_exists(&self) -> Result<bool, StoreError> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.save(&PatientMap::new())?;
        tracing::info!(path = %self.path.display(), "Created empty patient store");
        Ok(true)
    }

    /// Read the full collection. A missing file is an error, never an
    /// empty map.
    pub fn load(&self) -> Result<PatientMap, StoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::Missing(self.path.clone())
            } else {
                StoreError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the file with `data`. Derived fields are written alongside
    /// their inputs but ignored on the next `load`.
    pub fn save(&self, data: &PatientMap) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(data)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        tracing::debug!(path = %self.path.display(), records = data.len(), "Patient store saved");
        Ok(())
    }

    /// Run `mutate` against a freshly loaded collection and save the result
    /// if it returns `Ok`. Nothing is written on `Err`.
    pub async fn update<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut PatientMap) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load()?;
        let out = mutate(&mut data)?;
        self.save(&data)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, PatientDraft};
    use std::sync::Arc;

    fn patient(weight: f64) -> Patient {
        Patient::try_from(PatientDraft {
            name: Field::Value("Kiran".into()),
            city: Field::Value("Indore".into()),
            age: Field::Value(33),
            gender: Field::Value("male".into()),
            height: Field::Value(1.8),
            weight: Field::Value(weight),
        })
        .unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("patients.json"))
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_in(&dir).load().unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }

    #[test]
    fn ensure_exists_creates_empty_store_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("patients.json"));
        assert!(store.ensure_exists().unwrap());
        assert!(!store.ensure_exists().unwrap());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut data = PatientMap::new();
        data.insert("P002".into(), patient(80.0));
        data.insert("P001".into(), patient(70.0));
        store.save(&data).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, data);
        assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["P001", "P002"]);
    }

    #[test]
    fn saved_file_has_no_id_in_values_but_has_derived_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut data = PatientMap::new();
        data.insert("P001".into(), patient(70.0));
        store.save(&data).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(raw["P001"].get("id").is_none());
        assert_eq!(raw["P001"]["bmi"], 21.6);
        assert_eq!(raw["P001"]["verdict"], "Normal");
    }

    #[test]
    fn invalid_record_on_disk_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"P001": {"name": "X", "age": 500}}"#).unwrap();
        assert!(matches!(store.load().unwrap_err(), StoreError::Corrupt { .. }));
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load().unwrap_err(), StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn update_saves_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().unwrap();

        let failed: Result<(), StoreError> = store
            .update(|data| {
                data.insert("P001".into(), patient(70.0));
                Err(StoreError::Missing(PathBuf::from("abort")))
            })
            .await;
        assert!(failed.is_err());
        assert!(store.load().unwrap().is_empty());

        store
            .update(|data| {
                data.insert("P001".into(), patient(70.0));
                Ok::<_, StoreError>(())
            })
            .await
            .unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));
        store.ensure_exists().unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update(|data| {
                        data.insert(format!("P{i:03}"), patient(60.0 + f64::from(i)));
                        Ok::<_, StoreError>(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.load().unwrap().len(), 16);
    }
}
