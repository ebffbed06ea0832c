use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use super::SeriesStore;
use crate::errors::{Error, Result};

/// Stores the whole series as one pretty-printed JSON array on disk.
/// A missing file reads back as an empty series.
#[derive(Debug)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> SeriesStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn load(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Store(format!("failed to read {}: {}", self.path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Store(format!("failed to parse {}: {}", self.path.display(), e)))
    }

    fn save(&self, items: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)
            .map_err(|e| Error::Store(format!("failed to serialize series: {}", e)))?;
        std::fs::write(&self.path, json)
            .map_err(|e| Error::Store(format!("failed to write {}: {}", self.path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        label: String,
    }

    #[test]
    fn test_missing_file_loads_as_empty_series() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Row> = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Row> = JsonFileStore::new(dir.path().join("rows.json"));
        let rows = vec![
            Row {
                id: 1,
                label: "first".to_string(),
            },
            Row {
                id: 2,
                label: "second".to_string(),
            },
        ];
        store.save(&rows).unwrap();
        assert_eq!(store.load().unwrap(), rows);
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Row> = JsonFileStore::new(dir.path().join("rows.json"));
        store
            .save(&[Row {
                id: 1,
                label: "old".to_string(),
            }])
            .unwrap();
        let replacement = vec![Row {
            id: 9,
            label: "new".to_string(),
        }];
        store.save(&replacement).unwrap();
        assert_eq!(store.load().unwrap(), replacement);
    }

    #[test]
    fn test_corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "not json").unwrap();
        let store: JsonFileStore<Row> = JsonFileStore::new(path);
        assert!(matches!(store.load(), Err(Error::Store(_))));
    }
}
