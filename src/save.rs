use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::game::KeyValueStore;

const SCORES_FILE: &str = "scores.json";

/// On-disk layout: a flat map of integer values.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct SaveFile {
    pub values: BTreeMap<String, i64>,
}

/// `KeyValueStore` backed by `<data dir>/scores.json`.  Every write goes
/// straight to disk.
pub struct JsonStore {
    path: PathBuf,
    file: SaveFile,
}

impl JsonStore {
    /// Opens the store in `data_dir`.  A missing file starts empty; an
    /// unreadable one is logged and also starts empty.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(SCORES_FILE);
        let file = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("ignoring corrupt {}: {e}", path.display());
                SaveFile::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SaveFile::default(),
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
                SaveFile::default()
            }
        };
        Self { path, file }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn flush(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.file)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for JsonStore {
    fn get_int(&self, key: &str) -> i64 {
        self.file.values.get(key).copied().unwrap_or(0)
    }

    fn set_int(&mut self, key: &str, value: i64) -> anyhow::Result<()> {
        self.file.values.insert(key.to_string(), value);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ports::HIGH_SCORE_KEY;

    #[test]
    fn missing_file_reads_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path());
        assert_eq!(store.get_int(HIGH_SCORE_KEY), 0);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("tonetrace");
        {
            let mut store = JsonStore::open(&data_dir);
            store.set_int(HIGH_SCORE_KEY, 25).unwrap();
        }
        let store = JsonStore::open(&data_dir);
        assert_eq!(store.get_int(HIGH_SCORE_KEY), 25);
        assert_eq!(store.get_int("other"), 0);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SCORES_FILE), "{ not json").unwrap();
        let mut store = JsonStore::open(dir.path());
        assert_eq!(store.get_int(HIGH_SCORE_KEY), 0);

        store.set_int(HIGH_SCORE_KEY, 3).unwrap();
        assert_eq!(JsonStore::open(dir.path()).get_int(HIGH_SCORE_KEY), 3);
    }

    #[test]
    fn unwritable_location_returns_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "plain file").unwrap();

        let mut store = JsonStore::open(&blocker);
        assert_eq!(store.get_int(HIGH_SCORE_KEY), 0);
        assert!(store.set_int(HIGH_SCORE_KEY, 7).is_err());
        // the in-memory value is kept for the rest of the run
        assert_eq!(store.get_int(HIGH_SCORE_KEY), 7);
    }
}
