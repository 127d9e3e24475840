use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use crate::error::AppResult;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const CURRENT_USER_KEY: &str = "current_user";

const STORAGE_FILE: &str = "storage.json";

/// Durable string key/value store, the stand-in for browser localStorage.
/// Values live in memory; every mutation is persisted as one JSON document,
/// written to a temp file and renamed into place.
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl Storage {
    /// Open (or create) the store under `dir`. A file that fails to parse is
    /// discarded and the store starts empty.
    pub fn open(dir: &Path) -> AppResult<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
        let path = dir.join(STORAGE_FILE);

        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Discarding unreadable storage file"
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Apply `mutate` to the key set and persist the result as a single
    /// write, so multi-key updates land together or not at all.
    pub fn update(&self, mutate: impl FnOnce(&mut HashMap<String, String>)) -> AppResult<()> {
        let mut values = self.values.lock().unwrap();
        mutate(&mut values);
        self.persist(&values)
    }

    fn persist(&self, values: &HashMap<String, String>) -> AppResult<()> {
        let json = serde_json::to_string_pretty(values).context("Failed to serialize storage")?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
