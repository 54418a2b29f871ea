//! JSON file storage backend
//!
//! Keeps preferences in a flat JSON object, e.g.
//! `{"theme": "dark", "sidebarCollapsed": "true"}`. The CLI uses it to
//! render pages with a given set of saved preferences.

use super::KeyValueStore;
use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Store backed by a JSON file, rewritten on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store, starting empty when the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences file: {:?}", path))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse preferences file: {:?}", path))?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: RefCell::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        let result = serde_json::to_string_pretty(&*self.values.borrow())
            .map_err(anyhow::Error::from)
            .and_then(|json| fs::write(&self.path, json).map_err(anyhow::Error::from));

        if let Err(e) = result {
            tracing::warn!(path = ?self.path, error = %e, "could not persist preferences");
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&self, key: &str) {
        let removed = self.values.borrow_mut().remove(key).is_some();
        if removed {
            self.persist();
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let path = std::env::temp_dir().join(format!("orgchem-prefs-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("sidebarCollapsed"), None);
        store.set("sidebarCollapsed", "true");
        store.set("theme", "dark");

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("sidebarCollapsed").as_deref(), Some("true"));
        assert_eq!(reopened.get("theme").as_deref(), Some("dark"));

        reopened.remove("theme");
        assert_eq!(FileStore::open(&path).unwrap().get("theme"), None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("orgchem-bad-{}.json", std::process::id()));
        fs::write(&path, "not json").unwrap();
        assert!(FileStore::open(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
