use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use log::{info, warn};

pub const LAST_RESULT_URL: &str = "last_result_url";

/// Durable string -> string storage backed by one JSON file.
///
/// Reads happen once in [`LocalStore::open`]. Every write rewrites the file;
/// failures are logged and never retried.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(entries) => {
                    info!("Loaded {} local storage entries from {}", entries.len(), path.display());
                    entries
                }
                Err(e) => {
                    warn!("Ignoring unreadable local storage {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Could not read local storage {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let text = serde_json::to_string_pretty(entries)?;
            std::fs::write(&self.path, text)
        };

        if let Err(e) = write() {
            warn!("Could not write local storage {}: {}", self.path.display(), e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
pub(crate) fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vt-{}-{}", label, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let path = scratch_dir("store").join("local_storage.json");

        let store = LocalStore::open(&path);
        assert_eq!(store.get(LAST_RESULT_URL), None);
        store.set(LAST_RESULT_URL, "https://cdn/result.png");
        store.set("person_preview", "/tmp/p.png");
        store.set("person_preview", "/tmp/q.png");

        let reopened = LocalStore::open(&path);
        assert_eq!(reopened.get(LAST_RESULT_URL).as_deref(), Some("https://cdn/result.png"));
        assert_eq!(reopened.get("person_preview").as_deref(), Some("/tmp/q.png"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = scratch_dir("store").join("local_storage.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = LocalStore::open(&path);
        assert_eq!(store.get(LAST_RESULT_URL), None);
        store.set(LAST_RESULT_URL, "u");
        assert_eq!(LocalStore::open(&path).get(LAST_RESULT_URL).as_deref(), Some("u"));
    }
}
