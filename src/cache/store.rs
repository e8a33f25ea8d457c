// Key/value stores with per-entry max-age.
// Expired values read as absent and are evicted on access, like a cookie jar.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

use super::clock::Clock;

/// Get/set/delete capability over string values with a max-age.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` if missing or past its max-age.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one under the same key.
    fn set(&self, key: &str, value: &str, max_age: Duration) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// A stored value with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
}

impl StoredValue {
    fn new(value: &str, max_age: Duration, now: DateTime<Utc>) -> Self {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        Self {
            value: value.to_string(),
            expires_at: now.checked_add_signed(max_age).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-process store. Contents vanish with the process.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredValue>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredValue>>> {
        self.entries
            .lock()
            .map_err(|_| FolioError::Other("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.clock.now();
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(stored) if stored.is_live(now) => Ok(Some(stored.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, max_age: Duration) -> Result<()> {
        let stored = StoredValue::new(value, max_age, self.clock.now());
        self.lock()?.insert(key.to_string(), stored);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Filesystem store: one JSON file per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let stored: StoredValue = serde_json::from_str(&contents)?;
        if stored.is_live(self.clock.now()) {
            Ok(Some(stored.value))
        } else {
            remove_file(&path)?;
            Ok(None)
        }
    }

    fn set(&self, key: &str, value: &str, max_age: Duration) -> Result<()> {
        let stored = StoredValue::new(value, max_age, self.clock.now());
        let json = serde_json::to_string(&stored)?;
        write_atomic(&self.path_for(key), json.as_bytes())
    }

    fn delete(&self, key: &str) -> Result<()> {
        remove_file(&self.path_for(key))
    }
}

/// Write a file by way of a temp file and rename, so readers never see a partial write.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

fn remove_file(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Replace characters that are unsafe in file names with underscores.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
