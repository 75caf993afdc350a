use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StorageAdapter;
use crate::error::Result;

/// Durable adapter keeping one `<key>.json` file per key under a root
/// directory.
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageAdapter for JsonFileStorage {
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(content) => serde_json::from_str(&content).unwrap_or(default),
            Err(_) => default,
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        let path = self.entry_path(key);
        // Write to a sibling temp file, then rename: readers either see the
        // old entry or the complete new one, never a partial write.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.entry_path(key).exists()
    }
}
