use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::StorageAdapter;
use crate::error::{NestError, Result};

/// Non-durable adapter backed by a plain map. Used by tests and by callers
/// that want a fresh catalog per run.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Ok(entries) = self.entries.lock() else {
            return default;
        };
        match entries.get(key) {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or(default),
            None => default,
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| NestError::Storage("storage mutex poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}
