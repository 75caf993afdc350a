//! # Storage Layer
//!
//! A generic typed key-value facade over whatever durable per-origin
//! storage the host provides. The [`StorageAdapter`] trait knows nothing
//! about files, users, or sessions; higher layers pick the keys.
//!
//! Two implementations ship with the crate:
//!
//! - [`json::JsonFileStorage`]: one `<key>.json` file per key under a root
//!   directory, writes renamed into place so no partial entry is ever
//!   observable.
//! - [`memory::MemoryStorage`]: non-durable map for tests and throwaway
//!   sessions.
//!
//! Reads are forgiving by contract: a missing or corrupt entry yields the
//! caller-supplied default instead of an error.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub mod json;
pub mod memory;

pub trait StorageAdapter {
    /// Read and deserialize the value under `key`, falling back to
    /// `default` when the entry is missing or unreadable.
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T;

    /// Serialize and durably write `value` under `key`.
    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()>;

    /// Whether any value is stored under `key`.
    fn contains(&self, key: &str) -> bool;
}

/// Well-known storage keys. Preference keys are partitioned by user id so
/// two accounts on the same machine never share bookmarks.
pub mod keys {
    use uuid::Uuid;

    pub const USERS: &str = "users";
    pub const FILES: &str = "files";
    pub const SESSION_USER: &str = "user";

    pub fn bookmarks(user_id: Uuid) -> String {
        format!("bookmarks.{user_id}")
    }

    pub fn downloads(user_id: Uuid) -> String {
        format!("downloads.{user_id}")
    }
}
