//! Per-user bookmarks and download history.
//!
//! Bookmarks are a toggle set; downloads are an append-only, deduplicated
//! log. Both are local-only state, persisted synchronously through the
//! storage adapter with no backend round-trip.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::Result;
use crate::model::FileRecord;
use crate::storage::{keys, StorageAdapter};

pub struct PreferenceStore<S> {
    storage: Arc<S>,
    bookmarks_key: String,
    downloads_key: String,
    bookmarks: Vec<Uuid>,
    downloads: Vec<Uuid>,
}

impl<S: StorageAdapter> PreferenceStore<S> {
    /// Open the preference sets for one user. Keys are partitioned by user
    /// id, so accounts sharing a machine keep separate bookmarks.
    pub fn for_user(storage: Arc<S>, user_id: Uuid) -> Self {
        let bookmarks_key = keys::bookmarks(user_id);
        let downloads_key = keys::downloads(user_id);
        let bookmarks = storage.get(&bookmarks_key, Vec::new());
        let downloads = storage.get(&downloads_key, Vec::new());
        Self {
            storage,
            bookmarks_key,
            downloads_key,
            bookmarks,
            downloads,
        }
    }

    pub fn is_bookmarked(&self, file_id: Uuid) -> bool {
        self.bookmarks.contains(&file_id)
    }

    /// Flip the bookmark for `file_id` and persist. Returns the new state.
    pub fn toggle_bookmark(&mut self, file_id: Uuid) -> Result<bool> {
        let bookmarked = match self.bookmarks.iter().position(|id| *id == file_id) {
            Some(pos) => {
                self.bookmarks.remove(pos);
                false
            }
            None => {
                self.bookmarks.push(file_id);
                true
            }
        };
        self.storage.set(&self.bookmarks_key, &self.bookmarks)?;
        Ok(bookmarked)
    }

    /// Append `file_id` to the download log unless already present;
    /// first-download order is retained.
    pub fn record_download(&mut self, file_id: Uuid) -> Result<()> {
        if !self.downloads.contains(&file_id) {
            self.downloads.push(file_id);
            self.storage.set(&self.downloads_key, &self.downloads)?;
        }
        Ok(())
    }

    pub fn bookmarks(&self) -> &[Uuid] {
        &self.bookmarks
    }

    pub fn downloads(&self) -> &[Uuid] {
        &self.downloads
    }

    /// Bookmarked records in collection order. Ids whose record was deleted
    /// are dropped here at read time; there is no cascading cleanup.
    pub fn bookmarked_files(&self, files: &[FileRecord]) -> Vec<FileRecord> {
        files
            .iter()
            .filter(|f| self.bookmarks.contains(&f.id))
            .cloned()
            .collect()
    }

    /// Download history in first-download order, stale ids dropped.
    pub fn downloaded_files(&self, files: &[FileRecord]) -> Vec<FileRecord> {
        self.downloads
            .iter()
            .filter_map(|id| files.iter().find(|f| f.id == *id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileDraft, UserDraft, UserRole};
    use crate::storage::memory::MemoryStorage;

    fn store() -> (Arc<MemoryStorage>, PreferenceStore<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let prefs = PreferenceStore::for_user(Arc::clone(&storage), Uuid::new_v4());
        (storage, prefs)
    }

    fn record(title: &str) -> FileRecord {
        let uploader = UserDraft {
            full_name: "Dr. Bob Faculty".to_string(),
            email: "faculty@test.com".to_string(),
            role: UserRole::Faculty,
            section: "CSE-DS".to_string(),
            profile_picture_url: None,
        }
        .into_user();
        FileRecord::provisional(&FileDraft::new(title, "DBMS", "f.pdf", 64), &uploader)
    }

    #[test]
    fn toggling_twice_returns_to_the_original_state() {
        let (_, mut prefs) = store();
        let id = Uuid::new_v4();

        assert!(prefs.toggle_bookmark(id).unwrap());
        assert!(prefs.is_bookmarked(id));
        assert!(!prefs.toggle_bookmark(id).unwrap());
        assert!(!prefs.is_bookmarked(id));
    }

    #[test]
    fn downloads_are_deduplicated_in_first_occurrence_order() {
        let (_, mut prefs) = store();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        prefs.record_download(first).unwrap();
        prefs.record_download(second).unwrap();
        prefs.record_download(first).unwrap();

        assert_eq!(prefs.downloads(), &[first, second]);
    }

    #[test]
    fn state_survives_a_reopen() {
        let storage = Arc::new(MemoryStorage::new());
        let user_id = Uuid::new_v4();
        let id = Uuid::new_v4();

        let mut prefs = PreferenceStore::for_user(Arc::clone(&storage), user_id);
        prefs.toggle_bookmark(id).unwrap();
        prefs.record_download(id).unwrap();

        let reopened = PreferenceStore::for_user(storage, user_id);
        assert!(reopened.is_bookmarked(id));
        assert_eq!(reopened.downloads(), &[id]);
    }

    #[test]
    fn users_do_not_share_preferences() {
        let storage = Arc::new(MemoryStorage::new());
        let id = Uuid::new_v4();

        let mut alice = PreferenceStore::for_user(Arc::clone(&storage), Uuid::new_v4());
        alice.toggle_bookmark(id).unwrap();

        let bob = PreferenceStore::for_user(storage, Uuid::new_v4());
        assert!(!bob.is_bookmarked(id));
    }

    #[test]
    fn stale_ids_are_filtered_at_read_time() {
        let (_, mut prefs) = store();
        let kept = record("Kept");
        let deleted = record("Deleted");

        prefs.toggle_bookmark(kept.id).unwrap();
        prefs.toggle_bookmark(deleted.id).unwrap();
        prefs.record_download(deleted.id).unwrap();

        // The collection no longer holds the deleted record.
        let collection = vec![kept.clone()];
        let bookmarked = prefs.bookmarked_files(&collection);
        assert_eq!(bookmarked.len(), 1);
        assert_eq!(bookmarked[0].id, kept.id);
        assert!(prefs.downloaded_files(&collection).is_empty());

        // The stale id itself is tolerated and stays in the raw set.
        assert!(prefs.is_bookmarked(deleted.id));
    }

    #[test]
    fn downloaded_files_follow_download_order_not_collection_order() {
        let (_, mut prefs) = store();
        let older = record("Older");
        let newer = record("Newer");
        let collection = vec![newer.clone(), older.clone()];

        prefs.record_download(older.id).unwrap();
        prefs.record_download(newer.id).unwrap();

        let downloaded = prefs.downloaded_files(&collection);
        assert_eq!(downloaded[0].id, older.id);
        assert_eq!(downloaded[1].id, newer.id);
    }
}
