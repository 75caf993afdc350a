//! The authoritative in-memory file collection.
//!
//! Mutations are optimistic: the collection changes before the backend
//! answers, so local reads see the new value immediately, and the backend's
//! confirmation (or refusal) is reconciled afterwards. Every change is a
//! single locked replacement; readers never observe a half-applied edit.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::Backend;
use crate::error::{NestError, Result};
use crate::model::{FileDraft, FileRecord, FileUpdate, User};

#[derive(Debug, Default)]
struct RepoState {
    files: Vec<FileRecord>,
    // Number of refreshes currently in flight; the loading flag must stay
    // truthful when refreshes overlap.
    pending_loads: usize,
    last_error: Option<String>,
}

/// Handle to the shared collection. Clones are cheap and see the same
/// state, so a reader holding one handle observes optimistic writes made
/// through another. Construct one per session; there is no hidden global.
pub struct FileRepository<B> {
    backend: Arc<B>,
    state: Arc<RwLock<RepoState>>,
}

impl<B> Clone for FileRepository<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: Backend> FileRepository<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(RepoState::default())),
        }
    }

    // Locks are only held for the duration of a copy or splice, never
    // across an await point.
    fn read(&self) -> RwLockReadGuard<'_, RepoState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RepoState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current collection, in backend order.
    pub fn snapshot(&self) -> Vec<FileRecord> {
        self.read().files.clone()
    }

    /// True while at least one refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.read().pending_loads > 0
    }

    /// Message from the most recent failed refresh, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    /// Drop the collection and error state, e.g. on logout. An in-flight
    /// refresh still settles its own loading accounting.
    pub fn clear(&self) {
        let mut state = self.write();
        state.files.clear();
        state.last_error = None;
    }

    /// Reload the full collection from the backend. Safe to call again
    /// while a previous call is in flight; the last response to arrive
    /// wins.
    pub async fn refresh(&self) -> Result<()> {
        {
            let mut state = self.write();
            state.pending_loads += 1;
            state.last_error = None;
        }
        let outcome = self.backend.files_list().await;
        let mut state = self.write();
        state.pending_loads = state.pending_loads.saturating_sub(1);
        match outcome {
            Ok(files) => {
                debug!(count = files.len(), "collection refreshed");
                state.files = files;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "refresh failed");
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Validate, optimistically prepend a provisional record, then persist.
    /// On success the provisional entry is swapped for the backend-confirmed
    /// record; on failure it is rolled back, so a failed upload leaves no
    /// phantom entry.
    pub async fn create(&self, draft: FileDraft, uploader: &User) -> Result<FileRecord> {
        draft.validate()?;
        let provisional = FileRecord::provisional(&draft, uploader);
        let provisional_id = provisional.id;
        self.write().files.insert(0, provisional);

        match self.backend.files_upload(draft, uploader).await {
            Ok(confirmed) => {
                let mut state = self.write();
                if let Some(entry) = state.files.iter_mut().find(|f| f.id == provisional_id) {
                    *entry = confirmed.clone();
                } else if !state.files.iter().any(|f| f.id == confirmed.id) {
                    // A refresh replaced the collection mid-flight and the
                    // listing raced the upload; keep the confirmed record.
                    state.files.insert(0, confirmed.clone());
                }
                debug!(file = %confirmed.id, "upload confirmed");
                Ok(confirmed)
            }
            Err(err) => {
                warn!(%err, "upload failed, rolling back optimistic insert");
                self.write().files.retain(|f| f.id != provisional_id);
                Err(err)
            }
        }
    }

    /// Merge the partial edit locally first (read-your-writes), then
    /// persist. On refusal the pre-update record is restored and the error
    /// returned; update is never fire-and-forget.
    pub async fn update(&self, id: Uuid, update: FileUpdate) -> Result<FileRecord> {
        let previous = {
            let mut state = self.write();
            let entry = state
                .files
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or(NestError::FileNotFound(id))?;
            let previous = entry.clone();
            update.apply(entry);
            previous
        };

        match self.backend.files_edit(id, update).await {
            Ok(confirmed) => {
                let mut state = self.write();
                if let Some(entry) = state.files.iter_mut().find(|f| f.id == id) {
                    *entry = confirmed.clone();
                }
                Ok(confirmed)
            }
            Err(err) => {
                warn!(file = %id, %err, "edit rejected, restoring previous record");
                let mut state = self.write();
                if let Some(entry) = state.files.iter_mut().find(|f| f.id == id) {
                    *entry = previous;
                }
                Err(err)
            }
        }
    }

    /// Removal waits for backend confirmation; nothing leaves the
    /// collection until the backend agrees the record existed.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.backend.files_delete(id).await?;
        self.write().files.retain(|f| f.id != id);
        debug!(file = %id, "file removed from collection");
        Ok(())
    }
}
