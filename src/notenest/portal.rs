//! Facade wiring session, repository, and preferences together.
//!
//! One [`Portal`] is one browser-tab's worth of state: signing in hydrates
//! the file collection and opens the user's preference store, signing out
//! drops both. Nothing here is process-global; two portals over separate
//! storage roots are fully independent.

use std::sync::Arc;

use uuid::Uuid;

use crate::backend::Backend;
use crate::error::{NestError, Result};
use crate::model::{FileDraft, FileRecord, FileUpdate, User, UserDraft};
use crate::prefs::PreferenceStore;
use crate::query::FileQuery;
use crate::repository::FileRepository;
use crate::session::Session;
use crate::storage::StorageAdapter;

pub struct Portal<S, B> {
    storage: Arc<S>,
    session: Session<S, B>,
    files: FileRepository<B>,
    prefs: Option<PreferenceStore<S>>,
}

impl<S: StorageAdapter, B: Backend> Portal<S, B> {
    /// A restored session (user still signed in from last run) gets its
    /// preference store back immediately; the collection still needs a
    /// `refresh` or a fresh `login`.
    pub fn new(storage: Arc<S>, backend: Arc<B>) -> Self {
        let session = Session::new(Arc::clone(&storage), Arc::clone(&backend));
        let files = FileRepository::new(backend);
        let prefs = session
            .current_user()
            .map(|u| PreferenceStore::for_user(Arc::clone(&storage), u.id));
        Self {
            storage,
            session,
            files,
            prefs,
        }
    }

    pub fn session(&self) -> &Session<S, B> {
        &self.session
    }

    pub fn files(&self) -> &FileRepository<B> {
        &self.files
    }

    pub fn prefs(&self) -> Option<&PreferenceStore<S>> {
        self.prefs.as_ref()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let user = self.session.login(email, password).await?;
        self.open_user_state(user.id).await?;
        Ok(user)
    }

    pub async fn signup(&mut self, draft: UserDraft) -> Result<User> {
        let user = self.session.signup(draft).await?;
        self.open_user_state(user.id).await?;
        Ok(user)
    }

    async fn open_user_state(&mut self, user_id: Uuid) -> Result<()> {
        self.prefs = Some(PreferenceStore::for_user(
            Arc::clone(&self.storage),
            user_id,
        ));
        self.files.refresh().await
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session.logout()?;
        self.prefs = None;
        self.files.clear();
        Ok(())
    }

    pub async fn upload(&self, draft: FileDraft) -> Result<FileRecord> {
        let uploader = self.require_user()?;
        self.files.create(draft, uploader).await
    }

    pub async fn edit(&self, id: Uuid, update: FileUpdate) -> Result<FileRecord> {
        self.require_ownership(id)?;
        self.files.update(id, update).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.require_ownership(id)?;
        self.files.delete(id).await
    }

    pub fn search(&self, query: &FileQuery) -> Vec<FileRecord> {
        query.apply(&self.files.snapshot())
    }

    /// Files uploaded by the signed-in user, for the manage-uploads view.
    pub fn my_uploads(&self) -> Vec<FileRecord> {
        let Some(user) = self.session.current_user() else {
            return Vec::new();
        };
        self.files
            .snapshot()
            .into_iter()
            .filter(|f| f.uploader_id == user.id)
            .collect()
    }

    pub fn toggle_bookmark(&mut self, file_id: Uuid) -> Result<bool> {
        self.prefs
            .as_mut()
            .ok_or(NestError::NotAuthenticated)?
            .toggle_bookmark(file_id)
    }

    pub fn record_download(&mut self, file_id: Uuid) -> Result<()> {
        self.prefs
            .as_mut()
            .ok_or(NestError::NotAuthenticated)?
            .record_download(file_id)
    }

    pub fn bookmarked_files(&self) -> Vec<FileRecord> {
        match &self.prefs {
            Some(prefs) => prefs.bookmarked_files(&self.files.snapshot()),
            None => Vec::new(),
        }
    }

    pub fn downloaded_files(&self) -> Vec<FileRecord> {
        match &self.prefs {
            Some(prefs) => prefs.downloaded_files(&self.files.snapshot()),
            None => Vec::new(),
        }
    }

    fn require_user(&self) -> Result<&User> {
        self.session.current_user().ok_or(NestError::NotAuthenticated)
    }

    /// Only the original uploader may edit or delete a record. Ids absent
    /// from the local collection are refused outright: ownership cannot be
    /// verified for a record the portal has never seen, so nothing is
    /// forwarded to the backend.
    fn require_ownership(&self, id: Uuid) -> Result<()> {
        let user = self.require_user()?;
        let record = self
            .files
            .snapshot()
            .into_iter()
            .find(|f| f.id == id)
            .ok_or(NestError::FileNotFound(id))?;
        if record.uploader_id != user.id {
            return Err(NestError::Validation(
                "only the original uploader may change this file".to_string(),
            ));
        }
        Ok(())
    }
}
