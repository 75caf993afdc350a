//! Sign-in state, persisted across restarts under the `user` key.

use std::sync::Arc;

use tracing::debug;

use crate::backend::Backend;
use crate::error::{NestError, Result};
use crate::model::{User, UserDraft, UserUpdate};
use crate::storage::{keys, StorageAdapter};

/// Holds the signed-in user, restoring whoever was signed in when the
/// previous session ended.
pub struct Session<S, B> {
    storage: Arc<S>,
    backend: Arc<B>,
    user: Option<User>,
}

impl<S: StorageAdapter, B: Backend> Session<S, B> {
    pub fn new(storage: Arc<S>, backend: Arc<B>) -> Self {
        let user: Option<User> = storage.get(keys::SESSION_USER, None);
        Self {
            storage,
            backend,
            user,
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let user = self.backend.auth_login(email, password).await?;
        self.storage.set(keys::SESSION_USER, &Some(user.clone()))?;
        debug!(user = %user.id, "signed in");
        self.user = Some(user.clone());
        Ok(user)
    }

    pub async fn signup(&mut self, draft: UserDraft) -> Result<User> {
        let user = self.backend.auth_signup(draft).await?;
        self.storage.set(keys::SESSION_USER, &Some(user.clone()))?;
        debug!(user = %user.id, "signed up");
        self.user = Some(user.clone());
        Ok(user)
    }

    /// Local-only: clearing the stored user is all the mock backend needs.
    /// A real backend would also invalidate a token here.
    pub fn logout(&mut self) -> Result<()> {
        self.user = None;
        self.storage.set(keys::SESSION_USER, &None::<User>)?;
        Ok(())
    }

    /// Merge a profile edit into the signed-in user and persist it with the
    /// session; the mock backend keeps no separate profile endpoint.
    pub fn update_user(&mut self, update: &UserUpdate) -> Result<User> {
        let user = self.user.as_mut().ok_or(NestError::NotAuthenticated)?;
        update.apply(user);
        let updated = user.clone();
        self.storage.set(keys::SESSION_USER, &Some(updated.clone()))?;
        Ok(updated)
    }
}
