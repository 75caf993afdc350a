//! Simulated remote service.
//!
//! [`MockBackend`] stands in for a real API: every call sleeps for a
//! configurable latency, then works against collections persisted through a
//! [`StorageAdapter`]. Swapping it for a genuine network client means
//! implementing [`Backend`] elsewhere; no caller changes.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as Window, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{NestError, Result};
use crate::model::{FileDraft, FileRecord, FileUpdate, MimeCategory, User, UserDraft, UserRole};
use crate::storage::{keys, StorageAdapter};

/// Default simulated round-trip latency. Uploads take twice this.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// The remote service the repository and session talk to.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn auth_login(&self, email: &str, password: &str) -> Result<User>;
    async fn auth_signup(&self, draft: UserDraft) -> Result<User>;
    async fn files_list(&self) -> Result<Vec<FileRecord>>;
    async fn files_upload(&self, draft: FileDraft, uploader: &User) -> Result<FileRecord>;
    async fn files_edit(&self, id: Uuid, update: FileUpdate) -> Result<FileRecord>;
    async fn files_delete(&self, id: Uuid) -> Result<()>;
}

pub struct MockBackend<S> {
    storage: Arc<S>,
    latency: Duration,
    users: Mutex<Vec<User>>,
    files: Mutex<Vec<FileRecord>>,
}

impl<S: StorageAdapter> MockBackend<S> {
    /// Load the cached collections, seeding storage on first run so a fresh
    /// install has accounts to log into and files to browse.
    pub fn new(storage: Arc<S>) -> Result<Self> {
        if !storage.contains(keys::USERS) {
            let (users, files) = seed_data();
            storage.set(keys::USERS, &users)?;
            storage.set(keys::FILES, &files)?;
        }
        let users: Vec<User> = storage.get(keys::USERS, Vec::new());
        let files: Vec<FileRecord> = storage.get(keys::FILES, Vec::new());
        Ok(Self {
            storage,
            latency: DEFAULT_LATENCY,
            users: Mutex::new(users),
            files: Mutex::new(files),
        })
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn round_trip(&self) {
        tokio::time::sleep(self.latency).await;
    }

    fn lock_users(&self) -> Result<MutexGuard<'_, Vec<User>>> {
        self.users
            .lock()
            .map_err(|_| NestError::Storage("backend user cache poisoned".to_string()))
    }

    fn lock_files(&self) -> Result<MutexGuard<'_, Vec<FileRecord>>> {
        self.files
            .lock()
            .map_err(|_| NestError::Storage("backend file cache poisoned".to_string()))
    }
}

#[async_trait]
impl<S: StorageAdapter + Send + Sync> Backend for MockBackend<S> {
    async fn auth_login(&self, email: &str, password: &str) -> Result<User> {
        self.round_trip().await;
        // Mock credential check: the account must exist and the password
        // must be non-empty.
        if password.is_empty() {
            return Err(NestError::InvalidCredentials);
        }
        let users = self.lock_users()?;
        users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(NestError::InvalidCredentials)
    }

    async fn auth_signup(&self, draft: UserDraft) -> Result<User> {
        draft.validate()?;
        self.round_trip().await;
        let mut users = self.lock_users()?;
        if users.iter().any(|u| u.email == draft.email) {
            return Err(NestError::DuplicateEmail(draft.email));
        }
        let user = draft.into_user();
        users.push(user.clone());
        self.storage.set(keys::USERS, &*users)?;
        debug!(user = %user.id, "account created");
        Ok(user)
    }

    async fn files_list(&self) -> Result<Vec<FileRecord>> {
        self.round_trip().await;
        let files = self.lock_files()?;
        let mut listed = files.clone();
        listed.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(listed)
    }

    async fn files_upload(&self, draft: FileDraft, uploader: &User) -> Result<FileRecord> {
        draft.validate()?;
        // Uploads carry the file bytes, so they take longer.
        tokio::time::sleep(self.latency * 2).await;

        let id = Uuid::new_v4();
        let record = FileRecord {
            id,
            title: draft.title,
            subject: draft.subject,
            mime_category: MimeCategory::from_filename(&draft.filename),
            content_location: format!("mock://files/{id}/{}", draft.filename),
            filename: draft.filename,
            size_bytes: draft.size_bytes,
            uploader_id: uploader.id,
            uploader_name: uploader.full_name.clone(),
            uploaded_at: Utc::now(),
            tags: draft.tags,
        };

        let mut files = self.lock_files()?;
        files.insert(0, record.clone());
        self.storage.set(keys::FILES, &*files)?;
        debug!(file = %record.id, "file stored");
        Ok(record)
    }

    async fn files_edit(&self, id: Uuid, update: FileUpdate) -> Result<FileRecord> {
        self.round_trip().await;
        let mut files = self.lock_files()?;
        let record = files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(NestError::FileNotFound(id))?;
        update.apply(record);
        let updated = record.clone();
        self.storage.set(keys::FILES, &*files)?;
        Ok(updated)
    }

    async fn files_delete(&self, id: Uuid) -> Result<()> {
        self.round_trip().await;
        let mut files = self.lock_files()?;
        let before = files.len();
        files.retain(|f| f.id != id);
        if files.len() == before {
            return Err(NestError::FileNotFound(id));
        }
        self.storage.set(keys::FILES, &*files)?;
        debug!(file = %id, "file deleted");
        Ok(())
    }
}

/// Demo accounts and a small starter catalog, written once per storage root.
fn seed_data() -> (Vec<User>, Vec<FileRecord>) {
    let student = User {
        id: Uuid::new_v4(),
        full_name: "Alice Student".to_string(),
        email: "student@test.com".to_string(),
        role: UserRole::Student,
        section: "CSE-DS".to_string(),
        profile_picture_url: Some("https://picsum.photos/seed/u001/150/150".to_string()),
    };
    let faculty = User {
        id: Uuid::new_v4(),
        full_name: "Dr. Bob Faculty".to_string(),
        email: "faculty@test.com".to_string(),
        role: UserRole::Faculty,
        section: "CSE-DS".to_string(),
        profile_picture_url: Some("https://picsum.photos/seed/u002/150/150".to_string()),
    };

    let now = Utc::now();
    let seed_file = |title: &str,
                     filename: &str,
                     subject: &str,
                     days_ago: i64,
                     size_bytes: u64,
                     tags: &[&str]| {
        let id = Uuid::new_v4();
        FileRecord {
            id,
            title: title.to_string(),
            subject: subject.to_string(),
            mime_category: MimeCategory::from_filename(filename),
            content_location: format!("mock://files/{id}/{filename}"),
            filename: filename.to_string(),
            size_bytes,
            uploader_id: faculty.id,
            uploader_name: faculty.full_name.clone(),
            uploaded_at: now - Window::days(days_ago),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    };

    let files = vec![
        seed_file(
            "DBMS Notes - Unit 2",
            "dbms_unit2.pdf",
            "DBMS",
            2,
            123_456,
            &["notes", "unit2"],
        ),
        seed_file(
            "OS Concepts Diagram",
            "os_concepts.png",
            "Operating Systems",
            5,
            87_654,
            &["diagram"],
        ),
        seed_file(
            "Data Structures Cheatsheet",
            "ds_cheatsheet.docx",
            "Data Structures",
            10,
            45_000,
            &["cheatsheet", "quick-ref"],
        ),
    ];

    (vec![student, faculty], files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn backend() -> MockBackend<MemoryStorage> {
        MockBackend::new(Arc::new(MemoryStorage::new()))
            .unwrap()
            .with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn seeds_accounts_and_files_once() {
        let storage = Arc::new(MemoryStorage::new());
        let first = MockBackend::new(Arc::clone(&storage)).unwrap();
        let listed = first.with_latency(Duration::ZERO).files_list().await.unwrap();
        assert_eq!(listed.len(), 3);

        // A second backend over the same storage reuses the seed.
        let second = MockBackend::new(storage).unwrap().with_latency(Duration::ZERO);
        assert_eq!(second.files_list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn login_accepts_seeded_account() {
        let backend = backend();
        let user = backend.auth_login("faculty@test.com", "pw").await.unwrap();
        assert_eq!(user.role, UserRole::Faculty);
    }

    #[tokio::test]
    async fn login_rejects_unknown_email_and_empty_password() {
        let backend = backend();
        assert!(matches!(
            backend.auth_login("nobody@test.com", "pw").await,
            Err(NestError::InvalidCredentials)
        ));
        assert!(matches!(
            backend.auth_login("faculty@test.com", "").await,
            Err(NestError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let backend = backend();
        let draft = UserDraft {
            full_name: "Another Bob".to_string(),
            email: "faculty@test.com".to_string(),
            role: UserRole::Faculty,
            section: "CSE-DS".to_string(),
            profile_picture_url: None,
        };
        assert!(matches!(
            backend.auth_signup(draft).await,
            Err(NestError::DuplicateEmail(_))
        ));
    }

    #[tokio::test]
    async fn upload_assigns_id_time_and_location() {
        let backend = backend();
        let uploader = backend.auth_login("faculty@test.com", "pw").await.unwrap();
        let draft = FileDraft::new("CN Notes", "Computer Networks", "cn.pdf", 2048);

        let record = backend.files_upload(draft, &uploader).await.unwrap();
        assert_eq!(record.mime_category, MimeCategory::Pdf);
        assert!(record.content_location.contains("cn.pdf"));
        assert_eq!(record.uploader_name, uploader.full_name);

        let listed = backend.files_list().await.unwrap();
        assert_eq!(listed[0].id, record.id);
    }

    #[tokio::test]
    async fn edit_and_delete_unknown_id_fail_not_found() {
        let backend = backend();
        let missing = Uuid::new_v4();
        assert!(matches!(
            backend.files_edit(missing, FileUpdate::new()).await,
            Err(NestError::FileNotFound(_))
        ));
        assert!(matches!(
            backend.files_delete(missing).await,
            Err(NestError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn edits_survive_a_reload_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let backend = MockBackend::new(Arc::clone(&storage))
            .unwrap()
            .with_latency(Duration::ZERO);
        let listed = backend.files_list().await.unwrap();
        let id = listed[0].id;

        backend
            .files_edit(id, FileUpdate::new().with_title("Renamed"))
            .await
            .unwrap();

        let reloaded = MockBackend::new(storage).unwrap().with_latency(Duration::ZERO);
        let listed = reloaded.files_list().await.unwrap();
        assert_eq!(listed[0].title, "Renamed");
    }
}
