use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{NestError, Result};

/// Largest upload the portal accepts (130 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 130 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Student,
    Faculty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub section: String,
    pub profile_picture_url: Option<String>,
}

/// Signup payload; the backend assigns the id.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub section: String,
    pub profile_picture_url: Option<String>,
}

impl UserDraft {
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(NestError::Validation("full name is required".to_string()));
        }
        if !self.email.contains('@') {
            return Err(NestError::Validation(format!(
                "not a valid email address: {}",
                self.email
            )));
        }
        Ok(())
    }

    pub fn into_user(self) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: self.full_name,
            email: self.email,
            role: self.role,
            section: self.section,
            profile_picture_url: self.profile_picture_url,
        }
    }
}

/// Partial profile edit. Email and role are fixed at signup.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub section: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl UserUpdate {
    pub fn apply(&self, user: &mut User) {
        if let Some(full_name) = &self.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(section) = &self.section {
            user.section = section.clone();
        }
        if let Some(url) = &self.profile_picture_url {
            user.profile_picture_url = Some(url.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeCategory {
    Document,
    Spreadsheet,
    Image,
    Pdf,
    Other,
}

impl MimeCategory {
    /// Classify by filename extension, the same way the upload form does.
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => MimeCategory::Pdf,
            "doc" | "docx" => MimeCategory::Document,
            "xls" | "xlsx" => MimeCategory::Spreadsheet,
            "jpg" | "jpeg" | "png" | "gif" => MimeCategory::Image,
            _ => MimeCategory::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    pub filename: String,
    pub size_bytes: u64,
    pub mime_category: MimeCategory,
    pub uploader_id: Uuid,
    pub uploader_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub tags: Vec<String>,
    /// Reference to the actual bytes. Opaque here: the catalog never
    /// inspects or transports file content.
    pub content_location: String,
}

impl FileRecord {
    /// Optimistic local record for a draft still awaiting backend
    /// confirmation. The id is client-generated and replaced once the
    /// backend answers.
    pub(crate) fn provisional(draft: &FileDraft, uploader: &User) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title.clone(),
            subject: draft.subject.clone(),
            filename: draft.filename.clone(),
            size_bytes: draft.size_bytes,
            mime_category: MimeCategory::from_filename(&draft.filename),
            uploader_id: uploader.id,
            uploader_name: uploader.full_name.clone(),
            uploaded_at: Utc::now(),
            tags: draft.tags.clone(),
            content_location: String::new(),
        }
    }
}

/// Upload metadata. Backend-assigned fields (id, upload time, content
/// location) are absent on purpose.
#[derive(Debug, Clone)]
pub struct FileDraft {
    pub title: String,
    pub subject: String,
    pub filename: String,
    pub size_bytes: u64,
    pub tags: Vec<String>,
}

impl FileDraft {
    pub fn new(
        title: impl Into<String>,
        subject: impl Into<String>,
        filename: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            title: title.into(),
            subject: subject.into(),
            filename: filename.into(),
            size_bytes,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Rejects bad drafts before any state is touched.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(NestError::Validation("title is required".to_string()));
        }
        if self.filename.trim().is_empty() {
            return Err(NestError::Validation("filename is required".to_string()));
        }
        if self.size_bytes == 0 {
            return Err(NestError::Validation("file is empty".to_string()));
        }
        if self.size_bytes > MAX_FILE_SIZE_BYTES {
            return Err(NestError::Validation(format!(
                "file exceeds the {} limit",
                format_size(MAX_FILE_SIZE_BYTES)
            )));
        }
        Ok(())
    }
}

/// Partial edit of the three mutable fields. Everything else is immutable
/// once uploaded.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl FileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn apply(&self, record: &mut FileRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(subject) = &self.subject {
            record.subject = subject.clone();
        }
        if let Some(tags) = &self.tags {
            record.tags = tags.clone();
        }
    }
}

/// Human-readable size for display ("1.21 MB", "512 B").
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_extensions() {
        assert_eq!(MimeCategory::from_filename("notes.PDF"), MimeCategory::Pdf);
        assert_eq!(
            MimeCategory::from_filename("sheet.xlsx"),
            MimeCategory::Spreadsheet
        );
        assert_eq!(
            MimeCategory::from_filename("essay.docx"),
            MimeCategory::Document
        );
        assert_eq!(
            MimeCategory::from_filename("diagram.png"),
            MimeCategory::Image
        );
        assert_eq!(
            MimeCategory::from_filename("archive.zip"),
            MimeCategory::Other
        );
        assert_eq!(MimeCategory::from_filename("noext"), MimeCategory::Other);
    }

    #[test]
    fn rejects_oversized_draft() {
        let draft = FileDraft::new("Big", "OS", "big.pdf", MAX_FILE_SIZE_BYTES + 1);
        assert!(matches!(draft.validate(), Err(NestError::Validation(_))));
    }

    #[test]
    fn rejects_blank_title() {
        let draft = FileDraft::new("   ", "OS", "notes.pdf", 1024);
        assert!(matches!(draft.validate(), Err(NestError::Validation(_))));
    }

    #[test]
    fn accepts_reasonable_draft() {
        let draft = FileDraft::new("Notes", "OS", "notes.pdf", 1024)
            .with_tags(vec!["unit2".to_string()]);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn update_touches_only_mutable_fields() {
        let uploader = UserDraft {
            full_name: "Dr. Bob Faculty".to_string(),
            email: "faculty@test.com".to_string(),
            role: UserRole::Faculty,
            section: "CSE-DS".to_string(),
            profile_picture_url: None,
        }
        .into_user();
        let draft = FileDraft::new("Old", "DBMS", "dbms.pdf", 1024);
        let mut record = FileRecord::provisional(&draft, &uploader);
        let original_filename = record.filename.clone();

        FileUpdate::new()
            .with_title("New")
            .with_tags(vec!["revised".to_string()])
            .apply(&mut record);

        assert_eq!(record.title, "New");
        assert_eq!(record.tags, vec!["revised".to_string()]);
        assert_eq!(record.subject, "DBMS");
        assert_eq!(record.filename, original_filename);
    }

    #[test]
    fn formats_sizes_like_the_ui_expects() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(123_456), "120.56 KB");
    }
}
