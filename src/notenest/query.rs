//! Derived views over the file collection.
//!
//! [`search`] is a pure function: it never mutates its input, and the same
//! inputs always produce the same output. The wall clock enters only
//! through the explicit `now` argument.

use chrono::{DateTime, Duration, Utc};

use crate::model::FileRecord;

/// Upload-date window, inclusive at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recency {
    #[default]
    AllTime,
    PastWeek,
    PastMonth,
    PastThreeMonths,
}

impl Recency {
    fn window(self) -> Option<Duration> {
        match self {
            Recency::AllTime => None,
            Recency::PastWeek => Some(Duration::days(7)),
            Recency::PastMonth => Some(Duration::days(30)),
            Recency::PastThreeMonths => Some(Duration::days(90)),
        }
    }
}

/// Search criteria. The default query matches everything.
#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    keyword: Option<String>,
    subject: Option<String>,
    recency: Recency,
}

impl FileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match against title, subject, and
    /// uploader name. An empty keyword matches everything.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Exact subject match.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_recency(mut self, recency: Recency) -> Self {
        self.recency = recency;
        self
    }

    /// Evaluate against the current wall clock.
    pub fn apply(&self, files: &[FileRecord]) -> Vec<FileRecord> {
        search(files, self, Utc::now())
    }

    fn matches(&self, file: &FileRecord, now: DateTime<Utc>) -> bool {
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            if !needle.is_empty()
                && !file.title.to_lowercase().contains(&needle)
                && !file.subject.to_lowercase().contains(&needle)
                && !file.uploader_name.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(subject) = &self.subject {
            if file.subject != *subject {
                return false;
            }
        }
        if let Some(window) = self.recency.window() {
            if file.uploaded_at < now - window {
                return false;
            }
        }
        true
    }
}

/// Filter `files` by `query`, sorted by upload date descending. The sort is
/// stable, so records sharing a timestamp keep their collection order.
pub fn search(files: &[FileRecord], query: &FileQuery, now: DateTime<Utc>) -> Vec<FileRecord> {
    let mut matched: Vec<FileRecord> = files
        .iter()
        .filter(|f| query.matches(f, now))
        .cloned()
        .collect();
    matched.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    matched
}

/// Distinct subjects present in the collection, sorted, for filter
/// dropdowns.
pub fn subjects(files: &[FileRecord]) -> Vec<String> {
    let mut subjects: Vec<String> = files.iter().map(|f| f.subject.clone()).collect();
    subjects.sort();
    subjects.dedup();
    subjects
}
