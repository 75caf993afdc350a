//! # Note Nest Core
//!
//! Note Nest is an academic file-sharing portal: faculty upload tagged
//! course files, students search, bookmark, and download them. This crate
//! is the **UI-agnostic core** of that portal—state containers and derived
//! views only, with no rendering, routing, or terminal assumptions.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Portal facade (portal.rs)                                  │
//! │  - One signed-in session's worth of wired-up state          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  State containers (session.rs, repository.rs, prefs.rs)     │
//! │  - Optimistic mutation, read-your-writes, rollback          │
//! │  - Pure derived views in query.rs                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Backend seam (backend.rs)                                  │
//! │  - Abstract Backend trait                                   │
//! │  - MockBackend (simulated latency), real client later       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage layer (storage/)                                   │
//! │  - StorageAdapter trait: typed key-value, forgiving reads   │
//! │  - JsonFileStorage (durable), MemoryStorage (tests)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key decisions
//!
//! - **Optimistic mutation with reconciliation.** `create` and `update`
//!   change the in-memory collection before the backend answers; a failure
//!   rolls the change back. `delete` waits for confirmation. See
//!   [`repository::FileRepository`].
//! - **Every mutation returns a `Result`.** There is no fire-and-forget
//!   path; callers decide what to ignore.
//! - **No process-wide state.** Repositories, sessions, and preference
//!   stores are explicit instances; two portals over different storage
//!   roots never interact.
//! - **Preferences are partitioned by user id**, and ids pointing at
//!   deleted files are filtered at read time rather than cascaded.
//!
//! ## Module overview
//!
//! - [`portal`]: the facade—entry point for a whole session
//! - [`repository`]: the authoritative file collection
//! - [`query`]: pure filter/sort views over it
//! - [`prefs`]: per-user bookmarks and download history
//! - [`session`]: sign-in state
//! - [`backend`]: the simulated remote service and its trait
//! - [`storage`]: key-value persistence
//! - [`model`]: records, drafts, partial updates
//! - [`error`]: error types

pub mod backend;
pub mod error;
pub mod model;
pub mod portal;
pub mod prefs;
pub mod query;
pub mod repository;
pub mod session;
pub mod storage;

pub use backend::{Backend, MockBackend, DEFAULT_LATENCY};
pub use error::{NestError, Result};
pub use model::{
    format_size, FileDraft, FileRecord, FileUpdate, MimeCategory, User, UserDraft, UserRole,
    UserUpdate, MAX_FILE_SIZE_BYTES,
};
pub use portal::Portal;
pub use prefs::PreferenceStore;
pub use query::{search, subjects, FileQuery, Recency};
pub use repository::FileRepository;
pub use session::Session;
pub use storage::json::JsonFileStorage;
pub use storage::memory::MemoryStorage;
pub use storage::StorageAdapter;
