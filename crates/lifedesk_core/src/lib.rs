//! Core trash subsystem for LifeDesk.
//!
//! Notes, tasks, folders and journal entries share one soft-delete
//! lifecycle: Active → Trashed → (Active | Purged). This crate owns that
//! state machine, the per-kind stores that persist it, and the engines that
//! list, restore and purge trashed entities.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entity::{EntityId, EntityKind, EntityRef, EntityRefError};
pub use model::records::{Folder, JournalEntry, Lifecycle, LifecycleState, Note, Task, TaskStatus};
pub use model::trash::{TrashExtra, TrashRecord};
pub use repo::folder_store::SqliteFolderStore;
pub use repo::journal_store::SqliteJournalStore;
pub use repo::lifecycle::EntityStore;
pub use repo::note_store::SqliteNoteStore;
pub use repo::task_store::SqliteTaskStore;
pub use repo::{RepoError, RepoResult};
pub use service::catalog::TrashCatalog;
pub use service::error::{TrashServiceError, TrashServiceResult};
pub use service::purge::{EmptyTrashReport, PurgeEngine};
pub use service::recovery::{RecoveryEngine, RestoreReport};
pub use service::trash_service::TrashService;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
