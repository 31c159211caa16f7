//! Trash use-case facade.
//!
//! # Responsibility
//! - Expose every trash verb (soft-delete, restore, purge, list, count,
//!   empty) behind one entry point for request layers.
//! - Own soft-delete dispatch; delegate the rest to the recovery engine, the
//!   purge engine and the trash catalog.
//!
//! # Invariants
//! - The facade holds no state besides the connection.
//! - Owner ids are passed per call, never captured.

use crate::model::entity::{EntityKind, EntityRef};
use crate::model::trash::TrashRecord;
use crate::repo::folder_store::SqliteFolderStore;
use crate::repo::journal_store::SqliteJournalStore;
use crate::repo::lifecycle::EntityStore;
use crate::repo::note_store::SqliteNoteStore;
use crate::repo::task_store::SqliteTaskStore;
use crate::service::catalog::TrashCatalog;
use crate::service::error::{require_owner, TrashServiceResult};
use crate::service::purge::{EmptyTrashReport, PurgeEngine};
use crate::service::recovery::{RecoveryEngine, RestoreReport};
use log::{error, info};
use rusqlite::Connection;

/// Facade over the trash engines for one connection.
pub struct TrashService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TrashService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Moves one active entity to the trash.
    ///
    /// Returns `false` when the entity is missing, foreign, or already
    /// trashed. Soft-deleting a folder leaves its notes untouched.
    pub fn soft_delete(&self, target: EntityRef, owner_id: &str) -> TrashServiceResult<bool> {
        let owner_id = require_owner(owner_id)?;
        let result = self.dispatch_soft_delete(target, owner_id);
        match &result {
            Ok(trashed) => info!(
                "event=trash_soft_delete module=trash status=ok kind={} trashed={}",
                target.kind(),
                trashed
            ),
            Err(err) => error!(
                "event=trash_soft_delete module=trash status=error kind={} error={}",
                target.kind(),
                err
            ),
        }
        result
    }

    /// Restores one trashed entity; folders cascade to their trashed notes.
    pub fn restore(&self, target: EntityRef, owner_id: &str) -> TrashServiceResult<RestoreReport> {
        RecoveryEngine::new(self.conn).restore(target, owner_id)
    }

    /// Permanently deletes one trashed entity.
    pub fn purge(&self, target: EntityRef, owner_id: &str) -> TrashServiceResult<bool> {
        PurgeEngine::new(self.conn).purge(target, owner_id)
    }

    /// Permanently deletes every trashed entity of `owner_id`.
    pub fn empty_trash(&self, owner_id: &str) -> TrashServiceResult<EmptyTrashReport> {
        PurgeEngine::new(self.conn).empty_trash_with_report(owner_id)
    }

    /// Lists the owner's trash, newest first, optionally narrowed to one kind.
    pub fn list(
        &self,
        owner_id: &str,
        kind: Option<EntityKind>,
    ) -> TrashServiceResult<Vec<TrashRecord>> {
        let catalog = TrashCatalog::new(self.conn);
        match kind {
            Some(kind) => catalog.list_kind(owner_id, kind),
            None => catalog.list(owner_id),
        }
    }

    /// Counts the owner's trashed entities across all kinds.
    pub fn count(&self, owner_id: &str) -> TrashServiceResult<u64> {
        TrashCatalog::new(self.conn).count(owner_id)
    }

    fn dispatch_soft_delete(&self, target: EntityRef, owner_id: &str) -> TrashServiceResult<bool> {
        let trashed = match target {
            EntityRef::Note(id) => SqliteNoteStore::try_new(self.conn)?.soft_delete(id, owner_id)?,
            EntityRef::Task(id) => SqliteTaskStore::try_new(self.conn)?.soft_delete(id, owner_id)?,
            EntityRef::Folder(id) => {
                SqliteFolderStore::try_new(self.conn)?.soft_delete(id, owner_id)?
            }
            EntityRef::JournalEntry(date) => {
                SqliteJournalStore::try_new(self.conn)?.soft_delete(date, owner_id)?
            }
        };
        Ok(trashed)
    }
}
