//! Purge engine.
//!
//! # Responsibility
//! - Permanently delete one trashed entity, dispatched by kind.
//! - Empty the whole trash of one owner in a single transaction.
//!
//! # Invariants
//! - Only trashed rows are purged; active rows are untouched.
//! - Purging a folder orphans its notes (reference nulled) instead of
//!   purging them.
//! - `empty_trash` is all-or-nothing: on error nothing is deleted.

use crate::model::entity::{EntityKind, EntityRef};
use crate::repo::folder_store::SqliteFolderStore;
use crate::repo::journal_store::SqliteJournalStore;
use crate::repo::lifecycle::{run_atomic, EntityStore};
use crate::repo::note_store::SqliteNoteStore;
use crate::repo::task_store::SqliteTaskStore;
use crate::service::error::{require_owner, TrashServiceResult};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

/// Per-kind row counts removed by one `empty_trash` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyTrashReport {
    pub notes: u64,
    pub tasks: u64,
    pub folders: u64,
    pub journal_entries: u64,
}

impl EmptyTrashReport {
    pub fn total(&self) -> u64 {
        self.notes + self.tasks + self.folders + self.journal_entries
    }

    pub fn count_for(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Note => self.notes,
            EntityKind::Task => self.tasks,
            EntityKind::Folder => self.folders,
            EntityKind::JournalEntry => self.journal_entries,
        }
    }
}

/// Dispatches permanent deletion to entity stores.
pub struct PurgeEngine<'conn> {
    conn: &'conn Connection,
}

impl<'conn> PurgeEngine<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Purges one trashed entity owned by `owner_id`.
    ///
    /// Returns `false` when the entity is missing, foreign, or still active.
    pub fn purge(&self, target: EntityRef, owner_id: &str) -> TrashServiceResult<bool> {
        let owner_id = require_owner(owner_id)?;
        let started_at = Instant::now();

        let result = self.dispatch(target, owner_id);
        match &result {
            Ok(purged) => info!(
                "event=trash_purge module=trash status=ok kind={} purged={} duration_ms={}",
                target.kind(),
                purged,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=trash_purge module=trash status=error kind={} duration_ms={} error={}",
                target.kind(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Purges every trashed entity of every kind owned by `owner_id`.
    ///
    /// Returns the number of rows removed.
    pub fn empty_trash(&self, owner_id: &str) -> TrashServiceResult<u64> {
        self.empty_trash_with_report(owner_id)
            .map(|report| report.total())
    }

    /// Same as `empty_trash`, with per-kind counts.
    pub fn empty_trash_with_report(&self, owner_id: &str) -> TrashServiceResult<EmptyTrashReport> {
        let owner_id = require_owner(owner_id)?;
        let started_at = Instant::now();

        let result = self.empty_in_transaction(owner_id);
        match &result {
            Ok(report) => info!(
                "event=trash_empty module=trash status=ok notes={} tasks={} folders={} journal_entries={} total={} duration_ms={}",
                report.notes,
                report.tasks,
                report.folders,
                report.journal_entries,
                report.total(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=trash_empty module=trash status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn dispatch(&self, target: EntityRef, owner_id: &str) -> TrashServiceResult<bool> {
        let purged = match target {
            EntityRef::Note(id) => SqliteNoteStore::try_new(self.conn)?.purge(id, owner_id)?,
            EntityRef::Task(id) => SqliteTaskStore::try_new(self.conn)?.purge(id, owner_id)?,
            EntityRef::Folder(id) => SqliteFolderStore::try_new(self.conn)?.purge(id, owner_id)?,
            EntityRef::JournalEntry(date) => {
                SqliteJournalStore::try_new(self.conn)?.purge(date, owner_id)?
            }
        };
        Ok(purged)
    }

    fn empty_in_transaction(&self, owner_id: &str) -> TrashServiceResult<EmptyTrashReport> {
        let report = run_atomic(self.conn, "empty_trash", |conn| {
            Ok(EmptyTrashReport {
                notes: SqliteNoteStore::try_new(conn)?.purge_all_trashed(owner_id)?,
                tasks: SqliteTaskStore::try_new(conn)?.purge_all_trashed(owner_id)?,
                folders: SqliteFolderStore::try_new(conn)?.purge_all_trashed(owner_id)?,
                journal_entries: SqliteJournalStore::try_new(conn)?.purge_all_trashed(owner_id)?,
            })
        })?;
        Ok(report)
    }
}
