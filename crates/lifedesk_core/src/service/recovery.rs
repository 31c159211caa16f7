//! Recovery engine.
//!
//! # Responsibility
//! - Restore one trashed entity, dispatched by kind.
//! - Cascade folder restores to the folder's trashed notes.
//!
//! # Invariants
//! - A folder restore and its cascade share one atomic unit: an IMMEDIATE
//!   transaction, or a savepoint inside a caller's transaction.
//! - Each cascaded note restore is its own savepoint; one failing note never
//!   undoes the folder or its siblings.
//! - Restoring an active entity is `restored = false`, never an error.

use crate::model::entity::{EntityId, EntityRef};
use crate::repo::folder_store::SqliteFolderStore;
use crate::repo::journal_store::SqliteJournalStore;
use crate::repo::lifecycle::{run_atomic, EntityStore};
use crate::repo::note_store::SqliteNoteStore;
use crate::repo::task_store::SqliteTaskStore;
use crate::service::error::{require_owner, TrashServiceError, TrashServiceResult};
use log::{error, info, warn};
use rusqlite::Connection;
use std::time::Instant;

/// Outcome of one restore request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Whether the addressed entity transitioned Trashed → Active.
    pub restored: bool,
    /// Notes brought back by a folder cascade. Always 0 for other kinds.
    pub cascaded_notes: u64,
}

/// Dispatches restore requests to entity stores.
pub struct RecoveryEngine<'conn> {
    conn: &'conn Connection,
}

impl<'conn> RecoveryEngine<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Restores one trashed entity owned by `owner_id`.
    ///
    /// # Errors
    /// - `InvalidArgument` for a blank owner id.
    /// - `ConstraintViolation` when the store reports a uniqueness failure.
    ///
    /// A journal page whose day already has an active page stays trashed and
    /// reports `restored = false`, so retries are safe.
    /// - `Repo` for storage failures.
    pub fn restore(
        &self,
        target: EntityRef,
        owner_id: &str,
    ) -> TrashServiceResult<RestoreReport> {
        let owner_id = require_owner(owner_id)?;
        let started_at = Instant::now();
        let result = self.dispatch(target, owner_id);
        self.finish(target, started_at, result)
    }

    fn dispatch(&self, target: EntityRef, owner_id: &str) -> TrashServiceResult<RestoreReport> {
        let restored = match target {
            EntityRef::Note(id) => SqliteNoteStore::try_new(self.conn)?.restore(id, owner_id)?,
            EntityRef::Task(id) => SqliteTaskStore::try_new(self.conn)?.restore(id, owner_id)?,
            EntityRef::JournalEntry(date) => {
                SqliteJournalStore::try_new(self.conn)?.restore(date, owner_id)?
            }
            EntityRef::Folder(id) => return self.restore_folder(id, owner_id),
        };
        Ok(RestoreReport {
            restored,
            cascaded_notes: 0,
        })
    }

    fn restore_folder(
        &self,
        folder_uuid: EntityId,
        owner_id: &str,
    ) -> TrashServiceResult<RestoreReport> {
        let report = run_atomic(self.conn, "folder_restore", |conn| {
            if !SqliteFolderStore::try_new(conn)?.restore(folder_uuid, owner_id)? {
                return Ok(RestoreReport::default());
            }

            let notes = SqliteNoteStore::try_new(conn)?;
            let mut cascaded_notes = 0;
            for note_uuid in notes.list_trashed_ids_in_folder(folder_uuid, owner_id)? {
                match run_atomic(conn, "cascade_note_restore", |_| {
                    notes.restore(note_uuid, owner_id)
                }) {
                    Ok(true) => cascaded_notes += 1,
                    Ok(false) => {}
                    Err(err) => warn!(
                        "event=trash_cascade module=trash status=error kind=note error={}",
                        err
                    ),
                }
            }

            Ok(RestoreReport {
                restored: true,
                cascaded_notes,
            })
        })?;
        Ok(report)
    }

    fn finish(
        &self,
        target: EntityRef,
        started_at: Instant,
        result: TrashServiceResult<RestoreReport>,
    ) -> TrashServiceResult<RestoreReport> {
        match &result {
            Ok(report) => info!(
                "event=trash_restore module=trash status=ok kind={} restored={} cascaded_notes={} duration_ms={}",
                target.kind(),
                report.restored,
                report.cascaded_notes,
                started_at.elapsed().as_millis()
            ),
            Err(TrashServiceError::ConstraintViolation(_)) => warn!(
                "event=trash_restore module=trash status=rejected kind={} error_code=constraint_violation duration_ms={}",
                target.kind(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=trash_restore module=trash status=error kind={} duration_ms={} error={}",
                target.kind(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}
