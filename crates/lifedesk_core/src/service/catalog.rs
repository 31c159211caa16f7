//! Trash catalog.
//!
//! # Responsibility
//! - Merge trashed entities of all four kinds into one ordered listing.
//! - Count trashed entities across kinds.
//!
//! # Invariants
//! - Read-only; never mutates entity rows.
//! - All per-kind reads of one call observe the same snapshot.
//! - Listing order is `deleted_at DESC`, then kind, then id.

use crate::model::entity::EntityKind;
use crate::model::trash::TrashRecord;
use crate::repo::folder_store::SqliteFolderStore;
use crate::repo::journal_store::SqliteJournalStore;
use crate::repo::lifecycle::EntityStore;
use crate::repo::note_store::SqliteNoteStore;
use crate::repo::task_store::SqliteTaskStore;
use crate::repo::RepoResult;
use crate::service::error::{require_owner, TrashServiceResult};
use log::debug;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Aggregated, read-only view over every entity store's trash.
pub struct TrashCatalog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TrashCatalog<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Lists every trashed entity owned by `owner_id`, newest first.
    pub fn list(&self, owner_id: &str) -> TrashServiceResult<Vec<TrashRecord>> {
        let owner_id = require_owner(owner_id)?;
        let mut records = self.with_snapshot(|conn| {
            let mut records = Vec::new();
            for kind in EntityKind::ALL {
                records.extend(trashed_of_kind(conn, kind, owner_id)?);
            }
            Ok(records)
        })?;
        records.sort_by(TrashRecord::catalog_order);

        debug!(
            "event=trash_list module=trash status=ok items={}",
            records.len()
        );
        Ok(records)
    }

    /// Lists trashed entities of one kind owned by `owner_id`, newest first.
    pub fn list_kind(
        &self,
        owner_id: &str,
        kind: EntityKind,
    ) -> TrashServiceResult<Vec<TrashRecord>> {
        let owner_id = require_owner(owner_id)?;
        let mut records = trashed_of_kind(self.conn, kind, owner_id)?;
        records.sort_by(TrashRecord::catalog_order);
        Ok(records)
    }

    /// Counts trashed entities of every kind owned by `owner_id`.
    pub fn count(&self, owner_id: &str) -> TrashServiceResult<u64> {
        let owner_id = require_owner(owner_id)?;
        self.with_snapshot(|conn| {
            let mut total = 0;
            for kind in EntityKind::ALL {
                total += trashed_count_of_kind(conn, kind, owner_id)?;
            }
            Ok(total)
        })
    }

    fn with_snapshot<T>(
        &self,
        read: impl FnOnce(&Connection) -> RepoResult<T>,
    ) -> TrashServiceResult<T> {
        if !self.conn.is_autocommit() {
            return Ok(read(self.conn)?);
        }
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let value = read(&*tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn trashed_of_kind(
    conn: &Connection,
    kind: EntityKind,
    owner_id: &str,
) -> RepoResult<Vec<TrashRecord>> {
    match kind {
        EntityKind::Note => SqliteNoteStore::try_new(conn)?.list_trashed(owner_id),
        EntityKind::Task => SqliteTaskStore::try_new(conn)?.list_trashed(owner_id),
        EntityKind::Folder => SqliteFolderStore::try_new(conn)?.list_trashed(owner_id),
        EntityKind::JournalEntry => SqliteJournalStore::try_new(conn)?.list_trashed(owner_id),
    }
}

fn trashed_count_of_kind(conn: &Connection, kind: EntityKind, owner_id: &str) -> RepoResult<u64> {
    match kind {
        EntityKind::Note => SqliteNoteStore::try_new(conn)?.count_trashed(owner_id),
        EntityKind::Task => SqliteTaskStore::try_new(conn)?.count_trashed(owner_id),
        EntityKind::Folder => SqliteFolderStore::try_new(conn)?.count_trashed(owner_id),
        EntityKind::JournalEntry => SqliteJournalStore::try_new(conn)?.count_trashed(owner_id),
    }
}
