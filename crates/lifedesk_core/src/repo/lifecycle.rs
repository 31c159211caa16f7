//! Shared soft-delete state machine for entity tables.
//!
//! # Responsibility
//! - Define the `EntityStore` trait implemented once per entity kind.
//! - Provide the conditional SQL transitions reused by uuid-keyed tables.
//! - Provide atomic-unit helpers that compose with an outer transaction.
//!
//! # Invariants
//! - Transitions are single conditional statements guarded by the expected
//!   `is_deleted` value, so concurrent callers on one row see exactly one
//!   winner.
//! - `deleted_at` and `is_deleted` always change together.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::entity::{EntityId, EntityKind};
use crate::model::records::Lifecycle;
use crate::model::trash::TrashRecord;
use crate::repo::{RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::fmt::Display;
use uuid::Uuid;

/// Current time in epoch milliseconds, evaluated by SQLite.
///
/// `'now'` is stable within one statement, so `deleted_at` and `updated_at`
/// written together always match.
pub(crate) const NOW_MS_SQL: &str = "CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER)";

/// Soft-delete lifecycle contract for one entity kind.
///
/// All methods are scoped by `owner_id`. Rows owned by another user, rows in
/// the wrong lifecycle state and missing rows all produce `Ok(false)` (or are
/// skipped by listings); only storage failures and constraint conflicts are
/// errors.
pub trait EntityStore {
    /// Key used to address one entity of this kind.
    type Key: Copy + Display;

    /// Kind served by this store.
    const KIND: EntityKind;

    /// Active → Trashed. Returns `false` when nothing transitioned.
    fn soft_delete(&self, key: Self::Key, owner_id: &str) -> RepoResult<bool>;

    /// Trashed → Active. Returns `false` when nothing transitioned.
    fn restore(&self, key: Self::Key, owner_id: &str) -> RepoResult<bool>;

    /// Permanently removes one trashed entity. Active rows are never purged.
    fn purge(&self, key: Self::Key, owner_id: &str) -> RepoResult<bool>;

    /// Permanently removes every trashed entity of this kind for one owner.
    fn purge_all_trashed(&self, owner_id: &str) -> RepoResult<u64>;

    /// Lists trashed entities for one owner, newest first.
    fn list_trashed(&self, owner_id: &str) -> RepoResult<Vec<TrashRecord>>;

    /// Counts trashed entities for one owner.
    fn count_trashed(&self, owner_id: &str) -> RepoResult<u64>;
}

pub(crate) fn soft_delete_by_uuid(
    conn: &Connection,
    table: &'static str,
    id: EntityId,
    owner_id: &str,
) -> RepoResult<bool> {
    let changed = conn.execute(
        &format!(
            "UPDATE {table}
             SET is_deleted = 1,
                 deleted_at = {NOW_MS_SQL},
                 updated_at = {NOW_MS_SQL}
             WHERE uuid = ?1
               AND owner_id = ?2
               AND is_deleted = 0;"
        ),
        params![id.to_string(), owner_id],
    )?;
    Ok(changed == 1)
}

pub(crate) fn restore_by_uuid(
    conn: &Connection,
    table: &'static str,
    id: EntityId,
    owner_id: &str,
) -> RepoResult<bool> {
    let changed = conn.execute(
        &format!(
            "UPDATE {table}
             SET is_deleted = 0,
                 deleted_at = NULL,
                 updated_at = {NOW_MS_SQL}
             WHERE uuid = ?1
               AND owner_id = ?2
               AND is_deleted = 1;"
        ),
        params![id.to_string(), owner_id],
    )?;
    Ok(changed == 1)
}

pub(crate) fn purge_by_uuid(
    conn: &Connection,
    table: &'static str,
    id: EntityId,
    owner_id: &str,
) -> RepoResult<bool> {
    let changed = conn.execute(
        &format!(
            "DELETE FROM {table}
             WHERE uuid = ?1
               AND owner_id = ?2
               AND is_deleted = 1;"
        ),
        params![id.to_string(), owner_id],
    )?;
    Ok(changed == 1)
}

pub(crate) fn purge_all_trashed_in(
    conn: &Connection,
    table: &'static str,
    owner_id: &str,
) -> RepoResult<u64> {
    let changed = conn.execute(
        &format!(
            "DELETE FROM {table}
             WHERE owner_id = ?1
               AND is_deleted = 1;"
        ),
        [owner_id],
    )?;
    Ok(changed as u64)
}

pub(crate) fn count_trashed_in(
    conn: &Connection,
    table: &'static str,
    owner_id: &str,
) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*)
             FROM {table}
             WHERE owner_id = ?1
               AND is_deleted = 1;"
        ),
        [owner_id],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// Runs `work` as one atomic unit.
///
/// Outside a transaction this opens `BEGIN IMMEDIATE` so the write lock is
/// taken up front. Inside a caller's transaction it becomes a named
/// savepoint, so a failure rolls back only this unit.
pub(crate) fn run_atomic<T>(
    conn: &Connection,
    name: &'static str,
    work: impl FnOnce(&Connection) -> RepoResult<T>,
) -> RepoResult<T> {
    if conn.is_autocommit() {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let value = work(&*tx)?;
        tx.commit()?;
        return Ok(value);
    }

    conn.execute_batch(&format!("SAVEPOINT {name};"))?;
    match work(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE SAVEPOINT {name};"))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = conn.execute_batch(&format!(
                "ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name};"
            )) {
                warn!(
                    "event=savepoint_rollback module=repo status=error savepoint={} error={}",
                    name, rollback_err
                );
            }
            Err(err)
        }
    }
}

/// Reads the shared lifecycle columns from one row.
pub(crate) fn parse_lifecycle(row: &Row<'_>, table: &'static str) -> RepoResult<Lifecycle> {
    let is_deleted = parse_deleted_flag(row.get("is_deleted")?, table)?;
    let deleted_at: Option<i64> = row.get("deleted_at")?;
    if is_deleted != deleted_at.is_some() {
        return Err(RepoError::InvalidData(format!(
            "{table}.deleted_at disagrees with is_deleted={is_deleted}"
        )));
    }
    Ok(Lifecycle {
        is_deleted,
        deleted_at,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Reads `deleted_at` from a row that is known to be trashed.
pub(crate) fn required_deleted_at(row: &Row<'_>, table: &'static str) -> RepoResult<i64> {
    row.get::<_, Option<i64>>("deleted_at")?.ok_or_else(|| {
        RepoError::InvalidData(format!("trashed row in {table} has no deleted_at"))
    })
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<EntityId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn parse_deleted_flag(value: i64, table: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid is_deleted value `{other}` in {table}.is_deleted"
        ))),
    }
}

/// Verifies a connection is migrated and carries the store's table.
pub(crate) fn ensure_store_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }
    Ok(())
}
