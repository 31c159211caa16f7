//! Task store.
//!
//! Tasks have no structural relationship to other kinds, so every lifecycle
//! primitive here is a single-row transition.

use crate::model::entity::{EntityId, EntityKind};
use crate::model::records::{Task, TaskStatus};
use crate::model::trash::{TrashExtra, TrashRecord};
use crate::repo::lifecycle::{
    count_trashed_in, ensure_store_ready, parse_lifecycle, parse_uuid, purge_all_trashed_in,
    purge_by_uuid, required_deleted_at, restore_by_uuid, soft_delete_by_uuid, EntityStore,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const TABLE: &str = "tasks";

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    title,
    status,
    is_deleted,
    deleted_at,
    created_at,
    updated_at
FROM tasks";

/// SQLite-backed task store.
pub struct SqliteTaskStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_store_ready(conn, TABLE)?;
        Ok(Self { conn })
    }

    /// Creates one active task.
    pub fn create_task(&self, owner_id: &str, title: &str, status: TaskStatus) -> RepoResult<Task> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tasks (uuid, owner_id, title, status) VALUES (?1, ?2, ?3, ?4);",
            params![uuid.to_string(), owner_id, title, status.as_db()],
        )?;
        self.get_task(uuid, owner_id, false)?.ok_or_else(|| {
            RepoError::InvalidData("created task not found in read-back".to_string())
        })
    }

    /// Loads one task, optionally including trashed rows.
    pub fn get_task(
        &self,
        id: EntityId,
        owner_id: &str,
        include_deleted: bool,
    ) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE uuid = ?1
               AND owner_id = ?2
               AND (?3 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), owner_id, include_deleted])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    /// Lists active tasks, newest update first.
    pub fn list_active_tasks(&self, owner_id: &str) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE owner_id = ?1
               AND is_deleted = 0
             ORDER BY updated_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([owner_id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

impl EntityStore for SqliteTaskStore<'_> {
    type Key = EntityId;
    const KIND: EntityKind = EntityKind::Task;

    fn soft_delete(&self, key: EntityId, owner_id: &str) -> RepoResult<bool> {
        soft_delete_by_uuid(self.conn, TABLE, key, owner_id)
    }

    fn restore(&self, key: EntityId, owner_id: &str) -> RepoResult<bool> {
        restore_by_uuid(self.conn, TABLE, key, owner_id)
    }

    fn purge(&self, key: EntityId, owner_id: &str) -> RepoResult<bool> {
        purge_by_uuid(self.conn, TABLE, key, owner_id)
    }

    fn purge_all_trashed(&self, owner_id: &str) -> RepoResult<u64> {
        purge_all_trashed_in(self.conn, TABLE, owner_id)
    }

    fn list_trashed(&self, owner_id: &str) -> RepoResult<Vec<TrashRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, title, status, deleted_at
             FROM tasks
             WHERE owner_id = ?1
               AND is_deleted = 1
             ORDER BY deleted_at DESC, uuid ASC;",
        )?;
        let mut rows = stmt.query([owner_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            parse_uuid(&uuid_text, "tasks.uuid")?;
            records.push(TrashRecord {
                kind: Self::KIND,
                id: uuid_text,
                title: row.get("title")?,
                deleted_at: required_deleted_at(row, TABLE)?,
                extra: TrashExtra::Task {
                    status: parse_status(row)?,
                },
            });
        }
        Ok(records)
    }

    fn count_trashed(&self, owner_id: &str) -> RepoResult<u64> {
        count_trashed_in(self.conn, TABLE, owner_id)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Task {
        uuid: parse_uuid(&uuid_text, "tasks.uuid")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        status: parse_status(row)?,
        lifecycle: parse_lifecycle(row, TABLE)?,
    })
}

fn parse_status(row: &Row<'_>) -> RepoResult<TaskStatus> {
    let value: String = row.get("status")?;
    TaskStatus::parse_db(&value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{value}` in tasks.status"))
    })
}
