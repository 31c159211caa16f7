//! Note store.
//!
//! # Responsibility
//! - Persist notes and their soft-delete lifecycle.
//! - Answer folder-scoped lookups needed by the folder restore cascade.
//!
//! # Invariants
//! - A note may only be filed into an active folder of the same owner.
//! - Trash records resolve the folder name only while the folder row exists.

use crate::model::entity::{EntityId, EntityKind};
use crate::model::records::Note;
use crate::model::trash::{TrashExtra, TrashRecord};
use crate::repo::folder_store::SqliteFolderStore;
use crate::repo::lifecycle::{
    count_trashed_in, ensure_store_ready, parse_lifecycle, parse_uuid, purge_all_trashed_in,
    purge_by_uuid, required_deleted_at, restore_by_uuid, soft_delete_by_uuid, EntityStore,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const TABLE: &str = "notes";

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    title,
    content,
    folder_uuid,
    is_deleted,
    deleted_at,
    created_at,
    updated_at
FROM notes";

/// SQLite-backed note store.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_store_ready(conn, TABLE)?;
        Ok(Self { conn })
    }

    /// Creates one active note, optionally filed into a folder.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when `folder_uuid` is not an active folder of
    ///   `owner_id`.
    pub fn create_note(
        &self,
        owner_id: &str,
        title: &str,
        content: &str,
        folder_uuid: Option<EntityId>,
    ) -> RepoResult<Note> {
        if let Some(folder_uuid) = folder_uuid {
            let folders = SqliteFolderStore::try_new(self.conn)?;
            if folders.get_folder(folder_uuid, owner_id, false)?.is_none() {
                return Err(RepoError::NotFound(format!("folder {folder_uuid}")));
            }
        }

        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO notes (uuid, owner_id, title, content, folder_uuid)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                uuid.to_string(),
                owner_id,
                title,
                content,
                folder_uuid.map(|value| value.to_string()),
            ],
        )?;
        self.get_note(uuid, owner_id, false)?.ok_or_else(|| {
            RepoError::InvalidData("created note not found in read-back".to_string())
        })
    }

    /// Loads one note, optionally including trashed rows.
    pub fn get_note(
        &self,
        id: EntityId,
        owner_id: &str,
        include_deleted: bool,
    ) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE uuid = ?1
               AND owner_id = ?2
               AND (?3 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), owner_id, include_deleted])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    /// Lists active notes, newest update first.
    pub fn list_active_notes(&self, owner_id: &str) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_id = ?1
               AND is_deleted = 0
             ORDER BY updated_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([owner_id])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    /// Lists ids of trashed notes filed into one folder.
    pub fn list_trashed_ids_in_folder(
        &self,
        folder_uuid: EntityId,
        owner_id: &str,
    ) -> RepoResult<Vec<EntityId>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid
             FROM notes
             WHERE folder_uuid = ?1
               AND owner_id = ?2
               AND is_deleted = 1
             ORDER BY deleted_at DESC, uuid ASC;",
        )?;
        let mut rows = stmt.query(params![folder_uuid.to_string(), owner_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.push(parse_uuid(&value, "notes.uuid")?);
        }
        Ok(ids)
    }
}

impl EntityStore for SqliteNoteStore<'_> {
    type Key = EntityId;
    const KIND: EntityKind = EntityKind::Note;

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
            "SELECT
                n.uuid AS uuid,
                n.title AS title,
                n.deleted_at AS deleted_at,
                f.name AS folder_name
             FROM notes n
             LEFT JOIN folders f
               ON f.uuid = n.folder_uuid
              AND f.owner_id = n.owner_id
             WHERE n.owner_id = ?1
               AND n.is_deleted = 1
             ORDER BY n.deleted_at DESC, n.uuid ASC;",
        )?;
        let mut rows = stmt.query([owner_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            parse_uuid(&uuid_text, "notes.uuid")?;
            records.push(TrashRecord {
                kind: Self::KIND,
                id: uuid_text,
                title: row.get("title")?,
                deleted_at: required_deleted_at(row, TABLE)?,
                extra: TrashExtra::Note {
                    folder_name: row.get("folder_name")?,
                },
            });
        }
        Ok(records)
    }

    fn count_trashed(&self, owner_id: &str) -> RepoResult<u64> {
        count_trashed_in(self.conn, TABLE, owner_id)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let folder_uuid = row
        .get::<_, Option<String>>("folder_uuid")?
        .map(|value| parse_uuid(&value, "notes.folder_uuid"))
        .transpose()?;
    Ok(Note {
        uuid: parse_uuid(&uuid_text, "notes.uuid")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        folder_uuid,
        lifecycle: parse_lifecycle(row, TABLE)?,
    })
}
