//! Folder store.
//!
//! # Responsibility
//! - Persist folders and their soft-delete lifecycle.
//! - Keep the weak note → folder reference resolvable across purges.
//!
//! # Invariants
//! - Purging a folder nulls `notes.folder_uuid` for every referencing note in
//!   the same atomic unit; notes themselves are never purged here.
//! - `note_count` in trash records counts active notes only.

use crate::model::entity::{EntityId, EntityKind};
use crate::model::records::Folder;
use crate::model::trash::{TrashExtra, TrashRecord};
use crate::repo::lifecycle::{
    count_trashed_in, ensure_store_ready, parse_lifecycle, parse_uuid, purge_all_trashed_in,
    required_deleted_at, restore_by_uuid, run_atomic, soft_delete_by_uuid, EntityStore,
};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const TABLE: &str = "folders";

const FOLDER_SELECT_SQL: &str = "SELECT
    uuid,
    owner_id,
    name,
    is_deleted,
    deleted_at,
    created_at,
    updated_at
FROM folders";

/// SQLite-backed folder store.
pub struct SqliteFolderStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFolderStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_store_ready(conn, TABLE)?;
        Ok(Self { conn })
    }

    /// Creates one active folder.
    pub fn create_folder(&self, owner_id: &str, name: &str) -> RepoResult<Folder> {
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO folders (uuid, owner_id, name) VALUES (?1, ?2, ?3);",
            params![uuid.to_string(), owner_id, name],
        )?;
        self.get_folder(uuid, owner_id, false)?.ok_or_else(|| {
            RepoError::InvalidData("created folder not found in read-back".to_string())
        })
    }

    /// Loads one folder, optionally including trashed rows.
    pub fn get_folder(
        &self,
        id: EntityId,
        owner_id: &str,
        include_deleted: bool,
    ) -> RepoResult<Option<Folder>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FOLDER_SELECT_SQL}
             WHERE uuid = ?1
               AND owner_id = ?2
               AND (?3 = 1 OR is_deleted = 0);"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), owner_id, include_deleted])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_folder_row(row)?));
        }
        Ok(None)
    }

    /// Lists active folders by name.
    pub fn list_active_folders(&self, owner_id: &str) -> RepoResult<Vec<Folder>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FOLDER_SELECT_SQL}
             WHERE owner_id = ?1
               AND is_deleted = 0
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([owner_id])?;
        let mut folders = Vec::new();
        while let Some(row) = rows.next()? {
            folders.push(parse_folder_row(row)?);
        }
        Ok(folders)
    }

    /// Returns whether a folder row exists for this owner, in any state.
    pub fn folder_exists(&self, id: EntityId, owner_id: &str) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM folders WHERE uuid = ?1 AND owner_id = ?2;",
                params![id.to_string(), owner_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl EntityStore for SqliteFolderStore<'_> {
    type Key = EntityId;
    const KIND: EntityKind = EntityKind::Folder;

    fn soft_delete(&self, key: EntityId, owner_id: &str) -> RepoResult<bool> {
        soft_delete_by_uuid(self.conn, TABLE, key, owner_id)
    }

    fn restore(&self, key: EntityId, owner_id: &str) -> RepoResult<bool> {
        restore_by_uuid(self.conn, TABLE, key, owner_id)
    }

    fn purge(&self, key: EntityId, owner_id: &str) -> RepoResult<bool> {
        let folder_uuid = key.to_string();
        run_atomic(self.conn, "folder_purge", |conn| {
            let removed = conn.execute(
                "DELETE FROM folders
                 WHERE uuid = ?1
                   AND owner_id = ?2
                   AND is_deleted = 1;",
                params![folder_uuid.as_str(), owner_id],
            )?;
            if removed == 0 {
                return Ok(false);
            }
            conn.execute(
                "UPDATE notes
                 SET folder_uuid = NULL
                 WHERE folder_uuid = ?1;",
                [folder_uuid.as_str()],
            )?;
            Ok(true)
        })
    }

    fn purge_all_trashed(&self, owner_id: &str) -> RepoResult<u64> {
        run_atomic(self.conn, "folder_purge_all", |conn| {
            conn.execute(
                "UPDATE notes
                 SET folder_uuid = NULL
                 WHERE folder_uuid IN (
                    SELECT uuid
                    FROM folders
                    WHERE owner_id = ?1
                      AND is_deleted = 1
                 );",
                [owner_id],
            )?;
            purge_all_trashed_in(conn, TABLE, owner_id)
        })
    }

    fn list_trashed(&self, owner_id: &str) -> RepoResult<Vec<TrashRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                f.uuid AS uuid,
                f.name AS name,
                f.deleted_at AS deleted_at,
                (
                    SELECT COUNT(*)
                    FROM notes n
                    WHERE n.folder_uuid = f.uuid
                      AND n.owner_id = f.owner_id
                      AND n.is_deleted = 0
                ) AS note_count
             FROM folders f
             WHERE f.owner_id = ?1
               AND f.is_deleted = 1
             ORDER BY f.deleted_at DESC, f.uuid ASC;",
        )?;
        let mut rows = stmt.query([owner_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            parse_uuid(&uuid_text, "folders.uuid")?;
            let note_count: i64 = row.get("note_count")?;
            records.push(TrashRecord {
                kind: Self::KIND,
                id: uuid_text,
                title: row.get("name")?,
                deleted_at: required_deleted_at(row, TABLE)?,
                extra: TrashExtra::Folder {
                    note_count: note_count as u64,
                },
            });
        }
        Ok(records)
    }

    fn count_trashed(&self, owner_id: &str) -> RepoResult<u64> {
        count_trashed_in(self.conn, TABLE, owner_id)
    }
}

fn parse_folder_row(row: &Row<'_>) -> RepoResult<Folder> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Folder {
        uuid: parse_uuid(&uuid_text, "folders.uuid")?,
        owner_id: row.get("owner_id")?,
        name: row.get("name")?,
        lifecycle: parse_lifecycle(row, TABLE)?,
    })
}
