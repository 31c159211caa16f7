//! Journal entry store.
//!
//! # Responsibility
//! - Persist one journal page per owner per calendar day.
//! - Enforce the one-active-page-per-day rule across trash/restore cycles.
//!
//! # Invariants
//! - A partial unique index on `(owner_id, entry_date) WHERE is_deleted = 0`
//!   enforces the per-day rule for writes.
//! - Restore onto a day that already has an active page is a no-op
//!   (`Ok(false)`). The occupancy check runs inside the restoring UPDATE, so
//!   it cannot race another writer.
//! - Several trashed pages may share a date. Restore and purge address the
//!   most recently trashed one.

use crate::model::entity::{format_journal_date, parse_journal_date, EntityId, EntityKind};
use crate::model::records::JournalEntry;
use crate::model::trash::{TrashExtra, TrashRecord};
use crate::repo::lifecycle::{
    count_trashed_in, ensure_store_ready, parse_lifecycle, parse_uuid, purge_all_trashed_in,
    required_deleted_at, EntityStore, NOW_MS_SQL,
};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const TABLE: &str = "journal_entries";
const MAX_TITLE_CHARS: usize = 80;

const JOURNAL_SELECT_SQL: &str = "SELECT
    entry_uuid,
    owner_id,
    entry_date,
    content,
    is_deleted,
    deleted_at,
    created_at,
    updated_at
FROM journal_entries";

/// Picks the most recently trashed page for one `(owner_id, entry_date)`.
const LATEST_TRASHED_SQL: &str = "SELECT entry_uuid
    FROM journal_entries
    WHERE owner_id = ?1
      AND entry_date = ?2
      AND is_deleted = 1
    ORDER BY deleted_at DESC, entry_uuid ASC
    LIMIT 1";

/// SQLite-backed journal store.
pub struct SqliteJournalStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_store_ready(conn, TABLE)?;
        Ok(Self { conn })
    }

    /// Creates the active page for one day.
    ///
    /// # Errors
    /// - `RepoError::ConstraintViolation` when an active page already holds
    ///   `date` for this owner.
    pub fn create_entry(
        &self,
        owner_id: &str,
        date: NaiveDate,
        content: &str,
    ) -> RepoResult<JournalEntry> {
        let entry_uuid = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO journal_entries (entry_uuid, owner_id, entry_date, content)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    entry_uuid.to_string(),
                    owner_id,
                    format_journal_date(date),
                    content,
                ],
            )
            .map_err(|err| map_date_conflict(err.into(), date))?;
        self.get_entry(entry_uuid, owner_id)?.ok_or_else(|| {
            RepoError::InvalidData("created journal entry not found in read-back".to_string())
        })
    }

    /// Loads the active page for one day.
    pub fn get_active_entry(
        &self,
        owner_id: &str,
        date: NaiveDate,
    ) -> RepoResult<Option<JournalEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{JOURNAL_SELECT_SQL}
             WHERE owner_id = ?1
               AND entry_date = ?2
               AND is_deleted = 0;"
        ))?;
        let mut rows = stmt.query(params![owner_id, format_journal_date(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_journal_row(row)?));
        }
        Ok(None)
    }

    /// Loads one page by surrogate id in any lifecycle state.
    pub fn get_entry(
        &self,
        entry_uuid: EntityId,
        owner_id: &str,
    ) -> RepoResult<Option<JournalEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{JOURNAL_SELECT_SQL}
             WHERE entry_uuid = ?1
               AND owner_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![entry_uuid.to_string(), owner_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_journal_row(row)?));
        }
        Ok(None)
    }

    /// Lists active pages, newest day first.
    pub fn list_active_entries(&self, owner_id: &str) -> RepoResult<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{JOURNAL_SELECT_SQL}
             WHERE owner_id = ?1
               AND is_deleted = 0
             ORDER BY entry_date DESC;"
        ))?;
        let mut rows = stmt.query([owner_id])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_journal_row(row)?);
        }
        Ok(entries)
    }
}

impl EntityStore for SqliteJournalStore<'_> {
    type Key = NaiveDate;
    const KIND: EntityKind = EntityKind::JournalEntry;

    fn soft_delete(&self, key: NaiveDate, owner_id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE journal_entries
                 SET is_deleted = 1,
                     deleted_at = {NOW_MS_SQL},
                     updated_at = {NOW_MS_SQL}
                 WHERE owner_id = ?1
                   AND entry_date = ?2
                   AND is_deleted = 0;"
            ),
            params![owner_id, format_journal_date(key)],
        )?;
        Ok(changed == 1)
    }

    fn restore(&self, key: NaiveDate, owner_id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE journal_entries
                     SET is_deleted = 0,
                         deleted_at = NULL,
                         updated_at = {NOW_MS_SQL}
                     WHERE entry_uuid = ({LATEST_TRASHED_SQL})
                       AND NOT EXISTS (
                           SELECT 1
                           FROM journal_entries
                           WHERE owner_id = ?1
                             AND entry_date = ?2
                             AND is_deleted = 0
                       );"
                ),
                params![owner_id, format_journal_date(key)],
            )
            .map_err(|err| map_date_conflict(err.into(), key))?;
        Ok(changed == 1)
    }

    fn purge(&self, key: NaiveDate, owner_id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            &format!(
                "DELETE FROM journal_entries
                 WHERE entry_uuid = ({LATEST_TRASHED_SQL})
                   AND is_deleted = 1;"
            ),
            params![owner_id, format_journal_date(key)],
        )?;
        Ok(changed == 1)
    }

    fn purge_all_trashed(&self, owner_id: &str) -> RepoResult<u64> {
        purge_all_trashed_in(self.conn, TABLE, owner_id)
    }

    fn list_trashed(&self, owner_id: &str) -> RepoResult<Vec<TrashRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT entry_date, content, deleted_at
             FROM journal_entries
             WHERE owner_id = ?1
               AND is_deleted = 1
             ORDER BY deleted_at DESC, entry_uuid ASC;",
        )?;
        let mut rows = stmt.query([owner_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let date = parse_date_column(row)?;
            let content: String = row.get("content")?;
            records.push(TrashRecord {
                kind: Self::KIND,
                id: format_journal_date(date),
                title: summarize_title(&content, date),
                deleted_at: required_deleted_at(row, TABLE)?,
                extra: TrashExtra::JournalEntry { date },
            });
        }
        Ok(records)
    }

    fn count_trashed(&self, owner_id: &str) -> RepoResult<u64> {
        count_trashed_in(self.conn, TABLE, owner_id)
    }
}

fn map_date_conflict(err: RepoError, date: NaiveDate) -> RepoError {
    match err {
        RepoError::Db(db_err) if db_err.is_unique_violation() => RepoError::ConstraintViolation(
            format!(
                "an active journal entry already exists for {}",
                format_journal_date(date)
            ),
        ),
        other => other,
    }
}

fn parse_journal_row(row: &Row<'_>) -> RepoResult<JournalEntry> {
    let uuid_text: String = row.get("entry_uuid")?;
    Ok(JournalEntry {
        entry_uuid: parse_uuid(&uuid_text, "journal_entries.entry_uuid")?,
        owner_id: row.get("owner_id")?,
        date: parse_date_column(row)?,
        content: row.get("content")?,
        lifecycle: parse_lifecycle(row, TABLE)?,
    })
}

fn parse_date_column(row: &Row<'_>) -> RepoResult<NaiveDate> {
    let value: String = row.get("entry_date")?;
    parse_journal_date(&value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{value}` in journal_entries.entry_date"
        ))
    })
}

/// First non-blank content line, capped; falls back to the date.
fn summarize_title(content: &str, date: NaiveDate) -> String {
    let Some(line) = content.lines().map(str::trim).find(|line| !line.is_empty()) else {
        return format!("Journal {}", format_journal_date(date));
    };
    let mut title = line.chars().take(MAX_TITLE_CHARS).collect::<String>();
    if line.chars().count() > MAX_TITLE_CHARS {
        title.push_str("...");
    }
    title
}

#[cfg(test)]
mod tests {
    use super::summarize_title;
    use chrono::NaiveDate;

    #[test]
    fn summarize_title_uses_first_non_blank_line() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(summarize_title("\n  \nMorning run\nmore", date), "Morning run");
    }

    #[test]
    fn summarize_title_falls_back_to_date_and_truncates() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(summarize_title("   ", date), "Journal 2025-03-01");

        let long = "x".repeat(200);
        let title = summarize_title(&long, date);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 83);
    }
}
