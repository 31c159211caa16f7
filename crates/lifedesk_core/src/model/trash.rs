//! Polymorphic trash listing record.
//!
//! # Responsibility
//! - Merge the four heterogeneous entity kinds into one display schema.
//! - Provide the deterministic ordering used by the trash catalog.

use crate::model::entity::EntityKind;
use crate::model::records::TaskStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Kind-specific display data attached to a trash record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrashExtra {
    Note {
        /// Name of the containing folder while its row still exists.
        folder_name: Option<String>,
    },
    Task {
        status: TaskStatus,
    },
    Folder {
        /// Active notes still referencing this folder.
        note_count: u64,
    },
    JournalEntry {
        date: NaiveDate,
    },
}

/// One trashed entity, summarized for the aggregate trash view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashRecord {
    pub kind: EntityKind,
    /// UUID text for notes/tasks/folders, `YYYY-MM-DD` for journal entries.
    ///
    /// Several trashed journal pages may share one date and therefore one
    /// id. Restore and purge by that id reach only the most recently trashed
    /// page; the older ones surface again once it is gone.
    pub id: String,
    pub title: String,
    /// Epoch ms.
    pub deleted_at: i64,
    pub extra: TrashExtra,
}

impl TrashRecord {
    /// Catalog order: most recently trashed first, then kind, then id.
    pub fn catalog_order(left: &Self, right: &Self) -> Ordering {
        right
            .deleted_at
            .cmp(&left.deleted_at)
            .then_with(|| left.kind.cmp(&right.kind))
            .then_with(|| left.id.cmp(&right.id))
    }
}

#[cfg(test)]
mod tests {
    use super::{TrashExtra, TrashRecord};
    use crate::model::entity::EntityKind;
    use crate::model::records::TaskStatus;

    fn record(kind: EntityKind, id: &str, deleted_at: i64) -> TrashRecord {
        TrashRecord {
            kind,
            id: id.to_string(),
            title: id.to_string(),
            deleted_at,
            extra: TrashExtra::Task {
                status: TaskStatus::Todo,
            },
        }
    }

    #[test]
    fn catalog_order_is_newest_first_with_stable_ties() {
        let mut records = vec![
            record(EntityKind::Folder, "b", 10),
            record(EntityKind::Note, "z", 10),
            record(EntityKind::Task, "a", 30),
            record(EntityKind::Note, "y", 10),
        ];
        records.sort_by(TrashRecord::catalog_order);

        let order: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["a", "y", "z", "b"]);
    }
}
