//! Per-kind read models.
//!
//! # Responsibility
//! - Carry the kind-specific fields the trash subsystem reads or preserves.
//! - Expose the shared lifecycle block in one shape for all four kinds.
//!
//! # Invariants
//! - `Lifecycle::deleted_at` is `Some` iff `Lifecycle::is_deleted`.
//! - `Note::folder_uuid` is a weak reference; it may point at a trashed
//!   folder and becomes `None` when that folder is purged.

use crate::model::entity::EntityId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state derived from the `is_deleted` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Active,
    Trashed,
}

/// Lifecycle columns shared by every entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    pub is_deleted: bool,
    /// Epoch ms. Set on trash, cleared on restore.
    pub deleted_at: Option<i64>,
    /// Epoch ms.
    pub created_at: i64,
    /// Epoch ms. Touched on every lifecycle transition.
    pub updated_at: i64,
}

impl Lifecycle {
    pub fn state(&self) -> LifecycleState {
        if self.is_deleted {
            LifecycleState::Trashed
        } else {
            LifecycleState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Task progress for `EntityKind::Task`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub uuid: EntityId,
    pub owner_id: String,
    pub name: String,
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub uuid: EntityId,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    /// Containing folder, if any. Not ownership.
    pub folder_uuid: Option<EntityId>,
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: EntityId,
    pub owner_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub lifecycle: Lifecycle,
}

/// One journal page. Addressed by `(owner_id, date)`; `entry_uuid` only
/// disambiguates several trashed pages that share a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub entry_uuid: EntityId,
    pub owner_id: String,
    pub date: NaiveDate,
    pub content: String,
    pub lifecycle: Lifecycle,
}
