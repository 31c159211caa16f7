//! Entity kind tags and tagged references.
//!
//! # Responsibility
//! - Name the four trash-aware entity kinds.
//! - Parse caller-supplied `(kind, id)` strings into a typed `EntityRef`.
//!
//! # Invariants
//! - String tags are converted exactly once, at this boundary. Everything
//!   downstream dispatches with exhaustive `match` over `EntityRef`.
//! - Journal entries are keyed by calendar date, never by surrogate id.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for notes, tasks and folders.
pub type EntityId = Uuid;

/// Storage and wire format for journal entry dates.
pub const JOURNAL_DATE_FORMAT: &str = "%Y-%m-%d";

static JOURNAL_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid journal date regex"));

/// The four entity kinds managed by the trash subsystem.
///
/// Declaration order is also the tie-break order used by the trash catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Note,
    Task,
    Folder,
    JournalEntry,
}

impl EntityKind {
    /// All kinds, in catalog order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Note,
        EntityKind::Task,
        EntityKind::Folder,
        EntityKind::JournalEntry,
    ];

    /// Stable lowercase tag used in logs and at the string boundary.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Task => "task",
            Self::Folder => "folder",
            Self::JournalEntry => "journal_entry",
        }
    }

    /// Parses a caller tag. Case-insensitive; `journal` is accepted as an
    /// alias for `journal_entry`.
    pub fn parse_tag(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "note" => Some(Self::Note),
            "task" => Some(Self::Task),
            "folder" => Some(Self::Folder),
            "journal_entry" | "journal" => Some(Self::JournalEntry),
            _ => None,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Tagged reference to exactly one entity of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Note(EntityId),
    Task(EntityId),
    Folder(EntityId),
    JournalEntry(NaiveDate),
}

impl EntityRef {
    /// Returns the kind tag of this reference.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Note(_) => EntityKind::Note,
            Self::Task(_) => EntityKind::Task,
            Self::Folder(_) => EntityKind::Folder,
            Self::JournalEntry(_) => EntityKind::JournalEntry,
        }
    }

    /// Parses a `(kind, id)` pair supplied by a request layer.
    ///
    /// # Errors
    /// - `EntityRefError::UnknownKind` for an unrecognized tag.
    /// - `EntityRefError::MalformedId` for a non-UUID id on uuid-keyed kinds.
    /// - `EntityRefError::MalformedDate` for a journal key that is not a
    ///   valid `YYYY-MM-DD` calendar date.
    pub fn parse(kind_tag: &str, id: &str) -> Result<Self, EntityRefError> {
        let kind = EntityKind::parse_tag(kind_tag)
            .ok_or_else(|| EntityRefError::UnknownKind(kind_tag.trim().to_string()))?;

        match kind {
            EntityKind::Note => parse_entity_id(kind, id).map(Self::Note),
            EntityKind::Task => parse_entity_id(kind, id).map(Self::Task),
            EntityKind::Folder => parse_entity_id(kind, id).map(Self::Folder),
            EntityKind::JournalEntry => parse_journal_date(id).map(Self::JournalEntry),
        }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note(id) | Self::Task(id) | Self::Folder(id) => {
                write!(f, "{}:{id}", self.kind())
            }
            Self::JournalEntry(date) => {
                write!(f, "{}:{}", self.kind(), date.format(JOURNAL_DATE_FORMAT))
            }
        }
    }
}

/// Rejections produced while parsing caller-supplied references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRefError {
    UnknownKind(String),
    MalformedId { kind: EntityKind, value: String },
    MalformedDate(String),
}

impl Display for EntityRefError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKind(tag) => write!(
                f,
                "unknown entity kind `{tag}`; expected note|task|folder|journal_entry"
            ),
            Self::MalformedId { kind, value } => {
                write!(f, "malformed {kind} id `{value}`; expected a UUID")
            }
            Self::MalformedDate(value) => {
                write!(f, "malformed journal date `{value}`; expected YYYY-MM-DD")
            }
        }
    }
}

impl Error for EntityRefError {}

/// Parses a journal key in strict `YYYY-MM-DD` form.
pub fn parse_journal_date(value: &str) -> Result<NaiveDate, EntityRefError> {
    let trimmed = value.trim();
    if !JOURNAL_DATE_RE.is_match(trimmed) {
        return Err(EntityRefError::MalformedDate(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, JOURNAL_DATE_FORMAT)
        .map_err(|_| EntityRefError::MalformedDate(trimmed.to_string()))
}

/// Renders a journal key the way it is persisted.
pub fn format_journal_date(date: NaiveDate) -> String {
    date.format(JOURNAL_DATE_FORMAT).to_string()
}

fn parse_entity_id(kind: EntityKind, value: &str) -> Result<EntityId, EntityRefError> {
    let trimmed = value.trim();
    Uuid::parse_str(trimmed).map_err(|_| EntityRefError::MalformedId {
        kind,
        value: trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_journal_date, EntityKind, EntityRef, EntityRefError};
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn parse_tag_accepts_aliases_and_case() {
        assert_eq!(EntityKind::parse_tag(" NOTE "), Some(EntityKind::Note));
        assert_eq!(
            EntityKind::parse_tag("journal"),
            Some(EntityKind::JournalEntry)
        );
        assert_eq!(EntityKind::parse_tag("event"), None);
    }

    #[test]
    fn parse_builds_typed_reference() {
        let id = Uuid::new_v4();
        let parsed = EntityRef::parse("folder", &id.to_string()).unwrap();
        assert_eq!(parsed, EntityRef::Folder(id));
        assert_eq!(parsed.kind(), EntityKind::Folder);
    }

    #[test]
    fn parse_rejects_unknown_kind_separately_from_bad_id() {
        let unknown = EntityRef::parse("habit", "whatever").unwrap_err();
        assert!(matches!(unknown, EntityRefError::UnknownKind(tag) if tag == "habit"));

        let bad_id = EntityRef::parse("task", "not-a-uuid").unwrap_err();
        assert!(matches!(
            bad_id,
            EntityRefError::MalformedId {
                kind: EntityKind::Task,
                ..
            }
        ));
    }

    #[test]
    fn journal_dates_must_be_strict_and_real() {
        assert_eq!(
            parse_journal_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_journal_date("2024-2-9").is_err());
        assert!(parse_journal_date("2023-02-29").is_err());
        assert!(parse_journal_date("yesterday").is_err());
    }

    #[test]
    fn display_uses_tag_and_key() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        assert_eq!(
            EntityRef::JournalEntry(date).to_string(),
            "journal_entry:2025-01-07"
        );
    }
}
