use chrono::NaiveDate;
use lifedesk_core::db::open_db_in_memory;
use lifedesk_core::{
    EntityKind, EntityRef, SqliteFolderStore, SqliteJournalStore, SqliteNoteStore,
    SqliteTaskStore, TaskStatus, TrashCatalog, TrashExtra, TrashService,
};
use std::thread::sleep;
use std::time::Duration;

const OWNER: &str = "user-1";

fn pause() {
    sleep(Duration::from_millis(5));
}

#[test]
fn list_merges_all_kinds_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let service = TrashService::new(&conn);
    let task = SqliteTaskStore::try_new(&conn)
        .unwrap()
        .create_task(OWNER, "old task", TaskStatus::Todo)
        .unwrap();
    let folder = SqliteFolderStore::try_new(&conn)
        .unwrap()
        .create_folder(OWNER, "Archive")
        .unwrap();
    let note = SqliteNoteStore::try_new(&conn)
        .unwrap()
        .create_note(OWNER, "memo", "", None)
        .unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    SqliteJournalStore::try_new(&conn)
        .unwrap()
        .create_entry(OWNER, date, "\nLast day of January\nmore")
        .unwrap();

    service.soft_delete(EntityRef::Task(task.uuid), OWNER).unwrap();
    pause();
    service.soft_delete(EntityRef::Folder(folder.uuid), OWNER).unwrap();
    pause();
    service.soft_delete(EntityRef::JournalEntry(date), OWNER).unwrap();
    pause();
    service.soft_delete(EntityRef::Note(note.uuid), OWNER).unwrap();

    let records = service.list(OWNER, None).unwrap();
    let kinds: Vec<EntityKind> = records.iter().map(|record| record.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EntityKind::Note,
            EntityKind::JournalEntry,
            EntityKind::Folder,
            EntityKind::Task
        ]
    );
    assert!(records
        .windows(2)
        .all(|pair| pair[0].deleted_at >= pair[1].deleted_at));

    let journal = &records[1];
    assert_eq!(journal.id, "2025-01-31");
    assert_eq!(journal.title, "Last day of January");
    assert_eq!(journal.extra, TrashExtra::JournalEntry { date });
}

#[test]
fn same_instant_ties_break_by_kind_then_id() {
    let conn = open_db_in_memory().unwrap();
    let notes = SqliteNoteStore::try_new(&conn).unwrap();
    let tasks = SqliteTaskStore::try_new(&conn).unwrap();
    let first = notes.create_note(OWNER, "a", "", None).unwrap();
    let second = notes.create_note(OWNER, "b", "", None).unwrap();
    let task = tasks.create_task(OWNER, "t", TaskStatus::Todo).unwrap();

    conn.execute_batch(
        "UPDATE notes SET is_deleted = 1, deleted_at = 1000;
         UPDATE tasks SET is_deleted = 1, deleted_at = 1000;",
    )
    .unwrap();

    let records = TrashCatalog::new(&conn).list(OWNER).unwrap();
    let mut note_ids = vec![first.uuid.to_string(), second.uuid.to_string()];
    note_ids.sort();
    assert_eq!(records[0].id, note_ids[0]);
    assert_eq!(records[1].id, note_ids[1]);
    assert_eq!(records[2].id, task.uuid.to_string());
}

#[test]
fn folder_record_counts_active_notes_only() {
    let conn = open_db_in_memory().unwrap();
    let folders = SqliteFolderStore::try_new(&conn).unwrap();
    let notes = SqliteNoteStore::try_new(&conn).unwrap();
    let service = TrashService::new(&conn);
    let folder = folders.create_folder(OWNER, "Recipes").unwrap();
    notes.create_note(OWNER, "soup", "", Some(folder.uuid)).unwrap();
    notes.create_note(OWNER, "bread", "", Some(folder.uuid)).unwrap();
    let gone = notes.create_note(OWNER, "burnt", "", Some(folder.uuid)).unwrap();

    service.soft_delete(EntityRef::Note(gone.uuid), OWNER).unwrap();
    service.soft_delete(EntityRef::Folder(folder.uuid), OWNER).unwrap();

    let records = service.list(OWNER, Some(EntityKind::Folder)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Recipes");
    assert_eq!(records[0].extra, TrashExtra::Folder { note_count: 2 });
}

#[test]
fn note_record_resolves_folder_name_until_purge() {
    let conn = open_db_in_memory().unwrap();
    let folders = SqliteFolderStore::try_new(&conn).unwrap();
    let notes = SqliteNoteStore::try_new(&conn).unwrap();
    let service = TrashService::new(&conn);
    let folder = folders.create_folder(OWNER, "Drafts").unwrap();
    let note = notes.create_note(OWNER, "poem", "", Some(folder.uuid)).unwrap();

    service.soft_delete(EntityRef::Note(note.uuid), OWNER).unwrap();
    service.soft_delete(EntityRef::Folder(folder.uuid), OWNER).unwrap();

    let before = service.list(OWNER, Some(EntityKind::Note)).unwrap();
    assert_eq!(
        before[0].extra,
        TrashExtra::Note {
            folder_name: Some("Drafts".to_string())
        }
    );

    service.purge(EntityRef::Folder(folder.uuid), OWNER).unwrap();
    let after = service.list(OWNER, Some(EntityKind::Note)).unwrap();
    assert_eq!(after[0].extra, TrashExtra::Note { folder_name: None });
}

#[test]
fn task_record_carries_status() {
    let conn = open_db_in_memory().unwrap();
    let task = SqliteTaskStore::try_new(&conn)
        .unwrap()
        .create_task(OWNER, "ship it", TaskStatus::InProgress)
        .unwrap();
    let service = TrashService::new(&conn);
    service.soft_delete(EntityRef::Task(task.uuid), OWNER).unwrap();

    let records = service.list(OWNER, None).unwrap();
    assert_eq!(records[0].title, "ship it");
    assert_eq!(
        records[0].extra,
        TrashExtra::Task {
            status: TaskStatus::InProgress
        }
    );
}

#[test]
fn count_matches_list_and_ignores_other_owners() {
    let conn = open_db_in_memory().unwrap();
    let tasks = SqliteTaskStore::try_new(&conn).unwrap();
    let service = TrashService::new(&conn);
    for owner in [OWNER, OWNER, "user-2"] {
        let task = tasks.create_task(owner, "x", TaskStatus::Todo).unwrap();
        service.soft_delete(EntityRef::Task(task.uuid), owner).unwrap();
    }
    tasks.create_task(OWNER, "active", TaskStatus::Todo).unwrap();

    assert_eq!(service.count(OWNER).unwrap(), 2);
    assert_eq!(service.list(OWNER, None).unwrap().len(), 2);
    assert_eq!(service.count("user-2").unwrap(), 1);
    assert_eq!(service.count("nobody").unwrap(), 0);
}

#[test]
fn trash_record_serializes_with_snake_case_tags() {
    let conn = open_db_in_memory().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    SqliteJournalStore::try_new(&conn)
        .unwrap()
        .create_entry(OWNER, date, "")
        .unwrap();
    let service = TrashService::new(&conn);
    service.soft_delete(EntityRef::JournalEntry(date), OWNER).unwrap();

    let records = service.list(OWNER, None).unwrap();
    let json = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(json["kind"], "journal_entry");
    assert_eq!(json["title"], "Journal 2025-06-01");
    assert_eq!(json["extra"]["kind"], "journal_entry");
    assert_eq!(json["extra"]["date"], "2025-06-01");
}
