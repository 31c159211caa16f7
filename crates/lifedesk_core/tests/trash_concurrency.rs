use lifedesk_core::db::open_db;
use lifedesk_core::{
    EntityRef, SqliteFolderStore, SqliteNoteStore, SqliteTaskStore, TaskStatus, TrashService,
};
use std::path::PathBuf;
use std::sync::{Arc, Barrier};
use std::thread;

const OWNER: &str = "user-1";

fn race<F>(path: PathBuf, workers: usize, op: F) -> Vec<bool>
where
    F: Fn(&TrashService<'_>) -> bool + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(workers));
    let op = Arc::new(op);
    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            let op = Arc::clone(&op);
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let service = TrashService::new(&conn);
                barrier.wait();
                op(&service)
            })
        })
        .collect();
    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

#[test]
fn concurrent_restores_have_exactly_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");
    let conn = open_db(&path).unwrap();
    let task = SqliteTaskStore::try_new(&conn)
        .unwrap()
        .create_task(OWNER, "contested", TaskStatus::Todo)
        .unwrap();
    let target = EntityRef::Task(task.uuid);
    TrashService::new(&conn).soft_delete(target, OWNER).unwrap();
    drop(conn);

    let outcomes = race(path, 4, move |service| {
        service.restore(target, OWNER).unwrap().restored
    });

    assert_eq!(outcomes.iter().filter(|won| **won).count(), 1);
}

#[test]
fn concurrent_folder_restores_cascade_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cascade.db");
    let conn = open_db(&path).unwrap();
    let folder = SqliteFolderStore::try_new(&conn)
        .unwrap()
        .create_folder(OWNER, "Shared")
        .unwrap();
    let note = SqliteNoteStore::try_new(&conn)
        .unwrap()
        .create_note(OWNER, "inside", "", Some(folder.uuid))
        .unwrap();
    let service = TrashService::new(&conn);
    service.soft_delete(EntityRef::Note(note.uuid), OWNER).unwrap();
    service.soft_delete(EntityRef::Folder(folder.uuid), OWNER).unwrap();
    drop(conn);

    let target = EntityRef::Folder(folder.uuid);
    let reports = race(path.clone(), 2, move |service| {
        let report = service.restore(target, OWNER).unwrap();
        report.restored && report.cascaded_notes == 1
    });
    assert_eq!(reports.iter().filter(|won| **won).count(), 1);

    let conn = open_db(&path).unwrap();
    let notes = SqliteNoteStore::try_new(&conn).unwrap();
    assert!(notes.get_note(note.uuid, OWNER, false).unwrap().is_some());
}

#[test]
fn concurrent_purges_never_remove_active_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("purge.db");
    let conn = open_db(&path).unwrap();
    let task = SqliteTaskStore::try_new(&conn)
        .unwrap()
        .create_task(OWNER, "live", TaskStatus::Todo)
        .unwrap();
    drop(conn);

    let target = EntityRef::Task(task.uuid);
    let outcomes = race(path.clone(), 4, move |service| {
        service.purge(target, OWNER).unwrap()
    });
    assert!(outcomes.iter().all(|purged| !purged));

    let conn = open_db(&path).unwrap();
    let tasks = SqliteTaskStore::try_new(&conn).unwrap();
    assert!(tasks.get_task(task.uuid, OWNER, false).unwrap().is_some());
}
