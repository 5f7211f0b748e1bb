use ibylin_core::history::{HistoryError, ReadingHistoryStore, ReadingSession, MAX_HISTORY_ENTRIES};
use ibylin_core::{generate_book_id, ReadingHistoryValidationError};

fn session(path: &str, page: u32) -> ReadingSession {
    ReadingSession {
        book_path: path.to_string(),
        book_title: format!("title of {path}"),
        book_author: None,
        current_page: page,
        total_pages: 200,
        read_progress: page as f32 / 200.0,
        cover_path: None,
    }
}

#[test]
fn record_reading_sets_last_read_and_history() {
    let store = ReadingHistoryStore::in_memory();
    assert!(!store.has_reading_history());
    assert!(store.last_read_book().is_none());

    let record = store.record_reading(session("/books/a.epub", 20)).unwrap();

    assert_eq!(record.book_id, generate_book_id("/books/a.epub"));
    assert!(record.last_read_time > 0);
    assert_eq!(store.last_read_book(), Some(record.clone()));
    assert_eq!(store.reading_history(), vec![record]);
    assert!(store.has_reading_history());
}

#[test]
fn rereading_a_book_replaces_its_entry_and_moves_it_first() {
    let store = ReadingHistoryStore::in_memory();
    store.record_reading(session("/books/a.epub", 10)).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    store.record_reading(session("/books/b.epub", 10)).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    store.record_reading(session("/books/a.epub", 50)).unwrap();

    let history = store.reading_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].book_path, "/books/a.epub");
    assert_eq!(history[0].current_page, 50);
    assert_eq!(history[1].book_path, "/books/b.epub");
    assert_eq!(
        store.last_read_book().map(|book| book.current_page),
        Some(50)
    );
}

#[test]
fn history_is_capped() {
    let store = ReadingHistoryStore::in_memory();
    for index in 0..(MAX_HISTORY_ENTRIES + 5) {
        store
            .record_reading(session(&format!("/books/{index}.epub"), 1))
            .unwrap();
    }
    assert_eq!(store.reading_history().len(), MAX_HISTORY_ENTRIES);
}

#[test]
fn invalid_sessions_are_rejected_without_side_effects() {
    let store = ReadingHistoryStore::in_memory();

    let mut bad_progress = session("/books/a.epub", 10);
    bad_progress.read_progress = 1.2;
    let err = store.record_reading(bad_progress).unwrap_err();
    assert!(matches!(
        err,
        HistoryError::Validation(ReadingHistoryValidationError::ProgressOutOfRange(_))
    ));

    let mut bad_page = session("/books/a.epub", 201);
    bad_page.read_progress = 0.5;
    let err = store.record_reading(bad_page).unwrap_err();
    assert!(matches!(
        err,
        HistoryError::Validation(ReadingHistoryValidationError::PageBeyondTotal { .. })
    ));

    assert!(!store.has_reading_history());
}

#[test]
fn update_record_only_touches_existing_books() {
    let store = ReadingHistoryStore::in_memory();
    let mut record = store.record_reading(session("/books/a.epub", 10)).unwrap();

    record.book_title = "Renamed".to_string();
    assert!(store.update_record(&record).unwrap());
    assert_eq!(store.reading_history()[0].book_title, "Renamed");
    assert_eq!(
        store.last_read_book().map(|book| book.book_title),
        Some("Renamed".to_string())
    );

    let mut unknown = record.clone();
    unknown.book_id = generate_book_id("/books/unknown.epub");
    assert!(!store.update_record(&unknown).unwrap());
    assert_eq!(store.reading_history().len(), 1);
}

#[test]
fn clear_removes_everything() {
    let store = ReadingHistoryStore::in_memory();
    store.record_reading(session("/books/a.epub", 10)).unwrap();

    store.clear().unwrap();
    assert!(!store.has_reading_history());
    assert!(store.reading_history().is_empty());
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history").join("reading_history.json");

    let store = ReadingHistoryStore::open(&path).unwrap();
    let record = store.record_reading(session("/books/a.epub", 10)).unwrap();
    drop(store);

    let reopened = ReadingHistoryStore::open(&path).unwrap();
    assert_eq!(reopened.last_read_book(), Some(record.clone()));
    assert_eq!(reopened.reading_history(), vec![record]);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"lastReadBook\""));
    assert!(raw.contains("\"bookPath\""));
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reading_history.json");
    std::fs::write(&path, b"{not json").unwrap();

    let err = ReadingHistoryStore::open(&path).err().unwrap();
    assert!(matches!(err, HistoryError::Serde(_)));
}

#[test]
fn failed_write_leaves_memory_and_file_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reading_history.json");
    let store = ReadingHistoryStore::open(&path).unwrap();
    let first = store.record_reading(session("/books/a.epub", 10)).unwrap();

    // A directory at the staging path makes every write fail.
    std::fs::create_dir(dir.path().join("reading_history.json.tmp")).unwrap();

    let err = store.record_reading(session("/books/b.epub", 20)).unwrap_err();
    assert!(matches!(err, HistoryError::Io(_)));
    assert_eq!(store.last_read_book(), Some(first.clone()));
    assert_eq!(store.reading_history(), vec![first.clone()]);

    let mut renamed = first.clone();
    renamed.book_title = "Renamed".to_string();
    assert!(matches!(
        store.update_record(&renamed).unwrap_err(),
        HistoryError::Io(_)
    ));
    assert_eq!(store.reading_history(), vec![first.clone()]);

    assert!(matches!(store.clear().unwrap_err(), HistoryError::Io(_)));
    assert!(store.has_reading_history());

    let reopened = ReadingHistoryStore::open(&path).unwrap();
    assert_eq!(reopened.last_read_book(), Some(first.clone()));
    assert_eq!(reopened.reading_history(), vec![first]);
}
