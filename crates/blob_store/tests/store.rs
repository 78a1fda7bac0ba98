use std::sync::Arc;
use std::thread;

use blob_store::{ErrorKind, FileStore, LineMode, ReportingStore, WriteStrategy};

fn store_in(dir: &tempfile::TempDir) -> FileStore {
    FileStore::new(dir.path().join("external-files"))
}

#[test]
fn test_json_document_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.write("profile.json", r#"{"id":1}"#).unwrap();
    assert_eq!(store.read("profile.json").unwrap().as_deref(), Some(r#"{"id":1}"#));
}

#[test]
fn test_line_breaks_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.write("a.txt", "line1\nline2").unwrap();
    assert_eq!(store.read("a.txt").unwrap().as_deref(), Some("line1line2"));

    // the bytes on disk are untouched
    let raw = std::fs::read_to_string(store.root().join("a.txt")).unwrap();
    assert_eq!(raw, "line1\nline2");
}

#[test]
fn test_verbatim_keeps_line_breaks() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::builder(dir.path()).line_mode(LineMode::Verbatim).build();

    store.write("a.txt", "line1\r\nline2\n").unwrap();
    assert_eq!(store.read("a.txt").unwrap().as_deref(), Some("line1\r\nline2\n"));
}

#[test]
fn test_never_written_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    assert_eq!(store.read("nonexistent.json").unwrap(), None);
    assert!(!store.root().exists());
}

#[test]
fn test_repeated_writes_do_not_append() {
    let dir = tempfile::tempdir().unwrap();

    for strategy in [WriteStrategy::Replace, WriteStrategy::Atomic] {
        let store = FileStore::builder(dir.path().join(format!("{strategy:?}")))
            .write_strategy(strategy)
            .build();

        store.write("list.json", "[1]").unwrap();
        store.write("list.json", "[1]").unwrap();
        assert_eq!(store.read("list.json").unwrap().as_deref(), Some("[1]"));

        store.write("list.json", "[2,3]").unwrap();
        assert_eq!(store.read("list.json").unwrap().as_deref(), Some("[2,3]"));
        assert_eq!(store.list().unwrap(), ["list.json"]);
    }
}

#[test]
fn test_concurrent_writers_never_see_partial_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let values: Arc<[String]> = (0..4).map(|i| format!("[{}]", i.to_string().repeat(4096))).collect();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let (store, values) = (store.clone(), values.clone());

            thread::spawn(move || {
                for _ in 0..25 {
                    store.write("shared.json", &values[i]).unwrap();

                    let read = store.read("shared.json").unwrap().unwrap();
                    assert!(values.contains(&read), "torn read of {} bytes", read.len());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_reporting_store_hides_failures() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReportingStore::new(store_in(&dir), |err: &blob_store::StoreError| {
        assert!(matches!(err.kind(), ErrorKind::NotFound | ErrorKind::InvalidName));
    });

    assert_eq!(store.get_data("missing.json"), None);
    store.set_data("", "ignored");

    store.set_data("settings.json", r#"{"theme":"dark"}"#);
    assert_eq!(store.get_data("settings.json").as_deref(), Some(r#"{"theme":"dark"}"#));
}
