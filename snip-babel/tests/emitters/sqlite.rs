//! Exports driven by an SQLite snippet table.

use crate::common::{library, read_tree, sqlite_library, SCOPE};
use snip_babel::formats::{editors, vim};
use snip_babel::{emit, ExportError, SnippetStore, SqliteStore, TargetContext, YesNo};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_fetch_preserves_row_order_and_fields() {
    let dir = tempdir().unwrap();
    let db = sqlite_library(dir.path(), &library());
    let store = SqliteStore::open(&db, "snips").unwrap();

    let records = store.fetch(SCOPE).unwrap();
    let triggers: Vec<&str> = records.iter().map(|r| r.trigger.as_str()).collect();
    assert_eq!(triggers, vec!["cartoon", "label", "fetchpy"]);
    assert_eq!(records[1].tags(), vec!["label", "annotation"]);
    assert_eq!(records[0].is_target_language_native, Some(YesNo::No));
    assert_eq!(records[2].is_target_language_native, Some(YesNo::Yes));

    assert!(store.fetch("source.python").unwrap().is_empty());
}

#[test]
fn test_sqlite_and_memory_stores_export_the_same_tree() {
    let dir = tempdir().unwrap();
    let db = sqlite_library(dir.path(), &library());
    let sqlite = SqliteStore::open(&db, "snips").unwrap();
    let memory = snip_babel::MemoryStore::new(library());

    let from_db = dir.path().join("db");
    let from_memory = dir.path().join("memory");
    emit(&sqlite, &vim::SNIPMATE, &TargetContext::new(SCOPE, "pml", &from_db)).unwrap();
    emit(&memory, &vim::SNIPMATE, &TargetContext::new(SCOPE, "pml", &from_memory)).unwrap();

    assert_eq!(read_tree(&from_db), read_tree(&from_memory));
}

#[test]
fn test_vscode_falls_back_to_canonical_body() {
    let dir = tempdir().unwrap();
    let db = sqlite_library(dir.path(), &library());
    let store = SqliteStore::open(&db, "snips").unwrap();
    let out = dir.path().join("vscode");

    emit(&store, &editors::VSCODE, &TargetContext::new(SCOPE, "pml", &out)).unwrap();

    let text = fs::read_to_string(out.join("pml.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["cartoon"]["prefix"], "cartoon");
    assert!(doc["label"]["body"].is_array());
}

#[test]
fn test_unknown_table_is_a_fetch_error() {
    let dir = tempdir().unwrap();
    let db = sqlite_library(dir.path(), &library());
    let store = SqliteStore::open(&db, "missing").unwrap();
    assert!(matches!(store.fetch(SCOPE), Err(ExportError::RecordFetch(_))));
}

#[test]
fn test_table_names_are_validated() {
    let dir = tempdir().unwrap();
    let db = sqlite_library(dir.path(), &library());
    assert!(matches!(
        SqliteStore::open(&db, "snips; DROP TABLE snips"),
        Err(ExportError::InvalidTableName(_))
    ));
}
