//! Shared fixtures for the integration tests.

use rusqlite::Connection;
use snip_babel::{SnippetRecord, YesNo};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const SCOPE: &str = "text.pml";

/// A small PyMOL library with foreign code, native code, quotes and tags.
pub fn library() -> Vec<SnippetRecord> {
    let mut records = vec![
        SnippetRecord::new(
            "cartoon",
            SCOPE,
            "Display",
            "cartoon ${1:loop}, ${2:all}${0}",
        )
        .with_caption("Cartoon style")
        .with_native(YesNo::No),
        SnippetRecord::new(
            "label",
            SCOPE,
            "Labels",
            "label ${1:name CA}, \"${2:%s-%s}\" % (resn, resi)\nset label_size, ${3:14}$0",
        )
        .with_caption("Label alpha carbons")
        .with_native(YesNo::No)
        .with_index_tags("label!annotation"),
        SnippetRecord::new(
            "fetchpy",
            SCOPE,
            "Display",
            "from pymol import cmd\ncmd.fetch('${1:1lw9}')\n${0}",
        )
        .with_caption("Fetch from Python"),
    ];
    for record in &mut records {
        record.language = "pml".to_string();
        record.body_alt_plain = record.body.clone();
    }
    records
}

/// Write `records` into a fresh `snips` table of a database file in `dir`.
pub fn sqlite_library(dir: &Path, records: &[SnippetRecord]) -> PathBuf {
    let path = dir.join("snippets.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE snips (tabtrigger TEXT, language TEXT, scope TEXT, category TEXT,
            caption TEXT, body TEXT, body4json TEXT, body4bbedit TEXT, pythonYN TEXT,
            hasPythonVersionYN TEXT, indexTag TEXT, citekey TEXT, pageNumber TEXT);",
    )
    .unwrap();
    for r in records {
        conn.execute(
            "INSERT INTO snips VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                r.trigger,
                r.language,
                r.scope,
                r.category,
                r.caption,
                r.body,
                r.body_alt_json,
                r.body_alt_plain,
                r.is_target_language_native.map(flag),
                r.has_alternate_version.map(flag),
                r.index_tags,
                r.citation_key,
                r.page_number,
            ],
        )
        .unwrap();
    }
    path
}

fn flag(value: YesNo) -> &'static str {
    match value {
        YesNo::Yes => "Y",
        YesNo::No => "N",
    }
}

/// Every file under `root`, keyed by relative path.
pub fn read_tree(root: &Path) -> BTreeMap<PathBuf, String> {
    let mut files = BTreeMap::new();
    collect(root, root, &mut files);
    files
}

fn collect(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, files);
        } else {
            let contents = fs::read_to_string(&path).unwrap();
            files.insert(path.strip_prefix(root).unwrap().to_path_buf(), contents);
        }
    }
}
