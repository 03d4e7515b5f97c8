//! Selection interface over the snippet store
//!
//! Emitters only read: [`SnippetStore::fetch`] returns every record of a scope in insertion
//! order and [`SnippetStore::distinct_categories`] the sorted set of their categories.
//! Both implementations reject scopes in which a trigger appears twice, since one-file-per-snippet
//! targets would otherwise overwrite one record's output with another's.

use crate::error::ExportError;
use crate::record::{SnippetRecord, YesNo};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Read contract against the external snippet store.
pub trait SnippetStore {
    /// All records whose scope equals `scope`, in store order.
    fn fetch(&self, scope: &str) -> Result<Vec<SnippetRecord>, ExportError>;

    /// Sorted distinct categories of the records in `scope`.
    fn distinct_categories(&self, scope: &str) -> Result<BTreeSet<String>, ExportError>;
}

/// Columns of the snippet table, in [`SnippetRecord`] field order.
const COLUMNS: &str = "tabtrigger, language, scope, category, caption, body, body4json, \
                       body4bbedit, pythonYN, hasPythonVersionYN, indexTag, citekey, pageNumber";

/// Snippet table in an SQLite database.
pub struct SqliteStore {
    conn: Connection,
    table: String,
}

impl SqliteStore {
    /// Open `path` read-only.
    pub fn open(path: impl AsRef<Path>, table: &str) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            ExportError::RecordFetch(format!("cannot open '{}': {e}", path.display()))
        })?;
        Self::from_connection(conn, table)
    }

    /// Wrap an already open connection.
    pub fn from_connection(conn: Connection, table: &str) -> Result<Self, ExportError> {
        validate_table_name(table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl SnippetStore for SqliteStore {
    fn fetch(&self, scope: &str) -> Result<Vec<SnippetRecord>, ExportError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE scope = ?1 ORDER BY rowid",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([scope], record_from_row)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        ensure_unique_triggers(scope, &records)?;
        Ok(records)
    }

    fn distinct_categories(&self, scope: &str) -> Result<BTreeSet<String>, ExportError> {
        let sql = format!(
            "SELECT DISTINCT category FROM {} WHERE scope = ?1",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([scope], |row| text(row, 0))?;
        Ok(rows.collect::<Result<BTreeSet<_>, _>>()?)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<SnippetRecord> {
    Ok(SnippetRecord {
        trigger: text(row, 0)?,
        language: text(row, 1)?,
        scope: text(row, 2)?,
        category: text(row, 3)?,
        caption: text(row, 4)?,
        body: text(row, 5)?,
        body_alt_json: text(row, 6)?,
        body_alt_plain: text(row, 7)?,
        is_target_language_native: YesNo::parse(&text(row, 8)?),
        has_alternate_version: YesNo::parse(&text(row, 9)?),
        index_tags: text(row, 10)?,
        citation_key: text(row, 11)?,
        page_number: text(row, 12)?,
    })
}

/// Read a column as text whatever its storage class; NULL reads as empty.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    })
}

/// Accept only plain SQL identifiers, since the table name is spliced into queries.
pub fn validate_table_name(table: &str) -> Result<(), ExportError> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ExportError::InvalidTableName(table.to_string()))
    }
}

/// In-memory store, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<SnippetRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<SnippetRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: SnippetRecord) {
        self.records.push(record);
    }
}

impl SnippetStore for MemoryStore {
    fn fetch(&self, scope: &str) -> Result<Vec<SnippetRecord>, ExportError> {
        let records: Vec<SnippetRecord> = self
            .records
            .iter()
            .filter(|r| r.scope == scope)
            .cloned()
            .collect();
        ensure_unique_triggers(scope, &records)?;
        Ok(records)
    }

    fn distinct_categories(&self, scope: &str) -> Result<BTreeSet<String>, ExportError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.scope == scope)
            .map(|r| r.category.clone())
            .collect())
    }
}

fn ensure_unique_triggers(scope: &str, records: &[SnippetRecord]) -> Result<(), ExportError> {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.trigger.as_str()) {
            return Err(ExportError::DuplicateTrigger {
                scope: scope.to_string(),
                trigger: record.trigger.clone(),
            });
        }
    }
    Ok(())
}
