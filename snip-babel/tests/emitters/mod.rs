//! Emitter tests
//!
//! Whole exports against in-memory and SQLite stores, written to temporary directories.

mod categories;
mod export;
mod sqlite;
