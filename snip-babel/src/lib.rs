//! Snippet transformation and export for text editors
//!
//!     This crate turns one canonical snippet library, stored as rows of a SQLite table, into the
//!     native snippet formats of about twenty-five editors and notebook environments.
//!
//!     This is a pure lib: it powers snip-cli but assumes no shell. Nothing here reads env vars
//!     or prints; progress and skipped records are reported through `log` and [`EmitReport`].
//!
//! Architecture
//!
//!     Every target is a declarative [`FormatDescriptor`]: a file layout, boilerplate templates
//!     and two pipelines applied to each body. A single generic emitter (./emit.rs) interprets
//!     descriptors, so format code is data plus a few string templates, and the hard parts
//!     (placeholder tokenizing, quote-safe wrapping, grouping, atomic writes) live in shared,
//!     well tested modules.
//!
//!     The file structure :
//!     .
//!     ├── error.rs            # ExportError, record-level vs store-level
//!     ├── record.rs           # SnippetRecord, the 13-field row
//!     ├── store.rs            # SnippetStore trait, SQLite and in-memory stores
//!     ├── placeholder.rs      # tab-stop tokenizer and rewrites
//!     ├── wrap.rs             # invocation wrapping, indentation, escaping
//!     ├── group.rs            # category grouping and directory names
//!     ├── format.rs           # FormatDescriptor definition
//!     ├── registry.rs         # FormatRegistry for discovery and selection
//!     ├── emit.rs             # the generic emitter
//!     └── formats
//!         ├── editors.rs      # Atom, CudaText, Komodo, Light Table, BBEdit, Wing, ...
//!         ├── xml.rs          # gedit, Sublime, Bluefish, Espresso, Kate, TextMate
//!         ├── vim.rs          # snipMate, UltiSnips, neosnippet
//!         └── jupyter.rs      # clippings, menus, JupyterLab trees, Elyra, Colab
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── common
//!     └── emitters
//!         └── <area>.rs
//!
//!     Integration tests run whole emitters against in-memory and SQLite stores in a temporary
//!     directory. Unit tests for the pipelines sit next to the code.
//!
//! Core Algorithms
//!
//!     Bodies are tokenized once (./placeholder.rs) and every rewrite maps over tokens. The wrap
//!     step (./wrap.rs) shields quotes with private-use sentinels before wrapping lines in the
//!     invocation template, so the delimiter quote can be escaped (or swapped, the legacy
//!     behaviour) without touching the template's own quotes.

pub mod emit;
pub mod error;
pub mod format;
pub mod formats;
pub mod group;
pub mod placeholder;
pub mod record;
pub mod registry;
pub mod store;
pub mod wrap;

pub use emit::{emit, export_all, render_record, EmitReport, ExportJob, SkippedRecord};
pub use error::ExportError;
pub use format::{FormatDescriptor, Layout, TargetContext};
pub use record::{SnippetRecord, YesNo};
pub use registry::FormatRegistry;
pub use store::{MemoryStore, SnippetStore, SqliteStore};
pub use wrap::{InvocationStyle, QuoteResolution};
