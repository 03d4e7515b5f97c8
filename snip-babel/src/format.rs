//! Format descriptor definition
//!
//! Every target editor is described by a [`FormatDescriptor`]: file layout, boilerplate templates
//! and the rewrite/wrap pipelines applied to each body. The generic emitter (see
//! [`crate::emit`]) interprets descriptors, so adding a target is a matter of writing one.

use crate::group::to_pascal_case;
use crate::placeholder::RewriteOp;
use crate::record::SnippetRecord;
use crate::wrap::{InvocationStyle, WrapOp};
use serde_json::Value;
use std::borrow::Cow;
use std::path::PathBuf;
use uuid::Uuid;

/// How a target lays its snippets out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Every stanza in one file, in fetch order.
    Aggregate,
    /// Every stanza in one file, nested by category in grouped order.
    GroupedAggregate,
    /// One file per snippet.
    PerSnippet,
    /// One file per snippet inside a PascalCased category directory.
    CategoryTree,
}

impl Layout {
    pub fn one_file_per_snippet(self) -> bool {
        matches!(self, Layout::PerSnippet | Layout::CategoryTree)
    }

    pub fn needs_category_subdirs(self) -> bool {
        matches!(self, Layout::CategoryTree)
    }

    pub fn is_grouped(self) -> bool {
        matches!(self, Layout::GroupedAggregate | Layout::CategoryTree)
    }
}

/// Which record field feeds the pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySource {
    Body,
    /// The JSON column, decoded to plain text.
    AltJson,
    AltPlain,
}

impl BodySource {
    /// Text fed to the pipelines. A blank alternate column falls back to the canonical body.
    ///
    /// The JSON column may hold an array of lines, a single string, or raw text; arrays are
    /// joined with newlines and strings are unquoted, so placeholders are parsed the same way
    /// for every source.
    pub fn select(self, record: &SnippetRecord) -> Cow<'_, str> {
        let alt = match self {
            BodySource::Body => return Cow::Borrowed(&record.body),
            BodySource::AltJson => &record.body_alt_json,
            BodySource::AltPlain => &record.body_alt_plain,
        };
        if alt.trim().is_empty() {
            return Cow::Borrowed(&record.body);
        }
        match self {
            BodySource::AltJson => decode_json_body(alt),
            _ => Cow::Borrowed(alt),
        }
    }
}

fn decode_json_body(raw: &str) -> Cow<'_, str> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::String(text)) => Cow::Owned(text),
        Ok(Value::Array(lines)) if lines.iter().all(Value::is_string) => Cow::Owned(
            lines
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        _ => Cow::Borrowed(raw),
    }
}

/// Where and how one export target is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetContext {
    /// Scope value records are selected by.
    pub scope: String,
    /// Language label used in file names and headers (e.g. `pml`).
    pub language: String,
    /// Root directory of this target's output.
    pub output_dir: PathBuf,
    pub invocation: InvocationStyle,
}

impl TargetContext {
    pub fn new(
        scope: impl Into<String>,
        language: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            scope: scope.into(),
            language: language.into(),
            output_dir: output_dir.into(),
            invocation: InvocationStyle::default(),
        }
    }

    pub fn with_invocation(mut self, invocation: InvocationStyle) -> Self {
        self.invocation = invocation;
        self
    }

    /// Capitalised language label, as used for bundle names.
    pub fn language_title(&self) -> String {
        to_pascal_case(&self.language)
    }
}

/// A record together with its fully rewritten body, as handed to record templates.
#[derive(Debug, Clone, Copy)]
pub struct RenderedSnippet<'a> {
    pub record: &'a SnippetRecord,
    /// Body after the placeholder and wrap pipelines, final marker included.
    pub body: &'a str,
    pub target: &'a TargetContext,
}

impl RenderedSnippet<'_> {
    pub fn trigger(&self) -> &str {
        &self.record.trigger
    }

    pub fn caption(&self) -> &str {
        &self.record.caption
    }

    /// Stable identifier of this snippet within its scope.
    pub fn uuid(&self) -> Uuid {
        stable_uuid(&self.record.scope, &self.record.trigger)
    }
}

/// Deterministic UUID (v5) derived from a scope and a name.
pub fn stable_uuid(scope: &str, name: &str) -> Uuid {
    let namespace = Uuid::new_v5(&Uuid::NAMESPACE_URL, b"snip-babel");
    Uuid::new_v5(&namespace, format!("{scope}\u{0}{name}").as_bytes())
}

/// Extra file written next to a target's snippets (bundle manifests, indexes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Companion {
    /// Path relative to the target's output directory.
    pub path: PathBuf,
    pub contents: String,
}

pub type TargetTemplate = fn(&TargetContext) -> String;
pub type RecordTemplate = fn(&RenderedSnippet<'_>) -> String;
pub type CategoryTemplate = fn(&str, &TargetContext) -> String;
pub type CompanionTemplate = fn(&TargetContext, &[RenderedSnippet<'_>]) -> Vec<Companion>;

/// Declarative description of one target editor.
///
/// `path_template` is expanded by [`FormatDescriptor::expand_path`]:
///
/// - `{language}` the target language label, `{Language}` its capitalised form
/// - `{trigger}` the record's trigger (one-file-per-snippet layouts only)
/// - `{ext}` the descriptor's file extension
///
/// For [`Layout::CategoryTree`] the expanded path is relative to the category directory,
/// otherwise to the target's output directory.
#[derive(Clone, Copy)]
pub struct FormatDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub file_extension: &'static str,
    pub layout: Layout,
    pub path_template: &'static str,
    pub body_source: BodySource,
    pub placeholder_pipeline: &'static [RewriteOp],
    pub wrap_pipeline: &'static [WrapOp],
    /// The target's own final cursor token, appended once after the body.
    pub final_marker: Option<&'static str>,
    /// Text between stanzas of an aggregate file.
    pub separator: &'static str,
    pub preamble: TargetTemplate,
    pub postamble: TargetTemplate,
    pub record_template: RecordTemplate,
    pub category_open: Option<CategoryTemplate>,
    pub category_close: Option<CategoryTemplate>,
    pub companions: CompanionTemplate,
}

impl FormatDescriptor {
    /// Expand [`Self::path_template`] for the target and, for per-snippet layouts, a record.
    pub fn expand_path(&self, target: &TargetContext, record: Option<&SnippetRecord>) -> PathBuf {
        let mut path = self
            .path_template
            .replace("{language}", &target.language)
            .replace("{Language}", &target.language_title())
            .replace("{ext}", self.file_extension);
        if let Some(record) = record {
            path = path.replace("{trigger}", &record.trigger);
        }
        PathBuf::from(path)
    }

    /// Indentation applied to the body by the wrap pipeline.
    pub fn body_indent(&self) -> usize {
        self.wrap_pipeline
            .iter()
            .map(|op| match op {
                WrapOp::Indent(n) => *n,
                _ => 0,
            })
            .sum()
    }
}

impl std::fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("name", &self.name)
            .field("layout", &self.layout)
            .field("path_template", &self.path_template)
            .field("body_source", &self.body_source)
            .field("placeholder_pipeline", &self.placeholder_pipeline)
            .field("wrap_pipeline", &self.wrap_pipeline)
            .field("final_marker", &self.final_marker)
            .finish_non_exhaustive()
    }
}

/// Template producing nothing.
pub fn empty(_: &TargetContext) -> String {
    String::new()
}

/// Companion template producing no files.
pub fn no_companions(_: &TargetContext, _: &[RenderedSnippet<'_>]) -> Vec<Companion> {
    Vec::new()
}
