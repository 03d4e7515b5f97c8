//! General-purpose editors
//!
//! Atom, CudaText, Komodo Edit, Light Table, BBEdit, Wing, Geany, Visual Studio Code and Brackets.

use super::json_string;
use crate::format::{
    empty, no_companions, BodySource, Companion, FormatDescriptor, Layout, RenderedSnippet,
    TargetContext,
};
use crate::placeholder::RewriteOp;
use crate::wrap::WrapOp;
use serde_json::Value;

/// Atom `snippets.cson`: one CSON map keyed by the selector, one entry per snippet.
pub const ATOM: FormatDescriptor = FormatDescriptor {
    name: "atom",
    description: "Atom snippets.cson",
    file_extension: "cson",
    layout: Layout::Aggregate,
    path_template: "{language}snippets.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::EscapeBackslashes, WrapOp::Indent(6)],
    final_marker: Some("${0}"),
    separator: "",
    preamble: atom_preamble,
    postamble: empty,
    record_template: atom_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn atom_preamble(target: &TargetContext) -> String {
    format!("'.{}':\n", cson_escape(&target.scope))
}

fn atom_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "  '{}':\n    'prefix': '{}'\n    'body': '''\n{}\n    '''\n",
        cson_escape(s.caption()),
        cson_escape(s.trigger()),
        s.body.replace("'''", r"\'\'\'")
    )
}

fn cson_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

pub const CUDATEXT: FormatDescriptor = FormatDescriptor {
    name: "cudatext",
    description: "CudaText .cuda-snippet files",
    file_extension: "cuda-snippet",
    layout: Layout::PerSnippet,
    path_template: "{trigger}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke],
    final_marker: Some("${0}"),
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: cudatext_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn cudatext_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "name={}\nid={}\nlex={}\ntext=\n{}\n",
        s.caption(),
        s.trigger(),
        s.target.language_title(),
        s.body
    )
}

/// Komodo Edit abbreviations: unnumbered `[[%tabstop:default]]` stops.
pub const KOMODO: FormatDescriptor = FormatDescriptor {
    name: "komodo",
    description: "Komodo Edit .ktf abbreviations",
    file_extension: "ktf",
    layout: Layout::PerSnippet,
    path_template: "{trigger}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::ToBracketStyle {
        open: "[[%tabstop:",
        close: "]]",
    }],
    wrap_pipeline: &[WrapOp::Invoke],
    final_marker: Some("!@#_currentPos!@#_anchor"),
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: komodo_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

const KOMODO_HEADER: &str = "// ==================
// auto_abbreviation: false
// indent_relative: false
// language: Text
// set_selection: false
// treat_as_ejs: false
// type: snippet
// version: 1.1.5
// ==================";

fn komodo_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "// komodo tool: {}\n{KOMODO_HEADER}\n{}\n",
        s.trigger(),
        s.body
    )
}

/// Light Table: one `.snip` per snippet plus an `.edn` index naming them.
pub const LIGHTTABLE: FormatDescriptor = FormatDescriptor {
    name: "lighttable",
    description: "Light Table .snip files with an .edn index",
    file_extension: "snip",
    layout: Layout::PerSnippet,
    path_template: "{trigger}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke],
    final_marker: Some("${0}"),
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: body_line,
    category_open: None,
    category_close: None,
    companions: lighttable_index,
};

fn lighttable_index(target: &TargetContext, snippets: &[RenderedSnippet<'_>]) -> Vec<Companion> {
    let mut index = format!(
        "{{:modes {{:+ #{{:editor.{}}}}}\n :snippets [\n",
        target.language
    );
    for s in snippets {
        index.push_str(&format!(
            "           {{:name {}\n            :key {}\n            :snippet-file {}}}\n",
            json_string(s.caption()),
            json_string(s.trigger()),
            json_string(&format!("{}.snip", s.trigger()))
        ));
    }
    index.push_str("           ]}\n");
    vec![Companion {
        path: format!("{}.edn", target.language).into(),
        contents: index,
    }]
}

/// BBEdit clippings, taken from the pre-converted body column.
pub const BBEDIT: FormatDescriptor = FormatDescriptor {
    name: "bbedit",
    description: "BBEdit clippings",
    file_extension: "",
    layout: Layout::PerSnippet,
    path_template: "{trigger}.{language}",
    body_source: BodySource::AltPlain,
    placeholder_pipeline: &[],
    wrap_pipeline: &[],
    final_marker: None,
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: body_line,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

/// Wing: `%(name||default)s` fields and `|!|` as the final position.
pub const WING: FormatDescriptor = FormatDescriptor {
    name: "wing",
    description: "Wing IDE snippet files",
    file_extension: "",
    layout: Layout::PerSnippet,
    path_template: "{trigger}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::EscapePercent, RewriteOp::ToPercentStyle],
    wrap_pipeline: &[WrapOp::Invoke],
    final_marker: Some("|!|"),
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: body_line,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

/// Geany `snippets.conf` section: one `trigger=body` line per snippet.
pub const GEANY: FormatDescriptor = FormatDescriptor {
    name: "geany",
    description: "Geany snippets.conf section",
    file_extension: "conf",
    layout: Layout::Aggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::ToCursorMarker("%cursor%")],
    wrap_pipeline: &[
        WrapOp::Invoke,
        WrapOp::EscapeBackslashes,
        WrapOp::EscapeNewlines,
    ],
    final_marker: None,
    separator: "",
    preamble: geany_preamble,
    postamble: empty,
    record_template: geany_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn geany_preamble(target: &TargetContext) -> String {
    format!("[{}]\n", target.language_title())
}

fn geany_record(s: &RenderedSnippet<'_>) -> String {
    format!("{}={}\n", s.trigger(), s.body)
}

/// Visual Studio Code snippet JSON, bodies from the JSON column written as an array of lines.
pub const VSCODE: FormatDescriptor = FormatDescriptor {
    name: "vscode",
    description: "Visual Studio Code snippets JSON",
    file_extension: "json",
    layout: Layout::Aggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::AltJson,
    placeholder_pipeline: &[],
    wrap_pipeline: &[],
    final_marker: Some("$0"),
    separator: ",\n",
    preamble: vscode_preamble,
    postamble: vscode_postamble,
    record_template: vscode_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn vscode_preamble(_: &TargetContext) -> String {
    "{\n".to_string()
}

fn vscode_postamble(_: &TargetContext) -> String {
    "\n}\n".to_string()
}

fn vscode_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "  {}: {{\n    \"prefix\": {},\n    \"body\": {},\n    \"description\": {},\n    \"scope\": {}\n  }}",
        json_string(s.trigger()),
        json_string(s.trigger()),
        vscode_body(s),
        json_string(s.caption()),
        json_string(&s.target.language)
    )
}

fn vscode_body(s: &RenderedSnippet<'_>) -> String {
    Value::Array(s.body.lines().map(Value::from).collect()).to_string()
}

/// Brackets snippets extension YAML.
pub const BRACKETS: FormatDescriptor = FormatDescriptor {
    name: "brackets",
    description: "Brackets snippets YAML",
    file_extension: "yml",
    layout: Layout::Aggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::Indent(8)],
    final_marker: Some("${0}"),
    separator: "\n",
    preamble: empty,
    postamble: empty,
    record_template: brackets_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn brackets_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "- trigger: {}\n  scope: {}\n  caption: {}\n  tag: {}\n  tagHide: true\n  text: |\n{}\n",
        json_string(s.trigger()),
        json_string(&s.target.language),
        json_string(s.caption()),
        json_string(&s.record.category),
        s.body
    )
}

/// The body followed by a newline.
pub(crate) fn body_line(s: &RenderedSnippet<'_>) -> String {
    format!("{}\n", s.body)
}

pub fn descriptors() -> Vec<FormatDescriptor> {
    vec![
        ATOM, CUDATEXT, KOMODO, LIGHTTABLE, BBEDIT, WING, GEANY, VSCODE, BRACKETS,
    ]
}
