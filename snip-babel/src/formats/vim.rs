//! Vim snippet engines: snipMate, UltiSnips and neosnippet.

use crate::format::{
    empty, no_companions, BodySource, FormatDescriptor, Layout, RenderedSnippet, TargetContext,
};
use crate::wrap::WrapOp;

pub const SNIPMATE: FormatDescriptor = FormatDescriptor {
    name: "snipmate",
    description: "snipMate .snippets file",
    file_extension: "snippets",
    layout: Layout::Aggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::Indent(7)],
    final_marker: Some("${0}"),
    separator: "",
    preamble: snipmate_preamble,
    postamble: empty,
    record_template: snipmate_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn snipmate_preamble(target: &TargetContext) -> String {
    format!("# {} snippets\n", target.language_title())
}

fn snipmate_record(s: &RenderedSnippet<'_>) -> String {
    if s.caption().is_empty() {
        format!("snippet {}\n{}\n", s.trigger(), s.body)
    } else {
        format!("snippet {} {}\n{}\n", s.trigger(), s.caption(), s.body)
    }
}

pub const ULTISNIPS: FormatDescriptor = FormatDescriptor {
    name: "ultisnips",
    description: "UltiSnips .snippets file",
    file_extension: "snippets",
    layout: Layout::Aggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke],
    final_marker: Some("$0"),
    separator: "\n",
    preamble: empty,
    postamble: empty,
    record_template: ultisnips_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn ultisnips_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "snippet {} \"{}\" b\n{}\nendsnippet\n",
        s.trigger(),
        s.caption().replace('"', "'"),
        s.body
    )
}

pub const NEOSNIPPET: FormatDescriptor = FormatDescriptor {
    name: "neosnippet",
    description: "neosnippet .snip file",
    file_extension: "snip",
    layout: Layout::Aggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::Indent(4)],
    final_marker: Some("${0}"),
    separator: "\n",
    preamble: empty,
    postamble: empty,
    record_template: neosnippet_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn neosnippet_record(s: &RenderedSnippet<'_>) -> String {
    let abbr = if s.caption().is_empty() {
        s.trigger()
    } else {
        s.caption()
    };
    format!("snippet {}\nabbr    {}\n{}\n", s.trigger(), abbr, s.body)
}

pub fn descriptors() -> Vec<FormatDescriptor> {
    vec![SNIPMATE, ULTISNIPS, NEOSNIPPET]
}
