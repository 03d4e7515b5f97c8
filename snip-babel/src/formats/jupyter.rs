//! Notebook-oriented targets
//!
//! Clippings for the `%load` magic, the nbextensions snippets menu, JupyterLab category
//! trees (plain, annotated and LaTeX), Elyra code snippets and a Colab snippet notebook.
//! Most of them flatten tab stops, since notebooks have no snippet engine.

use super::editors::body_line;
use super::{json_string, notebook_lines};
use crate::format::{
    empty, no_companions, stable_uuid, BodySource, FormatDescriptor, Layout, RenderedSnippet,
    TargetContext,
};
use crate::placeholder::RewriteOp;
use crate::wrap::WrapOp;
use serde_json::{json, Value};

const TRIPLE_QUOTE: &str = "\"\"\"";

/// `%load`-able clipping: the original body as a docstring, then the flattened code.
pub const JUPYTER_CLIPPINGS: FormatDescriptor = FormatDescriptor {
    name: "jupyter-clippings",
    description: "Jupyter clippings for the %load magic",
    file_extension: "",
    layout: Layout::PerSnippet,
    path_template: "{trigger}.{language}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::StripNumberedStops],
    wrap_pipeline: &[WrapOp::FenceReference(TRIPLE_QUOTE)],
    final_marker: None,
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: body_line,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

/// Snippets menu for the classic notebook, one submenu per category.
pub const JUPYTER_MENU: FormatDescriptor = FormatDescriptor {
    name: "jupyter-menu",
    description: "Jupyter notebook snippets menu (nbextensions)",
    file_extension: "js",
    layout: Layout::GroupedAggregate,
    path_template: "{language}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::StripNumberedStops],
    wrap_pipeline: &[],
    final_marker: None,
    separator: "",
    preamble: menu_preamble,
    postamble: menu_postamble,
    record_template: menu_record,
    category_open: Some(menu_category_open),
    category_close: Some(menu_category_close),
    companions: no_companions,
};

/// JavaScript identifier derived from the language label.
fn menu_ident(language: &str) -> String {
    let ident: String = language
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{ident}")
    } else {
        ident
    }
}

fn menu_preamble(target: &TargetContext) -> String {
    format!(
        "var {}_menu = {{\n    'name' : {},\n    'sub-menu' : [\n",
        menu_ident(&target.language),
        json_string(&target.language)
    )
}

fn menu_postamble(_: &TargetContext) -> String {
    "    ],\n};\n".to_string()
}

fn menu_category_open(category: &str, _: &TargetContext) -> String {
    format!(
        "        {{\n            'name' : {},\n            'sub-menu' : [\n",
        json_string(category)
    )
}

fn menu_category_close(_: &str, _: &TargetContext) -> String {
    "            ],\n        },\n".to_string()
}

fn menu_record(s: &RenderedSnippet<'_>) -> String {
    let lines: Vec<String> = latex_lines(s)
        .iter()
        .map(|line| format!("                        {}", json_string(line)))
        .collect();
    format!(
        "                {{\n                    'name' : {},\n                    'snippet' : [\n{},\n                    ],\n                }},\n",
        json_string(s.trigger()),
        lines.join(",\n")
    )
}

/// The snippet as a commented `code` float around a minted listing.
fn latex_lines(s: &RenderedSnippet<'_>) -> Vec<String> {
    let mut lines = vec![
        r"%\begin{code}{}".to_string(),
        r"%\begin{minted}{python}".to_string(),
    ];
    lines.extend(s.body.lines().map(str::to_string));
    lines.push(r"%\end{minted}".to_string());
    if s.record.citation_key.is_empty() {
        lines.push(format!(r"%\caption{{{}}}", s.caption()));
    } else {
        lines.push(format!(
            r"%\caption{{{}\cite{{{}}}}}",
            s.caption(),
            s.record.citation_key
        ));
    }
    lines.push(format!(r"%\label{{eq:{}}}", s.trigger()));
    lines.extend(s.record.tags().into_iter().map(|tag| format!(r"%\index{{{tag}}}")));
    lines.push(r"%\end{code}".to_string());
    lines
}

pub const JUPYTERLAB: FormatDescriptor = FormatDescriptor {
    name: "jupyterlab",
    description: "JupyterLab snippets, one directory per category",
    file_extension: "py",
    layout: Layout::CategoryTree,
    path_template: "{trigger}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::StripNumberedStops],
    wrap_pipeline: &[WrapOp::Invoke],
    final_marker: None,
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: body_line,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

/// JupyterLab snippets with the original body fenced above the code and a source note below.
pub const JUPYTERLAB_ANNOTATED: FormatDescriptor = FormatDescriptor {
    name: "jupyterlab-annotated",
    description: "JupyterLab snippets with reference copy and source notes",
    file_extension: "py",
    layout: Layout::CategoryTree,
    path_template: "{trigger}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::StripNumberedStops],
    wrap_pipeline: &[WrapOp::Invoke, WrapOp::FenceReference(TRIPLE_QUOTE)],
    final_marker: None,
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: annotated_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn annotated_record(s: &RenderedSnippet<'_>) -> String {
    format!(
        "{}\n\n# Description:  {}\n# Source:  {}\n",
        s.body,
        s.caption(),
        s.record.citation_key
    )
}

pub const JUPYTERLAB_LATEX: FormatDescriptor = FormatDescriptor {
    name: "jupyterlab-latex",
    description: "JupyterLab LaTeX listings, one directory per category",
    file_extension: "tex",
    layout: Layout::CategoryTree,
    path_template: "{trigger}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::StripNumberedStops],
    wrap_pipeline: &[],
    final_marker: None,
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: latex_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn latex_record(s: &RenderedSnippet<'_>) -> String {
    let mut out = latex_lines(s).join("\n");
    out.push('\n');
    out
}

pub const ELYRA: FormatDescriptor = FormatDescriptor {
    name: "elyra",
    description: "Elyra code-snippet JSON, one directory per category",
    file_extension: "json",
    layout: Layout::CategoryTree,
    path_template: "{trigger}.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::StripNumberedStops],
    wrap_pipeline: &[WrapOp::Invoke],
    final_marker: None,
    separator: "",
    preamble: empty,
    postamble: empty,
    record_template: elyra_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

fn elyra_record(s: &RenderedSnippet<'_>) -> String {
    let mut tags = vec![s.target.language.as_str(), s.trigger()];
    tags.extend(s.record.tags());
    let doc = json!({
        "display_name": s.trigger(),
        "metadata": {
            "description": s.caption(),
            "tags": tags,
            "language": "python",
            "code": s.body.lines().collect::<Vec<_>>(),
        },
        "schema_name": "code-snippet",
    });
    format!("{doc:#}\n")
}

/// Notebook with a markdown heading cell and a code cell per snippet, for Google Colab.
pub const COLAB: FormatDescriptor = FormatDescriptor {
    name: "colab",
    description: "Colab snippet notebook",
    file_extension: "ipynb",
    layout: Layout::Aggregate,
    path_template: "{language}snips.{ext}",
    body_source: BodySource::Body,
    placeholder_pipeline: &[RewriteOp::StripNumberedStops],
    wrap_pipeline: &[WrapOp::Invoke],
    final_marker: None,
    separator: ",\n",
    preamble: colab_preamble,
    postamble: colab_postamble,
    record_template: colab_record,
    category_open: None,
    category_close: None,
    companions: no_companions,
};

/// Pretty-print `value` with every line indented by `pad` spaces.
fn pretty_block(value: &Value, pad: usize) -> String {
    let prefix = " ".repeat(pad);
    format!("{value:#}")
        .lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn colab_preamble(target: &TargetContext) -> String {
    let metadata = json!({
        "colab": { "name": format!("{}snips.ipynb", target.language) },
        "kernelspec": { "name": "python3", "display_name": "Python 3" },
        "language_info": { "name": "python" },
    });
    format!(
        "{{\n  \"nbformat\": 4,\n  \"nbformat_minor\": 0,\n  \"metadata\": {},\n  \"cells\": [\n",
        pretty_block(&metadata, 2).trim_start()
    )
}

fn colab_postamble(_: &TargetContext) -> String {
    "\n  ]\n}\n".to_string()
}

/// Short cell id, stable across runs.
fn cell_id(s: &RenderedSnippet<'_>, kind: &str) -> String {
    let uuid = stable_uuid(&s.record.scope, &format!("{}/{kind}", s.trigger()));
    uuid.simple().to_string()[..12].to_string()
}

fn colab_record(s: &RenderedSnippet<'_>) -> String {
    let heading = format!(
        "## {}\n\n{}\n\n*{}*",
        s.trigger(),
        s.caption(),
        s.target.language
    );
    let markdown = json!({
        "cell_type": "markdown",
        "metadata": { "id": cell_id(s, "markdown") },
        "source": notebook_lines(&heading),
    });
    let code = json!({
        "cell_type": "code",
        "execution_count": null,
        "metadata": { "id": cell_id(s, "code") },
        "outputs": [],
        "source": notebook_lines(s.body),
    });
    format!("{},\n{}", pretty_block(&markdown, 4), pretty_block(&code, 4))
}

pub fn descriptors() -> Vec<FormatDescriptor> {
    vec![
        JUPYTER_CLIPPINGS,
        JUPYTER_MENU,
        JUPYTERLAB,
        JUPYTERLAB_ANNOTATED,
        JUPYTERLAB_LATEX,
        ELYRA,
        COLAB,
    ]
}
