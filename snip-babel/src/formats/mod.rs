//! Format implementations
//!
//! One [`FormatDescriptor`] per target editor, grouped by family:
//!
//! - [`editors`] general-purpose editors with their own snippet files
//! - [`xml`] targets whose snippet files are XML or property lists
//! - [`vim`] Vim snippet engines
//! - [`jupyter`] notebook-oriented targets (clippings, menus, category trees, Elyra, Colab)
//!
//! The helpers below are shared escaping routines for the record templates.

pub mod editors;
pub mod jupyter;
pub mod vim;
pub mod xml;

use crate::format::FormatDescriptor;
use crate::wrap::escape_xml;

/// Every built-in descriptor.
pub fn all() -> Vec<FormatDescriptor> {
    let mut formats = Vec::new();
    formats.extend(editors::descriptors());
    formats.extend(xml::descriptors());
    formats.extend(vim::descriptors());
    formats.extend(jupyter::descriptors());
    formats
}

/// Quote `s` as a JSON string, which is also a valid JavaScript, YAML and EDN string.
pub(crate) fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Escape `s` for use inside a double- or single-quoted XML attribute.
pub(crate) fn xml_attr(s: &str) -> String {
    escape_xml(s).replace('"', "&quot;").replace('\'', "&apos;")
}

/// Wrap `s` in a CDATA section, splitting any `]]>` it contains.
pub(crate) fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}

/// Lines in notebook `source` form: every line but the last keeps its newline.
pub(crate) fn notebook_lines(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let last = lines.len().saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i < last {
                format!("{line}\n")
            } else {
                line.to_string()
            }
        })
        .collect()
}
