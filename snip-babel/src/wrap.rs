//! Body wrapping and escaping
//!
//! Adapts a rewritten body to the context it is embedded in: invoking each line through a
//! host-language command, fencing a reference copy, indenting, or escaping for a container format.
//!
//! Quote handling in [`wrap_each_line_in_invocation`] is two-phase. Every `"` and `'` of the body
//! is first swapped for a private sentinel, the lines are wrapped, and only then are the sentinels
//! resolved. Resolving after wrapping keeps the quotes of the template itself out of the escaping,
//! and lets the resolution be chosen per target ([`QuoteResolution`]).

use crate::record::YesNo;
use thiserror::Error;

/// Stands in for `"` while lines are being wrapped.
pub const DOUBLE_QUOTE_SENTINEL: char = '\u{E000}';
/// Stands in for `'` while lines are being wrapped.
pub const SINGLE_QUOTE_SENTINEL: char = '\u{E001}';

/// Marker in an invocation template replaced by each body line.
pub const LINE_PLACEHOLDER: &str = "{line}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WrapError {
    #[error("body contains a reserved quote sentinel")]
    EscapeCollision,
    #[error("record has no native-language flag")]
    MissingNativeFlag,
    #[error("invocation template '{0}' has no {{line}} placeholder")]
    MissingLinePlaceholder(String),
}

/// How quote sentinels are turned back into characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteResolution {
    /// Quotes matching the template delimiter are backslash-escaped, backslashes are doubled.
    /// The wrapped line parses back to the original text.
    #[default]
    Escape,
    /// Every quote becomes the opposite kind, so none can close the template's string.
    Swap,
}

/// Template used to invoke a foreign-language line from the host language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationStyle {
    template: String,
    quotes: QuoteResolution,
}

impl InvocationStyle {
    pub fn new(template: impl Into<String>, quotes: QuoteResolution) -> Result<Self, WrapError> {
        let template = template.into();
        if !template.contains(LINE_PLACEHOLDER) {
            return Err(WrapError::MissingLinePlaceholder(template));
        }
        Ok(Self { template, quotes })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn quotes(&self) -> QuoteResolution {
        self.quotes
    }

    /// Quote character directly enclosing the line placeholder, if any.
    pub fn delimiter(&self) -> Option<char> {
        let at = self.template.find(LINE_PLACEHOLDER)?;
        self.template[..at]
            .chars()
            .next_back()
            .filter(|c| *c == '\'' || *c == '"')
    }

    fn invoke(&self, line: &str) -> String {
        self.template.replace(LINE_PLACEHOLDER, line)
    }
}

impl Default for InvocationStyle {
    /// PyMOL's `cmd.do('<line>')`.
    fn default() -> Self {
        Self {
            template: "cmd.do('{line}')".to_string(),
            quotes: QuoteResolution::Escape,
        }
    }
}

/// Wrap every non-empty line of `body` in the invocation template.
pub fn wrap_each_line_in_invocation(
    body: &str,
    style: &InvocationStyle,
) -> Result<String, WrapError> {
    if body.contains(DOUBLE_QUOTE_SENTINEL) || body.contains(SINGLE_QUOTE_SENTINEL) {
        return Err(WrapError::EscapeCollision);
    }
    let delimiter = style.delimiter();

    let mut guarded = body
        .replace('"', &DOUBLE_QUOTE_SENTINEL.to_string())
        .replace('\'', &SINGLE_QUOTE_SENTINEL.to_string());
    if style.quotes == QuoteResolution::Escape && delimiter.is_some() {
        guarded = guarded.replace('\\', "\\\\");
    }

    let wrapped = guarded
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                style.invoke(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(resolve_sentinels(&wrapped, style.quotes, delimiter))
}

fn resolve_sentinels(text: &str, quotes: QuoteResolution, delimiter: Option<char>) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let original = match c {
            DOUBLE_QUOTE_SENTINEL => '"',
            SINGLE_QUOTE_SENTINEL => '\'',
            other => {
                out.push(other);
                continue;
            }
        };
        match quotes {
            QuoteResolution::Swap => out.push(if original == '"' { '\'' } else { '"' }),
            QuoteResolution::Escape if Some(original) == delimiter => {
                out.push('\\');
                out.push(original);
            }
            QuoteResolution::Escape => out.push(original),
        }
    }
    out
}

/// Surround `body` with a pair of fence lines.
pub fn comment_fence(body: &str, fence: &str) -> String {
    format!("{fence}\n{}\n{fence}", body.trim_end_matches('\n'))
}

/// Prefix every line with `n_spaces` spaces.
pub fn indent(body: &str, n_spaces: usize) -> String {
    if n_spaces == 0 {
        return body.to_string();
    }
    let pad = " ".repeat(n_spaces);
    body.lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn escape_newlines(body: &str) -> String {
    body.replace('\n', "\\n")
}

pub fn escape_backslashes(body: &str) -> String {
    body.replace('\\', "\\\\")
}

pub fn escape_xml(body: &str) -> String {
    body.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A single wrap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapOp {
    /// Wrap lines in the invocation template, for records that are not native code.
    Invoke,
    Indent(usize),
    /// Prepend the fenced reference copy of the body.
    FenceReference(&'static str),
    EscapeNewlines,
    EscapeBackslashes,
    EscapeXml,
}

/// Per-record inputs of the wrap pipeline.
#[derive(Debug, Clone, Copy)]
pub struct WrapContext<'a> {
    pub invocation: &'a InvocationStyle,
    pub native: Option<YesNo>,
    /// Canonical body without its final marker, used by [`WrapOp::FenceReference`].
    pub reference: &'a str,
}

/// Apply wrap steps in order.
pub fn apply_wrap_ops(
    body: String,
    ops: &[WrapOp],
    ctx: &WrapContext<'_>,
) -> Result<String, WrapError> {
    ops.iter().try_fold(body, |body, op| match op {
        WrapOp::Invoke => match ctx.native {
            Some(YesNo::Yes) => Ok(body),
            Some(YesNo::No) => wrap_each_line_in_invocation(&body, ctx.invocation),
            None => Err(WrapError::MissingNativeFlag),
        },
        WrapOp::Indent(n) => Ok(indent(&body, *n)),
        WrapOp::FenceReference(fence) => Ok(format!(
            "{}\n{}",
            comment_fence(ctx.reference, fence),
            body
        )),
        WrapOp::EscapeNewlines => Ok(escape_newlines(&body)),
        WrapOp::EscapeBackslashes => Ok(escape_backslashes(&body)),
        WrapOp::EscapeXml => Ok(escape_xml(&body)),
    })
}
