//! Placeholder rewriting
//!
//!     Snippet bodies use the TextMate-style tab-stop grammar:
//!
//!     - `${N:default}`  numbered stop with default text
//!     - `${N}` / `$N`   numbered stop without default (N >= 1)
//!     - `${0}` / `$0`   final cursor position (at most one per body)
//!
//!     The body is tokenized once by a small state machine into literal text, stops and the final
//!     marker. Every rewrite then works on tokens instead of chaining regular expressions, so a
//!     stray `}` in code or a `$` in a default value cannot be mistaken for markup.
//!
//!     A default ends at the first unescaped `}`; `\}` inside a default stays literal. Nested
//!     stops inside defaults are not supported: `${1:a ${2:b} c}` yields the default `a ${2:b`
//!     followed by the literal ` c}`.
//!
//!     Rewrites are order-sensitive. [`RewriteOp::EscapePercent`] must run before
//!     [`RewriteOp::ToPercentStyle`], otherwise the `%(...)s` markup it produces is escaped too.

use thiserror::Error;

/// Why a body could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    #[error("unterminated placeholder opened at byte {offset}")]
    Unterminated { offset: usize },
    #[error("unexpected '{found}' after placeholder index at byte {offset}")]
    UnexpectedChar { offset: usize, found: char },
    #[error("more than one final-position marker")]
    MultipleFinalMarkers,
}

/// One lexical unit of a snippet body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Plain text, kept byte-for-byte (escapes included).
    Literal(String),
    /// Numbered tab stop.
    Stop { index: u32, default: String },
    /// Final cursor position.
    Final,
}

/// A single rewrite step over the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOp {
    /// Drop final-position markers.
    StripFinalMarker,
    /// Replace every stop by its default text.
    StripNumberedStops,
    /// Double every `%` in literal and default text.
    EscapePercent,
    /// `${N:default}` to `%(default||default)s`.
    ToPercentStyle,
    /// `${N:default}` to `<open>default<close>`.
    ToBracketStyle {
        open: &'static str,
        close: &'static str,
    },
    /// Every stop and the final marker become the given cursor token.
    ToCursorMarker(&'static str),
}

/// A tokenized snippet body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceholderBody {
    tokens: Vec<Token>,
}

impl PlaceholderBody {
    /// Tokenize a body written in the canonical grammar.
    pub fn parse(source: &str) -> Result<Self, PlaceholderError> {
        Parser::new(source).run()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Apply one rewrite step.
    pub fn apply(self, op: RewriteOp) -> Self {
        let tokens = self
            .tokens
            .into_iter()
            .filter_map(|token| rewrite_token(token, op))
            .collect();
        Self { tokens }.merged()
    }

    /// Apply a pipeline of rewrite steps in order.
    pub fn apply_all(self, ops: &[RewriteOp]) -> Self {
        ops.iter().fold(self, |body, op| body.apply(*op))
    }

    /// Render back to text. Stops that were not rewritten keep the canonical syntax.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Stop { index, default } if default.is_empty() => {
                    out.push_str(&format!("${{{index}}}"));
                }
                Token::Stop { index, default } => {
                    out.push_str(&format!("${{{index}:{default}}}"));
                }
                Token::Final => out.push_str("${0}"),
            }
        }
        out
    }

    /// Join adjacent literals so that equality does not depend on rewrite history.
    fn merged(self) -> Self {
        let mut tokens: Vec<Token> = Vec::with_capacity(self.tokens.len());
        for token in self.tokens {
            if let Token::Literal(next) = &token {
                if next.is_empty() {
                    continue;
                }
                if let Some(Token::Literal(prev)) = tokens.last_mut() {
                    prev.push_str(next);
                    continue;
                }
            }
            tokens.push(token);
        }
        Self { tokens }
    }
}

fn rewrite_token(token: Token, op: RewriteOp) -> Option<Token> {
    match (op, token) {
        (RewriteOp::StripFinalMarker, Token::Final) => None,
        (RewriteOp::StripNumberedStops, Token::Stop { default, .. }) => {
            Some(Token::Literal(default))
        }
        (RewriteOp::EscapePercent, Token::Literal(text)) => {
            Some(Token::Literal(text.replace('%', "%%")))
        }
        (RewriteOp::EscapePercent, Token::Stop { index, default }) => Some(Token::Stop {
            index,
            default: default.replace('%', "%%"),
        }),
        (RewriteOp::ToPercentStyle, Token::Stop { index, default }) => {
            let name = if default.is_empty() {
                format!("field{index}")
            } else {
                default.clone()
            };
            Some(Token::Literal(format!("%({name}||{default})s")))
        }
        (RewriteOp::ToBracketStyle { open, close }, Token::Stop { default, .. }) => {
            Some(Token::Literal(format!("{open}{default}{close}")))
        }
        (RewriteOp::ToCursorMarker(marker), Token::Stop { .. } | Token::Final) => {
            Some(Token::Literal(marker.to_string()))
        }
        (_, token) => Some(token),
    }
}

/// Remove `$0` / `${0}` occurrences.
pub fn strip_final_marker(body: &str) -> Result<String, PlaceholderError> {
    rewrite(body, &[RewriteOp::StripFinalMarker])
}

/// Remove `${N:` and the paired `}` while keeping the default text.
pub fn strip_numbered_stops(body: &str) -> Result<String, PlaceholderError> {
    rewrite(body, &[RewriteOp::StripNumberedStops])
}

/// Convert stops to `%(default||default)s`. Literal `%` must already be escaped.
pub fn to_percent_style(body: &str) -> Result<String, PlaceholderError> {
    rewrite(body, &[RewriteOp::ToPercentStyle])
}

/// Convert stops to a bracket convention such as `[[%tabstop:default]]`.
pub fn to_bracket_style(
    body: &str,
    open: &'static str,
    close: &'static str,
) -> Result<String, PlaceholderError> {
    rewrite(body, &[RewriteOp::ToBracketStyle { open, close }])
}

/// Parse, apply `ops` in order and render.
pub fn rewrite(body: &str, ops: &[RewriteOp]) -> Result<String, PlaceholderError> {
    Ok(PlaceholderBody::parse(body)?.apply_all(ops).render())
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
    literal: String,
    tokens: Vec<Token>,
    finals: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            literal: String::new(),
            tokens: Vec::new(),
            finals: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_digits(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            self.tokens
                .push(Token::Literal(std::mem::take(&mut self.literal)));
        }
    }

    fn push_marker(&mut self, index: u32, default: String) -> Result<(), PlaceholderError> {
        self.flush_literal();
        if index == 0 {
            self.finals += 1;
            if self.finals > 1 {
                return Err(PlaceholderError::MultipleFinalMarkers);
            }
            if !default.is_empty() {
                self.tokens.push(Token::Literal(default));
            }
            self.tokens.push(Token::Final);
        } else {
            self.tokens.push(Token::Stop { index, default });
        }
        Ok(())
    }

    fn run(mut self) -> Result<PlaceholderBody, PlaceholderError> {
        while let Some(c) = self.peek() {
            match c {
                '\\' if matches!(self.peek_at(1), Some('$' | '}' | '\\')) => {
                    self.bump();
                    let escaped = self.bump().unwrap_or('\\');
                    self.literal.push('\\');
                    self.literal.push(escaped);
                }
                '$' if self.peek_at(1) == Some('{')
                    && matches!(self.peek_at(2), Some(d) if d.is_ascii_digit()) =>
                {
                    self.braced()?;
                }
                '$' if matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => {
                    self.bump();
                    let index = parse_index(self.take_digits());
                    self.push_marker(index, String::new())?;
                }
                _ => {
                    self.bump();
                    self.literal.push(c);
                }
            }
        }
        self.flush_literal();
        Ok(PlaceholderBody {
            tokens: self.tokens,
        })
    }

    /// Parse `${N}` or `${N:default}`; the cursor sits on the `$`.
    fn braced(&mut self) -> Result<(), PlaceholderError> {
        let open = self.pos;
        self.pos += 2;
        let index = parse_index(self.take_digits());
        match self.bump() {
            Some('}') => self.push_marker(index, String::new()),
            Some(':') => {
                let mut default = String::new();
                loop {
                    match self.bump() {
                        None => return Err(PlaceholderError::Unterminated { offset: open }),
                        Some('\\') if self.peek() == Some('}') => {
                            self.bump();
                            default.push_str("\\}");
                        }
                        Some('}') => break,
                        Some(c) => default.push(c),
                    }
                }
                self.push_marker(index, default)
            }
            Some(found) => Err(PlaceholderError::UnexpectedChar {
                offset: self.pos - found.len_utf8(),
                found,
            }),
            None => Err(PlaceholderError::Unterminated { offset: open }),
        }
    }
}

fn parse_index(digits: &str) -> u32 {
    // Indices beyond u32 are not meaningful to any editor; saturate instead of failing.
    digits.parse().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use proptest::prelude::*;

    #[test]
    fn tokenizes_all_marker_forms() {
        let body = PlaceholderBody::parse("a ${1:x} $2 ${3} $0").unwrap();
        assert_eq!(
            body.tokens(),
            &[
                Token::Literal("a ".to_string()),
                Token::Stop {
                    index: 1,
                    default: "x".to_string()
                },
                Token::Literal(" ".to_string()),
                Token::Stop {
                    index: 2,
                    default: String::new()
                },
                Token::Literal(" ".to_string()),
                Token::Stop {
                    index: 3,
                    default: String::new()
                },
                Token::Literal(" ".to_string()),
                Token::Final,
            ]
        );
    }

    #[test]
    fn braces_and_dollars_in_code_are_literal() {
        let source = "d = {'a': 1}; echo $HOME ${name}";
        let body = PlaceholderBody::parse(source).unwrap();
        assert_eq!(body.tokens(), &[Token::Literal(source.to_string())]);
        assert_eq!(body.render(), source);
    }

    #[test]
    fn stripping_keeps_defaults() {
        let out = strip_numbered_stops("print(${1:'hi'})${0}").unwrap();
        assert_eq!(strip_final_marker(&out).unwrap(), "print('hi')");
    }

    #[test]
    fn round_trip_example_from_docs() {
        let out = rewrite(
            "${1:foo}...${2:bar}...${0}",
            &[RewriteOp::StripNumberedStops, RewriteOp::StripFinalMarker],
        )
        .unwrap();
        assert_snapshot!(out, @"foo...bar...");
    }

    #[test]
    fn default_ends_at_first_unescaped_brace() {
        let body = PlaceholderBody::parse(r"${1:a\}b} rest}").unwrap();
        assert_eq!(
            body.tokens()[0],
            Token::Stop {
                index: 1,
                default: r"a\}b".to_string()
            }
        );
        assert_eq!(body.tokens()[1], Token::Literal(" rest}".to_string()));
    }

    #[test]
    fn nested_stops_truncate_at_first_brace() {
        let out = strip_numbered_stops("${1:a ${2:b} c}").unwrap();
        assert_eq!(out, "a ${2:b c}");
    }

    #[test]
    fn unterminated_stop_is_an_error() {
        let err = PlaceholderBody::parse("${1:unterminated").unwrap_err();
        assert_eq!(err, PlaceholderError::Unterminated { offset: 0 });
    }

    #[test]
    fn unexpected_character_after_index_is_an_error() {
        let err = PlaceholderBody::parse("x ${12;y}").unwrap_err();
        assert_eq!(
            err,
            PlaceholderError::UnexpectedChar {
                offset: 6,
                found: ';'
            }
        );
    }

    #[test]
    fn two_final_markers_are_rejected() {
        let err = PlaceholderBody::parse("a $0 b ${0}").unwrap_err();
        assert_eq!(err, PlaceholderError::MultipleFinalMarkers);
    }

    #[test]
    fn percent_style_duplicates_default() {
        let out = to_percent_style("color ${1:red}, ${2:sele}").unwrap();
        assert_snapshot!(out, @"color %(red||red)s, %(sele||sele)s");
    }

    #[test]
    fn percent_escape_must_come_first() {
        let escaped_first = rewrite(
            "set ${1:50%} 10%",
            &[RewriteOp::EscapePercent, RewriteOp::ToPercentStyle],
        )
        .unwrap();
        assert_eq!(escaped_first, "set %(50%%||50%%)s 10%%");

        let escaped_last = rewrite(
            "set ${1:50%} 10%",
            &[RewriteOp::ToPercentStyle, RewriteOp::EscapePercent],
        )
        .unwrap();
        assert_eq!(escaped_last, "set %%(50%%||50%%)s 10%%");
    }

    #[test]
    fn percent_style_names_empty_stops() {
        assert_eq!(to_percent_style("x $1").unwrap(), "x %(field1||)s");
    }

    #[test]
    fn bracket_style_uses_given_delimiters() {
        let out = to_bracket_style("show ${1:cartoon}", "[[%tabstop:", "]]").unwrap();
        assert_snapshot!(out, @"show [[%tabstop:cartoon]]");
    }

    #[test]
    fn cursor_marker_replaces_stops_and_final() {
        let out = rewrite("a ${1:x} b $0", &[RewriteOp::ToCursorMarker("%cursor%")]).unwrap();
        assert_eq!(out, "a %cursor% b %cursor%");
    }

    #[test]
    fn unrewritten_body_renders_canonically() {
        let out = rewrite("a $1 b $0", &[]).unwrap();
        assert_eq!(out, "a ${1} b ${0}");
    }

    #[test]
    fn final_with_default_keeps_text() {
        let body = PlaceholderBody::parse("${0:end}").unwrap();
        assert_eq!(
            body.tokens(),
            &[Token::Literal("end".to_string()), Token::Final]
        );
    }

    #[test]
    fn escaped_dollar_is_literal() {
        let body = PlaceholderBody::parse(r"cost \$1").unwrap();
        assert_eq!(body.tokens(), &[Token::Literal(r"cost \$1".to_string())]);
    }

    proptest! {
        #[test]
        fn stripping_introduces_no_markup(
            parts in proptest::collection::vec("[a-z .()=']{0,8}", 1..6)
        ) {
            let mut body = String::new();
            let mut expected = String::new();
            for (i, part) in parts.iter().enumerate() {
                body.push_str(&format!("${{{}:{}}}...", i + 1, part));
                expected.push_str(part);
                expected.push_str("...");
            }
            body.push_str("${0}");
            let out = rewrite(
                &body,
                &[RewriteOp::StripNumberedStops, RewriteOp::StripFinalMarker],
            ).unwrap();
            prop_assert_eq!(&out, &expected);
            prop_assert!(!out.contains('$'), "residual dollar in {:?}", out);
            prop_assert!(!out.contains('{'), "residual open brace in {:?}", out);
            prop_assert!(!out.contains('}'), "residual close brace in {:?}", out);
        }

        #[test]
        fn parsing_never_panics(source in "\\PC{0,40}") {
            let _ = PlaceholderBody::parse(&source);
        }
    }
}
