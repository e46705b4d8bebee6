// SPDX-License-Identifier: MIT OR Apache-2.0

//! Positional format templates for syscall arguments.
//!
//! A template is plain text with substitution sites that consume one raw
//! argument word each: `{}` renders decimal, `{:x}` lower hex and `{:#x}`
//! `0x`-prefixed hex. `{{` and `}}` escape literal braces. Templates are
//! parsed once, when the syscall table is built, so expansion never fails
//! while a trace is running.

use thiserror::Error;

/// A template failed to parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{` without a matching `}`.
    #[error("unclosed placeholder")]
    Unclosed,

    /// A placeholder with a format spec other than ``, `:x` or `:#x`.
    #[error("unsupported format spec {{{0}}}")]
    UnsupportedSpec(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spec {
    Decimal,
    Hex,
    PrefixedHex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Placeholder(Spec),
}

/// A parsed argument-format template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    /// An empty template, rendering the empty string.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses `text` into a template.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut spec = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => spec.push(c),
                            None => return Err(TemplateError::Unclosed),
                        }
                    }
                    let spec = match spec.as_str() {
                        "" => Spec::Decimal,
                        ":x" => Spec::Hex,
                        ":#x" => Spec::PrefixedHex,
                        other => return Err(TemplateError::UnsupportedSpec(other.to_string())),
                    };
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Placeholder(spec));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Template { pieces })
    }

    /// Number of substitution sites in the template.
    pub fn placeholders(&self) -> usize {
        self.pieces
            .iter()
            .filter(|p| matches!(p, Piece::Placeholder(_)))
            .count()
    }

    /// Substitutes `args` into the template, left to right. Arguments beyond
    /// the placeholder count are ignored; placeholders beyond the argument
    /// count render nothing.
    pub fn expand(&self, args: &[u64]) -> String {
        let mut out = String::new();
        let mut args = args.iter();

        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Placeholder(spec) => {
                    if let Some(arg) = args.next() {
                        match spec {
                            Spec::Decimal => out.push_str(&arg.to_string()),
                            Spec::Hex => out.push_str(&format!("{arg:x}")),
                            Spec::PrefixedHex => out.push_str(&format!("{arg:#x}")),
                        }
                    }
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_has_no_placeholders() {
        let t = Template::parse("...").unwrap();
        assert_eq!(t.placeholders(), 0);
        assert_eq!(t.expand(&[1, 2, 3]), "...");
    }

    #[test]
    fn decimal_substitution() {
        let t = Template::parse("fd={}, count={}").unwrap();
        assert_eq!(t.placeholders(), 2);
        assert_eq!(t.expand(&[3, 128]), "fd=3, count=128");
    }

    #[test]
    fn hex_substitution() {
        let t = Template::parse("addr={:#x}, len={:x}").unwrap();
        assert_eq!(t.expand(&[0x7f00, 255]), "addr=0x7f00, len=ff");
    }

    #[test]
    fn escaped_braces_are_literal() {
        let t = Template::parse("set={{{}}}").unwrap();
        assert_eq!(t.placeholders(), 1);
        assert_eq!(t.expand(&[7]), "set={7}");
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let t = Template::parse("status={}").unwrap();
        assert_eq!(t.expand(&[42, 9, 9, 9, 9, 9]), "status=42");
    }

    #[test]
    fn unclosed_placeholder_is_rejected() {
        assert_eq!(Template::parse("fd={"), Err(TemplateError::Unclosed));
    }

    #[test]
    fn unknown_spec_is_rejected() {
        assert_eq!(
            Template::parse("fd={:o}"),
            Err(TemplateError::UnsupportedSpec(":o".to_string()))
        );
    }
}
