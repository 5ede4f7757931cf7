//! CSS Token types per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! "The output of the tokenization step is a stream of zero or more of the
//! following tokens: `<ident-token>`, `<function-token>`, `<at-keyword-token>`,
//! `<hash-token>`, `<string-token>`, `<bad-string-token>`, `<url-token>`,
//! `<bad-url-token>`, `<delim-token>`, `<number-token>`, `<percentage-token>`,
//! `<dimension-token>`, `<unicode-range-token>`, `<whitespace-token>`,
//! `<CDO-token>`, `<CDC-token>`, `<colon-token>`, `<semicolon-token>`,
//! `<comma-token>`, `<[-token>`, `<]-token>`, `<(-token>`, `<)-token>`, `<{-token>`,
//! and `<}-token>`."
//!
//! `url(...)` is delivered as a `<function-token>` and unicode ranges are not
//! recognized; no supported property needs either.

use core::fmt;

use serde::Serialize;

/// A 1-based line/column position in the stylesheet source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number (in characters), starting at 1.
    pub column: usize,
}

impl SourceLocation {
    /// The position of the first character of the input.
    pub const START: Self = Self { line: 1, column: 1 };
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A `<hash-token>` with the type flag set to 'id'... or 'unrestricted'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// "id" - the hash token's value is a valid identifier
    Id,
    /// "unrestricted" - the hash token's value is not a valid identifier
    Unrestricted,
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// CSS tokens as defined by the CSS Syntax Module Level 3 specification.
#[derive(Debug, Clone, PartialEq)]
pub enum CSSToken {
    /// "`<ident-token>`"
    Ident(String),
    /// "`<function-token>`" (the name, without the opening parenthesis)
    Function(String),
    /// "`<at-keyword-token>`" (the name, without the `@`)
    AtKeyword(String),
    /// "`<hash-token>`"
    Hash {
        /// "a value composed of one or more code points"
        value: String,
        /// "a type flag set to either 'id' or 'unrestricted'"
        hash_type: HashType,
    },
    /// "`<string-token>`"
    String(String),
    /// "`<bad-string-token>`": a string interrupted by a newline.
    BadString,
    /// "`<delim-token>`"
    Delim(char),
    /// "`<number-token>`"
    Number(f64),
    /// "`<percentage-token>`"
    Percentage(f64),
    /// "`<dimension-token>`"
    Dimension {
        /// "a numeric value"
        value: f64,
        /// "a unit", lowercased
        unit: String,
    },
    /// "`<whitespace-token>`"
    Whitespace,
    /// "`<CDO-token>`" (`<!--`)
    CDO,
    /// "`<CDC-token>`" (`-->`)
    CDC,
    /// "`<colon-token>`"
    Colon,
    /// "`<semicolon-token>`"
    Semicolon,
    /// "`<comma-token>`"
    Comma,
    /// "`<[-token>`"
    LeftBracket,
    /// "`<]-token>`"
    RightBracket,
    /// "`<(-token>`"
    LeftParen,
    /// "`<)-token>`"
    RightParen,
    /// "`<{-token>`"
    LeftBrace,
    /// "`<}-token>`"
    RightBrace,
    /// "`<EOF-token>`"
    EOF,
}

impl CSSToken {
    /// Check if this token is EOF.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }
}

/// [§ 9 Serialization](https://www.w3.org/TR/css-syntax-3/#serialization)
///
/// A simplified serialization, used to rebuild selector text from prelude tokens.
impl fmt::Display for CSSToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => f.write_str(v),
            Self::Function(name) => write!(f, "{name}("),
            Self::AtKeyword(name) => write!(f, "@{name}"),
            Self::Hash { value, .. } => write!(f, "#{value}"),
            Self::String(v) => write!(f, "\"{v}\""),
            Self::BadString | Self::EOF => Ok(()),
            Self::Delim(c) => write!(f, "{c}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Percentage(n) => write!(f, "{n}%"),
            Self::Dimension { value, unit } => write!(f, "{value}{unit}"),
            Self::Whitespace => f.write_str(" "),
            Self::CDO => f.write_str("<!--"),
            Self::CDC => f.write_str("-->"),
            Self::Colon => f.write_str(":"),
            Self::Semicolon => f.write_str(";"),
            Self::Comma => f.write_str(","),
            Self::LeftBracket => f.write_str("["),
            Self::RightBracket => f.write_str("]"),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
            Self::LeftBrace => f.write_str("{"),
            Self::RightBrace => f.write_str("}"),
        }
    }
}

/// A token together with the position where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token.
    pub token: CSSToken,
    /// Where the token's first code point is in the source.
    pub location: SourceLocation,
}
