//! Stylesheet syntax errors.
//!
//! Unknown properties, unsupported values and unsupported selectors are not
//! errors; they are skipped during the cascade. Only input that cannot be
//! split into rules and declarations as written ends up here.

use thiserror::Error;

use crate::tokenizer::SourceLocation;

/// A CSS syntax error, located precisely enough to find the offending rule.
///
/// `rule_index` is the zero-based position of the rule among the top-level
/// rules of the stylesheet (style rules and at-rules alike).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssError {
    /// [§ 4.3.5](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    /// A string token interrupted by a newline or the end of input.
    #[error("unterminated string at {location}")]
    UnterminatedString {
        /// Position of the opening quote.
        location: SourceLocation,
    },

    /// [§ 4.3.2](https://www.w3.org/TR/css-syntax-3/#consume-comments)
    /// A `/*` comment without a closing `*/`.
    #[error("unterminated comment at {location}")]
    UnterminatedComment {
        /// Position of the opening `/*`.
        location: SourceLocation,
    },

    /// A rule block still open at the end of input.
    #[error("rule {rule_index}: block opened at {location} is never closed")]
    UnclosedBlock {
        /// Index of the rule owning the block.
        rule_index: usize,
        /// Position of the opening `{`.
        location: SourceLocation,
    },

    /// A `}` with no open block.
    #[error("unexpected '}}' at {location}")]
    UnexpectedClosingBrace {
        /// Position of the stray `}`.
        location: SourceLocation,
    },

    /// A rule block with no selector in front of it.
    #[error("rule {rule_index}: missing selector before '{{' at {location}")]
    EmptySelector {
        /// Index of the rule.
        rule_index: usize,
        /// Position of the `{`.
        location: SourceLocation,
    },

    /// A selector at the end of input with no declaration block.
    #[error("rule {rule_index}: selector at {location} has no declaration block")]
    MissingBlock {
        /// Index of the rule.
        rule_index: usize,
        /// Position where the selector starts.
        location: SourceLocation,
    },

    /// A declaration whose property name is not followed by a colon.
    #[error("rule {rule_index}: expected ':' after property '{property}' at {location}")]
    MissingColon {
        /// Index of the rule (0 for a standalone declaration list).
        rule_index: usize,
        /// The property name that was read.
        property: String,
        /// Position of the property name.
        location: SourceLocation,
    },

    /// A declaration that does not start with a property name.
    #[error("rule {rule_index}: invalid declaration at {location}")]
    InvalidDeclaration {
        /// Index of the rule (0 for a standalone declaration list).
        rule_index: usize,
        /// Position of the first token of the declaration.
        location: SourceLocation,
    },
}

impl CssError {
    /// Where in the source the error was detected.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        match self {
            Self::UnterminatedString { location }
            | Self::UnterminatedComment { location }
            | Self::UnclosedBlock { location, .. }
            | Self::UnexpectedClosingBrace { location }
            | Self::EmptySelector { location, .. }
            | Self::MissingBlock { location, .. }
            | Self::MissingColon { location, .. }
            | Self::InvalidDeclaration { location, .. } => *location,
        }
    }

    /// Index of the offending rule, when the error belongs to one.
    #[must_use]
    pub const fn rule_index(&self) -> Option<usize> {
        match self {
            Self::UnclosedBlock { rule_index, .. }
            | Self::EmptySelector { rule_index, .. }
            | Self::MissingBlock { rule_index, .. }
            | Self::MissingColon { rule_index, .. }
            | Self::InvalidDeclaration { rule_index, .. } => Some(*rule_index),
            Self::UnterminatedString { .. }
            | Self::UnterminatedComment { .. }
            | Self::UnexpectedClosingBrace { .. } => None,
        }
    }
}
