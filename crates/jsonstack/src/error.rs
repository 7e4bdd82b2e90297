//! Deserialization errors.
//!
//! Every failure is fatal: the driver short-circuits on the first error and
//! never returns a partial tree. Each error carries the character offset at
//! which it was raised, plus a 1-based line and column for diagnostics.

use thiserror::Error;

/// A deserialization failure, positioned in the input.
#[derive(Error, Debug)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    pub(crate) kind: ErrorKind,
    /// 0-based character offset of the offending character (or of the end
    /// of input).
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, offset: usize, line: usize, column: usize) -> Self {
        Self {
            kind,
            offset,
            line,
            column,
        }
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

/// The failure taxonomy.
///
/// `Io` wraps the underlying stream error untouched, which is why this enum
/// does not implement `PartialEq`; match on the variant instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A character matched no expected grammar production.
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
    /// End of input inside an open quoted string.
    #[error("unterminated string")]
    UnterminatedString,
    /// An unsupported escape character after a backslash, or a non-hex
    /// digit inside a `\u` escape.
    #[error("invalid escape character {0:?}")]
    InvalidEscape(char),
    /// A `\u` escape that does not denote a scalar value, such as an
    /// unpaired surrogate half.
    #[error("invalid unicode escape \\u{0:04X}")]
    InvalidUnicodeEscape(u32),
    /// A numeric literal violating the grammar; carries the offending
    /// token text.
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),
    /// A `t`/`f`/`n`-prefixed token that is not exactly `true`, `false`,
    /// or `null`; carries the offending token text.
    #[error("invalid literal {0:?}")]
    InvalidLiteral(String),
    /// Input exhausted while a composite value was still open.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// Non-whitespace input after the root value completed.
    #[error("trailing data starting with {0:?}")]
    TrailingData(char),
    /// Nesting exceeded the configured parse stack bound.
    #[error("maximum nesting depth of {0} exceeded")]
    MaxDepthExceeded(usize),
    /// The stream-backed input source failed to read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
