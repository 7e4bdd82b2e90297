//! Character classification for the dispatch loop.

/// The grammar action selected by one character of lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// `"` begins a string, or a key in key position.
    BeginString,
    /// `{` begins an object.
    BeginObject,
    /// `[` begins an array.
    BeginArray,
    /// `}` `]` `,` `:` are consumed by the enclosing composite's grammar,
    /// never as a value start.
    Structural,
    /// Insignificant whitespace.
    Whitespace,
    /// `t`, `f`, or `n` begins `true`, `false`, or `null`.
    BeginLiteral,
    /// A digit or `-` begins a number.
    BeginNumber,
    /// No production starts with this character.
    Invalid,
}

/// The four whitespace characters defined by the JSON specification:
/// space (U+0020), line feed (U+000A), carriage return (U+000D), and
/// horizontal tab (U+0009).
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Maps one character of lookahead to its grammar action. Pure; the caller
/// decides whether the action is legal in the current context.
pub(crate) fn classify(c: char) -> CharClass {
    match c {
        '"' => CharClass::BeginString,
        '{' => CharClass::BeginObject,
        '[' => CharClass::BeginArray,
        '}' | ']' | ',' | ':' => CharClass::Structural,
        't' | 'f' | 'n' => CharClass::BeginLiteral,
        '-' | '0'..='9' => CharClass::BeginNumber,
        c if is_whitespace(c) => CharClass::Whitespace,
        _ => CharClass::Invalid,
    }
}
