//! A blocking JSON deserializer that builds a complete value tree without
//! native recursion.
//!
//! Nesting lives on an explicit, depth-bounded frame stack instead of the
//! call stack, so adversarially deep documents fail with a typed error
//! instead of exhausting host stack limits. Input arrives through a minimal
//! two-method lookahead contract ([`CharSource`]) with buffer-backed
//! ([`TextSource`]) and stream-backed ([`StreamSource`]) implementations.
//!
//! # Examples
//!
//! Deserializing from a string:
//!
//! ```rust
//! use jsonstack::{Number, Value, from_str};
//!
//! let value = from_str(r#"{"k": [1, 2.5]}"#).unwrap();
//! let items = value.as_object().unwrap()["k"].as_array().unwrap();
//! assert_eq!(items[0], Value::Number(Number::Integer(1)));
//! assert_eq!(items[1], Value::Number(Number::Float(2.5)));
//! ```
//!
//! Deserializing from any reader:
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use jsonstack::{Value, from_reader};
//!
//! let value = from_reader(Cursor::new(b"[true, null]")).unwrap();
//! assert_eq!(
//!     value,
//!     Value::Array(vec![Value::Boolean(true), Value::Null])
//! );
//! ```

mod classify;
mod error;
mod escape_buffer;
mod literal_buffer;
mod options;
mod parser;
mod source;
mod value;

#[cfg(test)]
mod tests;

pub use error::{ErrorKind, ParseError};
pub use options::{DEFAULT_MAX_DEPTH, DeserializerOptions};
pub use parser::Deserializer;
pub use source::{CharSource, StreamSource, TextSource};
pub use value::{Array, Map, Number, Value};

use std::io::Read;

/// Deserializes a complete JSON document from a string.
///
/// # Errors
///
/// Returns the first grammar violation, positioned in the input; there is
/// no recovery and no partial result.
///
/// # Examples
///
/// ```rust
/// use jsonstack::{Value, from_str};
///
/// assert_eq!(from_str("null").unwrap(), Value::Null);
/// assert!(from_str("null nonsense").is_err());
/// ```
pub fn from_str(text: &str) -> Result<Value, ParseError> {
    from_str_with_options(text, DeserializerOptions::default())
}

/// Deserializes a complete JSON document from a string with explicit
/// options.
///
/// # Errors
///
/// As [`from_str`]; additionally fails with
/// [`ErrorKind::MaxDepthExceeded`] when nesting passes
/// [`DeserializerOptions::max_depth`].
pub fn from_str_with_options(
    text: &str,
    options: DeserializerOptions,
) -> Result<Value, ParseError> {
    Deserializer::new(TextSource::new(text), options).deserialize()
}

/// Deserializes a complete JSON document from a UTF-8 reader.
///
/// Characters are decoded from the reader one at a time; the whole input
/// is never materialized. A stalled reader blocks indefinitely; apply
/// timeouts at the stream layer if needed.
///
/// # Errors
///
/// As [`from_str`]; read failures surface as [`ErrorKind::Io`].
pub fn from_reader<R: Read>(reader: R) -> Result<Value, ParseError> {
    from_reader_with_options(reader, DeserializerOptions::default())
}

/// Deserializes a complete JSON document from a UTF-8 reader with explicit
/// options.
///
/// # Errors
///
/// As [`from_reader`].
pub fn from_reader_with_options<R: Read>(
    reader: R,
    options: DeserializerOptions,
) -> Result<Value, ParseError> {
    Deserializer::new(StreamSource::new(reader), options).deserialize()
}
