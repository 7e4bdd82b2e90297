//! Input sources.
//!
//! The deserializer consumes characters through the narrow [`CharSource`]
//! contract: one character of lookahead, nothing else. Two implementations
//! are provided: a buffer-backed source over fully materialized text, and a
//! stream-backed source that decodes characters from a reader as they are
//! requested.

use std::io::{self, BufReader, Read};

/// One-character lookahead and consumption over a text input.
///
/// `None` is the end marker. `peek` is idempotent and never advances the
/// position; `take` consumes exactly the character a directly preceding
/// `peek` returned.
pub trait CharSource {
    /// Returns the next character without consuming it, or `None` at end
    /// of input.
    ///
    /// # Errors
    ///
    /// Stream-backed sources propagate read failures.
    fn peek(&mut self) -> io::Result<Option<char>>;

    /// Returns and consumes the next character, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Stream-backed sources propagate read failures.
    fn take(&mut self) -> io::Result<Option<char>>;
}

/// A source backed by a fully materialized text buffer.
///
/// The text is collected into a character sequence up front, so `peek` and
/// `take` are O(1), never block, and never fail.
#[derive(Debug)]
pub struct TextSource {
    chars: Vec<char>,
    cursor: usize,
}

impl TextSource {
    /// Creates a source over the given text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            cursor: 0,
        }
    }
}

impl CharSource for TextSource {
    fn peek(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.get(self.cursor).copied())
    }

    fn take(&mut self) -> io::Result<Option<char>> {
        let c = self.chars.get(self.cursor).copied();
        if c.is_some() {
            self.cursor += 1;
        }
        Ok(c)
    }
}

/// A source that decodes UTF-8 characters one at a time from a reader.
///
/// Reads are buffered internally. `peek` holds the decoded character in a
/// lookahead cell instead of seeking the reader backwards, so any [`Read`]
/// works, including non-seekable pipes and sockets. A stalled reader blocks
/// the calling thread; apply timeouts at the stream layer if that matters.
///
/// Invalid UTF-8 surfaces as an [`io::ErrorKind::InvalidData`] error.
#[derive(Debug)]
pub struct StreamSource<R: Read> {
    reader: BufReader<R>,
    peeked: Option<char>,
    done: bool,
}

impl<R: Read> StreamSource<R> {
    /// Creates a source over `reader`. The stream must be UTF-8 text;
    /// decode other encodings before handing bytes in.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            peeked: None,
            done: false,
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            return match self.reader.read(&mut byte) {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
        }
    }

    /// Decodes the next scalar value from the stream, or `None` at end of
    /// input.
    fn decode_char(&mut self) -> io::Result<Option<char>> {
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };
        let width = utf8_width(first).ok_or_else(invalid_utf8)?;
        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.read_byte()?.ok_or_else(invalid_utf8)?;
        }
        let decoded = std::str::from_utf8(&bytes[..width]).map_err(|_| invalid_utf8())?;
        Ok(decoded.chars().next())
    }
}

/// Sequence length implied by a UTF-8 leading byte.
fn utf8_width(byte: u8) -> Option<usize> {
    match byte {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        "stream did not contain valid UTF-8",
    )
}

impl<R: Read> CharSource for StreamSource<R> {
    fn peek(&mut self) -> io::Result<Option<char>> {
        if self.peeked.is_none() && !self.done {
            self.peeked = self.decode_char()?;
            if self.peeked.is_none() {
                self.done = true;
            }
        }
        Ok(self.peeked)
    }

    fn take(&mut self) -> io::Result<Option<char>> {
        if let Some(c) = self.peeked.take() {
            return Ok(Some(c));
        }
        if self.done {
            return Ok(None);
        }
        let c = self.decode_char()?;
        if c.is_none() {
            self.done = true;
        }
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::{CharSource, StreamSource, TextSource};

    fn drain<S: CharSource>(source: &mut S) -> String {
        let mut out = String::new();
        while let Some(c) = source.take().unwrap() {
            out.push(c);
        }
        out
    }

    #[test]
    fn text_source_peek_is_idempotent() {
        let mut source = TextSource::new("ab");
        assert_eq!(source.peek().unwrap(), Some('a'));
        assert_eq!(source.peek().unwrap(), Some('a'));
        assert_eq!(source.take().unwrap(), Some('a'));
        assert_eq!(source.peek().unwrap(), Some('b'));
        assert_eq!(source.take().unwrap(), Some('b'));
        assert_eq!(source.peek().unwrap(), None);
        assert_eq!(source.take().unwrap(), None);
    }

    #[test]
    fn stream_source_peek_is_idempotent() {
        let mut source = StreamSource::new(Cursor::new("ab"));
        assert_eq!(source.peek().unwrap(), Some('a'));
        assert_eq!(source.peek().unwrap(), Some('a'));
        assert_eq!(source.take().unwrap(), Some('a'));
        assert_eq!(source.take().unwrap(), Some('b'));
        assert_eq!(source.peek().unwrap(), None);
        assert_eq!(source.take().unwrap(), None);
    }

    #[test]
    fn stream_source_decodes_multibyte_characters() {
        let text = "h\u{00E9}\u{2028}\u{1F600}";
        let mut source = StreamSource::new(Cursor::new(text.as_bytes().to_vec()));
        assert_eq!(drain(&mut source), text);
    }

    #[test]
    fn both_sources_agree() {
        let text = r#"{"kéy": [1, 2.5]}"#;
        let mut text_source = TextSource::new(text);
        let mut stream_source = StreamSource::new(Cursor::new(text));
        assert_eq!(drain(&mut text_source), drain(&mut stream_source));
    }

    #[test]
    fn invalid_utf8_is_an_io_error() {
        let mut source = StreamSource::new(Cursor::new(vec![0xFF, 0x20]));
        let err = source.take().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_utf8_is_an_io_error() {
        // The leading byte promises two bytes; the stream ends first.
        let mut source = StreamSource::new(Cursor::new(vec![0xC3]));
        let err = source.peek().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
