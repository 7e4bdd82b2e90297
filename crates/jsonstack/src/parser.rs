//! The stack-driven deserialization loop.
//!
//! The driver repeatedly peeks one character, classifies it, and dispatches
//! into the grammar sub-parser selected by the innermost open composite's
//! sub-state. Nesting never grows the call stack: entering an object or
//! array pushes a [`Frame`] onto an explicit, depth-bounded stack, and the
//! matching closing token pops it and hands the finished value to the new
//! top of stack. Scalars (strings, numbers, literals) are parsed to
//! completion in place and never occupy a stack slot, so the depth bound
//! measures exactly what it should: open composites.

use crate::{
    classify::{self, CharClass},
    error::{ErrorKind, ParseError},
    escape_buffer::UnicodeEscapeBuffer,
    literal_buffer::{LiteralMatcher, Step},
    options::DeserializerOptions,
    source::CharSource,
    value::{Array, Map, Number, Value},
};

// ------------------------------------------------------------------------
// Parse contexts
// ------------------------------------------------------------------------

/// Sub-state of an open object frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    /// Immediately after `{`: a key or `}` may follow.
    FirstKeyOrClose,
    /// After a `,`: a key must follow.
    Key,
    /// After a key: a `:` must follow.
    Colon,
    /// After a `:`: a value must follow.
    Value,
    /// After a member: `,` or `}` must follow.
    CommaOrClose,
}

/// Sub-state of an open array frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    /// Immediately after `[`: a value or `]` may follow.
    FirstValueOrClose,
    /// After a `,`: a value must follow.
    Value,
    /// After an element: `,` or `]` must follow.
    CommaOrClose,
}

/// Stack entry: one per open composite, carrying its partially built
/// accumulator.
#[derive(Debug)]
enum Frame {
    Object {
        entries: Map,
        pending_key: Option<String>,
        state: ObjectState,
    },
    Array {
        items: Array,
        state: ArrayState,
    },
}

impl Frame {
    fn object() -> Self {
        Frame::Object {
            entries: Map::new(),
            pending_key: None,
            state: ObjectState::FirstKeyOrClose,
        }
    }

    fn array() -> Self {
        Frame::Array {
            items: Array::new(),
            state: ArrayState::FirstValueOrClose,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Frame::Object { entries, .. } => Value::Object(entries),
            Frame::Array { items, .. } => Value::Array(items),
        }
    }
}

/// Last-in-first-out sequence of open composites, bounded by the
/// configured maximum depth.
#[derive(Debug)]
struct FrameStack {
    frames: Vec<Frame>,
    max_depth: usize,
}

impl FrameStack {
    fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// `true` if pushing one more frame would exceed the bound.
    fn is_full(&self) -> bool {
        self.frames.len() >= self.max_depth
    }

    fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    fn last_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    fn push(&mut self, frame: Frame) {
        debug_assert!(self.frames.len() < self.max_depth);
        self.frames.push(frame);
    }

    fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }
}

/// Which sub-parser the next loop iteration dispatches into.
#[derive(Debug, Clone, Copy)]
enum Dispatch {
    Root,
    Object(ObjectState),
    Array(ArrayState),
}

// ------------------------------------------------------------------------
// Driver
// ------------------------------------------------------------------------

/// The deserialization driver.
///
/// `Deserializer` owns a character source and converts its content into a
/// single [`Value`] tree. Nested objects and arrays live on an explicit
/// frame stack rather than the call stack, so the recursion depth a
/// document can force is bounded by [`DeserializerOptions::max_depth`]
/// regardless of host stack limits.
///
/// Most callers want the [`from_str`]/[`from_reader`] conveniences; build
/// a `Deserializer` directly to supply a custom [`CharSource`].
///
/// [`from_str`]: crate::from_str
/// [`from_reader`]: crate::from_reader
///
/// # Examples
///
/// ```rust
/// use jsonstack::{Deserializer, DeserializerOptions, TextSource};
///
/// let source = TextSource::new(r#"{"k": [1, 2]}"#);
/// let value = Deserializer::new(source, DeserializerOptions::default())
///     .deserialize()
///     .unwrap();
/// assert!(value.is_object());
/// ```
#[derive(Debug)]
pub struct Deserializer<S: CharSource> {
    source: S,
    stack: FrameStack,

    /// Global character offset, 0-based.
    offset: usize,
    line: usize,
    column: usize,

    /// Scratch for number and literal token text.
    buffer: String,
}

impl<S: CharSource> Deserializer<S> {
    /// Creates a driver over `source` with the given options.
    #[must_use]
    pub fn new(source: S, options: DeserializerOptions) -> Self {
        Self {
            source,
            stack: FrameStack::new(options.max_depth.max(1)),
            offset: 0,
            line: 1,
            column: 1,
            buffer: String::new(),
        }
    }

    /// Runs the deserialization to completion, consuming the driver.
    ///
    /// Succeeds when the input holds exactly one JSON document, optionally
    /// surrounded by insignificant whitespace.
    ///
    /// # Errors
    ///
    /// The first grammar violation or read failure aborts the whole
    /// deserialization; no partial tree is returned.
    pub fn deserialize(mut self) -> Result<Value, ParseError> {
        let root = self.parse_document()?;
        self.skip_whitespace()?;
        match self.peek()? {
            None => Ok(root),
            Some(c) => Err(self.error(ErrorKind::TrailingData(c))),
        }
    }

    // ---- input plumbing ------------------------------------------------

    fn peek(&mut self) -> Result<Option<char>, ParseError> {
        match self.source.peek() {
            Ok(c) => Ok(c),
            Err(e) => Err(self.error(ErrorKind::Io(e))),
        }
    }

    /// Consumes the character last returned by `peek`, advancing the
    /// position counters.
    fn bump(&mut self) -> Result<(), ParseError> {
        match self.source.take() {
            Ok(Some(c)) => {
                self.offset += 1;
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(self.error(ErrorKind::Io(e))),
        }
    }

    /// An error positioned at the cursor, i.e. at the peeked character (or
    /// at end of input).
    fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.offset, self.line, self.column)
    }

    fn skip_whitespace(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek()? {
            if !classify::is_whitespace(c) {
                break;
            }
            self.bump()?;
        }
        Ok(())
    }

    // ---- dispatch loop -------------------------------------------------

    /// Drives the peek/classify/dispatch loop until the root value
    /// completes.
    fn parse_document(&mut self) -> Result<Value, ParseError> {
        loop {
            self.skip_whitespace()?;
            let dispatch = match self.stack.last() {
                None => Dispatch::Root,
                Some(Frame::Object { state, .. }) => Dispatch::Object(*state),
                Some(Frame::Array { state, .. }) => Dispatch::Array(*state),
            };
            let completed = match dispatch {
                Dispatch::Root | Dispatch::Object(ObjectState::Value) => self.begin_value()?,
                Dispatch::Object(ObjectState::FirstKeyOrClose) => self.object_key(true)?,
                Dispatch::Object(ObjectState::Key) => self.object_key(false)?,
                Dispatch::Object(ObjectState::Colon) => self.object_colon()?,
                Dispatch::Object(ObjectState::CommaOrClose) => self.object_comma_or_close()?,
                Dispatch::Array(ArrayState::FirstValueOrClose) => self.array_value(true)?,
                Dispatch::Array(ArrayState::Value) => self.array_value(false)?,
                Dispatch::Array(ArrayState::CommaOrClose) => self.array_comma_or_close()?,
            };
            if let Some(value) = completed {
                if let Some(root) = self.finish_value(value) {
                    return Ok(root);
                }
            }
        }
    }

    /// Begins a value at the cursor. Scalars complete immediately; `{` and
    /// `[` push a frame and complete when their closing token pops it.
    fn begin_value(&mut self) -> Result<Option<Value>, ParseError> {
        let Some(c) = self.peek()? else {
            return Err(self.error(ErrorKind::UnexpectedEndOfInput));
        };
        match classify::classify(c) {
            CharClass::BeginString => self.parse_string().map(|s| Some(Value::String(s))),
            CharClass::BeginObject => {
                self.push_frame(Frame::object())?;
                Ok(None)
            }
            CharClass::BeginArray => {
                self.push_frame(Frame::array())?;
                Ok(None)
            }
            CharClass::BeginLiteral => self.parse_literal().map(Some),
            CharClass::BeginNumber => self.parse_number().map(Some),
            CharClass::Structural | CharClass::Whitespace | CharClass::Invalid => {
                Err(self.error(ErrorKind::UnexpectedCharacter(c)))
            }
        }
    }

    /// Depth guard: checked before the opening token is consumed, so the
    /// error points at the offending `{` or `[`.
    fn push_frame(&mut self, frame: Frame) -> Result<(), ParseError> {
        if self.stack.is_full() {
            return Err(self.error(ErrorKind::MaxDepthExceeded(self.stack.max_depth())));
        }
        self.bump()?;
        self.stack.push(frame);
        Ok(())
    }

    /// Pops the innermost composite and converts it into its value.
    fn pop_frame(&mut self) -> Option<Value> {
        self.stack.pop().map(Frame::into_value)
    }

    /// Hands a finished value to the innermost open composite, or returns
    /// it when no composite is open: then it is the root.
    fn finish_value(&mut self, value: Value) -> Option<Value> {
        match self.stack.last_mut() {
            None => Some(value),
            Some(Frame::Object {
                entries,
                pending_key,
                state,
            }) => {
                // Repeated keys overwrite: the last value wins.
                if let Some(key) = pending_key.take() {
                    entries.insert(key, value);
                }
                *state = ObjectState::CommaOrClose;
                None
            }
            Some(Frame::Array { items, state }) => {
                items.push(value);
                *state = ArrayState::CommaOrClose;
                None
            }
        }
    }

    // ---- object sub-parser ---------------------------------------------

    fn object_key(&mut self, allow_close: bool) -> Result<Option<Value>, ParseError> {
        match self.peek()? {
            None => Err(self.error(ErrorKind::UnexpectedEndOfInput)),
            Some('}') if allow_close => {
                self.bump()?;
                Ok(self.pop_frame())
            }
            Some('"') => {
                let key = self.parse_string()?;
                if let Some(Frame::Object {
                    pending_key, state, ..
                }) = self.stack.last_mut()
                {
                    *pending_key = Some(key);
                    *state = ObjectState::Colon;
                }
                Ok(None)
            }
            Some(c) => Err(self.error(ErrorKind::UnexpectedCharacter(c))),
        }
    }

    fn object_colon(&mut self) -> Result<Option<Value>, ParseError> {
        match self.peek()? {
            None => Err(self.error(ErrorKind::UnexpectedEndOfInput)),
            Some(':') => {
                self.bump()?;
                if let Some(Frame::Object { state, .. }) = self.stack.last_mut() {
                    *state = ObjectState::Value;
                }
                Ok(None)
            }
            Some(c) => Err(self.error(ErrorKind::UnexpectedCharacter(c))),
        }
    }

    fn object_comma_or_close(&mut self) -> Result<Option<Value>, ParseError> {
        match self.peek()? {
            None => Err(self.error(ErrorKind::UnexpectedEndOfInput)),
            Some(',') => {
                self.bump()?;
                if let Some(Frame::Object { state, .. }) = self.stack.last_mut() {
                    *state = ObjectState::Key;
                }
                Ok(None)
            }
            Some('}') => {
                self.bump()?;
                Ok(self.pop_frame())
            }
            Some(c) => Err(self.error(ErrorKind::UnexpectedCharacter(c))),
        }
    }

    // ---- array sub-parser ----------------------------------------------

    fn array_value(&mut self, allow_close: bool) -> Result<Option<Value>, ParseError> {
        if allow_close && self.peek()? == Some(']') {
            self.bump()?;
            return Ok(self.pop_frame());
        }
        self.begin_value()
    }

    fn array_comma_or_close(&mut self) -> Result<Option<Value>, ParseError> {
        match self.peek()? {
            None => Err(self.error(ErrorKind::UnexpectedEndOfInput)),
            Some(',') => {
                self.bump()?;
                if let Some(Frame::Array { state, .. }) = self.stack.last_mut() {
                    *state = ArrayState::Value;
                }
                Ok(None)
            }
            Some(']') => {
                self.bump()?;
                Ok(self.pop_frame())
            }
            Some(c) => Err(self.error(ErrorKind::UnexpectedCharacter(c))),
        }
    }

    // ---- string / key sub-parser ---------------------------------------

    /// String sub-parser; the cursor sits on the opening quote. Used for
    /// both values and object keys.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.bump()?;
        let mut out = String::new();
        loop {
            let Some(c) = self.peek()? else {
                return Err(self.error(ErrorKind::UnterminatedString));
            };
            match c {
                '"' => {
                    self.bump()?;
                    return Ok(out);
                }
                '\\' => {
                    self.bump()?;
                    let decoded = self.parse_escape()?;
                    out.push(decoded);
                }
                c if (c as u32) < 0x20 => {
                    return Err(self.error(ErrorKind::UnexpectedCharacter(c)));
                }
                c => {
                    self.bump()?;
                    out.push(c);
                }
            }
        }
    }

    /// Escape sub-parser; the cursor sits after the backslash.
    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let Some(c) = self.peek()? else {
            return Err(self.error(ErrorKind::UnterminatedString));
        };
        let decoded = match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                self.bump()?;
                return self.parse_unicode_escape();
            }
            c => return Err(self.error(ErrorKind::InvalidEscape(c))),
        };
        self.bump()?;
        Ok(decoded)
    }

    /// `\u` sub-parser; the cursor sits on the first hex digit. Surrogate
    /// halves must arrive as an adjacent escaped pair.
    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let first = self.read_code_unit()?;
        if (0xDC00..=0xDFFF).contains(&first) {
            return Err(self.error(ErrorKind::InvalidUnicodeEscape(first)));
        }
        if !(0xD800..=0xDBFF).contains(&first) {
            // from_u32 only rejects surrogates, excluded above.
            return char::from_u32(first)
                .ok_or_else(|| self.error(ErrorKind::InvalidUnicodeEscape(first)));
        }
        // High surrogate: the low half must follow as another `\u` escape.
        if self.peek()? != Some('\\') {
            return Err(self.error(ErrorKind::InvalidUnicodeEscape(first)));
        }
        self.bump()?;
        if self.peek()? != Some('u') {
            return Err(self.error(ErrorKind::InvalidUnicodeEscape(first)));
        }
        self.bump()?;
        let second = self.read_code_unit()?;
        if !(0xDC00..=0xDFFF).contains(&second) {
            return Err(self.error(ErrorKind::InvalidUnicodeEscape(second)));
        }
        let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
        char::from_u32(combined)
            .ok_or_else(|| self.error(ErrorKind::InvalidUnicodeEscape(combined)))
    }

    /// Reads exactly four hex digits into a UTF-16 code unit.
    fn read_code_unit(&mut self) -> Result<u32, ParseError> {
        let mut escape = UnicodeEscapeBuffer::new();
        loop {
            let Some(c) = self.peek()? else {
                return Err(self.error(ErrorKind::UnterminatedString));
            };
            match escape.feed(c) {
                Ok(None) => self.bump()?,
                Ok(Some(unit)) => {
                    self.bump()?;
                    return Ok(unit);
                }
                Err(kind) => return Err(self.error(kind)),
            }
        }
    }

    // ---- literal sub-parser --------------------------------------------

    /// Boolean / null sub-parser: exactly `true`, `false`, or `null`.
    fn parse_literal(&mut self) -> Result<Value, ParseError> {
        self.buffer.clear();
        let Some(first) = self.peek()? else {
            return Err(self.error(ErrorKind::UnexpectedEndOfInput));
        };
        let Some(mut matcher) = LiteralMatcher::new(first) else {
            return Err(self.error(ErrorKind::UnexpectedCharacter(first)));
        };
        self.bump()?;
        self.buffer.push(first);
        loop {
            let Some(c) = self.peek()? else {
                return Err(self.invalid_literal());
            };
            match matcher.step(c) {
                Step::NeedMore => {
                    self.bump()?;
                    self.buffer.push(c);
                }
                Step::Done(value) => {
                    self.bump()?;
                    self.buffer.push(c);
                    // A longer token such as `truefoo` must not half-match.
                    if let Some(next) = self.peek()? {
                        if next.is_ascii_alphanumeric() {
                            self.buffer.push(next);
                            return Err(self.invalid_literal());
                        }
                    }
                    return Ok(value);
                }
                Step::Reject => {
                    self.buffer.push(c);
                    return Err(self.invalid_literal());
                }
            }
        }
    }

    fn invalid_literal(&mut self) -> ParseError {
        let token = std::mem::take(&mut self.buffer);
        self.error(ErrorKind::InvalidLiteral(token))
    }

    // ---- number sub-parser ---------------------------------------------

    /// Number sub-parser: consumes the maximal matching prefix, then
    /// converts it.
    fn parse_number(&mut self) -> Result<Value, ParseError> {
        self.buffer.clear();
        let mut is_float = false;

        if self.peek()? == Some('-') {
            self.bump()?;
            self.buffer.push('-');
        }

        // Integer part: `0`, or a nonzero digit followed by more digits.
        match self.peek()? {
            Some('0') => {
                self.bump()?;
                self.buffer.push('0');
                if let Some(d @ '0'..='9') = self.peek()? {
                    self.buffer.push(d);
                    return Err(self.invalid_number());
                }
            }
            Some(c @ '1'..='9') => {
                self.bump()?;
                self.buffer.push(c);
                self.consume_digits()?;
            }
            // Bare sign, or nothing where a digit was required.
            _ => return Err(self.invalid_number()),
        }

        if self.peek()? == Some('.') {
            self.bump()?;
            self.buffer.push('.');
            is_float = true;
            if !self.consume_digits()? {
                return Err(self.invalid_number());
            }
        }

        if let Some(e @ ('e' | 'E')) = self.peek()? {
            self.bump()?;
            self.buffer.push(e);
            is_float = true;
            if let Some(sign @ ('+' | '-')) = self.peek()? {
                self.bump()?;
                self.buffer.push(sign);
            }
            if !self.consume_digits()? {
                return Err(self.invalid_number());
            }
        }

        let number = if is_float {
            self.buffer
                .parse::<f64>()
                .map(Number::Float)
                .map_err(|_| self.invalid_number())?
        } else {
            match self.buffer.parse::<i64>() {
                Ok(n) => Number::Integer(n),
                // Integer literal outside the i64 range; widen.
                Err(_) => self
                    .buffer
                    .parse::<f64>()
                    .map(Number::Float)
                    .map_err(|_| self.invalid_number())?,
            }
        };
        Ok(Value::Number(number))
    }

    /// Consumes a run of ASCII digits; `true` if at least one was seen.
    fn consume_digits(&mut self) -> Result<bool, ParseError> {
        let mut any = false;
        while let Some(c @ '0'..='9') = self.peek()? {
            self.bump()?;
            self.buffer.push(c);
            any = true;
        }
        Ok(any)
    }

    fn invalid_number(&mut self) -> ParseError {
        let token = std::mem::take(&mut self.buffer);
        self.error(ErrorKind::InvalidNumber(token))
    }
}
