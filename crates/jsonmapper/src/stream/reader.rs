//! Pull-based JSON tokenizer.
//!
//! Overview
//! - [`JsonReader`] walks a borrowed `&str` one token at a time. `peek`
//!   classifies the next token and caches the classification in `peeked`;
//!   the matching `next_*` call consumes it. Values are materialised only
//!   when consumed, so skipped subtrees never allocate.
//! - Nesting is tracked by an explicit [`ScopeStack`]. The top of the stack
//!   decides which separators are legal before the next token.
//! - Numbers are classified by a small state machine while peeking. Integers
//!   that fit an `i64` are accumulated on the fly (`Peeked::Long`); anything
//!   else keeps its length and is parsed on demand (`Peeked::Number`).
//!
//! Lenient mode
//! - Strict mode accepts RFC 4627 documents only. Lenient mode additionally
//!   accepts comments, unquoted and single-quoted strings, `=`/`=>` and `;`
//!   separators, top-level scalars, multiple top-level values, implicit
//!   `null` array elements, NaN/Infinity and the `)]}'` non-execute prefix.
//! - Every construct that needs leniency funnels through `check_lenient`, so
//!   strict mode fails at the exact character that required it.

use bstr::ByteSlice;

use super::{
    escape::{combine_surrogates, decode_hex4, is_high_surrogate, is_low_surrogate},
    scope::{Scope, ScopeStack},
    token::Token,
    writer::JsonWriter,
};
use crate::{
    error::{ReadError, ReadErrorKind, SyntaxError},
    number::{BigInteger, JsonNumber},
};

const NON_EXECUTE_PREFIX: &[u8] = b")]}'\n";

/// Bytes that end an unquoted literal.
const NON_LITERAL: &[u8] = b"/\\;#={}[]:, \t\x0c\r\n";

/// Smallest value that can still be multiplied by ten and stay in range.
const MIN_INCOMPLETE_INTEGER: i64 = i64::MIN / 10;

// -----------------------------------------------------------------------------
// Peek classification
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Peeked {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    True,
    False,
    Null,
    SingleQuoted,
    DoubleQuoted,
    Unquoted,
    /// A string already read into `peeked_string`.
    Buffered,
    SingleQuotedName,
    DoubleQuotedName,
    UnquotedName,
    /// An integer held in `peeked_long`.
    Long,
    /// A number literal of `peeked_number_len` bytes starting at `pos`.
    Number,
    Eof,
}

impl Peeked {
    fn token(self) -> Token {
        match self {
            Peeked::BeginObject => Token::BeginObject,
            Peeked::EndObject => Token::EndObject,
            Peeked::BeginArray => Token::BeginArray,
            Peeked::EndArray => Token::EndArray,
            Peeked::SingleQuotedName | Peeked::DoubleQuotedName | Peeked::UnquotedName => {
                Token::Name
            }
            Peeked::True | Peeked::False => Token::Boolean,
            Peeked::Null => Token::Null,
            Peeked::SingleQuoted | Peeked::DoubleQuoted | Peeked::Unquoted | Peeked::Buffered => {
                Token::String
            }
            Peeked::Long | Peeked::Number => Token::Number,
            Peeked::Eof => Token::EndDocument,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberChar {
    None,
    Sign,
    Digit,
    Decimal,
    FractionDigit,
    ExpE,
    ExpSign,
    ExpDigit,
}

// -----------------------------------------------------------------------------
// Reader
// -----------------------------------------------------------------------------

/// Reads a JSON document as a stream of tokens.
///
/// # Examples
///
/// ```
/// use jsonmapper::{JsonReader, Token};
///
/// let mut reader = JsonReader::new(r#"{"id": 7, "tags": ["a", "b"]}"#);
/// reader.begin_object().unwrap();
/// assert_eq!(reader.next_name().unwrap(), "id");
/// assert_eq!(reader.next_int().unwrap(), 7);
/// assert_eq!(reader.next_name().unwrap(), "tags");
/// reader.skip_value().unwrap();
/// reader.end_object().unwrap();
/// assert_eq!(reader.peek().unwrap(), Token::EndDocument);
/// ```
#[derive(Debug)]
pub struct JsonReader<'a> {
    input: &'a str,
    pos: usize,
    /// Zero-based count of consumed newlines.
    line_number: usize,
    /// Byte offset of the first character of the current line.
    line_start: usize,
    lenient: bool,

    peeked: Option<Peeked>,
    peeked_long: i64,
    peeked_number_len: usize,
    peeked_string: Option<String>,

    stack: ScopeStack,
}

impl<'a> JsonReader<'a> {
    /// Creates a strict reader over `input`. A leading byte order mark is
    /// skipped.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let start = if input.starts_with('\u{feff}') { 3 } else { 0 };
        Self {
            input,
            pos: start,
            line_number: 0,
            line_start: start,
            lenient: false,
            peeked: None,
            peeked_long: 0,
            peeked_number_len: 0,
            peeked_string: None,
            stack: ScopeStack::new(),
        }
    }

    /// Creates a reader with the given leniency.
    #[must_use]
    pub fn with_lenient(input: &'a str, lenient: bool) -> Self {
        let mut reader = Self::new(input);
        reader.lenient = lenient;
        reader
    }

    pub fn set_lenient(&mut self, lenient: bool) {
        self.lenient = lenient;
    }

    #[must_use]
    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// The complete source text.
    #[must_use]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// 1-based line of the next unread character.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line_number + 1
    }

    /// 1-based column of the next unread character, counted in characters.
    #[must_use]
    pub fn column(&self) -> usize {
        let end = self.pos.min(self.input.len());
        let start = self.line_start.min(end);
        self.input
            .get(start..end)
            .map_or(end - start, |line| line.chars().count())
            + 1
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    /// Consumes the next token, asserting that it opens an array.
    pub fn begin_array(&mut self) -> Result<(), ReadError> {
        match self.peeked()? {
            Peeked::BeginArray => {
                self.stack.push(Scope::EmptyArray);
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected("BEGIN_ARRAY", p)),
        }
    }

    /// Consumes the next token, asserting that it closes the current array.
    pub fn end_array(&mut self) -> Result<(), ReadError> {
        match self.peeked()? {
            Peeked::EndArray => {
                self.stack.pop();
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected("END_ARRAY", p)),
        }
    }

    /// Consumes the next token, asserting that it opens an object.
    pub fn begin_object(&mut self) -> Result<(), ReadError> {
        match self.peeked()? {
            Peeked::BeginObject => {
                self.stack.push(Scope::EmptyObject);
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected("BEGIN_OBJECT", p)),
        }
    }

    /// Consumes the next token, asserting that it closes the current object.
    pub fn end_object(&mut self) -> Result<(), ReadError> {
        match self.peeked()? {
            Peeked::EndObject => {
                self.stack.pop();
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected("END_OBJECT", p)),
        }
    }

    /// Returns `true` if the current array or object has another element.
    pub fn has_next(&mut self) -> Result<bool, ReadError> {
        let p = self.peeked()?;
        Ok(!matches!(p, Peeked::EndObject | Peeked::EndArray | Peeked::Eof))
    }

    /// Returns the kind of the next token without consuming it.
    pub fn peek(&mut self) -> Result<Token, ReadError> {
        self.peeked().map(Peeked::token)
    }

    // -------------------------------------------------------------------------
    // Scalars
    // -------------------------------------------------------------------------

    /// Consumes the next token, asserting that it is a property name.
    pub fn next_name(&mut self) -> Result<String, ReadError> {
        let name = match self.peeked()? {
            Peeked::UnquotedName => self.next_unquoted_value()?,
            Peeked::SingleQuotedName => self.next_quoted_value(b'\'')?,
            Peeked::DoubleQuotedName => self.next_quoted_value(b'"')?,
            p => return Err(self.unexpected("a name", p)),
        };
        self.peeked = None;
        Ok(name)
    }

    /// Consumes the next string value. Numbers are returned in their literal
    /// form.
    pub fn next_string(&mut self) -> Result<String, ReadError> {
        let value = match self.peeked()? {
            Peeked::Unquoted => self.next_unquoted_value()?,
            Peeked::SingleQuoted => self.next_quoted_value(b'\'')?,
            Peeked::DoubleQuoted => self.next_quoted_value(b'"')?,
            Peeked::Buffered => self.peeked_string.take().unwrap_or_default(),
            Peeked::Long => self.peeked_long.to_string(),
            Peeked::Number => {
                let end = self.pos + self.peeked_number_len;
                let literal = self.input[self.pos..end].to_owned();
                self.pos = end;
                literal
            }
            p => return Err(self.unexpected("a string", p)),
        };
        self.peeked = None;
        Ok(value)
    }

    pub fn next_boolean(&mut self) -> Result<bool, ReadError> {
        let value = match self.peeked()? {
            Peeked::True => true,
            Peeked::False => false,
            p => return Err(self.unexpected("a boolean", p)),
        };
        self.peeked = None;
        Ok(value)
    }

    pub fn next_null(&mut self) -> Result<(), ReadError> {
        match self.peeked()? {
            Peeked::Null => {
                self.peeked = None;
                Ok(())
            }
            p => Err(self.unexpected("null", p)),
        }
    }

    /// Consumes the next number, or string holding a number, as an `f64`.
    ///
    /// In strict mode NaN and infinities are rejected. If the text is not a
    /// number, the error leaves it in place so it can still be read with
    /// [`next_string`](Self::next_string).
    #[allow(clippy::cast_precision_loss)]
    pub fn next_double(&mut self) -> Result<f64, ReadError> {
        let p = self.peeked()?;
        if p == Peeked::Long {
            self.peeked = None;
            return Ok(self.peeked_long as f64);
        }
        self.buffer_numeric_text(p, "a double")?;
        let value = self.parse_buffered_double()?;
        if !self.lenient && !value.is_finite() {
            return Err(self.syntax_error(SyntaxError::NonFiniteNumber(value)));
        }
        self.clear_buffered();
        Ok(value)
    }

    /// Consumes the next number, or string holding a number, as an `i64`.
    ///
    /// Fractional values are accepted only when they convert without loss.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn next_long(&mut self) -> Result<i64, ReadError> {
        let p = self.peeked()?;
        if p == Peeked::Long {
            self.peeked = None;
            return Ok(self.peeked_long);
        }
        self.buffer_numeric_text(p, "a long")?;
        if let Some(value) = self.buffered_text().and_then(|t| t.parse::<i64>().ok()) {
            self.clear_buffered();
            return Ok(value);
        }
        let as_double = self.parse_buffered_double()?;
        // Exclusive upper bound: 2^63 saturates to i64::MAX on cast.
        let in_range = (-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&as_double);
        let value = as_double as i64;
        if !in_range || value as f64 != as_double {
            return Err(self.precision_loss("a long"));
        }
        self.clear_buffered();
        Ok(value)
    }

    /// Consumes the next number, or string holding a number, as an `i32`.
    ///
    /// Values that do not fit 32 bits exactly fail with
    /// [`ReadErrorKind::PrecisionLoss`] and are left unconsumed.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_int(&mut self) -> Result<i32, ReadError> {
        let p = self.peeked()?;
        if p == Peeked::Long {
            let Ok(value) = i32::try_from(self.peeked_long) else {
                let literal = self.peeked_long.to_string();
                return Err(self.error(ReadErrorKind::PrecisionLoss {
                    target: "an int",
                    literal,
                }));
            };
            self.peeked = None;
            return Ok(value);
        }
        self.buffer_numeric_text(p, "an int")?;
        if let Some(value) = self.buffered_text().and_then(|t| t.parse::<i32>().ok()) {
            self.clear_buffered();
            return Ok(value);
        }
        let as_double = self.parse_buffered_double()?;
        let value = as_double as i32;
        if f64::from(value) != as_double {
            return Err(self.precision_loss("an int"));
        }
        self.clear_buffered();
        Ok(value)
    }

    /// Consumes the next number, or string holding a number, in the smallest
    /// exact representation.
    ///
    /// Integers become [`JsonNumber::Int`] or [`JsonNumber::Long`] when they
    /// fit and [`JsonNumber::BigInteger`] otherwise. Literals with a fraction
    /// or an exponent become [`JsonNumber::Double`].
    pub fn next_number(&mut self) -> Result<JsonNumber, ReadError> {
        let p = self.peeked()?;
        if p == Peeked::Long {
            self.peeked = None;
            let value = self.peeked_long;
            return Ok(i32::try_from(value).map_or(JsonNumber::Long(value), JsonNumber::Int));
        }
        self.buffer_numeric_text(p, "a number")?;
        let text = self.buffered_text().unwrap_or_default().trim();
        if let Some(integer) = BigInteger::parse(text) {
            let number = match integer.to_i64() {
                Some(value) => i32::try_from(value).map_or(JsonNumber::Long(value), JsonNumber::Int),
                None => JsonNumber::BigInteger(integer),
            };
            self.clear_buffered();
            return Ok(number);
        }
        let value = self.parse_buffered_double()?;
        if !self.lenient && !value.is_finite() {
            return Err(self.syntax_error(SyntaxError::NonFiniteNumber(value)));
        }
        self.clear_buffered();
        Ok(JsonNumber::Double(value))
    }

    // -------------------------------------------------------------------------
    // Whole values
    // -------------------------------------------------------------------------

    /// Skips the next value, recursively. The scope depth is the same before
    /// and after the call.
    pub fn skip_value(&mut self) -> Result<(), ReadError> {
        let mut depth = 0usize;
        loop {
            let p = self.peeked()?;
            match p {
                Peeked::BeginArray => {
                    self.stack.push(Scope::EmptyArray);
                    depth += 1;
                }
                Peeked::BeginObject => {
                    self.stack.push(Scope::EmptyObject);
                    depth += 1;
                }
                Peeked::EndArray | Peeked::EndObject | Peeked::Eof if depth == 0 => {
                    return Err(self.unexpected("a value", p));
                }
                Peeked::EndArray | Peeked::EndObject => {
                    self.stack.pop();
                    depth -= 1;
                }
                Peeked::UnquotedName | Peeked::Unquoted => {
                    self.next_unquoted_value()?;
                }
                Peeked::SingleQuoted | Peeked::SingleQuotedName => self.skip_quoted_value(b'\'')?,
                Peeked::DoubleQuoted | Peeked::DoubleQuotedName => self.skip_quoted_value(b'"')?,
                Peeked::Number => self.pos += self.peeked_number_len,
                Peeked::Buffered => self.peeked_string = None,
                Peeked::Eof => return Err(self.syntax_error(SyntaxError::UnexpectedEndOfInput)),
                Peeked::True | Peeked::False | Peeked::Null | Peeked::Long => {}
            }
            self.peeked = None;
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Consumes the next value and returns its compact JSON text.
    ///
    /// Strings are re-escaped and unquoted literals quoted, so the result is
    /// strict JSON even when the input was lenient.
    pub fn next_value(&mut self) -> Result<String, ReadError> {
        if self.peeked()? == Peeked::Null {
            self.peeked = None;
            return Ok("null".to_owned());
        }
        let mut writer = JsonWriter::new();
        writer.set_lenient(true);
        writer.set_serialize_nulls(true);
        let mut depth = 0usize;
        loop {
            let p = self.peeked()?;
            let written = match p {
                Peeked::BeginArray => {
                    self.stack.push(Scope::EmptyArray);
                    depth += 1;
                    writer.begin_array()
                }
                Peeked::BeginObject => {
                    self.stack.push(Scope::EmptyObject);
                    depth += 1;
                    writer.begin_object()
                }
                Peeked::EndArray | Peeked::EndObject | Peeked::Eof if depth == 0 => {
                    return Err(self.unexpected("a value", p));
                }
                Peeked::EndArray => {
                    self.stack.pop();
                    depth -= 1;
                    writer.end_array()
                }
                Peeked::EndObject => {
                    self.stack.pop();
                    depth -= 1;
                    writer.end_object()
                }
                Peeked::UnquotedName => writer.name(&self.next_unquoted_value()?),
                Peeked::SingleQuotedName => writer.name(&self.next_quoted_value(b'\'')?),
                Peeked::DoubleQuotedName => writer.name(&self.next_quoted_value(b'"')?),
                Peeked::Unquoted => writer.string_value(&self.next_unquoted_value()?),
                Peeked::SingleQuoted => writer.string_value(&self.next_quoted_value(b'\'')?),
                Peeked::DoubleQuoted => writer.string_value(&self.next_quoted_value(b'"')?),
                Peeked::Buffered => {
                    let buffered = self.peeked_string.take().unwrap_or_default();
                    writer.string_value(&buffered)
                }
                Peeked::Number => {
                    let end = self.pos + self.peeked_number_len;
                    let literal = &self.input[self.pos..end];
                    self.pos = end;
                    writer.raw_value(literal)
                }
                Peeked::Long => writer.i64_value(self.peeked_long),
                Peeked::True => writer.bool_value(true),
                Peeked::False => writer.bool_value(false),
                Peeked::Null => writer.null_value(),
                Peeked::Eof => return Err(self.syntax_error(SyntaxError::UnexpectedEndOfInput)),
            };
            if let Err(err) = written {
                return Err(self.error(ReadErrorKind::Custom(err.to_string())));
            }
            self.peeked = None;
            if depth == 0 {
                break;
            }
        }
        Ok(writer.into_output())
    }

    /// Closes the reader. Closing twice is allowed; any other call afterwards
    /// fails with [`ReadErrorKind::ReaderClosed`].
    pub fn close(&mut self) {
        self.peeked = None;
        self.peeked_string = None;
        self.stack.close();
    }

    // -------------------------------------------------------------------------
    // Errors
    // -------------------------------------------------------------------------

    /// Builds an error located at the reader's current position.
    #[must_use]
    pub fn error(&self, kind: ReadErrorKind) -> ReadError {
        ReadError::new(kind, self.line(), self.column())
    }

    /// Builds a [`ReadErrorKind::TypeMismatch`] for the next token. If the
    /// next token cannot be peeked, that failure is returned instead.
    pub fn type_mismatch(&mut self, target: &'static str) -> ReadError {
        match self.peek() {
            Ok(actual) => self.error(ReadErrorKind::TypeMismatch { target, actual }),
            Err(err) => err,
        }
    }

    fn syntax_error(&self, err: SyntaxError) -> ReadError {
        log::debug!("malformed JSON at line {} column {}: {err}", self.line(), self.column());
        self.error(ReadErrorKind::Syntax(err))
    }

    fn malformed(&self, message: &'static str) -> ReadError {
        self.syntax_error(SyntaxError::Malformed(message))
    }

    fn unexpected(&self, expected: &'static str, actual: Peeked) -> ReadError {
        self.error(ReadErrorKind::UnexpectedToken {
            expected,
            actual: actual.token(),
        })
    }

    fn precision_loss(&self, target: &'static str) -> ReadError {
        let literal = self.buffered_text().unwrap_or_default().to_owned();
        self.error(ReadErrorKind::PrecisionLoss { target, literal })
    }

    fn check_lenient(&self) -> Result<(), ReadError> {
        if self.lenient {
            Ok(())
        } else {
            Err(self.syntax_error(SyntaxError::LenientOnly))
        }
    }

    // -------------------------------------------------------------------------
    // Number buffering
    // -------------------------------------------------------------------------

    /// Moves the text of a number-like token into `peeked_string` and marks
    /// it as [`Peeked::Buffered`].
    fn buffer_numeric_text(&mut self, p: Peeked, expected: &'static str) -> Result<(), ReadError> {
        let text = match p {
            Peeked::Number => {
                let end = self.pos + self.peeked_number_len;
                let literal = self.input[self.pos..end].to_owned();
                self.pos = end;
                literal
            }
            Peeked::SingleQuoted => self.next_quoted_value(b'\'')?,
            Peeked::DoubleQuoted => self.next_quoted_value(b'"')?,
            Peeked::Unquoted => self.next_unquoted_value()?,
            Peeked::Buffered => return Ok(()),
            _ => return Err(self.unexpected(expected, p)),
        };
        self.peeked_string = Some(text);
        self.peeked = Some(Peeked::Buffered);
        Ok(())
    }

    fn buffered_text(&self) -> Option<&str> {
        self.peeked_string.as_deref()
    }

    fn parse_buffered_double(&self) -> Result<f64, ReadError> {
        let text = self.buffered_text().unwrap_or_default();
        text.trim()
            .parse::<f64>()
            .map_err(|_| self.error(ReadErrorKind::InvalidNumber(text.to_owned())))
    }

    fn clear_buffered(&mut self) {
        self.peeked_string = None;
        self.peeked = None;
    }

    // -------------------------------------------------------------------------
    // Lexing
    // -------------------------------------------------------------------------

    fn peeked(&mut self) -> Result<Peeked, ReadError> {
        match self.peeked {
            Some(p) => Ok(p),
            None => self.do_peek(),
        }
    }

    fn set_peeked(&mut self, p: Peeked) -> Peeked {
        self.peeked = Some(p);
        p
    }

    #[allow(clippy::too_many_lines)]
    fn do_peek(&mut self) -> Result<Peeked, ReadError> {
        let peek_stack = self.stack.peek();
        match peek_stack {
            Scope::EmptyArray => self.stack.replace_top(Scope::NonemptyArray),
            Scope::NonemptyArray => match self.next_non_whitespace(true)? {
                Some(b']') => return Ok(self.set_peeked(Peeked::EndArray)),
                Some(b';') => self.check_lenient()?,
                Some(b',') => {}
                _ => return Err(self.malformed("unterminated array")),
            },
            Scope::EmptyObject | Scope::NonemptyObject => {
                self.stack.replace_top(Scope::DanglingName);
                if peek_stack == Scope::NonemptyObject {
                    match self.next_non_whitespace(true)? {
                        Some(b'}') => return Ok(self.set_peeked(Peeked::EndObject)),
                        Some(b';') => self.check_lenient()?,
                        Some(b',') => {}
                        _ => return Err(self.malformed("unterminated object")),
                    }
                }
                return match self.next_non_whitespace(true)? {
                    Some(b'"') => Ok(self.set_peeked(Peeked::DoubleQuotedName)),
                    Some(b'\'') => {
                        self.check_lenient()?;
                        Ok(self.set_peeked(Peeked::SingleQuotedName))
                    }
                    Some(b'}') if peek_stack != Scope::NonemptyObject => {
                        Ok(self.set_peeked(Peeked::EndObject))
                    }
                    Some(b'}') => Err(self.malformed("expected name")),
                    Some(c) => {
                        self.check_lenient()?;
                        // The first character belongs to the name.
                        self.pos -= 1;
                        if self.is_literal(c)? {
                            Ok(self.set_peeked(Peeked::UnquotedName))
                        } else {
                            Err(self.malformed("expected name"))
                        }
                    }
                    None => Err(self.syntax_error(SyntaxError::UnexpectedEndOfInput)),
                };
            }
            Scope::DanglingName => {
                self.stack.replace_top(Scope::NonemptyObject);
                match self.next_non_whitespace(true)? {
                    Some(b':') => {}
                    Some(b'=') => {
                        self.check_lenient()?;
                        if self.input.as_bytes().get(self.pos) == Some(&b'>') {
                            self.pos += 1;
                        }
                    }
                    _ => return Err(self.malformed("expected ':'")),
                }
            }
            Scope::EmptyDocument => {
                if self.lenient {
                    self.consume_non_execute_prefix()?;
                }
                self.stack.replace_top(Scope::NonemptyDocument);
            }
            Scope::NonemptyDocument => match self.next_non_whitespace(false)? {
                None => return Ok(self.set_peeked(Peeked::Eof)),
                Some(_) => {
                    self.check_lenient()?;
                    self.pos -= 1;
                }
            },
            Scope::Closed => return Err(self.error(ReadErrorKind::ReaderClosed)),
        }

        let Some(c) = self.next_non_whitespace(true)? else {
            return Err(self.syntax_error(SyntaxError::UnexpectedEndOfInput));
        };
        match c {
            b']' if peek_stack == Scope::EmptyArray => return Ok(self.set_peeked(Peeked::EndArray)),
            // A missing array element reads as null.
            b']' | b';' | b',' => {
                if matches!(peek_stack, Scope::EmptyArray | Scope::NonemptyArray) {
                    self.check_lenient()?;
                    self.pos -= 1;
                    return Ok(self.set_peeked(Peeked::Null));
                }
                return Err(self.malformed("unexpected value"));
            }
            b'\'' => {
                self.check_lenient()?;
                return Ok(self.set_peeked(Peeked::SingleQuoted));
            }
            b'"' => {
                if self.stack.len() == 1 {
                    self.check_lenient()?;
                }
                return Ok(self.set_peeked(Peeked::DoubleQuoted));
            }
            b'[' => return Ok(self.set_peeked(Peeked::BeginArray)),
            b'{' => return Ok(self.set_peeked(Peeked::BeginObject)),
            _ => self.pos -= 1,
        }

        // Top-level scalars need lenient mode.
        if self.stack.len() == 1 {
            self.check_lenient()?;
        }

        if let Some(p) = self.peek_keyword()? {
            return Ok(self.set_peeked(p));
        }
        if let Some(p) = self.peek_number()? {
            return Ok(self.set_peeked(p));
        }
        if !self.is_literal(c)? {
            return Err(self.malformed("expected value"));
        }
        self.check_lenient()?;
        Ok(self.set_peeked(Peeked::Unquoted))
    }

    fn peek_keyword(&mut self) -> Result<Option<Peeked>, ReadError> {
        let bytes = self.input.as_bytes();
        let Some(&first) = bytes.get(self.pos) else {
            return Ok(None);
        };
        let (keyword, peeking): (&[u8], Peeked) = match first {
            b't' | b'T' => (b"true", Peeked::True),
            b'f' | b'F' => (b"false", Peeked::False),
            b'n' | b'N' => (b"null", Peeked::Null),
            _ => return Ok(None),
        };
        let end = self.pos + keyword.len();
        match bytes.get(self.pos..end) {
            Some(candidate) if candidate.eq_ignore_ascii_case(keyword) => {}
            _ => return Ok(None),
        }
        // Don't match `trues`, `falsey` or `nullsoft`.
        if let Some(&next) = bytes.get(end) {
            if self.is_literal(next)? {
                return Ok(None);
            }
        }
        self.pos = end;
        Ok(Some(peeking))
    }

    fn peek_number(&mut self) -> Result<Option<Peeked>, ReadError> {
        let bytes = self.input.as_bytes();
        // Accumulated negated so that i64::MIN is representable.
        let mut value: i64 = 0;
        let mut negative = false;
        let mut fits_in_long = true;
        let mut last = NumberChar::None;
        let mut len = 0;

        while let Some(&c) = bytes.get(self.pos + len) {
            match c {
                b'-' if last == NumberChar::None => {
                    negative = true;
                    last = NumberChar::Sign;
                }
                b'-' | b'+' if last == NumberChar::ExpE => last = NumberChar::ExpSign,
                b'e' | b'E' if matches!(last, NumberChar::Digit | NumberChar::FractionDigit) => {
                    last = NumberChar::ExpE;
                }
                b'.' if last == NumberChar::Digit => last = NumberChar::Decimal,
                b'-' | b'+' | b'e' | b'E' | b'.' => return Ok(None),
                b'0'..=b'9' => {
                    let digit = i64::from(c - b'0');
                    match last {
                        NumberChar::None | NumberChar::Sign => {
                            value = -digit;
                            last = NumberChar::Digit;
                        }
                        NumberChar::Digit => {
                            // Leading zeros are not numbers.
                            if value == 0 {
                                return Ok(None);
                            }
                            let new_value = value.wrapping_mul(10).wrapping_sub(digit);
                            fits_in_long &= value > MIN_INCOMPLETE_INTEGER
                                || (value == MIN_INCOMPLETE_INTEGER && new_value < value);
                            value = new_value;
                        }
                        NumberChar::Decimal => last = NumberChar::FractionDigit,
                        NumberChar::ExpE | NumberChar::ExpSign => last = NumberChar::ExpDigit,
                        NumberChar::FractionDigit | NumberChar::ExpDigit => {}
                    }
                }
                _ => {
                    if self.is_literal(c)? {
                        return Ok(None);
                    }
                    break;
                }
            }
            len += 1;
        }

        if last == NumberChar::Digit && fits_in_long && (value != i64::MIN || negative) {
            self.peeked_long = if negative { value } else { -value };
            self.pos += len;
            Ok(Some(Peeked::Long))
        } else if matches!(
            last,
            NumberChar::Digit | NumberChar::FractionDigit | NumberChar::ExpDigit
        ) {
            self.peeked_number_len = len;
            Ok(Some(Peeked::Number))
        } else {
            Ok(None)
        }
    }

    /// Returns `false` for bytes that end an unquoted literal. Bytes that are
    /// only meaningful in lenient mode fail in strict mode.
    fn is_literal(&self, c: u8) -> Result<bool, ReadError> {
        match c {
            b'/' | b'\\' | b';' | b'#' | b'=' => {
                self.check_lenient()?;
                Ok(false)
            }
            b'{' | b'}' | b'[' | b']' | b':' | b',' | b' ' | b'\t' | b'\x0c' | b'\r' | b'\n' => {
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    /// Returns the next byte that is not whitespace or part of a comment,
    /// consuming it.
    fn next_non_whitespace(&mut self, throw_on_eof: bool) -> Result<Option<u8>, ReadError> {
        let bytes = self.input.as_bytes();
        while let Some(&c) = bytes.get(self.pos) {
            self.pos += 1;
            match c {
                b'\n' => {
                    self.line_number += 1;
                    self.line_start = self.pos;
                }
                b' ' | b'\r' | b'\t' => {}
                b'/' => {
                    let Some(&next) = bytes.get(self.pos) else {
                        return Ok(Some(c));
                    };
                    self.check_lenient()?;
                    match next {
                        b'*' => {
                            self.pos += 1;
                            if !self.skip_to(b"*/") {
                                return Err(self.malformed("unterminated comment"));
                            }
                            self.pos += 2;
                        }
                        b'/' => {
                            self.pos += 1;
                            self.skip_to_end_of_line();
                        }
                        _ => return Ok(Some(c)),
                    }
                }
                b'#' => {
                    self.check_lenient()?;
                    self.skip_to_end_of_line();
                }
                _ => return Ok(Some(c)),
            }
        }
        if throw_on_eof {
            Err(self.syntax_error(SyntaxError::UnexpectedEndOfInput))
        } else {
            Ok(None)
        }
    }

    fn consume_non_execute_prefix(&mut self) -> Result<(), ReadError> {
        self.next_non_whitespace(true)?;
        self.pos -= 1;
        if self.input.as_bytes()[self.pos..].starts_with(NON_EXECUTE_PREFIX) {
            self.pos += NON_EXECUTE_PREFIX.len();
            self.line_number += 1;
            self.line_start = self.pos;
        }
        Ok(())
    }

    /// Advances to the start of `needle`, tracking newlines on the way.
    fn skip_to(&mut self, needle: &[u8]) -> bool {
        let bytes = self.input.as_bytes();
        let Some(offset) = bytes[self.pos..].find(needle) else {
            return false;
        };
        let end = self.pos + offset;
        self.track_newlines(self.pos, end);
        self.pos = end;
        true
    }

    fn skip_to_end_of_line(&mut self) {
        let rest = &self.input.as_bytes()[self.pos..];
        match rest.find_byteset(b"\r\n") {
            Some(i) => {
                self.pos += i + 1;
                if rest[i] == b'\n' {
                    self.line_number += 1;
                    self.line_start = self.pos;
                }
            }
            None => self.pos = self.input.len(),
        }
    }

    fn track_newlines(&mut self, from: usize, to: usize) {
        for (i, &b) in self.input.as_bytes()[from..to].iter().enumerate() {
            if b == b'\n' {
                self.line_number += 1;
                self.line_start = from + i + 1;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Strings
    // -------------------------------------------------------------------------

    /// Reads a string up to the closing `quote`, decoding escapes. The
    /// opening quote has already been consumed.
    fn next_quoted_value(&mut self, quote: u8) -> Result<String, ReadError> {
        let bytes = self.input.as_bytes();
        let mut out = String::new();
        loop {
            let rest = &bytes[self.pos..];
            let Some(i) = rest.find_byteset([quote, b'\\', b'\n']) else {
                self.pos = bytes.len();
                return Err(self.malformed("unterminated string"));
            };
            let found = rest[i];
            out.push_str(&self.input[self.pos..self.pos + i]);
            self.pos += i + 1;
            match found {
                b'\n' => {
                    out.push('\n');
                    self.line_number += 1;
                    self.line_start = self.pos;
                }
                b'\\' => out.push(self.read_escape_character()?),
                _ => return Ok(out),
            }
        }
    }

    fn skip_quoted_value(&mut self, quote: u8) -> Result<(), ReadError> {
        let bytes = self.input.as_bytes();
        loop {
            let rest = &bytes[self.pos..];
            let Some(i) = rest.find_byteset([quote, b'\\', b'\n']) else {
                self.pos = bytes.len();
                return Err(self.malformed("unterminated string"));
            };
            let found = rest[i];
            self.pos += i + 1;
            match found {
                b'\n' => {
                    self.line_number += 1;
                    self.line_start = self.pos;
                }
                b'\\' => {
                    self.read_escape_character()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_unquoted_value(&mut self) -> Result<String, ReadError> {
        let rest = &self.input.as_bytes()[self.pos..];
        let len = match rest.find_byteset(NON_LITERAL) {
            Some(i) => {
                if matches!(rest[i], b'/' | b'\\' | b';' | b'#' | b'=') {
                    self.check_lenient()?;
                }
                i
            }
            None => rest.len(),
        };
        let value = self.input[self.pos..self.pos + len].to_owned();
        self.pos += len;
        Ok(value)
    }

    /// Decodes the escape sequence following a backslash.
    fn read_escape_character(&mut self) -> Result<char, ReadError> {
        let Some(escaped) = self.input[self.pos..].chars().next() else {
            return Err(self.malformed("unterminated escape sequence"));
        };
        self.pos += escaped.len_utf8();
        Ok(match escaped {
            'u' => self.read_unicode_escape()?,
            't' => '\t',
            'b' => '\u{8}',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{c}',
            '\n' => {
                self.line_number += 1;
                self.line_start = self.pos;
                '\n'
            }
            other => other,
        })
    }

    /// Decodes `XXXX` after `\u`, joining a following low surrogate escape.
    /// Unpaired surrogates decode to U+FFFD.
    fn read_unicode_escape(&mut self) -> Result<char, ReadError> {
        let unit = self.read_hex4()?;
        if is_high_surrogate(unit) {
            let bytes = self.input.as_bytes();
            if bytes[self.pos..].starts_with(b"\\u") {
                let low = bytes.get(self.pos + 2..self.pos + 6).and_then(decode_hex4);
                if let Some(low) = low.filter(|&low| is_low_surrogate(low)) {
                    self.pos += 6;
                    return Ok(combine_surrogates(unit, low));
                }
            }
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        Ok(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn read_hex4(&mut self) -> Result<u16, ReadError> {
        let Some(digits) = self.input.as_bytes().get(self.pos..self.pos + 4) else {
            return Err(self.malformed("unterminated escape sequence"));
        };
        let Some(unit) = decode_hex4(digits) else {
            let sequence = format!("\\u{}", String::from_utf8_lossy(digits));
            return Err(self.syntax_error(SyntaxError::InvalidEscape(sequence)));
        };
        self.pos += 4;
        Ok(unit)
    }
}
