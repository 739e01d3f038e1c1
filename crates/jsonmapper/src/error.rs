use thiserror::Error;

use crate::stream::Token;

/// Error raised by [`JsonReader`](crate::JsonReader) and by deserializers.
///
/// Every read error carries the 1-based line and column of the reader at the
/// moment the error was detected.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at line {line} column {column}")]
pub struct ReadError {
    pub(crate) kind: ReadErrorKind,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

impl ReadError {
    pub(crate) fn new(kind: ReadErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    /// The category and details of the failure.
    #[must_use]
    pub fn kind(&self) -> &ReadErrorKind {
        &self.kind
    }

    /// 1-based line of the failure.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the failure.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns `true` for malformed input, as opposed to a well-formed
    /// document that does not match what the caller asked for.
    #[must_use]
    pub fn is_syntax_error(&self) -> bool {
        matches!(self.kind, ReadErrorKind::Syntax(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadErrorKind {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// The next token is well formed but not the one the caller asked for.
    #[error("expected {expected} but was {actual}")]
    UnexpectedToken {
        expected: &'static str,
        actual: Token,
    },
    #[error("reader is closed")]
    ReaderClosed,
    /// A deserializer cannot build its target type from the next token.
    #[error("cannot deserialize {target} out of {actual} token")]
    TypeMismatch { target: &'static str, actual: Token },
    #[error("expected {target} but was {literal}")]
    PrecisionLoss {
        target: &'static str,
        literal: String,
    },
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("unknown enum constant {0:?}")]
    UnknownEnumValue(String),
    #[error("unresolved object id {0}")]
    UnresolvedObjectId(String),
    #[error("no deserializer registered for {0}")]
    MissingDeserializer(&'static str),
    #[error("{0}")]
    Custom(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("{0}")]
    Malformed(&'static str),
    #[error("use lenient mode to accept malformed JSON")]
    LenientOnly,
    #[error("invalid escape sequence {0:?}")]
    InvalidEscape(String),
    #[error("JSON forbids NaN and infinities: {0}")]
    NonFiniteNumber(f64),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
}

/// Error raised by [`JsonWriter`](crate::JsonWriter) and by serializers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WriteError {
    #[error("nesting problem")]
    NestingProblem,
    #[error("dangling name: {0}")]
    DanglingName(String),
    #[error("a name is already pending: {0}")]
    NameAlreadyPending(String),
    #[error("writer is closed")]
    Closed,
    #[error("JSON must start with an array or an object")]
    TopLevelNotContainer,
    #[error("JSON must have only one top-level value")]
    MultipleTopLevelValues,
    #[error("incomplete document")]
    IncompleteDocument,
    #[error("numeric values must be finite, but was {0}")]
    NonFiniteNumber(f64),
    #[error("no serializer registered for {0}")]
    MissingSerializer(&'static str),
    #[error("no key serializer registered for {0}")]
    MissingKeySerializer(&'static str),
    #[error("{0}")]
    Custom(String),
}

/// Error type of the serializer/deserializer layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl Error {
    /// The read error kind, if this is a read error.
    #[must_use]
    pub fn read_kind(&self) -> Option<&ReadErrorKind> {
        match self {
            Self::Read(err) => Some(err.kind()),
            Self::Write(_) => None,
        }
    }
}
