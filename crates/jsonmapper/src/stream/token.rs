use core::fmt;

/// Kind of the next syntactic unit in a JSON stream, as reported by
/// [`JsonReader::peek`](crate::JsonReader::peek).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    /// A property name. Only returned inside objects.
    Name,
    String,
    Number,
    Boolean,
    Null,
    /// The end of the stream. Reading past it is an error.
    EndDocument,
}

impl Token {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Token::BeginArray => "BEGIN_ARRAY",
            Token::EndArray => "END_ARRAY",
            Token::BeginObject => "BEGIN_OBJECT",
            Token::EndObject => "END_OBJECT",
            Token::Name => "NAME",
            Token::String => "STRING",
            Token::Number => "NUMBER",
            Token::Boolean => "BOOLEAN",
            Token::Null => "NULL",
            Token::EndDocument => "END_DOCUMENT",
        }
    }

    /// Returns `true` for tokens that start or hold a value (everything except
    /// names, closing brackets and the end of the document).
    #[must_use]
    pub fn is_value_start(self) -> bool {
        !matches!(
            self,
            Token::Name | Token::EndArray | Token::EndObject | Token::EndDocument
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
