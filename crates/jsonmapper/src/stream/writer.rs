use super::{
    escape::write_escaped_str,
    scope::{Scope, ScopeStack},
};
use crate::{
    error::WriteError,
    number::{JsonNumber, format_double},
};

/// Writes a JSON document into an owned `String`, one token at a time.
///
/// Names are deferred: [`name`](Self::name) only records the name, which is
/// written together with the following value. This lets a serializer that
/// decides to omit its value drop the name with
/// [`cancel_name`](Self::cancel_name).
///
/// # Examples
///
/// ```
/// use jsonmapper::JsonWriter;
///
/// let mut writer = JsonWriter::new();
/// writer.begin_object().unwrap();
/// writer.name("kept").unwrap();
/// writer.i64_value(1).unwrap();
/// writer.name("dropped").unwrap();
/// writer.cancel_name();
/// writer.end_object().unwrap();
/// writer.close().unwrap();
/// assert_eq!(writer.output(), r#"{"kept":1}"#);
/// ```
#[derive(Debug, Clone)]
pub struct JsonWriter {
    out: String,
    stack: ScopeStack,
    indent: Option<String>,
    lenient: bool,
    html_safe: bool,
    serialize_nulls: bool,
    deferred_name: Option<String>,
    /// Whether `deferred_name` is written verbatim instead of escaped.
    deferred_name_unescaped: bool,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonWriter {
    /// Creates a compact, strict writer that drops names of `null` values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::new(),
            stack: ScopeStack::new(),
            indent: None,
            lenient: false,
            html_safe: false,
            serialize_nulls: false,
            deferred_name: None,
            deferred_name_unescaped: false,
        }
    }

    /// Sets the indentation used for each nesting level. An empty string, or
    /// `None`, writes compact output.
    pub fn set_indent(&mut self, indent: Option<&str>) {
        self.indent = indent.filter(|s| !s.is_empty()).map(str::to_owned);
    }

    /// Lenient writers accept top-level scalars, several top-level values
    /// and non-finite numbers.
    pub fn set_lenient(&mut self, lenient: bool) {
        self.lenient = lenient;
    }

    #[must_use]
    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Escapes `<`, `>`, `&`, `=` and `'` in strings and names.
    pub fn set_html_safe(&mut self, html_safe: bool) {
        self.html_safe = html_safe;
    }

    /// Whether [`null_value`](Self::null_value) writes a pending name
    /// followed by `null` (`true`) or drops the member (`false`).
    pub fn set_serialize_nulls(&mut self, serialize_nulls: bool) {
        self.serialize_nulls = serialize_nulls;
    }

    #[must_use]
    pub fn serialize_nulls(&self) -> bool {
        self.serialize_nulls
    }

    pub fn begin_array(&mut self) -> Result<(), WriteError> {
        self.open(Scope::EmptyArray, '[')
    }

    pub fn end_array(&mut self) -> Result<(), WriteError> {
        self.close_scope(Scope::EmptyArray, Scope::NonemptyArray, ']')
    }

    pub fn begin_object(&mut self) -> Result<(), WriteError> {
        self.open(Scope::EmptyObject, '{')
    }

    pub fn end_object(&mut self) -> Result<(), WriteError> {
        self.close_scope(Scope::EmptyObject, Scope::NonemptyObject, '}')
    }

    /// Records the name of the next object member.
    pub fn name(&mut self, name: &str) -> Result<(), WriteError> {
        self.defer_name(name, false)
    }

    /// Like [`name`](Self::name), but the name is written without escaping.
    pub fn unescaped_name(&mut self, name: &str) -> Result<(), WriteError> {
        self.defer_name(name, true)
    }

    /// Drops the pending name, if any. The writer is left as if the name had
    /// never been written.
    pub fn cancel_name(&mut self) {
        self.deferred_name = None;
        self.deferred_name_unescaped = false;
    }

    /// Whether a name was recorded and its value not written yet.
    #[must_use]
    pub fn has_pending_name(&self) -> bool {
        self.deferred_name.is_some()
    }

    pub fn string_value(&mut self, value: &str) -> Result<(), WriteError> {
        self.write_deferred_name()?;
        self.before_value(false)?;
        self.write_string(value);
        Ok(())
    }

    /// Writes a string value without escaping it. Only use this for text
    /// known not to contain characters that need escaping.
    pub fn unescaped_value(&mut self, value: &str) -> Result<(), WriteError> {
        self.write_deferred_name()?;
        self.before_value(false)?;
        self.out.push('"');
        self.out.push_str(value);
        self.out.push('"');
        Ok(())
    }

    pub fn bool_value(&mut self, value: bool) -> Result<(), WriteError> {
        self.write_deferred_name()?;
        self.before_value(false)?;
        self.out.push_str(if value { "true" } else { "false" });
        Ok(())
    }

    pub fn i64_value(&mut self, value: i64) -> Result<(), WriteError> {
        self.write_deferred_name()?;
        self.before_value(false)?;
        self.out.push_str(&value.to_string());
        Ok(())
    }

    /// Writes a double in its shortest round-trip form, keeping a `.0` on
    /// integral values. Non-finite values are rejected unless the writer is
    /// lenient.
    pub fn f64_value(&mut self, value: f64) -> Result<(), WriteError> {
        if !self.lenient && !value.is_finite() {
            return Err(WriteError::NonFiniteNumber(value));
        }
        self.write_deferred_name()?;
        self.before_value(false)?;
        self.out.push_str(&format_double(value));
        Ok(())
    }

    pub fn number_value(&mut self, value: &JsonNumber) -> Result<(), WriteError> {
        match value {
            JsonNumber::Int(v) => self.i64_value(i64::from(*v)),
            JsonNumber::Long(v) => self.i64_value(*v),
            JsonNumber::Double(v) => self.f64_value(*v),
            JsonNumber::BigInteger(v) => self.raw_value(&v.to_string()),
        }
    }

    /// Writes `null`, or, when a name is pending and nulls are not
    /// serialized, drops the name and writes nothing.
    pub fn null_value(&mut self) -> Result<(), WriteError> {
        if self.deferred_name.is_some() {
            if self.serialize_nulls {
                self.write_deferred_name()?;
            } else {
                self.cancel_name();
                return Ok(());
            }
        }
        self.before_value(false)?;
        self.out.push_str("null");
        Ok(())
    }

    /// Writes `value` verbatim as the next value. The text is not validated.
    pub fn raw_value(&mut self, value: &str) -> Result<(), WriteError> {
        self.write_deferred_name()?;
        self.before_value(false)?;
        self.out.push_str(value);
        Ok(())
    }

    /// Checks that the document is complete and closes the writer.
    pub fn close(&mut self) -> Result<(), WriteError> {
        let size = self.stack.len();
        let complete = matches!(self.stack.peek(), Scope::NonemptyDocument | Scope::Closed);
        if size > 1 || !complete {
            return Err(WriteError::IncompleteDocument);
        }
        self.stack.close();
        Ok(())
    }

    /// The text written so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.out
    }

    fn defer_name(&mut self, name: &str, unescaped: bool) -> Result<(), WriteError> {
        if let Some(pending) = &self.deferred_name {
            return Err(WriteError::NameAlreadyPending(pending.clone()));
        }
        if self.stack.peek() == Scope::Closed {
            return Err(WriteError::Closed);
        }
        self.deferred_name = Some(name.to_owned());
        self.deferred_name_unescaped = unescaped;
        Ok(())
    }

    fn open(&mut self, empty: Scope, bracket: char) -> Result<(), WriteError> {
        self.write_deferred_name()?;
        self.before_value(true)?;
        self.stack.push(empty);
        self.out.push(bracket);
        Ok(())
    }

    fn close_scope(&mut self, empty: Scope, nonempty: Scope, bracket: char) -> Result<(), WriteError> {
        let context = self.stack.peek();
        if context != nonempty && context != empty {
            return Err(WriteError::NestingProblem);
        }
        if let Some(name) = self.deferred_name.take() {
            return Err(WriteError::DanglingName(name));
        }
        self.stack.pop();
        if context == nonempty {
            self.newline();
        }
        self.out.push(bracket);
        Ok(())
    }

    fn write_deferred_name(&mut self) -> Result<(), WriteError> {
        if let Some(name) = self.deferred_name.take() {
            self.before_name()?;
            if self.deferred_name_unescaped {
                self.out.push('"');
                self.out.push_str(&name);
                self.out.push('"');
            } else {
                self.write_string(&name);
            }
            self.deferred_name_unescaped = false;
        }
        Ok(())
    }

    fn write_string(&mut self, value: &str) {
        self.out.push('"');
        write_escaped_str(&mut self.out, value, self.html_safe);
        self.out.push('"');
    }

    fn newline(&mut self) {
        let Some(indent) = &self.indent else {
            return;
        };
        self.out.push('\n');
        for _ in 1..self.stack.len() {
            self.out.push_str(indent);
        }
    }

    fn before_name(&mut self) -> Result<(), WriteError> {
        match self.stack.peek() {
            Scope::NonemptyObject => self.out.push(','),
            Scope::EmptyObject => {}
            _ => return Err(WriteError::NestingProblem),
        }
        self.newline();
        self.stack.replace_top(Scope::DanglingName);
        Ok(())
    }

    /// Updates the scope before a value. `root` is `true` for arrays and
    /// objects, which are always legal at the top level.
    fn before_value(&mut self, root: bool) -> Result<(), WriteError> {
        match self.stack.peek() {
            Scope::NonemptyDocument if !self.lenient => Err(WriteError::MultipleTopLevelValues),
            Scope::EmptyDocument | Scope::NonemptyDocument => {
                if !self.lenient && !root {
                    return Err(WriteError::TopLevelNotContainer);
                }
                self.stack.replace_top(Scope::NonemptyDocument);
                Ok(())
            }
            Scope::EmptyArray => {
                self.stack.replace_top(Scope::NonemptyArray);
                self.newline();
                Ok(())
            }
            Scope::NonemptyArray => {
                self.out.push(',');
                self.newline();
                Ok(())
            }
            Scope::DanglingName => {
                self.out.push_str(if self.indent.is_some() { ": " } else { ":" });
                self.stack.replace_top(Scope::NonemptyObject);
                Ok(())
            }
            Scope::Closed => Err(WriteError::Closed),
            Scope::EmptyObject | Scope::NonemptyObject => Err(WriteError::NestingProblem),
        }
    }
}
