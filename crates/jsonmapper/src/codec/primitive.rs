//! Codecs for strings, booleans, characters and numbers.
//!
//! Deserializers are forgiving about the token they receive: numbers are
//! readable from numeric strings, strings from numbers and booleans, and
//! booleans from `"true"`/`"false"` and `1`/`0`.

use crate::{
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::{Error, ReadErrorKind},
    number::{JsonNumber, format_double},
    stream::{JsonReader, JsonWriter, Token},
};

use super::{Deserializer, Serializer};

/// A value that is passed through as JSON text without being interpreted.
///
/// Reading captures the compact text of the next value; writing emits the
/// text verbatim.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RawValue(pub String);

impl RawValue {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// -----------------------------------------------------------------------------
// Strings
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Serializer<str> for StringSerializer {
    fn is_empty(&self, value: &str) -> bool {
        value.is_empty()
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &str,
        _ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        Ok(writer.string_value(value)?)
    }
}

impl Serializer<String> for StringSerializer {
    fn is_empty(&self, value: &String) -> bool {
        value.is_empty()
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &String,
        _ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        Ok(writer.string_value(value)?)
    }
}

/// Reads strings. Booleans and numbers are accepted in their literal form.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDeserializer;

impl Deserializer<String> for StringDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<String, Error> {
        if reader.peek()? == Token::Boolean {
            return Ok(reader.next_boolean()?.to_string());
        }
        expect_scalar(reader, "String")?;
        Ok(reader.next_string()?)
    }
}

// -----------------------------------------------------------------------------
// Booleans and characters
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolSerializer;

impl Serializer<bool> for BoolSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &bool,
        _ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        Ok(writer.bool_value(*value)?)
    }
}

/// Reads booleans from `true`/`false`, from strings compared
/// case-insensitively to `"true"`, and from numbers (`1` is `true`).
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolDeserializer;

impl Deserializer<bool> for BoolDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<bool, Error> {
        match reader.peek()? {
            Token::Boolean => Ok(reader.next_boolean()?),
            Token::String => Ok(reader.next_string()?.eq_ignore_ascii_case("true")),
            Token::Number => Ok(reader.next_int()? == 1),
            _ => Err(reader.type_mismatch("bool").into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CharSerializer;

impl Serializer<char> for CharSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &char,
        _ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        let mut buf = [0u8; 4];
        Ok(writer.string_value(value.encode_utf8(&mut buf))?)
    }
}

/// Reads a character from the first character of a string, or from a
/// numeric code point.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharDeserializer;

impl Deserializer<char> for CharDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<char, Error> {
        if reader.peek()? == Token::Number {
            let code = reader.next_int()?;
            return u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| ctx.trace_error(reader, format!("{code} is not a valid code point")));
        }
        expect_scalar(reader, "char")?;
        let value = reader.next_string()?;
        value
            .chars()
            .next()
            .ok_or_else(|| ctx.trace_error(reader, "Cannot read a char out of an empty string"))
    }
}

// -----------------------------------------------------------------------------
// Numbers
// -----------------------------------------------------------------------------

macro_rules! integer_serializer {
    ($name:ident, $ty:ty) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Serializer<$ty> for $name {
            fn do_serialize(
                &self,
                writer: &mut JsonWriter,
                value: &$ty,
                _ctx: &mut SerializationContext,
                _params: &SerializerParameters,
            ) -> Result<(), Error> {
                Ok(writer.i64_value(i64::from(*value))?)
            }
        }
    };
}

integer_serializer!(I8Serializer, i8);
integer_serializer!(I16Serializer, i16);
integer_serializer!(I32Serializer, i32);
integer_serializer!(I64Serializer, i64);

/// Fails with [`ReadErrorKind::TypeMismatch`] unless the next token is a
/// number or a string.
fn expect_scalar(reader: &mut JsonReader<'_>, target: &'static str) -> Result<(), Error> {
    match reader.peek()? {
        Token::Number | Token::String => Ok(()),
        _ => Err(reader.type_mismatch(target).into()),
    }
}

/// Reads an `i32` and narrows it, failing with
/// [`ReadErrorKind::PrecisionLoss`] when it does not fit.
fn next_narrow<T: TryFrom<i32>>(reader: &mut JsonReader<'_>, target: &'static str) -> Result<T, Error> {
    let value = reader.next_int()?;
    T::try_from(value).map_err(|_| {
        reader
            .error(ReadErrorKind::PrecisionLoss {
                target,
                literal: value.to_string(),
            })
            .into()
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct I8Deserializer;

impl Deserializer<i8> for I8Deserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<i8, Error> {
        expect_scalar(reader, "i8")?;
        next_narrow(reader, "a byte")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct I16Deserializer;

impl Deserializer<i16> for I16Deserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<i16, Error> {
        expect_scalar(reader, "i16")?;
        next_narrow(reader, "a short")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct I32Deserializer;

impl Deserializer<i32> for I32Deserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<i32, Error> {
        expect_scalar(reader, "i32")?;
        Ok(reader.next_int()?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct I64Deserializer;

impl Deserializer<i64> for I64Deserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<i64, Error> {
        expect_scalar(reader, "i64")?;
        Ok(reader.next_long()?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct F32Serializer;

impl Serializer<f32> for F32Serializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &f32,
        _ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        if !value.is_finite() {
            return Ok(writer.f64_value(f64::from(*value))?);
        }
        // Formatting as f32 keeps `0.1f32` from widening to 0.10000000149011612.
        Ok(writer.raw_value(&format_double(*value))?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct F64Serializer;

impl Serializer<f64> for F64Serializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &f64,
        _ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        Ok(writer.f64_value(*value)?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct F32Deserializer;

impl Deserializer<f32> for F32Deserializer {
    #[allow(clippy::cast_possible_truncation)]
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<f32, Error> {
        expect_scalar(reader, "f32")?;
        Ok(reader.next_double()? as f32)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct F64Deserializer;

impl Deserializer<f64> for F64Deserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<f64, Error> {
        expect_scalar(reader, "f64")?;
        Ok(reader.next_double()?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberSerializer;

impl Serializer<JsonNumber> for NumberSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &JsonNumber,
        _ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        Ok(writer.number_value(value)?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberDeserializer;

impl Deserializer<JsonNumber> for NumberDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<JsonNumber, Error> {
        expect_scalar(reader, "JsonNumber")?;
        Ok(reader.next_number()?)
    }
}

// -----------------------------------------------------------------------------
// Raw values
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct RawValueSerializer;

impl Serializer<RawValue> for RawValueSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &RawValue,
        _ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        Ok(writer.raw_value(&value.0)?)
    }
}

/// Captures the next value, `null` included, as JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawValueDeserializer;

impl Deserializer<RawValue> for RawValueDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<RawValue, Error> {
        Ok(RawValue(reader.next_value()?))
    }

    fn deserialize_null_value(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<RawValue, Error> {
        Ok(RawValue(reader.next_value()?))
    }
}
