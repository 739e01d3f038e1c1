//! Codecs for [`Value`], used wherever no static type is known.

use crate::{
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::{Error, ReadErrorKind},
    stream::{JsonReader, JsonWriter, Token},
    value::{Map, Value},
};

use super::{ArrayDeserializer, ArraySerializer, Deserializer, MapDeserializer, MapSerializer, Serializer, StringKeyCodec};

/// Writes a [`Value`]. Object members holding `null` are written as map
/// values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

impl Serializer<Value> for ValueSerializer {
    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(a) => a.is_empty(),
            Value::Object(m) => m.is_empty(),
            _ => false,
        }
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Value,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        match value {
            Value::Null => {
                let force = ctx.serialize_nulls() || (params.map_value && ctx.write_null_map_values());
                if force && !writer.serialize_nulls() {
                    writer.set_serialize_nulls(true);
                    let written = writer.null_value();
                    writer.set_serialize_nulls(false);
                    return Ok(written?);
                }
                Ok(writer.null_value()?)
            }
            Value::Boolean(b) => Ok(writer.bool_value(*b)?),
            Value::Number(n) => Ok(writer.number_value(n)?),
            Value::String(s) => Ok(writer.string_value(s)?),
            Value::Array(a) => ArraySerializer::new(ValueSerializer).do_serialize(writer, a, ctx, params),
            Value::Object(m) => MapSerializer::new(StringKeyCodec, ValueSerializer).do_serialize(writer, m, ctx, params),
        }
    }
}

/// Reads any JSON value into a [`Value`].
///
/// Numbers keep their narrowest exact representation, arrays recurse through
/// an array codec and objects through an ordered map codec.
///
/// # Examples
///
/// ```
/// use jsonmapper::{codec::{Deserializer, ValueDeserializer}, DeserializationContext, Value};
///
/// let mut ctx = DeserializationContext::default();
/// let mut reader = ctx.new_reader(r#"{"a":[1,"x",true,null,{"b":2}]}"#);
/// let value = ValueDeserializer.deserialize(&mut reader, &mut ctx, &Default::default()).unwrap();
/// assert_eq!(value.to_string(), r#"{"a":[1,"x",true,null,{"b":2}]}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueDeserializer;

impl Deserializer<Value> for ValueDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Value, Error> {
        match reader.peek()? {
            Token::Number => Ok(Value::Number(reader.next_number()?)),
            Token::String => Ok(Value::String(reader.next_string()?)),
            Token::Boolean => Ok(Value::Boolean(reader.next_boolean()?)),
            Token::Null => self.deserialize_null_value(reader, ctx, params),
            Token::BeginArray => Ok(Value::Array(
                ArrayDeserializer::new(ValueDeserializer).do_deserialize(reader, ctx, params)?,
            )),
            Token::BeginObject => {
                let codec = MapDeserializer::new(StringKeyCodec, ValueDeserializer);
                let map: Map = codec.do_deserialize(reader, ctx, params)?;
                Ok(Value::Object(map))
            }
            actual @ (Token::Name | Token::EndArray | Token::EndObject | Token::EndDocument) => {
                Err(reader
                    .error(ReadErrorKind::UnexpectedToken {
                        expected: "a value",
                        actual,
                    })
                    .into())
            }
        }
    }

    fn deserialize_null_value(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<Value, Error> {
        reader.next_null()?;
        Ok(Value::Null)
    }
}
