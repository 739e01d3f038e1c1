//! Polymorphic codecs that record the concrete subtype next to the value.

use alloc::{collections::BTreeMap, sync::Arc};

use crate::{
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::Error,
    registry::{SharedDeserializer, SharedSerializer},
    stream::{JsonReader, JsonWriter, Token},
};

use super::{Deserializer, Serializer};

/// Where the type id of a polymorphic value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeInclusion {
    /// As the first member of the value's own object: `{"type":"circle","r":1}`.
    Property(&'static str),
    /// As the only member name of a wrapping object: `{"circle":{"r":1}}`.
    WrapperObject,
    /// As the first element of a wrapping array: `["circle",{"r":1}]`.
    WrapperArray,
}

/// Writes a polymorphic value through the serializer registered for its
/// type id.
///
/// # Examples
///
/// ```
/// use jsonmapper::{
///     codec::{F64Serializer, Serializer, SubtypeSerializer, TypeInclusion},
///     SerializationContext, SerializerParameters,
/// };
///
/// let codec = SubtypeSerializer::new(TypeInclusion::WrapperArray, |_: &f64| "real")
///     .with_subtype("real", F64Serializer);
/// let mut ctx = SerializationContext::default();
/// let mut writer = ctx.new_writer();
/// codec
///     .serialize(&mut writer, &1.5, &mut ctx, &SerializerParameters::default())
///     .unwrap();
/// assert_eq!(writer.output(), r#"["real",1.5]"#);
/// ```
pub struct SubtypeSerializer<T: ?Sized> {
    inclusion: TypeInclusion,
    type_of: fn(&T) -> &'static str,
    subtypes: BTreeMap<&'static str, SharedSerializer<T>>,
}

impl<T: ?Sized> SubtypeSerializer<T> {
    /// `type_of` maps a value to the id of its concrete subtype.
    #[must_use]
    pub fn new(inclusion: TypeInclusion, type_of: fn(&T) -> &'static str) -> Self {
        Self {
            inclusion,
            type_of,
            subtypes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_subtype<S>(mut self, type_id: &'static str, serializer: S) -> Self
    where
        S: Serializer<T> + Send + Sync + 'static,
    {
        self.subtypes.insert(type_id, Arc::new(serializer));
        self
    }
}

impl<T: ?Sized> Serializer<T> for SubtypeSerializer<T> {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        let type_id = (self.type_of)(value);
        let Some(serializer) = self.subtypes.get(type_id) else {
            return Err(ctx.trace_error(format!("No serializer registered for subtype '{type_id}'")));
        };
        let params = SerializerParameters::default();
        match self.inclusion {
            TypeInclusion::Property(property) => {
                // The subtype writes its own object; it is buffered and
                // re-emitted after the type property.
                let mut buffer = ctx.new_writer();
                buffer.set_indent(None);
                buffer.set_lenient(true);
                serializer.serialize(&mut buffer, value, ctx, &params)?;
                let text = buffer.into_output();
                if text.is_empty() {
                    writer.cancel_name();
                    return Ok(());
                }
                let mut members = JsonReader::new(&text);
                if members.peek()? != Token::BeginObject {
                    return Err(ctx.trace_error(format!(
                        "Subtype '{type_id}' must be written as an object to carry the '{property}' property"
                    )));
                }
                members.begin_object()?;
                writer.begin_object()?;
                writer.name(property)?;
                writer.string_value(type_id)?;
                while members.has_next()? {
                    let name = members.next_name()?;
                    let member = members.next_value()?;
                    if name != property {
                        writer.name(&name)?;
                        writer.raw_value(&member)?;
                    }
                }
                members.end_object()?;
                writer.end_object()?;
            }
            TypeInclusion::WrapperObject => {
                writer.begin_object()?;
                writer.name(type_id)?;
                serializer.serialize(writer, value, ctx, &params)?;
                writer.end_object()?;
            }
            TypeInclusion::WrapperArray => {
                writer.begin_array()?;
                writer.string_value(type_id)?;
                serializer.serialize(writer, value, ctx, &params)?;
                writer.end_array()?;
            }
        }
        Ok(())
    }
}

/// Reads a polymorphic value through the deserializer registered for the
/// type id found in the input.
pub struct SubtypeDeserializer<T> {
    inclusion: TypeInclusion,
    subtypes: BTreeMap<&'static str, SharedDeserializer<T>>,
    default_subtype: Option<&'static str>,
}

impl<T> SubtypeDeserializer<T> {
    #[must_use]
    pub fn new(inclusion: TypeInclusion) -> Self {
        Self {
            inclusion,
            subtypes: BTreeMap::new(),
            default_subtype: None,
        }
    }

    #[must_use]
    pub fn with_subtype<D>(mut self, type_id: &'static str, deserializer: D) -> Self
    where
        D: Deserializer<T> + Send + Sync + 'static,
    {
        self.subtypes.insert(type_id, Arc::new(deserializer));
        self
    }

    /// The subtype used when a [`TypeInclusion::Property`] object has no
    /// type property.
    #[must_use]
    pub fn with_default_subtype(mut self, type_id: &'static str) -> Self {
        self.default_subtype = Some(type_id);
        self
    }

    fn subtype(
        &self,
        type_id: &str,
        reader: &JsonReader<'_>,
        ctx: &DeserializationContext,
    ) -> Result<&SharedDeserializer<T>, Error> {
        self.subtypes
            .get(type_id)
            .ok_or_else(|| ctx.trace_error(reader, format!("Unknown subtype '{type_id}'")))
    }
}

impl<T> Deserializer<T> for SubtypeDeserializer<T> {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<T, Error> {
        match self.inclusion {
            TypeInclusion::Property(property) => {
                if reader.peek()? != Token::BeginObject {
                    return Err(reader.type_mismatch("a polymorphic object").into());
                }
                let text = reader.next_value()?;
                let mut members = JsonReader::new(&text);
                let mut rest = JsonWriter::new();
                let mut type_id = None;
                members.begin_object()?;
                rest.begin_object()?;
                while members.has_next()? {
                    let name = members.next_name()?;
                    if name == property && type_id.is_none() {
                        type_id = Some(members.next_string()?);
                        continue;
                    }
                    rest.name(&name)?;
                    rest.raw_value(&members.next_value()?)?;
                }
                members.end_object()?;
                rest.end_object()?;

                let type_id = match (type_id, self.default_subtype) {
                    (Some(id), _) => id,
                    (None, Some(default)) => default.to_owned(),
                    (None, None) => {
                        return Err(ctx.trace_error(reader, format!("Cannot find the '{property}' property")));
                    }
                };
                let deserializer = self.subtype(&type_id, reader, ctx)?;
                let rest = rest.into_output();
                let mut rest_reader = ctx.new_reader(&rest);
                deserializer.deserialize(&mut rest_reader, ctx, params)
            }
            TypeInclusion::WrapperObject => {
                reader.begin_object()?;
                let type_id = reader.next_name()?;
                let value = self.subtype(&type_id, reader, ctx)?.deserialize(reader, ctx, params)?;
                reader.end_object()?;
                Ok(value)
            }
            TypeInclusion::WrapperArray => {
                reader.begin_array()?;
                let type_id = reader.next_string()?;
                let value = self.subtype(&type_id, reader, ctx)?.deserialize(reader, ctx, params)?;
                reader.end_array()?;
                Ok(value)
            }
        }
    }
}
