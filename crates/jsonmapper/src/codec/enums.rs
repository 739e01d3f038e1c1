use core::marker::PhantomData;

use crate::{
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::{Error, ReadErrorKind},
    stream::{JsonReader, JsonWriter, Token},
};

use super::{Deserializer, JsonCollection, Serializer};

/// An enum whose constants are written by name.
///
/// # Examples
///
/// ```
/// use jsonmapper::codec::JsonEnum;
///
/// #[derive(Debug, PartialEq)]
/// enum Color {
///     Red,
///     Green,
/// }
///
/// impl JsonEnum for Color {
///     fn name(&self) -> &'static str {
///         match self {
///             Color::Red => "RED",
///             Color::Green => "GREEN",
///         }
///     }
///
///     fn from_name(name: &str) -> Option<Self> {
///         match name {
///             "RED" => Some(Color::Red),
///             "GREEN" => Some(Color::Green),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Color::from_name(Color::Green.name()), Some(Color::Green));
/// ```
pub trait JsonEnum: Sized {
    /// The constant name. It is written without escaping.
    fn name(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnumSerializer;

impl<E: JsonEnum> Serializer<E> for EnumSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &E,
        _ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        Ok(writer.unescaped_value(value.name())?)
    }
}

/// Reads an enum constant from its name. Unknown names fail with
/// [`ReadErrorKind::UnknownEnumValue`]; wrap the deserializer in an
/// [`OptionDeserializer`](super::OptionDeserializer) to read them as `None`
/// under `read_unknown_enum_values_as_null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumDeserializer;

impl<E: JsonEnum> Deserializer<E> for EnumDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<E, Error> {
        let name = next_constant_name::<E>(reader)?;
        E::from_name(&name).ok_or_else(|| reader.error(ReadErrorKind::UnknownEnumValue(name)).into())
    }
}

fn next_constant_name<E>(reader: &mut JsonReader<'_>) -> Result<String, Error> {
    if reader.peek()? != Token::String {
        return Err(reader.type_mismatch(core::any::type_name::<E>()).into());
    }
    Ok(reader.next_string()?)
}

/// Reads an array of enum constants into a collection.
///
/// `null` elements are skipped, and so are unknown constants when
/// `read_unknown_enum_values_as_null` is set.
#[derive(Debug, Clone, Copy)]
pub struct EnumSetDeserializer<E>(PhantomData<fn() -> E>);

impl<E> EnumSetDeserializer<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for EnumSetDeserializer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: JsonEnum, C: JsonCollection<E>> Deserializer<C> for EnumSetDeserializer<E> {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<C, Error> {
        let mut constants = Vec::new();
        reader.begin_array()?;
        while reader.has_next()? {
            if reader.peek()? == Token::Null {
                reader.next_null()?;
                continue;
            }
            let name = next_constant_name::<E>(reader)?;
            match E::from_name(&name) {
                Some(constant) => constants.push(constant),
                None if ctx.read_unknown_enum_values_as_null() => {
                    log::debug!("skipping unknown enum constant {name:?}");
                }
                None => return Err(reader.error(ReadErrorKind::UnknownEnumValue(name)).into()),
            }
        }
        reader.end_array()?;
        Ok(C::from_elements(constants))
    }
}
