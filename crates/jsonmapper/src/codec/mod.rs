//! Type-directed serializers and deserializers.
//!
//! Overview
//! - A [`Serializer<T>`] writes one `T` through a [`JsonWriter`]; a
//!   [`Deserializer<T>`] reads one `T` from a [`JsonReader`]. Both are
//!   stateless: everything that lives for one call sits in the
//!   [`SerializationContext`] / [`DeserializationContext`] passed along.
//! - Container codecs are generic structs holding the codec of their
//!   elements, so `Vec<Option<String>>` is
//!   `CollectionSerializer::new(OptionSerializer::new(StringSerializer))`.
//! - Codecs for user types are written by hand (or generated) against these
//!   traits and plugged in through a [`CodecRegistry`](crate::CodecRegistry)
//!   or passed directly to an [`ObjectMapper`](crate::ObjectMapper).

use alloc::{boxed::Box, sync::Arc};

use crate::{
    context::{DeserializationContext, DeserializerParameters, Include, SerializationContext, SerializerParameters},
    error::Error,
    identity::BackReference,
    stream::{JsonReader, JsonWriter, Token},
};

mod any;
mod array;
mod collection;
mod enums;
mod identity;
mod key;
mod map;
mod option;
mod primitive;
mod subtype;

pub use any::{ValueDeserializer, ValueSerializer};
pub use array::{
    Array2d, Array2dDeserializer, Array2dSerializer, ArrayDeserializer, ArraySerializer, CharArrayDeserializer,
    CharArraySerializer, PrimitiveArray2dDeserializer, PrimitiveArrayDeserializer, RaggedRows,
};
pub use collection::{CollectionDeserializer, CollectionSerializer, JsonCollection};
pub use enums::{EnumDeserializer, EnumSerializer, EnumSetDeserializer, JsonEnum};
pub use identity::{IdentityDeserializer, IdentitySerializer, Shared};
pub use key::{
    BoolKeyCodec, CharKeyCodec, EnumKeyCodec, FloatKeyCodec, IntegerKeyCodec, KeyDeserializer, KeySerializer,
    StringKeyCodec,
};
pub use map::{MapDeserializer, MapSerializer};
pub use option::{OptionDeserializer, OptionSerializer};
pub use primitive::{
    BoolDeserializer, BoolSerializer, CharDeserializer, CharSerializer, F32Deserializer, F32Serializer,
    F64Deserializer, F64Serializer, I8Deserializer, I8Serializer, I16Deserializer, I16Serializer, I32Deserializer,
    I32Serializer, I64Deserializer, I64Serializer, NumberDeserializer, NumberSerializer, RawValue,
    RawValueDeserializer, RawValueSerializer, StringDeserializer, StringSerializer,
};
pub use subtype::{SubtypeDeserializer, SubtypeSerializer, TypeInclusion};

/// Writes values of type `T`.
pub trait Serializer<T: ?Sized> {
    /// Whether `value` counts as empty for [`Include::NonEmpty`].
    fn is_empty(&self, _value: &T) -> bool {
        false
    }

    /// Writes `value`, or drops the pending member name when the parameters
    /// exclude it.
    fn serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        if params.include == Include::NonEmpty && self.is_empty(value) {
            writer.cancel_name();
            return Ok(());
        }
        self.do_serialize(writer, value, ctx, params)
    }

    /// Writes a value that is known to be included.
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error>;
}

/// Reads values of type `T`.
pub trait Deserializer<T> {
    /// Reads the next value. A `null` token goes to
    /// [`deserialize_null_value`](Self::deserialize_null_value), anything
    /// else to [`do_deserialize`](Self::do_deserialize).
    fn deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<T, Error> {
        if reader.peek()? == Token::Null {
            return self.deserialize_null_value(reader, ctx, params);
        }
        self.do_deserialize(reader, ctx, params)
    }

    /// Reads a value whose next token is not `null`.
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<T, Error>;

    /// Called with the next token being `null`. Fails unless overridden.
    fn deserialize_null_value(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<T, Error> {
        Err(reader.type_mismatch(core::any::type_name::<T>()).into())
    }

    /// Hands the owner of a managed reference to a freshly read value.
    /// Containers forward the call to each element.
    fn set_back_reference(
        &self,
        _reference_name: &str,
        _reference: &BackReference,
        _value: &mut T,
        _ctx: &DeserializationContext,
    ) {
    }
}

macro_rules! forward_serializer {
    ($($ptr:ident)::+) => {
        impl<T: ?Sized, S: Serializer<T> + ?Sized> Serializer<T> for $($ptr)::+<S> {
            fn is_empty(&self, value: &T) -> bool {
                (**self).is_empty(value)
            }

            fn serialize(
                &self,
                writer: &mut JsonWriter,
                value: &T,
                ctx: &mut SerializationContext,
                params: &SerializerParameters,
            ) -> Result<(), Error> {
                (**self).serialize(writer, value, ctx, params)
            }

            fn do_serialize(
                &self,
                writer: &mut JsonWriter,
                value: &T,
                ctx: &mut SerializationContext,
                params: &SerializerParameters,
            ) -> Result<(), Error> {
                (**self).do_serialize(writer, value, ctx, params)
            }
        }
    };
}

macro_rules! forward_deserializer {
    ($($ptr:ident)::+) => {
        impl<T, D: Deserializer<T> + ?Sized> Deserializer<T> for $($ptr)::+<D> {
            fn deserialize(
                &self,
                reader: &mut JsonReader<'_>,
                ctx: &mut DeserializationContext,
                params: &DeserializerParameters,
            ) -> Result<T, Error> {
                (**self).deserialize(reader, ctx, params)
            }

            fn do_deserialize(
                &self,
                reader: &mut JsonReader<'_>,
                ctx: &mut DeserializationContext,
                params: &DeserializerParameters,
            ) -> Result<T, Error> {
                (**self).do_deserialize(reader, ctx, params)
            }

            fn deserialize_null_value(
                &self,
                reader: &mut JsonReader<'_>,
                ctx: &mut DeserializationContext,
                params: &DeserializerParameters,
            ) -> Result<T, Error> {
                (**self).deserialize_null_value(reader, ctx, params)
            }

            fn set_back_reference(
                &self,
                reference_name: &str,
                reference: &BackReference,
                value: &mut T,
                ctx: &DeserializationContext,
            ) {
                (**self).set_back_reference(reference_name, reference, value, ctx);
            }
        }
    };
}

forward_serializer!(Box);
forward_serializer!(Arc);
forward_deserializer!(Box);
forward_deserializer!(Arc);

impl<T: ?Sized, S: Serializer<T> + ?Sized> Serializer<T> for &S {
    fn is_empty(&self, value: &T) -> bool {
        (**self).is_empty(value)
    }

    fn serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        (**self).serialize(writer, value, ctx, params)
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        (**self).do_serialize(writer, value, ctx, params)
    }
}

impl<T, D: Deserializer<T> + ?Sized> Deserializer<T> for &D {
    fn deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<T, Error> {
        (**self).deserialize(reader, ctx, params)
    }

    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<T, Error> {
        (**self).do_deserialize(reader, ctx, params)
    }

    fn deserialize_null_value(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<T, Error> {
        (**self).deserialize_null_value(reader, ctx, params)
    }

    fn set_back_reference(
        &self,
        reference_name: &str,
        reference: &BackReference,
        value: &mut T,
        ctx: &DeserializationContext,
    ) {
        (**self).set_back_reference(reference_name, reference, value, ctx);
    }
}

/// Reads the members of an object, calling `member` with each name.
///
/// `member` must consume the value of the member, typically through a
/// property deserializer or
/// [`DeserializationContext::unknown_property`].
///
/// # Examples
///
/// ```
/// use jsonmapper::{
///     codec::{read_object, Deserializer, I32Deserializer},
///     DeserializationContext, DeserializerParameters,
/// };
///
/// let mut ctx = DeserializationContext::default();
/// let mut reader = ctx.new_reader(r#"{"x": 1, "y": 2}"#);
/// let params = DeserializerParameters::default();
/// let mut sum = 0;
/// read_object(&mut reader, &mut ctx, |name, reader, ctx| {
///     let v = I32Deserializer.deserialize(reader, ctx, &params)?;
///     sum += if name == "x" { v } else { 10 * v };
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(sum, 21);
/// ```
pub fn read_object<F>(reader: &mut JsonReader<'_>, ctx: &mut DeserializationContext, mut member: F) -> Result<(), Error>
where
    F: FnMut(&str, &mut JsonReader<'_>, &mut DeserializationContext) -> Result<(), Error>,
{
    reader.begin_object()?;
    while reader.has_next()? {
        let name = reader.next_name()?;
        member(&name, reader, ctx)?;
    }
    reader.end_object()?;
    Ok(())
}
