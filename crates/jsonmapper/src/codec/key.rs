//! Codecs for map keys, which JSON always writes as object member names.

use alloc::sync::Arc;
use core::marker::PhantomData;

use crate::{
    context::{DeserializationContext, SerializationContext},
    error::{Error, ReadErrorKind},
    number::format_double,
    stream::JsonReader,
};

use super::JsonEnum;

/// Turns a map key into an object member name.
pub trait KeySerializer<K: ?Sized> {
    fn serialize(&self, key: &K, ctx: &SerializationContext) -> Result<String, Error>;
}

/// Turns an object member name back into a map key.
///
/// `reader` is positioned right after the name and is only used to locate
/// errors.
pub trait KeyDeserializer<K> {
    fn deserialize(&self, key: &str, reader: &JsonReader<'_>, ctx: &DeserializationContext) -> Result<K, Error>;
}

impl<K: ?Sized, S: KeySerializer<K> + ?Sized> KeySerializer<K> for Arc<S> {
    fn serialize(&self, key: &K, ctx: &SerializationContext) -> Result<String, Error> {
        (**self).serialize(key, ctx)
    }
}

impl<K, D: KeyDeserializer<K> + ?Sized> KeyDeserializer<K> for Arc<D> {
    fn deserialize(&self, key: &str, reader: &JsonReader<'_>, ctx: &DeserializationContext) -> Result<K, Error> {
        (**self).deserialize(key, reader, ctx)
    }
}

impl<K: ?Sized, S: KeySerializer<K> + ?Sized> KeySerializer<K> for &S {
    fn serialize(&self, key: &K, ctx: &SerializationContext) -> Result<String, Error> {
        (**self).serialize(key, ctx)
    }
}

impl<K, D: KeyDeserializer<K> + ?Sized> KeyDeserializer<K> for &D {
    fn deserialize(&self, key: &str, reader: &JsonReader<'_>, ctx: &DeserializationContext) -> Result<K, Error> {
        (**self).deserialize(key, reader, ctx)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringKeyCodec;

impl KeySerializer<String> for StringKeyCodec {
    fn serialize(&self, key: &String, _ctx: &SerializationContext) -> Result<String, Error> {
        Ok(key.clone())
    }
}

impl KeySerializer<str> for StringKeyCodec {
    fn serialize(&self, key: &str, _ctx: &SerializationContext) -> Result<String, Error> {
        Ok(key.to_owned())
    }
}

impl KeyDeserializer<String> for StringKeyCodec {
    fn deserialize(&self, key: &str, _reader: &JsonReader<'_>, _ctx: &DeserializationContext) -> Result<String, Error> {
        Ok(key.to_owned())
    }
}

/// Keys of any primitive integer type, written in decimal.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerKeyCodec;

macro_rules! integer_keys {
    ($($ty:ty),+) => {
        $(
            impl KeySerializer<$ty> for IntegerKeyCodec {
                fn serialize(&self, key: &$ty, _ctx: &SerializationContext) -> Result<String, Error> {
                    Ok(key.to_string())
                }
            }

            impl KeyDeserializer<$ty> for IntegerKeyCodec {
                fn deserialize(
                    &self,
                    key: &str,
                    reader: &JsonReader<'_>,
                    _ctx: &DeserializationContext,
                ) -> Result<$ty, Error> {
                    key.trim()
                        .parse()
                        .map_err(|_| reader.error(ReadErrorKind::InvalidNumber(key.to_owned())).into())
                }
            }
        )+
    };
}

integer_keys!(i8, i16, i32, i64, u8, u16, u32, u64);

/// Keys of type `f32` or `f64`, written in shortest round-trip form.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatKeyCodec;

macro_rules! float_keys {
    ($($ty:ty),+) => {
        $(
            impl KeySerializer<$ty> for FloatKeyCodec {
                fn serialize(&self, key: &$ty, _ctx: &SerializationContext) -> Result<String, Error> {
                    Ok(format_double(*key))
                }
            }

            impl KeyDeserializer<$ty> for FloatKeyCodec {
                fn deserialize(
                    &self,
                    key: &str,
                    reader: &JsonReader<'_>,
                    _ctx: &DeserializationContext,
                ) -> Result<$ty, Error> {
                    key.trim()
                        .parse()
                        .map_err(|_| reader.error(ReadErrorKind::InvalidNumber(key.to_owned())).into())
                }
            }
        )+
    };
}

float_keys!(f32, f64);

/// `"true"` and `"false"`, compared case-insensitively on read.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolKeyCodec;

impl KeySerializer<bool> for BoolKeyCodec {
    fn serialize(&self, key: &bool, _ctx: &SerializationContext) -> Result<String, Error> {
        Ok(key.to_string())
    }
}

impl KeyDeserializer<bool> for BoolKeyCodec {
    fn deserialize(&self, key: &str, _reader: &JsonReader<'_>, _ctx: &DeserializationContext) -> Result<bool, Error> {
        Ok(key.eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CharKeyCodec;

impl KeySerializer<char> for CharKeyCodec {
    fn serialize(&self, key: &char, _ctx: &SerializationContext) -> Result<String, Error> {
        Ok(key.to_string())
    }
}

impl KeyDeserializer<char> for CharKeyCodec {
    fn deserialize(&self, key: &str, reader: &JsonReader<'_>, ctx: &DeserializationContext) -> Result<char, Error> {
        key.chars()
            .next()
            .ok_or_else(|| ctx.trace_error(reader, "Cannot read a char key out of an empty name"))
    }
}

/// Enum keys, written as the constant name.
#[derive(Debug, Clone, Copy)]
pub struct EnumKeyCodec<E>(PhantomData<fn() -> E>);

impl<E> EnumKeyCodec<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for EnumKeyCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: JsonEnum> KeySerializer<E> for EnumKeyCodec<E> {
    fn serialize(&self, key: &E, _ctx: &SerializationContext) -> Result<String, Error> {
        Ok(key.name().to_owned())
    }
}

impl<E: JsonEnum> KeyDeserializer<E> for EnumKeyCodec<E> {
    fn deserialize(&self, key: &str, reader: &JsonReader<'_>, _ctx: &DeserializationContext) -> Result<E, Error> {
        E::from_name(key).ok_or_else(|| reader.error(ReadErrorKind::UnknownEnumValue(key.to_owned())).into())
    }
}
