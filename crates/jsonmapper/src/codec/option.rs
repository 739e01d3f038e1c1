use crate::{
    context::{DeserializationContext, DeserializerParameters, Include, SerializationContext, SerializerParameters},
    error::{Error, ReadErrorKind},
    identity::BackReference,
    stream::{JsonReader, JsonWriter},
};

use super::{Deserializer, Serializer};

/// Writes `Option<T>`, with `None` as `null`.
///
/// Inside an object, the member holding `None` is dropped unless
/// `serialize_nulls` is set, or the value belongs to a map and
/// `write_null_map_values` is set. [`Include::NonNull`] drops it regardless.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionSerializer<S> {
    inner: S,
}

impl<S> OptionSerializer<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<T, S: Serializer<T>> Serializer<Option<T>> for OptionSerializer<S> {
    fn is_empty(&self, value: &Option<T>) -> bool {
        value.as_ref().is_none_or(|v| self.inner.is_empty(v))
    }

    fn serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Option<T>,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        match value {
            Some(v) => self.inner.serialize(writer, v, ctx, params),
            None if params.include != Include::Always => {
                writer.cancel_name();
                Ok(())
            }
            None => self.do_serialize(writer, value, ctx, params),
        }
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Option<T>,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        if let Some(v) = value {
            return self.inner.do_serialize(writer, v, ctx, params);
        }
        let force = ctx.serialize_nulls() || (params.map_value && ctx.write_null_map_values());
        if force && !writer.serialize_nulls() {
            writer.set_serialize_nulls(true);
            let written = writer.null_value();
            writer.set_serialize_nulls(false);
            return Ok(written?);
        }
        Ok(writer.null_value()?)
    }
}

/// Reads `Option<T>`, with `null` as `None`.
///
/// When `read_unknown_enum_values_as_null` is set, an unknown enum constant
/// read by the inner deserializer also becomes `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionDeserializer<D> {
    inner: D,
}

impl<D> OptionDeserializer<D> {
    pub const fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<T, D: Deserializer<T>> Deserializer<Option<T>> for OptionDeserializer<D> {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Option<T>, Error> {
        match self.inner.do_deserialize(reader, ctx, params) {
            Ok(value) => Ok(Some(value)),
            Err(err)
                if ctx.read_unknown_enum_values_as_null()
                    && matches!(err.read_kind(), Some(ReadErrorKind::UnknownEnumValue(_))) =>
            {
                log::debug!("reading unknown enum constant as null: {err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn deserialize_null_value(
        &self,
        reader: &mut JsonReader<'_>,
        _ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<Option<T>, Error> {
        reader.next_null()?;
        Ok(None)
    }

    fn set_back_reference(
        &self,
        reference_name: &str,
        reference: &BackReference,
        value: &mut Option<T>,
        ctx: &DeserializationContext,
    ) {
        if let Some(v) = value {
            self.inner.set_back_reference(reference_name, reference, v, ctx);
        }
    }
}
