use core::marker::PhantomData;

use crate::{
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::Error,
    identity::BackReference,
    registry::Registered,
    stream::{JsonReader, JsonWriter},
};

use super::{Deserializer, KeyDeserializer, KeySerializer, Serializer};

/// Writes a map as an object, turning keys into member names through a
/// [`KeySerializer`].
///
/// Values are serialized as map values, so absent values are written as
/// `null` under `write_null_map_values`.
#[derive(Debug, Clone, Copy)]
pub struct MapSerializer<K: ?Sized, V: ?Sized, KS, VS> {
    key: KS,
    value: VS,
    _marker: PhantomData<fn(&K, &V)>,
}

impl<K: ?Sized, V: ?Sized, KS, VS> MapSerializer<K, V, KS, VS> {
    pub const fn new(key: KS, value: VS) -> Self {
        Self {
            key,
            value,
            _marker: PhantomData,
        }
    }
}

impl<K: ?Sized, V: ?Sized, VS> MapSerializer<K, V, Registered, VS> {
    /// A serializer that looks the key serializer up in the context's
    /// registry. Fails with
    /// [`WriteError::MissingKeySerializer`](crate::WriteError::MissingKeySerializer)
    /// when none is registered for `K`.
    pub const fn with_registered_keys(value: VS) -> Self {
        Self::new(Registered, value)
    }
}

impl<K, V, M, KS, VS> Serializer<M> for MapSerializer<K, V, KS, VS>
where
    K: ?Sized,
    V: ?Sized,
    M: ?Sized,
    KS: KeySerializer<K>,
    VS: Serializer<V>,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
{
    fn is_empty(&self, value: &M) -> bool {
        value.into_iter().next().is_none()
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &M,
        ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        let mut entries = value
            .into_iter()
            .map(|(k, v)| Ok((self.key.serialize(k, ctx)?, v)))
            .collect::<Result<Vec<_>, Error>>()?;
        if ctx.order_map_entries_by_keys() {
            entries.sort_by(|a, b| a.0.cmp(&b.0));
        }
        let params = SerializerParameters {
            map_value: true,
            ..SerializerParameters::default()
        };
        writer.begin_object()?;
        for (name, v) in entries {
            writer.name(&name)?;
            self.value.serialize(writer, v, ctx, &params)?;
        }
        writer.end_object()?;
        Ok(())
    }
}

/// Reads an object into any map type that can be extended with entries.
#[derive(Debug, Clone, Copy)]
pub struct MapDeserializer<K, V, KD, VD> {
    key: KD,
    value: VD,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, KD, VD> MapDeserializer<K, V, KD, VD> {
    pub const fn new(key: KD, value: VD) -> Self {
        Self {
            key,
            value,
            _marker: PhantomData,
        }
    }
}

impl<K, V, VD> MapDeserializer<K, V, Registered, VD> {
    /// A deserializer that looks the key deserializer up in the context's
    /// registry.
    pub const fn with_registered_keys(value: VD) -> Self {
        Self::new(Registered, value)
    }
}

impl<K, V, M, KD, VD> Deserializer<M> for MapDeserializer<K, V, KD, VD>
where
    M: Default + Extend<(K, V)>,
    KD: KeyDeserializer<K>,
    VD: Deserializer<V>,
    for<'a> &'a mut M: IntoIterator<Item = (&'a K, &'a mut V)>,
{
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<M, Error> {
        let params = DeserializerParameters::default();
        let mut map = M::default();
        reader.begin_object()?;
        while reader.has_next()? {
            let name = reader.next_name()?;
            let key = self.key.deserialize(&name, reader, ctx)?;
            let value = self.value.deserialize(reader, ctx, &params)?;
            map.extend(core::iter::once((key, value)));
        }
        reader.end_object()?;
        Ok(map)
    }

    fn set_back_reference(&self, reference_name: &str, reference: &BackReference, value: &mut M, ctx: &DeserializationContext) {
        for (_, v) in value {
            self.value.set_back_reference(reference_name, reference, v, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use indexmap::IndexMap;

    use super::*;
    use crate::{
        codec::{
            EnumKeyCodec, I32Deserializer, I32Serializer, IntegerKeyCodec, JsonEnum, OptionSerializer,
            StringKeyCodec,
        },
        error::{ReadErrorKind, WriteError},
        options::SerializerOptions,
    };

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    enum Side {
        Left,
        Right,
    }

    impl JsonEnum for Side {
        fn name(&self) -> &'static str {
            match self {
                Side::Left => "LEFT",
                Side::Right => "RIGHT",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            match name {
                "LEFT" => Some(Side::Left),
                "RIGHT" => Some(Side::Right),
                _ => None,
            }
        }
    }

    fn write<M>(options: SerializerOptions, value: &M, serializer: &impl Serializer<M>) -> Result<String, Error> {
        let mut ctx = SerializationContext::new(options);
        let mut writer = ctx.new_writer();
        writer.begin_object()?;
        writer.name("m")?;
        serializer.serialize(&mut writer, value, &mut ctx, &SerializerParameters::default())?;
        writer.end_object()?;
        Ok(writer.into_output())
    }

    #[test]
    fn null_map_values() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Some(1));
        map.insert("b".to_string(), None);
        let codec = MapSerializer::new(StringKeyCodec, OptionSerializer::new(I32Serializer));

        assert_eq!(
            write(SerializerOptions::default(), &map, &codec).unwrap(),
            r#"{"m":{"a":1,"b":null}}"#
        );
        let skip_nulls = SerializerOptions {
            write_null_map_values: false,
            ..Default::default()
        };
        assert_eq!(write(skip_nulls, &map, &codec).unwrap(), r#"{"m":{"a":1}}"#);
    }

    #[test]
    fn ordered_and_empty_maps() {
        let mut map = HashMap::new();
        map.insert(10_i64, 1);
        map.insert(9_i64, 2);
        let codec = MapSerializer::new(IntegerKeyCodec, I32Serializer);
        let ordered = SerializerOptions {
            order_map_entries_by_keys: true,
            ..Default::default()
        };
        assert_eq!(write(ordered, &map, &codec).unwrap(), r#"{"m":{"10":1,"9":2}}"#);

        let empty: HashMap<i64, i32> = HashMap::new();
        let no_empty = SerializerOptions {
            write_empty_json_arrays: false,
            ..Default::default()
        };
        assert_eq!(write(no_empty, &empty, &codec).unwrap(), r#"{"m":{}}"#);
        assert_eq!(write(SerializerOptions::default(), &empty, &codec).unwrap(), r#"{"m":{}}"#);
    }

    #[test]
    fn registry_key_lookup() {
        let mut map = BTreeMap::new();
        map.insert(Side::Left, 1);
        let err = write(
            SerializerOptions::default(),
            &map,
            &MapSerializer::with_registered_keys(I32Serializer),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Write(WriteError::MissingKeySerializer(_))));

        let mut strings = BTreeMap::new();
        strings.insert("k".to_string(), 2);
        let codec = MapSerializer::with_registered_keys(I32Serializer);
        assert_eq!(
            write(SerializerOptions::default(), &strings, &codec).unwrap(),
            r#"{"m":{"k":2}}"#
        );
    }

    #[test]
    fn reads_enum_and_numeric_keys() {
        let mut ctx = DeserializationContext::default();
        let mut reader = ctx.new_reader(r#"{"RIGHT": 2, "LEFT": 1}"#);
        let codec = MapDeserializer::new(EnumKeyCodec::<Side>::new(), I32Deserializer);
        let map: BTreeMap<Side, i32> = codec
            .deserialize(&mut reader, &mut ctx, &DeserializerParameters::default())
            .unwrap();
        assert_eq!(map.into_iter().collect::<Vec<_>>(), [(Side::Left, 1), (Side::Right, 2)]);

        let mut reader = ctx.new_reader(r#"{"UP": 1}"#);
        let err = Deserializer::<BTreeMap<Side, i32>>::deserialize(
            &codec,
            &mut reader,
            &mut ctx,
            &DeserializerParameters::default(),
        )
        .unwrap_err();
        assert_eq!(err.read_kind(), Some(&ReadErrorKind::UnknownEnumValue("UP".into())));

        let mut reader = ctx.new_reader(r#"{"7": 1}"#);
        let codec = MapDeserializer::with_registered_keys(I32Deserializer);
        let map: HashMap<u8, i32> = codec
            .deserialize(&mut reader, &mut ctx, &DeserializerParameters::default())
            .unwrap();
        assert_eq!(map.get(&7), Some(&1));
    }
}
