//! Runtime lookup of codecs by type.

use alloc::{collections::BTreeMap, sync::Arc};
use core::{
    any::{type_name, Any, TypeId},
    fmt,
};
use std::sync::LazyLock;

use crate::{
    codec::{
        BoolDeserializer, BoolKeyCodec, BoolSerializer, CharDeserializer, CharKeyCodec, CharSerializer,
        Deserializer, F32Deserializer, F32Serializer, F64Deserializer, F64Serializer, FloatKeyCodec,
        I16Deserializer, I16Serializer, I32Deserializer, I32Serializer, I64Deserializer, I64Serializer,
        I8Deserializer, I8Serializer, IntegerKeyCodec, KeyDeserializer, KeySerializer, NumberDeserializer,
        NumberSerializer, RawValue, RawValueDeserializer, RawValueSerializer, Serializer, StringDeserializer,
        StringKeyCodec, StringSerializer, ValueDeserializer, ValueSerializer,
    },
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::{Error, ReadErrorKind, WriteError},
    number::JsonNumber,
    stream::{JsonReader, JsonWriter},
    value::Value,
};

pub type SharedSerializer<T> = Arc<dyn Serializer<T> + Send + Sync>;
pub type SharedDeserializer<T> = Arc<dyn Deserializer<T> + Send + Sync>;
pub type SharedKeySerializer<T> = Arc<dyn KeySerializer<T> + Send + Sync>;
pub type SharedKeyDeserializer<T> = Arc<dyn KeyDeserializer<T> + Send + Sync>;

type Entries = BTreeMap<TypeId, Box<dyn Any + Send + Sync>>;

/// Maps types to shared serializers, deserializers and key codecs.
///
/// # Examples
///
/// ```
/// use jsonmapper::{codec::I64Serializer, CodecRegistry};
///
/// let mut registry = CodecRegistry::new();
/// assert!(registry.serializer::<i64>().is_none());
/// registry.register_serializer::<i64, _>(I64Serializer);
/// assert!(registry.serializer::<i64>().is_some());
/// assert!(CodecRegistry::with_defaults().key_deserializer::<u16>().is_some());
/// ```
#[derive(Default)]
pub struct CodecRegistry {
    serializers: Entries,
    deserializers: Entries,
    key_serializers: Entries,
    key_deserializers: Entries,
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("serializers", &self.serializers.len())
            .field("deserializers", &self.deserializers.len())
            .field("key_serializers", &self.key_serializers.len())
            .field("key_deserializers", &self.key_deserializers.len())
            .finish()
    }
}

static DEFAULTS: LazyLock<Arc<CodecRegistry>> = LazyLock::new(|| Arc::new(CodecRegistry::with_defaults()));

macro_rules! register_value_codecs {
    ($registry:ident, $($ty:ty => $ser:expr, $de:expr);+ $(;)?) => {
        $(
            $registry.register_serializer::<$ty, _>($ser);
            $registry.register_deserializer::<$ty, _>($de);
        )+
    };
}

macro_rules! register_key_codecs {
    ($registry:ident, $codec:expr => $($ty:ty),+) => {
        $(
            $registry.register_key_serializer::<$ty, _>($codec);
            $registry.register_key_deserializer::<$ty, _>($codec);
        )+
    };
}

impl CodecRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in codecs for strings, booleans,
    /// characters, numbers, [`RawValue`] and [`Value`], and key codecs for
    /// strings, booleans, characters and numbers.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_serializer::<str, _>(StringSerializer);
        register_value_codecs!(registry,
            String => StringSerializer, StringDeserializer;
            bool => BoolSerializer, BoolDeserializer;
            char => CharSerializer, CharDeserializer;
            i8 => I8Serializer, I8Deserializer;
            i16 => I16Serializer, I16Deserializer;
            i32 => I32Serializer, I32Deserializer;
            i64 => I64Serializer, I64Deserializer;
            f32 => F32Serializer, F32Deserializer;
            f64 => F64Serializer, F64Deserializer;
            JsonNumber => NumberSerializer, NumberDeserializer;
            RawValue => RawValueSerializer, RawValueDeserializer;
            Value => ValueSerializer, ValueDeserializer;
        );
        register_key_codecs!(registry, StringKeyCodec => String);
        register_key_codecs!(registry, BoolKeyCodec => bool);
        register_key_codecs!(registry, CharKeyCodec => char);
        register_key_codecs!(registry, IntegerKeyCodec => i8, i16, i32, i64, u8, u16, u32, u64);
        register_key_codecs!(registry, FloatKeyCodec => f32, f64);
        registry
    }

    /// The process-wide registry of built-in codecs.
    #[must_use]
    pub fn shared_defaults() -> Arc<Self> {
        Arc::clone(&DEFAULTS)
    }

    pub fn register_serializer<T, S>(&mut self, serializer: S) -> &mut Self
    where
        T: ?Sized + 'static,
        S: Serializer<T> + Send + Sync + 'static,
    {
        let shared: SharedSerializer<T> = Arc::new(serializer);
        self.serializers.insert(TypeId::of::<T>(), Box::new(shared));
        self
    }

    pub fn register_deserializer<T, D>(&mut self, deserializer: D) -> &mut Self
    where
        T: 'static,
        D: Deserializer<T> + Send + Sync + 'static,
    {
        let shared: SharedDeserializer<T> = Arc::new(deserializer);
        self.deserializers.insert(TypeId::of::<T>(), Box::new(shared));
        self
    }

    pub fn register_key_serializer<T, S>(&mut self, serializer: S) -> &mut Self
    where
        T: ?Sized + 'static,
        S: KeySerializer<T> + Send + Sync + 'static,
    {
        let shared: SharedKeySerializer<T> = Arc::new(serializer);
        self.key_serializers.insert(TypeId::of::<T>(), Box::new(shared));
        self
    }

    pub fn register_key_deserializer<T, D>(&mut self, deserializer: D) -> &mut Self
    where
        T: 'static,
        D: KeyDeserializer<T> + Send + Sync + 'static,
    {
        let shared: SharedKeyDeserializer<T> = Arc::new(deserializer);
        self.key_deserializers.insert(TypeId::of::<T>(), Box::new(shared));
        self
    }

    #[must_use]
    pub fn serializer<T: ?Sized + 'static>(&self) -> Option<SharedSerializer<T>> {
        lookup::<T, _>(&self.serializers)
    }

    #[must_use]
    pub fn deserializer<T: 'static>(&self) -> Option<SharedDeserializer<T>> {
        lookup::<T, _>(&self.deserializers)
    }

    #[must_use]
    pub fn key_serializer<T: ?Sized + 'static>(&self) -> Option<SharedKeySerializer<T>> {
        lookup::<T, _>(&self.key_serializers)
    }

    #[must_use]
    pub fn key_deserializer<T: 'static>(&self) -> Option<SharedKeyDeserializer<T>> {
        lookup::<T, _>(&self.key_deserializers)
    }
}

fn lookup<T: ?Sized + 'static, C: Clone + 'static>(entries: &Entries) -> Option<C> {
    entries
        .get(&TypeId::of::<T>())
        .and_then(|entry| entry.downcast_ref::<C>())
        .cloned()
}

// -----------------------------------------------------------------------------
// Registry-backed codec
// -----------------------------------------------------------------------------

/// A codec that delegates to whatever the context's registry holds for the
/// type at hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registered;

impl<T: ?Sized + 'static> Serializer<T> for Registered {
    fn serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        let serializer = ctx
            .registry()
            .serializer::<T>()
            .ok_or(WriteError::MissingSerializer(type_name::<T>()))?;
        Serializer::serialize(&*serializer, writer, value, ctx, params)
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        let serializer = ctx
            .registry()
            .serializer::<T>()
            .ok_or(WriteError::MissingSerializer(type_name::<T>()))?;
        Serializer::do_serialize(&*serializer, writer, value, ctx, params)
    }
}

impl<T: 'static> Deserializer<T> for Registered {
    fn deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<T, Error> {
        let deserializer = registered_deserializer::<T>(reader, ctx)?;
        Deserializer::deserialize(&*deserializer, reader, ctx, params)
    }

    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<T, Error> {
        let deserializer = registered_deserializer::<T>(reader, ctx)?;
        Deserializer::do_deserialize(&*deserializer, reader, ctx, params)
    }
}

fn registered_deserializer<T: 'static>(
    reader: &JsonReader<'_>,
    ctx: &DeserializationContext,
) -> Result<SharedDeserializer<T>, Error> {
    ctx.registry()
        .deserializer::<T>()
        .ok_or_else(|| reader.error(ReadErrorKind::MissingDeserializer(type_name::<T>())).into())
}

impl<T: ?Sized + 'static> KeySerializer<T> for Registered {
    fn serialize(&self, key: &T, ctx: &SerializationContext) -> Result<String, Error> {
        let serializer = ctx
            .registry()
            .key_serializer::<T>()
            .ok_or(WriteError::MissingKeySerializer(type_name::<T>()))?;
        KeySerializer::serialize(&*serializer, key, ctx)
    }
}

impl<T: 'static> KeyDeserializer<T> for Registered {
    fn deserialize(&self, key: &str, reader: &JsonReader<'_>, ctx: &DeserializationContext) -> Result<T, Error> {
        let deserializer = ctx
            .registry()
            .key_deserializer::<T>()
            .ok_or_else(|| reader.error(ReadErrorKind::MissingDeserializer(type_name::<T>())))?;
        KeyDeserializer::deserialize(&*deserializer, key, reader, ctx)
    }
}
