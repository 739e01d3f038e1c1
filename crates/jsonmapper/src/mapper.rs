//! Entry point tying a root type to its codecs.

use alloc::sync::Arc;

use crate::{
    codec::{Deserializer, Serializer},
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::Error,
    options::{DeserializerOptions, SerializerOptions},
    registry::{CodecRegistry, SharedDeserializer, SharedSerializer},
    stream::{JsonReader, Token},
};

/// Reads and writes whole documents whose root is a `T`.
///
/// # Examples
///
/// ```
/// use jsonmapper::{
///     codec::{CollectionDeserializer, CollectionSerializer, I32Deserializer, I32Serializer},
///     ObjectMapper, SerializerOptions,
/// };
///
/// let mapper: ObjectMapper<Vec<i32>> = ObjectMapper::new(
///     "numbers",
///     CollectionSerializer::new(I32Serializer),
///     CollectionDeserializer::new(I32Deserializer),
/// );
/// assert_eq!(mapper.read("[1, 2, 3]").unwrap(), [1, 2, 3]);
///
/// let options = SerializerOptions { wrap_root_value: true, ..Default::default() };
/// assert_eq!(mapper.write_with(&vec![4], options).unwrap(), r#"{"numbers":[4]}"#);
/// ```
pub struct ObjectMapper<T> {
    root_name: String,
    serializer: SharedSerializer<T>,
    deserializer: SharedDeserializer<T>,
    registry: Arc<CodecRegistry>,
}

impl<T> Clone for ObjectMapper<T> {
    fn clone(&self) -> Self {
        Self {
            root_name: self.root_name.clone(),
            serializer: Arc::clone(&self.serializer),
            deserializer: Arc::clone(&self.deserializer),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> core::fmt::Debug for ObjectMapper<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectMapper")
            .field("root_name", &self.root_name)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> ObjectMapper<T> {
    /// Creates a mapper from explicit codecs, backed by the built-in
    /// registry.
    pub fn new<S, D>(root_name: impl Into<String>, serializer: S, deserializer: D) -> Self
    where
        S: Serializer<T> + Send + Sync + 'static,
        D: Deserializer<T> + Send + Sync + 'static,
    {
        Self {
            root_name: root_name.into(),
            serializer: Arc::new(serializer),
            deserializer: Arc::new(deserializer),
            registry: CodecRegistry::shared_defaults(),
        }
    }

    /// Creates a mapper from the codecs `registry` holds for `T`, or `None`
    /// when either is missing.
    #[must_use]
    pub fn from_registry(root_name: impl Into<String>, registry: Arc<CodecRegistry>) -> Option<Self> {
        Some(Self {
            root_name: root_name.into(),
            serializer: registry.serializer::<T>()?,
            deserializer: registry.deserializer::<T>()?,
            registry,
        })
    }

    /// Replaces the registry handed to the contexts of each call.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<CodecRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Reads a `T` with the default options.
    pub fn read(&self, input: &str) -> Result<T, Error> {
        self.read_with(input, DeserializerOptions::default())
    }

    /// Reads a `T`. Content after the root value is not inspected.
    pub fn read_with(&self, input: &str, options: DeserializerOptions) -> Result<T, Error> {
        let mut ctx = DeserializationContext::with_registry(options, Arc::clone(&self.registry));
        let mut reader = ctx.new_reader(input);
        let result = self.read_root(&mut reader, &mut ctx);
        reader.close();
        result
    }

    fn read_root(&self, reader: &mut JsonReader<'_>, ctx: &mut DeserializationContext) -> Result<T, Error> {
        let params = DeserializerParameters::default();
        if !ctx.unwrap_root_value() {
            let value = self.deserializer.deserialize(reader, ctx, &params)?;
            ctx.finish(reader)?;
            return Ok(value);
        }

        if reader.peek()? != Token::BeginObject {
            return Err(ctx.trace_error(reader, "Unwrap root value is enabled but the input is not a JSON object"));
        }
        reader.begin_object()?;
        if reader.peek()? == Token::EndObject {
            return Err(ctx.trace_error(reader, "Unwrap root value is enabled but the JSON object is empty"));
        }
        let name = reader.next_name()?;
        if name != self.root_name {
            return Err(ctx.trace_error(
                reader,
                format!(
                    "Unwrap root value is enabled but the name '{name}' does not match the expected root name '{}'",
                    self.root_name
                ),
            ));
        }
        let value = self.deserializer.deserialize(reader, ctx, &params)?;
        reader.end_object()?;
        ctx.finish(reader)?;
        Ok(value)
    }

    /// Writes `value` with the default options.
    pub fn write(&self, value: &T) -> Result<String, Error> {
        self.write_with(value, SerializerOptions::default())
    }

    pub fn write_with(&self, value: &T, options: SerializerOptions) -> Result<String, Error> {
        let mut ctx = SerializationContext::with_registry(options, Arc::clone(&self.registry));
        let mut writer = ctx.new_writer();
        let params = SerializerParameters {
            root: true,
            ..SerializerParameters::default()
        };
        if ctx.wrap_root_value() {
            writer.begin_object()?;
            writer.name(&self.root_name)?;
            self.serializer.serialize(&mut writer, value, &mut ctx, &params)?;
            writer.end_object()?;
        } else {
            self.serializer.serialize(&mut writer, value, &mut ctx, &params)?;
        }
        writer.close()?;
        Ok(writer.into_output())
    }
}
