//! Per-call state shared by all serializers and deserializers of one
//! operation.

use alloc::{collections::BTreeSet, rc::Rc, sync::Arc};
use core::cell::OnceCell;

use crate::{
    error::{Error, ReadErrorKind},
    identity::{IdError, ObjectId, ObjectIdTable},
    options::{DeserializerOptions, SerializerOptions},
    registry::CodecRegistry,
    stream::{JsonReader, JsonWriter},
};

/// When an object member is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Include {
    /// Always write the member. Absent values follow
    /// [`SerializerOptions::serialize_nulls`].
    #[default]
    Always,
    /// Drop the member when its value is absent.
    NonNull,
    /// Drop the member when its value is absent or empty.
    NonEmpty,
}

/// Settings attached to one property rather than to the whole call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializerParameters {
    pub include: Include,
    /// Set by map serializers for their values, so that absent values obey
    /// [`SerializerOptions::write_null_map_values`].
    pub map_value: bool,
    /// Set by [`ObjectMapper`](crate::ObjectMapper) for the root value, which
    /// is written even when it is an empty array.
    pub root: bool,
}

impl SerializerParameters {
    #[must_use]
    pub fn with_include(include: Include) -> Self {
        Self {
            include,
            ..Self::default()
        }
    }
}

/// Settings attached to one property rather than to the whole call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeserializerParameters {
    /// Skip unknown members of this object even when
    /// [`DeserializerOptions::fail_on_unknown_properties`] is set.
    pub ignore_unknown: bool,
    /// Member names that are always skipped.
    pub ignored_properties: &'static [&'static str],
}

// -----------------------------------------------------------------------------
// Serialization
// -----------------------------------------------------------------------------

/// State of one serialization call.
///
/// Besides the options, the context holds the [`CodecRegistry`] used to
/// resolve codecs at runtime and remembers which object ids were already
/// written in full.
#[derive(Debug)]
pub struct SerializationContext {
    options: SerializerOptions,
    registry: Arc<CodecRegistry>,
    written_ids: BTreeSet<ObjectId>,
}

impl Default for SerializationContext {
    fn default() -> Self {
        Self::new(SerializerOptions::default())
    }
}

impl SerializationContext {
    /// Creates a context backed by [`CodecRegistry::shared_defaults`].
    #[must_use]
    pub fn new(options: SerializerOptions) -> Self {
        Self::with_registry(options, CodecRegistry::shared_defaults())
    }

    #[must_use]
    pub fn with_registry(options: SerializerOptions, registry: Arc<CodecRegistry>) -> Self {
        Self {
            options,
            registry,
            written_ids: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    #[must_use]
    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    #[must_use]
    pub fn is_lenient(&self) -> bool {
        self.options.lenient
    }

    #[must_use]
    pub fn serialize_nulls(&self) -> bool {
        self.options.serialize_nulls
    }

    #[must_use]
    pub fn write_null_map_values(&self) -> bool {
        self.options.write_null_map_values
    }

    #[must_use]
    pub fn write_empty_json_arrays(&self) -> bool {
        self.options.write_empty_json_arrays
    }

    #[must_use]
    pub fn write_char_arrays_as_json_arrays(&self) -> bool {
        self.options.write_char_arrays_as_json_arrays
    }

    #[must_use]
    pub fn write_single_elem_arrays_unwrapped(&self) -> bool {
        self.options.write_single_elem_arrays_unwrapped
    }

    #[must_use]
    pub fn order_map_entries_by_keys(&self) -> bool {
        self.options.order_map_entries_by_keys
    }

    #[must_use]
    pub fn wrap_root_value(&self) -> bool {
        self.options.wrap_root_value
    }

    /// A writer configured from the options of this context.
    #[must_use]
    pub fn new_writer(&self) -> JsonWriter {
        let mut writer = JsonWriter::new();
        writer.set_lenient(self.options.lenient);
        writer.set_indent(self.options.indent);
        writer.set_serialize_nulls(self.options.serialize_nulls);
        writer.set_html_safe(self.options.html_safe);
        writer
    }

    /// Whether an empty array should be left out. Only object members are
    /// left out, and only when `write_empty_json_arrays` is off; the pending
    /// member name is dropped in that case.
    pub fn skip_empty_array(&self, writer: &mut JsonWriter, params: &SerializerParameters) -> bool {
        if self.options.write_empty_json_arrays || params.root || !writer.has_pending_name() {
            return false;
        }
        writer.cancel_name();
        true
    }

    /// Records that the object behind `id` is being written in full.
    /// Returns `false` if it already was.
    pub fn mark_written(&mut self, id: ObjectId) -> bool {
        self.written_ids.insert(id)
    }

    /// Builds a serialization failure and logs it.
    #[must_use]
    pub fn trace_error(&self, message: impl Into<String>) -> Error {
        let message = message.into();
        log::warn!("serialization failed: {message}");
        Error::Write(crate::error::WriteError::Custom(message))
    }
}

// -----------------------------------------------------------------------------
// Deserialization
// -----------------------------------------------------------------------------

/// State of one deserialization call.
#[derive(Debug)]
pub struct DeserializationContext {
    options: DeserializerOptions,
    registry: Arc<CodecRegistry>,
    object_ids: ObjectIdTable,
}

impl Default for DeserializationContext {
    fn default() -> Self {
        Self::new(DeserializerOptions::default())
    }
}

impl DeserializationContext {
    /// Creates a context backed by [`CodecRegistry::shared_defaults`].
    #[must_use]
    pub fn new(options: DeserializerOptions) -> Self {
        Self::with_registry(options, CodecRegistry::shared_defaults())
    }

    #[must_use]
    pub fn with_registry(options: DeserializerOptions, registry: Arc<CodecRegistry>) -> Self {
        Self {
            options,
            registry,
            object_ids: ObjectIdTable::default(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &DeserializerOptions {
        &self.options
    }

    #[must_use]
    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    #[must_use]
    pub fn is_lenient(&self) -> bool {
        self.options.lenient
    }

    #[must_use]
    pub fn fail_on_unknown_properties(&self) -> bool {
        self.options.fail_on_unknown_properties
    }

    #[must_use]
    pub fn unwrap_root_value(&self) -> bool {
        self.options.unwrap_root_value
    }

    #[must_use]
    pub fn accept_single_value_as_array(&self) -> bool {
        self.options.accept_single_value_as_array
    }

    #[must_use]
    pub fn read_unknown_enum_values_as_null(&self) -> bool {
        self.options.read_unknown_enum_values_as_null
    }

    /// A reader over `input` configured from the options of this context.
    #[must_use]
    pub fn new_reader<'a>(&self, input: &'a str) -> JsonReader<'a> {
        JsonReader::with_lenient(input, self.options.lenient)
    }

    /// Builds a deserialization failure located at the reader's position and
    /// logs it.
    #[must_use]
    pub fn trace_error(&self, reader: &JsonReader<'_>, message: impl Into<String>) -> Error {
        let err = reader.error(ReadErrorKind::Custom(message.into()));
        log::warn!("deserialization failed: {err}");
        Error::Read(err)
    }

    /// Handles an object member that no property matched. The member value
    /// is skipped, unless unknown properties are errors for this call.
    pub fn unknown_property(
        &self,
        reader: &mut JsonReader<'_>,
        name: &str,
        params: &DeserializerParameters,
    ) -> Result<(), Error> {
        let ignored = params.ignored_properties.contains(&name);
        if ignored || params.ignore_unknown || !self.options.fail_on_unknown_properties {
            log::trace!("skipping unknown property {name:?}");
            reader.skip_value()?;
            return Ok(());
        }
        Err(self.trace_error(reader, format!("Unknown property '{name}'")))
    }

    /// The shared cell for the object with id `id`, created empty when the
    /// object has not been read yet.
    pub fn object_reference<T: 'static>(
        &mut self,
        reader: &JsonReader<'_>,
        id: ObjectId,
    ) -> Result<Rc<OnceCell<T>>, Error> {
        let shown = id.to_string();
        self.object_ids
            .reference(id)
            .map_err(|e| self.id_error(reader, &shown, &e))
    }

    /// Binds `id` to a freshly read object.
    pub fn resolve_object_id<T: 'static>(
        &mut self,
        reader: &JsonReader<'_>,
        id: ObjectId,
        value: T,
    ) -> Result<Rc<OnceCell<T>>, Error> {
        let shown = id.to_string();
        self.object_ids
            .resolve(id, value)
            .map_err(|e| self.id_error(reader, &shown, &e))
    }

    /// Fails if an object id was referenced but never defined.
    pub fn finish(&self, reader: &JsonReader<'_>) -> Result<(), Error> {
        match self.object_ids.first_unresolved() {
            Some(id) => {
                let err = reader.error(ReadErrorKind::UnresolvedObjectId(id.to_string()));
                log::warn!("deserialization failed: {err}");
                Err(Error::Read(err))
            }
            None => Ok(()),
        }
    }

    fn id_error(&self, reader: &JsonReader<'_>, id: &str, err: &IdError) -> Error {
        match err {
            IdError::TypeClash => {
                self.trace_error(reader, format!("Object id {id} refers to an object of another type"))
            }
            IdError::Duplicate => self.trace_error(reader, format!("Object id {id} is defined twice")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_property_respects_options() {
        let strict = DeserializationContext::default();
        let mut reader = strict.new_reader(r#"{"x": [1, 2]}"#);
        reader.begin_object().unwrap();
        let name = reader.next_name().unwrap();
        let err = strict
            .unknown_property(&mut reader, &name, &DeserializerParameters::default())
            .unwrap_err();
        assert_eq!(
            err.read_kind(),
            Some(&ReadErrorKind::Custom("Unknown property 'x'".into()))
        );

        let params = DeserializerParameters {
            ignore_unknown: true,
            ..Default::default()
        };
        strict.unknown_property(&mut reader, &name, &params).unwrap();
        reader.end_object().unwrap();
    }

    #[test]
    fn writer_follows_options() {
        let ctx = SerializationContext::new(SerializerOptions {
            indent: Some("  "),
            serialize_nulls: true,
            ..Default::default()
        });
        let mut writer = ctx.new_writer();
        writer.begin_object().unwrap();
        writer.name("a").unwrap();
        writer.null_value().unwrap();
        writer.end_object().unwrap();
        assert_eq!(writer.output(), "{\n  \"a\": null\n}");
    }

    #[test]
    fn finish_reports_dangling_ids() {
        let mut ctx = DeserializationContext::default();
        let reader = ctx.new_reader("[]");
        ctx.object_reference::<u8>(&reader, ObjectId::Int(9)).unwrap();
        let err = ctx.finish(&reader).unwrap_err();
        assert_eq!(
            err.read_kind(),
            Some(&ReadErrorKind::UnresolvedObjectId("9".into()))
        );
    }
}
