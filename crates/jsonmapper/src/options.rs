#![allow(clippy::struct_excessive_bools)]

/// Configuration for one serialization call.
///
/// The options are copied into a
/// [`SerializationContext`](crate::SerializationContext) and are read-only
/// from then on.
///
/// # Examples
///
/// ```rust
/// use jsonmapper::{SerializationContext, SerializerOptions};
///
/// let ctx = SerializationContext::new(SerializerOptions {
///     serialize_nulls: true,
///     indent: Some("  "),
///     ..Default::default()
/// });
/// assert!(ctx.serialize_nulls());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SerializerOptions {
    /// Whether the writer accepts top-level scalars and non-finite numbers.
    ///
    /// # Default
    ///
    /// `false`
    pub lenient: bool,

    /// Indentation per nesting level. `None` writes compact output.
    ///
    /// # Default
    ///
    /// `None`
    pub indent: Option<&'static str>,

    /// Whether absent (`None`) values are written as `null`.
    ///
    /// When `false`, an object member whose value is absent is omitted,
    /// name included. Absent array elements are always written as `null`.
    ///
    /// # Default
    ///
    /// `false`
    pub serialize_nulls: bool,

    /// Whether absent map values are written as `null` even when
    /// `serialize_nulls` is off.
    ///
    /// # Default
    ///
    /// `true`
    pub write_null_map_values: bool,

    /// Whether empty arrays and collections are written.
    ///
    /// When `false`, an empty array in an object member drops the member.
    /// Empty arrays elsewhere, empty maps and the root value are always
    /// written.
    ///
    /// # Default
    ///
    /// `true`
    pub write_empty_json_arrays: bool,

    /// Whether `char` arrays are written as arrays of one-character strings
    /// instead of a single string.
    ///
    /// # Default
    ///
    /// `false`
    pub write_char_arrays_as_json_arrays: bool,

    /// Whether collections with exactly one element are written as that
    /// element, without the surrounding array.
    ///
    /// # Default
    ///
    /// `false`
    pub write_single_elem_arrays_unwrapped: bool,

    /// Whether map entries are sorted by their serialized key.
    ///
    /// # Default
    ///
    /// `false`
    pub order_map_entries_by_keys: bool,

    /// Whether [`ObjectMapper`](crate::ObjectMapper) wraps the root value in
    /// an object keyed by the root name.
    ///
    /// # Default
    ///
    /// `false`
    pub wrap_root_value: bool,

    /// Whether `<`, `>`, `&`, `=` and `'` are escaped in strings.
    ///
    /// # Default
    ///
    /// `false`
    pub html_safe: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            lenient: false,
            indent: None,
            serialize_nulls: false,
            write_null_map_values: true,
            write_empty_json_arrays: true,
            write_char_arrays_as_json_arrays: false,
            write_single_elem_arrays_unwrapped: false,
            order_map_entries_by_keys: false,
            wrap_root_value: false,
            html_safe: false,
        }
    }
}

/// Configuration for one deserialization call.
///
/// # Default
///
/// Strict parsing; unknown properties are errors; everything else is off.
#[derive(Debug, Clone, Copy)]
pub struct DeserializerOptions {
    /// Whether the reader accepts the lenient JSON superset (comments,
    /// unquoted strings, top-level scalars, ...).
    ///
    /// # Default
    ///
    /// `false`
    pub lenient: bool,

    /// Whether an object member that no deserializer recognises is an error.
    /// When `false` the member is skipped.
    ///
    /// # Default
    ///
    /// `true`
    pub fail_on_unknown_properties: bool,

    /// Whether [`ObjectMapper`](crate::ObjectMapper) expects the root value
    /// wrapped in an object keyed by the root name.
    ///
    /// # Default
    ///
    /// `false`
    pub unwrap_root_value: bool,

    /// Whether array and collection deserializers accept a single value in
    /// place of an array.
    ///
    /// # Examples
    ///
    /// With this option, `"a"` reads as `["a"]`.
    ///
    /// # Default
    ///
    /// `false`
    pub accept_single_value_as_array: bool,

    /// Whether unknown enum constants read as absent instead of failing.
    ///
    /// # Default
    ///
    /// `false`
    pub read_unknown_enum_values_as_null: bool,
}

impl Default for DeserializerOptions {
    fn default() -> Self {
        Self {
            lenient: false,
            fail_on_unknown_properties: true,
            unwrap_root_value: false,
            accept_single_value_as_array: false,
            read_unknown_enum_values_as_null: false,
        }
    }
}
