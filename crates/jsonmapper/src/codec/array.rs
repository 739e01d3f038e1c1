//! Codecs for arrays: slices, primitive arrays, `char` arrays and
//! rectangular 2D arrays.

use core::fmt;

use crate::{
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::Error,
    identity::BackReference,
    stream::{JsonReader, JsonWriter, Token},
};

use super::{
    collection::{read_elements, write_elements},
    Deserializer, Serializer,
};

/// Writes a slice as an array.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArraySerializer<S> {
    inner: S,
}

impl<S> ArraySerializer<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<T, S: Serializer<T>> Serializer<[T]> for ArraySerializer<S> {
    fn is_empty(&self, value: &[T]) -> bool {
        value.is_empty()
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &[T],
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        write_elements(&self.inner, value.iter(), writer, ctx, params)
    }
}

impl<T, S: Serializer<T>> Serializer<Vec<T>> for ArraySerializer<S> {
    fn is_empty(&self, value: &Vec<T>) -> bool {
        value.is_empty()
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Vec<T>,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        write_elements(&self.inner, value.iter(), writer, ctx, params)
    }
}

/// Reads an array into a `Vec`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayDeserializer<D> {
    inner: D,
}

impl<D> ArrayDeserializer<D> {
    pub const fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<T, D: Deserializer<T>> Deserializer<Vec<T>> for ArrayDeserializer<D> {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<Vec<T>, Error> {
        let params = DeserializerParameters::default();
        read_elements(
            |reader, ctx| self.inner.deserialize(reader, ctx, &params),
            reader,
            ctx,
            "an array",
        )
    }

    fn set_back_reference(&self, reference_name: &str, reference: &BackReference, value: &mut Vec<T>, ctx: &DeserializationContext) {
        for element in value {
            self.inner.set_back_reference(reference_name, reference, element, ctx);
        }
    }
}

/// Reads an array of primitives, with `null` elements read as the type's
/// default value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveArrayDeserializer<D> {
    inner: D,
}

impl<D> PrimitiveArrayDeserializer<D> {
    pub const fn new(inner: D) -> Self {
        Self { inner }
    }
}

fn next_or_default<T: Default>(
    inner: &impl Deserializer<T>,
    reader: &mut JsonReader<'_>,
    ctx: &mut DeserializationContext,
    params: &DeserializerParameters,
) -> Result<T, Error> {
    if reader.peek()? == Token::Null {
        reader.next_null()?;
        return Ok(T::default());
    }
    inner.deserialize(reader, ctx, params)
}

impl<T: Default, D: Deserializer<T>> Deserializer<Vec<T>> for PrimitiveArrayDeserializer<D> {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<Vec<T>, Error> {
        let params = DeserializerParameters::default();
        read_elements(
            |reader, ctx| next_or_default(&self.inner, reader, ctx, &params),
            reader,
            ctx,
            "an array",
        )
    }
}

// -----------------------------------------------------------------------------
// char arrays
// -----------------------------------------------------------------------------

/// Writes `char` arrays as a single string, or as an array of one-character
/// strings under `write_char_arrays_as_json_arrays`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharArraySerializer;

impl Serializer<[char]> for CharArraySerializer {
    fn is_empty(&self, value: &[char]) -> bool {
        value.is_empty()
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &[char],
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        if value.is_empty() && ctx.skip_empty_array(writer, params) {
            return Ok(());
        }
        if ctx.write_char_arrays_as_json_arrays() {
            let mut buf = [0u8; 4];
            writer.begin_array()?;
            for c in value {
                writer.string_value(c.encode_utf8(&mut buf))?;
            }
            writer.end_array()?;
        } else {
            writer.string_value(&value.iter().collect::<String>())?;
        }
        Ok(())
    }
}

impl Serializer<Vec<char>> for CharArraySerializer {
    fn is_empty(&self, value: &Vec<char>) -> bool {
        value.is_empty()
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Vec<char>,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        Serializer::<[char]>::do_serialize(self, writer, value, ctx, params)
    }
}

/// Reads a `char` array from a string, or from an array of one-character
/// strings where `null` reads as `'\0'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharArrayDeserializer;

impl Deserializer<Vec<char>> for CharArrayDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<Vec<char>, Error> {
        if reader.peek()? != Token::BeginArray {
            return Ok(reader.next_string()?.chars().collect());
        }
        let params = DeserializerParameters::default();
        read_elements(
            |reader, ctx| next_or_default(&super::CharDeserializer, reader, ctx, &params),
            reader,
            ctx,
            "a char array",
        )
    }
}

// -----------------------------------------------------------------------------
// 2D arrays
// -----------------------------------------------------------------------------

/// A rectangular array stored in row-major order.
///
/// # Examples
///
/// ```
/// use jsonmapper::codec::Array2d;
///
/// let grid = Array2d::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
/// assert_eq!((grid.rows(), grid.columns()), (2, 2));
/// assert_eq!(grid.get(1, 0), Some(&3));
/// assert_eq!(grid.as_slice(), &[1, 2, 3, 4]);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Array2d<T> {
    rows: usize,
    columns: usize,
    data: Vec<T>,
}

/// Rows of a 2D array that do not all have the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaggedRows {
    /// Index of the first row whose length differs from the first row.
    pub row: usize,
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for RaggedRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} of a 2D array has {} elements, expected {}",
            self.row, self.actual, self.expected
        )
    }
}

impl<T> Array2d<T> {
    /// Builds an array from `rows`, which must all have the same length.
    /// No rows give a 0×0 array; empty rows give an n×0 array.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, RaggedRows> {
        let columns = rows.first().map_or(0, Vec::len);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(RaggedRows {
                row,
                expected: columns,
                actual: r.len(),
            });
        }
        let count = rows.len();
        Ok(Self {
            rows: count,
            columns,
            data: rows.into_iter().flatten().collect(),
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.data.get(row * self.columns + column)
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row >= self.rows {
            return None;
        }
        self.data.get(row * self.columns..(row + 1) * self.columns)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.rows).filter_map(|r| self.row(r))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Writes an [`Array2d`] as an array of row arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct Array2dSerializer<S> {
    inner: S,
}

impl<S> Array2dSerializer<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<T, S: Serializer<T>> Serializer<Array2d<T>> for Array2dSerializer<S> {
    fn is_empty(&self, value: &Array2d<T>) -> bool {
        value.rows == 0
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Array2d<T>,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        if value.rows == 0 && ctx.skip_empty_array(writer, params) {
            return Ok(());
        }
        let params = SerializerParameters::default();
        writer.begin_array()?;
        for row in value.iter_rows() {
            writer.begin_array()?;
            for element in row {
                self.inner.serialize(writer, element, ctx, &params)?;
            }
            writer.end_array()?;
        }
        writer.end_array()?;
        Ok(())
    }
}

fn read_rows<T>(
    mut element: impl FnMut(&mut JsonReader<'_>, &mut DeserializationContext) -> Result<T, Error>,
    reader: &mut JsonReader<'_>,
    ctx: &mut DeserializationContext,
) -> Result<Vec<Vec<T>>, Error> {
    let mut rows = Vec::new();
    reader.begin_array()?;
    while reader.has_next()? {
        let mut row = Vec::new();
        reader.begin_array()?;
        while reader.has_next()? {
            row.push(element(reader, ctx)?);
        }
        reader.end_array()?;
        rows.push(row);
    }
    reader.end_array()?;
    Ok(rows)
}

/// Reads an array of equally long arrays into an [`Array2d`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Array2dDeserializer<D> {
    inner: D,
}

impl<D> Array2dDeserializer<D> {
    pub const fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<T, D: Deserializer<T>> Deserializer<Array2d<T>> for Array2dDeserializer<D> {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<Array2d<T>, Error> {
        let params = DeserializerParameters::default();
        let rows = read_rows(|reader, ctx| self.inner.deserialize(reader, ctx, &params), reader, ctx)?;
        Array2d::from_rows(rows).map_err(|ragged| ctx.trace_error(reader, ragged.to_string()))
    }

    fn set_back_reference(&self, reference_name: &str, reference: &BackReference, value: &mut Array2d<T>, ctx: &DeserializationContext) {
        for element in value.as_mut_slice() {
            self.inner.set_back_reference(reference_name, reference, element, ctx);
        }
    }
}

/// Reads a 2D array of primitives. `null` elements, and the missing tail of
/// rows shorter than the first one, read as the type's default value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveArray2dDeserializer<D> {
    inner: D,
}

impl<D> PrimitiveArray2dDeserializer<D> {
    pub const fn new(inner: D) -> Self {
        Self { inner }
    }
}

impl<T: Default, D: Deserializer<T>> Deserializer<Array2d<T>> for PrimitiveArray2dDeserializer<D> {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<Array2d<T>, Error> {
        let params = DeserializerParameters::default();
        let mut rows = read_rows(|reader, ctx| next_or_default(&self.inner, reader, ctx, &params), reader, ctx)?;
        let columns = rows.first().map_or(0, Vec::len);
        for row in &mut rows {
            if row.len() < columns {
                row.resize_with(columns, T::default);
            }
        }
        Array2d::from_rows(rows).map_err(|ragged| ctx.trace_error(reader, ragged.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        codec::{I32Deserializer, I32Serializer},
        error::ReadErrorKind,
        options::{DeserializerOptions, SerializerOptions},
    };

    fn read<T>(input: &str, deserializer: impl Deserializer<T>) -> Result<T, Error> {
        read_with(DeserializerOptions::default(), input, deserializer)
    }

    fn read_with<T>(
        options: DeserializerOptions,
        input: &str,
        deserializer: impl Deserializer<T>,
    ) -> Result<T, Error> {
        let mut ctx = DeserializationContext::new(options);
        let mut reader = ctx.new_reader(input);
        deserializer.deserialize(&mut reader, &mut ctx, &DeserializerParameters::default())
    }

    #[rstest]
    #[case("[]", 0, 0)]
    #[case("[[],[]]", 2, 0)]
    #[case("[[1,2],[3,4]]", 2, 2)]
    #[case("[[1,2,3]]", 1, 3)]
    fn shapes(#[case] input: &str, #[case] rows: usize, #[case] columns: usize) {
        let grid = read(input, Array2dDeserializer::new(I32Deserializer)).unwrap();
        assert_eq!((grid.rows(), grid.columns()), (rows, columns));
    }

    #[test]
    fn row_major_layout() {
        let grid = read("[[1,2],[3,4]]", Array2dDeserializer::new(I32Deserializer)).unwrap();
        assert_eq!(grid.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(grid.row(1), Some(&[3, 4][..]));
    }

    #[test]
    fn ragged_rows() {
        let err = read("[[1,2],[3]]", Array2dDeserializer::new(I32Deserializer)).unwrap_err();
        assert!(err.to_string().contains("row 1 of a 2D array has 1 elements, expected 2"));

        let padded = read("[[1,2],[null]]", PrimitiveArray2dDeserializer::new(I32Deserializer)).unwrap();
        assert_eq!(padded.as_slice(), &[1, 2, 0, 0]);
        assert!(read("[[1],[2,3]]", PrimitiveArray2dDeserializer::new(I32Deserializer)).is_err());
    }

    #[test]
    fn primitive_arrays_default_nulls() {
        let values = read("[1,null,3]", PrimitiveArrayDeserializer::new(I32Deserializer)).unwrap();
        assert_eq!(values, [1, 0, 3]);
        assert!(read("[1,null,3]", ArrayDeserializer::new(I32Deserializer)).is_err());
    }

    #[test]
    fn char_arrays() {
        let lenient = DeserializerOptions {
            lenient: true,
            ..Default::default()
        };
        assert_eq!(read_with(lenient, r#""hey""#, CharArrayDeserializer).unwrap(), ['h', 'e', 'y']);
        assert!(matches!(
            read(r#""hey""#, CharArrayDeserializer).unwrap_err().read_kind(),
            Some(ReadErrorKind::Syntax(_))
        ));
        assert_eq!(read(r#"["h", null, "y"]"#, CharArrayDeserializer).unwrap(), ['h', '\0', 'y']);

        let value = vec!['o', 'k'];
        let write = |options: SerializerOptions| {
            let mut ctx = SerializationContext::new(SerializerOptions {
                lenient: true,
                ..options
            });
            let mut writer = ctx.new_writer();
            CharArraySerializer
                .serialize(&mut writer, &value, &mut ctx, &SerializerParameters::default())
                .unwrap();
            writer.into_output()
        };
        assert_eq!(write(SerializerOptions::default()), r#""ok""#);
        let as_arrays = SerializerOptions {
            write_char_arrays_as_json_arrays: true,
            ..Default::default()
        };
        assert_eq!(write(as_arrays), r#"["o","k"]"#);
    }

    #[test]
    fn writes_2d_arrays() {
        let grid = Array2d::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let mut ctx = SerializationContext::default();
        let mut writer = ctx.new_writer();
        Array2dSerializer::new(I32Serializer)
            .serialize(&mut writer, &grid, &mut ctx, &SerializerParameters::default())
            .unwrap();
        assert_eq!(writer.output(), "[[1,2],[3,4]]");
    }

    #[test]
    fn empty_arrays_are_dropped_only_as_members() {
        let mut ctx = SerializationContext::new(SerializerOptions {
            write_empty_json_arrays: false,
            ..Default::default()
        });
        let params = SerializerParameters::default();
        let empty_grid: Array2d<i32> = Array2d::from_rows(Vec::new()).unwrap();
        let no_chars: Vec<char> = Vec::new();
        let mut writer = ctx.new_writer();
        writer.begin_array().unwrap();
        Array2dSerializer::new(I32Serializer)
            .serialize(&mut writer, &empty_grid, &mut ctx, &params)
            .unwrap();
        writer.begin_object().unwrap();
        writer.name("chars").unwrap();
        CharArraySerializer
            .serialize(&mut writer, &no_chars, &mut ctx, &params)
            .unwrap();
        writer.name("grid").unwrap();
        Array2dSerializer::new(I32Serializer)
            .serialize(&mut writer, &empty_grid, &mut ctx, &params)
            .unwrap();
        writer.end_object().unwrap();
        writer.end_array().unwrap();
        assert_eq!(writer.output(), "[[],{}]");
    }
}
