use alloc::collections::{BTreeSet, LinkedList, VecDeque};
use core::{hash::Hash, marker::PhantomData};
use std::collections::HashSet;

use crate::{
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::Error,
    identity::BackReference,
    stream::{JsonReader, JsonWriter, Token},
};

use super::{Deserializer, Serializer};

/// A container that collection deserializers can build.
pub trait JsonCollection<T>: Sized {
    fn from_elements(elements: Vec<T>) -> Self;

    /// Visits every element mutably. Sets cannot hand out mutable elements
    /// and visit nothing.
    fn for_each_mut(&mut self, f: impl FnMut(&mut T));
}

impl<T> JsonCollection<T> for Vec<T> {
    fn from_elements(elements: Vec<T>) -> Self {
        elements
    }

    fn for_each_mut(&mut self, f: impl FnMut(&mut T)) {
        self.iter_mut().for_each(f);
    }
}

impl<T> JsonCollection<T> for Box<[T]> {
    fn from_elements(elements: Vec<T>) -> Self {
        elements.into_boxed_slice()
    }

    fn for_each_mut(&mut self, f: impl FnMut(&mut T)) {
        self.iter_mut().for_each(f);
    }
}

impl<T> JsonCollection<T> for VecDeque<T> {
    fn from_elements(elements: Vec<T>) -> Self {
        elements.into()
    }

    fn for_each_mut(&mut self, f: impl FnMut(&mut T)) {
        self.iter_mut().for_each(f);
    }
}

impl<T> JsonCollection<T> for LinkedList<T> {
    fn from_elements(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }

    fn for_each_mut(&mut self, f: impl FnMut(&mut T)) {
        self.iter_mut().for_each(f);
    }
}

impl<T: Ord> JsonCollection<T> for BTreeSet<T> {
    fn from_elements(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }

    fn for_each_mut(&mut self, _f: impl FnMut(&mut T)) {}
}

impl<T: Eq + Hash> JsonCollection<T> for HashSet<T> {
    fn from_elements(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }

    fn for_each_mut(&mut self, _f: impl FnMut(&mut T)) {}
}

/// Writes the elements of `iter` as an array, honouring
/// `write_empty_json_arrays` and `write_single_elem_arrays_unwrapped`.
pub(crate) fn write_elements<'a, T, S>(
    inner: &S,
    mut iter: impl Iterator<Item = &'a T>,
    writer: &mut JsonWriter,
    ctx: &mut SerializationContext,
    array_params: &SerializerParameters,
) -> Result<(), Error>
where
    T: ?Sized + 'a,
    S: Serializer<T> + ?Sized,
{
    let params = SerializerParameters::default();
    let Some(first) = iter.next() else {
        if !ctx.skip_empty_array(writer, array_params) {
            writer.begin_array()?;
            writer.end_array()?;
        }
        return Ok(());
    };
    let second = iter.next();
    if second.is_none() && ctx.write_single_elem_arrays_unwrapped() {
        return inner.serialize(writer, first, ctx, &params);
    }
    writer.begin_array()?;
    inner.serialize(writer, first, ctx, &params)?;
    for element in second.into_iter().chain(iter) {
        inner.serialize(writer, element, ctx, &params)?;
    }
    writer.end_array()?;
    Ok(())
}

/// Reads an array through `element`. A single non-array value is read as a
/// one-element array when `accept_single_value_as_array` is set.
pub(crate) fn read_elements<T>(
    mut element: impl FnMut(&mut JsonReader<'_>, &mut DeserializationContext) -> Result<T, Error>,
    reader: &mut JsonReader<'_>,
    ctx: &mut DeserializationContext,
    target: &'static str,
) -> Result<Vec<T>, Error> {
    if reader.peek()? != Token::BeginArray {
        if ctx.accept_single_value_as_array() {
            return Ok(vec![element(reader, ctx)?]);
        }
        return Err(reader.type_mismatch(target).into());
    }
    let mut elements = Vec::new();
    reader.begin_array()?;
    while reader.has_next()? {
        elements.push(element(reader, ctx)?);
    }
    reader.end_array()?;
    Ok(elements)
}

/// Writes any collection whose references iterate over `&T`.
///
/// # Examples
///
/// ```
/// use jsonmapper::{
///     codec::{CollectionSerializer, Serializer, StringSerializer},
///     SerializationContext, SerializerParameters,
/// };
///
/// let mut ctx = SerializationContext::default();
/// let mut writer = ctx.new_writer();
/// let codec = CollectionSerializer::new(StringSerializer);
/// let value = vec!["a".to_string(), "b".to_string()];
/// codec
///     .serialize(&mut writer, &value, &mut ctx, &SerializerParameters::default())
///     .unwrap();
/// assert_eq!(writer.output(), r#"["a","b"]"#);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CollectionSerializer<T: ?Sized, S> {
    inner: S,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized, S> CollectionSerializer<T, S> {
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<T, C, S> Serializer<C> for CollectionSerializer<T, S>
where
    T: ?Sized,
    C: ?Sized,
    S: Serializer<T>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn is_empty(&self, value: &C) -> bool {
        value.into_iter().next().is_none()
    }

    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &C,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        write_elements(&self.inner, value.into_iter(), writer, ctx, params)
    }
}

/// Reads an array into any [`JsonCollection`].
#[derive(Debug, Clone, Copy)]
pub struct CollectionDeserializer<T, D> {
    inner: D,
    _marker: PhantomData<fn() -> T>,
}

impl<T, D> CollectionDeserializer<T, D> {
    pub const fn new(inner: D) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<T, C, D> Deserializer<C> for CollectionDeserializer<T, D>
where
    C: JsonCollection<T>,
    D: Deserializer<T>,
{
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        _params: &DeserializerParameters,
    ) -> Result<C, Error> {
        let params = DeserializerParameters::default();
        let elements = read_elements(
            |reader, ctx| self.inner.deserialize(reader, ctx, &params),
            reader,
            ctx,
            core::any::type_name::<C>(),
        )?;
        Ok(C::from_elements(elements))
    }

    fn set_back_reference(&self, reference_name: &str, reference: &BackReference, value: &mut C, ctx: &DeserializationContext) {
        value.for_each_mut(|element| self.inner.set_back_reference(reference_name, reference, element, ctx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::{I32Deserializer, I32Serializer, OptionSerializer, StringDeserializer},
        options::{DeserializerOptions, SerializerOptions},
    };

    fn write_member<C>(options: SerializerOptions, value: &C, serializer: &impl Serializer<C>) -> String {
        let mut ctx = SerializationContext::new(options);
        let mut writer = ctx.new_writer();
        writer.begin_object().unwrap();
        writer.name("items").unwrap();
        serializer
            .serialize(&mut writer, value, &mut ctx, &SerializerParameters::default())
            .unwrap();
        writer.end_object().unwrap();
        writer.into_output()
    }

    #[test]
    fn empty_and_single_element_collections() {
        let codec = CollectionSerializer::new(I32Serializer);
        let empty: Vec<i32> = Vec::new();
        let one = vec![5];

        assert_eq!(write_member(SerializerOptions::default(), &empty, &codec), r#"{"items":[]}"#);
        let no_empty = SerializerOptions {
            write_empty_json_arrays: false,
            ..Default::default()
        };
        assert_eq!(write_member(no_empty, &empty, &codec), "{}");
        let nested: CollectionSerializer<Vec<i32>, CollectionSerializer<i32, I32Serializer>> =
            CollectionSerializer::new(CollectionSerializer::new(I32Serializer));
        let grid: Vec<Vec<i32>> = vec![vec![], vec![1]];
        assert_eq!(
            write_member(no_empty, &grid, &nested),
            r#"{"items":[[],[1]]}"#
        );

        let unwrapped = SerializerOptions {
            write_single_elem_arrays_unwrapped: true,
            ..Default::default()
        };
        assert_eq!(write_member(unwrapped, &one, &codec), r#"{"items":5}"#);
        assert_eq!(write_member(unwrapped, &vec![5, 6], &codec), r#"{"items":[5,6]}"#);
    }

    #[test]
    fn absent_elements_are_written_as_null() {
        let codec = CollectionSerializer::new(OptionSerializer::new(I32Serializer));
        let value = vec![Some(1), None];
        assert_eq!(
            write_member(SerializerOptions::default(), &value, &codec),
            r#"{"items":[1,null]}"#
        );
    }

    #[test]
    fn reads_into_sets() {
        let mut ctx = DeserializationContext::default();
        let mut reader = ctx.new_reader(r#"["b", "a", "b"]"#);
        let codec = CollectionDeserializer::new(StringDeserializer);
        let set: BTreeSet<String> = codec
            .deserialize(&mut reader, &mut ctx, &DeserializerParameters::default())
            .unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn single_value_as_array() {
        let mut ctx = DeserializationContext::new(DeserializerOptions {
            accept_single_value_as_array: true,
            ..Default::default()
        });
        let mut reader = ctx.new_reader(r#"{"n": 4}"#);
        let codec = CollectionDeserializer::new(I32Deserializer);
        reader.begin_object().unwrap();
        reader.next_name().unwrap();
        let values: VecDeque<i32> = codec
            .deserialize(&mut reader, &mut ctx, &DeserializerParameters::default())
            .unwrap();
        assert_eq!(values, [4]);
    }
}
