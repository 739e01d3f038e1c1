//! Codecs that write an object once and refer to it by id afterwards.

use alloc::rc::Rc;
use core::{cell::OnceCell, marker::PhantomData};

use crate::{
    context::{DeserializationContext, DeserializerParameters, SerializationContext, SerializerParameters},
    error::Error,
    identity::ObjectId,
    stream::{JsonReader, JsonWriter, Token},
};

use super::{Deserializer, Serializer};

/// An object read through an [`IdentityDeserializer`]. Every occurrence of
/// the same id shares the cell; a reference read before its object holds an
/// empty cell until the object is read.
pub type Shared<T> = Rc<OnceCell<T>>;

fn write_id(writer: &mut JsonWriter, id: &ObjectId) -> Result<(), Error> {
    match id {
        ObjectId::Int(v) => writer.i64_value(*v)?,
        ObjectId::Str(v) => writer.string_value(v)?,
    }
    Ok(())
}

/// Scans the members of the object `text` for the id member.
fn find_id(text: &str, property: &str) -> Result<Option<ObjectId>, Error> {
    let mut members = JsonReader::new(text);
    members.begin_object()?;
    while members.has_next()? {
        if members.next_name()? != property {
            members.skip_value()?;
            continue;
        }
        let id = match members.peek()? {
            Token::Number => ObjectId::Int(members.next_long()?),
            _ => ObjectId::Str(members.next_string()?),
        };
        return Ok(Some(id));
    }
    Ok(None)
}

/// Writes an object in full, with its id as the first member, the first time
/// its id is seen during a call, and as the bare id afterwards.
pub struct IdentitySerializer<T: ?Sized, S> {
    property: &'static str,
    id_of: fn(&T) -> ObjectId,
    inner: S,
}

impl<T: ?Sized, S> IdentitySerializer<T, S> {
    /// `property` names the id member; `id_of` extracts the id; `inner`
    /// writes the object itself.
    pub const fn new(property: &'static str, id_of: fn(&T) -> ObjectId, inner: S) -> Self {
        Self { property, id_of, inner }
    }
}

impl<T: ?Sized, S: Serializer<T>> Serializer<T> for IdentitySerializer<T, S> {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &T,
        ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        let id = (self.id_of)(value);
        if !ctx.mark_written(id.clone()) {
            return write_id(writer, &id);
        }
        let mut buffer = ctx.new_writer();
        buffer.set_indent(None);
        buffer.set_lenient(true);
        self.inner
            .serialize(&mut buffer, value, ctx, &SerializerParameters::default())?;
        let text = buffer.into_output();
        let mut members = JsonReader::new(&text);
        if members.peek()? != Token::BeginObject {
            return Err(ctx.trace_error(format!("Object with id {id} must be written as an object")));
        }
        members.begin_object()?;
        writer.begin_object()?;
        writer.name(self.property)?;
        write_id(writer, &id)?;
        while members.has_next()? {
            let name = members.next_name()?;
            let member = members.next_value()?;
            if name != self.property {
                writer.name(&name)?;
                writer.raw_value(&member)?;
            }
        }
        members.end_object()?;
        writer.end_object()?;
        Ok(())
    }
}

/// Reads either a full object carrying its id, or a bare id, into a
/// [`Shared`] cell. The full object, id member included, is handed to the
/// inner deserializer.
///
/// Ids still unresolved when the call ends fail it with
/// [`ReadErrorKind::UnresolvedObjectId`](crate::ReadErrorKind::UnresolvedObjectId)
/// (see [`DeserializationContext::finish`]).
pub struct IdentityDeserializer<T, D> {
    property: &'static str,
    inner: D,
    _marker: PhantomData<fn() -> T>,
}

impl<T, D> IdentityDeserializer<T, D> {
    pub const fn new(property: &'static str, inner: D) -> Self {
        Self {
            property,
            inner,
            _marker: PhantomData,
        }
    }
}

impl<T: 'static, D: Deserializer<T>> Deserializer<Shared<T>> for IdentityDeserializer<T, D> {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Shared<T>, Error> {
        match reader.peek()? {
            Token::Number => {
                let id = ObjectId::Int(reader.next_long()?);
                ctx.object_reference(reader, id)
            }
            Token::String => {
                let id = ObjectId::Str(reader.next_string()?);
                ctx.object_reference(reader, id)
            }
            Token::BeginObject => {
                let text = reader.next_value()?;
                let Some(id) = find_id(&text, self.property)? else {
                    return Err(ctx.trace_error(reader, format!("Cannot find the '{}' property", self.property)));
                };
                let mut object = ctx.new_reader(&text);
                let value = self.inner.deserialize(&mut object, ctx, params)?;
                ctx.resolve_object_id(reader, id, value)
            }
            _ => Err(reader.type_mismatch("an object or an object id").into()),
        }
    }
}
