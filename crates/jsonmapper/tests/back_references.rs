#![expect(missing_docs)]

use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use jsonmapper::{
    BackReference, DeserializationContext, DeserializerParameters, Error, JsonReader, JsonWriter, ObjectMapper,
    SerializationContext, SerializerParameters,
    codec::{
        CollectionDeserializer, CollectionSerializer, Deserializer, MapDeserializer, MapSerializer,
        OptionDeserializer, OptionSerializer, Serializer, StringDeserializer, StringKeyCodec, StringSerializer,
        read_object,
    },
};

#[derive(Default)]
struct Parent {
    name: String,
    children: Vec<Child>,
    eldest: Option<Child>,
    by_nickname: BTreeMap<String, Child>,
}

struct Child {
    name: String,
    parent: Option<Weak<RefCell<Parent>>>,
}

impl Child {
    fn parent_name(&self) -> Option<String> {
        let parent = self.parent.as_ref()?.upgrade()?;
        let name = parent.borrow().name.clone();
        Some(name)
    }
}

struct ChildSerializer;

impl Serializer<Child> for ChildSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Child,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        writer.begin_object()?;
        writer.name("name")?;
        StringSerializer.serialize(writer, &value.name, ctx, params)?;
        writer.end_object()?;
        Ok(())
    }
}

struct ChildDeserializer;

impl Deserializer<Child> for ChildDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Child, Error> {
        let mut child = Child {
            name: String::new(),
            parent: None,
        };
        read_object(reader, ctx, |name, reader, ctx| {
            match name {
                "name" => child.name = StringDeserializer.deserialize(reader, ctx, params)?,
                _ => ctx.unknown_property(reader, name, params)?,
            }
            Ok(())
        })?;
        Ok(child)
    }

    fn set_back_reference(
        &self,
        reference_name: &str,
        reference: &BackReference,
        value: &mut Child,
        _ctx: &DeserializationContext,
    ) {
        if reference_name != "parent" {
            return;
        }
        if let Ok(parent) = Rc::clone(reference).downcast::<RefCell<Parent>>() {
            value.parent = Some(Rc::downgrade(&parent));
        }
    }
}

struct ParentSerializer;

impl Serializer<Rc<RefCell<Parent>>> for ParentSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Rc<RefCell<Parent>>,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        let parent = value.borrow();
        writer.begin_object()?;
        writer.name("name")?;
        StringSerializer.serialize(writer, &parent.name, ctx, params)?;
        writer.name("children")?;
        CollectionSerializer::new(ChildSerializer).serialize(writer, &parent.children, ctx, params)?;
        writer.name("eldest")?;
        OptionSerializer::new(ChildSerializer).serialize(writer, &parent.eldest, ctx, params)?;
        writer.name("byNickname")?;
        MapSerializer::new(StringKeyCodec, ChildSerializer).serialize(writer, &parent.by_nickname, ctx, params)?;
        writer.end_object()?;
        Ok(())
    }
}

struct ParentDeserializer;

impl Deserializer<Rc<RefCell<Parent>>> for ParentDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Rc<RefCell<Parent>>, Error> {
        let children = CollectionDeserializer::new(ChildDeserializer);
        let eldest = OptionDeserializer::new(ChildDeserializer);
        let by_nickname = MapDeserializer::new(StringKeyCodec, ChildDeserializer);

        let mut parent = Parent::default();
        read_object(reader, ctx, |name, reader, ctx| {
            match name {
                "name" => parent.name = StringDeserializer.deserialize(reader, ctx, params)?,
                "children" => parent.children = children.deserialize(reader, ctx, params)?,
                "eldest" => parent.eldest = eldest.deserialize(reader, ctx, params)?,
                "byNickname" => parent.by_nickname = by_nickname.deserialize(reader, ctx, params)?,
                _ => ctx.unknown_property(reader, name, params)?,
            }
            Ok(())
        })?;

        let parent = Rc::new(RefCell::new(parent));
        let reference: BackReference = Rc::clone(&parent) as BackReference;
        {
            let mut managed = parent.borrow_mut();
            children.set_back_reference("parent", &reference, &mut managed.children, ctx);
            eldest.set_back_reference("parent", &reference, &mut managed.eldest, ctx);
            by_nickname.set_back_reference("parent", &reference, &mut managed.by_nickname, ctx);
        }
        Ok(parent)
    }
}

const FAMILY: &str = r#"{"name":"Ann","children":[{"name":"Bo"},{"name":"Cy"}],"eldest":{"name":"Bo"},"byNickname":{"c":{"name":"Cy"}}}"#;

fn mapper() -> ObjectMapper<Rc<RefCell<Parent>>> {
    ObjectMapper::new("parent", ParentSerializer, ParentDeserializer)
}

#[test]
fn children_point_back_to_parent() {
    let parent = mapper().read(FAMILY).unwrap();
    let parent = parent.borrow();
    assert_eq!(parent.children.len(), 2);
    for child in &parent.children {
        assert_eq!(child.parent_name().as_deref(), Some("Ann"));
    }
    let eldest = parent.eldest.as_ref().unwrap();
    assert_eq!(eldest.name, "Bo");
    assert_eq!(eldest.parent_name().as_deref(), Some("Ann"));
    assert_eq!(parent.by_nickname["c"].parent_name().as_deref(), Some("Ann"));
}

#[test]
fn back_reference_is_not_written() {
    let parent = mapper().read(FAMILY).unwrap();
    assert_eq!(mapper().write(&parent).unwrap(), FAMILY);
}

#[test]
fn absent_eldest_stays_absent() {
    let parent = mapper().read(r#"{"name":"Dee","children":[]}"#).unwrap();
    let parent = parent.borrow();
    assert!(parent.children.is_empty());
    assert!(parent.eldest.is_none());
}
