//! Hand-written bean codecs shared by the integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use jsonmapper::{
    DeserializationContext, DeserializerParameters, Error, Include, JsonReader, JsonWriter, SerializationContext,
    SerializerParameters,
    codec::{
        CollectionDeserializer, CollectionSerializer, Deserializer, EnumDeserializer, EnumSerializer,
        F64Deserializer, F64Serializer, I32Deserializer, I32Serializer, JsonEnum, MapDeserializer, MapSerializer,
        OptionDeserializer, OptionSerializer, Serializer, StringDeserializer, StringKeyCodec, StringSerializer,
        read_object,
    },
};

pub const PERSON_JSON: &str =
    r#"{"name":"Ada","age":36,"roles":["ADMIN","MEMBER"],"address":{"street":"12 Rue Lafayette"},"scores":{"chess":7.5}}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Admin,
    Member,
}

impl JsonEnum for Role {
    fn name(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ADMIN" => Some(Self::Admin),
            "MEMBER" => Some(Self::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    pub street: String,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    pub name: String,
    pub age: i32,
    pub email: Option<String>,
    pub roles: Vec<Role>,
    pub address: Option<Address>,
    pub scores: BTreeMap<String, f64>,
}

pub fn ada() -> Person {
    Person {
        name: "Ada".into(),
        age: 36,
        email: None,
        roles: vec![Role::Admin, Role::Member],
        address: Some(Address {
            street: "12 Rue Lafayette".into(),
            zip: None,
        }),
        scores: BTreeMap::from([("chess".to_owned(), 7.5)]),
    }
}

pub struct AddressSerializer;

impl Serializer<Address> for AddressSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Address,
        ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        let params = SerializerParameters::default();
        writer.begin_object()?;
        writer.name("street")?;
        StringSerializer.serialize(writer, &value.street, ctx, &params)?;
        writer.name("zip")?;
        OptionSerializer::new(StringSerializer).serialize(writer, &value.zip, ctx, &params)?;
        writer.end_object()?;
        Ok(())
    }
}

pub struct AddressDeserializer;

impl Deserializer<Address> for AddressDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Address, Error> {
        let field = DeserializerParameters::default();
        let mut address = Address::default();
        read_object(reader, ctx, |name, reader, ctx| {
            match name {
                "street" => address.street = StringDeserializer.deserialize(reader, ctx, &field)?,
                "zip" => address.zip = OptionDeserializer::new(StringDeserializer).deserialize(reader, ctx, &field)?,
                _ => ctx.unknown_property(reader, name, params)?,
            }
            Ok(())
        })?;
        Ok(address)
    }
}

/// Writes `roles` and `scores` only when they are not empty.
pub struct PersonSerializer;

impl Serializer<Person> for PersonSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Person,
        ctx: &mut SerializationContext,
        _params: &SerializerParameters,
    ) -> Result<(), Error> {
        let params = SerializerParameters::default();
        let non_empty = SerializerParameters::with_include(Include::NonEmpty);
        writer.begin_object()?;
        writer.name("name")?;
        StringSerializer.serialize(writer, &value.name, ctx, &params)?;
        writer.name("age")?;
        I32Serializer.serialize(writer, &value.age, ctx, &params)?;
        writer.name("email")?;
        OptionSerializer::new(StringSerializer).serialize(writer, &value.email, ctx, &params)?;
        writer.name("roles")?;
        CollectionSerializer::new(EnumSerializer).serialize(writer, &value.roles, ctx, &non_empty)?;
        writer.name("address")?;
        OptionSerializer::new(AddressSerializer).serialize(writer, &value.address, ctx, &params)?;
        writer.name("scores")?;
        MapSerializer::new(StringKeyCodec, F64Serializer).serialize(writer, &value.scores, ctx, &non_empty)?;
        writer.end_object()?;
        Ok(())
    }
}

pub struct PersonDeserializer;

impl Deserializer<Person> for PersonDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Person, Error> {
        let field = DeserializerParameters::default();
        let mut name = None;
        let mut person = Person::default();
        read_object(reader, ctx, |member, reader, ctx| {
            match member {
                "name" => name = Some(StringDeserializer.deserialize(reader, ctx, &field)?),
                "age" => person.age = I32Deserializer.deserialize(reader, ctx, &field)?,
                "email" => person.email = OptionDeserializer::new(StringDeserializer).deserialize(reader, ctx, &field)?,
                "roles" => person.roles = CollectionDeserializer::new(EnumDeserializer).deserialize(reader, ctx, &field)?,
                "address" => {
                    person.address = OptionDeserializer::new(AddressDeserializer).deserialize(reader, ctx, &field)?;
                }
                "scores" => {
                    person.scores = MapDeserializer::new(StringKeyCodec, F64Deserializer).deserialize(reader, ctx, &field)?;
                }
                _ => ctx.unknown_property(reader, member, params)?,
            }
            Ok(())
        })?;
        person.name = name.ok_or_else(|| ctx.trace_error(reader, "Missing property 'name'"))?;
        Ok(person)
    }
}
