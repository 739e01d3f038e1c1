//! Writing the codecs of a plain struct by hand and driving them through an
//! [`ObjectMapper`].
//!
//! A `Book` carries a nested `Author`, an optional subtitle, a list of tags
//! and a map of edition years. The serializer writes each member through the
//! matching built-in codec; the deserializer walks the object with
//! [`read_object`] and hands unknown members to the context, which skips or
//! rejects them depending on the options.
//!
//! Run with
//!
//! ```bash
//! cargo run -p jsonmapper --example bean_codec
//! ```

use std::collections::BTreeMap;

use jsonmapper::{
    DeserializationContext, DeserializerOptions, DeserializerParameters, Error, Include, JsonReader, JsonWriter,
    ObjectMapper, SerializationContext, SerializerOptions, SerializerParameters,
    codec::{
        CollectionDeserializer, CollectionSerializer, Deserializer, I32Deserializer, I32Serializer, IntegerKeyCodec,
        MapDeserializer, MapSerializer, OptionDeserializer, OptionSerializer, Serializer, StringDeserializer,
        StringSerializer, read_object,
    },
};

#[derive(Debug, Default, PartialEq)]
struct Author {
    name: String,
    born: i32,
}

#[derive(Debug, Default, PartialEq)]
struct Book {
    title: String,
    subtitle: Option<String>,
    author: Author,
    tags: Vec<String>,
    editions: BTreeMap<i32, String>,
}

struct AuthorCodec;

impl Serializer<Author> for AuthorCodec {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Author,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        writer.begin_object()?;
        writer.name("name")?;
        StringSerializer.serialize(writer, &value.name, ctx, params)?;
        writer.name("born")?;
        I32Serializer.serialize(writer, &value.born, ctx, params)?;
        writer.end_object()?;
        Ok(())
    }
}

impl Deserializer<Author> for AuthorCodec {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Author, Error> {
        let mut author = Author::default();
        read_object(reader, ctx, |name, reader, ctx| {
            match name {
                "name" => author.name = StringDeserializer.deserialize(reader, ctx, params)?,
                "born" => author.born = I32Deserializer.deserialize(reader, ctx, params)?,
                _ => ctx.unknown_property(reader, name, params)?,
            }
            Ok(())
        })?;
        Ok(author)
    }
}

struct BookCodec;

impl Serializer<Book> for BookCodec {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Book,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        let non_empty = SerializerParameters::with_include(Include::NonEmpty);
        writer.begin_object()?;
        writer.name("title")?;
        StringSerializer.serialize(writer, &value.title, ctx, params)?;
        writer.name("subtitle")?;
        OptionSerializer::new(StringSerializer).serialize(writer, &value.subtitle, ctx, params)?;
        writer.name("author")?;
        AuthorCodec.serialize(writer, &value.author, ctx, params)?;
        writer.name("tags")?;
        CollectionSerializer::new(StringSerializer).serialize(writer, &value.tags, ctx, &non_empty)?;
        writer.name("editions")?;
        MapSerializer::new(IntegerKeyCodec, StringSerializer).serialize(writer, &value.editions, ctx, &non_empty)?;
        writer.end_object()?;
        Ok(())
    }
}

impl Deserializer<Book> for BookCodec {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Book, Error> {
        let mut book = Book::default();
        read_object(reader, ctx, |name, reader, ctx| {
            match name {
                "title" => book.title = StringDeserializer.deserialize(reader, ctx, params)?,
                "subtitle" => book.subtitle = OptionDeserializer::new(StringDeserializer).deserialize(reader, ctx, params)?,
                "author" => book.author = AuthorCodec.deserialize(reader, ctx, params)?,
                "tags" => book.tags = CollectionDeserializer::new(StringDeserializer).deserialize(reader, ctx, params)?,
                "editions" => {
                    book.editions =
                        MapDeserializer::new(IntegerKeyCodec, StringDeserializer).deserialize(reader, ctx, params)?;
                }
                _ => ctx.unknown_property(reader, name, params)?,
            }
            Ok(())
        })?;
        Ok(book)
    }
}

fn main() -> Result<(), Error> {
    let mapper = ObjectMapper::new("book", BookCodec, BookCodec);
    let book = Book {
        title: "The Analytical Engine".into(),
        subtitle: None,
        author: Author {
            name: "Ada Lovelace".into(),
            born: 1815,
        },
        tags: vec!["computing".into(), "history".into()],
        editions: BTreeMap::from([(1843, "Taylor".into()), (1961, "Dover".into())]),
    };

    let pretty = SerializerOptions {
        indent: Some("  "),
        wrap_root_value: true,
        ..Default::default()
    };
    let json = mapper.write_with(&book, pretty)?;
    println!("{json}");

    let options = DeserializerOptions {
        unwrap_root_value: true,
        fail_on_unknown_properties: false,
        ..Default::default()
    };
    let read = mapper.read_with(&json, options)?;
    assert_eq!(read, book);

    let with_extra = r#"{"book":{"title":"Notes","isbn":"0-00","author":{"name":"A. A. L.","born":1815}}}"#;
    let notes = mapper.read_with(with_extra, options)?;
    println!("{notes:?}");

    match mapper.read(r#"{"title":"Notes","isbn":"0-00"}"#) {
        Ok(_) => unreachable!("unknown members are rejected by default"),
        Err(err) => println!("rejected: {err}"),
    }
    Ok(())
}
