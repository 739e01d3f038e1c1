#![expect(missing_docs)]

use jsonmapper::{
    DeserializationContext, DeserializerParameters, Error, JsonReader, JsonWriter, ObjectMapper, ReadErrorKind,
    SerializationContext, SerializerParameters,
    codec::{
        CollectionDeserializer, CollectionSerializer, Deserializer, F64Deserializer, F64Serializer, Serializer,
        SubtypeDeserializer, SubtypeSerializer, TypeInclusion, read_object,
    },
};
use rstest::rstest;

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Circle { radius: f64 },
    Square { side: f64 },
}

fn type_of(shape: &Shape) -> &'static str {
    match shape {
        Shape::Circle { .. } => "circle",
        Shape::Square { .. } => "square",
    }
}

/// Writes the single dimension of a shape under `member`.
struct DimensionSerializer {
    member: &'static str,
}

impl Serializer<Shape> for DimensionSerializer {
    fn do_serialize(
        &self,
        writer: &mut JsonWriter,
        value: &Shape,
        ctx: &mut SerializationContext,
        params: &SerializerParameters,
    ) -> Result<(), Error> {
        let (Shape::Circle { radius: size } | Shape::Square { side: size }) = value;
        writer.begin_object()?;
        writer.name(self.member)?;
        F64Serializer.serialize(writer, size, ctx, params)?;
        writer.end_object()?;
        Ok(())
    }
}

struct DimensionDeserializer {
    member: &'static str,
    build: fn(f64) -> Shape,
}

impl Deserializer<Shape> for DimensionDeserializer {
    fn do_deserialize(
        &self,
        reader: &mut JsonReader<'_>,
        ctx: &mut DeserializationContext,
        params: &DeserializerParameters,
    ) -> Result<Shape, Error> {
        let mut size = 0.0;
        read_object(reader, ctx, |name, reader, ctx| {
            if name == self.member {
                size = F64Deserializer.deserialize(reader, ctx, params)?;
                Ok(())
            } else {
                ctx.unknown_property(reader, name, params)
            }
        })?;
        Ok((self.build)(size))
    }
}

fn mapper(inclusion: TypeInclusion) -> ObjectMapper<Vec<Shape>> {
    let serializer = SubtypeSerializer::new(inclusion, type_of)
        .with_subtype("circle", DimensionSerializer { member: "radius" })
        .with_subtype("square", DimensionSerializer { member: "side" });
    let deserializer = SubtypeDeserializer::new(inclusion)
        .with_subtype(
            "circle",
            DimensionDeserializer {
                member: "radius",
                build: |radius| Shape::Circle { radius },
            },
        )
        .with_subtype(
            "square",
            DimensionDeserializer {
                member: "side",
                build: |side| Shape::Square { side },
            },
        );
    ObjectMapper::new(
        "shapes",
        CollectionSerializer::new(serializer),
        CollectionDeserializer::new(deserializer),
    )
}

fn shapes() -> Vec<Shape> {
    vec![Shape::Circle { radius: 1.5 }, Shape::Square { side: 2.0 }]
}

#[rstest]
#[case::property(
    TypeInclusion::Property("@type"),
    r#"[{"@type":"circle","radius":1.5},{"@type":"square","side":2.0}]"#
)]
#[case::wrapper_object(TypeInclusion::WrapperObject, r#"[{"circle":{"radius":1.5}},{"square":{"side":2.0}}]"#)]
#[case::wrapper_array(TypeInclusion::WrapperArray, r#"[["circle",{"radius":1.5}],["square",{"side":2.0}]]"#)]
fn subtype_inclusion(#[case] inclusion: TypeInclusion, #[case] json: &str) {
    let mapper = mapper(inclusion);
    assert_eq!(mapper.write(&shapes()).unwrap(), json);
    assert_eq!(mapper.read(json).unwrap(), shapes());
}

#[test]
fn type_property_need_not_come_first() {
    let mapper = mapper(TypeInclusion::Property("@type"));
    let shapes = mapper
        .read(r#"[{"side": 4, "@type": "square"}, {"radius": 0.5, "@type": "circle"}]"#)
        .unwrap();
    assert_eq!(shapes, [Shape::Square { side: 4.0 }, Shape::Circle { radius: 0.5 }]);
}

#[test]
fn unknown_subtype() {
    let err = mapper(TypeInclusion::WrapperArray)
        .read(r#"[["triangle",{"base":1}]]"#)
        .unwrap_err();
    assert_eq!(err.read_kind(), Some(&ReadErrorKind::Custom("Unknown subtype 'triangle'".into())));
}

#[test]
fn missing_type_property_uses_default_subtype() {
    let deserializer = SubtypeDeserializer::new(TypeInclusion::Property("@type"))
        .with_subtype(
            "circle",
            DimensionDeserializer {
                member: "radius",
                build: |radius| Shape::Circle { radius },
            },
        )
        .with_default_subtype("circle");
    let mut ctx = DeserializationContext::default();
    let mut reader = ctx.new_reader(r#"{"radius":3}"#);
    let shape = deserializer
        .deserialize(&mut reader, &mut ctx, &DeserializerParameters::default())
        .unwrap();
    assert_eq!(shape, Shape::Circle { radius: 3.0 });
}
