#![expect(missing_docs)]

mod common;

use common::{PersonSerializer, ada};
use indexmap::IndexMap;
use jsonmapper::{
    DeserializationContext, DeserializerParameters, ObjectMapper, SerializationContext, SerializerOptions,
    SerializerParameters, Value,
    codec::{
        Array2d, Array2dSerializer, CharArraySerializer, CollectionSerializer, Deserializer, I32Serializer,
        MapSerializer, Serializer, StringKeyCodec, StringSerializer, ValueDeserializer, ValueSerializer,
    },
};
use rstest::rstest;

const INDENTED: SerializerOptions = SerializerOptions {
    lenient: false,
    indent: Some("  "),
    serialize_nulls: false,
    write_null_map_values: true,
    write_empty_json_arrays: true,
    write_char_arrays_as_json_arrays: false,
    write_single_elem_arrays_unwrapped: false,
    order_map_entries_by_keys: false,
    wrap_root_value: false,
    html_safe: false,
};

#[test]
fn indented_bean() {
    let mapper = ObjectMapper::new("person", PersonSerializer, common::PersonDeserializer);
    let json = mapper.write_with(&ada(), INDENTED).unwrap();
    insta::assert_snapshot!(json, @r#"
    {
      "name": "Ada",
      "age": 36,
      "roles": [
        "ADMIN",
        "MEMBER"
      ],
      "address": {
        "street": "12 Rue Lafayette"
      },
      "scores": {
        "chess": 7.5
      }
    }
    "#);
}

#[test]
fn indented_value_tree() {
    let mut ctx = DeserializationContext::default();
    let mut reader = ctx.new_reader(r#"{"a":[1,"x",true,null,{"b":2}],"c":{}}"#);
    let value: Value = ValueDeserializer
        .deserialize(&mut reader, &mut ctx, &DeserializerParameters::default())
        .unwrap();

    let mut ctx = SerializationContext::new(INDENTED);
    let mut writer = ctx.new_writer();
    ValueSerializer
        .serialize(&mut writer, &value, &mut ctx, &SerializerParameters::default())
        .unwrap();
    writer.close().unwrap();
    insta::assert_snapshot!(writer.output(), @r#"
    {
      "a": [
        1,
        "x",
        true,
        null,
        {
          "b": 2
        }
      ],
      "c": {}
    }
    "#);
}

#[test]
fn html_safe_strings() {
    let mut ctx = SerializationContext::new(SerializerOptions {
        html_safe: true,
        ..Default::default()
    });
    let mut writer = ctx.new_writer();
    let params = SerializerParameters::default();
    writer.begin_object().unwrap();
    writer.name("<tag>").unwrap();
    StringSerializer
        .serialize(&mut writer, "<a href='x'>&amp;", &mut ctx, &params)
        .unwrap();
    writer.end_object().unwrap();
    insta::assert_snapshot!(
        writer.output(),
        @r#"{"\u003ctag\u003e":"\u003ca href\u003d\u0027x\u0027\u003e\u0026amp;"}"#
    );
}

fn write_members(options: SerializerOptions) -> String {
    let mut ctx = SerializationContext::new(options);
    let mut writer = ctx.new_writer();
    let params = SerializerParameters::default();
    let mut map = IndexMap::new();
    map.insert("b".to_owned(), 2);
    map.insert("a".to_owned(), 1);
    let grid = Array2d::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();

    writer.begin_object().unwrap();
    writer.name("empty").unwrap();
    CollectionSerializer::new(I32Serializer)
        .serialize(&mut writer, &Vec::<i32>::new(), &mut ctx, &params)
        .unwrap();
    writer.name("single").unwrap();
    CollectionSerializer::new(I32Serializer)
        .serialize(&mut writer, &vec![7], &mut ctx, &params)
        .unwrap();
    writer.name("chars").unwrap();
    CharArraySerializer
        .serialize(&mut writer, &vec!['h', 'i'], &mut ctx, &params)
        .unwrap();
    writer.name("grid").unwrap();
    Array2dSerializer::new(I32Serializer)
        .serialize(&mut writer, &grid, &mut ctx, &params)
        .unwrap();
    writer.name("map").unwrap();
    MapSerializer::new(StringKeyCodec, I32Serializer)
        .serialize(&mut writer, &map, &mut ctx, &params)
        .unwrap();
    writer.end_object().unwrap();
    writer.close().unwrap();
    writer.into_output()
}

#[rstest]
#[case::defaults(
    SerializerOptions::default(),
    r#"{"empty":[],"single":[7],"chars":"hi","grid":[[1,2],[3,4]],"map":{"b":2,"a":1}}"#
)]
#[case::reshaped(
    SerializerOptions {
        write_empty_json_arrays: false,
        write_single_elem_arrays_unwrapped: true,
        write_char_arrays_as_json_arrays: true,
        order_map_entries_by_keys: true,
        ..Default::default()
    },
    r#"{"single":7,"chars":["h","i"],"grid":[[1,2],[3,4]],"map":{"a":1,"b":2}}"#
)]
fn container_options(#[case] options: SerializerOptions, #[case] expected: &str) {
    assert_eq!(write_members(options), expected);
}
