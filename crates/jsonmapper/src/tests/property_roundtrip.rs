use quickcheck::QuickCheck;

use crate::{
    codec::{Deserializer, Serializer, ValueDeserializer, ValueSerializer},
    BigInteger, DeserializationContext, DeserializerParameters, JsonNumber, SerializationContext, SerializerOptions,
    SerializerParameters, Value,
};

fn write(value: &Value, options: SerializerOptions) -> String {
    let mut ctx = SerializationContext::new(options);
    let mut writer = ctx.new_writer();
    ValueSerializer
        .serialize(&mut writer, value, &mut ctx, &SerializerParameters::default())
        .unwrap();
    writer.close().unwrap();
    writer.into_output()
}

fn read(text: &str) -> Value {
    let mut ctx = DeserializationContext::default();
    let mut reader = ctx.new_reader(text);
    ValueDeserializer
        .deserialize(&mut reader, &mut ctx, &DeserializerParameters::default())
        .unwrap()
}

/// Compares against `serde_json`'s reading of the same text. Floats are
/// compared with a relative tolerance as the two parsers may round the last
/// bit differently.
fn same_as_serde(ours: &Value, theirs: &serde_json::Value) -> bool {
    match (ours, theirs) {
        (Value::Null, serde_json::Value::Null) => true,
        (Value::Boolean(a), serde_json::Value::Bool(b)) => a == b,
        (Value::String(a), serde_json::Value::String(b)) => a == b,
        (Value::Number(a), serde_json::Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => {
                let (x, y) = (a.as_f64(), b.as_f64().unwrap_or(f64::NAN));
                (x - y).abs() <= f64::EPSILON * x.abs().max(1.0)
            }
        },
        (Value::Array(a), serde_json::Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_as_serde(x, y))
        }
        (Value::Object(a), serde_json::Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|((ka, va), (kb, vb))| ka == kb && same_as_serde(va, vb))
        }
        _ => false,
    }
}

#[test]
fn number_variants_survive_a_roundtrip() {
    let root = Value::Array(vec![
        Value::from(2.0),
        Value::from(-0.5),
        Value::from(1e20),
        Value::from(5_i64),
        Value::from(3_000_000_000_i64),
        Value::Number(JsonNumber::BigInteger(BigInteger::parse("-92233720368547758080").unwrap())),
    ]);
    let text = write(&root, SerializerOptions::default());
    assert_eq!(
        text,
        "[2.0,-0.5,100000000000000000000.0,5,3000000000,-92233720368547758080]"
    );
    assert_eq!(read(&text), root);
}

/// Property: writing a `Value` and reading the text back yields the same
/// `Value`, compact or indented.
#[test]
fn value_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value, indented: bool) -> bool {
        let root = Value::Array(vec![value]);
        let options = SerializerOptions {
            indent: indented.then_some("  "),
            serialize_nulls: true,
            ..Default::default()
        };
        let text = write(&root, options);
        read(&text) == root
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(Value, bool) -> bool);
}

/// Property: the written text is valid JSON to an independent parser and
/// means the same thing.
#[test]
fn serde_json_agrees_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value) -> bool {
        let root = Value::Array(vec![value]);
        let text = write(&root, SerializerOptions::default());
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(theirs) => same_as_serde(&root, &theirs),
            Err(_) => false,
        }
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(Value) -> bool);
}

/// Property: `Display` on `Value` and the streaming writer agree.
#[test]
fn display_matches_writer_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(value: Value) -> bool {
        let root = Value::Array(vec![value]);
        write(&root, SerializerOptions::default()) == root.to_string()
    }

    QuickCheck::new().quickcheck(prop as fn(Value) -> bool);
}
