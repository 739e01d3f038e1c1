#![no_main]
use arbitrary::Arbitrary;
use jsonmapper::{
    DeserializationContext, DeserializerOptions, DeserializerParameters, SerializationContext, SerializerOptions,
    SerializerParameters, Value,
    codec::{Deserializer, Serializer, ValueDeserializer, ValueSerializer},
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    lenient: bool,
    indent: bool,
    text: String,
}

fn read(text: &str, lenient: bool) -> Option<Value> {
    let mut ctx = DeserializationContext::new(DeserializerOptions {
        lenient,
        ..Default::default()
    });
    let mut reader = ctx.new_reader(text);
    ValueDeserializer
        .deserialize(&mut reader, &mut ctx, &DeserializerParameters::default())
        .ok()
}

fn write(value: &Value, indent: bool) -> String {
    let mut ctx = SerializationContext::new(SerializerOptions {
        // Scalars and non-finite numbers are only legal for lenient writers.
        lenient: true,
        indent: indent.then_some("  "),
        ..Default::default()
    });
    let mut writer = ctx.new_writer();
    ValueSerializer
        .serialize(&mut writer, value, &mut ctx, &SerializerParameters::default())
        .expect("a value tree is always writable");
    writer.into_output()
}

fn is_finite(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().is_finite(),
        Value::Array(a) => a.iter().all(is_finite),
        Value::Object(m) => m.values().all(is_finite),
        _ => true,
    }
}

fuzz_target!(|input: Input| {
    let Some(value) = read(&input.text, input.lenient) else {
        return;
    };
    let written = write(&value, input.indent);

    // Whatever was read writes back as valid JSON that reads and writes to
    // the same text.
    if is_finite(&value) {
        serde_json::from_str::<serde_json::Value>(&written).expect("written output must be valid JSON");
        let reread = read(&written, true).expect("written output must read back");
        assert_eq!(write(&reread, input.indent), written);
    }
});
