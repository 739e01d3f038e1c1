use quickcheck::{Arbitrary, Gen};

use crate::{BigInteger, JsonNumber, Map, Value};

/// Any finite JSON number, in the variant the reader produces for it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExactNumber(pub(crate) JsonNumber);

impl Arbitrary for ExactNumber {
    fn arbitrary(g: &mut Gen) -> Self {
        let number = match usize::arbitrary(g) % 4 {
            0 => JsonNumber::Int(i32::arbitrary(g)),
            1 => JsonNumber::from(i64::arbitrary(g)),
            2 => {
                let mut value = f64::arbitrary(g);
                while !value.is_finite() {
                    value = f64::arbitrary(g);
                }
                JsonNumber::Double(value)
            }
            _ => {
                // A leading 9 followed by at least 19 digits is outside `i64`.
                let sign = if bool::arbitrary(g) { "-" } else { "" };
                let text = format!("{sign}9{:019}", u64::arbitrary(g));
                JsonNumber::BigInteger(BigInteger::parse(&text).unwrap())
            }
        };
        Self(number)
    }
}

impl Arbitrary for Value {
    fn arbitrary(g: &mut Gen) -> Self {
        fn gen_val(g: &mut Gen, depth: usize) -> Value {
            let kinds = if depth == 0 { 4 } else { 6 };
            match usize::arbitrary(g) % kinds {
                0 => Value::Null,
                1 => Value::Boolean(bool::arbitrary(g)),
                2 => Value::Number(ExactNumber::arbitrary(g).0),
                3 => Value::String(String::arbitrary(g)),
                4 => {
                    let len = usize::arbitrary(g) % 4;
                    Value::Array((0..len).map(|_| gen_val(g, depth - 1)).collect())
                }
                _ => {
                    let len = usize::arbitrary(g) % 4;
                    let mut map = Map::new();
                    for _ in 0..len {
                        map.insert(String::arbitrary(g), gen_val(g, depth - 1));
                    }
                    Value::Object(map)
                }
            }
        }

        let depth = usize::arbitrary(g) % 3;
        gen_val(g, depth)
    }
}
