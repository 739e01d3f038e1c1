//! Numeric values produced by [`JsonReader::next_number`](crate::JsonReader::next_number).

use core::{fmt, str::FromStr};

/// A JSON number narrowed to the smallest representation that holds it
/// exactly.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNumber {
    Int(i32),
    Long(i64),
    Double(f64),
    /// An integer literal outside the `i64` range.
    BigInteger(BigInteger),
}

impl JsonNumber {
    /// The value as an `f64`, rounding when it is not representable.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => f64::from(*v),
            Self::Long(v) => *v as f64,
            Self::Double(v) => *v,
            Self::BigInteger(v) => v.to_string().parse().unwrap_or(f64::NAN),
        }
    }

    /// The value as an `i64` if it is an integer in range.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(i64::from(*v)),
            Self::Long(v) => Some(*v),
            Self::Double(_) => None,
            Self::BigInteger(v) => v.to_i64(),
        }
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        !matches!(self, Self::Double(_))
    }
}

impl From<i32> for JsonNumber {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

/// Narrows to [`Int`](JsonNumber::Int) when the value fits, as the reader
/// does.
impl From<i64> for JsonNumber {
    fn from(v: i64) -> Self {
        match i32::try_from(v) {
            Ok(small) => Self::Int(small),
            Err(_) => Self::Long(v),
        }
    }
}

impl From<f64> for JsonNumber {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<BigInteger> for JsonNumber {
    fn from(v: BigInteger) -> Self {
        Self::BigInteger(v)
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => f.write_str(&format_double(*v)),
            Self::BigInteger(v) => write!(f, "{v}"),
        }
    }
}

/// Shortest round-trip text of a double. Integral values keep a `.0` so the
/// text reads back as a double rather than an integer.
pub(crate) fn format_double<F: ryu_js::Float>(value: F) -> String {
    let mut text = ryu_js::Buffer::new().format(value).to_owned();
    if text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        text.push_str(".0");
    }
    text
}

/// Decimal integer of arbitrary size.
///
/// The digits are kept normalised: no leading zeros, and zero is never
/// negative.
///
/// ```
/// use jsonmapper::BigInteger;
///
/// let big: BigInteger = "-000123456789012345678901234567890".parse().unwrap();
/// assert_eq!(big.to_string(), "-123456789012345678901234567890");
/// assert_eq!(big.to_i64(), None);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInteger {
    negative: bool,
    digits: String,
}

impl BigInteger {
    /// Parses an optionally signed run of ASCII digits.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, digits) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = digits.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Some(Self {
            negative: negative && digits != "0",
            digits: digits.to_owned(),
        })
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The magnitude, without sign.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.digits
    }

    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.to_string().parse().ok()
    }
}

impl From<i64> for BigInteger {
    fn from(v: i64) -> Self {
        Self {
            negative: v < 0,
            digits: v.unsigned_abs().to_string(),
        }
    }
}

impl FromStr for BigInteger {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(())
    }
}

impl fmt::Display for BigInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.digits)
    }
}

#[cfg(test)]
mod tests {
    use super::{BigInteger, JsonNumber};

    #[test]
    fn big_integer_normalises_zero() {
        assert_eq!(BigInteger::parse("-0000").unwrap().to_string(), "0");
        assert!(!BigInteger::parse("-0").unwrap().is_negative());
    }

    #[test]
    fn big_integer_rejects_non_digits() {
        assert!(BigInteger::parse("").is_none());
        assert!(BigInteger::parse("-").is_none());
        assert!(BigInteger::parse("12.5").is_none());
        assert!(BigInteger::parse("1e10").is_none());
    }

    #[test]
    fn big_integer_downcasts_when_in_range() {
        let min = BigInteger::parse("-9223372036854775808").unwrap();
        assert_eq!(min.to_i64(), Some(i64::MIN));
        let over = BigInteger::parse("9223372036854775808").unwrap();
        assert_eq!(over.to_i64(), None);
    }

    #[test]
    fn doubles_display_in_shortest_form() {
        assert_eq!(JsonNumber::Double(1.0).to_string(), "1.0");
        assert_eq!(JsonNumber::Double(-0.0).to_string(), "0.0");
        assert_eq!(JsonNumber::Double(0.1).to_string(), "0.1");
        assert_eq!(JsonNumber::Double(1e20).to_string(), "100000000000000000000.0");
        assert_eq!(JsonNumber::Double(1e21).to_string(), "1e+21");
        assert_eq!(JsonNumber::Double(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn longs_narrow_to_int_when_they_fit() {
        assert_eq!(JsonNumber::from(5_i64), JsonNumber::Int(5));
        assert_eq!(JsonNumber::from(i64::from(i32::MIN)), JsonNumber::Int(i32::MIN));
        assert_eq!(JsonNumber::from(3_000_000_000_i64), JsonNumber::Long(3_000_000_000));
    }
}
