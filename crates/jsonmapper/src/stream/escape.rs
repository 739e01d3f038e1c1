//! String escaping for the writer and `\u` decoding for the reader.

use core::fmt::Write;

/// Appends `src` to `out` with JSON escapes applied.
///
/// Quotes, backslashes, control characters and the Unicode line separators
/// U+2028/U+2029 are always escaped. With `html_safe`, the characters
/// `<`, `>`, `&`, `=` and `'` are escaped too so the output can be embedded
/// in HTML.
pub(crate) fn write_escaped_str(out: &mut String, src: &str, html_safe: bool) {
    let mut last = 0;
    for (i, c) in src.char_indices() {
        let replacement: Option<&str> = match c {
            '"' => Some("\\\""),
            '\\' => Some("\\\\"),
            '\t' => Some("\\t"),
            '\u{8}' => Some("\\b"),
            '\n' => Some("\\n"),
            '\r' => Some("\\r"),
            '\u{c}' => Some("\\f"),
            '<' | '>' | '&' | '=' | '\'' if html_safe => None,
            '\u{2028}' | '\u{2029}' => None,
            c if (c as u32) < 0x20 => None,
            _ => continue,
        };
        out.push_str(&src[last..i]);
        match replacement {
            Some(escaped) => out.push_str(escaped),
            // Writing into a String cannot fail.
            None => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
        }
        last = i + c.len_utf8();
    }
    out.push_str(&src[last..]);
}

/// Returns the escaped form of `src`, without surrounding quotes.
pub(crate) fn escape_str(src: &str) -> String {
    let mut out = String::with_capacity(src.len() + 2);
    write_escaped_str(&mut out, src, false);
    out
}

/// Decodes exactly four ASCII hex digits into a UTF-16 code unit.
pub(crate) fn decode_hex4(digits: &[u8]) -> Option<u16> {
    if digits.len() != 4 {
        return None;
    }
    digits.iter().try_fold(0u16, |acc, &b| {
        let nibble = char::from(b).to_digit(16)?;
        Some((acc << 4) | u16::try_from(nibble).ok()?)
    })
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

/// Combines a surrogate pair into a scalar value.
pub(crate) fn combine_surrogates(high: u16, low: u16) -> char {
    let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}
