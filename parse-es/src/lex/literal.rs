//! Decoding of token payloads. The lexer has already validated the raw text, so these never fail.

use crate::char::hex_value;
use crate::num::string_to_number;

/// A decoded numeric literal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberLiteral {
  pub value: f64,
  /// Set when a literal with a leading zero contained an 8 or 9 and was read as decimal instead of octal.
  pub bad_octal_digit: Option<char>,
}

pub fn decode_number(raw: &str) -> NumberLiteral {
  if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
    return NumberLiteral {
      value: string_to_number(hex, 16),
      bad_octal_digit: None,
    };
  };
  let bytes = raw.as_bytes();
  if bytes.len() > 1 && bytes[0] == b'0' && bytes[1].is_ascii_digit() {
    let int_end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let bad = raw[..int_end].chars().find(|c| matches!(c, '8' | '9'));
    if bad.is_none() {
      return NumberLiteral {
        value: string_to_number(raw, 8),
        bad_octal_digit: None,
      };
    };
    return NumberLiteral {
      value: raw.parse::<f64>().unwrap_or(f64::NAN),
      bad_octal_digit: bad,
    };
  };
  let value = if raw.ends_with('.') {
    raw[..raw.len() - 1].parse::<f64>()
  } else if raw.starts_with('.') {
    format!("0{raw}").parse::<f64>()
  } else {
    raw.parse::<f64>()
  };
  NumberLiteral {
    value: value.unwrap_or(f64::NAN),
    bad_octal_digit: None,
  }
}

fn take_hex(chars: &[char], at: usize, n: usize) -> Option<u32> {
  if at + n > chars.len() {
    return None;
  };
  chars[at..at + n]
    .iter()
    .try_fold(0u32, |acc, c| hex_value(*c).map(|d| acc * 16 + d))
}

/// Decodes a string literal including its surrounding quotes.
///
/// `\xHH` and `\uHHHH` without enough hex digits decode to a plain `x` or `u`. Octal escapes stop at three digits or when the value would exceed 0377.
pub fn decode_string(raw: &str) -> String {
  let chars: Vec<char> = raw.chars().collect();
  let inner = if chars.len() >= 2 {
    &chars[1..chars.len() - 1]
  } else {
    &chars[..0]
  };
  let mut out = String::with_capacity(inner.len());
  let mut i = 0;
  while i < inner.len() {
    let c = inner[i];
    i += 1;
    if c != '\\' || i >= inner.len() {
      out.push(c);
      continue;
    };
    let e = inner[i];
    i += 1;
    match e {
      'b' => out.push('\u{8}'),
      'f' => out.push('\u{c}'),
      'n' => out.push('\n'),
      'r' => out.push('\r'),
      't' => out.push('\t'),
      'v' => out.push('\u{b}'),
      'x' => match take_hex(inner, i, 2) {
        Some(v) => {
          out.push(char::from_u32(v).unwrap_or('\u{FFFD}'));
          i += 2;
        }
        None => out.push('x'),
      },
      'u' => match take_hex(inner, i, 4) {
        Some(v) => {
          // Lone surrogates cannot be represented in a Rust string.
          out.push(char::from_u32(v).unwrap_or('\u{FFFD}'));
          i += 4;
        }
        None => out.push('u'),
      },
      '0'..='7' => {
        let mut value = e as u32 - '0' as u32;
        let mut digits = 1;
        while digits < 3 && i < inner.len() {
          let next = match inner[i].to_digit(8) {
            Some(d) => value * 8 + d,
            None => break,
          };
          if next > 0o377 {
            break;
          };
          value = next;
          i += 1;
          digits += 1;
        }
        out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
      }
      // Line continuation.
      '\n' | '\u{2028}' | '\u{2029}' => {}
      '\r' => {
        if inner.get(i) == Some(&'\n') {
          i += 1;
        };
      }
      other => out.push(other),
    };
  }
  out
}

/// Resolves `\uXXXX` escapes in an identifier.
pub fn decode_identifier(raw: &str) -> String {
  if !raw.contains('\\') {
    return raw.to_string();
  };
  let chars: Vec<char> = raw.chars().collect();
  let mut out = String::with_capacity(raw.len());
  let mut i = 0;
  while i < chars.len() {
    if chars[i] == '\\' {
      if let Some(v) = take_hex(&chars, i + 2, 4) {
        out.push(char::from_u32(v).unwrap_or('\u{FFFD}'));
        i += 6;
        continue;
      };
    };
    out.push(chars[i]);
    i += 1;
  }
  out
}

/// Splits a regular expression literal into its pattern and flags.
pub fn decode_regex(raw: &str) -> (String, String) {
  match raw.rfind('/') {
    Some(end) if end > 0 => (raw[1..end].to_string(), raw[end + 1..].to_string()),
    _ => (raw.to_string(), String::new()),
  }
}

#[cfg(test)]
mod tests {
  use super::decode_identifier;
  use super::decode_number;
  use super::decode_regex;
  use super::decode_string;

  #[test]
  fn test_decode_number_forms() {
    assert_eq!(decode_number("0x1F").value, 31.0);
    assert_eq!(decode_number("010").value, 8.0);
    assert_eq!(decode_number("1e2").value, 100.0);
    assert_eq!(decode_number(".5").value, 0.5);
    assert_eq!(decode_number("5.").value, 5.0);
    let downgraded = decode_number("019");
    assert_eq!(downgraded.value, 19.0);
    assert_eq!(downgraded.bad_octal_digit, Some('9'));
  }

  #[test]
  fn test_decode_string_escapes() {
    assert_eq!(decode_string(r#""a\nb""#), "a\nb");
    assert_eq!(decode_string(r#"'\x41B'"#), "AB");
    assert_eq!(decode_string(r#"'\xZ'"#), "xZ");
    assert_eq!(decode_string(r#"'\u12'"#), "u12");
    assert_eq!(decode_string(r#"'\101\0'"#), "A\0");
    assert_eq!(decode_string(r#"'\400'"#), " 0");
    assert_eq!(decode_string(r#"'\q'"#), "q");
  }

  #[test]
  fn test_decode_identifier_and_regex() {
    assert_eq!(decode_identifier("a\\u0062c"), "abc");
    assert_eq!(decode_regex("/ab+c/gi"), ("ab+c".to_string(), "gi".to_string()));
  }
}
