use super::arg;
use crate::coerce::to_int32;
use crate::coerce::to_number;
use crate::coerce::to_string;
use crate::context::Context;
use crate::error::VmError;
use crate::value::Value;
use parse_es::char::is_line_terminator;
use parse_es::char::is_whitespace;
use parse_es::num::string_to_number;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlobalFn {
  IsNaN,
  IsFinite,
  ParseInt,
  ParseFloat,
}

impl GlobalFn {
  pub const ALL: [GlobalFn; 4] = [
    GlobalFn::IsNaN,
    GlobalFn::IsFinite,
    GlobalFn::ParseInt,
    GlobalFn::ParseFloat,
  ];

  pub fn name(self) -> &'static str {
    match self {
      GlobalFn::IsNaN => "isNaN",
      GlobalFn::IsFinite => "isFinite",
      GlobalFn::ParseInt => "parseInt",
      GlobalFn::ParseFloat => "parseFloat",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      GlobalFn::ParseInt => 2,
      _ => 1,
    }
  }

  pub(super) fn call(self, cx: &Context, args: &[Value]) -> Result<Value, VmError> {
    Ok(match self {
      GlobalFn::IsNaN => Value::Bool(to_number(cx, &arg(args, 0))?.is_nan()),
      GlobalFn::IsFinite => Value::Bool(to_number(cx, &arg(args, 0))?.is_finite()),
      GlobalFn::ParseInt => {
        let s = to_string(cx, &arg(args, 0))?;
        let radix = to_int32(to_number(cx, &arg(args, 1))?);
        Value::Number(parse_int(&s, radix))
      }
      GlobalFn::ParseFloat => Value::Number(parse_float(&to_string(cx, &arg(args, 0))?)),
    })
  }
}

fn trim_start(s: &str) -> &str {
  s.trim_start_matches(|c| is_whitespace(c) || is_line_terminator(c))
}

/// `parseInt`. Without a radix, `0x` selects hexadecimal and a leading `0` selects octal.
pub(crate) fn parse_int(s: &str, radix: i32) -> f64 {
  let s = trim_start(s);
  let (negative, s) = match s.as_bytes().first() {
    Some(b'-') => (true, &s[1..]),
    Some(b'+') => (false, &s[1..]),
    _ => (false, s),
  };
  let has_hex_prefix = s.starts_with("0x") || s.starts_with("0X");
  let (radix, s) = match radix {
    0 if has_hex_prefix => (16, &s[2..]),
    0 if s.len() > 1 && s.starts_with('0') => (8, s),
    0 => (10, s),
    16 if has_hex_prefix => (16, &s[2..]),
    r if (2..=36).contains(&r) => (r as u32, s),
    _ => return f64::NAN,
  };
  let n = string_to_number(s, radix);
  if negative {
    -n
  } else {
    n
  }
}

/// `parseFloat`: the longest prefix that is a decimal literal or `Infinity`.
pub(crate) fn parse_float(s: &str) -> f64 {
  let s = trim_start(s);
  let bytes = s.as_bytes();
  let mut i = 0;
  if matches!(bytes.first(), Some(b'+' | b'-')) {
    i += 1;
  };
  if s[i..].starts_with("Infinity") {
    return if bytes.first() == Some(&b'-') {
      f64::NEG_INFINITY
    } else {
      f64::INFINITY
    };
  };
  let digits = |mut j: usize| {
    while j < bytes.len() && bytes[j].is_ascii_digit() {
      j += 1;
    }
    j
  };
  let int_end = digits(i);
  let mut end = int_end;
  let mut mantissa_digits = int_end - i;
  if end < bytes.len() && bytes[end] == b'.' {
    let frac_end = digits(end + 1);
    mantissa_digits += frac_end - (end + 1);
    end = frac_end;
  };
  if mantissa_digits == 0 {
    return f64::NAN;
  };
  if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
    let mut j = end + 1;
    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
      j += 1;
    };
    let exp_end = digits(j);
    if exp_end > j {
      end = exp_end;
    };
  };
  s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
  use super::parse_float;
  use super::parse_int;

  #[test]
  fn test_parse_int_radix_detection() {
    assert_eq!(parse_int("  42px", 0), 42.0);
    assert_eq!(parse_int("0x1F", 0), 31.0);
    assert_eq!(parse_int("010", 0), 8.0);
    assert_eq!(parse_int("-ff", 16), -255.0);
    assert_eq!(parse_int("0", 0), 0.0);
    assert!(parse_int("z", 10).is_nan());
    assert!(parse_int("1", 37).is_nan());
  }

  #[test]
  fn test_parse_float_prefix() {
    assert_eq!(parse_float("3.25abc"), 3.25);
    assert_eq!(parse_float(" -.5"), -0.5);
    assert_eq!(parse_float("1e3x"), 1000.0);
    assert_eq!(parse_float("2e"), 2.0);
    assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
    assert!(parse_float(".").is_nan());
    assert!(parse_float("abc").is_nan());
  }
}
