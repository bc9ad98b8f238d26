//! Type conversions.
//!
//! Conversions of objects call back into script (`valueOf`, `toString`), so every conversion that can see an object takes the Context and can fail.

use crate::builtins::new_wrapper;
use crate::context::Context;
use crate::error::VmError;
use crate::function::call_function;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::property::Hint;
use crate::property::PropertyKey;
use crate::value::Value;
use parse_es::char::is_line_terminator;
use parse_es::char::is_whitespace;
use parse_es::num::number_to_string;
use std::sync::Arc;

pub fn to_boolean(cx: &Context, value: &Value) -> Result<bool, VmError> {
  Ok(match value {
    Value::Undefined | Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => !(n.is_nan() || *n == 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Object(o) => {
      if cx.language_version().is_ecma() {
        return Ok(true);
      };
      // Versions before 1.3 convert objects through their default value.
      match default_value(cx, o, Some(Hint::Boolean))? {
        Value::Object(_) => return Err(VmError::type_error("Cannot convert object to boolean")),
        prim => to_boolean(cx, &prim)?,
      }
    }
  })
}

/// ToNumber for a value that is known not to be an object.
pub fn primitive_to_number(value: &Value) -> f64 {
  match value {
    Value::Undefined => f64::NAN,
    Value::Null => 0.0,
    Value::Bool(b) => {
      if *b {
        1.0
      } else {
        0.0
      }
    }
    Value::Number(n) => *n,
    Value::String(s) => string_to_number(s),
    Value::Object(_) => f64::NAN,
  }
}

pub fn to_number(cx: &Context, value: &Value) -> Result<f64, VmError> {
  match value {
    Value::Object(o) => match default_value(cx, o, Some(Hint::Number))? {
      Value::Object(_) => Err(VmError::type_error("Cannot convert object to primitive value")),
      prim => Ok(primitive_to_number(&prim)),
    },
    other => Ok(primitive_to_number(other)),
  }
}

/// ToString for a value that is known not to be an object.
pub fn primitive_to_string(value: &Value) -> Arc<str> {
  match value {
    Value::Undefined => Arc::from("undefined"),
    Value::Null => Arc::from("null"),
    Value::Bool(true) => Arc::from("true"),
    Value::Bool(false) => Arc::from("false"),
    Value::Number(n) => Arc::from(number_to_string(*n)),
    Value::String(s) => s.clone(),
    Value::Object(o) => Arc::from(format!("[object {}]", o.class().name())),
  }
}

pub fn to_string(cx: &Context, value: &Value) -> Result<Arc<str>, VmError> {
  match value {
    Value::Object(o) => match default_value(cx, o, Some(Hint::String))? {
      Value::Object(_) => Err(VmError::type_error("Cannot convert object to primitive value")),
      prim => Ok(primitive_to_string(&prim)),
    },
    other => Ok(primitive_to_string(other)),
  }
}

/// ToPrimitive: objects are replaced by their default value, everything else is returned as is.
pub fn to_primitive(cx: &Context, value: &Value, hint: Option<Hint>) -> Result<Value, VmError> {
  match value {
    Value::Object(o) => match default_value(cx, o, hint)? {
      Value::Object(_) => Err(VmError::type_error("Cannot convert object to primitive value")),
      prim => Ok(prim),
    },
    other => Ok(other.clone()),
  }
}

/// The default-value protocol. A string hint tries `toString` before `valueOf`; any other hint tries `valueOf` first. Dates default to the string hint.
pub fn default_value(cx: &Context, obj: &ObjectRef, hint: Option<Hint>) -> Result<Value, VmError> {
  let hint = match hint {
    None if obj.class() == ClassTag::Date => Hint::String,
    None => Hint::Number,
    Some(h) => h,
  };
  let order = if hint == Hint::String {
    ["toString", "valueOf"]
  } else {
    ["valueOf", "toString"]
  };
  for name in order {
    let Some(Value::Object(method)) = obj.get_property(cx, &PropertyKey::from_name(name))? else {
      continue;
    };
    if !method.is_callable() {
      continue;
    };
    let result = call_function(cx, &method, Value::Object(obj.clone()), &[])?;
    if !matches!(result, Value::Object(_)) {
      return Ok(result);
    };
  }
  Err(VmError::type_error(format!(
    "Cannot find default value for object of class {}.",
    obj.class().name()
  )))
}

/// Wraps primitives in their wrapper objects, with prototypes from the top-level scope of `scope`.
pub fn to_object(scope: &ObjectRef, value: &Value) -> Result<ObjectRef, VmError> {
  match value {
    Value::Object(o) => Ok(o.clone()),
    Value::Undefined => Err(VmError::type_error("Cannot convert undefined to an object")),
    Value::Null => Err(VmError::type_error("Cannot convert null to an object")),
    prim => new_wrapper(scope, prim.clone()),
  }
}

/// Truncates towards zero. NaN becomes 0; infinities are kept.
pub fn to_integer(n: f64) -> f64 {
  if n.is_nan() {
    return 0.0;
  };
  n.trunc()
}

// The value modulo 2^bits, as a non-negative integer. NaN and the infinities become 0.
fn to_modular(n: f64, bits: i32) -> f64 {
  if !n.is_finite() || n == 0.0 {
    return 0.0;
  };
  n.trunc().rem_euclid(2f64.powi(bits))
}

pub fn to_int32(n: f64) -> i32 {
  to_modular(n, 32) as u32 as i32
}

pub fn to_uint32(n: f64) -> u32 {
  to_modular(n, 32) as u32
}

pub fn to_uint16(n: f64) -> u16 {
  to_modular(n, 16) as u16
}

fn is_trimmed(c: char) -> bool {
  is_whitespace(c) || is_line_terminator(c)
}

/// ToNumber applied to a string.
pub fn string_to_number(raw: &str) -> f64 {
  let s = raw.trim_matches(is_trimmed);
  if s.is_empty() {
    return 0.0;
  };
  match s {
    "Infinity" | "+Infinity" => return f64::INFINITY,
    "-Infinity" => return f64::NEG_INFINITY,
    _ => {}
  };
  let (negative, unsigned) = match s.as_bytes()[0] {
    b'-' => (true, &s[1..]),
    b'+' => (false, &s[1..]),
    _ => (false, s),
  };
  if let Some(hex) = unsigned
    .strip_prefix("0x")
    .or_else(|| unsigned.strip_prefix("0X"))
  {
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
      return f64::NAN;
    };
    let v = parse_es::num::string_to_number(hex, 16);
    return if negative { -v } else { v };
  };
  // Rust's float parser also accepts spellings like "inf" and "NaN".
  let decimal = s
    .bytes()
    .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
  if !decimal || !s.bytes().any(|b| b.is_ascii_digit()) {
    return f64::NAN;
  };
  s.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
  use super::string_to_number;
  use super::to_int32;
  use super::to_integer;
  use super::to_uint16;
  use super::to_uint32;

  #[test]
  fn test_string_to_number() {
    assert_eq!(string_to_number(""), 0.0);
    assert_eq!(string_to_number(" \t\n "), 0.0);
    assert_eq!(string_to_number(" 42 "), 42.0);
    assert_eq!(string_to_number("0x1F"), 31.0);
    assert_eq!(string_to_number("-0x10"), -16.0);
    assert_eq!(string_to_number("1e3"), 1000.0);
    assert_eq!(string_to_number(".5"), 0.5);
    assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    assert!(string_to_number("inf").is_nan());
    assert!(string_to_number("NaN").is_nan());
    assert!(string_to_number("0xg").is_nan());
    assert!(string_to_number("12px").is_nan());
    assert!(string_to_number("+").is_nan());
  }

  #[test]
  fn test_integer_conversions() {
    assert_eq!(to_int32(f64::NAN), 0);
    assert_eq!(to_int32(f64::INFINITY), 0);
    assert_eq!(to_int32(2147483648.0), -2147483648);
    assert_eq!(to_int32(-1.5), -1);
    assert_eq!(to_int32(4294967297.0), 1);
    assert_eq!(to_uint32(-1.0), 4294967295);
    assert_eq!(to_uint32(3.9), 3);
    assert_eq!(to_uint16(65537.0), 1);
    assert_eq!(to_uint16(-1.0), 65535);
    assert_eq!(to_integer(f64::NAN), 0.0);
    assert_eq!(to_integer(-3.7), -3.0);
    assert_eq!(to_integer(f64::NEG_INFINITY), f64::NEG_INFINITY);
  }
}
