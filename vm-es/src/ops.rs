//! Operator semantics shared by the evaluator and the built-ins.

use crate::coerce::primitive_to_number;
use crate::coerce::to_int32;
use crate::coerce::to_number;
use crate::coerce::to_primitive;
use crate::coerce::to_string;
use crate::coerce::to_uint32;
use crate::context::Context;
use crate::error::VmError;
use crate::property::Hint;
use crate::property::PropertyKey;
use crate::value::Value;
use parse_es::ir::BinaryOp;
use std::cmp::Ordering;
use std::sync::Arc;

/// Abstract equality (`==`).
pub fn eq(cx: &Context, a: &Value, b: &Value) -> Result<bool, VmError> {
  use Value::*;

  let mut a = a.clone();
  let mut b = b.clone();
  loop {
    match (&a, &b) {
      (Undefined | Null, Undefined | Null) => return Ok(true),
      (Bool(x), Bool(y)) => return Ok(x == y),
      (Number(x), Number(y)) => return Ok(x == y),
      (String(x), String(y)) => return Ok(x == y),
      (Object(x), Object(y)) => return Ok(x == y),

      (Number(_), String(_)) => b = Number(primitive_to_number(&b)),
      (String(_), Number(_)) => a = Number(primitive_to_number(&a)),

      (Bool(_), _) => a = Number(primitive_to_number(&a)),
      (_, Bool(_)) => b = Number(primitive_to_number(&b)),

      (Object(_), String(_) | Number(_)) => a = to_primitive(cx, &a, None)?,
      (String(_) | Number(_), Object(_)) => b = to_primitive(cx, &b, None)?,

      _ => return Ok(false),
    };
  }
}

/// Strict equality (`===`). Values of different types are never equal.
pub fn shallow_eq(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
    (Value::Bool(x), Value::Bool(y)) => x == y,
    (Value::Number(x), Value::Number(y)) => x == y,
    (Value::String(x), Value::String(y)) => x == y,
    (Value::Object(x), Value::Object(y)) => x == y,
    _ => false,
  }
}

// Relational comparison of two values. None means at least one side was NaN.
fn compare(cx: &Context, a: &Value, b: &Value) -> Result<Option<Ordering>, VmError> {
  if let (Value::Number(x), Value::Number(y)) = (a, b) {
    return Ok(x.partial_cmp(y));
  };
  let a = to_primitive(cx, a, Some(Hint::Number))?;
  let b = to_primitive(cx, b, Some(Hint::Number))?;
  if let (Value::String(x), Value::String(y)) = (&a, &b) {
    // Strings compare by UTF-16 code units.
    return Ok(Some(x.encode_utf16().cmp(y.encode_utf16())));
  };
  Ok(primitive_to_number(&a).partial_cmp(&primitive_to_number(&b)))
}

/// `a < b`.
pub fn cmp_lt(cx: &Context, a: &Value, b: &Value) -> Result<bool, VmError> {
  Ok(compare(cx, a, b)? == Some(Ordering::Less))
}

/// `a <= b`.
pub fn cmp_le(cx: &Context, a: &Value, b: &Value) -> Result<bool, VmError> {
  Ok(matches!(
    compare(cx, a, b)?,
    Some(Ordering::Less | Ordering::Equal)
  ))
}

/// The `+` operator: string concatenation if either primitive is a string, numeric addition otherwise.
pub fn add(cx: &Context, a: &Value, b: &Value) -> Result<Value, VmError> {
  if let (Value::Number(x), Value::Number(y)) = (a, b) {
    return Ok(Value::Number(x + y));
  };
  let a = to_primitive(cx, a, None)?;
  let b = to_primitive(cx, b, None)?;
  if matches!(a, Value::String(_)) || matches!(b, Value::String(_)) {
    let mut s = String::from(&*to_string(cx, &a)?);
    s.push_str(&to_string(cx, &b)?);
    return Ok(Value::String(Arc::from(s)));
  };
  Ok(Value::Number(
    primitive_to_number(&a) + primitive_to_number(&b),
  ))
}

/// `in`: whether `obj` or its prototype chain has the property named by `key`.
pub fn in_op(cx: &Context, key: &Value, obj: &Value) -> Result<bool, VmError> {
  let Value::Object(obj) = obj else {
    return Err(VmError::type_error("Can't use 'in' on a non-object"));
  };
  let key = to_property_key(cx, key)?;
  Ok(obj.has_property(&key))
}

/// `instanceof`: whether the constructor's `prototype` is on the value's prototype chain.
pub fn instance_of(cx: &Context, value: &Value, ctor: &Value) -> Result<bool, VmError> {
  let Value::Object(ctor) = ctor else {
    return Err(VmError::type_error("Can't use instanceof on a non-object"));
  };
  if !ctor.is_callable() {
    return Err(VmError::type_error("Can't use instanceof on a non-function"));
  };
  let Value::Object(obj) = value else {
    return Ok(false);
  };
  let proto = match ctor.get_property(cx, &PropertyKey::from_name("prototype"))? {
    Some(Value::Object(p)) => p,
    _ => return Err(VmError::type_error("'prototype' property of function is not an object")),
  };
  let mut cur = obj.prototype();
  while let Some(o) = cur {
    if o == proto {
      return Ok(true);
    };
    cur = o.prototype();
  }
  Ok(false)
}

/// Converts a value used as a property name.
pub fn to_property_key(cx: &Context, key: &Value) -> Result<PropertyKey, VmError> {
  Ok(match key {
    Value::Number(n) => PropertyKey::from_number(*n),
    Value::String(s) => PropertyKey::from_name(s),
    other => PropertyKey::from_name(&to_string(cx, other)?),
  })
}

/// Applies a binary operator other than the logical ones and `in`/`instanceof`, which need special handling of their operands.
pub fn binary(cx: &Context, op: BinaryOp, a: &Value, b: &Value) -> Result<Value, VmError> {
  Ok(match op {
    BinaryOp::Add => return add(cx, a, b),
    BinaryOp::Sub => Value::Number(to_number(cx, a)? - to_number(cx, b)?),
    BinaryOp::Mul => Value::Number(to_number(cx, a)? * to_number(cx, b)?),
    BinaryOp::Div => Value::Number(to_number(cx, a)? / to_number(cx, b)?),
    // `%` truncates like C's fmod, which is what Rust's `%` does on floats.
    BinaryOp::Mod => Value::Number(to_number(cx, a)? % to_number(cx, b)?),
    BinaryOp::BitAnd => Value::from(to_int32(to_number(cx, a)?) & to_int32(to_number(cx, b)?)),
    BinaryOp::BitOr => Value::from(to_int32(to_number(cx, a)?) | to_int32(to_number(cx, b)?)),
    BinaryOp::BitXor => Value::from(to_int32(to_number(cx, a)?) ^ to_int32(to_number(cx, b)?)),
    BinaryOp::Shl => {
      let x = to_int32(to_number(cx, a)?);
      let s = to_uint32(to_number(cx, b)?) & 31;
      Value::from(x.wrapping_shl(s))
    }
    BinaryOp::Shr => {
      let x = to_int32(to_number(cx, a)?);
      let s = to_uint32(to_number(cx, b)?) & 31;
      Value::from(x >> s)
    }
    BinaryOp::UShr => {
      let x = to_uint32(to_number(cx, a)?);
      let s = to_uint32(to_number(cx, b)?) & 31;
      Value::from(x >> s)
    }
    BinaryOp::Eq => Value::Bool(eq(cx, a, b)?),
    BinaryOp::Ne => Value::Bool(!eq(cx, a, b)?),
    BinaryOp::StrictEq => Value::Bool(shallow_eq(a, b)),
    BinaryOp::StrictNe => Value::Bool(!shallow_eq(a, b)),
    BinaryOp::Lt => Value::Bool(cmp_lt(cx, a, b)?),
    BinaryOp::Le => Value::Bool(cmp_le(cx, a, b)?),
    BinaryOp::Gt => Value::Bool(cmp_lt(cx, b, a)?),
    BinaryOp::Ge => Value::Bool(cmp_le(cx, b, a)?),
    BinaryOp::In => Value::Bool(in_op(cx, a, b)?),
    BinaryOp::Instanceof => Value::Bool(instance_of(cx, a, b)?),
  })
}
