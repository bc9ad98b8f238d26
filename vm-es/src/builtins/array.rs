use super::arg;
use super::guard_cycle;
use super::length_of;
use super::new_array;
use super::to_source;
use crate::coerce::to_integer;
use crate::coerce::to_number;
use crate::coerce::to_object;
use crate::coerce::to_string;
use crate::coerce::to_uint32;
use crate::context::Context;
use crate::context::Feature;
use crate::context::LanguageVersion;
use crate::error::VmError;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::property::Attributes;
use crate::property::PropertyKey;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayFn {
  Ctor,
  Join,
  ToString,
  Push,
  Pop,
  Reverse,
  Concat,
  Slice,
}

impl ArrayFn {
  pub fn name(self) -> &'static str {
    match self {
      ArrayFn::Ctor => "Array",
      ArrayFn::Join => "join",
      ArrayFn::ToString => "toString",
      ArrayFn::Push => "push",
      ArrayFn::Pop => "pop",
      ArrayFn::Reverse => "reverse",
      ArrayFn::Concat => "concat",
      ArrayFn::Slice => "slice",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      ArrayFn::Ctor | ArrayFn::Join | ArrayFn::Push | ArrayFn::Concat => 1,
      ArrayFn::ToString | ArrayFn::Pop | ArrayFn::Reverse => 0,
      ArrayFn::Slice => 2,
    }
  }

  pub(super) fn call(self, cx: &Context, scope: &ObjectRef, this: &Value, args: &[Value]) -> Result<Value, VmError> {
    match self {
      ArrayFn::Ctor => construct(cx, scope, args),
      _ => self.call_on(cx, scope, to_object(scope, this)?, args),
    }
  }

  // Members that operate on `this` converted to an object.
  fn call_on(self, cx: &Context, scope: &ObjectRef, o: ObjectRef, args: &[Value]) -> Result<Value, VmError> {
    match self {
      ArrayFn::Ctor => construct(cx, scope, args),
      ArrayFn::Join => {
        let sep = match arg(args, 0) {
          Value::Undefined => ",".to_string(),
          v => to_string(cx, &v)?.to_string(),
        };
        Ok(Value::from(join(cx, &o, &sep)?))
      }
      ArrayFn::ToString => {
        if cx.has_feature(Feature::ToStringAsSource) {
          return Ok(Value::from(array_source(cx, &o)?));
        };
        Ok(Value::from(join(cx, &o, ",")?))
      }
      ArrayFn::Push => {
        let mut len = length_of(cx, &o)?;
        for v in args {
          o.put_property(cx, &PropertyKey::Index(len), v.clone())?;
          len += 1;
        }
        o.put_property(cx, &PropertyKey::from_name("length"), Value::from(len))?;
        // JavaScript 1.2 returns the last element pushed.
        if cx.language_version() == LanguageVersion::V1_2 {
          return Ok(args.last().cloned().unwrap_or(Value::Undefined));
        };
        Ok(Value::from(len))
      }
      ArrayFn::Pop => {
        let len = length_of(cx, &o)?;
        let length_key = PropertyKey::from_name("length");
        if len == 0 {
          o.put_property(cx, &length_key, Value::from(0))?;
          return Ok(Value::Undefined);
        };
        let key = PropertyKey::Index(len - 1);
        let v = o.get_property(cx, &key)?.unwrap_or(Value::Undefined);
        o.delete_property(&key)?;
        o.put_property(cx, &length_key, Value::from(len - 1))?;
        Ok(v)
      }
      ArrayFn::Reverse => {
        let len = length_of(cx, &o)?;
        let (mut lo, mut hi) = (0u32, len);
        while hi > lo + 1 {
          hi -= 1;
          let lo_key = PropertyKey::Index(lo);
          let hi_key = PropertyKey::Index(hi);
          let lo_v = o.get_property(cx, &lo_key)?;
          let hi_v = o.get_property(cx, &hi_key)?;
          swap_into(cx, &o, &lo_key, hi_v)?;
          swap_into(cx, &o, &hi_key, lo_v)?;
          lo += 1;
        }
        Ok(Value::Object(o))
      }
      ArrayFn::Concat => {
        let mut out = Vec::new();
        for item in std::iter::once(Value::Object(o)).chain(args.iter().cloned()) {
          match item {
            Value::Object(a) if a.class() == ClassTag::Array => {
              let len = length_of(cx, &a)?;
              for i in 0..len {
                out.push(a.get_property(cx, &PropertyKey::Index(i))?);
              }
            }
            v => out.push(Some(v)),
          };
        }
        Ok(Value::Object(array_with_holes(cx, scope, out)?))
      }
      ArrayFn::Slice => {
        let len = length_of(cx, &o)? as f64;
        let start = relative_index(to_integer(to_number(cx, &arg(args, 0))?), len);
        let end = match arg(args, 1) {
          Value::Undefined => len,
          v => relative_index(to_integer(to_number(cx, &v)?), len),
        };
        let mut out = Vec::new();
        let mut i = start;
        while i < end {
          out.push(o.get_property(cx, &PropertyKey::Index(i as u32))?);
          i += 1.0;
        }
        Ok(Value::Object(array_with_holes(cx, scope, out)?))
      }
    }
  }
}

// A negative position counts back from the end. The result lies in 0..=len.
fn relative_index(n: f64, len: f64) -> f64 {
  if n < 0.0 {
    (len + n).max(0.0)
  } else {
    n.min(len)
  }
}

// Stores `value` at `key`, or removes the element when `value` is a hole.
fn swap_into(cx: &Context, o: &ObjectRef, key: &PropertyKey, value: Option<Value>) -> Result<(), VmError> {
  match value {
    Some(v) => o.put_property(cx, key, v),
    None => o.delete_property(key).map(|_| ()),
  }
}

fn array_with_holes(cx: &Context, scope: &ObjectRef, elements: Vec<Option<Value>>) -> Result<ObjectRef, VmError> {
  let arr = new_array(scope, Vec::new())?;
  let len = elements.len() as u32;
  for (i, v) in elements.into_iter().enumerate() {
    if let Some(v) = v {
      arr.put_property(cx, &PropertyKey::Index(i as u32), v)?;
    };
  }
  arr.put_property(cx, &PropertyKey::from_name("length"), Value::from(len))?;
  Ok(arr)
}

fn join(cx: &Context, o: &ObjectRef, sep: &str) -> Result<String, VmError> {
  guard_cycle(o, "", || {
    let len = length_of(cx, o)?;
    let mut out = String::new();
    for i in 0..len {
      if i > 0 {
        out.push_str(sep);
      };
      match o.get_property(cx, &PropertyKey::Index(i))? {
        None | Some(Value::Undefined) | Some(Value::Null) => {}
        Some(v) => out.push_str(&to_string(cx, &v)?),
      };
    }
    Ok(out)
  })
}

/// `[1, "a", , 3]`, with holes left empty.
pub(super) fn array_source(cx: &Context, o: &ObjectRef) -> Result<String, VmError> {
  guard_cycle(o, "[]", || {
    let len = length_of(cx, o)?;
    let mut parts = Vec::with_capacity(len as usize);
    for i in 0..len {
      parts.push(match o.get_property(cx, &PropertyKey::Index(i))? {
        None => String::new(),
        Some(v) => to_source(cx, &v)?,
      });
    }
    let trailing = if len > 0 && parts.last().is_some_and(|p| p.is_empty()) {
      ","
    } else {
      ""
    };
    Ok(format!("[{}{trailing}]", parts.join(", ")))
  })
}

/// `new Array(n)` makes an empty array of length `n`; any other arguments become the elements.
pub(super) fn construct(_cx: &Context, scope: &ObjectRef, args: &[Value]) -> Result<Value, VmError> {
  if let [Value::Number(n)] = args {
    let len = to_uint32(*n);
    if len as f64 != *n {
      return Err(VmError::range_error("Inappropriate array length."));
    };
    let arr = new_array(scope, Vec::new())?;
    arr.define_property("length", len, Attributes::DONTENUM | Attributes::PERMANENT)?;
    return Ok(Value::Object(arr));
  };
  Ok(Value::Object(new_array(scope, args.to_vec())?))
}
