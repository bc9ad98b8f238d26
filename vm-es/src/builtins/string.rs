use super::arg;
use super::incompatible;
use super::new_wrapper;
use super::this_primitive;
use crate::coerce::to_integer;
use crate::coerce::to_number;
use crate::coerce::to_string;
use crate::coerce::to_uint16;
use crate::context::Context;
use crate::error::VmError;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringFn {
  Ctor,
  FromCharCode,
  CharAt,
  CharCodeAt,
  IndexOf,
  LastIndexOf,
  Substring,
  ToLowerCase,
  ToUpperCase,
  ToString,
  ValueOf,
}

impl StringFn {
  pub fn name(self) -> &'static str {
    match self {
      StringFn::Ctor => "String",
      StringFn::FromCharCode => "fromCharCode",
      StringFn::CharAt => "charAt",
      StringFn::CharCodeAt => "charCodeAt",
      StringFn::IndexOf => "indexOf",
      StringFn::LastIndexOf => "lastIndexOf",
      StringFn::Substring => "substring",
      StringFn::ToLowerCase => "toLowerCase",
      StringFn::ToUpperCase => "toUpperCase",
      StringFn::ToString => "toString",
      StringFn::ValueOf => "valueOf",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      StringFn::ToLowerCase | StringFn::ToUpperCase | StringFn::ToString | StringFn::ValueOf => 0,
      StringFn::Substring => 2,
      _ => 1,
    }
  }

  pub(super) fn call(self, cx: &Context, _scope: &ObjectRef, this: &Value, args: &[Value]) -> Result<Value, VmError> {
    match self {
      StringFn::Ctor => Ok(match args.first() {
        None => Value::str(""),
        Some(v) => Value::String(to_string(cx, v)?),
      }),
      StringFn::FromCharCode => {
        let units = args
          .iter()
          .map(|v| Ok(to_uint16(to_number(cx, v)?)))
          .collect::<Result<Vec<u16>, VmError>>()?;
        Ok(Value::from(String::from_utf16_lossy(&units)))
      }
      StringFn::ToString | StringFn::ValueOf => {
        this_primitive(this, ClassTag::String).ok_or_else(|| incompatible(self.name()))
      }
      _ => {
        let s = to_string(cx, this)?;
        let units: Vec<u16> = s.encode_utf16().collect();
        self.call_on(cx, &s, &units, args)
      }
    }
  }

  // Members that operate on the string value of `this`, given as text and as UTF-16 code units.
  fn call_on(self, cx: &Context, s: &str, units: &[u16], args: &[Value]) -> Result<Value, VmError> {
    let len = units.len() as f64;
    let position = |i: usize| -> Result<f64, VmError> { Ok(to_integer(to_number(cx, &arg(args, i))?)) };
    Ok(match self {
      StringFn::CharAt => {
        let pos = position(0)?;
        if pos < 0.0 || pos >= len {
          Value::str("")
        } else {
          Value::from(String::from_utf16_lossy(&units[pos as usize..pos as usize + 1]))
        }
      }
      StringFn::CharCodeAt => {
        let pos = position(0)?;
        if pos < 0.0 || pos >= len {
          Value::Number(f64::NAN)
        } else {
          Value::from(units[pos as usize] as u32)
        }
      }
      StringFn::IndexOf => {
        let search: Vec<u16> = to_string(cx, &arg(args, 0))?.encode_utf16().collect();
        let start = position(1)?.clamp(0.0, len) as usize;
        let found = (start..=units.len())
          .find(|&i| units[i..].starts_with(&search))
          .map_or(-1.0, |i| i as f64);
        Value::Number(found)
      }
      StringFn::LastIndexOf => {
        let search: Vec<u16> = to_string(cx, &arg(args, 0))?.encode_utf16().collect();
        let n = to_number(cx, &arg(args, 1))?;
        let start = if n.is_nan() { len } else { to_integer(n).clamp(0.0, len) } as usize;
        let last = units.len().saturating_sub(search.len()).min(start);
        let found = (0..=last)
          .rev()
          .find(|&i| units[i..].starts_with(&search))
          .map_or(-1.0, |i| i as f64);
        Value::Number(found)
      }
      StringFn::Substring => {
        let start = position(0)?.clamp(0.0, len);
        let end = match arg(args, 1) {
          Value::Undefined => len,
          v => to_integer(to_number(cx, &v)?).clamp(0.0, len),
        };
        let (from, to) = if start > end { (end, start) } else { (start, end) };
        Value::from(String::from_utf16_lossy(&units[from as usize..to as usize]))
      }
      StringFn::ToLowerCase => Value::from(s.to_lowercase()),
      StringFn::ToUpperCase => Value::from(s.to_uppercase()),
      StringFn::Ctor | StringFn::FromCharCode | StringFn::ToString | StringFn::ValueOf => {
        return Err(incompatible(self.name()))
      }
    })
  }
}

pub(super) fn construct(cx: &Context, scope: &ObjectRef, args: &[Value]) -> Result<Value, VmError> {
  let s = match args.first() {
    None => Value::str(""),
    Some(v) => Value::String(to_string(cx, v)?),
  };
  Ok(Value::Object(new_wrapper(scope, s)?))
}
