use super::arg;
use super::new_object;
use super::to_source;
use crate::coerce::to_object;
use crate::context::Context;
use crate::context::Feature;
use crate::error::VmError;
use crate::function::call_function;
use crate::object::ObjectRef;
use crate::ops::to_property_key;
use crate::property::Attributes;
use crate::property::PropertyKey;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectFn {
  Ctor,
  ToString,
  ToLocaleString,
  ValueOf,
  HasOwnProperty,
  IsPrototypeOf,
  PropertyIsEnumerable,
}

impl ObjectFn {
  pub fn name(self) -> &'static str {
    match self {
      ObjectFn::Ctor => "Object",
      ObjectFn::ToString => "toString",
      ObjectFn::ToLocaleString => "toLocaleString",
      ObjectFn::ValueOf => "valueOf",
      ObjectFn::HasOwnProperty => "hasOwnProperty",
      ObjectFn::IsPrototypeOf => "isPrototypeOf",
      ObjectFn::PropertyIsEnumerable => "propertyIsEnumerable",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      ObjectFn::Ctor
      | ObjectFn::HasOwnProperty
      | ObjectFn::IsPrototypeOf
      | ObjectFn::PropertyIsEnumerable => 1,
      ObjectFn::ToString | ObjectFn::ToLocaleString | ObjectFn::ValueOf => 0,
    }
  }

  pub(super) fn call(self, cx: &Context, scope: &ObjectRef, this: &Value, args: &[Value]) -> Result<Value, VmError> {
    match self {
      ObjectFn::Ctor => construct(cx, scope, args),
      ObjectFn::ToString => {
        let o = to_object(scope, this)?;
        if cx.has_feature(Feature::ToStringAsSource) {
          return Ok(Value::from(to_source(cx, &Value::Object(o))?));
        };
        Ok(Value::from(format!("[object {}]", o.class().name())))
      }
      ObjectFn::ToLocaleString => {
        let o = to_object(scope, this)?;
        match o.get_property(cx, &PropertyKey::from_name("toString"))? {
          Some(Value::Object(f)) if f.is_callable() => call_function(cx, &f, Value::Object(o), &[]),
          _ => Err(VmError::type_error("toString is not a function")),
        }
      }
      ObjectFn::ValueOf => Ok(Value::Object(to_object(scope, this)?)),
      ObjectFn::HasOwnProperty => {
        let o = to_object(scope, this)?;
        let key = to_property_key(cx, &arg(args, 0))?;
        Ok(Value::Bool(o.has(&key)))
      }
      ObjectFn::IsPrototypeOf => {
        let o = to_object(scope, this)?;
        let Value::Object(v) = arg(args, 0) else {
          return Ok(Value::Bool(false));
        };
        let mut cur = v.prototype();
        while let Some(p) = cur {
          if p == o {
            return Ok(Value::Bool(true));
          };
          cur = p.prototype();
        }
        Ok(Value::Bool(false))
      }
      ObjectFn::PropertyIsEnumerable => {
        let o = to_object(scope, this)?;
        let key = to_property_key(cx, &arg(args, 0))?;
        let enumerable = o
          .get_attributes(&key)
          .is_some_and(|a| !a.contains(Attributes::DONTENUM));
        Ok(Value::Bool(enumerable))
      }
    }
  }
}

pub(super) fn construct(_cx: &Context, scope: &ObjectRef, args: &[Value]) -> Result<Value, VmError> {
  Ok(match arg(args, 0) {
    Value::Undefined | Value::Null => Value::Object(new_object(scope)),
    v => Value::Object(to_object(scope, &v)?),
  })
}

/// `{a:1, b:"x"}` for the enumerable own properties of `obj`.
pub(super) fn object_source(cx: &Context, obj: &ObjectRef) -> Result<String, VmError> {
  super::guard_cycle(obj, "{}", || {
    let mut parts = Vec::new();
    for key in obj.get_ids() {
      let v = obj.get_property(cx, &key)?.unwrap_or(Value::Undefined);
      parts.push(format!("{key}:{}", to_source(cx, &v)?));
    }
    Ok(format!("{{{}}}", parts.join(", ")))
  })
}
