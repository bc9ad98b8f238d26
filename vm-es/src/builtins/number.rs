use super::arg;
use super::incompatible;
use super::new_wrapper;
use super::this_primitive;
use crate::coerce::to_integer;
use crate::coerce::to_number;
use crate::context::Context;
use crate::error::VmError;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::value::Value;
use parse_es::num::number_to_string;
use parse_es::num::number_to_string_radix;

/// Constants defined on the `Number` constructor.
pub(super) const CONSTANTS: [(&str, f64); 5] = [
  ("MAX_VALUE", f64::MAX),
  ("MIN_VALUE", 5e-324),
  ("NaN", f64::NAN),
  ("POSITIVE_INFINITY", f64::INFINITY),
  ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumberFn {
  Ctor,
  ToString,
  ValueOf,
}

impl NumberFn {
  pub fn name(self) -> &'static str {
    match self {
      NumberFn::Ctor => "Number",
      NumberFn::ToString => "toString",
      NumberFn::ValueOf => "valueOf",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      NumberFn::Ctor | NumberFn::ToString => 1,
      NumberFn::ValueOf => 0,
    }
  }

  pub(super) fn call(self, cx: &Context, _scope: &ObjectRef, this: &Value, args: &[Value]) -> Result<Value, VmError> {
    match self {
      NumberFn::Ctor => Ok(Value::Number(coerce_arg(cx, args)?)),
      NumberFn::ToString => {
        let Some(Value::Number(n)) = this_primitive(this, ClassTag::Number) else {
          return Err(incompatible(self.name()));
        };
        let radix = match arg(args, 0) {
          Value::Undefined => 10.0,
          v => to_integer(to_number(cx, &v)?),
        };
        if !(2.0..=36.0).contains(&radix) {
          return Err(VmError::range_error(format!("illegal radix {radix}.")));
        };
        Ok(Value::from(if radix == 10.0 {
          number_to_string(n)
        } else {
          number_to_string_radix(n, radix as u32)
        }))
      }
      NumberFn::ValueOf => this_primitive(this, ClassTag::Number).ok_or_else(|| incompatible(self.name())),
    }
  }
}

fn coerce_arg(cx: &Context, args: &[Value]) -> Result<f64, VmError> {
  match args.first() {
    None => Ok(0.0),
    Some(v) => to_number(cx, v),
  }
}

pub(super) fn construct(cx: &Context, scope: &ObjectRef, args: &[Value]) -> Result<Value, VmError> {
  let n = coerce_arg(cx, args)?;
  Ok(Value::Object(new_wrapper(scope, Value::Number(n))?))
}
