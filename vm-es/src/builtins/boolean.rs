use super::incompatible;
use super::new_wrapper;
use super::this_primitive;
use crate::coerce::to_boolean;
use crate::context::Context;
use crate::error::VmError;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BooleanFn {
  Ctor,
  ToString,
  ValueOf,
}

impl BooleanFn {
  pub fn name(self) -> &'static str {
    match self {
      BooleanFn::Ctor => "Boolean",
      BooleanFn::ToString => "toString",
      BooleanFn::ValueOf => "valueOf",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      BooleanFn::Ctor => 1,
      BooleanFn::ToString | BooleanFn::ValueOf => 0,
    }
  }

  pub(super) fn call(self, cx: &Context, _scope: &ObjectRef, this: &Value, args: &[Value]) -> Result<Value, VmError> {
    match self {
      BooleanFn::Ctor => Ok(Value::Bool(coerce_arg(cx, args)?)),
      BooleanFn::ToString => match this_primitive(this, ClassTag::Boolean) {
        Some(Value::Bool(b)) => Ok(Value::str(if b { "true" } else { "false" })),
        _ => Err(incompatible(self.name())),
      },
      BooleanFn::ValueOf => this_primitive(this, ClassTag::Boolean).ok_or_else(|| incompatible(self.name())),
    }
  }
}

fn coerce_arg(cx: &Context, args: &[Value]) -> Result<bool, VmError> {
  match args.first() {
    None => Ok(false),
    Some(v) => to_boolean(cx, v),
  }
}

pub(super) fn construct(cx: &Context, scope: &ObjectRef, args: &[Value]) -> Result<Value, VmError> {
  let b = coerce_arg(cx, args)?;
  Ok(Value::Object(new_wrapper(scope, Value::Bool(b))?))
}
