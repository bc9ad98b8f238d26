use super::arg;
use crate::coerce::to_object;
use crate::coerce::to_string;
use crate::context::Context;
use crate::error::EcmaErrorKind;
use crate::error::VmError;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::property::Attributes;
use crate::property::PropertyKey;
use crate::scope::class_prototype;
use crate::scope::top_level_scope;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorFn {
  Ctor(EcmaErrorKind),
  ToString,
}

impl ErrorFn {
  pub fn name(self) -> &'static str {
    match self {
      ErrorFn::Ctor(kind) => kind.name(),
      ErrorFn::ToString => "toString",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      ErrorFn::Ctor(_) => 1,
      ErrorFn::ToString => 0,
    }
  }

  pub(super) fn call(self, cx: &Context, scope: &ObjectRef, this: &Value, args: &[Value]) -> Result<Value, VmError> {
    match self {
      ErrorFn::Ctor(kind) => construct(cx, scope, kind, args),
      ErrorFn::ToString => {
        let o = to_object(scope, this)?;
        let name = o
          .get_property(cx, &PropertyKey::from_name("name"))?
          .unwrap_or(Value::Undefined);
        let name = match name {
          Value::Undefined => "Error".into(),
          v => to_string(cx, &v)?,
        };
        let message = o
          .get_property(cx, &PropertyKey::from_name("message"))?
          .unwrap_or(Value::Undefined);
        let message = match message {
          Value::Undefined => "".into(),
          v => to_string(cx, &v)?,
        };
        Ok(Value::from(if message.is_empty() {
          name.to_string()
        } else {
          format!("{name}: {message}")
        }))
      }
    }
  }
}

/// Creates an instance of the error constructor for `kind`, as `new TypeError(message)` would.
pub fn new_error_object(
  _cx: &Context,
  scope: &ObjectRef,
  kind: EcmaErrorKind,
  message: &str,
) -> Result<ObjectRef, VmError> {
  let top = top_level_scope(scope);
  let err = ObjectRef::new(ClassTag::Error, class_prototype(&top, kind.name()), Some(top));
  err.define_property("message", message, Attributes::DONTENUM)?;
  Ok(err)
}

pub(super) fn construct(
  cx: &Context,
  scope: &ObjectRef,
  kind: EcmaErrorKind,
  args: &[Value],
) -> Result<Value, VmError> {
  let top = top_level_scope(scope);
  let err = ObjectRef::new(ClassTag::Error, class_prototype(&top, kind.name()), Some(top));
  match arg(args, 0) {
    Value::Undefined => {}
    v => err.define_property("message", Value::String(to_string(cx, &v)?), Attributes::DONTENUM)?,
  };
  Ok(Value::Object(err))
}
