use super::arg;
use super::array_like_elements;
use crate::coerce::to_string;
use crate::context::Context;
use crate::error::EcmaError;
use crate::error::EcmaErrorKind;
use crate::error::VmError;
use crate::function::call_function;
use crate::function::function_source;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionFn {
  /// `Function.prototype` itself, which accepts any arguments and returns undefined.
  Prototype,
  Ctor,
  ToString,
  Call,
  Apply,
}

impl FunctionFn {
  pub fn name(self) -> &'static str {
    match self {
      FunctionFn::Prototype => "",
      FunctionFn::Ctor => "Function",
      FunctionFn::ToString => "toString",
      FunctionFn::Call => "call",
      FunctionFn::Apply => "apply",
    }
  }

  pub fn arity(self) -> u32 {
    match self {
      FunctionFn::Prototype => 0,
      FunctionFn::Ctor | FunctionFn::ToString | FunctionFn::Call => 1,
      FunctionFn::Apply => 2,
    }
  }

  pub(super) fn call(self, cx: &Context, scope: &ObjectRef, this: &Value, args: &[Value]) -> Result<Value, VmError> {
    match self {
      FunctionFn::Prototype => Ok(Value::Undefined),
      FunctionFn::Ctor => construct(cx, scope, args),
      FunctionFn::ToString => {
        let f = this_function(this, self)?;
        Ok(Value::from(function_source(&f)))
      }
      FunctionFn::Call => {
        let f = this_function(this, self)?;
        let rest = args.get(1..).unwrap_or(&[]);
        call_function(cx, &f, arg(args, 0), rest)
      }
      FunctionFn::Apply => {
        let f = this_function(this, self)?;
        let list = match arg(args, 1) {
          Value::Undefined | Value::Null => Vec::new(),
          Value::Object(o) if matches!(o.class(), ClassTag::Array | ClassTag::Arguments) => {
            array_like_elements(cx, &o)?
          }
          _ => {
            return Err(VmError::type_error(
              "second argument to Function.prototype.apply must be an array",
            ))
          }
        };
        call_function(cx, &f, arg(args, 0), &list)
      }
    }
  }
}

fn this_function(this: &Value, method: FunctionFn) -> Result<ObjectRef, VmError> {
  match this {
    Value::Object(f) if f.is_callable() => Ok(f.clone()),
    _ => Err(super::incompatible(method.name())),
  }
}

/// `Function(p1, ..., pn, body)` compiles a new function in the global scope.
pub(super) fn construct(cx: &Context, scope: &ObjectRef, args: &[Value]) -> Result<Value, VmError> {
  let (body, params) = match args.split_last() {
    Some((body, params)) => (to_string(cx, body)?.to_string(), params),
    None => (String::new(), args),
  };
  let params = params
    .iter()
    .map(|p| to_string(cx, p).map(|s| s.to_string()))
    .collect::<Result<Vec<_>, _>>()?;
  let source = format!("function anonymous({}) {{\n{body}\n}}", params.join(","));
  match cx.compile_function(scope, &source, "<function>", 1) {
    Ok(f) => Ok(Value::Object(f)),
    // Script code sees a bad function body as a SyntaxError it can catch.
    Err(VmError::Compile(e)) => Err(EcmaError::new(EcmaErrorKind::SyntaxError, e.message()).into()),
    Err(VmError::Misuse(m)) => Err(EcmaError::new(EcmaErrorKind::SyntaxError, m.to_string()).into()),
    Err(other) => Err(other),
  }
}
