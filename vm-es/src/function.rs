use crate::builtins::call_builtin;
use crate::builtins::construct_builtin;
use crate::builtins::BuiltinFn;
use crate::builtins::FIXED;
use crate::context::Context;
use crate::error::VmError;
use crate::interp::call_interpreted;
use crate::object::ClassTag;
use crate::object::ObjectData;
use crate::object::ObjectRef;
use crate::property::Attributes;
use crate::property::PropertyKey;
use crate::scope::class_prototype;
use crate::scope::top_level_scope;
use crate::value::Value;
use parse_es::ir::function::FunctionNode;
use std::sync::Arc;

/// Signature of functions supplied by the host. Receives `this` and the arguments.
pub type HostFn = dyn Fn(&Context, &Value, &[Value]) -> Result<Value, VmError> + Send + Sync;

/// What runs when a function object is called. The closure scope of an interpreted function is the object's parent link.
#[derive(Clone)]
pub enum FunctionData {
  Interpreted(Arc<FunctionNode>),
  Builtin(BuiltinFn),
  Host(Arc<HostFn>),
}

fn function_object(
  scope: &ObjectRef,
  proto: Option<ObjectRef>,
  data: FunctionData,
  name: &str,
  arity: u32,
) -> Result<ObjectRef, VmError> {
  let f = ObjectRef::with_data(ClassTag::Function, proto, Some(scope.clone()), ObjectData::Function(data));
  f.define_property("length", arity, FIXED)?;
  f.define_property("name", name, FIXED)?;
  Ok(f)
}

/// Creates a function object for a parsed function, closed over `scope`. It gets a fresh `prototype` object whose `constructor` points back at it.
pub fn new_interpreted_function(node: Arc<FunctionNode>, scope: &ObjectRef) -> Result<ObjectRef, VmError> {
  let name = node.name.clone().unwrap_or_default();
  let arity = node.params.len() as u32;
  let proto = class_prototype(scope, "Function");
  let f = function_object(scope, proto, FunctionData::Interpreted(node), &name, arity)?;
  let proto = ObjectRef::new(
    ClassTag::Object,
    class_prototype(scope, "Object"),
    Some(top_level_scope(scope)),
  );
  proto.define_property("constructor", f.clone(), Attributes::DONTENUM)?;
  f.define_property("prototype", proto, Attributes::DONTENUM | Attributes::PERMANENT)?;
  Ok(f)
}

/// Creates a function object for a built-in member. Built-ins have no `prototype` of their own unless they are constructors.
pub fn new_builtin_function(scope: &ObjectRef, builtin: BuiltinFn) -> Result<ObjectRef, VmError> {
  new_builtin_function_with_proto(scope, class_prototype(scope, "Function"), builtin)
}

/// Like [`new_builtin_function`], with an explicit prototype for use before `Function` is installed.
pub(crate) fn new_builtin_function_with_proto(
  scope: &ObjectRef,
  proto: Option<ObjectRef>,
  builtin: BuiltinFn,
) -> Result<ObjectRef, VmError> {
  function_object(scope, proto, FunctionData::Builtin(builtin), builtin.name(), builtin.arity())
}

/// Wraps a host closure as a function object that scripts can call.
pub fn new_host_function(
  scope: &ObjectRef,
  name: &str,
  arity: u32,
  f: impl Fn(&Context, &Value, &[Value]) -> Result<Value, VmError> + Send + Sync + 'static,
) -> Result<ObjectRef, VmError> {
  let proto = class_prototype(scope, "Function");
  function_object(scope, proto, FunctionData::Host(Arc::new(f)), name, arity)
}

fn function_name(f: &ObjectRef) -> String {
  match f.get_value(&PropertyKey::from_name("name")) {
    Some(Value::String(s)) if !s.is_empty() => s.to_string(),
    _ => "anonymous".to_string(),
  }
}

/// Calls `f` with the given `this` and arguments. Every call counts as one instruction and one level of call depth.
pub fn call_function(cx: &Context, f: &ObjectRef, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let Some(data) = f.function_data() else {
    return Err(VmError::type_error(format!(
      "{} is not a function",
      f.class().name()
    )));
  };
  cx.count_instruction()?;
  let _depth = cx.enter_call()?;
  match data {
    FunctionData::Interpreted(node) => call_interpreted(cx, f, node, this, args),
    FunctionData::Builtin(b) => call_builtin(cx, f, *b, this, args),
    FunctionData::Host(h) => h(cx, &this, args),
  }
}

/// `new f(...args)`.
///
/// Script and host functions run with a new object whose prototype is `f.prototype`; an object returned by the function replaces it. Built-in constructors build their own instances.
pub fn construct(cx: &Context, f: &ObjectRef, args: &[Value]) -> Result<Value, VmError> {
  let Some(data) = f.function_data() else {
    return Err(VmError::type_error(format!(
      "{} is not a constructor",
      f.class().name()
    )));
  };
  if let FunctionData::Builtin(b) = data {
    cx.count_instruction()?;
    let _depth = cx.enter_call()?;
    return construct_builtin(cx, f, *b, args);
  };
  let top = top_level_scope(f);
  let proto = match f.get_property(cx, &PropertyKey::from_name("prototype"))? {
    Some(Value::Object(p)) => Some(p),
    _ => class_prototype(&top, "Object"),
  };
  let obj = ObjectRef::new(ClassTag::Object, proto, Some(top));
  let result = call_function(cx, f, Value::Object(obj.clone()), args)?;
  Ok(match result {
    Value::Object(o) => Value::Object(o),
    _ => Value::Object(obj),
  })
}

/// The text `Function.prototype.toString` shows for `f`.
pub fn function_source(f: &ObjectRef) -> String {
  match f.function_data() {
    Some(FunctionData::Interpreted(node)) => node.source.clone(),
    _ => format!("function {}() {{ [native code] }}", function_name(f)),
  }
}
