//! The standard built-in objects.
//!
//! Every native method is a [`BuiltinFn`], a closed enum grouped by the object that owns the method. Calls are dispatched by `match`, and each member knows its own name and arity.

mod array;
mod boolean;
mod date;
mod error;
mod function;
mod global;
mod init;
mod math;
mod number;
mod object;
mod regexp;
mod string;

pub use array::ArrayFn;
pub use boolean::BooleanFn;
pub use date::DateFn;
pub use error::new_error_object;
pub use error::ErrorFn;
pub use function::FunctionFn;
pub use global::GlobalFn;
pub use init::init_standard_objects;
pub use math::MathFn;
pub use number::NumberFn;
pub use object::ObjectFn;
pub use regexp::new_regexp;
pub use regexp::RegExpFn;
pub use string::StringFn;

use crate::coerce::to_number;
use crate::coerce::to_uint32;
use crate::context::Context;
use crate::error::VmError;
use crate::object::ClassTag;
use crate::object::ObjectData;
use crate::object::ObjectRef;
use crate::property::Attributes;
use crate::property::PropertyKey;
use crate::scope::class_prototype;
use crate::scope::top_level_scope;
use crate::value::Value;
use ahash::HashSet;
use std::cell::RefCell;

/// A native method or constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinFn {
  Object(ObjectFn),
  Function(FunctionFn),
  Array(ArrayFn),
  String(StringFn),
  Boolean(BooleanFn),
  Number(NumberFn),
  Math(MathFn),
  Date(DateFn),
  RegExp(RegExpFn),
  Error(ErrorFn),
  Global(GlobalFn),
}

impl BuiltinFn {
  pub fn name(self) -> &'static str {
    match self {
      BuiltinFn::Object(m) => m.name(),
      BuiltinFn::Function(m) => m.name(),
      BuiltinFn::Array(m) => m.name(),
      BuiltinFn::String(m) => m.name(),
      BuiltinFn::Boolean(m) => m.name(),
      BuiltinFn::Number(m) => m.name(),
      BuiltinFn::Math(m) => m.name(),
      BuiltinFn::Date(m) => m.name(),
      BuiltinFn::RegExp(m) => m.name(),
      BuiltinFn::Error(m) => m.name(),
      BuiltinFn::Global(m) => m.name(),
    }
  }

  /// The `length` of the function object.
  pub fn arity(self) -> u32 {
    match self {
      BuiltinFn::Object(m) => m.arity(),
      BuiltinFn::Function(m) => m.arity(),
      BuiltinFn::Array(m) => m.arity(),
      BuiltinFn::String(m) => m.arity(),
      BuiltinFn::Boolean(m) => m.arity(),
      BuiltinFn::Number(m) => m.arity(),
      BuiltinFn::Math(m) => m.arity(),
      BuiltinFn::Date(m) => m.arity(),
      BuiltinFn::RegExp(m) => m.arity(),
      BuiltinFn::Error(m) => m.arity(),
      BuiltinFn::Global(m) => m.arity(),
    }
  }
}

/// Calls a built-in as a function. `f` is the function object, whose top-level scope supplies the prototypes of anything created.
pub fn call_builtin(cx: &Context, f: &ObjectRef, builtin: BuiltinFn, this: Value, args: &[Value]) -> Result<Value, VmError> {
  let scope = top_level_scope(f);
  match builtin {
    BuiltinFn::Object(m) => m.call(cx, &scope, &this, args),
    BuiltinFn::Function(m) => m.call(cx, &scope, &this, args),
    BuiltinFn::Array(m) => m.call(cx, &scope, &this, args),
    BuiltinFn::String(m) => m.call(cx, &scope, &this, args),
    BuiltinFn::Boolean(m) => m.call(cx, &scope, &this, args),
    BuiltinFn::Number(m) => m.call(cx, &scope, &this, args),
    BuiltinFn::Math(m) => m.call(cx, args),
    BuiltinFn::Date(m) => m.call(cx, &this, args),
    BuiltinFn::RegExp(m) => m.call(cx, &scope, &this, args),
    BuiltinFn::Error(m) => m.call(cx, &scope, &this, args),
    BuiltinFn::Global(m) => m.call(cx, args),
  }
}

/// `new` on a built-in. Only the constructors can be used this way.
pub fn construct_builtin(cx: &Context, f: &ObjectRef, builtin: BuiltinFn, args: &[Value]) -> Result<Value, VmError> {
  let scope = top_level_scope(f);
  match builtin {
    BuiltinFn::Object(ObjectFn::Ctor) => object::construct(cx, &scope, args),
    BuiltinFn::Function(FunctionFn::Ctor) => function::construct(cx, &scope, args),
    BuiltinFn::Array(ArrayFn::Ctor) => array::construct(cx, &scope, args),
    BuiltinFn::String(StringFn::Ctor) => string::construct(cx, &scope, args),
    BuiltinFn::Boolean(BooleanFn::Ctor) => boolean::construct(cx, &scope, args),
    BuiltinFn::Number(NumberFn::Ctor) => number::construct(cx, &scope, args),
    BuiltinFn::Date(DateFn::Ctor) => date::construct(cx, &scope, args),
    BuiltinFn::RegExp(RegExpFn::Ctor) => regexp::construct(cx, &scope, args),
    BuiltinFn::Error(ErrorFn::Ctor(kind)) => error::construct(cx, &scope, kind, args),
    other => Err(VmError::type_error(format!(
      "{} is not a constructor",
      other.name()
    ))),
  }
}

pub(crate) const FIXED: Attributes = Attributes::READONLY
  .union(Attributes::DONTENUM)
  .union(Attributes::PERMANENT);

pub(crate) fn arg(args: &[Value], i: usize) -> Value {
  args.get(i).cloned().unwrap_or(Value::Undefined)
}

pub(crate) fn incompatible(method: &str) -> VmError {
  VmError::type_error(format!("Method \"{method}\" called on incompatible object."))
}

/// The primitive inside `this` when it is a value of, or a wrapper with, the given class.
pub(crate) fn this_primitive(this: &Value, class: ClassTag) -> Option<Value> {
  match (this, class) {
    (Value::String(_), ClassTag::String)
    | (Value::Number(_), ClassTag::Number)
    | (Value::Bool(_), ClassTag::Boolean) => Some(this.clone()),
    (Value::Object(o), _) if o.class() == class => o.primitive_value().cloned(),
    _ => None,
  }
}

pub fn new_object(scope: &ObjectRef) -> ObjectRef {
  let top = top_level_scope(scope);
  ObjectRef::new(ClassTag::Object, class_prototype(&top, "Object"), Some(top))
}

/// Creates an array holding `elements`.
pub fn new_array(scope: &ObjectRef, elements: Vec<Value>) -> Result<ObjectRef, VmError> {
  let top = top_level_scope(scope);
  let arr = ObjectRef::new(ClassTag::Array, class_prototype(&top, "Array"), Some(top));
  let len = elements.len() as u32;
  for (i, v) in elements.into_iter().enumerate() {
    arr.define_property(i as u32, v, Attributes::EMPTY)?;
  }
  arr.define_property("length", len, Attributes::DONTENUM | Attributes::PERMANENT)?;
  Ok(arr)
}

/// `ToUint32(obj.length)`.
pub(crate) fn length_of(cx: &Context, obj: &ObjectRef) -> Result<u32, VmError> {
  let len = obj
    .get_property(cx, &PropertyKey::from_name("length"))?
    .unwrap_or(Value::Undefined);
  Ok(to_uint32(to_number(cx, &len)?))
}

/// The elements `0..length` of an array-like object. Missing elements are undefined.
pub(crate) fn array_like_elements(cx: &Context, obj: &ObjectRef) -> Result<Vec<Value>, VmError> {
  let len = length_of(cx, obj)?;
  (0..len)
    .map(|i| Ok(obj.get_property(cx, &PropertyKey::Index(i))?.unwrap_or(Value::Undefined)))
    .collect()
}

/// Wraps a primitive in a String, Number or Boolean object.
pub fn new_wrapper(scope: &ObjectRef, prim: Value) -> Result<ObjectRef, VmError> {
  let top = top_level_scope(scope);
  let class = match &prim {
    Value::String(_) => ClassTag::String,
    Value::Number(_) => ClassTag::Number,
    Value::Bool(_) => ClassTag::Boolean,
    _ => return Ok(new_object(&top)),
  };
  let length = match &prim {
    Value::String(s) => Some(s.encode_utf16().count() as u32),
    _ => None,
  };
  let obj = ObjectRef::with_data(
    class,
    class_prototype(&top, class.name()),
    Some(top),
    ObjectData::Primitive(prim),
  );
  if let Some(length) = length {
    obj.define_property("length", length, FIXED)?;
  };
  Ok(obj)
}

/// The `arguments` object of a function activation.
pub fn new_arguments(scope: &ObjectRef, callee: &ObjectRef, args: &[Value]) -> Result<ObjectRef, VmError> {
  let top = top_level_scope(scope);
  let obj = ObjectRef::new(ClassTag::Arguments, class_prototype(&top, "Object"), Some(top));
  for (i, v) in args.iter().enumerate() {
    obj.define_property(i as u32, v.clone(), Attributes::EMPTY)?;
  }
  obj.define_property("length", args.len() as u32, Attributes::DONTENUM)?;
  obj.define_property("callee", callee.clone(), Attributes::DONTENUM)?;
  Ok(obj)
}

thread_local! {
  // Objects whose source form is being produced on this thread.
  static SOURCE_IN_PROGRESS: RefCell<HashSet<ObjectRef>> = RefCell::new(HashSet::default());
}

// Marks `obj` as in progress for the duration of `f`. An object already in progress is a cycle and renders as `cyclic`.
fn guard_cycle(
  obj: &ObjectRef,
  cyclic: &str,
  f: impl FnOnce() -> Result<String, VmError>,
) -> Result<String, VmError> {
  if !SOURCE_IN_PROGRESS.with(|s| s.borrow_mut().insert(obj.clone())) {
    return Ok(cyclic.to_string());
  };
  let res = f();
  SOURCE_IN_PROGRESS.with(|s| s.borrow_mut().remove(obj));
  res
}

pub(crate) fn quote(s: &str) -> String {
  let mut out = String::with_capacity(s.len() + 2);
  out.push('"');
  for c in s.chars() {
    match c {
      '"' => out.push_str("\\\""),
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02X}", c as u32)),
      c => out.push(c),
    }
  }
  out.push('"');
  out
}

/// Source-like text for a value, as produced by `toString` when objects print as source.
pub(crate) fn to_source(cx: &Context, value: &Value) -> Result<String, VmError> {
  cx.check_stack()?;
  match value {
    Value::Undefined => Ok("(void 0)".to_string()),
    Value::String(s) => Ok(quote(s)),
    Value::Object(o) if o.class() == ClassTag::Array => array::array_source(cx, o),
    Value::Object(o) if o.is_callable() => Ok(crate::function::function_source(o)),
    Value::Object(o) if o.class() == ClassTag::Object => object::object_source(cx, o),
    other => Ok(crate::coerce::to_string(cx, other)?.to_string()),
  }
}
