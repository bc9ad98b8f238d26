//! Name and property resolution used by the evaluator.
//!
//! A scope chain is a list of objects linked through their parent links, ending at the top-level (global) scope. A `with` scope stands in for its target, which is its prototype, so names found through it are read from and written to the target.

use crate::coerce::to_object;
use crate::context::Context;
use crate::error::VmError;
use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::ops::to_property_key;
use crate::property::PropertyKey;
use crate::value::Value;
use parse_es::ir::SpecialProp;

/// The last object on the parent chain of `scope`.
pub fn top_level_scope(scope: &ObjectRef) -> ObjectRef {
  let mut cur = scope.clone();
  while let Some(parent) = cur.parent() {
    cur = parent;
  }
  cur
}

/// The `prototype` of the global constructor `name`, looked up from the top-level scope of `scope`.
pub fn class_prototype(scope: &ObjectRef, name: &str) -> Option<ObjectRef> {
  let top = top_level_scope(scope);
  let Some(Value::Object(ctor)) = top.get_value(&PropertyKey::from_name(name)) else {
    return None;
  };
  match ctor.get_value(&PropertyKey::from_name("prototype")) {
    Some(Value::Object(p)) => Some(p),
    _ => None,
  }
}

// The object that actually holds the bindings of a scope object.
fn binding_object(scope: &ObjectRef) -> ObjectRef {
  if scope.class() == ClassTag::With {
    if let Some(target) = scope.prototype() {
      return target;
    };
  };
  scope.clone()
}

/// The object holding the binding for `name`, searching the scope chain. A `with` scope resolves to its target.
pub fn bind(scope: &ObjectRef, name: &str) -> Option<ObjectRef> {
  let key = PropertyKey::from_name(name);
  let mut cur = Some(scope.clone());
  while let Some(s) = cur {
    let holder = binding_object(&s);
    if holder.has_property(&key) {
      return Some(holder);
    };
    cur = s.parent();
  }
  None
}

fn not_defined(name: &str) -> VmError {
  VmError::reference_error(format!("{name} is not defined"))
}

/// Reads a name. An unbound name is a ReferenceError.
pub fn name(cx: &Context, scope: &ObjectRef, name: &str) -> Result<Value, VmError> {
  name_and_this(cx, scope, name).map(|(v, _)| v)
}

/// Reads a name that is about to be called, together with the `this` for the call.
///
/// The `this` is the object the name was found on, except that activation and catch scopes are never exposed and yield the top-level scope instead.
pub fn name_and_this(cx: &Context, scope: &ObjectRef, name: &str) -> Result<(Value, Value), VmError> {
  let key = PropertyKey::from_name(name);
  let mut cur = Some(scope.clone());
  while let Some(s) = cur {
    let holder = binding_object(&s);
    if let Some(v) = holder.get_property(cx, &key)? {
      let this = if holder.class().is_scope() {
        top_level_scope(scope)
      } else {
        holder
      };
      return Ok((v, Value::Object(this)));
    };
    cur = s.parent();
  }
  Err(not_defined(name))
}

/// `typeof name`, which gives "undefined" instead of failing for an unbound name.
pub fn typeof_name(cx: &Context, scope: &ObjectRef, name: &str) -> Result<&'static str, VmError> {
  let Some(holder) = bind(scope, name) else {
    return Ok("undefined");
  };
  let v = holder
    .get_property(cx, &PropertyKey::from_name(name))?
    .unwrap_or(Value::Undefined);
  Ok(v.type_of())
}

/// Assigns to a name. An unbound name becomes a property of the top-level scope.
pub fn set_name(cx: &Context, scope: &ObjectRef, name: &str, value: Value) -> Result<(), VmError> {
  let holder = bind(scope, name).unwrap_or_else(|| top_level_scope(scope));
  holder.put_property(cx, &PropertyKey::from_name(name), value)
}

/// `delete name`. Deleting an unbound name succeeds.
pub fn delete_name(scope: &ObjectRef, name: &str) -> Result<bool, VmError> {
  match bind(scope, name) {
    Some(holder) => holder.delete_property(&PropertyKey::from_name(name)),
    None => Ok(true),
  }
}

/// Reads `obj[key]`, wrapping primitives.
pub fn get_prop(cx: &Context, scope: &ObjectRef, obj: &Value, key: &PropertyKey) -> Result<Value, VmError> {
  let o = to_object(scope, obj)?;
  Ok(o.get_property(cx, key)?.unwrap_or(Value::Undefined))
}

/// Writes `obj[key] = value`. Writes to a primitive land on a temporary wrapper and are lost.
pub fn set_prop(
  cx: &Context,
  scope: &ObjectRef,
  obj: &Value,
  key: &PropertyKey,
  value: Value,
) -> Result<(), VmError> {
  let o = to_object(scope, obj)?;
  o.put_property(cx, key, value)
}

pub fn get_elem(cx: &Context, scope: &ObjectRef, obj: &Value, key: &Value) -> Result<Value, VmError> {
  let key = to_property_key(cx, key)?;
  get_prop(cx, scope, obj, &key)
}

pub fn set_elem(
  cx: &Context,
  scope: &ObjectRef,
  obj: &Value,
  key: &Value,
  value: Value,
) -> Result<(), VmError> {
  let key = to_property_key(cx, key)?;
  set_prop(cx, scope, obj, &key, value)
}

/// `delete obj[key]`.
pub fn delete_prop(cx: &Context, scope: &ObjectRef, obj: &Value, key: &Value) -> Result<bool, VmError> {
  let o = to_object(scope, obj)?;
  let key = to_property_key(cx, key)?;
  o.delete_property(&key)
}

/// Reads `__proto__` or `__parent__`.
pub fn get_special(scope: &ObjectRef, obj: &Value, prop: SpecialProp) -> Result<Value, VmError> {
  let o = to_object(scope, obj)?;
  Ok(Value::from(match prop {
    SpecialProp::Proto => o.prototype(),
    SpecialProp::Parent => o.parent(),
  }))
}

/// Writes `__proto__` or `__parent__`. The value must be an object or null, and must not create a cycle.
pub fn set_special(scope: &ObjectRef, obj: &Value, prop: SpecialProp, value: &Value) -> Result<(), VmError> {
  let o = to_object(scope, obj)?;
  let link = match value {
    Value::Object(v) => Some(v.clone()),
    Value::Null => None,
    _ => {
      return Err(VmError::type_error(format!(
        "{} must be an object or null",
        prop.name()
      )))
    }
  };
  match prop {
    SpecialProp::Proto => o.set_prototype(link),
    SpecialProp::Parent => o.set_parent(link),
  }
}
