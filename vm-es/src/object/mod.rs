//! Scriptable objects: a slot table plus prototype and parent links.
//!
//! Own-table operations (`has`, `get`, `put`, `delete`, `define_*`) look at a single object. Chain operations (`get_property`, `put_property`, ...) walk the prototype links starting at the receiver, which is also the object new properties land on.

pub mod enumerate;
pub mod slots;

use crate::coerce::to_boolean;
use crate::coerce::to_number;
use crate::coerce::to_string;
use crate::coerce::to_uint32;
use crate::context::Context;
use crate::error::Misuse;
use crate::error::VmError;
use crate::function::call_function;
use crate::function::FunctionData;
use crate::property::Accessor;
use crate::property::Attributes;
use crate::property::Hint;
use crate::property::PropertyKey;
use crate::value::Value;
use parking_lot::Mutex;
use parking_lot::RwLock;
use slots::Slot;
use slots::SlotTable;
use slots::SlotValue;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Deref;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// The kind of an object, as shown by `Object.prototype.toString`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassTag {
  Object,
  Function,
  Array,
  String,
  Number,
  Boolean,
  Error,
  Date,
  RegExp,
  Math,
  Arguments,
  /// Scope pushed by a `with` statement. Its prototype is the target object.
  With,
  /// Function activation holding parameters, `var`s and `arguments`.
  Call,
  /// Scope binding the exception of a `catch` clause.
  Catch,
  Global,
  /// A host package such as `java.lang`.
  HostNamespace,
}

impl ClassTag {
  pub fn name(self) -> &'static str {
    match self {
      ClassTag::Object => "Object",
      ClassTag::Function => "Function",
      ClassTag::Array => "Array",
      ClassTag::String => "String",
      ClassTag::Number => "Number",
      ClassTag::Boolean => "Boolean",
      ClassTag::Error => "Error",
      ClassTag::Date => "Date",
      ClassTag::RegExp => "RegExp",
      ClassTag::Math => "Math",
      ClassTag::Arguments => "Arguments",
      ClassTag::With => "With",
      ClassTag::Call => "Call",
      ClassTag::Catch => "Catch",
      ClassTag::Global => "global",
      ClassTag::HostNamespace => "JavaPackage",
    }
  }

  /// Scope objects that never escape to script as `this`.
  pub fn is_scope(self) -> bool {
    matches!(self, ClassTag::With | ClassTag::Call | ClassTag::Catch)
  }
}

/// Internal state that is not stored in slots.
pub enum ObjectData {
  None,
  Function(FunctionData),
  /// The wrapped value of a String, Number or Boolean object, or a Date's time value.
  Primitive(Value),
  /// Dotted package path of a host namespace; empty for the `Packages` root.
  Namespace(String),
}

#[derive(Default)]
struct Links {
  proto: Option<ObjectRef>,
  parent: Option<ObjectRef>,
}

pub struct ScriptableObject {
  class: ClassTag,
  links: RwLock<Links>,
  table: Mutex<SlotTable>,
  sealed: AtomicBool,
  data: ObjectData,
}

impl ScriptableObject {
  pub fn class(&self) -> ClassTag {
    self.class
  }

  pub fn data(&self) -> &ObjectData {
    &self.data
  }

  pub fn function_data(&self) -> Option<&FunctionData> {
    match &self.data {
      ObjectData::Function(f) => Some(f),
      _ => None,
    }
  }

  pub fn primitive_value(&self) -> Option<&Value> {
    match &self.data {
      ObjectData::Primitive(v) => Some(v),
      _ => None,
    }
  }

  pub fn is_callable(&self) -> bool {
    matches!(self.data, ObjectData::Function(_))
  }

  pub fn prototype(&self) -> Option<ObjectRef> {
    self.links.read().proto.clone()
  }

  pub fn parent(&self) -> Option<ObjectRef> {
    self.links.read().parent.clone()
  }

  pub fn is_sealed(&self) -> bool {
    self.sealed.load(Ordering::Acquire)
  }

  /// Forbids adding and removing slots from now on.
  pub fn seal(&self) {
    self.sealed.store(true, Ordering::Release);
  }

  fn slot(&self, key: &PropertyKey) -> Option<Arc<Slot>> {
    self.table.lock().lookup(key)
  }

  /// Whether this object itself has a slot for `key`.
  pub fn has(&self, key: &PropertyKey) -> bool {
    self.slot(key).is_some()
  }

  /// Reads an own value slot without running accessors.
  pub fn get_value(&self, key: &PropertyKey) -> Option<Value> {
    match self.slot(key)?.load() {
      SlotValue::Value(v) => Some(v),
      SlotValue::Accessor(_) => None,
    }
  }

  pub fn get_attributes(&self, key: &PropertyKey) -> Option<Attributes> {
    self.slot(key).map(|s| s.attributes())
  }

  /// Returns false if there is no such slot.
  pub fn set_attributes(&self, key: &PropertyKey, attrs: Attributes) -> bool {
    match self.slot(key) {
      Some(slot) => {
        slot.set_attributes(attrs);
        true
      }
      None => false,
    }
  }

  /// Enumerable own keys, in definition order.
  pub fn get_ids(&self) -> Vec<PropertyKey> {
    self
      .table
      .lock()
      .slots()
      .into_iter()
      .filter(|s| !s.has(Attributes::DONTENUM))
      .map(|s| s.key().clone())
      .collect()
  }

  /// All own keys, in definition order.
  pub fn get_all_ids(&self) -> Vec<PropertyKey> {
    self
      .table
      .lock()
      .slots()
      .into_iter()
      .map(|s| s.key().clone())
      .collect()
  }

  fn store(&self, key: PropertyKey, value: SlotValue, attrs: Option<Attributes>) -> Result<(), VmError> {
    let mut table = self.table.lock();
    if let Some(slot) = table.lookup(&key) {
      drop(table);
      slot.store(value);
      if let Some(attrs) = attrs {
        slot.set_attributes(attrs);
      };
      return Ok(());
    };
    if self.is_sealed() {
      return Err(Misuse::SealedObjectAdd(key.to_string()).into());
    };
    table.insert(key, value, attrs.unwrap_or_default());
    Ok(())
  }

  /// Creates or replaces a slot, ignoring READONLY. Used by the host and the bootstrap.
  pub fn define_property(
    &self,
    key: impl Into<PropertyKey>,
    value: impl Into<Value>,
    attrs: Attributes,
  ) -> Result<(), VmError> {
    self.store(key.into(), SlotValue::Value(value.into()), Some(attrs))
  }

  pub fn define_accessor(
    &self,
    key: impl Into<PropertyKey>,
    accessor: Accessor,
    attrs: Attributes,
  ) -> Result<(), VmError> {
    self.store(key.into(), SlotValue::Accessor(accessor), Some(attrs))
  }

  /// Removes an own slot. Returns false for a PERMANENT slot and true otherwise, including when there is nothing to remove.
  pub fn delete(&self, key: &PropertyKey) -> Result<bool, VmError> {
    if self.is_sealed() {
      return Err(Misuse::SealedObjectRemove(key.to_string()).into());
    };
    let mut table = self.table.lock();
    match table.lookup(key) {
      None => Ok(true),
      Some(slot) if slot.has(Attributes::PERMANENT) => Ok(false),
      Some(_) => {
        table.remove(key);
        Ok(true)
      }
    }
  }

  /// The current `length` of an array.
  pub fn array_length(&self) -> u32 {
    match self.get_value(&PropertyKey::from_name("length")) {
      Some(Value::Number(n)) => n as u32,
      _ => 0,
    }
  }

  fn set_array_length_raw(&self, len: u32) -> Result<(), VmError> {
    self.define_property(
      "length",
      len,
      Attributes::DONTENUM | Attributes::PERMANENT,
    )
  }
}

/// A shared handle to a [`ScriptableObject`]. Equality and hashing are by identity.
#[derive(Clone)]
pub struct ObjectRef(Arc<ScriptableObject>);

impl Deref for ObjectRef {
  type Target = ScriptableObject;

  fn deref(&self) -> &ScriptableObject {
    &self.0
  }
}

impl PartialEq for ObjectRef {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for ObjectRef {}

impl Hash for ObjectRef {
  fn hash<H: Hasher>(&self, state: &mut H) {
    Arc::as_ptr(&self.0).hash(state);
  }
}

impl Debug for ObjectRef {
  // Never descends into slots or links, which may be cyclic.
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "[object {}]@{:p}", self.class.name(), Arc::as_ptr(&self.0))
  }
}

impl ObjectRef {
  pub fn new(class: ClassTag, proto: Option<ObjectRef>, parent: Option<ObjectRef>) -> ObjectRef {
    ObjectRef::with_data(class, proto, parent, ObjectData::None)
  }

  pub fn with_data(
    class: ClassTag,
    proto: Option<ObjectRef>,
    parent: Option<ObjectRef>,
    data: ObjectData,
  ) -> ObjectRef {
    ObjectRef(Arc::new(ScriptableObject {
      class,
      links: RwLock::new(Links { proto, parent }),
      table: Mutex::new(SlotTable::new()),
      sealed: AtomicBool::new(false),
      data,
    }))
  }

  pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }

  /// Sets the prototype link, refusing a value whose prototype chain reaches this object.
  pub fn set_prototype(&self, proto: Option<ObjectRef>) -> Result<(), VmError> {
    let mut cur = proto.clone();
    while let Some(o) = cur {
      if o.ptr_eq(self) {
        return Err(VmError::type_error("Cyclic __proto__ value not allowed."));
      };
      cur = o.prototype();
    }
    self.links.write().proto = proto;
    Ok(())
  }

  /// Sets the parent scope link, refusing a value whose parent chain reaches this object.
  pub fn set_parent(&self, parent: Option<ObjectRef>) -> Result<(), VmError> {
    let mut cur = parent.clone();
    while let Some(o) = cur {
      if o.ptr_eq(self) {
        return Err(VmError::type_error("Cyclic __parent__ value not allowed."));
      };
      cur = o.parent();
    }
    self.links.write().parent = parent;
    Ok(())
  }

  /// Reads an own slot. `start` is the receiver the lookup began at, used as `this` for accessors.
  pub fn get(&self, cx: &Context, key: &PropertyKey, start: &ObjectRef) -> Result<Option<Value>, VmError> {
    let Some(slot) = self.slot(key) else {
      return Ok(None);
    };
    match slot.load() {
      SlotValue::Value(v) => Ok(Some(v)),
      SlotValue::Accessor(a) => match &a.getter {
        None => Ok(Some(Value::Undefined)),
        Some(getter) => {
          let this = accessor_this(&a, start)?;
          call_function(cx, getter, this, &[]).map(Some)
        }
      },
    }
  }

  /// Writes through this object on behalf of `start`.
  ///
  /// A READONLY slot ignores the write and an accessor slot calls its setter. A value slot is overwritten only when this object is the receiver; otherwise the receiver gets its own slot.
  pub fn put(&self, cx: &Context, key: &PropertyKey, start: &ObjectRef, value: Value) -> Result<(), VmError> {
    let is_receiver = start.ptr_eq(self);
    if is_receiver && self.class == ClassTag::Array && key.is("length") {
      return self.set_array_length(cx, &value);
    };
    match self.slot(key) {
      Some(slot) => {
        if slot.has(Attributes::READONLY) {
          return Ok(());
        };
        match slot.load() {
          SlotValue::Accessor(a) => {
            let Some(setter) = &a.setter else {
              return Ok(());
            };
            let arg = match a.setter_hint {
              None => value,
              Some(Hint::Number) => Value::Number(to_number(cx, &value)?),
              Some(Hint::String) => Value::String(to_string(cx, &value)?),
              Some(Hint::Boolean) => Value::Bool(to_boolean(cx, &value)?),
            };
            let this = accessor_this(&a, start)?;
            call_function(cx, setter, this, &[arg])?;
            return Ok(());
          }
          SlotValue::Value(_) if is_receiver => slot.store(SlotValue::Value(value)),
          SlotValue::Value(_) => return start.put(cx, key, start, value),
        };
      }
      None if is_receiver => self.store(key.clone(), SlotValue::Value(value), None)?,
      None => return start.put(cx, key, start, value),
    };
    if self.class == ClassTag::Array {
      if let PropertyKey::Index(i) = key {
        if *i >= self.array_length() {
          self.set_array_length_raw(i + 1)?;
        };
      };
    };
    Ok(())
  }

  fn set_array_length(&self, cx: &Context, value: &Value) -> Result<(), VmError> {
    let n = to_number(cx, value)?;
    let len = to_uint32(n);
    if len as f64 != n {
      return Err(VmError::range_error("Inappropriate array length."));
    };
    let old = self.array_length();
    if len < old {
      for id in self.get_all_ids() {
        if matches!(id, PropertyKey::Index(i) if i >= len) {
          self.delete(&id)?;
        };
      }
    };
    self.set_array_length_raw(len)
  }

  /// The nearest object on the prototype chain, starting here, that has an own slot for `key`.
  pub fn find_holder(&self, key: &PropertyKey) -> Option<ObjectRef> {
    let mut cur = Some(self.clone());
    while let Some(o) = cur {
      if o.has(key) {
        return Some(o);
      };
      cur = o.prototype();
    }
    None
  }

  pub fn has_property(&self, key: &PropertyKey) -> bool {
    self.find_holder(key).is_some()
  }

  /// Reads `key` from this object or its prototype chain.
  pub fn get_property(&self, cx: &Context, key: &PropertyKey) -> Result<Option<Value>, VmError> {
    let mut cur = Some(self.clone());
    while let Some(o) = cur {
      if let Some(v) = o.get(cx, key, self)? {
        return Ok(Some(v));
      };
      cur = o.prototype();
    }
    if let ObjectData::Namespace(package) = &self.data {
      return self.resolve_package_member(cx, package, key);
    };
    Ok(None)
  }

  /// Writes `key` to the slot holding it on the prototype chain, or defines it on this object.
  pub fn put_property(&self, cx: &Context, key: &PropertyKey, value: Value) -> Result<(), VmError> {
    let base = self.find_holder(key).unwrap_or_else(|| self.clone());
    base.put(cx, key, self, value)
  }

  /// Deletes an own slot only.
  pub fn delete_property(&self, key: &PropertyKey) -> Result<bool, VmError> {
    self.delete(key)
  }

  // Members of a host namespace are child namespaces created on first access, unless the class shutter hides the name.
  fn resolve_package_member(
    &self,
    cx: &Context,
    package: &str,
    key: &PropertyKey,
  ) -> Result<Option<Value>, VmError> {
    let PropertyKey::Name(name) = key else {
      return Ok(None);
    };
    let qualified = if package.is_empty() {
      name.to_string()
    } else {
      format!("{package}.{name}")
    };
    if let Some(shutter) = cx.class_shutter() {
      if !shutter.visible_to_scripts(&qualified) {
        return Ok(None);
      };
    };
    let child = ObjectRef::with_data(
      ClassTag::HostNamespace,
      self.prototype(),
      self.parent(),
      ObjectData::Namespace(qualified),
    );
    if !self.is_sealed() {
      self.define_property(key.clone(), child.clone(), Attributes::EMPTY)?;
    };
    Ok(Some(Value::Object(child)))
  }
}

// The `this` an accessor runs with: the delegate if set, otherwise the nearest object on the receiver's chain with the expected class.
fn accessor_this(accessor: &Accessor, receiver: &ObjectRef) -> Result<Value, VmError> {
  if let Some(delegate) = &accessor.delegate {
    return Ok(Value::Object(delegate.clone()));
  };
  let Some(class) = accessor.receiver_class else {
    return Ok(Value::Object(receiver.clone()));
  };
  let mut cur = Some(receiver.clone());
  while let Some(o) = cur {
    if o.class() == class {
      return Ok(Value::Object(o));
    };
    cur = o.prototype();
  }
  Err(VmError::type_error(format!(
    "Method called on incompatible object of class {}",
    receiver.class().name()
  )))
}
