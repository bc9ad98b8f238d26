use crate::object::ObjectRef;
use std::sync::Arc;

/// A script value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  String(Arc<str>),
  /// Objects, including functions and arrays.
  Object(ObjectRef),
}

impl Value {
  pub fn str(s: &str) -> Value {
    Value::String(Arc::from(s))
  }

  pub fn is_undefined(&self) -> bool {
    matches!(self, Value::Undefined)
  }

  pub fn is_nullish(&self) -> bool {
    matches!(self, Value::Undefined | Value::Null)
  }

  pub fn as_object(&self) -> Option<&ObjectRef> {
    match self {
      Value::Object(o) => Some(o),
      _ => None,
    }
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }

  /// Whether the value is a function object.
  pub fn is_callable(&self) -> bool {
    matches!(self, Value::Object(o) if o.is_callable())
  }

  /// The result of the `typeof` operator.
  pub fn type_of(&self) -> &'static str {
    match self {
      Value::Undefined => "undefined",
      Value::Null => "object",
      Value::Bool(_) => "boolean",
      Value::Number(_) => "number",
      Value::String(_) => "string",
      Value::Object(o) if o.is_callable() => "function",
      Value::Object(_) => "object",
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Number(value)
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Value::Number(value as f64)
  }
}

impl From<u32> for Value {
  fn from(value: u32) -> Self {
    Value::Number(value as f64)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::str(value)
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(Arc::from(value))
  }
}

impl From<ObjectRef> for Value {
  fn from(value: ObjectRef) -> Self {
    Value::Object(value)
  }
}

impl From<Option<ObjectRef>> for Value {
  fn from(value: Option<ObjectRef>) -> Self {
    match value {
      Some(o) => Value::Object(o),
      None => Value::Null,
    }
  }
}
