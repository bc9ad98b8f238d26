use crate::object::ClassTag;
use crate::object::ObjectRef;
use crate::value::Value;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::BitOr;
use std::sync::Arc;

/// The key of an object slot: an array index or any other name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
  Index(u32),
  Name(Arc<str>),
}

impl PropertyKey {
  /// Routes a name to an index key when it is the canonical decimal form of an array index.
  pub fn from_name(name: &str) -> PropertyKey {
    match array_index(name) {
      Some(i) => PropertyKey::Index(i),
      None => PropertyKey::Name(Arc::from(name)),
    }
  }

  /// The key for a numeric property name. Non-index numbers use their string form.
  pub fn from_number(n: f64) -> PropertyKey {
    if n >= 0.0 && n < u32::MAX as f64 && n.fract() == 0.0 {
      // -0 lands here too and is the index 0.
      return PropertyKey::Index(n as u32);
    };
    PropertyKey::Name(Arc::from(parse_es::num::number_to_string(n)))
  }

  pub fn as_name(&self) -> Option<&str> {
    match self {
      PropertyKey::Name(n) => Some(n),
      PropertyKey::Index(_) => None,
    }
  }

  pub fn is(&self, name: &str) -> bool {
    self.as_name() == Some(name)
  }

  /// Slot hash: the 31-multiplier hash over UTF-16 code units, or the index itself.
  pub fn hash_code(&self) -> u32 {
    match self {
      PropertyKey::Index(i) => *i,
      PropertyKey::Name(n) => n
        .encode_utf16()
        .fold(0u32, |h, u| h.wrapping_mul(31).wrapping_add(u as u32)),
    }
  }

  pub fn to_value(&self) -> Value {
    match self {
      PropertyKey::Index(i) => Value::String(Arc::from(i.to_string())),
      PropertyKey::Name(n) => Value::String(n.clone()),
    }
  }
}

impl Display for PropertyKey {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      PropertyKey::Index(i) => write!(f, "{i}"),
      PropertyKey::Name(n) => f.write_str(n),
    }
  }
}

impl From<&str> for PropertyKey {
  fn from(name: &str) -> Self {
    PropertyKey::from_name(name)
  }
}

impl From<u32> for PropertyKey {
  fn from(index: u32) -> Self {
    PropertyKey::Index(index)
  }
}

/// Parses a canonical array index: decimal digits without leading zeros, below 2^32 - 1.
pub fn array_index(s: &str) -> Option<u32> {
  let bytes = s.as_bytes();
  if bytes.is_empty() || bytes.len() > 10 || !bytes.iter().all(u8::is_ascii_digit) {
    return None;
  };
  if bytes.len() > 1 && bytes[0] == b'0' {
    return None;
  };
  let v: u64 = s.parse().ok()?;
  if v >= u32::MAX as u64 {
    return None;
  };
  Some(v as u32)
}

/// Slot attribute bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attributes(u8);

impl Attributes {
  pub const EMPTY: Attributes = Attributes(0);
  /// Writes are ignored.
  pub const READONLY: Attributes = Attributes(1);
  /// Hidden from for-in and `get_ids`.
  pub const DONTENUM: Attributes = Attributes(2);
  /// Cannot be deleted.
  pub const PERMANENT: Attributes = Attributes(4);

  pub fn from_bits(bits: u8) -> Attributes {
    Attributes(bits & 7)
  }

  pub fn bits(self) -> u8 {
    self.0
  }

  pub const fn union(self, other: Attributes) -> Attributes {
    Attributes(self.0 | other.0)
  }

  pub fn contains(self, other: Attributes) -> bool {
    self.0 & other.0 == other.0
  }
}

impl BitOr for Attributes {
  type Output = Attributes;

  fn bitor(self, rhs: Attributes) -> Attributes {
    Attributes(self.0 | rhs.0)
  }
}

/// Type hint for default-value conversion and for coercing a setter's argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hint {
  Boolean,
  Number,
  String,
}

/// A getter/setter pair stored in a slot.
#[derive(Debug, Clone, Default)]
pub struct Accessor {
  pub getter: Option<ObjectRef>,
  pub setter: Option<ObjectRef>,
  /// When set, accessors are invoked with this object as `this` instead of the receiver.
  pub delegate: Option<ObjectRef>,
  /// Accessors expect `this` to be of this class; the nearest object on the receiver's prototype chain with this class is used.
  pub receiver_class: Option<ClassTag>,
  /// Coercion applied to the value before it is passed to the setter.
  pub setter_hint: Option<Hint>,
}
