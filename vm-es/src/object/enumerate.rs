use super::ObjectRef;
use crate::property::Attributes;
use crate::property::PropertyKey;
use crate::value::Value;
use ahash::HashSet;
use ahash::HashSetExt;

/// The state of a for-in loop.
///
/// Each level of the prototype chain is snapshotted when the enumeration reaches it. Every key of a level is marked as seen, enumerable or not, so a nearer definition decides whether a key is visited at all.
#[derive(Debug)]
pub struct IdEnumeration {
  obj: Option<ObjectRef>,
  ids: Vec<PropertyKey>,
  index: usize,
  seen: HashSet<PropertyKey>,
  current: Option<PropertyKey>,
}

impl IdEnumeration {
  /// Enumerates `obj` and its prototypes. `None` gives an empty enumeration.
  pub fn new(obj: Option<ObjectRef>) -> IdEnumeration {
    let ids = obj.as_ref().map(|o| o.get_all_ids()).unwrap_or_default();
    IdEnumeration {
      obj,
      ids,
      index: 0,
      seen: HashSet::new(),
      current: None,
    }
  }

  /// Moves to the next key. Returns false once every level is exhausted.
  pub fn next(&mut self) -> bool {
    loop {
      let Some(obj) = &self.obj else {
        self.current = None;
        return false;
      };
      while self.index < self.ids.len() {
        let id = self.ids[self.index].clone();
        self.index += 1;
        if !self.seen.insert(id.clone()) {
          continue;
        };
        match obj.get_attributes(&id) {
          // Deleted since the snapshot.
          None => continue,
          Some(attrs) if attrs.contains(Attributes::DONTENUM) => continue,
          Some(_) => {}
        };
        self.current = Some(id);
        return true;
      }
      self.obj = obj.prototype();
      self.ids = self.obj.as_ref().map(|o| o.get_all_ids()).unwrap_or_default();
      self.index = 0;
    }
  }

  /// The current key as a string, or undefined before the first call to `next` and after the last.
  pub fn current(&self) -> Value {
    match &self.current {
      Some(id) => id.to_value(),
      None => Value::Undefined,
    }
  }
}
