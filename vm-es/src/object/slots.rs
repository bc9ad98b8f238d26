//! Open-addressed slot storage for object properties.
//!
//! Slots live in a power-of-two array probed linearly. Deleting a slot leaves a tombstone so that probe sequences through it stay intact; tombstones count towards the load factor and are purged when the table is rebuilt. Each slot's value sits behind its own lock, so once a slot has been found its value can be read or written without holding the table.

use crate::property::Accessor;
use crate::property::Attributes;
use crate::property::PropertyKey;
use crate::value::Value;
use parking_lot::RwLock;
use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const MIN_CAPACITY: usize = 8;

#[derive(Debug, Clone)]
pub enum SlotValue {
  Value(Value),
  Accessor(Accessor),
}

#[derive(Debug)]
pub struct Slot {
  key: PropertyKey,
  hash: u32,
  // Insertion sequence number, used to list ids in definition order.
  order: u64,
  attrs: AtomicU8,
  value: RwLock<SlotValue>,
}

impl Slot {
  pub fn key(&self) -> &PropertyKey {
    &self.key
  }

  pub fn attributes(&self) -> Attributes {
    Attributes::from_bits(self.attrs.load(Ordering::Acquire))
  }

  pub fn set_attributes(&self, attrs: Attributes) {
    self.attrs.store(attrs.bits(), Ordering::Release);
  }

  pub fn has(&self, attr: Attributes) -> bool {
    self.attributes().contains(attr)
  }

  pub fn load(&self) -> SlotValue {
    self.value.read().clone()
  }

  pub fn store(&self, value: SlotValue) {
    *self.value.write() = value;
  }
}

#[derive(Debug)]
enum Entry {
  Empty,
  Removed,
  Live(Arc<Slot>),
}

#[derive(Debug, Default)]
pub struct SlotTable {
  entries: Vec<Entry>,
  live: usize,
  // Live slots plus tombstones.
  used: usize,
  next_order: u64,
  last_access: Option<Arc<Slot>>,
}

impl SlotTable {
  pub fn new() -> SlotTable {
    SlotTable::default()
  }

  pub fn len(&self) -> usize {
    self.live
  }

  pub fn is_empty(&self) -> bool {
    self.live == 0
  }

  pub fn capacity(&self) -> usize {
    self.entries.len()
  }

  pub fn tombstones(&self) -> usize {
    self.used - self.live
  }

  // Index of the live slot for `key`, or the position where it would be inserted.
  fn probe(&self, key: &PropertyKey, hash: u32) -> Result<usize, usize> {
    let mask = self.entries.len() - 1;
    let mut i = hash as usize & mask;
    let mut first_removed = None;
    loop {
      match &self.entries[i] {
        Entry::Empty => return Err(first_removed.unwrap_or(i)),
        Entry::Removed => {
          first_removed.get_or_insert(i);
        }
        Entry::Live(slot) => {
          if slot.hash == hash && slot.key == *key {
            return Ok(i);
          };
        }
      };
      i = (i + 1) & mask;
    }
  }

  pub fn lookup(&mut self, key: &PropertyKey) -> Option<Arc<Slot>> {
    if let Some(last) = &self.last_access {
      if last.key == *key {
        return Some(last.clone());
      };
    };
    if self.entries.is_empty() {
      return None;
    };
    let i = self.probe(key, key.hash_code()).ok()?;
    let Entry::Live(slot) = &self.entries[i] else {
      return None;
    };
    let slot = slot.clone();
    self.last_access = Some(slot.clone());
    Some(slot)
  }

  /// Adds a slot for `key`, which must not already be present.
  pub fn insert(&mut self, key: PropertyKey, value: SlotValue, attrs: Attributes) -> Arc<Slot> {
    if (self.used + 1) * 4 > self.entries.len() * 3 {
      self.rebuild();
    };
    let hash = key.hash_code();
    let pos = match self.probe(&key, hash) {
      Ok(i) | Err(i) => i,
    };
    let slot = Arc::new(Slot {
      key,
      hash,
      order: self.next_order,
      attrs: AtomicU8::new(attrs.bits()),
      value: RwLock::new(value),
    });
    self.next_order += 1;
    if matches!(self.entries[pos], Entry::Empty) {
      self.used += 1;
    };
    self.entries[pos] = Entry::Live(slot.clone());
    self.live += 1;
    self.last_access = Some(slot.clone());
    slot
  }

  pub fn remove(&mut self, key: &PropertyKey) -> Option<Arc<Slot>> {
    if self.entries.is_empty() {
      return None;
    };
    let i = self.probe(key, key.hash_code()).ok()?;
    let Entry::Live(slot) = std::mem::replace(&mut self.entries[i], Entry::Removed) else {
      return None;
    };
    self.live -= 1;
    if matches!(&self.last_access, Some(last) if Arc::ptr_eq(last, &slot)) {
      self.last_access = None;
    };
    Some(slot)
  }

  /// Live slots in the order they were added.
  pub fn slots(&self) -> Vec<Arc<Slot>> {
    let mut slots: Vec<Arc<Slot>> = self
      .entries
      .iter()
      .filter_map(|e| match e {
        Entry::Live(s) => Some(s.clone()),
        _ => None,
      })
      .collect();
    slots.sort_by_key(|s| s.order);
    slots
  }

  // Reinserts every live slot into a table sized for one more, dropping all tombstones.
  fn rebuild(&mut self) {
    let mut capacity = MIN_CAPACITY;
    while (self.live + 1) * 4 > capacity * 3 || capacity < (self.live + 1) * 2 {
      capacity *= 2;
    }
    let old = std::mem::take(&mut self.entries);
    self.entries = (0..capacity).map(|_| Entry::Empty).collect();
    self.used = 0;
    for entry in old {
      let Entry::Live(slot) = entry else {
        continue;
      };
      let pos = match self.probe(&slot.key, slot.hash) {
        Ok(i) | Err(i) => i,
      };
      self.entries[pos] = Entry::Live(slot);
      self.used += 1;
    }
  }
}
