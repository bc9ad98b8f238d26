//! Association of Contexts with units of execution.

use crate::context::Context;
use crate::error::Misuse;
use crate::error::VmError;
use ahash::HashMap;
use ahash::HashMapExt;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::cell::Cell;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
  static THREAD_UNIT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Identifies a unit of execution, normally a thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u64);

impl UnitId {
  /// The id of the calling thread, assigned on first use.
  pub fn current() -> UnitId {
    THREAD_UNIT_ID.with(|id| {
      if id.get() == 0 {
        id.set(NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed));
      };
      UnitId(id.get())
    })
  }

  /// A fresh id that is never returned by [`UnitId::current`]. Lets tests model several units on one thread.
  pub fn fresh() -> UnitId {
    UnitId(NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed))
  }
}

/// Lifecycle notifications. Every method does nothing by default.
pub trait ContextListener: Send + Sync {
  /// The Context was associated with a unit for the first time.
  fn context_created(&self, _cx: &Arc<Context>) {}

  /// Called on every `enter`, including nested ones.
  fn context_entered(&self, _cx: &Arc<Context>, _unit: UnitId) {}

  fn context_exited(&self, _cx: &Arc<Context>, _unit: UnitId) {}

  /// The Context is no longer associated with any unit.
  fn context_released(&self, _cx: &Arc<Context>) {}
}

struct Active {
  cx: Arc<Context>,
  count: u32,
}

enum Event {
  Created,
  Entered(UnitId),
  Exited(UnitId),
  Released,
}

/// Tracks which Context is active on which unit.
pub struct RuntimeRegistry {
  active: Mutex<HashMap<UnitId, Active>>,
  listeners: Mutex<Vec<Arc<dyn ContextListener>>>,
  listening_disabled: AtomicBool,
}

static GLOBAL: Lazy<RuntimeRegistry> = Lazy::new(RuntimeRegistry::new);

impl Default for RuntimeRegistry {
  fn default() -> Self {
    RuntimeRegistry::new()
  }
}

impl RuntimeRegistry {
  pub fn new() -> RuntimeRegistry {
    RuntimeRegistry {
      active: Mutex::new(HashMap::new()),
      listeners: Mutex::new(Vec::new()),
      listening_disabled: AtomicBool::new(false),
    }
  }

  /// The process-wide registry.
  pub fn global() -> &'static RuntimeRegistry {
    &GLOBAL
  }

  /// Associates a Context with `unit`, or re-enters the one already active there.
  ///
  /// When nothing is active, `cx` is used, or a new Context is created if it is None. A Context active on another unit, or a sealed one, cannot be associated.
  pub fn enter(&self, unit: UnitId, cx: Option<Arc<Context>>) -> Result<Arc<Context>, VmError> {
    let mut events = Vec::new();
    let cx = {
      let mut active = self.active.lock();
      if let Some(current) = active.get_mut(&unit) {
        if let Some(requested) = &cx {
          if !Arc::ptr_eq(requested, &current.cx) {
            return Err(Misuse::OtherContextActive.into());
          };
        };
        current.count += 1;
        current.cx.clone()
      } else {
        let cx = cx.unwrap_or_else(|| Arc::new(Context::new()));
        if active.values().any(|a| Arc::ptr_eq(&a.cx, &cx)) {
          return Err(Misuse::ContextActiveElsewhere.into());
        };
        if cx.is_sealed() {
          return Err(Misuse::SealedContextEnter.into());
        };
        active.insert(unit, Active {
          cx: cx.clone(),
          count: 1,
        });
        tracing::debug!(unit = unit.0, "context associated");
        if !cx.created_notified.swap(true, Ordering::AcqRel) {
          tracing::debug!(unit = unit.0, "context created");
          events.push(Event::Created);
        };
        cx
      }
    };
    events.push(Event::Entered(unit));
    self.notify(&cx, &events);
    Ok(cx)
  }

  /// Leaves the Context active on `unit`. The last exit releases it.
  pub fn exit(&self, unit: UnitId) -> Result<(), VmError> {
    let (cx, released) = {
      let mut active = self.active.lock();
      let Some(current) = active.get_mut(&unit) else {
        return Err(Misuse::ExitWithoutEnter.into());
      };
      current.count -= 1;
      let cx = current.cx.clone();
      let released = current.count == 0;
      if released {
        active.remove(&unit);
        tracing::debug!(unit = unit.0, "context released");
      };
      (cx, released)
    };
    let mut events = vec![Event::Exited(unit)];
    if released {
      events.push(Event::Released);
    };
    self.notify(&cx, &events);
    Ok(())
  }

  /// The Context active on `unit`.
  pub fn current(&self, unit: UnitId) -> Option<Arc<Context>> {
    self.active.lock().get(&unit).map(|a| a.cx.clone())
  }

  /// How many times `unit` has entered without exiting.
  pub fn enter_count(&self, unit: UnitId) -> u32 {
    self.active.lock().get(&unit).map_or(0, |a| a.count)
  }

  /// Runs `f` with a Context entered on the calling thread, exiting afterwards even if `f` fails.
  pub fn call<T>(
    &self,
    cx: Option<Arc<Context>>,
    f: impl FnOnce(&Context) -> Result<T, VmError>,
  ) -> Result<T, VmError> {
    let unit = UnitId::current();
    let cx = self.enter(unit, cx)?;
    let res = f(&cx);
    self.exit(unit)?;
    res
  }

  pub fn add_listener(&self, listener: Arc<dyn ContextListener>) {
    if self.listening_disabled.load(Ordering::Acquire) {
      return;
    };
    self.listeners.lock().push(listener);
  }

  pub fn remove_listener(&self, listener: &Arc<dyn ContextListener>) {
    self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
  }

  /// Drops every listener and ignores any added later.
  pub fn disable_listening(&self) {
    self.listening_disabled.store(true, Ordering::Release);
    self.listeners.lock().clear();
  }

  // Listeners run on a snapshot of the list, without the registry or listener locks held.
  fn notify(&self, cx: &Arc<Context>, events: &[Event]) {
    if self.listening_disabled.load(Ordering::Acquire) {
      return;
    };
    let listeners = self.listeners.lock().clone();
    for event in events {
      for l in &listeners {
        match event {
          Event::Created => l.context_created(cx),
          Event::Entered(unit) => l.context_entered(cx, *unit),
          Event::Exited(unit) => l.context_exited(cx, *unit),
          Event::Released => l.context_released(cx),
        };
      }
    }
  }
}
