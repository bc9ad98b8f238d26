use parking_lot::Mutex;
use std::sync::Arc;
use vm_es::Context;
use vm_es::ContextListener;
use vm_es::Misuse;
use vm_es::RuntimeRegistry;
use vm_es::UnitId;
use vm_es::VmError;

#[derive(Default)]
struct Recorder {
  events: Mutex<Vec<String>>,
}

impl ContextListener for Recorder {
  fn context_created(&self, _cx: &Arc<Context>) {
    self.events.lock().push("created".to_string());
  }

  fn context_entered(&self, _cx: &Arc<Context>, _unit: UnitId) {
    self.events.lock().push("entered".to_string());
  }

  fn context_exited(&self, _cx: &Arc<Context>, _unit: UnitId) {
    self.events.lock().push("exited".to_string());
  }

  fn context_released(&self, _cx: &Arc<Context>) {
    self.events.lock().push("released".to_string());
  }
}

#[test]
fn nested_enter_reuses_the_active_context() -> Result<(), VmError> {
  let registry = RuntimeRegistry::new();
  let unit = UnitId::fresh();
  let a = registry.enter(unit, None)?;
  let b = registry.enter(unit, None)?;
  assert!(Arc::ptr_eq(&a, &b));
  assert_eq!(registry.enter_count(unit), 2);
  registry.exit(unit)?;
  assert!(registry.current(unit).is_some());
  registry.exit(unit)?;
  assert!(registry.current(unit).is_none());
  assert!(matches!(registry.exit(unit), Err(VmError::Misuse(Misuse::ExitWithoutEnter))));
  Ok(())
}

#[test]
fn context_is_active_on_one_unit_at_a_time() -> Result<(), VmError> {
  let registry = RuntimeRegistry::new();
  let (u1, u2) = (UnitId::fresh(), UnitId::fresh());
  let cx = registry.enter(u1, None)?;
  assert!(matches!(
    registry.enter(u2, Some(cx.clone())),
    Err(VmError::Misuse(Misuse::ContextActiveElsewhere))
  ));
  assert!(matches!(
    registry.enter(u1, Some(Arc::new(Context::new()))),
    Err(VmError::Misuse(Misuse::OtherContextActive))
  ));
  registry.exit(u1)?;
  // Once released it may move to another unit.
  let moved = registry.enter(u2, Some(cx.clone()))?;
  assert!(Arc::ptr_eq(&moved, &cx));
  registry.exit(u2)?;
  Ok(())
}

#[test]
fn sealed_context_cannot_be_entered() -> Result<(), VmError> {
  let registry = RuntimeRegistry::new();
  let cx = Arc::new(Context::new());
  cx.seal(None)?;
  assert!(matches!(
    registry.enter(UnitId::fresh(), Some(cx)),
    Err(VmError::Misuse(Misuse::SealedContextEnter))
  ));
  Ok(())
}

#[test]
fn listeners_see_the_lifecycle() -> Result<(), VmError> {
  let registry = RuntimeRegistry::new();
  let recorder = Arc::new(Recorder::default());
  let listener: Arc<dyn ContextListener> = recorder.clone();
  registry.add_listener(listener.clone());

  let unit = UnitId::fresh();
  let cx = registry.enter(unit, None)?;
  registry.enter(unit, None)?;
  registry.exit(unit)?;
  registry.exit(unit)?;
  // Re-associating the same Context does not report creation again.
  registry.enter(unit, Some(cx))?;
  registry.exit(unit)?;

  assert_eq!(*recorder.events.lock(), vec![
    "created", "entered", "entered", "exited", "exited", "released", "entered", "exited", "released",
  ]);

  registry.remove_listener(&listener);
  registry.enter(unit, None)?;
  registry.exit(unit)?;
  assert_eq!(recorder.events.lock().len(), 9);
  Ok(())
}

#[test]
fn disabled_listening_ignores_new_listeners() -> Result<(), VmError> {
  let registry = RuntimeRegistry::new();
  registry.disable_listening();
  let recorder = Arc::new(Recorder::default());
  registry.add_listener(recorder.clone());
  let unit = UnitId::fresh();
  registry.enter(unit, None)?;
  registry.exit(unit)?;
  assert!(recorder.events.lock().is_empty());
  Ok(())
}

#[test]
fn call_enters_and_exits_around_the_closure() -> Result<(), VmError> {
  let registry = RuntimeRegistry::new();
  let v = registry.call(None, |cx| {
    let global = cx.init_standard_objects(None, false)?;
    cx.evaluate_string(&global, "1 + 1", "call.js", 1)
  })?;
  assert_eq!(v, vm_es::Value::Number(2.0));
  assert!(registry.current(UnitId::current()).is_none());

  let err = registry.call(None, |cx| {
    let global = cx.init_standard_objects(None, false)?;
    cx.evaluate_string(&global, "throw 1", "call.js", 1)
  });
  assert!(matches!(err, Err(VmError::Throw(_))));
  assert!(registry.current(UnitId::current()).is_none());
  Ok(())
}

#[test]
fn contexts_on_separate_threads() {
  let registry = Arc::new(RuntimeRegistry::new());
  let handles: Vec<_> = (0..4)
    .map(|i| {
      let registry = registry.clone();
      std::thread::spawn(move || {
        registry.call(None, |cx| {
          let global = cx.init_standard_objects(None, false)?;
          cx.evaluate_string(&global, &format!("var n = {i}; n * 2"), "t.js", 1)
        })
      })
    })
    .collect();
  for (i, h) in handles.into_iter().enumerate() {
    let v = h.join().unwrap().unwrap();
    assert_eq!(v, vm_es::Value::Number(i as f64 * 2.0));
  }
}
