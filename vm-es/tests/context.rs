use parse_es::report::CollectingReporter;
use std::any::Any;
use std::sync::Arc;
use vm_es::Context;
use vm_es::ContextOptions;
use vm_es::Feature;
use vm_es::LanguageVersion;
use vm_es::Misuse;
use vm_es::Value;
use vm_es::VmError;

#[test]
fn options_deserialize_with_defaults() {
  let options: ContextOptions =
    serde_json::from_str(r#"{"version": 120, "instruction_threshold": 10}"#).unwrap();
  assert_eq!(options.version, LanguageVersion::V1_2);
  assert_eq!(options.instruction_threshold, 10);
  assert_eq!(options.max_call_depth, ContextOptions::default().max_call_depth);
  assert!(serde_json::from_str::<ContextOptions>(r#"{"version": 125}"#).is_err());
}

#[test]
fn invalid_settings_are_rejected() {
  let cx = Context::new();
  assert!(matches!(
    cx.set_language_version(125),
    Err(VmError::Misuse(Misuse::InvalidVersion(125)))
  ));
  assert!(matches!(
    cx.set_optimization_level(10),
    Err(VmError::Misuse(Misuse::InvalidOptimizationLevel(10)))
  ));
  assert!(cx.set_optimization_level(-1).is_ok());
}

#[test]
fn features_follow_the_language_version() -> Result<(), VmError> {
  let cx = Context::new();
  assert!(!cx.has_feature(Feature::NonEcmaGetYear));
  cx.set_language_version(110)?;
  assert!(cx.has_feature(Feature::NonEcmaGetYear));
  cx.set_feature(Feature::NonEcmaGetYear, false)?;
  assert!(!cx.has_feature(Feature::NonEcmaGetYear));
  Ok(())
}

#[test]
fn sealing_blocks_mutation_until_unsealed() -> Result<(), VmError> {
  let cx = Context::new();
  let key: Arc<dyn Any + Send + Sync> = Arc::new(7u8);
  cx.seal(Some(key.clone()))?;
  assert!(matches!(cx.set_locale("fr"), Err(VmError::Misuse(Misuse::SealedContext))));
  let wrong: Arc<dyn Any + Send + Sync> = Arc::new(7u8);
  assert!(matches!(cx.unseal(&wrong), Err(VmError::Misuse(Misuse::WrongSealKey))));
  cx.unseal(&key)?;
  cx.set_locale("fr")?;
  assert_eq!(cx.locale(), "fr");
  assert!(matches!(cx.unseal(&key), Err(VmError::Misuse(Misuse::NotSealed))));
  Ok(())
}

#[test]
fn keyless_seal_is_permanent() -> Result<(), VmError> {
  let cx = Context::new();
  cx.seal(None)?;
  let any: Arc<dyn Any + Send + Sync> = Arc::new(());
  assert!(matches!(cx.unseal(&any), Err(VmError::Misuse(Misuse::WrongSealKey))));
  assert!(cx.is_sealed());
  Ok(())
}

#[test]
fn security_controller_is_write_once() -> Result<(), VmError> {
  struct Allow;
  impl vm_es::SecurityController for Allow {}

  let cx = Context::new();
  cx.set_security_controller(Arc::new(Allow))?;
  assert!(matches!(
    cx.set_security_controller(Arc::new(Allow)),
    Err(VmError::Misuse(Misuse::WriteOnce(_)))
  ));
  assert!(cx.security_controller().is_some());
  Ok(())
}

#[test]
fn thread_locals() -> Result<(), VmError> {
  let cx = Context::new();
  cx.put_thread_local("k", Arc::new(5i32))?;
  let v = cx.get_thread_local("k").and_then(|v| v.downcast_ref::<i32>().copied());
  assert_eq!(v, Some(5));
  cx.remove_thread_local("k")?;
  assert!(cx.get_thread_local("k").is_none());
  Ok(())
}

#[test]
fn compile_errors_go_to_the_reporter() -> Result<(), VmError> {
  let cx = Context::new();
  let reporter = Arc::new(CollectingReporter::new());
  cx.set_error_reporter(reporter.clone())?;
  let err = cx.compile_script("var a = ;\nvar b = ;", "errs.js", 1).unwrap_err();
  match err {
    VmError::Compile(e) => {
      assert_eq!(e.source_name(), "errs.js");
      assert!(e.message().contains("syntax error"));
    }
    other => panic!("expected a compile error, got {other:?}"),
  };
  assert!(!reporter.errors().is_empty());
  Ok(())
}

#[test]
fn compilable_units() {
  let cx = Context::new();
  assert!(cx.string_is_compilable_unit("var a = 1;"));
  assert!(!cx.string_is_compilable_unit("function f() {"));
  assert!(!cx.string_is_compilable_unit("var s = 'abc"));
  assert!(cx.string_is_compilable_unit("var = 1;"));
}

#[test]
fn compile_function_requires_a_single_function() -> Result<(), VmError> {
  let cx = Context::new();
  let global = cx.init_standard_objects(None, false)?;
  let f = cx.compile_function(&global, "function twice(x) { return x * 2; }", "f.js", 1)?;
  global.define_property("twice", f, vm_es::Attributes::EMPTY)?;
  assert_eq!(cx.evaluate_string(&global, "twice(21)", "use.js", 1)?, Value::Number(42.0));
  assert!(matches!(
    cx.compile_function(&global, "var x = 1;", "f.js", 1),
    Err(VmError::Misuse(Misuse::InvalidCompileArguments(_)))
  ));
  Ok(())
}

#[test]
fn evaluate_reader() -> Result<(), VmError> {
  let cx = Context::new();
  let global = cx.init_standard_objects(None, false)?;
  let mut src = "6 * 7".as_bytes();
  assert_eq!(cx.evaluate_reader(&global, &mut src, "r.js", 1)?, Value::Number(42.0));
  Ok(())
}

#[test]
fn host_functions_are_callable_from_scripts() -> Result<(), VmError> {
  let cx = Context::new();
  let global = cx.init_standard_objects(None, false)?;
  let f = vm_es::new_host_function(&global, "hostAdd", 2, |cx, _this, args| {
    let mut sum = 0.0;
    for a in args {
      sum += vm_es::coerce::to_number(cx, a)?;
    }
    Ok(Value::Number(sum))
  })?;
  global.define_property("hostAdd", f, vm_es::Attributes::DONTENUM)?;
  assert_eq!(
    cx.evaluate_string(&global, "hostAdd(1, '2', true)", "host.js", 1)?,
    Value::Number(4.0)
  );
  Ok(())
}
