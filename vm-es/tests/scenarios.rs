use vm_es::Context;
use vm_es::EcmaErrorKind;
use vm_es::Misuse;
use vm_es::ObjectRef;
use vm_es::Value;
use vm_es::VmError;

fn setup() -> Result<(Context, ObjectRef), VmError> {
  let cx = Context::new();
  let global = cx.init_standard_objects(None, false)?;
  Ok((cx, global))
}

#[test]
fn numeric_literals_with_legacy_octal() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  let v = cx.evaluate_string(&global, "0x1F + 010 + 1e2", "a.js", 1)?;
  assert_eq!(v, Value::Number(139.0));
  Ok(())
}

#[test]
fn for_in_visits_each_key_once() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  let v = cx.evaluate_string(
    &global,
    r#"var s=""; for (var k in {a:1,b:2}) s+=k; s"#,
    "b.js",
    1,
  )?;
  let s = v.as_str().unwrap_or_default().to_string();
  assert_eq!(s.len(), 2);
  assert!(s.contains('a') && s.contains('b'));
  Ok(())
}

#[test]
fn for_in_tolerates_deleting_the_current_key() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  let v = cx.evaluate_string(
    &global,
    r#"
      var o = {a:1, b:2, c:3};
      var s = "";
      for (var k in o) { s += k; delete o[k]; }
      s
    "#,
    "b.js",
    1,
  )?;
  assert_eq!(v, Value::str("abc"));
  let v = cx.evaluate_string(&global, "var n = 0; for (var k in o) n++; n", "b.js", 1)?;
  assert_eq!(v, Value::Number(0.0));
  Ok(())
}

#[test]
fn for_in_skips_keys_deleted_before_they_are_reached() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  let v = cx.evaluate_string(
    &global,
    r#"
      var o = {a:1, b:2, c:3};
      var s = "";
      for (var k in o) { s += k; delete o.b; }
      s
    "#,
    "b.js",
    1,
  )?;
  assert_eq!(v, Value::str("ac"));
  Ok(())
}

#[test]
fn try_catch_finally_ordering() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  let v = cx.evaluate_string(
    &global,
    r#"var log=""; try { log+="T"; throw 1; } catch (e) { log+="C"; } finally { log+="F"; } log"#,
    "c.js",
    1,
  )?;
  assert_eq!(v, Value::str("TCF"));
  Ok(())
}

#[test]
fn undeclared_assignment_creates_global() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  cx.evaluate_string(&global, "x = 5;", "d.js", 1)?;
  let v = cx.evaluate_string(&global, "typeof x", "d.js", 2)?;
  assert_eq!(v, Value::str("number"));
  assert_eq!(global.get_value(&"x".into()), Some(Value::Number(5.0)));

  let err = cx.evaluate_string(&global, "y;", "d.js", 3).unwrap_err();
  match err {
    VmError::Ecma(e) => {
      assert_eq!(e.kind, EcmaErrorKind::ReferenceError);
      assert!(e.message.contains('y'));
    }
    other => panic!("expected a ReferenceError, got {other:?}"),
  };
  Ok(())
}

#[test]
fn undeclared_assignment_inside_function_creates_global() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  cx.evaluate_string(&global, "function f() { z = 1; } f();", "d.js", 1)?;
  assert_eq!(global.get_value(&"z".into()), Some(Value::Number(1.0)));
  Ok(())
}

#[test]
fn sealed_object_rejects_new_keys_but_allows_updates() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  cx.evaluate_string(&global, "var o = {a: 1};", "e.js", 1)?;
  let o = match global.get_value(&"o".into()) {
    Some(Value::Object(o)) => o,
    other => panic!("expected an object, got {other:?}"),
  };
  o.seal();

  let err = cx.evaluate_string(&global, "o.b = 2;", "e.js", 2).unwrap_err();
  assert!(matches!(err, VmError::Misuse(Misuse::SealedObjectAdd(_))));

  let v = cx.evaluate_string(&global, "o.a = 3; o.a", "e.js", 3)?;
  assert_eq!(v, Value::Number(3.0));
  Ok(())
}

#[test]
fn sealed_standard_objects() -> Result<(), VmError> {
  let cx = Context::new();
  let global = cx.init_standard_objects(None, true)?;
  let err = cx
    .evaluate_string(&global, "Object.prototype.extra = 1;", "e.js", 1)
    .unwrap_err();
  assert!(matches!(err, VmError::Misuse(Misuse::SealedObjectAdd(_))));
  // The global object itself stays open.
  let v = cx.evaluate_string(&global, "var fresh = 2; fresh", "e.js", 2)?;
  assert_eq!(v, Value::Number(2.0));
  Ok(())
}
