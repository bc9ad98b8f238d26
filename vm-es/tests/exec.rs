use vm_es::Context;
use vm_es::EcmaErrorKind;
use vm_es::ObjectRef;
use vm_es::Value;
use vm_es::VmError;

fn setup() -> Result<(Context, ObjectRef), VmError> {
  let cx = Context::new();
  let global = cx.init_standard_objects(None, false)?;
  Ok((cx, global))
}

fn eval(src: &str) -> Result<Value, VmError> {
  let (cx, global) = setup()?;
  cx.evaluate_string(&global, src, "exec.js", 1)
}

fn num(src: &str) -> f64 {
  match eval(src) {
    Ok(Value::Number(n)) => n,
    other => panic!("{src}: expected a number, got {other:?}"),
  }
}

fn string(src: &str) -> String {
  match eval(src) {
    Ok(Value::String(s)) => s.to_string(),
    other => panic!("{src}: expected a string, got {other:?}"),
  }
}

#[test]
fn completion_value_is_the_last_expression() {
  assert_eq!(num("1; 2; 3"), 3.0);
  assert_eq!(num("var a = 4; if (a > 2) a * 2; else a;"), 8.0);
}

#[test]
fn loops_and_labels() {
  assert_eq!(num("var s = 0; for (var i = 0; i < 5; i++) s += i; s"), 10.0);
  assert_eq!(num("var i = 0; while (i < 7) i++; i"), 7.0);
  assert_eq!(num("var i = 0; do { i++; } while (i < 0); i"), 1.0);
  assert_eq!(
    num(
      r#"
        var n = 0;
        outer: for (var i = 0; i < 3; i++) {
          for (var j = 0; j < 3; j++) {
            if (j == 1) continue outer;
            if (i == 2) break outer;
            n++;
          }
        }
        n
      "#
    ),
    2.0
  );
}

#[test]
fn switch_falls_through_and_uses_strict_equality() {
  let src = r#"
    function f(x) {
      var s = "";
      switch (x) {
        case 1: s += "one";
        case "2": s += "two"; break;
        default: s += "other";
        case 3: s += "three";
      }
      return s;
    }
    [f(1), f("2"), f(2), f(3)].join("|")
  "#;
  assert_eq!(string(src), "onetwo|two|otherthree|three");
}

#[test]
fn functions_and_closures() {
  assert_eq!(num("function add(a, b) { return a + b; } add(2, 3)"), 5.0);
  assert_eq!(
    num(
      r#"
        function counter() { var n = 0; return function () { return ++n; }; }
        var c = counter(); c(); c(); c()
      "#
    ),
    3.0
  );
  // Function declarations are hoisted above their use.
  assert_eq!(num("var r = later(); function later() { return 9; } r"), 9.0);
  assert_eq!(num("function f() { return arguments.length; } f(1, 2, 3)"), 3.0);
  assert_eq!(eval("function f(a, b) { return b; } f(1)").unwrap(), Value::Undefined);
  assert_eq!(
    num("var fact = function me(n) { return n <= 1 ? 1 : n * me(n - 1); }; fact(5)"),
    120.0
  );
}

#[test]
fn constructors_and_prototypes() {
  let src = r#"
    function Point(x, y) { this.x = x; this.y = y; }
    Point.prototype.sum = function () { return this.x + this.y; };
    var p = new Point(3, 4);
    p.sum() + (p instanceof Point ? 100 : 0) + (p.constructor == Point ? 1000 : 0)
  "#;
  assert_eq!(num(src), 1107.0);
  // An object returned from a constructor replaces the new instance.
  assert_eq!(num("function F() { return {v: 2}; } new F().v"), 2.0);
}

#[test]
fn this_binding() {
  assert_eq!(string("var o = {n: 'o', f: function () { return this.n; }}; o.f()"), "o");
  // A plain call sees the global object.
  assert_eq!(string("var n = 'global'; function f() { return this.n; } f()"), "global");
  assert_eq!(
    string("function f() { return this.n; } f.call({n: 'called'})"),
    "called"
  );
}

#[test]
fn with_statement_resolves_names_on_its_target() {
  assert_eq!(num("var o = {a: 2}; var r; with (o) { r = a * 5; a = 7; } r + o.a"), 17.0);
}

#[test]
fn exceptions_propagate_and_are_caught() {
  assert_eq!(
    string("var r; try { null.x; } catch (e) { r = e instanceof TypeError ? e.name : 'wrong'; } r"),
    "TypeError"
  );
  assert_eq!(
    string("var r; try { missing; } catch (e) { r = e instanceof ReferenceError ? 'ref' : 'wrong'; } r"),
    "ref"
  );
  assert_eq!(
    num("function f() { try { return 1; } finally { return 2; } } f()"),
    2.0
  );
  assert_eq!(
    string(
      r#"
        var log = "";
        function f() { try { throw "x"; } finally { log += "f"; } }
        try { f(); } catch (e) { log += e; }
        log
      "#
    ),
    "fx"
  );
  // The catch variable is scoped to the handler.
  assert_eq!(string("var e = 'outer'; try { throw 'inner'; } catch (e) {} e"), "outer");
}

#[test]
fn uncaught_throw_reaches_the_host() {
  match eval("throw 42;") {
    Err(VmError::Throw(v)) => assert_eq!(v, Value::Number(42.0)),
    other => panic!("expected a thrown value, got {other:?}"),
  };
  match eval("undefined.x") {
    Err(VmError::Ecma(e)) => assert_eq!(e.kind, EcmaErrorKind::TypeError),
    other => panic!("expected a TypeError, got {other:?}"),
  };
  match eval("var n = 1; n()") {
    Err(VmError::Ecma(e)) => {
      assert_eq!(e.kind, EcmaErrorKind::TypeError);
      assert!(e.message.contains("not a function"));
    }
    other => panic!("expected a TypeError, got {other:?}"),
  };
}

#[test]
fn operators() {
  assert_eq!(string("'a' + 1 + 2"), "a12");
  assert_eq!(num("1 + 2 + '3' - 0"), 33.0);
  assert_eq!(num("7 % 3 + (-7 % 3)"), 0.0);
  assert_eq!(num("1 << 31 >>> 0"), 2147483648.0);
  assert_eq!(num("~5 & 0xff ^ 1"), 251.0);
  assert_eq!(eval("null == undefined").unwrap(), Value::Bool(true));
  assert_eq!(eval("null === undefined").unwrap(), Value::Bool(false));
  assert_eq!(eval("'10' < '9'").unwrap(), Value::Bool(true));
  assert_eq!(eval("10 < 9").unwrap(), Value::Bool(false));
  assert_eq!(eval("'b' in {b: 1}").unwrap(), Value::Bool(true));
  assert_eq!(string("typeof undeclared"), "undefined");
  assert_eq!(string("typeof function () {}"), "function");
  assert_eq!(string("typeof null"), "object");
  assert_eq!(eval("void 0").unwrap(), Value::Undefined);
  assert_eq!(num("var i = 1; var j = i++ + ++i; j * 10 + i"), 43.0);
  assert_eq!(num("var a = [1]; a[0] += 4; a[0]"), 5.0);
  assert_eq!(eval("var o = {p: 1}; delete o.p; 'p' in o").unwrap(), Value::Bool(false));
}

#[test]
fn scripts_share_the_global_scope() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  cx.evaluate_string(&global, "var shared = 1; function inc() { shared++; }", "one.js", 1)?;
  cx.evaluate_string(&global, "inc(); inc();", "two.js", 1)?;
  assert_eq!(cx.evaluate_string(&global, "shared", "three.js", 1)?, Value::Number(3.0));
  Ok(())
}

#[test]
fn compiled_script_runs_repeatedly() -> Result<(), VmError> {
  let (cx, global) = setup()?;
  let script = cx.compile_script("var count = (typeof count == 'number') ? count + 1 : 1; count", "s.js", 1)?;
  assert_eq!(script.exec(&cx, &global)?, Value::Number(1.0));
  assert_eq!(script.exec(&cx, &global)?, Value::Number(2.0));
  Ok(())
}

#[test]
fn syntax_errors_fail_compilation() {
  let cx = Context::new();
  match cx.compile_script("var = ;", "bad.js", 1) {
    Err(VmError::Compile(e)) => assert!(e.message().contains("syntax error")),
    other => panic!("expected a compile error, got {other:?}"),
  };
}
