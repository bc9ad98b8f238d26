use crate::error::SyntaxErrorType;
use crate::ir::function::FunctionKind;
use crate::ir::function::FunctionNode;
use crate::ir::BinaryOp;
use crate::ir::Expr;
use crate::ir::PropKey;
use crate::ir::Stmt;
use crate::ir::UnaryOp;
use crate::parse_program;
use crate::parse_script;
use crate::report::CollectingReporter;
use crate::report::Diagnostic;
use crate::ParseOptions;
use serde_json::json;
use serde_json::Value;
use similar::ChangeTag;
use similar::TextDiff;
use std::sync::Arc;

fn parse_with(source: &str, options: ParseOptions) -> Arc<FunctionNode> {
  let reporter = CollectingReporter::new();
  let script = parse_program(source, options, &reporter);
  assert!(reporter.errors().is_empty(), "unexpected errors: {:?}", reporter.errors());
  script.unwrap()
}

fn parse(source: &str) -> Arc<FunctionNode> {
  parse_with(source, ParseOptions::default())
}

fn errors_with(source: &str, options: ParseOptions) -> Vec<Diagnostic> {
  let reporter = CollectingReporter::new();
  assert!(parse_program(source, options, &reporter).is_none());
  reporter.errors()
}

fn first_error(source: &str) -> Diagnostic {
  errors_with(source, ParseOptions::default()).remove(0)
}

fn body_json(script: &FunctionNode) -> Value {
  serde_json::to_value(&script.body).unwrap()
}

/// Compares rendered IR, printing a line diff on mismatch.
fn assert_ir_eq(actual: &Value, expected: &Value) {
  if actual == expected {
    return;
  };
  let actual = serde_json::to_string_pretty(actual).unwrap();
  let expected = serde_json::to_string_pretty(expected).unwrap();
  let mut out = String::new();
  for change in TextDiff::from_lines(&expected, &actual).iter_all_changes() {
    let sign = match change.tag() {
      ChangeTag::Delete => "-",
      ChangeTag::Insert => "+",
      ChangeTag::Equal => " ",
    };
    out.push_str(&format!("{sign}{change}"));
  }
  panic!("IR mismatch (- expected, + actual):\n{out}");
}

fn only_expr(script: &FunctionNode) -> &Expr {
  match &*script.body[0].stx {
    Stmt::Expr { expr } => &expr.stx,
    other => panic!("expected expression statement, got {other:?}"),
  }
}

#[test]
fn test_numeric_literals_in_additions() {
  let script = parse("0x1F + 010 + 1e2");
  assert_ir_eq(
    &body_json(&script),
    &json!([{
      "$t": "Expr",
      "expr": {
        "$t": "Binary",
        "op": "Add",
        "left": {
          "$t": "Binary",
          "op": "Add",
          "left": { "$t": "Number", "value": 31.0 },
          "right": { "$t": "Number", "value": 8.0 },
        },
        "right": { "$t": "Number", "value": 100.0 },
      },
    }]),
  );
}

#[test]
fn test_precedence_and_associativity() {
  let script = parse("a - b - c * d");
  assert_ir_eq(
    &body_json(&script),
    &json!([{
      "$t": "Expr",
      "expr": {
        "$t": "Binary",
        "op": "Sub",
        "left": {
          "$t": "Binary",
          "op": "Sub",
          "left": { "$t": "Name", "name": "a" },
          "right": { "$t": "Name", "name": "b" },
        },
        "right": {
          "$t": "Binary",
          "op": "Mul",
          "left": { "$t": "Name", "name": "c" },
          "right": { "$t": "Name", "name": "d" },
        },
      },
    }]),
  );
}

#[test]
fn test_regex_and_division() {
  let script = parse("x = /a+b/g; y = a / b / c;");
  let Stmt::Expr { expr } = &*script.body[0].stx else {
    panic!();
  };
  match &*expr.stx {
    Expr::SetName { name, value } => {
      assert_eq!(name, "x");
      assert!(matches!(&*value.stx, Expr::Regexp { pattern, flags } if pattern == "a+b" && flags == "g"));
    }
    other => panic!("{other:?}"),
  };
  let Stmt::Expr { expr } = &*script.body[1].stx else {
    panic!();
  };
  let Expr::SetName { value, .. } = &*expr.stx else {
    panic!();
  };
  assert!(matches!(&*value.stx, Expr::Binary { op: BinaryOp::Div, .. }));
}

#[test]
fn test_version_1_2_equality_is_strict() {
  let script = parse_with("a == b; a != b", ParseOptions {
    version: 120,
    ..Default::default()
  });
  let ops: Vec<BinaryOp> = script
    .body
    .iter()
    .map(|s| match &*s.stx {
      Stmt::Expr { expr } => match &*expr.stx {
        Expr::Binary { op, .. } => *op,
        other => panic!("{other:?}"),
      },
      other => panic!("{other:?}"),
    })
    .collect();
  assert_eq!(ops, vec![BinaryOp::StrictEq, BinaryOp::StrictNe]);
  let script = parse("a == b");
  assert!(matches!(only_expr(&script), Expr::Binary { op: BinaryOp::Eq, .. }));
}

#[test]
fn test_postfix_increment_lowering() {
  let script = parse("x++");
  assert_ir_eq(
    &body_json(&script),
    &json!([{
      "$t": "Expr",
      "expr": {
        "$t": "Comma",
        "exprs": [
          {
            "$t": "SetTemp",
            "temp": 0,
            "value": {
              "$t": "Unary",
              "op": "ToNumber",
              "operand": { "$t": "Name", "name": "x" },
            },
          },
          {
            "$t": "SetName",
            "name": "x",
            "value": {
              "$t": "Binary",
              "op": "Add",
              "left": { "$t": "GetTemp", "temp": 0 },
              "right": { "$t": "Number", "value": 1.0 },
            },
          },
          { "$t": "GetTemp", "temp": 0 },
        ],
      },
    }]),
  );
  assert_eq!(script.temp_count, 1);
}

#[test]
fn test_compound_element_assignment_evaluates_operands_once() {
  let script = parse("o[k] += 1");
  let Expr::Comma { exprs } = only_expr(&script) else {
    panic!();
  };
  assert_eq!(exprs.len(), 3);
  assert!(matches!(&*exprs[0].stx, Expr::SetTemp { temp: 0, value } if matches!(&*value.stx, Expr::Name { name } if name == "o")));
  assert!(matches!(&*exprs[1].stx, Expr::SetTemp { temp: 1, value } if matches!(&*value.stx, Expr::Name { name } if name == "k")));
  match &*exprs[2].stx {
    Expr::SetProp {
      obj,
      key: PropKey::Computed { key },
      value,
    } => {
      assert!(matches!(&*obj.stx, Expr::GetTemp { temp: 0 }));
      assert!(matches!(&*key.stx, Expr::GetTemp { temp: 1 }));
      assert!(matches!(&*value.stx, Expr::Binary { op: BinaryOp::Add, .. }));
    }
    other => panic!("{other:?}"),
  };
}

#[test]
fn test_prefix_increment_of_name() {
  let script = parse("--x");
  match only_expr(&script) {
    Expr::SetName { name, value } => {
      assert_eq!(name, "x");
      match &*value.stx {
        Expr::Binary {
          op: BinaryOp::Sub,
          left,
          ..
        } => assert!(matches!(&*left.stx, Expr::Unary { op: UnaryOp::ToNumber, .. })),
        other => panic!("{other:?}"),
      };
    }
    other => panic!("{other:?}"),
  };
}

#[test]
fn test_postfix_requires_same_line() {
  let script = parse("a\n++b");
  assert_eq!(script.body.len(), 2);
  assert!(matches!(only_expr(&script), Expr::Name { .. }));
}

#[test]
fn test_array_literal_lowering() {
  let script = parse("[a,,b]");
  let Expr::Comma { exprs } = only_expr(&script) else {
    panic!();
  };
  // Construction, two stores, and the result.
  assert_eq!(exprs.len(), 4);
  match &*exprs[0].stx {
    Expr::SetTemp { value, .. } => match &*value.stx {
      Expr::New { callee, args } => {
        assert!(matches!(&*callee.stx, Expr::Name { name } if name == "Array"));
        assert_eq!(args.len(), 1);
        assert!(matches!(&*args[0].stx, Expr::Number { value } if value.0 == 3.0));
      }
      other => panic!("{other:?}"),
    },
    other => panic!("{other:?}"),
  };
  let indices: Vec<f64> = exprs[1..3]
    .iter()
    .map(|e| match &*e.stx {
      Expr::SetProp {
        key: PropKey::Computed { key },
        ..
      } => match &*key.stx {
        Expr::Number { value } => value.0,
        other => panic!("{other:?}"),
      },
      other => panic!("{other:?}"),
    })
    .collect();
  assert_eq!(indices, vec![0.0, 2.0]);
}

#[test]
fn test_array_literal_version_1_2_trailing_hole() {
  let script = parse_with("[a,,]", ParseOptions {
    version: 120,
    ..Default::default()
  });
  let Expr::Comma { exprs } = only_expr(&script) else {
    panic!();
  };
  match &*exprs[0].stx {
    Expr::SetTemp { value, .. } => {
      assert!(matches!(&*value.stx, Expr::New { args, .. } if args.is_empty()))
    }
    other => panic!("{other:?}"),
  };
  match &*exprs[2].stx {
    Expr::SetProp {
      key: PropKey::Named { name },
      value,
      ..
    } => {
      assert_eq!(name, "length");
      assert!(matches!(&*value.stx, Expr::Number { value } if value.0 == 2.0));
    }
    other => panic!("{other:?}"),
  };
}

#[test]
fn test_object_literal_keys() {
  let script = parse("x = {a: 1, 'b c': 2, 1.50: 3, __proto__: p}");
  let Expr::SetName { value, .. } = only_expr(&script) else {
    panic!();
  };
  let Expr::Comma { exprs } = &*value.stx else {
    panic!();
  };
  let mut keys = Vec::new();
  for e in &exprs[1..exprs.len() - 1] {
    match &*e.stx {
      Expr::SetProp {
        key: PropKey::Named { name },
        ..
      } => keys.push(name.clone()),
      Expr::SetSpecial { prop, .. } => keys.push(prop.name().to_string()),
      other => panic!("{other:?}"),
    };
  }
  assert_eq!(keys, vec!["a", "b c", "1.5", "__proto__"]);
  assert!(matches!(&*exprs[4].stx, Expr::SetSpecial { .. }));
}

#[test]
fn test_for_in_lowering() {
  let script = parse("for (var k in o) f(k);");
  assert_eq!(script.vars, vec!["k"]);
  let Stmt::Block { body } = &*script.body[0].stx else {
    panic!("{:?}", script.body[0]);
  };
  assert_eq!(body.len(), 3);
  assert!(matches!(&*body[0].stx, Stmt::EnumInit { temp: 0, .. }));
  match &*body[1].stx {
    Stmt::Loop { test, body, .. } => {
      assert!(matches!(test.as_ref().map(|t| &*t.stx), Some(Expr::EnumNext { temp: 0 })));
      let Stmt::Block { body } = &*body.stx else {
        panic!();
      };
      match &*body[0].stx {
        Stmt::Expr { expr } => assert!(matches!(
          &*expr.stx,
          Expr::SetName { name, value } if name == "k" && matches!(&*value.stx, Expr::EnumId { temp: 0 })
        )),
        other => panic!("{other:?}"),
      };
    }
    other => panic!("{other:?}"),
  };
  assert!(matches!(&*body[2].stx, Stmt::EnumDone { temp: 0 }));
}

#[test]
fn test_for_in_targets() {
  parse("for (o.p in q) ;");
  parse("for (o[i] in q) ;");
  let e = first_error("for (var a, b in c) ;");
  assert_eq!(e.code, SyntaxErrorType::MultipleForInVariables.code());
  assert_eq!(e.message, "invalid for/in left-hand side: more than one variable");
  let e = first_error("for (f() in c) ;");
  assert_eq!(e.message, "invalid for/in left-hand side");
}

#[test]
fn test_try_catch_finally_lowering() {
  let script = parse("try { a(); } catch (e if e > 1) { b(); } catch (e) { c(); } finally { d(); }");
  let Stmt::Try {
    exn,
    handler,
    finally,
    ..
  } = &*script.body[0].stx
  else {
    panic!();
  };
  assert!(finally.is_some());
  let handler = handler.as_ref().unwrap();
  let Stmt::Labeled { labels, body } = &*handler.stx else {
    panic!("{handler:?}");
  };
  assert_eq!(labels, &vec!["#catch0".to_string()]);
  let Stmt::Block { body } = &*body.stx else {
    panic!();
  };
  assert_eq!(body.len(), 3);
  match &*body[0].stx {
    Stmt::CatchScope { name, exn: e, body } => {
      assert_eq!(name, "e");
      assert_eq!(e, exn);
      assert!(matches!(&*body.stx, Stmt::If { .. }));
    }
    other => panic!("{other:?}"),
  };
  match &*body[1].stx {
    Stmt::CatchScope { body, .. } => match &*body.stx {
      Stmt::Block { body } => {
        assert!(matches!(&*body[1].stx, Stmt::Break { label: Some(l) } if l == "#catch0"))
      }
      other => panic!("{other:?}"),
    },
    other => panic!("{other:?}"),
  };
  assert!(matches!(&*body[2].stx, Stmt::Throw { value } if matches!(&*value.stx, Expr::GetTemp { .. })));
}

#[test]
fn test_empty_try_without_finally_is_empty() {
  let script = parse("try {} catch (e) { x(); }");
  assert!(matches!(&*script.body[0].stx, Stmt::Empty));
}

#[test]
fn test_try_errors() {
  assert_eq!(first_error("try { a(); }").message, "'try' without 'catch' or 'finally'");
  assert_eq!(
    first_error("try { a(); } catch (e) {} catch (f) {}").message,
    "any catch clauses following an unqualified catch are unreachable"
  );
}

#[test]
fn test_typeof_and_delete_lowering() {
  let script = parse("typeof x; typeof x.y; delete x; delete x.y; delete 1;");
  let exprs: Vec<&Expr> = script
    .body
    .iter()
    .map(|s| match &*s.stx {
      Stmt::Expr { expr } => &*expr.stx,
      other => panic!("{other:?}"),
    })
    .collect();
  assert!(matches!(exprs[0], Expr::TypeofName { name } if name == "x"));
  assert!(matches!(exprs[1], Expr::Unary { op: UnaryOp::Typeof, .. }));
  assert!(matches!(exprs[2], Expr::DeleteName { name } if name == "x"));
  assert!(matches!(exprs[3], Expr::DeleteProp { key, .. } if matches!(&*key.stx, Expr::String { value } if value == "y")));
  assert!(matches!(exprs[4], Expr::Comma { exprs } if matches!(&*exprs[1].stx, Expr::Bool { value: true })));
}

#[test]
fn test_special_properties() {
  let script = parse("a.__proto__ = b; c = a.__parent__;");
  let Stmt::Expr { expr } = &*script.body[0].stx else {
    panic!();
  };
  assert!(matches!(&*expr.stx, Expr::SetSpecial { .. }));
  let Stmt::Expr { expr } = &*script.body[1].stx else {
    panic!();
  };
  assert!(matches!(&*expr.stx, Expr::SetName { value, .. } if matches!(&*value.stx, Expr::GetSpecial { .. })));
}

#[test]
fn test_invalid_assignment_targets() {
  for src in ["1 = 2", "f() = 1", "a + b += 1", "'s' *= 2", "++f()", "(a, b)++", "f()--"] {
    let e = first_error(src);
    assert_eq!(e.message, "invalid assignment left-hand side", "{src}");
  }
}

#[test]
fn test_statement_termination() {
  let e = first_error("a b");
  assert_eq!(e.message, "missing ; before statement");
  parse("a\nb");
  parse("{ a }");
  parse("a;");
  assert_eq!(first_error("a = 1 function f() {}").message, "missing ; before statement");
  parse_with("a = 1 function f() {}", ParseOptions {
    version: 100,
    ..Default::default()
  });
}

#[test]
fn test_labels() {
  parse("a: b: while (x) { continue a; }");
  parse("a: { break a; }");
  parse("a: for (;;) { b: for (;;) { break a; } }");
  assert_eq!(first_error("(a): x;").message, "invalid label");
  assert_eq!(first_error("a.b: x;").message, "invalid label");
  assert_eq!(first_error("a: a: x;").message, "duplicate label");
  assert_eq!(first_error("a: { continue a; }").code, SyntaxErrorType::ContinueNonLoopLabel.code());
  assert_eq!(first_error("while (x) break b;").message, "undefined label");
}

#[test]
fn test_jumps_outside_targets() {
  assert_eq!(first_error("break;").code, SyntaxErrorType::BreakOutsideLoop.code());
  assert_eq!(first_error("continue;").message, "continue must be inside loop");
  assert_eq!(first_error("switch (x) { case 1: continue; }").message, "continue must be inside loop");
  parse("switch (x) { case 1: break; default: y(); }");
  assert_eq!(first_error("return 1;").message, "invalid return");
  // Labels do not cross function boundaries.
  assert_eq!(
    first_error("a: while (x) { (function () { break a; }); }").message,
    "undefined label"
  );
}

#[test]
fn test_switch_single_default() {
  assert_eq!(
    first_error("switch (x) { default: a(); default: b(); }").message,
    "more than one switch default"
  );
}

#[test]
fn test_throw_operand_on_same_line() {
  assert_eq!(first_error("throw\n1;").code, SyntaxErrorType::LineTerminatorAfterThrow.code());
  parse("throw 1;");
}

#[test]
fn test_recovery_reports_every_statement() {
  let reporter = CollectingReporter::new();
  let parsed = parse_script("a b; c = 1; 1 = 2;\nd e", ParseOptions::default(), &reporter);
  assert_eq!(parsed.error_count, 3);
  assert_eq!(reporter.errors().len(), 3);
  let kinds: Vec<bool> = parsed
    .script
    .body
    .iter()
    .map(|s| matches!(&*s.stx, Stmt::Error))
    .collect();
  assert_eq!(kinds, vec![true, false, true, true]);
}

#[test]
fn test_malformed_statement_reported_once() {
  let cases = [
    ("x = {a: 1 b: 2};\ny = 3;", 2),
    ("a @ b @ c;\ny = 3;", 2),
    ("function f( { return 1; }\ny = 3;", 2),
    ("if (a) { b c d; }\ny = 3;", 2),
    ("}\ny = 3;", 2),
  ];
  for (source, statements) in cases {
    let reporter = CollectingReporter::new();
    let parsed = parse_script(source, ParseOptions::default(), &reporter);
    assert_eq!(parsed.error_count, 1, "{source}: {:?}", reporter.errors());
    assert_eq!(parsed.script.body.len(), statements, "{source}");
    let last = parsed.script.body.last().map(|s| matches!(&*s.stx, Stmt::Error));
    assert_eq!(last, Some(false), "{source}");
  }
}

#[test]
fn test_error_positions() {
  let errors = errors_with("x = 1;\n  a b;", ParseOptions {
    source_name: "test.js".to_string(),
    base_line: 10,
    ..Default::default()
  });
  let e = &errors[0];
  assert_eq!(e.source_name, "test.js");
  assert_eq!(e.line, 11);
  assert_eq!(e.column, 4);
  assert_eq!(e.line_source.as_deref(), Some("  a b;"));
}

#[test]
fn test_hit_eof() {
  let reporter = CollectingReporter::new();
  assert!(parse_script("function f() {", ParseOptions::default(), &reporter).hit_eof);
  assert!(parse_script("x = 'abc", ParseOptions::default(), &reporter).hit_eof);
  assert!(parse_script("x = (1 +", ParseOptions::default(), &reporter).hit_eof);
  assert!(!parse_script("a b;", ParseOptions::default(), &reporter).hit_eof);
  assert!(!parse_script("x = 1;", ParseOptions::default(), &reporter).hit_eof);
}

// Runs on the ordinary test thread with the default limits; input far deeper than either limit must fail cleanly.
#[test]
fn test_depth_bound() {
  let too_deep = "expression or statement nested too deeply";
  let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
  assert_eq!(first_error(&parens).message, too_deep);
  let nots = format!("x = {}1;", "!".repeat(100_000));
  assert_eq!(first_error(&nots).message, too_deep);
  let arrays = format!("x = {}{};", "[".repeat(100_000), "]".repeat(100_000));
  assert_eq!(first_error(&arrays).message, too_deep);
  let blocks = "{\n".repeat(20_000);
  assert_eq!(first_error(&blocks).message, too_deep);

  let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
  parse(&shallow);
  let e = errors_with(&shallow, ParseOptions {
    max_depth: 10,
    ..Default::default()
  });
  assert_eq!(e[0].code, SyntaxErrorType::NestingTooDeep.code());
}

#[test]
fn test_stack_budget() {
  let nested = format!("x = {}1{};", "(".repeat(20), ")".repeat(20));
  parse(&nested);
  let e = errors_with(&nested, ParseOptions {
    stack_budget: 0,
    ..Default::default()
  });
  assert_eq!(e[0].code, SyntaxErrorType::NestingTooDeep.code());
}

// Operator and member chains nest to the left without recursing in the parser, so they are bounded separately.
#[test]
fn test_left_chains_bounded() {
  let sum = vec!["1"; 5000].join(" + ");
  assert_eq!(first_error(&sum).code, SyntaxErrorType::NestingTooDeep.code());
  let calls = format!("f{};", "()".repeat(5000));
  assert_eq!(first_error(&calls).code, SyntaxErrorType::NestingTooDeep.code());
  let props = format!("a{};", ".b".repeat(5000));
  assert_eq!(first_error(&props).code, SyntaxErrorType::NestingTooDeep.code());
  parse(&vec!["1"; 100].join(" + "));
  parse(&format!("a{};", ".b".repeat(100)));
}

#[test]
fn test_warnings() {
  let reporter = CollectingReporter::new();
  assert!(parse_program("x = 019; function f(a, a) {}", ParseOptions::default(), &reporter).is_some());
  let warnings = reporter.warnings();
  assert_eq!(warnings.len(), 2);
  assert_eq!(
    warnings[0].message,
    "illegal octal literal digit 9; interpreting it as a decimal digit"
  );
  assert_eq!(warnings[1].message, "duplicate formal argument a");

  assert_eq!(first_error("var class = 1;").code, SyntaxErrorType::ReservedIdentifier.code());
  let reporter = CollectingReporter::new();
  let options = ParseOptions {
    reserved_keyword_as_identifier: true,
    ..Default::default()
  };
  assert!(parse_program("var class = 1;", options, &reporter).is_some());
  assert_eq!(reporter.warnings()[0].message, "reserved word class used as identifier");
}

#[test]
fn test_lexer_errors_are_reported() {
  assert_eq!(first_error("x = 'abc").message, "unterminated string literal");
  assert_eq!(first_error("x = 1e;").message, "missing exponent");
  assert_eq!(first_error("x = /a/q;").message, "invalid flag after regular expression");
  assert_eq!(first_error("x = a\\u00zz;").message, "invalid Unicode escape sequence");
}

#[test]
fn test_function_table_and_flags() {
  let script = parse("function outer(a, b) { var v; function inner() { return arguments; } with (o) { var g = function () {}; } }");
  assert_eq!(script.functions.len(), 1);
  assert!(matches!(&*script.body[0].stx, Stmt::Empty));
  let outer = &script.functions[0];
  assert_eq!(outer.kind, FunctionKind::Statement);
  assert_eq!(outer.name.as_deref(), Some("outer"));
  assert_eq!(outer.params, vec!["a", "b"]);
  assert_eq!(outer.vars, vec!["v", "g"]);
  assert!(outer.needs_activation);
  assert!(!outer.check_this);
  assert!(!outer.ignore_dynamic_scope);
  assert_eq!(outer.functions.len(), 2);
  let inner = &outer.functions[0];
  assert!(inner.check_this);
  assert!(inner.ignore_dynamic_scope);
  assert!(inner.needs_activation);
  assert!(inner.source.starts_with("function inner()"));
  assert!(inner.source.ends_with('}'));
  assert_eq!(outer.functions[1].kind, FunctionKind::Expression);
}

#[test]
fn test_function_in_with_ignores_dynamic_scope() {
  let script = parse("with (o) { f = function () {}; }");
  assert!(script.functions[0].ignore_dynamic_scope);
  assert!(!script.functions[0].check_this);
}

#[test]
fn test_member_expr_function_name() {
  let options = ParseOptions {
    member_expr_as_function_name: true,
    ..Default::default()
  };
  let script = parse_with("function a.b() { return 1; }", options);
  match only_expr(&script) {
    Expr::SetProp {
      key: PropKey::Named { name },
      value,
      ..
    } => {
      assert_eq!(name, "b");
      assert!(matches!(&*value.stx, Expr::Function { index: 0 }));
    }
    other => panic!("{other:?}"),
  };
  assert_eq!(script.functions[0].kind, FunctionKind::ExpressionStatement);
  assert_eq!(script.functions[0].name.as_deref(), Some("b"));
  assert!(errors_with("function a.b() {}", ParseOptions::default()).len() >= 1);
}

#[test]
fn test_vars_are_hoisted_in_order() {
  let script = parse("var a, b = 2; for (var i = 0; i < 1; i++) var a;");
  assert_eq!(script.vars, vec!["a", "b", "i"]);
}

#[test]
fn test_line_numbers_on_nodes() {
  let script = parse("a;\n\nb;");
  assert_eq!(script.body[0].line, 1);
  assert_eq!(script.body[1].line, 3);
  assert_eq!(script.end_line, 3);
}
