use parse_es::ir::Expr;
use parse_es::ir::Stmt;
use parse_es::parse_program;
use parse_es::parse_script;
use parse_es::report::CollectingReporter;
use parse_es::report::DiscardingReporter;
use parse_es::ParseOptions;

fn number_value(src: &str) -> f64 {
  let script = parse_program(src, ParseOptions::default(), &DiscardingReporter).expect("should parse");
  match &*script.body[0].stx {
    Stmt::Expr { expr } => match &*expr.stx {
      Expr::Number { value } => value.0,
      other => panic!("expected numeric literal, got {other:?}"),
    },
    other => panic!("expected expression statement, got {other:?}"),
  }
}

#[test]
fn numeric_literal_forms() {
  assert_eq!(number_value("0x1F"), 31.0);
  assert_eq!(number_value("010"), 8.0);
  assert_eq!(number_value("019"), 19.0);
  assert_eq!(number_value("1e2"), 100.0);
  assert_eq!(number_value("1.7976931348623157e308"), f64::MAX);
  assert!(number_value("1e400").is_infinite());
}

#[test]
fn options_deserialize_with_defaults() {
  let options: ParseOptions = serde_json::from_str(r#"{"version": 120, "source_name": "x.js"}"#).unwrap();
  assert_eq!(options.version, 120);
  assert_eq!(options.source_name, "x.js");
  assert_eq!(options.base_line, ParseOptions::default().base_line);
}

#[test]
fn base_line_offsets_positions() {
  let reporter = CollectingReporter::new();
  let options = ParseOptions {
    source_name: "embedded.js".to_string(),
    base_line: 10,
    ..Default::default()
  };
  let parsed = parse_script("a;\nb c;", options, &reporter);
  assert_eq!(parsed.error_count, 1);
  assert!(!parsed.hit_eof);
  let errors = reporter.errors();
  assert_eq!(errors[0].line, 11);
  assert_eq!(errors[0].source_name, "embedded.js");
}

#[test]
fn failed_parse_returns_none() {
  assert!(parse_program("var = ;", ParseOptions::default(), &DiscardingReporter).is_none());
  assert!(parse_program("", ParseOptions::default(), &DiscardingReporter).is_some());
}
