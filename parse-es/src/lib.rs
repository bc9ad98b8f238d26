use ir::function::FunctionNode;
use parse::ParsedScript;
use parse::Parser;
use report::ErrorReporter;
use serde::Deserialize;
use serde::Serialize;
use stack::DEFAULT_STACK_BUDGET;
use std::sync::Arc;

pub mod char;
pub mod error;
pub mod ir;
pub mod lex;
pub mod loc;
pub mod num;
pub mod parse;
pub mod report;
pub mod stack;
pub mod token;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
  /// Language version as a number, e.g. 120 for 1.2. Zero is the default (ECMA) version.
  pub version: i32,
  /// Accept `function a.b() {}` as an assignment to `a.b`.
  pub member_expr_as_function_name: bool,
  /// Accept future reserved words as identifiers, with a warning.
  pub reserved_keyword_as_identifier: bool,
  /// How deeply statements and expressions may nest before parsing fails.
  pub max_depth: u32,
  /// Bytes of native stack parsing may use, counted from the outermost parse or evaluation on the thread. Parsing fails like too deep nesting beyond it.
  pub stack_budget: usize,
  pub source_name: String,
  /// Line number of the first line of the source.
  pub base_line: u32,
}

impl Default for ParseOptions {
  fn default() -> Self {
    ParseOptions {
      version: 0,
      member_expr_as_function_name: false,
      reserved_keyword_as_identifier: false,
      max_depth: 1000,
      stack_budget: DEFAULT_STACK_BUDGET,
      source_name: String::new(),
      base_line: 1,
    }
  }
}

/// Parses a script, reporting every problem to `reporter`. Returns the script's tree, or None if any error was reported.
pub fn parse_program(
  source: &str,
  options: ParseOptions,
  reporter: &dyn ErrorReporter,
) -> Option<Arc<FunctionNode>> {
  let ParsedScript {
    script, error_count, ..
  } = parse_script(source, options, reporter);
  (error_count == 0).then_some(script)
}

/// Like [`parse_program`], but always returns the tree along with the error count and end-of-input status.
pub fn parse_script(source: &str, options: ParseOptions, reporter: &dyn ErrorReporter) -> ParsedScript {
  Parser::new(source, options, reporter).parse_script()
}
