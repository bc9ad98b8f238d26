//! The error-reporter contract shared by the parser and the runtime.
//!
//! Every problem found while scanning, parsing or evaluating is described by a [`Diagnostic`] and handed to an [`ErrorReporter`] chosen by the host. Warnings never stop anything, errors fail the current compilation, and runtime errors are turned into an [`EvaluatorError`] that the caller raises.

use parking_lot::Mutex;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// Diagnostic severity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum Severity {
  Warning,
  Error,
  RuntimeError,
}

impl Severity {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Severity::Warning => "warning",
      Severity::Error => "error",
      Severity::RuntimeError => "runtime error",
    }
  }
}

impl Display for Severity {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Stable codes for warnings (prefix `PW`).
/// - `PW0001`: [`WarningType::BadOctalLiteral`]
/// - `PW0002`: [`WarningType::DuplicateParameter`]
/// - `PW0003`: [`WarningType::ReservedKeywordAsIdentifier`]
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum WarningType {
  BadOctalLiteral(char),
  DuplicateParameter(String),
  ReservedKeywordAsIdentifier(String),
}

impl WarningType {
  pub fn code(&self) -> &'static str {
    match self {
      WarningType::BadOctalLiteral(_) => "PW0001",
      WarningType::DuplicateParameter(_) => "PW0002",
      WarningType::ReservedKeywordAsIdentifier(_) => "PW0003",
    }
  }

  pub fn message(&self) -> String {
    match self {
      WarningType::BadOctalLiteral(digit) => format!(
        "illegal octal literal digit {digit}; interpreting it as a decimal digit"
      ),
      WarningType::DuplicateParameter(name) => format!("duplicate formal argument {name}"),
      WarningType::ReservedKeywordAsIdentifier(word) => {
        format!("reserved word {word} used as identifier")
      }
    }
  }
}

/// A single reported problem, positioned the way hosts print them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub severity: Severity,
  pub code: &'static str,
  pub message: String,
  pub source_name: String,
  /// 1-based. Zero when the position is unknown.
  pub line: u32,
  pub line_source: Option<String>,
  /// 0-based character offset within `line_source`.
  pub column: u32,
}

impl Diagnostic {
  pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Diagnostic {
    Diagnostic {
      severity,
      code,
      message: message.into(),
      source_name: String::new(),
      line: 0,
      line_source: None,
      column: 0,
    }
  }

  pub fn with_position(
    mut self,
    source_name: impl Into<String>,
    line: u32,
    line_source: Option<String>,
    column: u32,
  ) -> Diagnostic {
    self.source_name = source_name.into();
    self.line = line;
    self.line_source = line_source;
    self.column = column;
    self
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message)?;
    if !self.source_name.is_empty() || self.line != 0 {
      write!(f, " ({}#{})", self.source_name, self.line)?;
    };
    Ok(())
  }
}

/// The fault produced by [`ErrorReporter::runtime_error`]. It carries everything needed to show the user where the problem is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluatorError {
  // Boxed to keep results that carry this error small on the evaluator's stack.
  pub diagnostic: Box<Diagnostic>,
}

impl EvaluatorError {
  pub fn new(diagnostic: Diagnostic) -> EvaluatorError {
    EvaluatorError {
      diagnostic: Box::new(diagnostic),
    }
  }

  pub fn message(&self) -> &str {
    &self.diagnostic.message
  }

  pub fn source_name(&self) -> &str {
    &self.diagnostic.source_name
  }

  pub fn line(&self) -> u32 {
    self.diagnostic.line
  }

  pub fn line_source(&self) -> Option<&str> {
    self.diagnostic.line_source.as_deref()
  }

  pub fn column(&self) -> u32 {
    self.diagnostic.column
  }
}

impl Display for EvaluatorError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    Display::fmt(&self.diagnostic, f)
  }
}

impl Error for EvaluatorError {}

/// Receives diagnostics. Implementations must tolerate being called re-entrantly, e.g. from a host callback that evaluates more script.
pub trait ErrorReporter: Send + Sync {
  fn warning(&self, diagnostic: &Diagnostic);

  fn error(&self, diagnostic: &Diagnostic);

  fn runtime_error(&self, diagnostic: &Diagnostic) -> EvaluatorError {
    EvaluatorError::new(diagnostic.clone())
  }
}

/// Logs through `tracing`. Used when the host does not install a reporter.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultErrorReporter;

impl ErrorReporter for DefaultErrorReporter {
  fn warning(&self, d: &Diagnostic) {
    tracing::warn!(
      source = %d.source_name,
      line = d.line,
      column = d.column,
      code = d.code,
      "{}",
      d.message
    );
  }

  fn error(&self, d: &Diagnostic) {
    tracing::error!(
      source = %d.source_name,
      line = d.line,
      column = d.column,
      code = d.code,
      "{}",
      d.message
    );
  }
}

/// Keeps every diagnostic it is given.
#[derive(Debug, Default)]
pub struct CollectingReporter {
  diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
  pub fn new() -> CollectingReporter {
    CollectingReporter::default()
  }

  pub fn diagnostics(&self) -> Vec<Diagnostic> {
    self.diagnostics.lock().clone()
  }

  pub fn errors(&self) -> Vec<Diagnostic> {
    self
      .diagnostics
      .lock()
      .iter()
      .filter(|d| d.severity != Severity::Warning)
      .cloned()
      .collect()
  }

  pub fn warnings(&self) -> Vec<Diagnostic> {
    self
      .diagnostics
      .lock()
      .iter()
      .filter(|d| d.severity == Severity::Warning)
      .cloned()
      .collect()
  }
}

impl ErrorReporter for CollectingReporter {
  fn warning(&self, d: &Diagnostic) {
    self.diagnostics.lock().push(d.clone());
  }

  fn error(&self, d: &Diagnostic) {
    self.diagnostics.lock().push(d.clone());
  }

  fn runtime_error(&self, d: &Diagnostic) -> EvaluatorError {
    self.diagnostics.lock().push(d.clone());
    EvaluatorError::new(d.clone())
  }
}

/// Drops everything. Used for speculative parses.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardingReporter;

impl ErrorReporter for DiscardingReporter {
  fn warning(&self, _d: &Diagnostic) {}

  fn error(&self, _d: &Diagnostic) {}
}
