use crate::value::Value;
use parse_es::report::EvaluatorError;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// Errors produced while compiling or running scripts.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VmError {
  /// Compilation failed; every problem has already been given to the error reporter.
  #[error("{0}")]
  Compile(EvaluatorError),

  /// A runtime problem that was handed to the error reporter.
  #[error("{0}")]
  Evaluator(EvaluatorError),

  /// A script `throw`. Catchable from script.
  #[error("uncaught exception: {0:?}")]
  Throw(Value),

  /// An error raised by the runtime itself, such as a TypeError. Catchable from script, where it becomes an instance of the matching error constructor.
  #[error("{0}")]
  Ecma(EcmaError),

  /// Aborts the script. Never seen by script `catch` or `finally`.
  #[error("{0}")]
  Termination(Termination),

  /// The host used the API incorrectly.
  #[error("{0}")]
  Misuse(Misuse),
}

impl VmError {
  /// Whether script code may intercept this error with `catch`.
  pub fn is_catchable(&self) -> bool {
    matches!(self, VmError::Throw(_) | VmError::Ecma(_))
  }

  pub fn type_error(message: impl Into<String>) -> VmError {
    VmError::Ecma(EcmaError::new(EcmaErrorKind::TypeError, message))
  }

  pub fn reference_error(message: impl Into<String>) -> VmError {
    VmError::Ecma(EcmaError::new(EcmaErrorKind::ReferenceError, message))
  }

  pub fn range_error(message: impl Into<String>) -> VmError {
    VmError::Ecma(EcmaError::new(EcmaErrorKind::RangeError, message))
  }
}

impl From<Misuse> for VmError {
  fn from(m: Misuse) -> Self {
    VmError::Misuse(m)
  }
}

impl From<EcmaError> for VmError {
  fn from(e: EcmaError) -> Self {
    VmError::Ecma(e)
  }
}

/// The native error constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcmaErrorKind {
  Error,
  EvalError,
  RangeError,
  ReferenceError,
  SyntaxError,
  TypeError,
  URIError,
}

impl EcmaErrorKind {
  pub const ALL: [EcmaErrorKind; 7] = [
    EcmaErrorKind::Error,
    EcmaErrorKind::EvalError,
    EcmaErrorKind::RangeError,
    EcmaErrorKind::ReferenceError,
    EcmaErrorKind::SyntaxError,
    EcmaErrorKind::TypeError,
    EcmaErrorKind::URIError,
  ];

  /// The constructor's global name, which is also the `name` of its instances.
  pub fn name(self) -> &'static str {
    match self {
      EcmaErrorKind::Error => "Error",
      EcmaErrorKind::EvalError => "EvalError",
      EcmaErrorKind::RangeError => "RangeError",
      EcmaErrorKind::ReferenceError => "ReferenceError",
      EcmaErrorKind::SyntaxError => "SyntaxError",
      EcmaErrorKind::TypeError => "TypeError",
      EcmaErrorKind::URIError => "URIError",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {message}", kind.name())]
pub struct EcmaError {
  pub kind: EcmaErrorKind,
  pub message: String,
}

impl EcmaError {
  pub fn new(kind: EcmaErrorKind, message: impl Into<String>) -> EcmaError {
    EcmaError {
      kind,
      message: message.into(),
    }
  }
}

/// A non-catchable error that terminates execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
  pub reason: TerminationReason,
}

impl Termination {
  pub fn new(reason: TerminationReason) -> Self {
    Self { reason }
  }
}

impl Display for Termination {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{reason}", reason = self.reason)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TerminationReason {
  /// The instruction observer stopped the script.
  Aborted(String),
  /// Calls or expressions nested deeper than the Context's call depth or stack budget allow.
  StackOverflow,
}

impl Display for TerminationReason {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      TerminationReason::Aborted(message) => write!(f, "execution terminated: {message}"),
      TerminationReason::StackOverflow => f.write_str("execution terminated: stack overflow"),
    }
  }
}

/// Incorrect use of the embedding API. These are bugs in the host, not in the script.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Misuse {
  #[error("Context is already active on another unit")]
  ContextActiveElsewhere,
  #[error("a different Context is already active on this unit")]
  OtherContextActive,
  #[error("exit without enter")]
  ExitWithoutEnter,
  #[error("Context is sealed")]
  SealedContext,
  #[error("cannot associate a sealed Context")]
  SealedContextEnter,
  #[error("cannot add property {0:?} to a sealed object")]
  SealedObjectAdd(String),
  #[error("cannot remove property {0:?} from a sealed object")]
  SealedObjectRemove(String),
  #[error("{0} can only be set once")]
  WriteOnce(&'static str),
  #[error("Context is not sealed")]
  NotSealed,
  #[error("seal key does not match")]
  WrongSealKey,
  #[error("invalid compile arguments: {0}")]
  InvalidCompileArguments(&'static str),
  #[error("bad language version: {0}")]
  InvalidVersion(i32),
  #[error("bad optimization level: {0}")]
  InvalidOptimizationLevel(i32),
  #[error("failed to read source: {0}")]
  SourceRead(String),
}
