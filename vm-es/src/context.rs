//! Per-unit runtime state and the compilation entry points.

use crate::builtins;
use crate::error::Misuse;
use crate::error::Termination;
use crate::error::TerminationReason;
use crate::error::VmError;
use crate::function::new_interpreted_function;
use crate::interp;
use crate::object::ObjectRef;
use crate::value::Value;
use ahash::HashMap;
use ahash::HashMapExt;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use parking_lot::RwLock;
use parse_es::ir::function::FunctionNode;
use parse_es::ir::Stmt;
use parse_es::parse_script;
use parse_es::report::DefaultErrorReporter;
use parse_es::report::Diagnostic;
use parse_es::report::DiscardingReporter;
use parse_es::report::ErrorReporter;
use parse_es::report::Severity;
use parse_es::stack::stack_used;
use parse_es::stack::StackBase;
use parse_es::stack::DEFAULT_STACK_BUDGET;
use parse_es::ParseOptions;
use serde::Deserialize;
use serde::Serialize;
use std::any::Any;
use std::io::Read;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Code of the runtime error that summarises a failed compilation.
pub const SYNTAX_ERRORS_CODE: &str = "VM0001";
/// Code of runtime errors raised through [`Context::report_runtime_error`].
pub const RUNTIME_ERROR_CODE: &str = "VM0002";

/// Language versions. Versions before 1.3 keep some pre-ECMA behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(try_from = "i32", into = "i32")]
pub enum LanguageVersion {
  #[default]
  Default,
  V1_0,
  V1_1,
  V1_2,
  V1_3,
  V1_4,
  V1_5,
}

impl LanguageVersion {
  pub fn as_i32(self) -> i32 {
    match self {
      LanguageVersion::Default => 0,
      LanguageVersion::V1_0 => 100,
      LanguageVersion::V1_1 => 110,
      LanguageVersion::V1_2 => 120,
      LanguageVersion::V1_3 => 130,
      LanguageVersion::V1_4 => 140,
      LanguageVersion::V1_5 => 150,
    }
  }

  /// Whether objects convert to booleans and compare the ECMA way.
  pub fn is_ecma(self) -> bool {
    !matches!(
      self,
      LanguageVersion::V1_0 | LanguageVersion::V1_1 | LanguageVersion::V1_2
    )
  }
}

impl TryFrom<i32> for LanguageVersion {
  type Error = Misuse;

  fn try_from(v: i32) -> Result<Self, Misuse> {
    Ok(match v {
      0 => LanguageVersion::Default,
      100 => LanguageVersion::V1_0,
      110 => LanguageVersion::V1_1,
      120 => LanguageVersion::V1_2,
      130 => LanguageVersion::V1_3,
      140 => LanguageVersion::V1_4,
      150 => LanguageVersion::V1_5,
      _ => return Err(Misuse::InvalidVersion(v)),
    })
  }
}

impl From<LanguageVersion> for i32 {
  fn from(v: LanguageVersion) -> i32 {
    v.as_i32()
  }
}

/// Optional behaviours. Each has a default that depends on the language version and can be overridden per Context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
  /// `Date.prototype.getYear` subtracts 1900 only from years in 1900..=1999 and returns other years unchanged.
  NonEcmaGetYear,
  /// `function a.b() {}` assigns to `a.b`.
  MemberExprAsFunctionName,
  /// Future reserved words may be used as identifiers.
  ReservedKeywordAsIdentifier,
  /// `toString` of objects and arrays produces source-like text.
  ToStringAsSource,
}

impl Feature {
  pub fn default_for(self, version: LanguageVersion) -> bool {
    match self {
      Feature::NonEcmaGetYear => matches!(
        version,
        LanguageVersion::V1_0 | LanguageVersion::V1_1 | LanguageVersion::V1_2
      ),
      Feature::MemberExprAsFunctionName | Feature::ReservedKeywordAsIdentifier => false,
      Feature::ToStringAsSource => version == LanguageVersion::V1_2,
    }
  }
}

/// Called every time the instruction count reaches the Context's threshold. Returning an error, typically a [`VmError::Termination`], stops the script.
pub trait InstructionObserver: Send + Sync {
  fn observe_instruction_count(&self, cx: &Context, count: u64) -> Result<(), VmError>;
}

/// Host security policy. The core only stores it.
pub trait SecurityController: Send + Sync {}

/// Decides which host classes and packages scripts may see.
pub trait ClassShutter: Send + Sync {
  fn visible_to_scripts(&self, class_name: &str) -> bool;
}

/// Initial configuration of a [`Context`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextOptions {
  pub version: LanguageVersion,
  pub locale: String,
  pub optimization_level: i32,
  /// Instructions between calls to the instruction observer. Zero disables counting.
  pub instruction_threshold: u64,
  pub features: HashMap<Feature, bool>,
  /// Nesting of script function calls beyond this terminates the script.
  pub max_call_depth: u32,
  /// Bytes of native stack that compiling and running a script may use before it is terminated with a stack overflow. Counted from the outermost script or call on the thread.
  pub stack_budget: usize,
}

impl Default for ContextOptions {
  fn default() -> Self {
    ContextOptions {
      version: LanguageVersion::Default,
      locale: "en-US".to_string(),
      optimization_level: 0,
      instruction_threshold: 0,
      features: HashMap::new(),
      max_call_depth: 500,
      stack_budget: DEFAULT_STACK_BUDGET,
    }
  }
}

struct Settings {
  version: LanguageVersion,
  reporter: Arc<dyn ErrorReporter>,
  locale: String,
  optimization_level: i32,
  instruction_threshold: u64,
  observer: Option<Arc<dyn InstructionObserver>>,
  features: HashMap<Feature, bool>,
  max_call_depth: u32,
}

#[derive(Default)]
struct SealState {
  sealed: bool,
  key: Option<Arc<dyn Any + Send + Sync>>,
}

/// A compiled script.
#[derive(Clone, Debug)]
pub struct Script {
  node: Arc<FunctionNode>,
}

impl Script {
  pub fn node(&self) -> &Arc<FunctionNode> {
    &self.node
  }

  /// The source text the script was compiled from.
  pub fn source(&self) -> &str {
    &self.node.source
  }

  pub fn needs_activation(&self) -> bool {
    self.node.needs_activation
  }

  /// Runs the script with `scope` as both its variable object and `this`.
  pub fn exec(&self, cx: &Context, scope: &ObjectRef) -> Result<Value, VmError> {
    interp::exec_script(cx, &self.node, scope)
  }
}

enum Compiled {
  Script(Script),
  Function(ObjectRef),
}

/// Runtime state for one unit of execution. All state sits in interior-mutable cells so that host callbacks can re-enter the Context; no lock is held while calling out.
pub struct Context {
  settings: RwLock<Settings>,
  security_controller: OnceCell<Arc<dyn SecurityController>>,
  class_shutter: OnceCell<Arc<dyn ClassShutter>>,
  thread_locals: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
  seal: Mutex<SealState>,
  instruction_count: AtomicU64,
  call_depth: AtomicU32,
  stack_budget: AtomicUsize,
  // Set by the registry the first time the Context is associated with a unit.
  pub(crate) created_notified: AtomicBool,
}

impl Default for Context {
  fn default() -> Self {
    Context::new()
  }
}

impl Context {
  pub fn new() -> Context {
    let options = ContextOptions::default();
    Context {
      settings: RwLock::new(Settings {
        version: options.version,
        reporter: Arc::new(DefaultErrorReporter),
        locale: options.locale,
        optimization_level: options.optimization_level,
        instruction_threshold: options.instruction_threshold,
        observer: None,
        features: options.features,
        max_call_depth: options.max_call_depth,
      }),
      security_controller: OnceCell::new(),
      class_shutter: OnceCell::new(),
      thread_locals: Mutex::new(HashMap::new()),
      seal: Mutex::new(SealState::default()),
      instruction_count: AtomicU64::new(0),
      call_depth: AtomicU32::new(0),
      stack_budget: AtomicUsize::new(options.stack_budget),
      created_notified: AtomicBool::new(false),
    }
  }

  pub fn with_options(options: ContextOptions) -> Result<Context, VmError> {
    validate_optimization_level(options.optimization_level)?;
    let cx = Context::new();
    {
      let mut s = cx.settings.write();
      s.version = options.version;
      s.locale = options.locale;
      s.optimization_level = options.optimization_level;
      s.instruction_threshold = options.instruction_threshold;
      s.features = options.features;
      s.max_call_depth = options.max_call_depth;
    }
    cx.stack_budget.store(options.stack_budget, Ordering::Relaxed);
    Ok(cx)
  }

  fn check_not_sealed(&self) -> Result<(), VmError> {
    if self.seal.lock().sealed {
      return Err(Misuse::SealedContext.into());
    };
    Ok(())
  }

  pub fn is_sealed(&self) -> bool {
    self.seal.lock().sealed
  }

  /// Seals the Context against further mutation. Without a key it can never be unsealed.
  pub fn seal(&self, key: Option<Arc<dyn Any + Send + Sync>>) -> Result<(), VmError> {
    let mut seal = self.seal.lock();
    if seal.sealed {
      return Err(Misuse::SealedContext.into());
    };
    seal.sealed = true;
    seal.key = key;
    Ok(())
  }

  /// Unseals with the key given to [`Context::seal`].
  pub fn unseal(&self, key: &Arc<dyn Any + Send + Sync>) -> Result<(), VmError> {
    let mut seal = self.seal.lock();
    if !seal.sealed {
      return Err(Misuse::NotSealed.into());
    };
    match &seal.key {
      Some(k) if Arc::ptr_eq(k, key) => {
        seal.sealed = false;
        seal.key = None;
        Ok(())
      }
      _ => Err(Misuse::WrongSealKey.into()),
    }
  }

  pub fn language_version(&self) -> LanguageVersion {
    self.settings.read().version
  }

  pub fn set_language_version(&self, version: i32) -> Result<(), VmError> {
    self.check_not_sealed()?;
    let version = LanguageVersion::try_from(version)?;
    self.settings.write().version = version;
    Ok(())
  }

  pub fn error_reporter(&self) -> Arc<dyn ErrorReporter> {
    self.settings.read().reporter.clone()
  }

  /// Installs a reporter and returns the previous one.
  pub fn set_error_reporter(&self, reporter: Arc<dyn ErrorReporter>) -> Result<Arc<dyn ErrorReporter>, VmError> {
    self.check_not_sealed()?;
    Ok(std::mem::replace(&mut self.settings.write().reporter, reporter))
  }

  pub fn locale(&self) -> String {
    self.settings.read().locale.clone()
  }

  pub fn set_locale(&self, locale: impl Into<String>) -> Result<(), VmError> {
    self.check_not_sealed()?;
    self.settings.write().locale = locale.into();
    Ok(())
  }

  pub fn optimization_level(&self) -> i32 {
    self.settings.read().optimization_level
  }

  /// -1 means interpret only; 0 to 9 are accepted and recorded for hosts.
  pub fn set_optimization_level(&self, level: i32) -> Result<(), VmError> {
    self.check_not_sealed()?;
    validate_optimization_level(level)?;
    self.settings.write().optimization_level = level;
    Ok(())
  }

  pub fn instruction_observer_threshold(&self) -> u64 {
    self.settings.read().instruction_threshold
  }

  pub fn set_instruction_observer_threshold(&self, threshold: u64) -> Result<(), VmError> {
    self.check_not_sealed()?;
    self.settings.write().instruction_threshold = threshold;
    Ok(())
  }

  pub fn set_instruction_observer(&self, observer: Option<Arc<dyn InstructionObserver>>) -> Result<(), VmError> {
    self.check_not_sealed()?;
    self.settings.write().observer = observer;
    Ok(())
  }

  pub fn max_call_depth(&self) -> u32 {
    self.settings.read().max_call_depth
  }

  pub fn stack_budget(&self) -> usize {
    self.stack_budget.load(Ordering::Relaxed)
  }

  pub fn has_feature(&self, feature: Feature) -> bool {
    let s = self.settings.read();
    s.features
      .get(&feature)
      .copied()
      .unwrap_or_else(|| feature.default_for(s.version))
  }

  pub fn set_feature(&self, feature: Feature, enabled: bool) -> Result<(), VmError> {
    self.check_not_sealed()?;
    self.settings.write().features.insert(feature, enabled);
    Ok(())
  }

  pub fn security_controller(&self) -> Option<Arc<dyn SecurityController>> {
    self.security_controller.get().cloned()
  }

  pub fn set_security_controller(&self, controller: Arc<dyn SecurityController>) -> Result<(), VmError> {
    self.check_not_sealed()?;
    self
      .security_controller
      .set(controller)
      .map_err(|_| Misuse::WriteOnce("security controller").into())
  }

  pub fn class_shutter(&self) -> Option<Arc<dyn ClassShutter>> {
    self.class_shutter.get().cloned()
  }

  pub fn set_class_shutter(&self, shutter: Arc<dyn ClassShutter>) -> Result<(), VmError> {
    self.check_not_sealed()?;
    self
      .class_shutter
      .set(shutter)
      .map_err(|_| Misuse::WriteOnce("class shutter").into())
  }

  pub fn get_thread_local(&self, key: &str) -> Option<Arc<dyn Any + Send + Sync>> {
    self.thread_locals.lock().get(key).cloned()
  }

  pub fn put_thread_local(&self, key: impl Into<String>, value: Arc<dyn Any + Send + Sync>) -> Result<(), VmError> {
    self.check_not_sealed()?;
    self.thread_locals.lock().insert(key.into(), value);
    Ok(())
  }

  pub fn remove_thread_local(&self, key: &str) -> Result<(), VmError> {
    self.check_not_sealed()?;
    self.thread_locals.lock().remove(key);
    Ok(())
  }

  /// Instructions counted since the observer was last called.
  pub fn instruction_count(&self) -> u64 {
    self.instruction_count.load(Ordering::Relaxed)
  }

  /// Counts one instruction, calling the observer when the threshold is reached.
  pub(crate) fn count_instruction(&self) -> Result<(), VmError> {
    let threshold = self.settings.read().instruction_threshold;
    if threshold == 0 {
      return Ok(());
    };
    let count = self.instruction_count.fetch_add(1, Ordering::Relaxed) + 1;
    if count < threshold {
      return Ok(());
    };
    self.instruction_count.store(0, Ordering::Relaxed);
    let observer = self.settings.read().observer.clone();
    match observer {
      Some(observer) => observer.observe_instruction_count(self, count),
      None => Ok(()),
    }
  }

  /// Records entry into a script function call. The depth is restored when the guard drops.
  pub(crate) fn enter_call(&self) -> Result<CallDepthGuard<'_>, VmError> {
    let depth = self.call_depth.fetch_add(1, Ordering::Relaxed) + 1;
    let guard = CallDepthGuard {
      cx: self,
      _base: StackBase::enter(),
    };
    if depth > self.max_call_depth() {
      return Err(stack_overflow());
    };
    self.check_stack()?;
    Ok(guard)
  }

  /// Fails once more native stack is in use than the budget allows. Checked on every call, statement and expression.
  pub(crate) fn check_stack(&self) -> Result<(), VmError> {
    if stack_used() > self.stack_budget() {
      return Err(stack_overflow());
    };
    Ok(())
  }

  /// Hands a runtime problem to the error reporter and returns the fault it produces.
  pub fn report_runtime_error(&self, message: impl Into<String>, source_name: &str, line: u32) -> VmError {
    let d = Diagnostic::new(Severity::RuntimeError, RUNTIME_ERROR_CODE, message).with_position(
      source_name,
      line,
      None,
      0,
    );
    VmError::Evaluator(self.error_reporter().runtime_error(&d))
  }

  fn parse_options(&self, source_name: &str, line: u32) -> ParseOptions {
    ParseOptions {
      version: self.language_version().as_i32(),
      member_expr_as_function_name: self.has_feature(Feature::MemberExprAsFunctionName),
      reserved_keyword_as_identifier: self.has_feature(Feature::ReservedKeywordAsIdentifier),
      source_name: source_name.to_string(),
      base_line: line,
      stack_budget: self.stack_budget(),
      ..ParseOptions::default()
    }
  }

  // Every compilation entry point ends up here.
  fn compile(
    &self,
    scope: Option<&ObjectRef>,
    source: Option<&str>,
    reader: Option<&mut dyn Read>,
    source_name: &str,
    line: u32,
    as_function: bool,
  ) -> Result<Compiled, VmError> {
    if scope.is_some() != as_function {
      return Err(Misuse::InvalidCompileArguments("a scope is required exactly when compiling a function").into());
    };
    let text = match (source, reader) {
      (Some(s), None) => s.to_string(),
      (None, Some(r)) => {
        let mut buf = String::new();
        r.read_to_string(&mut buf)
          .map_err(|e| Misuse::SourceRead(e.to_string()))?;
        buf
      }
      _ => {
        return Err(Misuse::InvalidCompileArguments("exactly one of source text or reader is required").into())
      }
    };

    let reporter = self.error_reporter();
    let parsed = parse_script(&text, self.parse_options(source_name, line), reporter.as_ref());
    if parsed.error_count > 0 {
      let d = Diagnostic::new(
        Severity::RuntimeError,
        SYNTAX_ERRORS_CODE,
        format!("{} syntax error(s)", parsed.error_count),
      )
      .with_position(source_name, line, None, 0);
      return Err(VmError::Compile(reporter.runtime_error(&d)));
    };
    let node = parsed.script;
    match scope {
      None => Ok(Compiled::Script(Script { node })),
      Some(scope) => {
        let only_function = node.functions.len() == 1
          && node.body.iter().all(|s| matches!(*s.stx, Stmt::Empty));
        let Some(f) = node.functions.first().filter(|_| only_function) else {
          return Err(Misuse::InvalidCompileArguments("source must contain exactly one function").into());
        };
        Ok(Compiled::Function(new_interpreted_function(f.clone(), scope)?))
      }
    }
  }

  pub fn compile_script(&self, source: &str, source_name: &str, line: u32) -> Result<Script, VmError> {
    match self.compile(None, Some(source), None, source_name, line, false)? {
      Compiled::Script(s) => Ok(s),
      Compiled::Function(_) => Err(Misuse::InvalidCompileArguments("expected a script").into()),
    }
  }

  pub fn compile_reader(&self, reader: &mut dyn Read, source_name: &str, line: u32) -> Result<Script, VmError> {
    match self.compile(None, None, Some(reader), source_name, line, false)? {
      Compiled::Script(s) => Ok(s),
      Compiled::Function(_) => Err(Misuse::InvalidCompileArguments("expected a script").into()),
    }
  }

  /// Compiles source consisting of a single function into a function object closed over `scope`.
  pub fn compile_function(
    &self,
    scope: &ObjectRef,
    source: &str,
    source_name: &str,
    line: u32,
  ) -> Result<ObjectRef, VmError> {
    match self.compile(Some(scope), Some(source), None, source_name, line, true)? {
      Compiled::Function(f) => Ok(f),
      Compiled::Script(_) => Err(Misuse::InvalidCompileArguments("expected a function").into()),
    }
  }

  pub fn evaluate_string(
    &self,
    scope: &ObjectRef,
    source: &str,
    source_name: &str,
    line: u32,
  ) -> Result<Value, VmError> {
    self.compile_script(source, source_name, line)?.exec(self, scope)
  }

  pub fn evaluate_reader(
    &self,
    scope: &ObjectRef,
    reader: &mut dyn Read,
    source_name: &str,
    line: u32,
  ) -> Result<Value, VmError> {
    self.compile_reader(reader, source_name, line)?.exec(self, scope)
  }

  /// Whether `source` is complete enough to compile. Only an error raised at the end of the input makes it incomplete, so an interactive shell can keep reading lines.
  pub fn string_is_compilable_unit(&self, source: &str) -> bool {
    let parsed = parse_script(source, self.parse_options("", 1), &DiscardingReporter);
    !(parsed.error_count > 0 && parsed.hit_eof)
  }

  /// Installs the standard built-ins into `scope`, or into a new global object, and returns it.
  pub fn init_standard_objects(&self, scope: Option<ObjectRef>, sealed: bool) -> Result<ObjectRef, VmError> {
    builtins::init_standard_objects(self, scope, sealed)
  }
}

fn validate_optimization_level(level: i32) -> Result<(), VmError> {
  if !(-1..=9).contains(&level) {
    return Err(Misuse::InvalidOptimizationLevel(level).into());
  };
  Ok(())
}

fn stack_overflow() -> VmError {
  VmError::Termination(Termination::new(TerminationReason::StackOverflow))
}

pub(crate) struct CallDepthGuard<'a> {
  cx: &'a Context,
  _base: StackBase,
}

impl Drop for CallDepthGuard<'_> {
  fn drop(&mut self) {
    self.cx.call_depth.fetch_sub(1, Ordering::Relaxed);
  }
}
