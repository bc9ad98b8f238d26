//! An embeddable interpreter for ECMAScript 3 era JavaScript.
//!
//! The host creates a [`Context`], installs the standard objects into a global scope with [`Context::init_standard_objects`], then compiles and runs scripts against that scope:
//!
//! ```
//! use vm_es::Context;
//! use vm_es::Value;
//!
//! let cx = Context::new();
//! let global = cx.init_standard_objects(None, false).unwrap();
//! let v = cx.evaluate_string(&global, "0x1F + 010 + 1e2", "<eval>", 1).unwrap();
//! assert_eq!(v, Value::Number(139.0));
//! ```
//!
//! Scripts run on a tree-walking evaluator over the IR produced by `parse-es`. Objects are reference counted and may be shared between threads; the [`RuntimeRegistry`] tracks which Context is active on which unit of execution.
//!
//! Errors come in four kinds (see [`VmError`]): compile errors, exceptions that scripts can catch, terminations that they cannot, and misuse of the API by the host.

pub mod builtins;
pub mod coerce;
pub mod context;
pub mod error;
pub mod function;
mod interp;
pub mod object;
pub mod ops;
pub mod property;
pub mod registry;
pub mod scope;
pub mod value;

pub use crate::context::ClassShutter;
pub use crate::context::Context;
pub use crate::context::ContextOptions;
pub use crate::context::Feature;
pub use crate::context::InstructionObserver;
pub use crate::context::LanguageVersion;
pub use crate::context::Script;
pub use crate::context::SecurityController;
pub use crate::error::EcmaError;
pub use crate::error::EcmaErrorKind;
pub use crate::error::Misuse;
pub use crate::error::Termination;
pub use crate::error::TerminationReason;
pub use crate::error::VmError;
pub use crate::function::new_host_function;
pub use crate::object::enumerate::IdEnumeration;
pub use crate::object::ClassTag;
pub use crate::object::ObjectRef;
pub use crate::property::Accessor;
pub use crate::property::Attributes;
pub use crate::property::Hint;
pub use crate::property::PropertyKey;
pub use crate::registry::ContextListener;
pub use crate::registry::RuntimeRegistry;
pub use crate::registry::UnitId;
pub use crate::value::Value;
