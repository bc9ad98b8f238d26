//! The intermediate representation produced by the parser.
//!
//! The tree is already desugared: literals of compound values are constructor calls, `++`/`--` and compound assignment are plain assignments over temporaries, for-in is an explicit enumeration protocol, and catch clauses are scoped blocks under a synthetic label. The evaluator only has to understand what is declared here.

pub mod factory;
pub mod function;
pub mod node;

use crate::num::JsNumber;
use node::Node;
use serde::Serialize;

/// A per-function evaluator temporary.
pub type TempId = u32;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum BinaryOp {
  Add,
  BitAnd,
  BitOr,
  BitXor,
  Div,
  Eq,
  Ge,
  Gt,
  In,
  Instanceof,
  Le,
  Lt,
  Mod,
  Mul,
  Ne,
  Shl,
  Shr,
  StrictEq,
  StrictNe,
  Sub,
  UShr,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum UnaryOp {
  BitNot,
  Neg,
  Not,
  Pos,
  /// Converts to a number without the `+` operator's syntax. Produced when lowering postfix `++`/`--`.
  ToNumber,
  Typeof,
  Void,
}

/// Properties that are links rather than slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum SpecialProp {
  Parent,
  Proto,
}

impl SpecialProp {
  pub fn from_name(name: &str) -> Option<SpecialProp> {
    match name {
      "__proto__" => Some(SpecialProp::Proto),
      "__parent__" => Some(SpecialProp::Parent),
      _ => None,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      SpecialProp::Parent => "__parent__",
      SpecialProp::Proto => "__proto__",
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(tag = "$t")]
pub enum PropKey {
  Named { name: String },
  Computed { key: Node<Expr> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "$t")]
pub enum Expr {
  Bool {
    value: bool,
  },
  Null,
  Number {
    value: JsNumber,
  },
  Regexp {
    pattern: String,
    flags: String,
  },
  String {
    value: String,
  },
  This,
  Undefined,

  Name {
    name: String,
  },
  /// `typeof name`. Unlike a plain read this does not raise for an unbound name.
  TypeofName {
    name: String,
  },
  SetName {
    name: String,
    value: Node<Expr>,
  },

  GetProp {
    obj: Node<Expr>,
    key: PropKey,
  },
  SetProp {
    obj: Node<Expr>,
    key: PropKey,
    value: Node<Expr>,
  },
  GetSpecial {
    obj: Node<Expr>,
    prop: SpecialProp,
  },
  SetSpecial {
    obj: Node<Expr>,
    prop: SpecialProp,
    value: Node<Expr>,
  },
  DeleteName {
    name: String,
  },
  DeleteProp {
    obj: Node<Expr>,
    key: Node<Expr>,
  },

  Call {
    callee: Node<Expr>,
    args: Vec<Node<Expr>>,
  },
  New {
    callee: Node<Expr>,
    args: Vec<Node<Expr>>,
  },
  /// Instantiates the nested function at this index of the enclosing function's table.
  Function {
    index: usize,
  },

  Unary {
    op: UnaryOp,
    operand: Node<Expr>,
  },
  Binary {
    op: BinaryOp,
    left: Node<Expr>,
    right: Node<Expr>,
  },
  And {
    left: Node<Expr>,
    right: Node<Expr>,
  },
  Or {
    left: Node<Expr>,
    right: Node<Expr>,
  },
  Cond {
    test: Node<Expr>,
    consequent: Node<Expr>,
    alternate: Node<Expr>,
  },
  /// Evaluates every expression in order and produces the last value.
  Comma {
    exprs: Vec<Node<Expr>>,
  },

  GetTemp {
    temp: TempId,
  },
  SetTemp {
    temp: TempId,
    value: Node<Expr>,
  },
  /// Advances the enumeration held in the temporary, producing whether a key is available.
  EnumNext {
    temp: TempId,
  },
  /// The key the enumeration in the temporary is positioned at.
  EnumId {
    temp: TempId,
  },

  /// Placeholder left behind by a reported syntax error. Never reaches the evaluator.
  Error,
}

#[derive(Debug, Serialize)]
pub struct SwitchCase {
  /// None for `default`.
  pub test: Option<Node<Expr>>,
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "$t")]
pub enum Stmt {
  Block {
    body: Vec<Node<Stmt>>,
  },
  Empty,
  Expr {
    expr: Node<Expr>,
  },
  If {
    test: Node<Expr>,
    consequent: Node<Stmt>,
    alternate: Option<Node<Stmt>>,
  },
  /// Every loop form. `test` is checked before each iteration, or after it when `post_test` is set; an absent test always passes.
  Loop {
    labels: Vec<String>,
    init: Option<Node<Expr>>,
    test: Option<Node<Expr>>,
    update: Option<Node<Expr>>,
    body: Node<Stmt>,
    post_test: bool,
  },
  EnumInit {
    temp: TempId,
    obj: Node<Expr>,
  },
  EnumDone {
    temp: TempId,
  },
  Switch {
    labels: Vec<String>,
    discriminant: Node<Expr>,
    cases: Vec<SwitchCase>,
  },
  /// A labelled statement that is not a loop or switch. Only `break` can target it.
  Labeled {
    labels: Vec<String>,
    body: Node<Stmt>,
  },
  Break {
    label: Option<String>,
  },
  Continue {
    label: Option<String>,
  },
  Return {
    value: Option<Node<Expr>>,
  },
  Throw {
    value: Node<Expr>,
  },
  /// The caught value is stored in `exn` before `handler` runs.
  Try {
    block: Node<Stmt>,
    exn: TempId,
    handler: Option<Node<Stmt>>,
    finally: Option<Node<Stmt>>,
  },
  /// Runs `body` with a new scope object that binds `name` to the value in `exn`.
  CatchScope {
    name: String,
    exn: TempId,
    body: Node<Stmt>,
  },
  With {
    obj: Node<Expr>,
    body: Node<Stmt>,
  },
  /// Placeholder left behind by a reported syntax error. Never reaches the evaluator.
  Error,
}

impl Expr {
  /// Whether the expression can be assigned to.
  pub fn is_reference(&self) -> bool {
    matches!(
      self,
      Expr::Name { .. } | Expr::GetProp { .. } | Expr::GetSpecial { .. }
    )
  }
}
