//! Construction of IR nodes, including all early desugaring.

use super::function::FunctionBuilder;
use super::node::Node;
use super::BinaryOp;
use super::Expr;
use super::PropKey;
use super::SpecialProp;
use super::Stmt;
use super::TempId;
use super::UnaryOp;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::num::JsNumber;

/// Language version 1.2, which has its own array literal and equality rules.
pub const VERSION_1_2: i32 = 120;

/// The left-hand side of a for-in statement.
pub enum ForInTarget {
  Var(String),
  Expr(Node<Expr>),
}

pub struct CatchClause {
  pub loc: Loc,
  pub line: u32,
  pub name: String,
  pub guard: Option<Node<Expr>>,
  pub body: Node<Stmt>,
}

/// Builds nodes for the function currently being parsed. Temporaries and synthetic labels are allocated from that function.
pub struct IrFactory<'f> {
  func: &'f mut FunctionBuilder,
  version: i32,
}

impl<'f> IrFactory<'f> {
  pub fn new(func: &'f mut FunctionBuilder, version: i32) -> IrFactory<'f> {
    IrFactory { func, version }
  }

  fn temp_get(loc: Loc, line: u32, temp: TempId) -> Node<Expr> {
    Node::new(loc, line, Expr::GetTemp { temp })
  }

  fn temp_set(temp: TempId, value: Node<Expr>) -> Node<Expr> {
    value.wrap(|value| Expr::SetTemp { temp, value })
  }

  fn number(loc: Loc, line: u32, value: f64) -> Node<Expr> {
    Node::new(loc, line, Expr::Number {
      value: JsNumber(value),
    })
  }

  fn comma(loc: Loc, line: u32, exprs: Vec<Node<Expr>>) -> Node<Expr> {
    Node::new(loc, line, Expr::Comma { exprs })
  }

  pub fn create_binary(&self, op: BinaryOp, left: Node<Expr>, right: Node<Expr>) -> Node<Expr> {
    let op = match op {
      BinaryOp::Eq if self.version == VERSION_1_2 => BinaryOp::StrictEq,
      BinaryOp::Ne if self.version == VERSION_1_2 => BinaryOp::StrictNe,
      op => op,
    };
    let loc = left.loc.add(right.loc);
    let line = left.line;
    Node::new(loc, line, Expr::Binary { op, left, right })
  }

  /// `obj.name`, or a link read for `__proto__` and `__parent__`.
  pub fn create_property_get(&self, loc: Loc, line: u32, obj: Node<Expr>, name: String) -> Node<Expr> {
    match SpecialProp::from_name(&name) {
      Some(prop) => Node::new(loc, line, Expr::GetSpecial { obj, prop }),
      None => Node::new(loc, line, Expr::GetProp {
        obj,
        key: PropKey::Named { name },
      }),
    }
  }

  pub fn create_element_get(&self, loc: Loc, line: u32, obj: Node<Expr>, key: Node<Expr>) -> Node<Expr> {
    Node::new(loc, line, Expr::GetProp {
      obj,
      key: PropKey::Computed { key },
    })
  }

  pub fn create_typeof(&self, loc: Loc, line: u32, operand: Node<Expr>) -> Node<Expr> {
    let (op_loc, op_line) = (operand.loc, operand.line);
    match *operand.stx {
      Expr::Name { name } => Node::new(loc, line, Expr::TypeofName { name }),
      stx => Node::new(loc, line, Expr::Unary {
        op: UnaryOp::Typeof,
        operand: Node::new(op_loc, op_line, stx),
      }),
    }
  }

  pub fn create_delete(&self, loc: Loc, line: u32, operand: Node<Expr>) -> Node<Expr> {
    let (op_loc, op_line) = (operand.loc, operand.line);
    match *operand.stx {
      Expr::Name { name } => Node::new(loc, line, Expr::DeleteName { name }),
      Expr::GetProp { obj, key } => {
        let key = match key {
          PropKey::Named { name } => Node::new(op_loc, op_line, Expr::String { value: name }),
          PropKey::Computed { key } => key,
        };
        Node::new(loc, line, Expr::DeleteProp { obj, key })
      }
      Expr::GetSpecial { obj, prop } => Node::new(loc, line, Expr::DeleteProp {
        obj,
        key: Node::new(op_loc, op_line, Expr::String {
          value: prop.name().to_string(),
        }),
      }),
      stx => Self::comma(loc, line, vec![
        Node::new(op_loc, op_line, stx),
        Node::new(loc, line, Expr::Bool { value: true }),
      ]),
    }
  }

  /// Plain (`op` is None) or compound assignment. Object and key of a property target are evaluated once.
  pub fn create_assignment(
    &mut self,
    op: Option<BinaryOp>,
    target: Node<Expr>,
    value: Node<Expr>,
  ) -> SyntaxResult<Node<Expr>> {
    let loc = target.loc.add(value.loc);
    let line = target.line;
    let (t_loc, t_line) = (target.loc, target.line);
    Ok(match *target.stx {
      Expr::Name { name } => {
        let value = match op {
          None => value,
          Some(op) => {
            let current = Node::new(t_loc, t_line, Expr::Name { name: name.clone() });
            self.create_binary(op, current, value)
          }
        };
        Node::new(loc, line, Expr::SetName { name, value })
      }
      Expr::GetProp { obj, key } => {
        let Some(op) = op else {
          return Ok(Node::new(loc, line, Expr::SetProp { obj, key, value }));
        };
        let (exprs, obj_ref, key_ref, key_again) = self.capture_target(obj, key);
        let mut exprs = exprs;
        let current = Node::new(t_loc, t_line, Expr::GetProp {
          obj: obj_ref.derive_stx(|o| clone_temp(o)),
          key: key_again,
        });
        let value = self.create_binary(op, current, value);
        exprs.push(Node::new(loc, line, Expr::SetProp {
          obj: obj_ref,
          key: key_ref,
          value,
        }));
        Self::comma(loc, line, exprs)
      }
      Expr::GetSpecial { obj, prop } => {
        let Some(op) = op else {
          return Ok(Node::new(loc, line, Expr::SetSpecial { obj, prop, value }));
        };
        let to = self.func.new_temp();
        let (o_loc, o_line) = (obj.loc, obj.line);
        let current = Node::new(t_loc, t_line, Expr::GetSpecial {
          obj: Self::temp_get(o_loc, o_line, to),
          prop,
        });
        let value = self.create_binary(op, current, value);
        Self::comma(loc, line, vec![
          Self::temp_set(to, obj),
          Node::new(loc, line, Expr::SetSpecial {
            obj: Self::temp_get(o_loc, o_line, to),
            prop,
            value,
          }),
        ])
      }
      _ => return Err(t_loc.error(SyntaxErrorType::InvalidAssignmentTarget, None)),
    })
  }

  /// Stores the object (and a computed key) of a property reference in temporaries. Returns the stores, a read of the object temporary, and two keys reading the same property.
  fn capture_target(
    &mut self,
    obj: Node<Expr>,
    key: PropKey,
  ) -> (Vec<Node<Expr>>, Node<Expr>, PropKey, PropKey) {
    let to = self.func.new_temp();
    let (o_loc, o_line) = (obj.loc, obj.line);
    let mut exprs = vec![Self::temp_set(to, obj)];
    let (k1, k2) = match key {
      PropKey::Named { name } => (
        PropKey::Named { name: name.clone() },
        PropKey::Named { name },
      ),
      PropKey::Computed { key } => {
        let tk = self.func.new_temp();
        let (k_loc, k_line) = (key.loc, key.line);
        exprs.push(Self::temp_set(tk, key));
        (
          PropKey::Computed {
            key: Self::temp_get(k_loc, k_line, tk),
          },
          PropKey::Computed {
            key: Self::temp_get(k_loc, k_line, tk),
          },
        )
      }
    };
    (exprs, Self::temp_get(o_loc, o_line, to), k1, k2)
  }

  /// `++x`, `x--` and friends.
  pub fn create_inc_dec(
    &mut self,
    loc: Loc,
    line: u32,
    target: Node<Expr>,
    increment: bool,
    postfix: bool,
  ) -> SyntaxResult<Node<Expr>> {
    let op = if increment { BinaryOp::Add } else { BinaryOp::Sub };
    let (t_loc, t_line) = (target.loc, target.line);
    let to_number = |e: Node<Expr>| {
      e.wrap(|operand| Expr::Unary {
        op: UnaryOp::ToNumber,
        operand,
      })
    };

    // Stores capturing the target, a read of its current value, and how to write a new value back.
    let (mut exprs, current, store): (Vec<Node<Expr>>, Node<Expr>, Box<dyn FnOnce(Node<Expr>) -> Expr>) =
      match *target.stx {
        Expr::Name { name } => {
          let current = Node::new(t_loc, t_line, Expr::Name { name: name.clone() });
          (Vec::new(), current, Box::new(move |value| Expr::SetName { name, value }))
        }
        Expr::GetProp { obj, key } => {
          let (exprs, obj_ref, key_ref, key_again) = self.capture_target(obj, key);
          let current = Node::new(t_loc, t_line, Expr::GetProp {
            obj: obj_ref.derive_stx(|o| clone_temp(o)),
            key: key_again,
          });
          (
            exprs,
            current,
            Box::new(move |value| Expr::SetProp {
              obj: obj_ref,
              key: key_ref,
              value,
            }),
          )
        }
        Expr::GetSpecial { obj, prop } => {
          let to = self.func.new_temp();
          let (o_loc, o_line) = (obj.loc, obj.line);
          let current = Node::new(t_loc, t_line, Expr::GetSpecial {
            obj: Self::temp_get(o_loc, o_line, to),
            prop,
          });
          (
            vec![Self::temp_set(to, obj)],
            current,
            Box::new(move |value| Expr::SetSpecial {
              obj: Self::temp_get(o_loc, o_line, to),
              prop,
              value,
            }),
          )
        }
        _ => return Err(t_loc.error(SyntaxErrorType::InvalidAssignmentTarget, None)),
      };

    let one = Self::number(loc, line, 1.0);
    if !postfix {
      let value = self.create_binary(op, to_number(current), one);
      exprs.push(Node::new(loc, line, store(value)));
    } else {
      let t = self.func.new_temp();
      exprs.push(Self::temp_set(t, to_number(current)));
      let value = self.create_binary(op, Self::temp_get(loc, line, t), one);
      exprs.push(Node::new(loc, line, store(value)));
      exprs.push(Self::temp_get(loc, line, t));
    };
    Ok(if exprs.len() == 1 {
      exprs.pop().unwrap_or_else(|| Node::new(loc, line, Expr::Error))
    } else {
      Self::comma(loc, line, exprs)
    })
  }

  /// `[a,,b]`. Holes are `None` and are skipped.
  pub fn create_array_literal(
    &mut self,
    loc: Loc,
    line: u32,
    elements: Vec<Option<Node<Expr>>>,
  ) -> Node<Expr> {
    let t = self.func.new_temp();
    let len = elements.len();
    let trailing_hole = matches!(elements.last(), Some(None));
    let args = if self.version == VERSION_1_2 {
      Vec::new()
    } else {
      vec![Self::number(loc, line, len as f64)]
    };
    let ctor = Node::new(loc, line, Expr::New {
      callee: Node::new(loc, line, Expr::Name {
        name: "Array".to_string(),
      }),
      args,
    });
    let mut exprs = vec![Self::temp_set(t, ctor)];
    for (i, e) in elements.into_iter().enumerate() {
      let Some(value) = e else {
        continue;
      };
      let (v_loc, v_line) = (value.loc, value.line);
      exprs.push(Node::new(v_loc, v_line, Expr::SetProp {
        obj: Self::temp_get(loc, line, t),
        key: PropKey::Computed {
          key: Self::number(v_loc, v_line, i as f64),
        },
        value,
      }));
    }
    if self.version == VERSION_1_2 && trailing_hole {
      exprs.push(Node::new(loc, line, Expr::SetProp {
        obj: Self::temp_get(loc, line, t),
        key: PropKey::Named {
          name: "length".to_string(),
        },
        value: Self::number(loc, line, len as f64),
      }));
    };
    exprs.push(Self::temp_get(loc, line, t));
    Self::comma(loc, line, exprs)
  }

  /// `{k: v}`. Keys have already been converted to their string form.
  pub fn create_object_literal(
    &mut self,
    loc: Loc,
    line: u32,
    props: Vec<(String, Node<Expr>)>,
  ) -> Node<Expr> {
    let t = self.func.new_temp();
    let ctor = Node::new(loc, line, Expr::New {
      callee: Node::new(loc, line, Expr::Name {
        name: "Object".to_string(),
      }),
      args: Vec::new(),
    });
    let mut exprs = vec![Self::temp_set(t, ctor)];
    for (name, value) in props {
      let (v_loc, v_line) = (value.loc, value.line);
      let obj = Self::temp_get(loc, line, t);
      let stx = match SpecialProp::from_name(&name) {
        Some(prop) => Expr::SetSpecial { obj, prop, value },
        None => Expr::SetProp {
          obj,
          key: PropKey::Named { name },
          value,
        },
      };
      exprs.push(Node::new(v_loc, v_line, stx));
    }
    exprs.push(Self::temp_get(loc, line, t));
    Self::comma(loc, line, exprs)
  }

  /// Lowers `for (lhs in obj) body` to the explicit enumeration protocol.
  pub fn create_for_in(
    &mut self,
    loc: Loc,
    line: u32,
    labels: Vec<String>,
    target: ForInTarget,
    obj: Node<Expr>,
    body: Node<Stmt>,
  ) -> SyntaxResult<Node<Stmt>> {
    let target = match target {
      ForInTarget::Var(name) => Node::new(loc, line, Expr::Name { name }),
      ForInTarget::Expr(e) => {
        if !e.stx.is_reference() {
          return Err(e.error(SyntaxErrorType::InvalidForInTarget));
        };
        e
      }
    };
    let t = self.func.new_temp();
    let id = Node::new(target.loc, target.line, Expr::EnumId { temp: t });
    let assign = self.create_assignment(None, target, id)?;
    let (b_loc, b_line) = (body.loc, body.line);
    let loop_body = Node::new(b_loc, b_line, Stmt::Block {
      body: vec![assign.wrap(|expr| Stmt::Expr { expr }), body],
    });
    Ok(Node::new(loc, line, Stmt::Block {
      body: vec![
        obj.wrap(|obj| Stmt::EnumInit { temp: t, obj }),
        Node::new(loc, line, Stmt::Loop {
          labels,
          init: None,
          test: Some(Node::new(loc, line, Expr::EnumNext { temp: t })),
          update: None,
          body: loop_body,
          post_test: false,
        }),
        Node::new(loc, line, Stmt::EnumDone { temp: t }),
      ],
    }))
  }

  /// Lowers try/catch/finally. The caller has already rejected a try with neither catch nor finally.
  pub fn create_try(
    &mut self,
    loc: Loc,
    line: u32,
    block: Node<Stmt>,
    catches: Vec<CatchClause>,
    finally: Option<Node<Stmt>>,
  ) -> Node<Stmt> {
    let empty_block = matches!(&*block.stx, Stmt::Block { body } if body.is_empty());
    if empty_block && finally.is_none() {
      return Node::new(loc, line, Stmt::Empty);
    };
    let exn = self.func.new_temp();
    let handler = if catches.is_empty() {
      None
    } else {
      let label = self.func.new_catch_label();
      let mut stmts = Vec::with_capacity(catches.len() + 1);
      for c in catches {
        let body = Node::new(c.body.loc, c.body.line, Stmt::Block {
          body: vec![c.body, Node::new(c.loc, c.line, Stmt::Break {
            label: Some(label.clone()),
          })],
        });
        let body = match c.guard {
          Some(test) => Node::new(c.loc, c.line, Stmt::If {
            test,
            consequent: body,
            alternate: None,
          }),
          None => body,
        };
        stmts.push(Node::new(c.loc, c.line, Stmt::CatchScope {
          name: c.name,
          exn,
          body,
        }));
      }
      stmts.push(Node::new(loc, line, Stmt::Throw {
        value: Self::temp_get(loc, line, exn),
      }));
      Some(Node::new(loc, line, Stmt::Labeled {
        labels: vec![label],
        body: Node::new(loc, line, Stmt::Block { body: stmts }),
      }))
    };
    Node::new(loc, line, Stmt::Try {
      block,
      exn,
      handler,
      finally,
    })
  }
}

// Duplicates a temporary read. Only ever called on nodes produced by `temp_get`.
fn clone_temp(e: &Expr) -> Expr {
  match e {
    Expr::GetTemp { temp } => Expr::GetTemp { temp: *temp },
    _ => Expr::Error,
  }
}
