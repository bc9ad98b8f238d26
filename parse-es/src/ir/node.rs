use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

pub struct Node<S> {
  // Synthesized nodes (temporaries, desugared constructor calls) reuse the range of the construct they were lowered from.
  pub loc: Loc,
  // 1-based line of `loc.0`, shifted by the line the source was supplied with.
  pub line: u32,
  pub stx: Box<S>,
}

impl<S> Node<S> {
  pub fn new(loc: Loc, line: u32, stx: S) -> Node<S> {
    Node {
      loc,
      line,
      stx: Box::new(stx),
    }
  }

  /// Creates a new node at the same position, with syntax derived from this one.
  pub fn derive_stx<T, F: FnOnce(&S) -> T>(&self, f: F) -> Node<T> {
    Node::new(self.loc, self.line, f(&self.stx))
  }

  /// Wraps the node inside another node at the same position.
  pub fn wrap<T, F: FnOnce(Node<S>) -> T>(self, f: F) -> Node<T> {
    let loc = self.loc;
    let line = self.line;
    let stx = f(self);
    Node::new(loc, line, stx)
  }

  /// Create an error at this node's location.
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(typ, None)
  }
}

impl<S: Debug> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}

impl<S: Serialize> Serialize for Node<S> {
  fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
    self.stx.serialize(serializer)
  }
}
