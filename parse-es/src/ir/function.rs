use super::node::Node;
use super::Stmt;
use super::TempId;
use crate::loc::Loc;
use ahash::HashSet;
use ahash::HashSetExt;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum FunctionKind {
  Script,
  /// `function f() {}` at statement level. Defined when the enclosing function is entered.
  Statement,
  Expression,
  /// `function a.b() {}`, lowered to an assignment of a function expression.
  ExpressionStatement,
}

/// A parsed script or function. Immutable once parsing finishes, and shared through `Arc` by every function object created from it.
#[derive(Debug, Serialize)]
pub struct FunctionNode {
  pub kind: FunctionKind,
  pub name: Option<String>,
  pub params: Vec<String>,
  /// Declared with `var`, in first-declaration order, without duplicates or parameters.
  pub vars: Vec<String>,
  #[serde(skip)]
  pub functions: Vec<Arc<FunctionNode>>,
  pub body: Vec<Node<Stmt>>,
  pub source_range: Loc,
  /// The text of `source_range`.
  pub source: String,
  pub source_name: String,
  pub base_line: u32,
  pub end_line: u32,
  pub temp_count: u32,
  pub needs_activation: bool,
  pub check_this: bool,
  pub ignore_dynamic_scope: bool,
}

impl FunctionNode {
  pub fn is_script(&self) -> bool {
    self.kind == FunctionKind::Script
  }

  pub fn function(&self, index: usize) -> Option<&Arc<FunctionNode>> {
    self.functions.get(index)
  }

  /// Nested functions that are hoisted into the scope when this function is entered.
  pub fn hoisted_functions(&self) -> impl Iterator<Item = &Arc<FunctionNode>> {
    self
      .functions
      .iter()
      .filter(|f| f.kind == FunctionKind::Statement)
  }
}

/// The mutable state of a function while its body is being parsed.
#[derive(Debug)]
pub struct FunctionBuilder {
  pub kind: FunctionKind,
  pub name: Option<String>,
  pub params: Vec<String>,
  vars: Vec<String>,
  var_set: HashSet<String>,
  pub functions: Vec<Arc<FunctionNode>>,
  pub base_line: u32,
  pub start: usize,
  temp_count: u32,
  catch_label_count: u32,
  pub needs_activation: bool,
  pub check_this: bool,
  pub ignore_dynamic_scope: bool,
}

impl FunctionBuilder {
  pub fn new(kind: FunctionKind, name: Option<String>, start: usize, base_line: u32) -> FunctionBuilder {
    FunctionBuilder {
      kind,
      name,
      params: Vec::new(),
      vars: Vec::new(),
      var_set: HashSet::new(),
      functions: Vec::new(),
      base_line,
      start,
      temp_count: 0,
      catch_label_count: 0,
      needs_activation: false,
      check_this: false,
      ignore_dynamic_scope: false,
    }
  }

  /// Records a parameter. Returns false if the name was already a parameter.
  pub fn add_param(&mut self, name: String) -> bool {
    let fresh = self.var_set.insert(name.clone());
    self.params.push(name);
    fresh
  }

  pub fn add_var(&mut self, name: &str) {
    if self.var_set.insert(name.to_string()) {
      self.vars.push(name.to_string());
    };
  }

  pub fn add_function(&mut self, function: FunctionNode) -> usize {
    self.functions.push(Arc::new(function));
    self.functions.len() - 1
  }

  pub fn new_temp(&mut self) -> TempId {
    let t = self.temp_count;
    self.temp_count += 1;
    t
  }

  pub fn new_catch_label(&mut self) -> String {
    let n = self.catch_label_count;
    self.catch_label_count += 1;
    format!("#catch{n}")
  }

  pub fn finish_parsing(
    self,
    body: Vec<Node<Stmt>>,
    source_range: Loc,
    source: String,
    source_name: String,
    end_line: u32,
  ) -> FunctionNode {
    FunctionNode {
      kind: self.kind,
      name: self.name,
      params: self.params,
      vars: self.vars,
      functions: self.functions,
      body,
      source_range,
      source,
      source_name,
      base_line: self.base_line,
      end_line,
      temp_count: self.temp_count,
      needs_activation: self.needs_activation,
      check_this: self.check_this,
      ignore_dynamic_scope: self.ignore_dynamic_scope,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::FunctionBuilder;
  use super::FunctionKind;
  use crate::loc::Loc;

  #[test]
  fn test_vars_are_ordered_and_deduplicated() {
    let mut b = FunctionBuilder::new(FunctionKind::Expression, None, 0, 1);
    assert!(b.add_param("a".to_string()));
    assert!(!b.add_param("a".to_string()));
    b.add_var("z");
    b.add_var("a");
    b.add_var("y");
    b.add_var("z");
    let f = b.finish_parsing(Vec::new(), Loc(0, 0), String::new(), "t".to_string(), 1);
    assert_eq!(f.params, vec!["a", "a"]);
    assert_eq!(f.vars, vec!["z", "y"]);
  }

  #[test]
  fn test_temps_and_labels_are_unique() {
    let mut b = FunctionBuilder::new(FunctionKind::Script, None, 0, 1);
    assert_eq!(b.new_temp(), 0);
    assert_eq!(b.new_temp(), 1);
    assert_eq!(b.new_catch_label(), "#catch0");
    assert_eq!(b.new_catch_label(), "#catch1");
  }
}
