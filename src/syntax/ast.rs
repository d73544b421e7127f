//! The abstract syntax tree.
//!
//! Unlike a typical recursive-descent interpreter that splits `Expr` and
//! `Stmt` into separate types, this tree uses a single `Node` enum for both,
//! mirroring the original language's `Ast::Statement` base class: every node,
//! expression or statement alike, is executed the same way against a scope
//! and produces a value (`Print` and `Assignment` happen to produce one too).

use crate::object::class::Method;
use crate::span::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
  Eq,
  NotEq,
  Lt,
  Gt,
  Le,
  Ge,
}

#[derive(Debug)]
pub enum Node {
  Number(i64),
  Str(String),
  Bool(bool),
  NoneLit,

  /// A dotted path, either a plain name (`["x"]`) or a single-level field
  /// read (`["x", "field"]`). Longer paths are not supported.
  Variable(Vec<String>, Span),

  NewInstance {
    class_name: String,
    args: Vec<Node>,
    span: Span,
  },
  MethodCall {
    receiver: Box<Node>,
    method: String,
    args: Vec<Node>,
    span: Span,
  },
  Stringify(Box<Node>, Span),

  Add(Box<Node>, Box<Node>, Span),
  Sub(Box<Node>, Box<Node>, Span),
  Mult(Box<Node>, Box<Node>, Span),
  Div(Box<Node>, Box<Node>, Span),
  Or(Box<Node>, Box<Node>),
  And(Box<Node>, Box<Node>),
  Not(Box<Node>),
  Comparison {
    op: CompareOp,
    lhs: Box<Node>,
    rhs: Box<Node>,
    span: Span,
  },
  Unary(Box<Node>, Span),

  Assignment {
    name: String,
    value: Box<Node>,
  },
  FieldAssignment {
    object: Box<Node>,
    field: String,
    value: Box<Node>,
    span: Span,
  },

  Print(Vec<Node>),
  Return(Box<Node>),
  IfElse {
    cond: Box<Node>,
    if_body: Box<Node>,
    else_body: Option<Box<Node>>,
  },
  Compound(Vec<Node>),
  /// A class declaration. `parent_name`, when present, is resolved against
  /// the enclosing scope at evaluation time rather than at parse time,
  /// since classes are bound into scope the same way variables are and a
  /// parent class need only exist by the time this statement executes, not
  /// by the time it is parsed.
  ClassDefinition {
    name: String,
    methods: Vec<Method>,
    parent_name: Option<String>,
  },
}
