//! The tree-walking evaluator: one `execute` per [`Node`] variant, operating
//! against a [`Scope`] and an [`EvalCtx`] that carries the output sink.
//!
//! The per-variant contracts are grounded on
//! `examples/original_source/statement.cpp`'s `Execute` overrides, with two
//! deliberate deviations from what that file actually does (documented
//! inline at `Add` and `ClassInstance::call` respectively) and the output
//! sink itself grounded on
//! `examples/jprochazk-hebi/src/isolate.rs`'s `Stdout` trait.

use std::any::Any;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::error::RuntimeError;
use crate::object::class::{display_instance, Class, ClassInstance, Method};
use crate::scope::Scope;
use crate::span::Span;
use crate::syntax::ast::{CompareOp, Node};
use crate::value::{is_true, Value, ValueHolder};

/// A writable sink that also supports downcasting, so an embedder can get
/// its buffer back after running a program (`Interpreter::io::<Vec<u8>>()`).
/// Mirrors the teacher's `Stdout` trait and its blanket impl exactly.
pub trait Output: Write + Any {
  fn as_any(&self) -> &dyn Any;
}

impl<T: Write + Any> Output for T {
  fn as_any(&self) -> &dyn Any {
    self
  }
}

pub struct EvalCtx {
  pub output: Rc<std::cell::RefCell<Box<dyn Output>>>,
}

/// Whether `node`'s static shape is one that can carry a `Return` out of a
/// `Compound`. This alone isn't sufficient to short-circuit: an `IfElse` or
/// nested `Compound` that ran to completion without hitting a `Return`
/// yields `Empty`, and an empty result must fall through to the next
/// statement rather than end the enclosing block early.
fn is_propagating(node: &Node) -> bool {
  matches!(node, Node::Return(_) | Node::IfElse { .. } | Node::Compound(_))
}

/// Renders a value the way `print` and `str(...)` do: raw strings (no
/// quoting), `True`/`False` for booleans, `None` for the none value, and an
/// instance's `__str__` result (or its identity) for class instances.
pub fn display_value(holder: &ValueHolder, ctx: &EvalCtx) -> Result<String, RuntimeError> {
  Ok(match holder.value() {
    Some(Value::Number(n)) => n.to_string(),
    Some(Value::Str(s)) => s,
    Some(Value::Bool(b)) => if b { "True" } else { "False" }.to_string(),
    Some(Value::None) | Option::None => "None".to_string(),
    Some(Value::Class(c)) => c.name.clone(),
    Some(Value::Instance(instance)) => display_instance(&instance, ctx)?,
  })
}

/// The two primitive comparators the language actually defines. All other
/// comparison operators are derived from these, matching
/// `examples/original_source/comparators.cpp`'s `Equal`/`Less`, which are
/// likewise the only two primitives the original implements.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
  match (lhs, rhs) {
    (Value::Str(a), Value::Str(b)) => a == b,
    (Value::Number(a), Value::Number(b)) => a == b,
    (Value::Bool(a), Value::Bool(b)) => a == b,
    (Value::None, Value::None) => true,
    _ => false,
  }
}

/// Same-kind underlying `<`; comparing across kinds is false rather than an
/// error, matching `Equal`'s cross-kind handling.
fn values_less(lhs: &Value, rhs: &Value) -> bool {
  match (lhs, rhs) {
    (Value::Str(a), Value::Str(b)) => a < b,
    (Value::Number(a), Value::Number(b)) => a < b,
    (Value::Bool(a), Value::Bool(b)) => a < b,
    _ => false,
  }
}

fn compare(op: CompareOp, lhs: &Value, rhs: &Value) -> bool {
  match op {
    CompareOp::Eq => values_equal(lhs, rhs),
    CompareOp::NotEq => !values_equal(lhs, rhs),
    CompareOp::Lt => values_less(lhs, rhs),
    CompareOp::Gt => values_less(rhs, lhs),
    CompareOp::Le => !values_less(rhs, lhs),
    CompareOp::Ge => !values_less(lhs, rhs),
  }
}

fn lookup_path(scope: &Scope, path: &[String], span: Span) -> Result<ValueHolder, RuntimeError> {
  match path {
    [name] => scope
      .get(name)
      .cloned()
      .ok_or_else(|| RuntimeError::at(format!("variable '{name}' is not defined"), span)),
    [head, field] => {
      let holder = scope
        .get(head)
        .cloned()
        .ok_or_else(|| RuntimeError::at(format!("variable '{head}' is not defined"), span))?;
      let instance = holder
        .as_instance()
        .ok_or_else(|| RuntimeError::at(format!("'{head}' is not an object"), span))?;
      let result = instance
        .fields
        .borrow()
        .get(field)
        .cloned()
        .ok_or_else(|| RuntimeError::at(format!("variable '{field}' is not defined"), span));
      result
    }
    _ => Err(RuntimeError::at("unsupported dotted path", span)),
  }
}

impl Node {
  pub fn execute(&self, scope: &mut Scope, ctx: &EvalCtx) -> Result<ValueHolder, RuntimeError> {
    match self {
      Node::Number(n) => Ok(ValueHolder::owned(Value::Number(*n))),
      Node::Str(s) => Ok(ValueHolder::owned(Value::Str(s.clone()))),
      Node::Bool(b) => Ok(ValueHolder::owned(Value::Bool(*b))),
      Node::NoneLit => Ok(ValueHolder::none()),

      Node::Variable(path, span) => lookup_path(scope, path, *span),

      Node::NewInstance {
        class_name,
        args,
        span,
      } => {
        let class = lookup_path(scope, std::slice::from_ref(class_name), *span)?
          .as_class()
          .ok_or_else(|| RuntimeError::at(format!("'{class_name}' is not a class"), *span))?;
        let instance = ClassInstance::new(class);
        if instance.has_method("__init__", args.len()) {
          let evaluated = args
            .iter()
            .map(|a| a.execute(scope, ctx))
            .collect::<Result<Vec<_>, _>>()?;
          instance.call("__init__", evaluated, ctx)?;
        }
        Ok(ValueHolder::instance(instance))
      }

      Node::MethodCall {
        receiver,
        method,
        args,
        span,
      } => {
        let receiver_val = receiver.execute(scope, ctx)?;
        let instance = receiver_val
          .as_instance()
          .ok_or_else(|| RuntimeError::at("method call on a non-object value", *span))?;
        let evaluated = args
          .iter()
          .map(|a| a.execute(scope, ctx))
          .collect::<Result<Vec<_>, _>>()?;
        instance.call(method, evaluated, ctx)
      }

      Node::Stringify(inner, _span) => {
        let value = inner.execute(scope, ctx)?;
        let s = display_value(&value, ctx)?;
        Ok(ValueHolder::owned(Value::Str(s)))
      }

      Node::Add(lhs, rhs, span) => {
        let lhs_val = lhs.execute(scope, ctx)?;
        if let Some(instance) = lhs_val.as_instance() {
          if instance.has_method("__add__", 1) {
            // The RHS is evaluated once, here, in the caller's scope. The
            // original re-evaluated it against the instance's own field
            // scope, so a name that happened to collide with one of the
            // instance's fields silently resolved to the field instead of
            // the caller's binding.
            let rhs_val = rhs.execute(scope, ctx)?;
            return instance.call("__add__", vec![rhs_val], ctx);
          }
        }
        let rhs_val = rhs.execute(scope, ctx)?;
        match (lhs_val.value(), rhs_val.value()) {
          (Some(Value::Number(a)), Some(Value::Number(b))) => {
            Ok(ValueHolder::owned(Value::Number(a + b)))
          }
          (Some(Value::Str(a)), Some(Value::Str(b))) => {
            Ok(ValueHolder::owned(Value::Str(a + &b)))
          }
          _ => Err(RuntimeError::at("invalid arguments for +", *span)),
        }
      }

      Node::Sub(lhs, rhs, span) => {
        numeric_binop(lhs, rhs, scope, ctx, *span, "-", |a, b| Ok(a - b))
      }
      Node::Mult(lhs, rhs, span) => {
        numeric_binop(lhs, rhs, scope, ctx, *span, "*", |a, b| Ok(a * b))
      }
      Node::Div(lhs, rhs, span) => numeric_binop(lhs, rhs, scope, ctx, *span, "/", |a, b| {
        if b == 0 {
          Err(RuntimeError::new("division by zero"))
        } else {
          Ok(a / b)
        }
      }),

      Node::Or(lhs, rhs) => {
        let l = lhs.execute(scope, ctx)?;
        let r = rhs.execute(scope, ctx)?;
        Ok(ValueHolder::owned(Value::Bool(is_true(&l) || is_true(&r))))
      }
      Node::And(lhs, rhs) => {
        let l = lhs.execute(scope, ctx)?;
        let r = rhs.execute(scope, ctx)?;
        Ok(ValueHolder::owned(Value::Bool(is_true(&l) && is_true(&r))))
      }
      Node::Not(inner) => {
        let v = inner.execute(scope, ctx)?;
        Ok(ValueHolder::owned(Value::Bool(!is_true(&v))))
      }
      Node::Unary(inner, span) => {
        let v = inner.execute(scope, ctx)?;
        let n = v
          .as_number()
          .ok_or_else(|| RuntimeError::at("unary '-' requires a number", *span))?;
        Ok(ValueHolder::owned(Value::Number(-n)))
      }

      Node::Comparison {
        op, lhs, rhs, ..
      } => {
        let l = lhs.execute(scope, ctx)?;
        let r = rhs.execute(scope, ctx)?;
        let (lv, rv) = (
          l.value().unwrap_or(Value::None),
          r.value().unwrap_or(Value::None),
        );
        Ok(ValueHolder::owned(Value::Bool(compare(*op, &lv, &rv))))
      }

      Node::Assignment { name, value } => {
        let v = value.execute(scope, ctx)?;
        scope.set(name.clone(), v.clone());
        Ok(v)
      }

      Node::FieldAssignment {
        object,
        field,
        value,
        span,
      } => {
        let target = object.execute(scope, ctx)?;
        let instance = target
          .as_instance()
          .ok_or_else(|| RuntimeError::at("field assignment on a non-object value", *span))?;
        let v = value.execute(scope, ctx)?;
        instance.fields.borrow_mut().set(field.clone(), v.clone());
        Ok(v)
      }

      Node::Print(args) => {
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
          let v = arg.execute(scope, ctx)?;
          rendered.push(display_value(&v, ctx)?);
        }
        let line = rendered.join(" ");
        let mut out = ctx.output.borrow_mut();
        writeln!(out, "{line}").map_err(|e| RuntimeError::new(format!("write error: {e}")))?;
        Ok(ValueHolder::empty())
      }

      Node::Return(inner) => inner.execute(scope, ctx),

      Node::IfElse {
        cond,
        if_body,
        else_body,
      } => {
        let c = cond.execute(scope, ctx)?;
        if is_true(&c) {
          if_body.execute(scope, ctx)
        } else if let Some(else_body) = else_body {
          else_body.execute(scope, ctx)
        } else {
          Ok(ValueHolder::empty())
        }
      }

      Node::Compound(statements) => {
        for stmt in statements {
          let result = stmt.execute(scope, ctx)?;
          if is_propagating(stmt) && !result.is_empty() {
            return Ok(result);
          }
        }
        Ok(ValueHolder::empty())
      }

      Node::ClassDefinition {
        name,
        methods,
        parent_name,
      } => {
        let parent = match parent_name {
          Some(p) => Some(scope.get(p).and_then(|h| h.as_class()).ok_or_else(|| {
            RuntimeError::new(format!("class '{p}' is not defined"))
          })?),
          Option::None => None,
        };
        let class = Rc::new(Class {
          name: name.clone(),
          methods: methods
            .iter()
            .map(|m| Method {
              name: m.name.clone(),
              params: m.params.clone(),
              body: Rc::clone(&m.body),
            })
            .collect(),
          parent,
        });
        debug!(
          "registering class '{name}' with {} method(s), parent={:?}",
          methods.len(),
          parent_name
        );
        let holder = ValueHolder::owned(Value::Class(class));
        scope.set(name.clone(), holder.clone());
        Ok(holder)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ctx() -> EvalCtx {
    EvalCtx {
      output: Rc::new(std::cell::RefCell::new(Box::new(Vec::<u8>::new()))),
    }
  }

  #[test]
  fn assignment_returns_the_same_handle_bound_into_scope() {
    let class = Rc::new(Class {
      name: "T".into(),
      methods: Vec::new(),
      parent: None,
    });
    let instance = ClassInstance::new(class);
    let mut scope = Scope::new();
    let node = Node::Assignment {
      name: "x".into(),
      value: Box::new(Node::Variable(vec!["seed".into()], Span::new(0, 0))),
    };
    scope.set("seed", ValueHolder::instance(instance.clone()));
    let result = node.execute(&mut scope, &ctx()).unwrap();
    let bound = scope.get("x").unwrap();
    assert!(Rc::ptr_eq(
      &result.as_instance().unwrap(),
      &bound.as_instance().unwrap()
    ));
  }

  #[test]
  fn compound_runs_to_completion_with_no_return_yields_empty() {
    let node = Node::Compound(vec![Node::Assignment {
      name: "x".into(),
      value: Box::new(Node::Number(1)),
    }]);
    let mut scope = Scope::new();
    let result = node.execute(&mut scope, &ctx()).unwrap();
    assert!(result.is_empty());
  }

  #[test]
  fn return_short_circuits_a_compound() {
    let node = Node::Compound(vec![
      Node::Return(Box::new(Node::Number(42))),
      Node::Assignment {
        name: "never".into(),
        value: Box::new(Node::Number(0)),
      },
    ]);
    let mut scope = Scope::new();
    let result = node.execute(&mut scope, &ctx()).unwrap();
    assert_eq!(result.as_number(), Some(42));
    assert!(!scope.contains("never"));
  }

  #[test]
  fn an_if_else_that_returns_short_circuits_the_enclosing_compound() {
    let inner_if = Node::IfElse {
      cond: Box::new(Node::Bool(true)),
      if_body: Box::new(Node::Compound(vec![Node::Return(Box::new(Node::Number(7)))])),
      else_body: None,
    };
    let node = Node::Compound(vec![
      inner_if,
      Node::Assignment {
        name: "never".into(),
        value: Box::new(Node::Number(0)),
      },
    ]);
    let mut scope = Scope::new();
    let result = node.execute(&mut scope, &ctx()).unwrap();
    assert_eq!(result.as_number(), Some(7));
    assert!(!scope.contains("never"));
  }

  #[test]
  fn division_by_zero_is_a_runtime_error() {
    let node = Node::Div(
      Box::new(Node::Number(1)),
      Box::new(Node::Number(0)),
      Span::new(0, 0),
    );
    let mut scope = Scope::new();
    let err = node.execute(&mut scope, &ctx()).unwrap_err();
    assert_eq!(err.message, "division by zero");
  }

  #[test]
  fn comparisons_are_derived_from_equal_and_less() {
    let five = Value::Number(5);
    let ten = Value::Number(10);
    assert!(compare(CompareOp::Lt, &five, &ten));
    assert!(compare(CompareOp::Gt, &ten, &five));
    assert!(compare(CompareOp::Le, &five, &five));
    assert!(compare(CompareOp::Ge, &five, &five));
    assert!(compare(CompareOp::NotEq, &five, &ten));
    assert!(!compare(CompareOp::Eq, &five, &ten));
  }

  #[test]
  fn cross_kind_comparisons_are_false_rather_than_errors() {
    let n = Value::Number(1);
    let s = Value::Str("1".into());
    assert!(!compare(CompareOp::Eq, &n, &s));
    assert!(!compare(CompareOp::Lt, &n, &s));
  }

  #[test]
  fn stringify_then_compare_is_idempotent_for_strings() {
    let node = Node::Stringify(Box::new(Node::Str("hi".into())), Span::new(0, 0));
    let mut scope = Scope::new();
    let once = node.execute(&mut scope, &ctx()).unwrap();
    let twice = node.execute(&mut scope, &ctx()).unwrap();
    assert_eq!(once.as_str(), twice.as_str());
    assert_eq!(once.as_str().unwrap(), "hi");
  }

  #[test]
  fn dotted_paths_longer_than_two_are_rejected() {
    let path = vec!["a".into(), "b".into(), "c".into()];
    let scope = Scope::new();
    let err = lookup_path(&scope, &path, Span::new(0, 0)).unwrap_err();
    assert_eq!(err.message, "unsupported dotted path");
  }
}

#[allow(clippy::too_many_arguments)]
fn numeric_binop(
  lhs: &Node,
  rhs: &Node,
  scope: &mut Scope,
  ctx: &EvalCtx,
  span: Span,
  op_name: &str,
  apply: impl Fn(i64, i64) -> Result<i64, RuntimeError>,
) -> Result<ValueHolder, RuntimeError> {
  let l = lhs.execute(scope, ctx)?;
  let r = rhs.execute(scope, ctx)?;
  match (l.as_number(), r.as_number()) {
    (Some(a), Some(b)) => Ok(ValueHolder::owned(Value::Number(apply(a, b)?))),
    _ => Err(RuntimeError::at(
      format!("invalid arguments for {op_name}"),
      span,
    )),
  }
}
