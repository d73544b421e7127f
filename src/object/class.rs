//! The class model: declaration-order method lookup, single inheritance, and
//! instance construction.
//!
//! Grounded on `examples/jprochazk-hebi/src/isolate/class.rs`'s
//! `create_instance`/`create_native_instance` for the two-phase "allocate,
//! then bind self" construction shape, and on
//! `examples/original_source/object.cpp`'s `Class::GetMethod` (linear scan
//! by name only, then recurse into the parent) and `ClassInstance::Call`
//! (arity checked separately, after lookup, raising "not all arguments
//! provided" on mismatch) for the lookup and call semantics. The optional
//! hooks (`__init__`, `__str__`, `__add__`) use a second, arity-aware
//! lookup corresponding to the original's distinct `HasMethod(name, argc)`.

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

use crate::error::RuntimeError;
use crate::eval::EvalCtx;
use crate::scope::Scope;
use crate::syntax::ast::Node;
use crate::value::{Value, ValueHolder};

#[derive(Debug)]
pub struct Method {
  pub name: String,
  pub params: Vec<String>,
  pub body: Rc<Node>,
}

#[derive(Debug)]
pub struct Class {
  pub name: String,
  pub methods: Vec<Method>,
  pub parent: Option<Rc<Class>>,
}

impl Class {
  /// Declaration-order scan of this class's own methods first, falling back
  /// to the parent chain. Arity is not part of the key: the first method
  /// with a matching name wins regardless of its parameter count.
  pub fn get_method(&self, name: &str) -> Option<&Method> {
    if let Some(m) = self.methods.iter().find(|m| m.name == name) {
      return Some(m);
    }
    self.parent.as_ref()?.get_method(name)
  }

  /// Does a method with exactly this name AND this declared arity exist?
  /// Used only to decide whether an optional hook (`__init__`, `__str__`,
  /// `__add__`) should be invoked at all, as distinct from ordinary method
  /// dispatch, which resolves by name and checks arity only after lookup.
  pub fn has_method_arity(&self, name: &str, argc: usize) -> bool {
    if self
      .methods
      .iter()
      .any(|m| m.name == name && m.params.len() == argc)
    {
      return true;
    }
    self
      .parent
      .as_ref()
      .is_some_and(|p| p.has_method_arity(name, argc))
  }
}

pub struct ClassInstance {
  pub class: Rc<Class>,
  pub fields: RefCell<Scope>,
}

impl ClassInstance {
  /// Allocates the instance, then binds `self` as a non-owning back
  /// reference into its own field scope — matching the original's
  /// `ClassInstance::ClassInstance` installing `fields["self"] =
  /// ObjectHolder::Share(*this)`, except `Share` (an aliasing shared_ptr
  /// with a no-op deleter) is replaced with a true `Weak`, since a real
  /// `Rc` clone here would create a reference cycle the instance could
  /// never be dropped out of.
  pub fn new(class: Rc<Class>) -> Rc<ClassInstance> {
    let instance = Rc::new(ClassInstance {
      class,
      fields: RefCell::new(Scope::new()),
    });
    instance
      .fields
      .borrow_mut()
      .set("self", ValueHolder::self_ref(&instance));
    instance
  }

  pub fn has_method(&self, name: &str, argc: usize) -> bool {
    self.class.has_method_arity(name, argc)
  }

  /// Invokes `name` with `args` already evaluated. Arguments are bound into
  /// a fresh call scope (seeded with `self` and the parameter bindings)
  /// rather than written into `self.fields` directly: the original bound
  /// parameters straight into the instance's field map, so a method
  /// parameter silently aliased — and after the call, permanently
  /// overwrote — a same-named field. A fresh scope per call keeps
  /// parameters local the way a method call ordinarily should.
  pub fn call(
    self: &Rc<Self>,
    name: &str,
    args: Vec<ValueHolder>,
    ctx: &EvalCtx,
  ) -> Result<ValueHolder, RuntimeError> {
    let method = self
      .class
      .get_method(name)
      .ok_or_else(|| RuntimeError::new(format!("method '{name}' is not defined")))?;

    trace!(
      "dispatching '{}.{name}' ({} arg(s))",
      self.class.name,
      args.len()
    );

    if method.params.len() != args.len() {
      return Err(RuntimeError::new("not all arguments provided"));
    }

    let mut call_scope = Scope::new();
    call_scope.set("self", ValueHolder::self_ref(self));
    for (param, arg) in method.params.iter().zip(args) {
      call_scope.set(param.clone(), arg);
    }

    let body = Rc::clone(&method.body);
    body.execute(&mut call_scope, ctx)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn method(name: &str, params: &[&str]) -> Method {
    Method {
      name: name.into(),
      params: params.iter().map(|s| s.to_string()).collect(),
      body: Rc::new(Node::Compound(Vec::new())),
    }
  }

  #[test]
  fn lookup_prefers_declaration_order_within_a_class() {
    let class = Class {
      name: "T".into(),
      methods: vec![method("first", &[]), method("dup", &["a"]), method("dup", &["a", "b"])],
      parent: None,
    };
    let found = class.get_method("dup").unwrap();
    assert_eq!(found.params.len(), 1, "the first declared 'dup' should win regardless of arity");
  }

  #[test]
  fn lookup_checks_child_before_parent() {
    let parent = Rc::new(Class {
      name: "A".into(),
      methods: vec![method("hi", &[])],
      parent: None,
    });
    let child = Class {
      name: "B".into(),
      methods: vec![method("hi", &[])],
      parent: Some(parent.clone()),
    };
    assert!(std::ptr::eq(
      child.get_method("hi").unwrap(),
      &child.methods[0]
    ));
  }

  #[test]
  fn lookup_falls_back_into_the_parent_chain_on_miss() {
    let parent = Rc::new(Class {
      name: "A".into(),
      methods: vec![method("only_in_parent", &[])],
      parent: None,
    });
    let child = Class {
      name: "B".into(),
      methods: Vec::new(),
      parent: Some(parent),
    };
    assert!(child.get_method("only_in_parent").is_some());
    assert!(child.get_method("nowhere").is_none());
  }

  #[test]
  fn has_method_arity_requires_an_exact_match() {
    let class = Class {
      name: "T".into(),
      methods: vec![method("init", &["a"])],
      parent: None,
    };
    assert!(class.has_method_arity("init", 1));
    assert!(!class.has_method_arity("init", 0));
    assert!(!class.has_method_arity("init", 2));
  }

  #[test]
  fn arity_mismatch_on_call_fails_with_the_expected_message() {
    let class = Rc::new(Class {
      name: "T".into(),
      methods: vec![method("one_arg", &["a"])],
      parent: None,
    });
    let instance = ClassInstance::new(class);
    let ctx = EvalCtx {
      output: Rc::new(std::cell::RefCell::new(Box::new(Vec::<u8>::new()))),
    };
    let err = instance.call("one_arg", Vec::new(), &ctx).unwrap_err();
    assert_eq!(err.message, "not all arguments provided");
  }
}

pub fn display_instance(instance: &Rc<ClassInstance>, ctx: &EvalCtx) -> Result<String, RuntimeError> {
  if instance.has_method("__str__", 0) {
    let result = instance.call("__str__", Vec::new(), ctx)?;
    return Ok(match result.value() {
      Some(Value::Str(s)) => s,
      other => crate::eval::display_value(&ValueHolder::owned(other.unwrap_or(Value::None)), ctx)?,
    });
  }
  Ok(format!(
    "<{} instance at {:p}>",
    instance.class.name,
    Rc::as_ptr(instance)
  ))
}
