//! The runtime value universe and the ownership-aware holder that wraps it.
//!
//! `Value` is the plain union of what a variable can hold. `ValueHolder` adds
//! the ownership discipline the evaluator needs: an owned/shared value, a
//! non-owning back-reference (used only for the `self` binding, so an
//! instance's own field scope never keeps itself alive through an `Rc`
//! cycle), or the empty sentinel `Compound` uses to detect "no return yet".

use std::fmt;
use std::rc::{Rc, Weak};

use crate::object::class::{Class, ClassInstance};

#[derive(Clone)]
pub enum Value {
  Number(i64),
  Str(String),
  Bool(bool),
  None,
  Class(Rc<Class>),
  Instance(Rc<ClassInstance>),
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Number(n) => write!(f, "Number({n})"),
      Value::Str(s) => write!(f, "Str({s:?})"),
      Value::Bool(b) => write!(f, "Bool({b})"),
      Value::None => write!(f, "None"),
      Value::Class(c) => write!(f, "Class({})", c.name),
      Value::Instance(i) => write!(f, "Instance({})", i.class.name),
    }
  }
}

/// Wraps a [`Value`] with the ownership discipline the evaluator relies on.
///
/// `Owned` and `Shared` both carry the value directly: once a value lives
/// behind an `Rc` (instances, classes), cloning a `ValueHolder` is always a
/// cheap shared reference, so the distinction the original made between
/// "owns its storage" and "aliases someone else's" collapses in Rust, where
/// `Rc::clone` already expresses sharing without a separate holder variant.
/// `SelfRef` is kept as its own variant because it is the one case that must
/// NOT extend the reference count: binding `self` from a `Weak` avoids a
/// cycle between a `ClassInstance` and its own field scope.
#[derive(Clone)]
pub enum ValueHolder {
  Value(Value),
  SelfRef(Weak<ClassInstance>),
  Empty,
}

impl ValueHolder {
  pub fn owned(value: Value) -> Self {
    ValueHolder::Value(value)
  }

  pub fn none() -> Self {
    ValueHolder::Value(Value::None)
  }

  /// The "nothing produced" sentinel distinct from the language-level
  /// `None` literal: used for a `Compound` that ran to completion without a
  /// `Return`, and for an `IfElse` with no taken branch. Observably the two
  /// render identically (`display_value` and `is_true` both treat `Empty`
  /// the same as `Value::None`) — the distinction exists only so return
  /// propagation through nested blocks has something to detect.
  pub fn empty() -> Self {
    ValueHolder::Empty
  }

  pub fn instance(instance: Rc<ClassInstance>) -> Self {
    ValueHolder::Value(Value::Instance(instance))
  }

  pub fn self_ref(instance: &Rc<ClassInstance>) -> Self {
    ValueHolder::SelfRef(Rc::downgrade(instance))
  }

  pub fn is_empty(&self) -> bool {
    matches!(self, ValueHolder::Empty)
  }

  /// Resolves to a concrete [`Value`], upgrading a `SelfRef`'s `Weak`.
  ///
  /// Returns `None` only for `Empty` or a `SelfRef` whose instance has
  /// already been dropped (a dangling `self`, which cannot happen through
  /// normal evaluation since a method body only observes `self` while its
  /// receiving instance is alive on the call stack).
  pub fn value(&self) -> Option<Value> {
    match self {
      ValueHolder::Value(v) => Some(v.clone()),
      ValueHolder::SelfRef(weak) => weak.upgrade().map(Value::Instance),
      ValueHolder::Empty => None,
    }
  }

  pub fn as_instance(&self) -> Option<Rc<ClassInstance>> {
    match self.value()? {
      Value::Instance(i) => Some(i),
      _ => None,
    }
  }

  pub fn as_class(&self) -> Option<Rc<Class>> {
    match self.value()? {
      Value::Class(c) => Some(c),
      _ => None,
    }
  }

  pub fn as_number(&self) -> Option<i64> {
    match self.value()? {
      Value::Number(n) => Some(n),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<String> {
    match self.value()? {
      Value::Str(s) => Some(s),
      _ => None,
    }
  }
}

impl fmt::Debug for ValueHolder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.value() {
      Some(v) => v.fmt(f),
      Option::None => write!(f, "<empty>"),
    }
  }
}

/// `None`, `0`, `""` and `False` are falsy. Everything else — including any
/// class instance — is truthy. A bare class reference (not yet constructed
/// into an instance) is falsy: it carries no state to be true about.
pub fn is_true(holder: &ValueHolder) -> bool {
  match holder.value() {
    Some(Value::None) | Option::None => false,
    Some(Value::Number(n)) => n != 0,
    Some(Value::Str(s)) => !s.is_empty(),
    Some(Value::Bool(b)) => b,
    Some(Value::Instance(_)) => true,
    Some(Value::Class(_)) => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn none_zero_empty_string_and_false_are_falsy() {
    assert!(!is_true(&ValueHolder::none()));
    assert!(!is_true(&ValueHolder::owned(Value::Number(0))));
    assert!(!is_true(&ValueHolder::owned(Value::Str(String::new()))));
    assert!(!is_true(&ValueHolder::owned(Value::Bool(false))));
    assert!(!is_true(&ValueHolder::empty()));
  }

  #[test]
  fn nonzero_number_nonempty_string_and_true_are_truthy() {
    assert!(is_true(&ValueHolder::owned(Value::Number(1))));
    assert!(is_true(&ValueHolder::owned(Value::Number(-1))));
    assert!(is_true(&ValueHolder::owned(Value::Str("x".into()))));
    assert!(is_true(&ValueHolder::owned(Value::Bool(true))));
  }

  #[test]
  fn any_instance_is_truthy_but_a_bare_class_is_not() {
    let class = std::rc::Rc::new(Class {
      name: "T".into(),
      methods: Vec::new(),
      parent: None,
    });
    let instance = ClassInstance::new(class.clone());
    assert!(is_true(&ValueHolder::instance(instance)));
    assert!(!is_true(&ValueHolder::owned(Value::Class(class))));
  }

  #[test]
  fn self_ref_does_not_keep_the_instance_alive() {
    let class = std::rc::Rc::new(Class {
      name: "T".into(),
      methods: Vec::new(),
      parent: None,
    });
    let instance = ClassInstance::new(class);
    let self_holder = ValueHolder::self_ref(&instance);
    assert!(self_holder.as_instance().is_some());
    drop(instance);
    assert!(self_holder.as_instance().is_none());
  }
}
