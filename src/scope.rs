//! Name → value binding frames.
//!
//! A `Scope` is used both as the top-level (global) binding frame and as the
//! per-call frame an evaluated method body runs against. `IndexMap` is used
//! instead of `HashMap` so iteration order matches insertion order, the way
//! the teacher's `Context` keeps its `string_table` ordered for deterministic
//! debug output.

use indexmap::IndexMap;

use crate::value::ValueHolder;

#[derive(Default)]
pub struct Scope {
  bindings: IndexMap<String, ValueHolder>,
}

impl Scope {
  pub fn new() -> Self {
    Scope::default()
  }

  pub fn get(&self, name: &str) -> Option<&ValueHolder> {
    self.bindings.get(name)
  }

  pub fn set(&mut self, name: impl Into<String>, value: ValueHolder) {
    self.bindings.insert(name.into(), value);
  }

  pub fn contains(&self, name: &str) -> bool {
    self.bindings.contains_key(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::value::Value;

  #[test]
  fn set_then_get_returns_the_same_binding() {
    let mut scope = Scope::new();
    scope.set("x", ValueHolder::owned(Value::Number(1)));
    assert!(scope.contains("x"));
    assert_eq!(scope.get("x").unwrap().as_number(), Some(1));
  }

  #[test]
  fn later_set_overwrites_the_binding_in_place() {
    let mut scope = Scope::new();
    scope.set("x", ValueHolder::owned(Value::Number(1)));
    scope.set("x", ValueHolder::owned(Value::Number(2)));
    assert_eq!(scope.get("x").unwrap().as_number(), Some(2));
  }

  #[test]
  fn unknown_name_is_absent() {
    let scope = Scope::new();
    assert!(!scope.contains("missing"));
    assert!(scope.get("missing").is_none());
  }
}
