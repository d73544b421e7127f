//! A tree-walking interpreter for a small, indentation-structured scripting
//! language: dynamically typed, with single inheritance and user-defined
//! operator methods (`__init__`, `__str__`, `__add__`).
//!
//! The entry point is [`Interpreter`], built with [`InterpreterBuilder`] the
//! way the teacher builds a VM with `HebiBuilder`.

pub mod error;
pub mod eval;
pub mod object;
pub mod scope;
pub mod span;
pub mod syntax;
pub mod value;

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::io;
use std::rc::Rc;

use error::{Error, ParseError};
use eval::{EvalCtx, Output};
use scope::Scope;
use value::ValueHolder;

/// Owns the global scope and the installed output sink. One `Interpreter`
/// per independently-evaluated program; nothing here is `Send`/`Sync`, the
/// same as the single-threaded object graph it evaluates (`Rc`/`RefCell`
/// throughout, matching the teacher's own single-threaded `Isolate`).
pub struct Interpreter {
  globals: Scope,
  ctx: EvalCtx,
}

impl Interpreter {
  pub fn builder() -> InterpreterBuilder {
    InterpreterBuilder::default()
  }

  /// Lexes, parses, and evaluates `src` against this interpreter's global
  /// scope, returning the last top-level statement's result.
  pub fn eval(&mut self, src: &str) -> Result<ValueHolder, Error> {
    let program = syntax::parser::parse(src)?;
    let mut result = ValueHolder::none();
    for stmt in &program {
      result = stmt.execute(&mut self.globals, &self.ctx)?;
    }
    Ok(result)
  }

  /// Lexes and parses `src` without evaluating it, surfacing every syntax
  /// error collected along the way rather than only the first.
  pub fn check(&self, src: &str) -> Result<(), Vec<ParseError>> {
    syntax::parser::parse(src).map(|_| ())
  }

  /// Borrows the installed output sink downcast to `T`, mirroring the
  /// teacher's `Hebi::io::<T>()`. Returns `None` if the installed sink is
  /// not actually a `T`.
  pub fn io<T: Any>(&self) -> Option<Ref<'_, T>> {
    Ref::filter_map(self.ctx.output.borrow(), |out| (**out).as_any().downcast_ref::<T>()).ok()
  }
}

impl Default for Interpreter {
  fn default() -> Self {
    Interpreter::builder().build()
  }
}

/// Builds an [`Interpreter`], mirroring `HebiBuilder`'s shape: a small
/// number of optional knobs defaulted sensibly, finished off by `build()`.
pub struct InterpreterBuilder {
  output: Box<dyn Output>,
}

impl Default for InterpreterBuilder {
  fn default() -> Self {
    InterpreterBuilder {
      output: Box::new(io::stdout()),
    }
  }
}

impl InterpreterBuilder {
  /// Installs the sink that `print` and `str(...)`'s rendering write
  /// through. Defaults to `std::io::stdout()`.
  pub fn with_output(mut self, output: impl Output + 'static) -> Self {
    self.output = Box::new(output);
    self
  }

  pub fn build(self) -> Interpreter {
    Interpreter {
      globals: Scope::new(),
      ctx: EvalCtx {
        output: Rc::new(RefCell::new(self.output)),
      },
    }
  }
}
