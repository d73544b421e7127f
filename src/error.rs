//! Error model: lexical, parse, and runtime failures, each carrying a
//! human-readable message and (where available) a source [`Span`].
//!
//! Mirrors the shape of the teacher's `Error::{Vm, Syntax, User}` collapsed
//! to this language's three phases, built with `thiserror` the way the
//! teacher's `hebi_diag` crate builds its own error type.

use thiserror::Error as ThisError;

use crate::span::Span;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, ThisError)]
pub enum Error {
  #[error("{0}")]
  Lex(#[from] LexError),
  #[error(
    "{} syntax error{}",
    .0.len(),
    if .0.len() == 1 { "" } else { "s" }
  )]
  Parse(Vec<ParseError>),
  #[error("{0}")]
  Runtime(#[from] RuntimeError),
}

impl Error {
  pub fn parse_errors(&self) -> Option<&[ParseError]> {
    match self {
      Error::Parse(errors) => Some(errors),
      _ => None,
    }
  }
}

impl From<Vec<ParseError>> for Error {
  fn from(errors: Vec<ParseError>) -> Self {
    Error::Parse(errors)
  }
}

#[derive(Debug, Clone, ThisError)]
#[error("lex error: {message}")]
pub struct LexError {
  pub message: String,
  pub span: Span,
}

impl LexError {
  pub fn new(message: impl Into<String>, span: Span) -> Self {
    Self {
      message: message.into(),
      span,
    }
  }
}

#[derive(Debug, Clone, ThisError)]
#[error("syntax error: {message}")]
pub struct ParseError {
  pub message: String,
  pub span: Span,
}

impl ParseError {
  pub fn new(message: impl Into<String>, span: Span) -> Self {
    Self {
      message: message.into(),
      span,
    }
  }
}

#[derive(Debug, Clone, ThisError)]
#[error("{message}")]
pub struct RuntimeError {
  pub message: String,
  pub span: Option<Span>,
}

impl RuntimeError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      span: None,
    }
  }

  pub fn at(message: impl Into<String>, span: Span) -> Self {
    Self {
      message: message.into(),
      span: Some(span),
    }
  }
}
