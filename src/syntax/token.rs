//! The token model: a tagged union of token kinds produced by the [lexer](super::lexer)
//! and consumed once by the [parser](super::parser).

use std::fmt;

use crate::span::Span;

#[derive(Clone, Debug)]
pub enum TokenKind {
  Number(i64),
  Id(String),
  Char(char),
  String(String),

  Class,
  Return,
  If,
  Else,
  Def,
  Newline,
  Print,
  Indent,
  Dedent,
  And,
  Or,
  Not,
  Eq,
  NotEq,
  LessOrEq,
  GreaterOrEq,
  None,
  True,
  False,
  Eof,
}

impl PartialEq for TokenKind {
  /// Two kinds compare equal iff they are the same variant and, for
  /// payload-carrying variants, carry equal payloads.
  fn eq(&self, other: &Self) -> bool {
    use TokenKind::*;
    match (self, other) {
      (Number(a), Number(b)) => a == b,
      (Id(a), Id(b)) => a == b,
      (Char(a), Char(b)) => a == b,
      (String(a), String(b)) => a == b,
      _ => std::mem::discriminant(self) == std::mem::discriminant(other),
    }
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TokenKind::Number(n) => write!(f, "{n}"),
      TokenKind::Id(s) => write!(f, "{s}"),
      TokenKind::Char(c) => write!(f, "{c}"),
      TokenKind::String(s) => write!(f, "{s:?}"),
      TokenKind::Class => write!(f, "class"),
      TokenKind::Return => write!(f, "return"),
      TokenKind::If => write!(f, "if"),
      TokenKind::Else => write!(f, "else"),
      TokenKind::Def => write!(f, "def"),
      TokenKind::Newline => write!(f, "<newline>"),
      TokenKind::Print => write!(f, "print"),
      TokenKind::Indent => write!(f, "<indent>"),
      TokenKind::Dedent => write!(f, "<dedent>"),
      TokenKind::And => write!(f, "and"),
      TokenKind::Or => write!(f, "or"),
      TokenKind::Not => write!(f, "not"),
      TokenKind::Eq => write!(f, "=="),
      TokenKind::NotEq => write!(f, "!="),
      TokenKind::LessOrEq => write!(f, "<="),
      TokenKind::GreaterOrEq => write!(f, ">="),
      TokenKind::None => write!(f, "None"),
      TokenKind::True => write!(f, "True"),
      TokenKind::False => write!(f, "False"),
      TokenKind::Eof => write!(f, "<eof>"),
    }
  }
}

/// A single lexed token. Tokens are produced by the lexer and consumed once
/// by the parser; they are never mutated.
#[derive(Clone, Debug)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
}

impl Token {
  pub fn new(kind: TokenKind, span: Span) -> Self {
    Token { kind, span }
  }

  /// Same variant as `kind`, ignoring payload. Used by the parser to check
  /// "is the current token a Char?" without caring which char yet.
  pub fn is_kind(&self, kind: &TokenKind) -> bool {
    std::mem::discriminant(&self.kind) == std::mem::discriminant(kind)
  }
}

impl PartialEq for Token {
  fn eq(&self, other: &Self) -> bool {
    self.kind == other.kind
  }
}
