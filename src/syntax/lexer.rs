//! Character stream → token stream, including the stateful protocol that
//! synthesizes `Indent`/`Dedent` tokens from leading whitespace.
//!
//! Structured the way the teacher wraps a stateful outer layer around a raw
//! character/token source (`src/syntax/lexer.rs` in the teacher wraps a
//! `logos::Lexer` to track indentation-as-a-token-field); here the whole
//! protocol is the stateful outer layer, since the teacher's `logos`-based
//! DFA tokenizer has no way to express the recursive "keep deepening /
//! keep collapsing blank lines / re-derive EOF" rules this grammar needs
//! (they require mutable lexer state threaded through the decision of what
//! token comes next, not just a regex match). `logos` is dropped from this
//! crate's dependencies for that reason; see DESIGN.md.

use std::iter::Peekable;
use std::str::CharIndices;

use log::trace;

use super::token::{Token, TokenKind};
use crate::error::LexError;
use crate::span::Span;

/// Thin wrapper giving the lexer the `peek`/`get` character-stream contract
/// from the spec, independent of how the characters are actually stored.
struct CharStream<'src> {
  src: &'src str,
  iter: Peekable<CharIndices<'src>>,
  pos: usize,
}

impl<'src> CharStream<'src> {
  fn new(src: &'src str) -> Self {
    CharStream {
      src,
      iter: src.char_indices().peekable(),
      pos: 0,
    }
  }

  fn peek(&mut self) -> Option<char> {
    self.iter.peek().map(|&(_, c)| c)
  }

  fn get(&mut self) -> Option<char> {
    match self.iter.next() {
      Some((i, c)) => {
        self.pos = i + c.len_utf8();
        Some(c)
      }
      None => {
        self.pos = self.src.len();
        None
      }
    }
  }
}

fn is_blank(c: char) -> bool {
  c == ' ' || c == '\t'
}

fn is_ident_start(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '_'
}

fn keyword(s: &str) -> Option<TokenKind> {
  Some(match s {
    "class" => TokenKind::Class,
    "return" => TokenKind::Return,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "def" => TokenKind::Def,
    "print" => TokenKind::Print,
    "or" => TokenKind::Or,
    "and" => TokenKind::And,
    "not" => TokenKind::Not,
    "None" => TokenKind::None,
    "True" => TokenKind::True,
    "False" => TokenKind::False,
    _ => return Option::None,
  })
}

pub struct Lexer<'src> {
  chars: CharStream<'src>,
  current: Token,
  /// Nesting depth in units of 2 spaces.
  current_indent: i64,
  /// Remaining indentation delta (in raw space units) still to be emitted,
  /// two spaces (one `Indent`/`Dedent`) at a time.
  pending_delta: i64,
}

impl<'src> Lexer<'src> {
  pub fn new(src: &'src str) -> Self {
    let mut lexer = Lexer {
      chars: CharStream::new(src),
      current: Token::new(TokenKind::Eof, Span::new(0, 0)),
      current_indent: 0,
      pending_delta: 0,
    };
    lexer.current = lexer.read_token();
    lexer
  }

  pub fn current(&self) -> &Token {
    &self.current
  }

  pub fn next(&mut self) -> &Token {
    self.current = self.read_token();
    &self.current
  }

  /// Asserts that the current token matches `kind` (ignoring payload),
  /// raising a [`LexError`] otherwise.
  pub fn expect(&self, kind: &TokenKind) -> Result<&Token, LexError> {
    if self.current.is_kind(kind) {
      Ok(&self.current)
    } else {
      Err(LexError::new(
        format!("expected `{kind}`, found `{}`", self.current.kind),
        self.current.span,
      ))
    }
  }

  fn count_spaces(&mut self) -> i64 {
    let mut n = 0;
    while self.chars.peek().is_some_and(is_blank) {
      self.chars.get();
      n += 1;
    }
    n
  }

  fn collect_digits(&mut self) -> String {
    let mut s = String::new();
    while self.chars.peek().is_some_and(|c| c.is_ascii_digit()) {
      s.push(self.chars.get().unwrap());
    }
    s
  }

  fn collect_ident_tail(&mut self) -> String {
    let mut s = String::new();
    while self.chars.peek().is_some_and(is_ident_start) {
      s.push(self.chars.get().unwrap());
    }
    s
  }

  fn read_token(&mut self) -> Token {
    let start = self.chars.pos;

    if self.chars.peek().is_none() {
      return self.handle_eof(start);
    }

    if self.pending_delta != 0 {
      if self.pending_delta > 0 {
        self.current_indent += 2;
        self.pending_delta -= 2;
        trace!("indent -> {}", self.current_indent);
        return Token::new(TokenKind::Indent, Span::new(start, start));
      } else {
        self.current_indent -= 2;
        self.pending_delta += 2;
        trace!("dedent -> {}", self.current_indent);
        return Token::new(TokenKind::Dedent, Span::new(start, start));
      }
    }

    if self.current.kind == TokenKind::Newline {
      while self.chars.peek() == Some('\n') {
        self.chars.get();
      }
      let new_start = self.chars.pos;
      let n_spaces = self.count_spaces();
      if n_spaces > self.current_indent {
        self.current_indent += 2;
        self.pending_delta = n_spaces - self.current_indent;
        trace!("indent -> {} (pending {})", self.current_indent, self.pending_delta);
        return Token::new(TokenKind::Indent, Span::new(new_start, self.chars.pos));
      } else if n_spaces < self.current_indent {
        self.current_indent -= 2;
        self.pending_delta = n_spaces - self.current_indent;
        trace!("dedent -> {} (pending {})", self.current_indent, self.pending_delta);
        return Token::new(TokenKind::Dedent, Span::new(new_start, self.chars.pos));
      }
      self.current = Token::new(TokenKind::Eof, Span::new(self.chars.pos, self.chars.pos));
      return self.read_token();
    }

    match self.chars.peek().unwrap() {
      '\n' => self.handle_newline(start),
      c if is_punct(c) => self.read_punct(start),
      c if c.is_ascii_digit() => {
        let digits = self.collect_digits();
        let n: i64 = digits.parse().unwrap_or(0);
        Token::new(TokenKind::Number(n), Span::new(start, self.chars.pos))
      }
      c if is_ident_start(c) => {
        let text = self.collect_ident_tail();
        let kind = keyword(&text).unwrap_or(TokenKind::Id(text));
        Token::new(kind, Span::new(start, self.chars.pos))
      }
      c if is_blank(c) => {
        self.count_spaces();
        self.read_token()
      }
      _ => Token::new(TokenKind::Eof, Span::new(start, self.chars.pos)),
    }
  }

  fn handle_newline(&mut self, start: usize) -> Token {
    self.chars.get();
    if self.current.kind == TokenKind::Newline || self.current.kind == TokenKind::Eof {
      return self.read_token();
    }
    Token::new(TokenKind::Newline, Span::new(start, self.chars.pos))
  }

  fn read_punct(&mut self, start: usize) -> Token {
    let c = self.chars.get().unwrap();

    if matches!(c, '!' | '=' | '>' | '<') && self.chars.peek() == Some('=') {
      self.chars.get();
      let kind = match c {
        '=' => TokenKind::Eq,
        '!' => TokenKind::NotEq,
        '>' => TokenKind::GreaterOrEq,
        '<' => TokenKind::LessOrEq,
        _ => unreachable!(),
      };
      return Token::new(kind, Span::new(start, self.chars.pos));
    }

    if c == '"' || c == '\'' {
      let mut s = String::new();
      while let Some(ch) = self.chars.peek() {
        if ch == c {
          break;
        }
        s.push(self.chars.get().unwrap());
      }
      self.chars.get(); // closing quote
      return Token::new(TokenKind::String(s), Span::new(start, self.chars.pos));
    }

    if is_ident_start(c) {
      let mut s = String::from(c);
      s.push_str(&self.collect_ident_tail());
      let kind = keyword(&s).unwrap_or(TokenKind::Id(s));
      return Token::new(kind, Span::new(start, self.chars.pos));
    }

    Token::new(TokenKind::Char(c), Span::new(start, self.chars.pos))
  }

  fn handle_eof(&mut self, at: usize) -> Token {
    if self.current_indent > 0 {
      self.current_indent -= 2;
      trace!("eof dedent -> {}", self.current_indent);
      return Token::new(TokenKind::Dedent, Span::new(at, at));
    }
    if self.current.kind == TokenKind::Newline || self.current.kind == TokenKind::Eof {
      return Token::new(TokenKind::Eof, Span::new(at, at));
    }
    Token::new(TokenKind::Newline, Span::new(at, at))
  }
}

fn is_punct(c: char) -> bool {
  c.is_ascii_punctuation()
}

#[cfg(test)]
mod tests;
