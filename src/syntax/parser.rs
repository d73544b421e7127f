//! Recursive-descent parser, one pass of precedence climbing per binary
//! operator tier, built directly over the [`Lexer`].
//!
//! Structured the way the teacher's `Parser` sits over its `Lexer` exposing
//! `current()`/`bump()` (`examples/jprochazk-hebi/src/syntax/parser.rs`),
//! simplified because this grammar's lexer already emits explicit
//! `Indent`/`Dedent` tokens and the parser does not need its own indent
//! stack. Error recovery also follows the teacher: a bad statement is
//! recorded in `errors` and the parser resynchronizes at the next statement
//! boundary instead of aborting, so `Interpreter::check` can surface more
//! than one problem per pass.

use std::rc::Rc;

use super::ast::{CompareOp, Node};
use super::lexer::Lexer;
use super::token::TokenKind;
use crate::error::ParseError;
use crate::object::class::Method;
use crate::span::Span;

pub struct Parser<'src> {
  lex: Lexer<'src>,
  errors: Vec<ParseError>,
}

pub fn parse(src: &str) -> Result<Vec<Node>, Vec<ParseError>> {
  let mut parser = Parser {
    lex: Lexer::new(src),
    errors: Vec::new(),
  };
  let program = parser.parse_program();
  if parser.errors.is_empty() {
    Ok(program)
  } else {
    Err(parser.errors)
  }
}

impl<'src> Parser<'src> {
  fn current(&self) -> &TokenKind {
    &self.lex.current().kind
  }

  fn span(&self) -> Span {
    self.lex.current().span
  }

  fn bump(&mut self) -> TokenKind {
    let kind = self.lex.current().kind.clone();
    self.lex.next();
    kind
  }

  fn at(&self, kind: &TokenKind) -> bool {
    self.lex.current().is_kind(kind)
  }

  fn at_char(&self, c: char) -> bool {
    matches!(self.current(), TokenKind::Char(x) if *x == c)
  }

  fn eat_char(&mut self, c: char) -> Result<(), ParseError> {
    if self.at_char(c) {
      self.bump();
      Ok(())
    } else {
      Err(ParseError::new(
        format!("expected '{c}', found `{}`", self.current()),
        self.span(),
      ))
    }
  }

  fn eat(&mut self, kind: TokenKind) -> Result<(), ParseError> {
    if self.at(&kind) {
      self.bump();
      Ok(())
    } else {
      Err(ParseError::new(
        format!("expected `{kind}`, found `{}`", self.current()),
        self.span(),
      ))
    }
  }

  fn eat_id(&mut self) -> Result<String, ParseError> {
    match self.current().clone() {
      TokenKind::Id(s) => {
        self.bump();
        Ok(s)
      }
      other => Err(ParseError::new(
        format!("expected an identifier, found `{other}`"),
        self.span(),
      )),
    }
  }

  fn parse_program(&mut self) -> Vec<Node> {
    let mut stmts = Vec::new();
    while !self.at(&TokenKind::Eof) {
      match self.parse_stmt() {
        Ok(stmt) => stmts.push(stmt),
        Err(e) => {
          self.errors.push(e);
          self.recover();
        }
      }
    }
    stmts
  }

  /// Skips tokens until the next statement boundary: a `Newline` (consumed)
  /// or a `Dedent`/`Eof` (left in place so the enclosing block parser sees
  /// it too).
  fn recover(&mut self) {
    loop {
      match self.current() {
        TokenKind::Newline => {
          self.bump();
          return;
        }
        TokenKind::Dedent | TokenKind::Eof => return,
        _ => {
          self.bump();
        }
      }
    }
  }

  fn parse_block(&mut self) -> Result<Node, ParseError> {
    self.eat(TokenKind::Indent)?;
    let mut stmts = Vec::new();
    while !self.at(&TokenKind::Dedent) && !self.at(&TokenKind::Eof) {
      match self.parse_stmt() {
        Ok(stmt) => stmts.push(stmt),
        Err(e) => {
          self.errors.push(e);
          self.recover();
        }
      }
    }
    self.eat(TokenKind::Dedent)?;
    Ok(Node::Compound(stmts))
  }

  fn parse_stmt(&mut self) -> Result<Node, ParseError> {
    match self.current().clone() {
      TokenKind::Class => self.parse_class_def(),
      TokenKind::If => self.parse_if_else(),
      TokenKind::Return => {
        self.bump();
        let value = self.parse_expr()?;
        self.eat(TokenKind::Newline)?;
        Ok(Node::Return(Box::new(value)))
      }
      TokenKind::Print => {
        self.bump();
        let mut args = Vec::new();
        if !self.at(&TokenKind::Newline) {
          args.push(self.parse_expr()?);
          while self.at_char(',') {
            self.bump();
            args.push(self.parse_expr()?);
          }
        }
        self.eat(TokenKind::Newline)?;
        Ok(Node::Print(args))
      }
      TokenKind::Id(name) => self.parse_id_led_stmt(name),
      _ => {
        let expr = self.parse_expr()?;
        self.eat(TokenKind::Newline)?;
        Ok(expr)
      }
    }
  }

  /// Disambiguates, starting from a leading identifier, between a plain
  /// assignment (`x = expr`), a field assignment (`x.field = expr`), and an
  /// expression statement (`x.method()`, `X()`, bare `x`). Once it's clear
  /// the statement is not an assignment, the already-consumed primary is
  /// handed to [`Parser::finish_expr_from`] so the rest of the expression
  /// grammar (postfix chains, then every binary operator tier) runs exactly
  /// as it would have if `parse_expr` had started from scratch.
  fn parse_id_led_stmt(&mut self, name: String) -> Result<Node, ParseError> {
    let start = self.span();
    self.bump();

    if self.at_char('=') {
      self.bump();
      let value = self.parse_expr()?;
      self.eat(TokenKind::Newline)?;
      return Ok(Node::Assignment {
        name,
        value: Box::new(value),
      });
    }

    if self.at_char('.') {
      self.bump();
      let field = self.eat_id()?;
      if self.at_char('=') {
        self.bump();
        let value = self.parse_expr()?;
        self.eat(TokenKind::Newline)?;
        return Ok(Node::FieldAssignment {
          object: Box::new(Node::Variable(vec![name], start)),
          field,
          value: Box::new(value),
          span: start,
        });
      }
      let receiver = Node::Variable(vec![name], start);
      let head = self.parse_postfix_tail_field(receiver, field, start)?;
      let expr = self.finish_expr_from(head)?;
      self.eat(TokenKind::Newline)?;
      return Ok(expr);
    }

    let head = if name == "str" && self.at_char('(') {
      self.eat_char('(')?;
      let inner = self.parse_expr()?;
      self.eat_char(')')?;
      Node::Stringify(Box::new(inner), start)
    } else if self.at_char('(') {
      let args = self.parse_call_args(start)?;
      Node::NewInstance {
        class_name: name,
        args,
        span: start,
      }
    } else {
      Node::Variable(vec![name], start)
    };
    let head = self.parse_postfix_tail(head, start)?;
    let expr = self.finish_expr_from(head)?;
    self.eat(TokenKind::Newline)?;
    Ok(expr)
  }

  fn parse_call_args(&mut self, _span: Span) -> Result<Vec<Node>, ParseError> {
    self.eat_char('(')?;
    let mut args = Vec::new();
    if !self.at_char(')') {
      args.push(self.parse_expr()?);
      while self.at_char(',') {
        self.bump();
        args.push(self.parse_expr()?);
      }
    }
    self.eat_char(')')?;
    Ok(args)
  }

  /// Attaches one already-consumed `.field` onto `receiver`, producing
  /// either a `MethodCall` (if a `(` follows) or a two-element dotted
  /// `Variable`. Dotted paths longer than two elements are rejected here,
  /// matching this language's single-level field access.
  fn parse_postfix_tail_field(
    &mut self,
    receiver: Node,
    field: String,
    span: Span,
  ) -> Result<Node, ParseError> {
    if self.at_char('(') {
      let args = self.parse_call_args(span)?;
      let call = Node::MethodCall {
        receiver: Box::new(receiver),
        method: field,
        args,
        span,
      };
      return self.parse_postfix_tail(call, span);
    }
    match receiver {
      Node::Variable(mut path, s) if path.len() == 1 => {
        path.push(field);
        self.parse_postfix_tail(Node::Variable(path, s), span)
      }
      _ => Err(ParseError::new(
        "field access is only supported on a plain variable",
        span,
      )),
    }
  }

  fn parse_postfix_tail(&mut self, mut node: Node, span: Span) -> Result<Node, ParseError> {
    loop {
      if self.at_char('.') {
        self.bump();
        let field = self.eat_id()?;
        node = self.parse_postfix_tail_field(node, field, span)?;
        continue;
      }
      return Ok(node);
    }
  }

  fn parse_class_def(&mut self) -> Result<Node, ParseError> {
    self.bump();
    let name = self.eat_id()?;
    let parent_name = if self.at_char('(') {
      self.bump();
      let p = self.eat_id()?;
      self.eat_char(')')?;
      Some(p)
    } else {
      None
    };
    self.eat_char(':')?;
    self.eat(TokenKind::Newline)?;
    self.eat(TokenKind::Indent)?;

    let mut methods = Vec::new();
    while self.at(&TokenKind::Def) {
      methods.push(self.parse_method_def()?);
    }
    self.eat(TokenKind::Dedent)?;

    Ok(Node::ClassDefinition {
      name,
      methods,
      parent_name,
    })
  }

  fn parse_method_def(&mut self) -> Result<Method, ParseError> {
    self.eat(TokenKind::Def)?;
    let name = self.eat_id()?;
    self.eat_char('(')?;
    let mut params = Vec::new();
    if !self.at_char(')') {
      params.push(self.eat_id()?);
      while self.at_char(',') {
        self.bump();
        params.push(self.eat_id()?);
      }
    }
    self.eat_char(')')?;
    self.eat_char(':')?;
    self.eat(TokenKind::Newline)?;
    let body = self.parse_block()?;
    // `self` is written explicitly as the first declared parameter (every
    // method, per the language's own convention, starts `def name(self,
    // ...)`), but it is never part of the arguments a call site supplies —
    // it comes from the receiver. Stripping it here keeps the stored
    // formal-parameter list in exact 1:1 correspondence with call-site
    // argument lists, the way `ClassInstance::call`'s arity check expects.
    if params.first().is_some_and(|p| p == "self") {
      params.remove(0);
    }
    Ok(Method {
      name,
      params,
      body: Rc::new(body),
    })
  }

  fn parse_if_else(&mut self) -> Result<Node, ParseError> {
    self.bump();
    let cond = self.parse_expr()?;
    self.eat_char(':')?;
    self.eat(TokenKind::Newline)?;
    let if_body = self.parse_block()?;
    let else_body = if self.at(&TokenKind::Else) {
      self.bump();
      self.eat_char(':')?;
      self.eat(TokenKind::Newline)?;
      Some(Box::new(self.parse_block()?))
    } else {
      None
    };
    Ok(Node::IfElse {
      cond: Box::new(cond),
      if_body: Box::new(if_body),
      else_body,
    })
  }

  // --- expressions ---
  //
  // `parse_expr` descends loosest-to-tightest the way the grammar reads.
  // `finish_expr_from` runs the same tiers, but starting from a primary
  // (plus its postfix chain) that a statement-level caller already
  // consumed while disambiguating assignment from expression-statement.

  fn parse_expr(&mut self) -> Result<Node, ParseError> {
    self.parse_or()
  }

  fn parse_or(&mut self) -> Result<Node, ParseError> {
    let mut node = self.parse_and()?;
    while self.at(&TokenKind::Or) {
      self.bump();
      let rhs = self.parse_and()?;
      node = Node::Or(Box::new(node), Box::new(rhs));
    }
    Ok(node)
  }

  fn parse_and(&mut self) -> Result<Node, ParseError> {
    let mut node = self.parse_not()?;
    while self.at(&TokenKind::And) {
      self.bump();
      let rhs = self.parse_not()?;
      node = Node::And(Box::new(node), Box::new(rhs));
    }
    Ok(node)
  }

  fn parse_not(&mut self) -> Result<Node, ParseError> {
    if self.at(&TokenKind::Not) {
      self.bump();
      let inner = self.parse_not()?;
      return Ok(Node::Not(Box::new(inner)));
    }
    self.parse_comparison()
  }

  fn is_compare_op(&self) -> bool {
    matches!(
      self.current(),
      TokenKind::Eq | TokenKind::NotEq | TokenKind::LessOrEq | TokenKind::GreaterOrEq
    ) || self.at_char('<')
      || self.at_char('>')
  }

  fn compare_op(&mut self) -> Result<CompareOp, ParseError> {
    let op = match self.current() {
      TokenKind::Eq => CompareOp::Eq,
      TokenKind::NotEq => CompareOp::NotEq,
      TokenKind::LessOrEq => CompareOp::Le,
      TokenKind::GreaterOrEq => CompareOp::Ge,
      TokenKind::Char('<') => CompareOp::Lt,
      TokenKind::Char('>') => CompareOp::Gt,
      other => {
        return Err(ParseError::new(
          format!("expected a comparison operator, found `{other}`"),
          self.span(),
        ))
      }
    };
    self.bump();
    Ok(op)
  }

  fn parse_comparison(&mut self) -> Result<Node, ParseError> {
    let span = self.span();
    let lhs = self.parse_additive()?;
    if !self.is_compare_op() {
      return Ok(lhs);
    }
    let op = self.compare_op()?;
    let rhs = self.parse_additive()?;
    Ok(Node::Comparison {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
      span,
    })
  }

  fn parse_additive(&mut self) -> Result<Node, ParseError> {
    let node = self.parse_multiplicative()?;
    self.finish_additive(node)
  }

  fn finish_additive(&mut self, mut node: Node) -> Result<Node, ParseError> {
    loop {
      let span = self.span();
      if self.at_char('+') {
        self.bump();
        let rhs = self.parse_multiplicative()?;
        node = Node::Add(Box::new(node), Box::new(rhs), span);
      } else if self.at_char('-') {
        self.bump();
        let rhs = self.parse_multiplicative()?;
        node = Node::Sub(Box::new(node), Box::new(rhs), span);
      } else {
        return Ok(node);
      }
    }
  }

  fn parse_multiplicative(&mut self) -> Result<Node, ParseError> {
    let node = self.parse_unary()?;
    self.finish_multiplicative(node)
  }

  fn finish_multiplicative(&mut self, mut node: Node) -> Result<Node, ParseError> {
    loop {
      let span = self.span();
      if self.at_char('*') {
        self.bump();
        let rhs = self.parse_unary()?;
        node = Node::Mult(Box::new(node), Box::new(rhs), span);
      } else if self.at_char('/') {
        self.bump();
        let rhs = self.parse_unary()?;
        node = Node::Div(Box::new(node), Box::new(rhs), span);
      } else {
        return Ok(node);
      }
    }
  }

  fn parse_unary(&mut self) -> Result<Node, ParseError> {
    if self.at_char('-') {
      let span = self.span();
      self.bump();
      let inner = self.parse_unary()?;
      return Ok(Node::Unary(Box::new(inner), span));
    }
    self.parse_postfix()
  }

  fn parse_postfix(&mut self) -> Result<Node, ParseError> {
    let span = self.span();
    let node = self.parse_primary()?;
    self.parse_postfix_tail(node, span)
  }

  fn parse_primary(&mut self) -> Result<Node, ParseError> {
    let span = self.span();
    match self.current().clone() {
      TokenKind::Number(n) => {
        self.bump();
        Ok(Node::Number(n))
      }
      TokenKind::String(s) => {
        self.bump();
        Ok(Node::Str(s))
      }
      TokenKind::True => {
        self.bump();
        Ok(Node::Bool(true))
      }
      TokenKind::False => {
        self.bump();
        Ok(Node::Bool(false))
      }
      TokenKind::None => {
        self.bump();
        Ok(Node::NoneLit)
      }
      TokenKind::Char('(') => {
        self.bump();
        let inner = self.parse_expr()?;
        self.eat_char(')')?;
        Ok(inner)
      }
      TokenKind::Id(name) => {
        self.bump();
        if name == "str" && self.at_char('(') {
          self.eat_char('(')?;
          let inner = self.parse_expr()?;
          self.eat_char(')')?;
          Ok(Node::Stringify(Box::new(inner), span))
        } else if self.at_char('(') {
          let args = self.parse_call_args(span)?;
          Ok(Node::NewInstance {
            class_name: name,
            args,
            span,
          })
        } else {
          Ok(Node::Variable(vec![name], span))
        }
      }
      other => Err(ParseError::new(format!("unexpected `{other}`"), span)),
    }
  }

  /// Continues the expression grammar's binary-operator tiers (tightest to
  /// loosest) starting from a primary (plus postfix chain) a caller already
  /// built by hand, used only from [`Parser::parse_id_led_stmt`].
  fn finish_expr_from(&mut self, node: Node) -> Result<Node, ParseError> {
    let node = self.finish_multiplicative(node)?;
    let node = self.finish_additive(node)?;
    let span = self.span();
    let mut node = if self.is_compare_op() {
      let op = self.compare_op()?;
      let rhs = self.parse_additive()?;
      Node::Comparison {
        op,
        lhs: Box::new(node),
        rhs: Box::new(rhs),
        span,
      }
    } else {
      node
    };
    while self.at(&TokenKind::And) {
      self.bump();
      let rhs = self.parse_not()?;
      node = Node::And(Box::new(node), Box::new(rhs));
    }
    while self.at(&TokenKind::Or) {
      self.bump();
      let rhs = self.parse_and()?;
      node = Node::Or(Box::new(node), Box::new(rhs));
    }
    Ok(node)
  }
}
