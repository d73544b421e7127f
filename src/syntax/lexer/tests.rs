use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
  let mut lex = Lexer::new(src);
  let mut out = Vec::new();
  loop {
    let kind = lex.current().kind.clone();
    let is_eof = kind == TokenKind::Eof;
    out.push(kind);
    if is_eof {
      break;
    }
    lex.next();
  }
  out
}

#[test]
fn single_line_ends_with_eof() {
  let toks = kinds("x = 1\n");
  assert_eq!(*toks.last().unwrap(), TokenKind::Eof);
}

#[test]
fn indent_and_dedent_balance() {
  let toks = kinds("if x:\n    y = 1\nz = 2\n");
  let indents = toks.iter().filter(|t| **t == TokenKind::Indent).count();
  let dedents = toks.iter().filter(|t| **t == TokenKind::Dedent).count();
  assert_eq!(indents, dedents);
}

#[test]
fn blank_lines_do_not_produce_spurious_indentation() {
  let toks = kinds("x = 1\n\n\ny = 2\n");
  assert_eq!(
    toks.iter().filter(|t| **t == TokenKind::Indent).count(),
    0
  );
  assert_eq!(
    toks.iter().filter(|t| **t == TokenKind::Dedent).count(),
    0
  );
}

#[test]
fn missing_trailing_newline_is_synthesized_before_eof() {
  let toks = kinds("x = 1");
  assert_eq!(toks[toks.len() - 2], TokenKind::Newline);
}

#[test]
fn nested_blocks_dedent_twice_at_eof() {
  let toks = kinds("if x:\n    if y:\n        z = 1");
  let trailing_dedents = toks
    .iter()
    .rev()
    .skip(1) // Eof
    .take_while(|t| **t == TokenKind::Dedent)
    .count();
  assert_eq!(trailing_dedents, 2);
}

#[test]
fn two_equals_sign_tokenizes_as_eq_not_two_chars() {
  let toks = kinds("x == y\n");
  assert!(toks.contains(&TokenKind::Eq));
  assert!(!toks.iter().any(|t| matches!(t, TokenKind::Char('='))));
}

#[test]
fn keywords_are_not_identifiers() {
  let toks = kinds("class Foo:\n    return None\n");
  assert!(toks.contains(&TokenKind::Class));
  assert!(toks.contains(&TokenKind::Return));
  assert!(toks.contains(&TokenKind::None));
}

#[test]
fn string_literal_preserves_contents() {
  let toks = kinds("print \"hi\"\n");
  assert!(toks
    .iter()
    .any(|t| matches!(t, TokenKind::String(s) if s == "hi")));
}

#[test]
fn token_equality_ignores_span() {
  let a = Token::new(TokenKind::Number(1), Span::new(0, 1));
  let b = Token::new(TokenKind::Number(1), Span::new(5, 9));
  assert_eq!(a, b);
}
