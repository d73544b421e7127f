//! End-to-end scenarios: literal program text in, literal stdout out.
//!
//! Built the way the teacher drives a program through `Hebi::with_io` and
//! reads the buffer back with `io::<Vec<u8>>()`
//! (`examples/jprochazk-hebi/src/tests/common/mod.rs`'s `check!`), but
//! asserting the exact rendered text directly instead of through a snapshot,
//! since the contract under test is a literal input-to-stdout mapping.

use indoc::indoc;
use mython::Interpreter;

fn run(src: &str) -> String {
  let mut interp = Interpreter::builder()
    .with_output(Vec::<u8>::new())
    .build();
  interp.eval(src).expect("program should evaluate");
  let buf = interp.io::<Vec<u8>>().expect("output sink should be Vec<u8>");
  String::from_utf8(buf.clone()).expect("output should be valid utf-8")
}

#[test]
fn adds_two_numbers() {
  assert_eq!(run("print 1 + 2\n"), "3\n");
}

#[test]
fn concatenates_two_strings() {
  assert_eq!(run(indoc! {r#"
    print "ab" + "cd"
  "#}), "abcd\n");
}

#[test]
fn if_else_takes_the_true_branch() {
  let src = indoc! {"
    x = 10
    if x > 5:
      print \"big\"
    else:
      print \"small\"
  "};
  assert_eq!(run(src), "big\n");
}

#[test]
fn class_with_init_and_str() {
  let src = indoc! {"
    class P:
      def __init__(self, n):
        self.n = n
      def __str__(self):
        return str(self.n)
    p = P(7)
    print p
  "};
  assert_eq!(run(src), "7\n");
}

#[test]
fn inheritance_resolves_the_overriding_method_first() {
  let src = indoc! {"
    class A:
      def hi(self):
        return \"A\"
    class B(A):
      def hi(self):
        return \"B\"
    print B().hi()
    print A().hi()
  "};
  assert_eq!(run(src), "B\nA\n");
}

#[test]
fn if_without_else_falls_through_to_a_trailing_return() {
  let src = indoc! {"
    class C:
      def f(self, x):
        if x > 0:
          return \"pos\"
        return \"other\"
    print C().f(-1)
  "};
  assert_eq!(run(src), "other\n");
}

#[test]
fn bare_str_call_statement_parses_as_stringify_not_new_instance() {
  let src = indoc! {"
    str(5)
    print \"ok\"
  "};
  assert_eq!(run(src), "ok\n");
}

#[test]
fn return_through_nested_if_else_skips_the_rest_of_the_method() {
  let src = indoc! {"
    class C:
      def pick(self, x):
        if x > 0:
          return \"positive\"
        else:
          return \"non-positive\"
        print \"unreachable\"
    print C().pick(3)
    print C().pick(-3)
  "};
  assert_eq!(run(src), "positive\nnon-positive\n");
}
