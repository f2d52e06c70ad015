use crate::parser::{Assoc, ParseValue, Parser, RuleOpts, RuleSym};
use crate::TokenImpl;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Sym {
    Id,
    Plus,
    Minus,
    Times,
    Divide,
    Assign,
    Expr,
}

#[derive(Debug)]
struct Tok {
    sym: Sym,
    text: &'static str,
}

impl TokenImpl for Tok {
    type Symbol = Sym;

    fn symbol(&self) -> Sym {
        self.sym
    }
}

fn id(text: &'static str) -> Rc<Tok> {
    Rc::new(Tok { sym: Sym::Id, text })
}

fn op(sym: Sym) -> Rc<Tok> {
    let text = match sym {
        Sym::Plus => "+",
        Sym::Minus => "-",
        Sym::Times => "*",
        Sym::Divide => "/",
        Sym::Assign => "=",
        _ => "?",
    };
    Rc::new(Tok { sym, text })
}

/// Expression grammar flattening every reduction into a parenthesized string:
/// `* /` above `+ -`, `=` right-associative at the bottom.
fn expr_parser() -> Parser<Tok, String> {
    let mut parser: Parser<Tok, String> = Parser::new();

    for (sym, priority, assoc) in [
        (Sym::Assign, 0, Assoc::Right),
        (Sym::Plus, 1, Assoc::Left),
        (Sym::Minus, 1, Assoc::Left),
        (Sym::Times, 2, Assoc::Left),
        (Sym::Divide, 2, Assoc::Left),
    ] {
        parser.rule(
            Sym::Expr,
            vec![
                RuleSym::new(Sym::Expr),
                RuleSym::new(sym),
                RuleSym::new(Sym::Expr),
            ],
            |_, mut children: Vec<ParseValue<Tok, String>>| {
                let rhs = children.pop().unwrap().into_node().unwrap();
                let op = children.pop().unwrap().into_token().unwrap();
                let lhs = children.pop().unwrap().into_node().unwrap();
                format!("({}{}{})", lhs, op.text, rhs)
            },
            RuleOpts::new().priority(priority).assoc(assoc),
        );
    }
    parser.rule(
        Sym::Expr,
        vec![RuleSym::new(Sym::Id)],
        |_, mut children| children.pop().unwrap().into_token().unwrap().text.to_string(),
        RuleOpts::new(),
    );

    parser.add_start_symbol(Sym::Expr);
    parser.generate_table().unwrap();
    parser
}

fn run(parser: &mut Parser<Tok, String>, tokens: Vec<Rc<Tok>>) -> String {
    parser.parse(tokens).unwrap()
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let mut parser = expr_parser();
    let result = run(
        &mut parser,
        vec![id("a"), op(Sym::Plus), id("b"), op(Sym::Times), id("c")],
    );
    assert_eq!(result, "(a+(b*c))");

    let result = run(
        &mut parser,
        vec![id("a"), op(Sym::Times), id("b"), op(Sym::Plus), id("c")],
    );
    assert_eq!(result, "((a*b)+c)");
}

#[test]
fn assignment_is_right_associative_and_lowest() {
    let mut parser = expr_parser();
    let result = run(
        &mut parser,
        vec![
            id("a"),
            op(Sym::Plus),
            id("b"),
            op(Sym::Times),
            id("c"),
            op(Sym::Assign),
            id("d"),
        ],
    );
    assert_eq!(result, "((a+(b*c))=d)");

    let result = run(
        &mut parser,
        vec![id("a"), op(Sym::Assign), id("b"), op(Sym::Assign), id("c")],
    );
    assert_eq!(result, "(a=(b=c))");
}

#[test]
fn left_associativity_folds_leftward() {
    let mut parser = expr_parser();
    let result = run(
        &mut parser,
        vec![id("a"), op(Sym::Minus), id("b"), op(Sym::Minus), id("c")],
    );
    assert_eq!(result, "((a-b)-c)");

    let result = run(
        &mut parser,
        vec![id("a"), op(Sym::Divide), id("b"), op(Sym::Times), id("c")],
    );
    assert_eq!(result, "((a/b)*c)");
}

#[test]
fn parses_are_deterministic() {
    let mut parser = expr_parser();
    let tokens = || {
        vec![
            id("a"),
            op(Sym::Plus),
            id("b"),
            op(Sym::Times),
            id("c"),
            op(Sym::Minus),
            id("d"),
        ]
    };
    let first = run(&mut parser, tokens());
    for _ in 0..5 {
        assert_eq!(run(&mut parser, tokens()), first);
    }
}
