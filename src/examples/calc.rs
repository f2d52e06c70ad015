//! A small arithmetic/assignment language exercising the whole stack: UTF-8
//! lexing, precedence-driven expression parsing, and a parse context that
//! tracks assignments during reduction.
//!
//! ```text
//! radius = 4;
//! area = 3.14159 * radius * radius;
//! area / 2;
//! ```

use crate::lexer::{RegexRule, Utf8Lexer};
use crate::parser::{Assoc, ParseValue, Parser, RuleOpts, RuleSym};
use crate::{TextSpan, TokenImpl};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
/// Terminal and non-terminal tags of the calculator grammar.
pub enum CalcSym {
    Number,
    Identifier,
    Plus,
    Minus,
    Times,
    Divide,
    Assign,
    LParen,
    RParen,
    Semicolon,
    Program,
    Statement,
    Expression,
}

#[derive(Debug)]
pub struct CalcToken {
    pub sym: CalcSym,
    pub text: String,
    pub span: TextSpan,
}

impl TokenImpl for CalcToken {
    type Symbol = CalcSym;

    fn symbol(&self) -> CalcSym {
        self.sym
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalcAst {
    Program(Vec<CalcAst>),
    Assign {
        name: String,
        value: Box<CalcAst>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<CalcAst>,
        rhs: Box<CalcAst>,
    },
    Number(f64),
    Variable(String),
}

#[derive(Debug, Default)]
/// Parse-long state threaded through the reduction callbacks: which names have
/// been assigned so far, and every use of a name before its assignment.
pub struct CalcContext {
    assigned: HashSet<String>,
    pub undefined: Vec<(String, TextSpan)>,
}

impl CalcContext {
    pub fn is_assigned(&self, name: &str) -> bool {
        self.assigned.contains(name)
    }
}

fn token(sym: CalcSym) -> impl Fn(&[u32], TextSpan) -> Option<CalcToken> {
    move |matched, span| {
        let text: String = matched
            .iter()
            .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        Some(CalcToken { sym, text, span })
    }
}

/// Tokenizer for the calculator language, fed with raw UTF-8 bytes.
pub fn calc_tokenizer() -> Utf8Lexer<CalcToken> {
    let mut lexer = Utf8Lexer::new("<calc>");

    let number = RegexRule::new("number", "[0-9]+(\\.[0-9]+)?", token(CalcSym::Number))
        .expect("the number pattern is well formed");
    let identifier = RegexRule::new(
        "identifier",
        "[a-zA-Z_][a-zA-Z0-9_]*",
        token(CalcSym::Identifier),
    )
    .expect("the identifier pattern is well formed");
    lexer.add_rule(Box::new(number));
    lexer.add_rule(Box::new(identifier));

    lexer.dec_priority_major();
    for (name, pattern, sym) in [
        ("plus", "\\+", CalcSym::Plus),
        ("minus", "-", CalcSym::Minus),
        ("times", "\\*", CalcSym::Times),
        ("divide", "/", CalcSym::Divide),
        ("assign", "=", CalcSym::Assign),
        ("lparen", "\\(", CalcSym::LParen),
        ("rparen", "\\)", CalcSym::RParen),
        ("semicolon", ";", CalcSym::Semicolon),
    ] {
        let rule = RegexRule::new(name, pattern, token(sym)).expect("punctuation patterns are well formed");
        lexer.add_rule(Box::new(rule));
    }

    lexer.dec_priority_major();
    lexer.add_rule(Box::new(
        RegexRule::skip("space", "[ \t\r\n]+").expect("the space pattern is well formed"),
    ));

    lexer
}

type CalcValue = ParseValue<CalcToken, CalcAst>;

fn pop_node(children: &mut Vec<CalcValue>) -> CalcAst {
    children
        .pop()
        .and_then(CalcValue::into_node)
        .expect("grammar guarantees a node at this slot")
}

fn pop_token(children: &mut Vec<CalcValue>) -> Rc<CalcToken> {
    children
        .pop()
        .and_then(CalcValue::into_token)
        .expect("grammar guarantees a token at this slot")
}

fn binary(op: BinaryOp) -> impl Fn(&mut CalcContext, Vec<CalcValue>) -> CalcAst {
    move |_, mut children| {
        let rhs = pop_node(&mut children);
        children.pop();
        let lhs = pop_node(&mut children);
        CalcAst::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// The calculator grammar, table already generated.
pub fn calc_grammar() -> Parser<CalcToken, CalcAst, CalcContext> {
    use CalcSym::*;

    let mut parser: Parser<CalcToken, CalcAst, CalcContext> = Parser::new();

    parser.rule(
        Program,
        vec![RuleSym::new(Program), RuleSym::new(Statement)],
        |_, mut children| {
            let stmt = pop_node(&mut children);
            match pop_node(&mut children) {
                CalcAst::Program(mut statements) => {
                    statements.push(stmt);
                    CalcAst::Program(statements)
                }
                other => CalcAst::Program(vec![other, stmt]),
            }
        },
        RuleOpts::new(),
    );
    parser.rule(
        Program,
        vec![RuleSym::new(Statement)],
        |_, mut children| CalcAst::Program(vec![pop_node(&mut children)]),
        RuleOpts::new(),
    );

    parser.rule(
        Statement,
        vec![
            RuleSym::new(Identifier),
            RuleSym::new(Assign),
            RuleSym::new(Expression),
            RuleSym::new(Semicolon),
        ],
        |ctx, mut children| {
            children.pop();
            let value = pop_node(&mut children);
            children.pop();
            let name = pop_token(&mut children).text.clone();
            ctx.assigned.insert(name.clone());
            CalcAst::Assign {
                name,
                value: Box::new(value),
            }
        },
        RuleOpts::new(),
    );
    parser.rule(
        Statement,
        vec![RuleSym::new(Expression), RuleSym::new(Semicolon)],
        |_, mut children| {
            children.pop();
            pop_node(&mut children)
        },
        RuleOpts::new(),
    );

    for (op_sym, op, priority) in [
        (Plus, BinaryOp::Add, 1),
        (Minus, BinaryOp::Sub, 1),
        (Times, BinaryOp::Mul, 2),
        (Divide, BinaryOp::Div, 2),
    ] {
        parser.rule(
            Expression,
            vec![
                RuleSym::new(Expression),
                RuleSym::new(op_sym),
                RuleSym::new(Expression),
            ],
            binary(op),
            RuleOpts::new().priority(priority).assoc(Assoc::Left),
        );
    }

    parser.rule(
        Expression,
        vec![
            RuleSym::new(LParen),
            RuleSym::new(Expression),
            RuleSym::new(RParen),
        ],
        |_, mut children| {
            children.pop();
            pop_node(&mut children)
        },
        RuleOpts::new(),
    );
    parser.rule(
        Expression,
        vec![RuleSym::new(Number)],
        |_, mut children| {
            let token = pop_token(&mut children);
            CalcAst::Number(token.text.parse().unwrap_or(0.0))
        },
        RuleOpts::new(),
    );
    parser.rule(
        Expression,
        vec![RuleSym::new(Identifier)],
        |ctx, mut children| {
            let token = pop_token(&mut children);
            if !ctx.assigned.contains(&token.text) {
                ctx.undefined.push((token.text.clone(), token.span.clone()));
            }
            CalcAst::Variable(token.text.clone())
        },
        RuleOpts::new(),
    );

    parser.add_start_symbol(Program);
    parser
        .generate_table()
        .expect("the calculator grammar is well formed");
    parser
}

/// Parse a whole source text; the undefined-variable diagnostics collected
/// during the parse are returned alongside the tree.
pub fn parse_source(text: &str) -> Result<(CalcAst, Vec<(String, TextSpan)>), String> {
    let mut lexer = calc_tokenizer();
    let mut tokens = lexer.feed_str(text).map_err(|err| err.to_string())?;
    tokens.extend(lexer.feed_end().map_err(|err| err.to_string())?);

    let mut parser = calc_grammar();
    let ast = parser.parse(tokens).map_err(|err| err.to_string())?;
    let undefined = std::mem::take(&mut parser.context_mut().undefined);
    Ok((ast, undefined))
}

impl CalcAst {
    /// Evaluate with a mutable environment; a program yields its last
    /// statement's value, unassigned variables read as 0.
    pub fn evaluate(&self, env: &mut HashMap<String, f64>) -> f64 {
        match self {
            CalcAst::Program(statements) => {
                let mut last = 0.0;
                for statement in statements {
                    last = statement.evaluate(env);
                }
                last
            }
            CalcAst::Assign { name, value } => {
                let result = value.evaluate(env);
                env.insert(name.clone(), result);
                result
            }
            CalcAst::Binary { op, lhs, rhs } => {
                let left = lhs.evaluate(env);
                let right = rhs.evaluate(env);
                match op {
                    BinaryOp::Add => left + right,
                    BinaryOp::Sub => left - right,
                    BinaryOp::Mul => left * right,
                    BinaryOp::Div => left / right,
                }
            }
            CalcAst::Number(value) => *value,
            CalcAst::Variable(name) => env.get(name).copied().unwrap_or(0.0),
        }
    }
}
