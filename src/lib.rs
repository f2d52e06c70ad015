//! Language recognition toolkit (lang_lr) is a library for building compiler front ends:
//! a regular-expression engine that compiles patterns into deterministic automata,
//! a streaming priority-layered lexer built on those automata, and a generalized
//! shift-reduce parser driver with semantic decision predicates.
//!
//! # Overview
//!
//! Hand-written lexers and parsers for real languages tend to accumulate the same
//! machinery over and over: character classes, longest-match tokenization, operator
//! precedence tables, and the occasional grammar wart that is not context-free at all
//! (the classic example being C's `typedef` names). This library packages that
//! machinery as three reusable layers:
//!
//! 1. **Regex → automata.** A pattern is parsed into a syntax tree, lowered to an
//!    ε-NFA by Thompson construction with character-*range* transitions, and
//!    determinized with a range-partition subset construction. Both representations
//!    offer a streaming matcher ([IMatcher]): feed one symbol at a time and ask
//!    [is_match](IMatcher::is_match) / [is_dead](IMatcher::is_dead) at any point.
//! 2. **Streaming lexer.** A [Lexer](lexer::Lexer) runs one matcher per rule in
//!    parallel over the input, applies the longest-match discipline with
//!    major/minor rule priorities as tie-breakers, tracks source positions, and
//!    emits tokens through user factories.
//! 3. **Shift-reduce parser.** A [Parser](parser::Parser) accepts grammar rules with
//!    priorities, associativities, optional right-hand-side symbols and *decision
//!    predicates* — user callbacks consulted during conflicting reductions, which is
//!    how grammars that are not context-free (typedef names, context-dependent
//!    keywords) are driven off the same table machinery.
//!
//! The alphabet is abstract: matchers and lexers are generic over a [Symbol] type,
//! with `u8` for byte streams and `u32` for Unicode code points provided out of the
//! box. A small UTF-8 codec ([utf8]) composes byte input with the `u32` machinery.
//!
//! # Example
//!
//! A miniature expression language, end to end:
//!
//! ```
//! use lang_lr::lexer::{Lexer, RegexRule};
//! use lang_lr::parser::{Assoc, ParseValue, Parser, RuleOpts, RuleSym};
//! use lang_lr::{TextSpan, TokenImpl};
//! use std::rc::Rc;
//!
//! #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
//! enum Sym {
//!     Number,
//!     Plus,
//!     Times,
//!     Expr,
//! }
//!
//! #[derive(Debug)]
//! struct Token {
//!     sym: Sym,
//!     text: String,
//! }
//!
//! impl TokenImpl for Token {
//!     type Symbol = Sym;
//!     fn symbol(&self) -> Sym {
//!         self.sym
//!     }
//! }
//!
//! #[derive(Debug, PartialEq)]
//! enum Ast {
//!     Number(String),
//!     Add(Box<Ast>, Box<Ast>),
//!     Mul(Box<Ast>, Box<Ast>),
//! }
//!
//! fn token(sym: Sym) -> impl Fn(&[u8], TextSpan) -> Option<Token> {
//!     move |s, _| Some(Token { sym, text: String::from_utf8(s.to_vec()).unwrap() })
//! }
//!
//! let mut lexer: Lexer<u8, Token> = Lexer::new("example.calc");
//! lexer.add_rule(Box::new(RegexRule::new("number", "[0-9]+", token(Sym::Number)).unwrap()));
//! lexer.add_rule(Box::new(RegexRule::new("plus", "\\+", token(Sym::Plus)).unwrap()));
//! lexer.add_rule(Box::new(RegexRule::new("times", "\\*", token(Sym::Times)).unwrap()));
//! lexer.dec_priority_major();
//! lexer.add_rule(Box::new(RegexRule::skip("space", "( |\t)+").unwrap()));
//!
//! fn binary(
//!     build: fn(Box<Ast>, Box<Ast>) -> Ast,
//! ) -> impl Fn(&mut (), Vec<ParseValue<Token, Ast>>) -> Ast {
//!     move |_, mut children| {
//!         let rhs = children.pop().unwrap().into_node().unwrap();
//!         children.pop();
//!         let lhs = children.pop().unwrap().into_node().unwrap();
//!         build(Box::new(lhs), Box::new(rhs))
//!     }
//! }
//!
//! let mut parser: Parser<Token, Ast> = Parser::new();
//! parser.rule(
//!     Sym::Expr,
//!     vec![RuleSym::new(Sym::Expr), RuleSym::new(Sym::Plus), RuleSym::new(Sym::Expr)],
//!     binary(|l, r| Ast::Add(l, r)),
//!     RuleOpts::new().priority(1).assoc(Assoc::Left),
//! );
//! parser.rule(
//!     Sym::Expr,
//!     vec![RuleSym::new(Sym::Expr), RuleSym::new(Sym::Times), RuleSym::new(Sym::Expr)],
//!     binary(|l, r| Ast::Mul(l, r)),
//!     RuleOpts::new().priority(2).assoc(Assoc::Left),
//! );
//! parser.rule(
//!     Sym::Expr,
//!     vec![RuleSym::new(Sym::Number)],
//!     |_: &mut (), mut children: Vec<ParseValue<Token, Ast>>| {
//!         Ast::Number(children.pop().unwrap().into_token().unwrap().text.clone())
//!     },
//!     RuleOpts::new(),
//! );
//! parser.add_start_symbol(Sym::Expr);
//! parser.generate_table().unwrap();
//!
//! let mut tokens: Vec<Rc<Token>> = lexer.feed_all(b"1 + 2 * 3").unwrap();
//! tokens.extend(lexer.feed_end().unwrap());
//! let ast = parser.parse(tokens).unwrap();
//!
//! // `*` binds tighter than `+`.
//! assert_eq!(
//!     ast,
//!     Ast::Add(
//!         Box::new(Ast::Number("1".into())),
//!         Box::new(Ast::Mul(
//!             Box::new(Ast::Number("2".into())),
//!             Box::new(Ast::Number("3".into())),
//!         )),
//!     )
//! );
//! ```
//!
//! # License
//! [lang_lr](crate) is provided under the MIT license.

mod error;
mod impl_default;
mod logger;
mod range;
mod source;

pub mod examples;
pub mod lexer;
pub mod parser;
pub mod regex;
pub mod utf8;

use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

/// The alphabet a matcher or lexer runs over.
///
/// A symbol type is a totally ordered, bounded set of values; transition tables are
/// labelled with closed `[low, high]` ranges of symbols. Implementations are provided
/// for `u8` (bytes) and `u32` (Unicode code points, `MAX = 0x10FFFF`).
///
/// Epsilon transitions are *not* a symbol value; the automata keep them in a
/// separate table, so the full `MIN..=MAX` span is usable input.
pub trait Symbol: Copy + Debug + Eq + Hash + Ord + 'static {
    const MIN: Self;
    const MAX: Self;

    /// The next symbol value. Caller guarantees `self < MAX`.
    fn succ(self) -> Self;
    /// The previous symbol value. Caller guarantees `self > MIN`.
    fn pred(self) -> Self;

    /// Convert a pattern literal into a symbol. `None` when the character is not
    /// representable in this alphabet (e.g. `'√'` over `u8`).
    fn from_char(c: char) -> Option<Self>;
    /// The character this symbol renders as, if any.
    fn to_char(self) -> Option<char>;
    /// Human-readable rendering for diagnostics.
    fn describe(self) -> String;
}

/// Streaming matcher protocol shared by the NFA- and DFA-backed engines.
///
/// A matcher consumes one symbol per [feed](IMatcher::feed) call and can be queried
/// at any point: [is_match](IMatcher::is_match) reports whether the symbols fed so
/// far form an accepted word, [is_dead](IMatcher::is_dead) whether no continuation
/// can ever be accepted. Feeding a dead matcher is a no-op.
pub trait IMatcher<S: Symbol> {
    fn reset(&mut self);
    fn feed(&mut self, c: S);
    fn is_match(&self) -> bool;
    fn is_dead(&self) -> bool;

    /// Reset, feed the whole sequence, and report acceptance.
    fn test(&mut self, input: &[S]) -> bool {
        self.reset();
        for &c in input {
            self.feed(c);
        }
        self.is_match()
    }
}

/// A tokenization rule executed by the [Lexer](lexer::Lexer).
///
/// The driver feeds every live rule in parallel and keeps, per rule, the length of
/// the longest prefix that was in a match state. Once every rule has died the best
/// recorded match is dispatched through [emit](ILexerRule::emit).
pub trait ILexerRule<S: Symbol> {
    type Token;

    fn reset(&mut self);
    fn feed(&mut self, c: S);
    fn is_match(&self) -> bool;
    fn is_dead(&self) -> bool;

    /// Pre-acceptance guard, consulted once per rule reset with the last emitted
    /// non-skip token. Returning `false` suppresses the rule for the next token.
    fn accept_first(&self, _last: Option<&Self::Token>) -> bool {
        true
    }

    /// Produce a token from the matched symbols. `None` consumes the input without
    /// emitting anything (whitespace, comments).
    fn emit(&self, matched: &[S], span: TextSpan) -> Option<Self::Token>;

    /// Rule name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Binding between a token value and the grammar symbol it carries.
///
/// The [Parser](parser::Parser) drives its action table off
/// [symbol](TokenImpl::symbol); everything else in the token (text, span, payload)
/// is opaque to the driver and flows into the reduction callbacks untouched.
pub trait TokenImpl: Debug {
    type Symbol: Copy + Debug + Eq + Hash + Ord;

    fn symbol(&self) -> Self::Symbol;
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// The line and column information at a byte offset. Both are 1-based.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Source range carried by every emitted token: 1-based line/column of the first
/// character, the `[begin, end)` byte range, and the originating file name.
pub struct TextSpan {
    pub line: usize,
    pub column: usize,
    pub begin: usize,
    pub end: usize,
    pub filename: Rc<str>,
}

/// Append-only record of the scanned source, embedded in the lexer.
///
/// Bytes are pushed as they are consumed; the map keeps the offsets where lines
/// begin and answers offset → [Position] queries and line-extraction requests for
/// diagnostics.
pub struct SourceMap {
    buffer: Vec<u8>,
    line_starts: Vec<usize>,
    filename: Rc<str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One source line overlapping a queried range, with in-line highlight offsets.
pub struct LineView {
    pub line: usize,
    pub text: String,
    /// Highlight start, relative to the beginning of the line.
    pub begin: usize,
    /// Highlight end (exclusive), relative to the beginning of the line.
    pub end: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// An enum structure to assign multiple level debugging to rules and drivers.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

#[derive(Debug)]
/// An error raised while compiling a regular-expression pattern. The pattern is
/// rejected as a whole.
pub struct RegexError {
    message: String,
}

#[derive(Debug)]
/// An error raised by the [utf8] codec on malformed input.
pub struct Utf8Error {
    message: String,
}

#[derive(Debug)]
/// An error raised synchronously by [feed_char](lexer::Lexer::feed_char) /
/// [feed_end](lexer::Lexer::feed_end).
pub enum LexerError {
    /// No rule can match the input at this position.
    NoMatch {
        position: Position,
        pointer: usize,
        symbol: String,
    },
    /// End of input with characters that no recorded match covers.
    UnexpectedEof { pointer: usize, pending: usize },
    /// Two rules tied at every tie-breaking level; the rule set is misconfigured.
    RuleConflict {
        position: Position,
        first: &'static str,
        second: &'static str,
    },
    /// The byte stream is not valid input for the configured decoder.
    Encoding { pointer: usize, message: String },
}

#[derive(Debug)]
/// An error raised by [generate_table](parser::Parser::generate_table) for grammars
/// the driver cannot accept.
pub struct GrammarError {
    message: String,
}

#[derive(Debug)]
/// An error raised by the parser at runtime; none are recoverable by the driver.
pub enum ParserError {
    /// The token's symbol does not occur in the grammar.
    UnknownToken { symbol: String },
    /// A known token with no viable action in the current state.
    Rejected { state: usize, symbol: String },
    /// End of input without a completed start symbol.
    UnexpectedEnd { message: String },
    /// The parser was fed before `generate_table()`.
    NotReady,
}
