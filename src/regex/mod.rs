//! Regular-expression engine: pattern → syntax tree → ε-NFA → DFA.
//!
//! Patterns go through two passes. A desugaring pass rewrites the extended
//! operators (`?`, `+`, `{m,n}`, `.`) into the basic dialect (`|`, `*`, groups,
//! classes); a tree pass builds an [ExprNode] syntax tree. The tree lowers to a
//! [NodeNfa] by Thompson construction with character-*range* transition labels,
//! which flattens into a [RegexNfa] (precomputed ε-closures and range units) and
//! determinizes into a [RegexDfa] via a range-partition subset construction.
//!
//! Accepted syntax:
//!
//! * literals, alternation `|`, grouping `(…)`, Kleene star `*`
//! * `X?`, `X+`, `X{m}`, `X{m,}`, `X{m,n}` — desugared into `|`/`*` forms
//! * `.` — any symbol of the alphabet
//! * `[…]` classes with ranges (`a-z`) and leading-`^` complement
//! * escapes `\(` `\)` `\[` `\]` `\^` `\-` `\|` `\*` `\!` `\\` and
//!   `\{` `\}` `\?` `\+` `\.`
//! * complement groups `(!X)`: the strings in which no window matches `X`;
//!   `/\*(!\*/)\*/` is the classic block-comment pattern
//!
//! Both automata expose the streaming [IMatcher](crate::IMatcher) protocol. A
//! [DfaMatcher] steps in `O(log K)` per character (K = transition ranges on the
//! current state) and is the right choice for long-lived rules; an [NfaMatcher]
//! skips determinization and is cheaper to build.
//!
//! ```
//! use lang_lr::regex;
//! use lang_lr::IMatcher;
//!
//! let mut m = regex::compile::<u8>("[A-Za-z_][A-Za-z0-9_]*").unwrap();
//! assert!(m.test(b"snake_case_2"));
//! assert!(!m.test(b"2snakes"));
//!
//! let mut comment = regex::compile::<u8>("/\\*(!\\*/)\\*/").unwrap();
//! assert!(comment.test(b"/* comment */"));
//! assert!(!comment.test(b"/* a */ /* b */"));
//! ```

mod desugar;
mod dfa;
mod nfa;
mod node_nfa;
mod syntax;

#[cfg(test)]
mod __tests__;

pub use dfa::{DfaEntry, DfaMatcher, RegexDfa};
pub use nfa::{NfaMatcher, RegexNfa};
pub use node_nfa::NodeNfa;
pub use syntax::ExprNode;

pub(crate) use node_nfa::StateAllocator;

use crate::{RegexError, Symbol};
use std::rc::Rc;

/// Parse a pattern into its syntax tree (desugaring included).
pub fn parse<S: Symbol>(pattern: &str) -> Result<ExprNode<S>, RegexError> {
    let expanded = desugar::PatternExpander::<S>::expand(pattern)?;
    syntax::RegexTreeBuilder::parse(&expanded)
}

/// Parse a pattern and lower it to an ε-NFA.
pub fn node_nfa<S: Symbol>(pattern: &str) -> Result<NodeNfa<S>, RegexError> {
    let expr = parse::<S>(pattern)?;
    let mut allocator = StateAllocator::new();
    let starts = allocator.newstate();
    let finals = allocator.newstate();
    Ok(expr.build_nfa(&mut allocator, starts, finals))
}

/// Build an NFA-backed matcher: cheap to construct, heavier per character.
pub fn nfa_matcher<S: Symbol>(pattern: &str) -> Result<NfaMatcher<S>, RegexError> {
    let nfa = node_nfa::<S>(pattern)?.to_regex_nfa();
    Ok(NfaMatcher::new(Rc::new(nfa)))
}

/// Compile a pattern down to an optimized DFA matcher. Construction is
/// exponential in the worst case but happens once per pattern; matching is a
/// binary search per character.
pub fn compile<S: Symbol>(pattern: &str) -> Result<DfaMatcher<S>, RegexError> {
    let mut dfa = node_nfa::<S>(pattern)?.to_regex_nfa().compile();
    dfa.optimize();
    Ok(DfaMatcher::new(Rc::new(dfa)))
}
