//! Shift-reduce parser driver.
//!
//! A [Parser] is programmed with grammar rules over one symbol space shared by
//! terminals and non-terminals (terminals are simply the symbols that never
//! appear on a left-hand side). Each rule carries a reduction callback, a
//! priority, an associativity, and optionally a *decision predicate*.
//!
//! [generate_table](Parser::generate_table) runs the LR item-set construction
//! over the rules. Shift/reduce conflicts are resolved by the priority lattice
//! — a rule with a decision predicate defers to runtime, otherwise higher
//! priority wins and equal priorities fall back to the reduce rule's
//! associativity (left prefers reduce, right prefers shift). Reduce/reduce
//! ties resolve by priority then declaration order, with a warning.
//!
//! Decision predicates are the one feature beyond context-free grammars: at a
//! conflict the driver synthesizes the reduction's right-hand-side slice
//! *without committing it* and asks the predicate
//! `(context, rhs_slice, lookahead) -> bool`. A true result commits the
//! reduction, false picks the alternative. Predicates must be pure over the
//! context at call time — read the scope tables, never mutate parser state.
//! This is how C's `typedef` ambiguity is resolved: the predicate asks whether
//! the identifier was registered as a type name by an earlier reduction.
//!
//! Right-hand-side symbols may be marked [optional](RuleSym::optional); the
//! driver internally expands the rule into its present/absent variants, all
//! sharing the declared callback, which sees [ParseValue::Absent] placeholders
//! at the missing slots.
//!
//! The per-parse context value (`TCtx`) lives exactly as long as one parse and
//! is handed mutably to every reduction callback — scope stacks, counters and
//! reporters belong there, not in globals.

mod driver;
mod table;

#[cfg(test)]
mod __tests__;

pub(crate) use table::{ParseTable, Variant};

use crate::{TextSpan, TokenImpl};
use std::fmt::Debug;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Conflict-resolution direction for rules of equal priority.
pub enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One right-hand-side position of a grammar rule.
pub struct RuleSym<TSym> {
    pub sym: TSym,
    pub optional: bool,
}

impl<TSym> RuleSym<TSym> {
    pub fn new(sym: TSym) -> Self {
        Self {
            sym,
            optional: false,
        }
    }

    /// A position that may match empty; the callback receives
    /// [ParseValue::Absent] in that slot.
    pub fn optional(sym: TSym) -> Self {
        Self {
            sym,
            optional: true,
        }
    }
}

#[derive(Debug)]
/// A value on the parser's symbol stack, handed to reduction callbacks.
pub enum ParseValue<TT, TN> {
    Token(Rc<TT>),
    Node(TN),
    /// Placeholder for an optional symbol that matched empty.
    Absent,
}

impl<TT, TN> ParseValue<TT, TN> {
    pub fn into_token(self) -> Option<Rc<TT>> {
        match self {
            ParseValue::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<TN> {
        match self {
            ParseValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_token(&self) -> Option<&Rc<TT>> {
        match self {
            ParseValue::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&TN> {
        match self {
            ParseValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ParseValue::Absent)
    }
}

#[derive(Debug)]
/// Borrowed view of a stack value, as seen by decision predicates.
pub enum ParseSlot<'a, TT, TN> {
    Token(&'a Rc<TT>),
    Node(&'a TN),
    Absent,
}

impl<'a, TT, TN> ParseSlot<'a, TT, TN> {
    pub fn as_token(&self) -> Option<&'a Rc<TT>> {
        match self {
            ParseSlot::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&'a TN> {
        match self {
            ParseSlot::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ParseSlot::Absent)
    }
}

/// Reduction callback: consumes the matched right-hand-side values and builds
/// the non-terminal's node.
pub type ReduceFn<TT, TN, TCtx> = Rc<dyn Fn(&mut TCtx, Vec<ParseValue<TT, TN>>) -> TN>;

/// Decision predicate `(context, rhs_slice, lookahead) -> bool`, consulted at
/// parse time to commit or skip a conflicting reduction. Must be pure over the
/// context.
pub type DecisionFn<TT, TN, TCtx> =
    Rc<dyn Fn(&TCtx, &[ParseSlot<TT, TN>], Option<&Rc<TT>>) -> bool>;

/// Per-rule options: priority, associativity and an optional decision
/// predicate.
pub struct RuleOpts<TT, TN, TCtx> {
    pub priority: i32,
    pub assoc: Assoc,
    pub decision: Option<DecisionFn<TT, TN, TCtx>>,
}

impl<TT, TN, TCtx> RuleOpts<TT, TN, TCtx> {
    pub fn new() -> Self {
        Self {
            priority: 0,
            assoc: Assoc::Left,
            decision: None,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn assoc(mut self, assoc: Assoc) -> Self {
        self.assoc = assoc;
        self
    }

    /// Attach a decision predicate; the rule's conflicts defer to it at parse
    /// time.
    pub fn decide(
        mut self,
        decision: impl Fn(&TCtx, &[ParseSlot<TT, TN>], Option<&Rc<TT>>) -> bool + 'static,
    ) -> Self {
        self.decision = Some(Rc::new(decision));
        self
    }
}

impl<TT, TN, TCtx> Default for RuleOpts<TT, TN, TCtx> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct GrammarRule<TT: TokenImpl, TN, TCtx> {
    pub lhs: TT::Symbol,
    pub rhs: Vec<RuleSym<TT::Symbol>>,
    pub callback: ReduceFn<TT, TN, TCtx>,
    pub priority: i32,
    pub assoc: Assoc,
    pub decision: Option<DecisionFn<TT, TN, TCtx>>,
}

pub(crate) struct StackEntry<TT: TokenImpl, TN> {
    pub sym: TT::Symbol,
    pub value: ParseValue<TT, TN>,
}

/// Augmented shift-reduce parser. See the [module documentation](self).
pub struct Parser<TT: TokenImpl, TN, TCtx = ()> {
    rules: Vec<GrammarRule<TT, TN, TCtx>>,
    start_symbols: Vec<TT::Symbol>,
    variants: Vec<Variant<TT::Symbol>>,
    terminals: std::collections::HashSet<TT::Symbol>,
    table: Option<ParseTable<TT::Symbol>>,
    warnings: Vec<String>,
    state_stack: Vec<usize>,
    value_stack: Vec<StackEntry<TT, TN>>,
    context: TCtx,
    debug: Option<Box<dyn std::io::Write>>,
}

impl<TT: TokenImpl, TN, TCtx: Default> Parser<TT, TN, TCtx> {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            start_symbols: Vec::new(),
            variants: Vec::new(),
            terminals: std::collections::HashSet::new(),
            table: None,
            warnings: Vec::new(),
            state_stack: vec![0],
            value_stack: Vec::new(),
            context: TCtx::default(),
            debug: None,
        }
    }

    /// Clear per-parse state (stacks and context); the generated table and
    /// rules are reused.
    pub fn reset(&mut self) {
        self.state_stack.clear();
        self.state_stack.push(0);
        self.value_stack.clear();
        self.context = TCtx::default();
    }
}

impl<TT: TokenImpl, TN, TCtx: Default> Default for Parser<TT, TN, TCtx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<TT: TokenImpl, TN, TCtx> Parser<TT, TN, TCtx> {
    /// Register a grammar rule; returns its rule id (declaration order).
    pub fn rule(
        &mut self,
        lhs: TT::Symbol,
        rhs: Vec<RuleSym<TT::Symbol>>,
        callback: impl Fn(&mut TCtx, Vec<ParseValue<TT, TN>>) -> TN + 'static,
        opts: RuleOpts<TT, TN, TCtx>,
    ) -> usize {
        // The grammar is frozen by generate_table(); a later registration
        // invalidates the table rather than mutating a live one.
        self.table = None;
        let id = self.rules.len();
        self.rules.push(GrammarRule {
            lhs,
            rhs,
            callback: Rc::new(callback),
            priority: opts.priority,
            assoc: opts.assoc,
            decision: opts.decision,
        });
        id
    }

    /// Declare an accepting non-terminal; any number may be registered.
    pub fn add_start_symbol(&mut self, sym: TT::Symbol) {
        if !self.start_symbols.contains(&sym) {
            self.start_symbols.push(sym);
        }
    }

    /// Route shift/reduce traces and table-generation warnings to a stream.
    pub fn set_debug_stream(&mut self, out: Box<dyn std::io::Write>) {
        self.debug = Some(out);
    }

    /// Warnings collected by the last `generate_table()` run.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn context(&self) -> &TCtx {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut TCtx {
        &mut self.context
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A generic, tag-labelled parse tree for consumers that want a uniform tree
/// shape instead of a typed AST. Renders with [print](ParseTree::print).
pub struct ParseTree<TTag: Debug + Clone> {
    pub tag: TTag,
    pub span: Option<TextSpan>,
    pub children: Vec<ParseTree<TTag>>,
}

impl<TTag: Debug + Clone> ParseTree<TTag> {
    pub fn new(tag: TTag, children: Vec<ParseTree<TTag>>) -> Self {
        Self {
            tag,
            span: None,
            children,
        }
    }

    pub fn leaf(tag: TTag, span: TextSpan) -> Self {
        Self {
            tag,
            span: Some(span),
            children: Vec::new(),
        }
    }

    pub fn contains(&self, tag: &TTag) -> bool
    where
        TTag: PartialEq,
    {
        &self.tag == tag || self.children.iter().any(|child| child.contains(tag))
    }

    /// Depth-first search for the first subtree matching the predicate.
    pub fn find<F: Fn(&Self) -> bool>(&self, predicate: &F) -> Option<&Self> {
        if predicate(self) {
            Some(self)
        } else {
            self.children
                .iter()
                .find_map(|child| child.find(predicate))
        }
    }

    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}

impl<TTag: Debug + Clone> ptree::TreeItem for ParseTree<TTag> {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        match &self.span {
            Some(span) => write!(f, "{:?} # {}-{}", self.tag, span.begin, span.end),
            None => write!(f, "{:?}", self.tag),
        }
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        std::borrow::Cow::from(&self.children)
    }
}
