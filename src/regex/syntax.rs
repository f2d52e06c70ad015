use crate::range::merge_sorted_ranges;
use crate::{RegexError, Symbol};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Syntax tree of a basic-dialect pattern. Immutable after construction; owns
/// its children.
pub enum ExprNode<S: Symbol> {
    Empty,
    CharRange {
        low: S,
        high: S,
    },
    Group {
        child: Box<ExprNode<S>>,
        complemented: bool,
    },
    Concat(Vec<ExprNode<S>>),
    Union(Vec<ExprNode<S>>),
    Star(Box<ExprNode<S>>),
}

impl<S: Symbol> Display for ExprNode<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprNode::Empty => Ok(()),
            ExprNode::CharRange { low, high } => {
                if low == high {
                    write!(f, "{}", low.describe())
                } else {
                    write!(f, "{}-{}", low.describe(), high.describe())
                }
            }
            ExprNode::Group { child, complemented } => {
                write!(f, "({}{})", if *complemented { "!" } else { "" }, child)
            }
            ExprNode::Concat(children) => {
                for child in children {
                    write!(f, "{}", child)?;
                }
                Ok(())
            }
            ExprNode::Union(children) => {
                for (index, child) in children.iter().enumerate() {
                    if index != 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", child)?;
                }
                Ok(())
            }
            ExprNode::Star(child) => write!(f, "{}*", child),
        }
    }
}

/// Stack machine building an [ExprNode] from a desugared pattern.
///
/// Every `(` pushes a frame; `)` pops it into a group node. `|` converts the
/// frame's node into a union and opens an empty arm; `*` stars the last
/// attached node. `[…]` classes collect sorted disjoint ranges; a leading `^`
/// complements them against the full alphabet at class end.
pub(crate) struct RegexTreeBuilder<S: Symbol> {
    stack: Vec<Frame<S>>,
    escaping: bool,
    bracket: Option<BracketClass<S>>,
}

struct Frame<S: Symbol> {
    node: ExprNode<S>,
    complemented: bool,
}

impl<S: Symbol> Frame<S> {
    fn new() -> Self {
        Self {
            node: ExprNode::Empty,
            complemented: false,
        }
    }
}

struct BracketClass<S: Symbol> {
    reversed: bool,
    first: bool,
    escaping: bool,
    state: BracketState<S>,
    ranges: Vec<(S, S)>,
}

#[derive(Clone, Copy)]
enum BracketState<S: Symbol> {
    Idle,
    One(S),
    Dashed(S),
}

const ESCAPABLE: &[char] = &['(', ')', '[', ']', '^', '-', '|', '*', '!', '\\'];

impl<S: Symbol> RegexTreeBuilder<S> {
    pub fn new() -> Self {
        Self {
            stack: vec![Frame::new()],
            escaping: false,
            bracket: None,
        }
    }

    pub fn parse(pattern: &[char]) -> Result<ExprNode<S>, RegexError> {
        let mut builder = Self::new();
        for &c in pattern {
            builder.feed(c)?;
        }
        builder.end()
    }

    pub fn feed(&mut self, c: char) -> Result<(), RegexError> {
        if self.bracket.is_some() {
            return self.handle_bracket(c);
        }

        if self.escaping {
            if !ESCAPABLE.contains(&c) {
                return Err(RegexError::new(format!("unexpected escape \\{}", c)));
            }
            self.escaping = false;
            return self.push_char(c);
        }

        match c {
            '(' => self.stack.push(Frame::new()),
            '!' => {
                let top = self.stack.last_mut().expect("stack is never empty");
                if top.node == ExprNode::Empty && !top.complemented {
                    top.complemented = true;
                } else {
                    self.push_char('!')?;
                }
            }
            ')' => {
                if self.stack.len() < 2 {
                    return Err(RegexError::new("unexpected ')'"));
                }
                let frame = self.stack.pop().expect("checked above");
                self.push_node(ExprNode::Group {
                    child: Box::new(frame.node),
                    complemented: frame.complemented,
                });
            }
            '[' => self.bracket = Some(BracketClass::new()),
            ']' => return Err(RegexError::new("unexpected ']'")),
            '|' => {
                let top = self.stack.last_mut().expect("stack is never empty");
                let node = std::mem::replace(&mut top.node, ExprNode::Empty);
                let mut arms = match node {
                    ExprNode::Union(arms) => arms,
                    other => vec![other],
                };
                arms.push(ExprNode::Empty);
                top.node = ExprNode::Union(arms);
            }
            '*' => {
                let top = self.stack.last_mut().expect("stack is never empty");
                let node = std::mem::replace(&mut top.node, ExprNode::Empty);
                top.node = star_last(node)?;
            }
            '\\' => self.escaping = true,
            _ => self.push_char(c)?,
        }
        Ok(())
    }

    pub fn end(mut self) -> Result<ExprNode<S>, RegexError> {
        if self.escaping {
            return Err(RegexError::new("pattern ends inside an escape"));
        }
        if self.bracket.is_some() {
            return Err(RegexError::new("unterminated character class"));
        }
        if self.stack.len() != 1 {
            return Err(RegexError::new("unmatched '('"));
        }
        Ok(self.stack.pop().expect("checked above").node)
    }

    fn symbol(c: char) -> Result<S, RegexError> {
        S::from_char(c).ok_or_else(|| {
            RegexError::new(format!("character {:?} is not representable in the alphabet", c))
        })
    }

    fn push_char(&mut self, c: char) -> Result<(), RegexError> {
        let sym = Self::symbol(c)?;
        self.push_node(ExprNode::CharRange { low: sym, high: sym });
        Ok(())
    }

    fn push_node(&mut self, node: ExprNode<S>) {
        let top = self.stack.last_mut().expect("stack is never empty");
        let old = std::mem::replace(&mut top.node, ExprNode::Empty);
        top.node = attach(old, node);
    }

    fn handle_bracket(&mut self, c: char) -> Result<(), RegexError> {
        let bracket = self.bracket.as_mut().expect("bracket mode active");

        if bracket.first && c == '^' && !bracket.escaping {
            bracket.first = false;
            bracket.reversed = true;
            return Ok(());
        }
        bracket.first = false;

        if bracket.escaping {
            if c != ']' && c != '\\' {
                return Err(RegexError::new(format!(
                    "unexpected escape \\{} in character class",
                    c
                )));
            }
            bracket.escaping = false;
        } else if c == '\\' {
            bracket.escaping = true;
            return Ok(());
        } else if c == ']' {
            let bracket = self.bracket.take().expect("bracket mode active");
            let node = bracket.finish()?;
            self.push_node(node);
            return Ok(());
        }

        let sym = Self::symbol(c)?;
        match bracket.state {
            BracketState::Idle => bracket.state = BracketState::One(sym),
            BracketState::One(low) => {
                if c == '-' {
                    bracket.state = BracketState::Dashed(low);
                } else {
                    bracket.ranges.push((low, low));
                    bracket.state = BracketState::One(sym);
                }
            }
            BracketState::Dashed(low) => {
                if low > sym {
                    return Err(RegexError::new(format!(
                        "inverted range {}-{} in character class",
                        low.describe(),
                        sym.describe()
                    )));
                }
                bracket.ranges.push((low, sym));
                bracket.state = BracketState::Idle;
            }
        }
        Ok(())
    }
}

impl<S: Symbol> BracketClass<S> {
    fn new() -> Self {
        Self {
            reversed: false,
            first: true,
            escaping: false,
            state: BracketState::Idle,
            ranges: Vec::new(),
        }
    }

    fn finish(mut self) -> Result<ExprNode<S>, RegexError> {
        match self.state {
            BracketState::Idle => {}
            BracketState::One(low) => self.ranges.push((low, low)),
            BracketState::Dashed(low) => {
                // A trailing dash is a literal.
                self.ranges.push((low, low));
                let dash = S::from_char('-')
                    .ok_or_else(|| RegexError::new("'-' is not representable in the alphabet"))?;
                self.ranges.push((dash, dash));
            }
        }

        self.ranges.sort();
        let mut merged = merge_sorted_ranges(&self.ranges);
        if self.reversed {
            merged = complement_cover(&merged);
        }
        if merged.is_empty() {
            return Err(RegexError::new("empty character class"));
        }

        let node = if merged.len() == 1 {
            ExprNode::CharRange {
                low: merged[0].0,
                high: merged[0].1,
            }
        } else {
            ExprNode::Union(
                merged
                    .into_iter()
                    .map(|(low, high)| ExprNode::CharRange { low, high })
                    .collect(),
            )
        };
        Ok(ExprNode::Group {
            child: Box::new(node),
            complemented: false,
        })
    }
}

/// The gaps of a merged, sorted cover within `[MIN, MAX]`.
fn complement_cover<S: Symbol>(cover: &[(S, S)]) -> Vec<(S, S)> {
    let mut result = Vec::new();
    let mut next = Some(S::MIN);
    for &(low, high) in cover {
        if let Some(n) = next {
            if n < low {
                result.push((n, low.pred()));
            }
        }
        next = if high < S::MAX { Some(high.succ()) } else { None };
    }
    if let Some(n) = next {
        result.push((n, S::MAX));
    }
    result
}

fn attach<S: Symbol>(old: ExprNode<S>, node: ExprNode<S>) -> ExprNode<S> {
    match old {
        ExprNode::Concat(mut children) => {
            children.push(node);
            ExprNode::Concat(children)
        }
        ExprNode::Union(mut arms) => {
            let last = arms.pop().expect("union arms are never empty");
            arms.push(attach(last, node));
            ExprNode::Union(arms)
        }
        ExprNode::Empty => node,
        other => ExprNode::Concat(vec![other, node]),
    }
}

fn star_last<S: Symbol>(node: ExprNode<S>) -> Result<ExprNode<S>, RegexError> {
    match node {
        ExprNode::Group { .. } | ExprNode::Star(_) | ExprNode::CharRange { .. } => {
            Ok(ExprNode::Star(Box::new(node)))
        }
        ExprNode::Concat(mut children) => {
            let last = children.pop().expect("concat children are never empty");
            children.push(star_last(last)?);
            Ok(ExprNode::Concat(children))
        }
        ExprNode::Union(mut arms) => {
            let last = arms.pop().expect("union arms are never empty");
            arms.push(star_last(last)?);
            Ok(ExprNode::Union(arms))
        }
        ExprNode::Empty => Err(RegexError::new("'*' is missing its target")),
    }
}
