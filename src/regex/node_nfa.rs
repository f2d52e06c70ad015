use super::nfa::RegexNfa;
use super::syntax::ExprNode;
use crate::Symbol;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// Monotonic state-id source, owned by one NFA build.
pub(crate) struct StateAllocator {
    next: usize,
}

impl StateAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn newstate(&mut self) -> usize {
        let state = self.next;
        self.next += 1;
        state
    }
}

#[derive(Debug, Clone)]
/// Outgoing transitions of one state: an epsilon target set plus a sorted,
/// disjoint list of range entries.
pub(crate) struct StateTransitions<S: Symbol> {
    pub epsilon: BTreeSet<usize>,
    pub ranges: Vec<NfaEntry<S>>,
}

impl<S: Symbol> StateTransitions<S> {
    pub fn new() -> Self {
        Self {
            epsilon: BTreeSet::new(),
            ranges: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NfaEntry<S: Symbol> {
    pub low: S,
    pub high: S,
    pub targets: BTreeSet<usize>,
}

/// ε-NFA fresh out of Thompson construction: a sparse transition map with
/// exactly one start and one accept state. All acceptance is encoded as
/// ε-edges into `accept`.
pub struct NodeNfa<S: Symbol> {
    transitions: BTreeMap<usize, StateTransitions<S>>,
    start: usize,
    accept: usize,
}

impl<S: Symbol> NodeNfa<S> {
    pub(crate) fn new(start: usize, accept: usize) -> Self {
        Self {
            transitions: BTreeMap::new(),
            start,
            accept,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn accept(&self) -> usize {
        self.accept
    }

    pub(crate) fn add_epsilon(&mut self, from: usize, to: usize) {
        self.transitions
            .entry(from)
            .or_insert_with(StateTransitions::new)
            .epsilon
            .insert(to);
    }

    pub(crate) fn add_range(&mut self, from: usize, low: S, high: S, targets: BTreeSet<usize>) {
        debug_assert!(low <= high);
        let slot = self
            .transitions
            .entry(from)
            .or_insert_with(StateTransitions::new);
        let existing = std::mem::take(&mut slot.ranges);
        slot.ranges = merge_entry_lists(existing, vec![NfaEntry { low, high, targets }]);
    }

    /// Fold another fragment's transitions into this one.
    pub(crate) fn merge_from(&mut self, other: NodeNfa<S>) {
        for (state, incoming) in other.transitions {
            let slot = self
                .transitions
                .entry(state)
                .or_insert_with(StateTransitions::new);
            slot.epsilon.extend(incoming.epsilon);
            let existing = std::mem::take(&mut slot.ranges);
            slot.ranges = merge_entry_lists(existing, incoming.ranges);
        }
    }

    /// Rewrite the fragment onto fresh state ids, stitching its start/accept
    /// onto the caller's `(starts, finals)` pair.
    pub(crate) fn relocate(
        self,
        allocator: &mut StateAllocator,
        starts: usize,
        finals: usize,
    ) -> NodeNfa<S> {
        let mut rewriter: BTreeMap<usize, usize> =
            BTreeMap::from([(self.start, starts), (self.accept, finals)]);
        let mut query = |state: usize, rewriter: &mut BTreeMap<usize, usize>| -> usize {
            if let Some(&mapped) = rewriter.get(&state) {
                return mapped;
            }
            let mapped = allocator.newstate();
            rewriter.insert(state, mapped);
            mapped
        };

        let mut relocated = NodeNfa::new(starts, finals);
        for (state, transitions) in self.transitions {
            let from = query(state, &mut rewriter);
            let slot = relocated
                .transitions
                .entry(from)
                .or_insert_with(StateTransitions::new);
            for target in transitions.epsilon {
                let mapped = query(target, &mut rewriter);
                slot.epsilon.insert(mapped);
            }
            for entry in transitions.ranges {
                let targets = entry
                    .targets
                    .into_iter()
                    .map(|t| query(t, &mut rewriter))
                    .collect();
                slot.ranges.push(NfaEntry {
                    low: entry.low,
                    high: entry.high,
                    targets,
                });
            }
        }
        relocated
    }

    /// Flatten into the renumbered array representation with precomputed
    /// ε-closures and range units.
    pub fn to_regex_nfa(&self) -> RegexNfa<S> {
        let mut rewriter: BTreeMap<usize, usize> = BTreeMap::new();
        let mut query = |state: usize, rewriter: &mut BTreeMap<usize, usize>| -> usize {
            if let Some(&mapped) = rewriter.get(&state) {
                return mapped;
            }
            let mapped = rewriter.len();
            rewriter.insert(state, mapped);
            mapped
        };

        let start = query(self.start, &mut rewriter);
        let accept = query(self.accept, &mut rewriter);

        let mut states: Vec<StateTransitions<S>> = Vec::new();
        let mut ensure = |states: &mut Vec<StateTransitions<S>>, id: usize| {
            while states.len() <= id {
                states.push(StateTransitions::new());
            }
        };
        ensure(&mut states, start.max(accept));

        for (state, transitions) in &self.transitions {
            let from = query(*state, &mut rewriter);
            ensure(&mut states, from);
            let mut flat = StateTransitions::new();
            for &target in &transitions.epsilon {
                flat.epsilon.insert(query(target, &mut rewriter));
            }
            for entry in &transitions.ranges {
                let targets: BTreeSet<usize> = entry
                    .targets
                    .iter()
                    .map(|&t| query(t, &mut rewriter))
                    .collect();
                flat.ranges.push(NfaEntry {
                    low: entry.low,
                    high: entry.high,
                    targets,
                });
            }
            states[from] = flat;
        }
        ensure(&mut states, rewriter.len().saturating_sub(1));

        RegexNfa::new(states, start, BTreeSet::from([accept]))
    }
}

impl<S: Symbol> Display for NodeNfa<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "start: {}", self.start)?;
        writeln!(f, "accept: {}", self.accept)?;
        for (state, transitions) in &self.transitions {
            write!(f, "{}: ", state)?;
            if !transitions.epsilon.is_empty() {
                write!(f, "ε -> {:?} ", transitions.epsilon)?;
            }
            for entry in &transitions.ranges {
                if entry.low == entry.high {
                    write!(f, "{} -> {:?} ", entry.low.describe(), entry.targets)?;
                } else {
                    write!(
                        f,
                        "[{}-{}] -> {:?} ",
                        entry.low.describe(),
                        entry.high.describe(),
                        entry.targets
                    )?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Merge two sorted disjoint entry lists into one, splitting overlapping
/// ranges at their boundaries and unioning target sets.
pub(crate) fn merge_entry_lists<S: Symbol>(
    a: Vec<NfaEntry<S>>,
    b: Vec<NfaEntry<S>>,
) -> Vec<NfaEntry<S>> {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }

    let mut cuts: Vec<S> = Vec::with_capacity((a.len() + b.len()) * 2);
    for entry in a.iter().chain(b.iter()) {
        cuts.push(entry.low);
        if entry.high < S::MAX {
            cuts.push(entry.high.succ());
        }
    }
    cuts.sort();
    cuts.dedup();

    fn locate<S: Symbol>(list: &[NfaEntry<S>], point: S) -> Option<&NfaEntry<S>> {
        let index = list.partition_point(|entry| entry.high < point);
        list.get(index).filter(move |entry| entry.low <= point)
    }

    let mut merged: Vec<NfaEntry<S>> = Vec::new();
    for (index, &point) in cuts.iter().enumerate() {
        let mut targets = BTreeSet::new();
        if let Some(entry) = locate(&a, point) {
            targets.extend(entry.targets.iter().copied());
        }
        if let Some(entry) = locate(&b, point) {
            targets.extend(entry.targets.iter().copied());
        }
        if targets.is_empty() {
            continue;
        }
        let high = match cuts.get(index + 1) {
            Some(&next) => next.pred(),
            None => S::MAX,
        };
        match merged.last_mut() {
            Some(last)
                if last.targets == targets && last.high < S::MAX && last.high.succ() == point =>
            {
                last.high = high;
            }
            _ => merged.push(NfaEntry {
                low: point,
                high,
                targets,
            }),
        }
    }
    merged
}

impl<S: Symbol> ExprNode<S> {
    /// Thompson construction: lower this node into an NFA fragment running from
    /// `starts` to `finals`, allocating intermediate states from `allocator`.
    pub(crate) fn build_nfa(
        &self,
        allocator: &mut StateAllocator,
        starts: usize,
        finals: usize,
    ) -> NodeNfa<S> {
        match self {
            ExprNode::Empty => {
                let mut nfa = NodeNfa::new(starts, finals);
                nfa.add_epsilon(starts, finals);
                nfa
            }
            ExprNode::CharRange { low, high } => {
                let mut nfa = NodeNfa::new(starts, finals);
                nfa.add_range(starts, *low, *high, BTreeSet::from([finals]));
                nfa
            }
            ExprNode::Concat(children) => {
                debug_assert!(!children.is_empty());
                if children.len() == 1 {
                    return children[0].build_nfa(allocator, starts, finals);
                }
                let mut nfa = NodeNfa::new(starts, finals);
                let mut from = starts;
                for (index, child) in children.iter().enumerate() {
                    let to = if index + 1 == children.len() {
                        finals
                    } else {
                        allocator.newstate()
                    };
                    nfa.merge_from(child.build_nfa(allocator, from, to));
                    from = to;
                }
                nfa
            }
            ExprNode::Union(children) => {
                debug_assert!(!children.is_empty());
                if children.len() == 1 {
                    return children[0].build_nfa(allocator, starts, finals);
                }
                let mut nfa = NodeNfa::new(starts, finals);
                for child in children {
                    nfa.merge_from(child.build_nfa(allocator, starts, finals));
                }
                nfa
            }
            ExprNode::Star(child) => {
                let mut nfa = child.build_nfa(allocator, starts, finals);
                nfa.add_epsilon(starts, finals);
                nfa.add_epsilon(finals, starts);
                nfa
            }
            ExprNode::Group { child, complemented } => {
                if !*complemented {
                    return child.build_nfa(allocator, starts, finals);
                }
                complement_fragment(child, allocator, starts, finals)
            }
        }
    }
}

/// Lower a complement group: the language of strings in which no window
/// matches the child. The child is padded with `Σ*` on both sides, compiled
/// to a DFA, its finals flipped, the result trimmed and round-tripped back
/// into NFA form inside the caller's fragment.
fn complement_fragment<S: Symbol>(
    child: &ExprNode<S>,
    allocator: &mut StateAllocator,
    starts: usize,
    finals: usize,
) -> NodeNfa<S> {
    let any = ExprNode::CharRange {
        low: S::MIN,
        high: S::MAX,
    };
    let padded = ExprNode::Concat(vec![
        ExprNode::Star(Box::new(any.clone())),
        child.clone(),
        ExprNode::Star(Box::new(any)),
    ]);

    let mut local = StateAllocator::new();
    let local_start = local.newstate();
    let local_accept = local.newstate();
    let nfa = padded.build_nfa(&mut local, local_start, local_accept);

    let mut complemented = nfa.to_regex_nfa().compile().complement();
    complemented.optimize();
    complemented.to_node_nfa().relocate(allocator, starts, finals)
}
