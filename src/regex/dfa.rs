use super::node_nfa::NodeNfa;
use crate::{IMatcher, Symbol};
use std::collections::{BTreeSet, VecDeque};
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfaEntry<S: Symbol> {
    pub low: S,
    pub high: S,
    pub next: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Deterministic automaton with range-labelled transitions.
///
/// Invariant: every state's transition list is a sorted partition of the whole
/// alphabet — no gaps, no overlaps — so a step is a single binary search.
pub struct RegexDfa<S: Symbol> {
    transitions: Vec<Vec<DfaEntry<S>>>,
    start: usize,
    dead_states: BTreeSet<usize>,
    finals: BTreeSet<usize>,
}

impl<S: Symbol> RegexDfa<S> {
    pub(crate) fn new(
        transitions: Vec<Vec<DfaEntry<S>>>,
        start: usize,
        dead_states: BTreeSet<usize>,
        finals: BTreeSet<usize>,
    ) -> Self {
        Self {
            transitions,
            start,
            dead_states,
            finals,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn dead_states(&self) -> &BTreeSet<usize> {
        &self.dead_states
    }

    pub fn finals(&self) -> &BTreeSet<usize> {
        &self.finals
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn transitions(&self, state: usize) -> &[DfaEntry<S>] {
        &self.transitions[state]
    }

    pub fn state_transition(&self, state: usize, c: S) -> usize {
        let row = &self.transitions[state];
        let index = row.partition_point(|entry| entry.high < c);
        debug_assert!(index < row.len() && row[index].low <= c);
        row[index].next
    }

    /// Flip the accepting states. Over a complete DFA this complements the
    /// accepted language; applying it twice restores the original language.
    /// The dead set is cleared — a former sink accepts everything after it.
    pub fn complement(&self) -> RegexDfa<S> {
        let finals = (0..self.transitions.len())
            .filter(|state| !self.finals.contains(state))
            .collect();
        RegexDfa {
            transitions: self.transitions.clone(),
            start: self.start,
            dead_states: BTreeSet::new(),
            finals,
        }
    }

    /// Trim states that cannot reach a final: they all collapse onto the
    /// single dead state 0 (which keeps a full-alphabet self-loop), surviving
    /// states are renumbered in order, and consecutive edges into the dead
    /// state are coalesced. Idempotent.
    pub fn optimize(&mut self) {
        let count = self.transitions.len();

        let mut reverse: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); count];
        for (state, row) in self.transitions.iter().enumerate() {
            for entry in row {
                reverse[entry.next].insert(state);
            }
        }

        let mut alive = self.finals.clone();
        let mut queue: VecDeque<usize> = alive.iter().copied().collect();
        while let Some(state) = queue.pop_front() {
            for &source in &reverse[state] {
                if alive.insert(source) {
                    queue.push_back(source);
                }
            }
        }

        let mut rewriter = vec![0usize; count];
        let mut next_id = 1;
        for state in 0..count {
            if alive.contains(&state) {
                rewriter[state] = next_id;
                next_id += 1;
            }
        }

        let mut rewritten: Vec<Vec<DfaEntry<S>>> = vec![Vec::new(); next_id];
        rewritten[0] = vec![DfaEntry {
            low: S::MIN,
            high: S::MAX,
            next: 0,
        }];
        for state in 0..count {
            if !alive.contains(&state) {
                continue;
            }
            let mut row: Vec<DfaEntry<S>> = Vec::new();
            for entry in &self.transitions[state] {
                let next = rewriter[entry.next];
                match row.last_mut() {
                    Some(last) if last.next == 0 && next == 0 => {
                        debug_assert!(last.high < S::MAX && last.high.succ() == entry.low);
                        last.high = entry.high;
                    }
                    _ => row.push(DfaEntry {
                        low: entry.low,
                        high: entry.high,
                        next,
                    }),
                }
            }
            rewritten[rewriter[state]] = row;
        }

        self.transitions = rewritten;
        self.start = rewriter[self.start];
        self.dead_states = BTreeSet::from([0]);
        self.finals = self.finals.iter().map(|&state| rewriter[state]).collect();
    }

    /// Round-trip back to ε-NFA form so a complemented automaton can re-embed
    /// in a larger fragment. Finals gain an ε-edge into a fresh single accept;
    /// edges into dead states are dropped.
    pub fn to_node_nfa(&self) -> NodeNfa<S> {
        let accept = self.transitions.len();
        let mut nfa = NodeNfa::new(self.start, accept);
        for (state, row) in self.transitions.iter().enumerate() {
            if self.finals.contains(&state) {
                nfa.add_epsilon(state, accept);
            }
            for entry in row {
                if self.dead_states.contains(&entry.next) {
                    continue;
                }
                nfa.add_range(state, entry.low, entry.high, BTreeSet::from([entry.next]));
            }
        }
        nfa
    }
}

impl<S: Symbol> Display for RegexDfa<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "start state: {}", self.start)?;
        writeln!(f, "dead states: {:?}", self.dead_states)?;
        writeln!(f, "final states: {:?}", self.finals)?;
        for (state, row) in self.transitions.iter().enumerate() {
            write!(f, "state {}: ", state)?;
            for entry in row {
                write!(
                    f,
                    "[{}-{}] -> {} ",
                    entry.low.describe(),
                    entry.high.describe(),
                    entry.next
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Streaming matcher over a [RegexDfa]: one state, one binary search per
/// character.
pub struct DfaMatcher<S: Symbol> {
    dfa: Rc<RegexDfa<S>>,
    current: usize,
}

impl<S: Symbol> DfaMatcher<S> {
    pub fn new(dfa: Rc<RegexDfa<S>>) -> Self {
        let current = dfa.start();
        Self { dfa, current }
    }

    pub fn dfa(&self) -> &Rc<RegexDfa<S>> {
        &self.dfa
    }
}

impl<S: Symbol> IMatcher<S> for DfaMatcher<S> {
    fn reset(&mut self) {
        self.current = self.dfa.start();
    }

    fn feed(&mut self, c: S) {
        if self.dfa.dead_states().contains(&self.current) {
            return;
        }
        self.current = self.dfa.state_transition(self.current, c);
    }

    fn is_match(&self) -> bool {
        self.dfa.finals().contains(&self.current)
    }

    fn is_dead(&self) -> bool {
        self.dfa.dead_states().contains(&self.current)
    }
}
