use super::dfa::{DfaEntry, RegexDfa};
use super::node_nfa::StateTransitions;
use crate::range::split_ranges_to_units;
use crate::{IMatcher, Symbol};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

/// Flat NFA after state renumbering.
///
/// Construction precomputes the ε-closure of every state (a worklist fixpoint)
/// and the per-state *range units*: the partition of the alphabet induced by
/// every range reachable through ε from that state. The start state joins the
/// finals when its closure contains one.
pub struct RegexNfa<S: Symbol> {
    states: Vec<StateTransitions<S>>,
    start: usize,
    finals: BTreeSet<usize>,
    closures: Vec<BTreeSet<usize>>,
    range_units: Vec<Vec<(S, S)>>,
}

impl<S: Symbol> RegexNfa<S> {
    pub(crate) fn new(
        states: Vec<StateTransitions<S>>,
        start: usize,
        mut finals: BTreeSet<usize>,
    ) -> Self {
        let closures: Vec<BTreeSet<usize>> = (0..states.len())
            .map(|state| {
                let mut closure = BTreeSet::from([state]);
                let mut queue: VecDeque<usize> = VecDeque::from([state]);
                while let Some(current) = queue.pop_front() {
                    for &target in &states[current].epsilon {
                        if closure.insert(target) {
                            queue.push_back(target);
                        }
                    }
                }
                closure
            })
            .collect();

        let range_units: Vec<Vec<(S, S)>> = closures
            .iter()
            .map(|closure| {
                let mut ranges = Vec::new();
                for &member in closure {
                    for entry in &states[member].ranges {
                        ranges.push((entry.low, entry.high));
                    }
                }
                split_ranges_to_units(ranges)
            })
            .collect();

        if closures[start].iter().any(|state| finals.contains(state)) {
            finals.insert(start);
        }

        Self {
            states,
            start,
            finals,
            closures,
            range_units,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn finals(&self) -> &BTreeSet<usize> {
        &self.finals
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn closure(&self, state: usize) -> &BTreeSet<usize> {
        &self.closures[state]
    }

    /// Successors of a (ε-closed) state set over the unit `[low, high]`: the
    /// ε-closure of every target whose range entry covers the unit.
    fn step(&self, set: &BTreeSet<usize>, low: S, high: S) -> BTreeSet<usize> {
        let mut next = BTreeSet::new();
        for &state in set {
            let ranges = &self.states[state].ranges;
            let index = ranges.partition_point(|entry| entry.high < high);
            if let Some(entry) = ranges.get(index) {
                if entry.low <= low {
                    debug_assert!(entry.high >= high);
                    for &target in &entry.targets {
                        next.extend(self.closures[target].iter().copied());
                    }
                }
            }
        }
        next
    }

    pub(crate) fn state_transition(&self, set: &BTreeSet<usize>, c: S) -> BTreeSet<usize> {
        self.step(set, c, c)
    }

    /// Range-partition subset construction. DFA state 0 is the (ε-closed)
    /// start set, state 1 the dead sink; every state's outgoing ranges cover
    /// the whole alphabet, with the gaps wired to the dead state.
    pub fn compile(&self) -> RegexDfa<S> {
        let mut ids: BTreeMap<BTreeSet<usize>, usize> = BTreeMap::new();
        let mut table: Vec<Vec<DfaEntry<S>>> = Vec::new();

        let start_set = self.closures[self.start].clone();
        ids.insert(start_set.clone(), 0);
        table.push(Vec::new());
        let dead = 1usize;
        ids.insert(BTreeSet::new(), dead);
        table.push(vec![DfaEntry {
            low: S::MIN,
            high: S::MAX,
            next: dead,
        }]);

        let mut queue: VecDeque<BTreeSet<usize>> = VecDeque::from([start_set]);
        while let Some(set) = queue.pop_front() {
            let id = ids[&set];

            let mut ranges: Vec<(S, S)> = Vec::new();
            for &state in &set {
                ranges.extend(self.range_units[state].iter().copied());
            }
            let units = split_ranges_to_units(ranges);

            let mut row: Vec<DfaEntry<S>> = Vec::new();
            let mut next_free = Some(S::MIN);
            for (low, high) in units {
                let successor = self.step(&set, low, high);
                let next = match ids.get(&successor) {
                    Some(&known) => known,
                    None => {
                        let fresh = ids.len();
                        ids.insert(successor.clone(), fresh);
                        table.push(Vec::new());
                        queue.push_back(successor);
                        fresh
                    }
                };
                if let Some(free) = next_free {
                    if low > free {
                        row.push(DfaEntry {
                            low: free,
                            high: low.pred(),
                            next: dead,
                        });
                    }
                }
                row.push(DfaEntry { low, high, next });
                next_free = if high < S::MAX { Some(high.succ()) } else { None };
            }
            if row.is_empty() {
                row.push(DfaEntry {
                    low: S::MIN,
                    high: S::MAX,
                    next: dead,
                });
            } else if let Some(free) = next_free {
                row.push(DfaEntry {
                    low: free,
                    high: S::MAX,
                    next: dead,
                });
            }
            table[id] = row;
        }

        let mut finals = BTreeSet::new();
        for (set, &id) in &ids {
            if set.iter().any(|state| self.finals.contains(state)) {
                finals.insert(id);
            }
        }

        RegexDfa::new(table, 0, BTreeSet::from([dead]), finals)
    }
}

/// Streaming matcher over the flat NFA: the live set starts as the ε-closure
/// of the start state and every step unions the closures of the reached
/// targets. Dead exactly when the live set empties — Thompson fragments have
/// no state that cannot reach the accept.
pub struct NfaMatcher<S: Symbol> {
    nfa: Rc<RegexNfa<S>>,
    current: BTreeSet<usize>,
}

impl<S: Symbol> NfaMatcher<S> {
    pub fn new(nfa: Rc<RegexNfa<S>>) -> Self {
        let current = nfa.closure(nfa.start()).clone();
        Self { nfa, current }
    }

    pub fn nfa(&self) -> &Rc<RegexNfa<S>> {
        &self.nfa
    }
}

impl<S: Symbol> IMatcher<S> for NfaMatcher<S> {
    fn reset(&mut self) {
        self.current = self.nfa.closure(self.nfa.start()).clone();
    }

    fn feed(&mut self, c: S) {
        if self.current.is_empty() {
            return;
        }
        self.current = self.nfa.state_transition(&self.current, c);
    }

    fn is_match(&self) -> bool {
        self.current
            .iter()
            .any(|state| self.nfa.finals().contains(state))
    }

    fn is_dead(&self) -> bool {
        self.current.is_empty()
    }
}
