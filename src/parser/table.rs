use super::{Assoc, Parser};
use crate::{GrammarError, TokenImpl};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::io::Write;

#[derive(Debug, Clone)]
/// One present/absent expansion of a declared rule. `symbols` is the concrete
/// right-hand side; `present` has the declared arity and marks which declared
/// slots this variant keeps.
pub(crate) struct Variant<TSym> {
    pub rule: usize,
    pub lhs: TSym,
    pub symbols: Vec<TSym>,
    pub present: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Shift(usize),
    Reduce(usize),
}

#[derive(Debug, Clone, Default)]
/// Resolved actions for one (state, lookahead) pair: decision-guarded
/// reductions tried in order, then an unguarded fallback.
pub(crate) struct ActionCell {
    pub guarded: Vec<usize>,
    pub fallback: Option<Action>,
}

pub(crate) struct ParseTable<TSym> {
    pub actions: Vec<HashMap<Option<TSym>, ActionCell>>,
    pub gotos: Vec<HashMap<TSym, usize>>,
}

/// An LR item: variant id plus dot position.
type Item = (usize, usize);

impl<TT: TokenImpl, TN, TCtx> Parser<TT, TN, TCtx> {
    /// Run the item-set construction and freeze the grammar into an action and
    /// goto table. Conflicts are resolved by the priority/associativity
    /// lattice; rules with decision predicates defer to runtime. Fails when
    /// the grammar has no rules, no start symbol, or a start symbol that is
    /// not a non-terminal with rules.
    pub fn generate_table(&mut self) -> Result<(), GrammarError> {
        self.warnings.clear();

        if self.rules.is_empty() {
            return Err(GrammarError::new("the grammar has no rules"));
        }

        let nonterminals: HashSet<TT::Symbol> = self.rules.iter().map(|rule| rule.lhs).collect();
        let mut terminals: HashSet<TT::Symbol> = HashSet::new();
        for rule in &self.rules {
            for slot in &rule.rhs {
                if !nonterminals.contains(&slot.sym) {
                    terminals.insert(slot.sym);
                }
            }
        }

        if self.start_symbols.is_empty() {
            return Err(GrammarError::new("no start symbol declared"));
        }
        for sym in &self.start_symbols {
            if !nonterminals.contains(sym) {
                return Err(GrammarError::new(format!(
                    "start symbol {:?} is not a non-terminal",
                    sym
                )));
            }
        }

        // Optional-symbol rewriting: each rule expands into its present/absent
        // variants, present-first so declaration order prefers the full form.
        let mut variants: Vec<Variant<TT::Symbol>> = Vec::new();
        for (rule_id, rule) in self.rules.iter().enumerate() {
            let optional_slots: Vec<usize> = rule
                .rhs
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| slot.optional.then(|| index))
                .collect();
            let combinations = 1usize << optional_slots.len();
            for mask in 0..combinations {
                let mut present = vec![true; rule.rhs.len()];
                for (bit, &slot) in optional_slots.iter().enumerate() {
                    if mask & (1 << bit) != 0 {
                        present[slot] = false;
                    }
                }
                let symbols = rule
                    .rhs
                    .iter()
                    .zip(&present)
                    .filter_map(|(slot, &keep)| keep.then(|| slot.sym))
                    .collect();
                variants.push(Variant {
                    rule: rule_id,
                    lhs: rule.lhs,
                    symbols,
                    present,
                });
            }
        }

        let mut by_lhs: HashMap<TT::Symbol, Vec<usize>> = HashMap::new();
        for (id, variant) in variants.iter().enumerate() {
            by_lhs.entry(variant.lhs).or_default().push(id);
        }

        let (nullable, first) = first_sets(&variants, &nonterminals);
        let follow = follow_sets(
            &variants,
            &nonterminals,
            &nullable,
            &first,
            &self.start_symbols,
        );

        // Canonical item-set construction.
        let closure = |kernel: BTreeSet<Item>| -> BTreeSet<Item> {
            let mut set = kernel;
            let mut queue: VecDeque<Item> = set.iter().copied().collect();
            while let Some((variant, dot)) = queue.pop_front() {
                if let Some(&next) = variants[variant].symbols.get(dot) {
                    if let Some(productions) = by_lhs.get(&next) {
                        for &production in productions {
                            if set.insert((production, 0)) {
                                queue.push_back((production, 0));
                            }
                        }
                    }
                }
            }
            set
        };

        let start_kernel: BTreeSet<Item> = self
            .start_symbols
            .iter()
            .flat_map(|sym| by_lhs[sym].iter().map(|&variant| (variant, 0)))
            .collect();

        let mut state_ids: BTreeMap<BTreeSet<Item>, usize> = BTreeMap::new();
        let mut states: Vec<BTreeSet<Item>> = Vec::new();
        let start_state = closure(start_kernel);
        state_ids.insert(start_state.clone(), 0);
        states.push(start_state);

        let mut shifts: Vec<HashMap<TT::Symbol, usize>> = Vec::new();
        let mut gotos: Vec<HashMap<TT::Symbol, usize>> = Vec::new();

        let mut pending = 0usize;
        while pending < states.len() {
            let state = states[pending].clone();

            let mut by_next: BTreeMap<TT::Symbol, BTreeSet<Item>> = BTreeMap::new();
            for &(variant, dot) in &state {
                if let Some(&next) = variants[variant].symbols.get(dot) {
                    by_next.entry(next).or_default().insert((variant, dot + 1));
                }
            }

            let mut state_shifts = HashMap::new();
            let mut state_gotos = HashMap::new();
            for (sym, kernel) in by_next {
                let successor = closure(kernel);
                let id = match state_ids.get(&successor) {
                    Some(&id) => id,
                    None => {
                        let id = states.len();
                        state_ids.insert(successor.clone(), id);
                        states.push(successor);
                        id
                    }
                };
                if nonterminals.contains(&sym) {
                    state_gotos.insert(sym, id);
                } else {
                    state_shifts.insert(sym, id);
                }
            }
            shifts.push(state_shifts);
            gotos.push(state_gotos);
            pending += 1;
        }

        // Action cells with conflict resolution.
        let mut actions: Vec<HashMap<Option<TT::Symbol>, ActionCell>> =
            Vec::with_capacity(states.len());
        for (state_id, state) in states.iter().enumerate() {
            let mut reduce_candidates: HashMap<Option<TT::Symbol>, Vec<usize>> = HashMap::new();
            for &(variant, dot) in state {
                if dot != variants[variant].symbols.len() {
                    continue;
                }
                if let Some(lookaheads) = follow.get(&variants[variant].lhs) {
                    for lookahead in lookaheads {
                        reduce_candidates
                            .entry(*lookahead)
                            .or_default()
                            .push(variant);
                    }
                }
            }

            let mut lookaheads: BTreeSet<Option<TT::Symbol>> =
                reduce_candidates.keys().copied().collect();
            lookaheads.extend(shifts[state_id].keys().map(|&sym| Some(sym)));

            let mut cells = HashMap::new();
            for lookahead in lookaheads {
                let shift = lookahead.and_then(|sym| {
                    shifts[state_id].get(&sym).map(|&next| {
                        let priority = state
                            .iter()
                            .filter(|&&(variant, dot)| {
                                variants[variant].symbols.get(dot) == Some(&sym)
                            })
                            .map(|&(variant, _)| self.rules[variants[variant].rule].priority)
                            .max()
                            .unwrap_or(0);
                        (next, priority)
                    })
                });

                let mut guarded: Vec<usize> = Vec::new();
                let mut plain: Vec<usize> = Vec::new();
                for &variant in reduce_candidates.get(&lookahead).into_iter().flatten() {
                    if self.rules[variants[variant].rule].decision.is_some() {
                        guarded.push(variant);
                    } else {
                        plain.push(variant);
                    }
                }
                guarded.sort_by_key(|&variant| {
                    (-self.rules[variants[variant].rule].priority, variant)
                });

                plain.sort_by_key(|&variant| {
                    (-self.rules[variants[variant].rule].priority, variant)
                });
                if plain.len() > 1 {
                    let first = plain[0];
                    let second = plain[1];
                    if self.rules[variants[first].rule].priority
                        == self.rules[variants[second].rule].priority
                    {
                        self.warnings.push(format!(
                            "reduce/reduce conflict on {:?} between rules {} and {}; keeping rule {}",
                            lookahead,
                            variants[first].rule,
                            variants[second].rule,
                            variants[first].rule
                        ));
                    }
                }
                let reduce = plain.first().copied();

                let fallback = match (shift, reduce) {
                    (None, None) => None,
                    (Some((next, _)), None) => Some(Action::Shift(next)),
                    (None, Some(variant)) => Some(Action::Reduce(variant)),
                    (Some((next, shift_priority)), Some(variant)) => {
                        let rule = &self.rules[variants[variant].rule];
                        if rule.priority > shift_priority {
                            Some(Action::Reduce(variant))
                        } else if rule.priority < shift_priority {
                            Some(Action::Shift(next))
                        } else {
                            match rule.assoc {
                                Assoc::Left => Some(Action::Reduce(variant)),
                                Assoc::Right => Some(Action::Shift(next)),
                            }
                        }
                    }
                };

                if !guarded.is_empty() || fallback.is_some() {
                    cells.insert(
                        lookahead,
                        ActionCell { guarded, fallback },
                    );
                }
            }
            actions.push(cells);
        }

        if let Some(out) = &mut self.debug {
            for warning in &self.warnings {
                let _ = writeln!(out, "grammar warning: {}", warning);
            }
            let _ = writeln!(out, "generated {} parse states", states.len());
        }

        self.terminals = terminals;
        self.variants = variants;
        self.table = Some(ParseTable { actions, gotos });
        self.state_stack.clear();
        self.state_stack.push(0);
        self.value_stack.clear();
        Ok(())
    }
}

/// Nullability and FIRST sets over the expanded variants.
fn first_sets<TSym: Copy + Eq + Hash + Ord + Debug>(
    variants: &[Variant<TSym>],
    nonterminals: &HashSet<TSym>,
) -> (HashSet<TSym>, HashMap<TSym, BTreeSet<TSym>>) {
    let mut nullable: HashSet<TSym> = HashSet::new();
    loop {
        let mut changed = false;
        for variant in variants {
            if nullable.contains(&variant.lhs) {
                continue;
            }
            if variant.symbols.iter().all(|sym| nullable.contains(sym)) {
                nullable.insert(variant.lhs);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut first: HashMap<TSym, BTreeSet<TSym>> = HashMap::new();
    loop {
        let mut changed = false;
        for variant in variants {
            let mut addition: BTreeSet<TSym> = BTreeSet::new();
            for sym in &variant.symbols {
                if nonterminals.contains(sym) {
                    if let Some(set) = first.get(sym) {
                        addition.extend(set.iter().copied());
                    }
                    if !nullable.contains(sym) {
                        break;
                    }
                } else {
                    addition.insert(*sym);
                    break;
                }
            }
            let entry = first.entry(variant.lhs).or_default();
            for sym in addition {
                if entry.insert(sym) {
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    (nullable, first)
}

/// FOLLOW sets; `None` is the end-of-input lookahead, seeded on the start
/// symbols.
fn follow_sets<TSym: Copy + Eq + Hash + Ord + Debug>(
    variants: &[Variant<TSym>],
    nonterminals: &HashSet<TSym>,
    nullable: &HashSet<TSym>,
    first: &HashMap<TSym, BTreeSet<TSym>>,
    start_symbols: &[TSym],
) -> HashMap<TSym, BTreeSet<Option<TSym>>> {
    let mut follow: HashMap<TSym, BTreeSet<Option<TSym>>> = HashMap::new();
    for &sym in start_symbols {
        follow.entry(sym).or_default().insert(None);
    }

    loop {
        let mut changed = false;
        for variant in variants {
            for (index, sym) in variant.symbols.iter().enumerate() {
                if !nonterminals.contains(sym) {
                    continue;
                }
                let mut addition: BTreeSet<Option<TSym>> = BTreeSet::new();
                let mut trailer_nullable = true;
                for trailer in &variant.symbols[index + 1..] {
                    if nonterminals.contains(trailer) {
                        if let Some(set) = first.get(trailer) {
                            addition.extend(set.iter().map(|&sym| Some(sym)));
                        }
                        if !nullable.contains(trailer) {
                            trailer_nullable = false;
                            break;
                        }
                    } else {
                        addition.insert(Some(*trailer));
                        trailer_nullable = false;
                        break;
                    }
                }
                if trailer_nullable {
                    if let Some(set) = follow.get(&variant.lhs) {
                        addition.extend(set.iter().copied());
                    }
                }
                let entry = follow.entry(*sym).or_default();
                for lookahead in addition {
                    if entry.insert(lookahead) {
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    follow
}
