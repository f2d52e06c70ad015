use crate::regex::{self, RegexDfa};
use crate::{IMatcher, Symbol};

const PATTERNS: &[&str] = &[
    "a",
    "aa*",
    "(a|bd)",
    "[a-c]*d",
    "(ab|a)b*",
    "a?b+",
    "[^ab]c",
    "a{2,4}",
    "(!ab)",
    "(|a)(|b)(|c)",
];

fn build_dfa(pattern: &str) -> RegexDfa<u8> {
    regex::node_nfa::<u8>(pattern)
        .unwrap()
        .to_regex_nfa()
        .compile()
}

/// Walk a DFA over an input without a matcher.
fn accepts(dfa: &RegexDfa<u8>, input: &[u8]) -> bool {
    let mut state = dfa.start();
    for &byte in input {
        if dfa.dead_states().contains(&state) {
            return false;
        }
        state = dfa.state_transition(state, byte);
    }
    dfa.finals().contains(&state)
}

fn all_strings(alphabet: &[u8], max_len: usize) -> Vec<Vec<u8>> {
    let mut result: Vec<Vec<u8>> = vec![Vec::new()];
    let mut frontier: Vec<Vec<u8>> = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for &byte in alphabet {
                let mut extended = prefix.clone();
                extended.push(byte);
                next.push(extended);
            }
        }
        result.extend(next.iter().cloned());
        frontier = next;
    }
    result
}

fn assert_partitions_alphabet(dfa: &RegexDfa<u8>) {
    for state in 0..dfa.state_count() {
        let row = dfa.transitions(state);
        assert!(!row.is_empty(), "state {} has no transitions", state);
        assert_eq!(row[0].low, u8::MIN, "state {} does not start at MIN", state);
        assert_eq!(
            row[row.len() - 1].high,
            u8::MAX,
            "state {} does not end at MAX",
            state
        );
        for pair in row.windows(2) {
            assert_eq!(
                pair[0].high.succ(),
                pair[1].low,
                "state {} has a gap or overlap",
                state
            );
        }
    }
}

#[test]
fn dfa_ranges_partition_the_alphabet() {
    for pattern in PATTERNS {
        let dfa = build_dfa(pattern);
        assert_partitions_alphabet(&dfa);

        let mut optimized = dfa.clone();
        optimized.optimize();
        assert_partitions_alphabet(&optimized);
    }
}

#[test]
fn nfa_and_dfa_agree_on_every_input() {
    let alphabet = b"abcd";
    let inputs = all_strings(alphabet, 4);
    for pattern in PATTERNS {
        let mut nfa = regex::nfa_matcher::<u8>(pattern).unwrap();
        let mut dfa = regex::compile::<u8>(pattern).unwrap();
        for input in &inputs {
            assert_eq!(
                nfa.test(input),
                dfa.test(input),
                "pattern {:?} disagrees on {:?}",
                pattern,
                String::from_utf8_lossy(input)
            );
        }
    }
}

#[test]
fn optimization_is_idempotent() {
    for pattern in PATTERNS {
        let mut once = build_dfa(pattern);
        once.optimize();
        let mut twice = once.clone();
        twice.optimize();
        assert_eq!(once, twice, "pattern {:?} is not stable under optimize", pattern);
    }
}

#[test]
fn optimization_preserves_the_language() {
    let inputs = all_strings(b"abd", 4);
    for pattern in PATTERNS {
        let plain = build_dfa(pattern);
        let mut optimized = plain.clone();
        optimized.optimize();
        for input in &inputs {
            assert_eq!(
                accepts(&plain, input),
                accepts(&optimized, input),
                "pattern {:?} changed on {:?}",
                pattern,
                String::from_utf8_lossy(input)
            );
        }
    }
}

#[test]
fn complement_is_an_involution() {
    let inputs = all_strings(b"abd", 4);
    for pattern in PATTERNS {
        let dfa = build_dfa(pattern);
        let complemented = dfa.complement();
        let restored = complemented.complement();
        for input in &inputs {
            assert_eq!(
                accepts(&dfa, input),
                accepts(&restored, input),
                "double complement of {:?} changed on {:?}",
                pattern,
                String::from_utf8_lossy(input)
            );
            assert_eq!(
                accepts(&dfa, input),
                !accepts(&complemented, input),
                "complement of {:?} is not the complement on {:?}",
                pattern,
                String::from_utf8_lossy(input)
            );
        }
    }
}
