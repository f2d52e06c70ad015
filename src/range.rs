//! Range algebra over a [Symbol] alphabet: merging sorted range covers and
//! splitting a set of ranges into the coarsest consistent partition. Transition
//! tables throughout the automata code keep their ranges disjoint and sorted, and
//! these two operations are what maintain that invariant.

use crate::Symbol;

/// Collapse a `lo`-sorted list of ranges into an equivalent disjoint cover.
///
/// Two ranges `[a, b]` and `[c, d]` with `c <= b + 1` merge into
/// `[a, max(b, d)]`.
pub fn merge_sorted_ranges<S: Symbol>(ranges: &[(S, S)]) -> Vec<(S, S)> {
    let mut result: Vec<(S, S)> = Vec::new();
    for &(lo, hi) in ranges {
        match result.last_mut() {
            Some(last) if last.1 == S::MAX || last.1.succ() >= lo => {
                if hi > last.1 {
                    last.1 = hi;
                }
            }
            _ => result.push((lo, hi)),
        }
    }
    result
}

/// Produce the coarsest partition such that every input range is an exact union
/// of output units.
///
/// The units are the merged cover cut at every input boundary: each range
/// contributes a cut before its `lo` and after its `hi`.
pub fn split_ranges_to_units<S: Symbol>(mut ranges: Vec<(S, S)>) -> Vec<(S, S)> {
    if ranges.is_empty() {
        return Vec::new();
    }
    ranges.sort();
    let merged = merge_sorted_ranges(&ranges);

    let mut cuts: Vec<S> = Vec::with_capacity(ranges.len() * 2);
    for &(lo, hi) in &ranges {
        cuts.push(lo);
        if hi < S::MAX {
            cuts.push(hi.succ());
        }
    }
    cuts.sort();
    cuts.dedup();

    let mut units = Vec::new();
    for &(lo, hi) in &merged {
        let begin = cuts.partition_point(|&c| c <= lo);
        let mut unit_lo = lo;
        for &cut in &cuts[begin..] {
            if cut > hi {
                break;
            }
            units.push((unit_lo, cut.pred()));
            unit_lo = cut;
        }
        units.push((unit_lo, hi));
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_collapses_adjacent_and_overlapping() {
        let merged = merge_sorted_ranges::<u8>(&[(1, 3), (4, 6), (8, 9)]);
        assert_eq!(merged, vec![(1, 6), (8, 9)]);

        let merged = merge_sorted_ranges::<u8>(&[(1, 10), (2, 5), (9, 20)]);
        assert_eq!(merged, vec![(1, 20)]);

        let merged = merge_sorted_ranges::<u8>(&[(0, 255), (3, 7)]);
        assert_eq!(merged, vec![(0, 255)]);
    }

    #[test]
    fn split_cuts_at_every_boundary() {
        let units = split_ranges_to_units::<u8>(vec![(1, 10), (5, 15)]);
        assert_eq!(units, vec![(1, 4), (5, 10), (11, 15)]);

        let units = split_ranges_to_units::<u8>(vec![(1, 10), (5, 7)]);
        assert_eq!(units, vec![(1, 4), (5, 7), (8, 10)]);

        let units = split_ranges_to_units::<u8>(vec![(3, 3), (1, 5)]);
        assert_eq!(units, vec![(1, 2), (3, 3), (4, 5)]);
    }

    #[test]
    fn split_keeps_disjoint_input_untouched() {
        let units = split_ranges_to_units::<u8>(vec![(10, 20), (1, 5)]);
        assert_eq!(units, vec![(1, 5), (10, 20)]);
    }

    #[test]
    fn split_handles_alphabet_bounds() {
        let units = split_ranges_to_units::<u8>(vec![(0, 255), (65, 90)]);
        assert_eq!(units, vec![(0, 64), (65, 90), (91, 255)]);
    }

    #[test]
    fn every_input_range_is_a_union_of_units() {
        let input: Vec<(u8, u8)> = vec![(2, 9), (4, 12), (12, 40), (30, 31), (0, 1)];
        let units = split_ranges_to_units(input.clone());
        for (lo, hi) in input {
            let mut next = lo;
            for &(ulo, uhi) in &units {
                if ulo == next && uhi <= hi {
                    next = if uhi == u8::MAX { break } else { uhi + 1 };
                }
            }
            assert!(next > hi, "range ({}, {}) not covered exactly", lo, hi);
        }
    }
}
