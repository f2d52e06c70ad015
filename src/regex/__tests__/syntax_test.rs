use crate::regex::{self, ExprNode};

fn char_range(c: char) -> ExprNode<u8> {
    ExprNode::CharRange {
        low: c as u8,
        high: c as u8,
    }
}

#[test]
fn literals_concatenate() {
    let expr = regex::parse::<u8>("ab").unwrap();
    assert_eq!(expr, ExprNode::Concat(vec![char_range('a'), char_range('b')]));
}

#[test]
fn union_with_empty_arm() {
    let expr = regex::parse::<u8>("a|").unwrap();
    assert_eq!(
        expr,
        ExprNode::Union(vec![char_range('a'), ExprNode::Empty])
    );
}

#[test]
fn star_binds_to_the_last_node() {
    let expr = regex::parse::<u8>("ab*").unwrap();
    assert_eq!(
        expr,
        ExprNode::Concat(vec![
            char_range('a'),
            ExprNode::Star(Box::new(char_range('b'))),
        ])
    );
}

#[test]
fn question_mark_desugars_to_empty_union() {
    assert_eq!(
        regex::parse::<u8>("a?").unwrap(),
        regex::parse::<u8>("(|a)").unwrap()
    );
}

#[test]
fn plus_desugars_to_doubled_star() {
    assert_eq!(
        regex::parse::<u8>("a+").unwrap(),
        regex::parse::<u8>("aa*").unwrap()
    );
}

#[test]
fn group_quantifiers_copy_the_whole_group() {
    assert_eq!(
        regex::parse::<u8>("(ab)+").unwrap(),
        regex::parse::<u8>("(ab)(ab)*").unwrap()
    );
    assert_eq!(
        regex::parse::<u8>("[0-9]+").unwrap(),
        regex::parse::<u8>("[0-9][0-9]*").unwrap()
    );
}

#[test]
fn brace_repetitions_expand() {
    assert_eq!(
        regex::parse::<u8>("a{3}").unwrap(),
        regex::parse::<u8>("aaa").unwrap()
    );
    assert_eq!(
        regex::parse::<u8>("a{2,}").unwrap(),
        regex::parse::<u8>("aaa*").unwrap()
    );
    assert_eq!(
        regex::parse::<u8>("a{2,4}").unwrap(),
        regex::parse::<u8>("aa(|a(|a))").unwrap()
    );
}

#[test]
fn escaped_quantifiers_are_literals() {
    let expr = regex::parse::<u8>("\\+\\?").unwrap();
    assert_eq!(expr, ExprNode::Concat(vec![char_range('+'), char_range('?')]));
}

#[test]
fn bracket_class_merges_ranges() {
    let expr = regex::parse::<u8>("[a-dc-f]").unwrap();
    assert_eq!(
        expr,
        ExprNode::Group {
            child: Box::new(ExprNode::CharRange {
                low: b'a',
                high: b'f'
            }),
            complemented: false,
        }
    );
}

#[test]
fn reversed_bracket_subtracts_from_the_alphabet() {
    let expr = regex::parse::<u8>("[^b]").unwrap();
    assert_eq!(
        expr,
        ExprNode::Group {
            child: Box::new(ExprNode::Union(vec![
                ExprNode::CharRange { low: 0, high: b'a' },
                ExprNode::CharRange {
                    low: b'c',
                    high: 255
                },
            ])),
            complemented: false,
        }
    );
}

#[test]
fn complement_group_marks_the_frame() {
    let expr = regex::parse::<u8>("(!ab)").unwrap();
    assert_eq!(
        expr,
        ExprNode::Group {
            child: Box::new(ExprNode::Concat(vec![char_range('a'), char_range('b')])),
            complemented: true,
        }
    );
}

#[test]
fn exclamation_elsewhere_is_a_literal() {
    let expr = regex::parse::<u8>("(a!)").unwrap();
    assert_eq!(
        expr,
        ExprNode::Group {
            child: Box::new(ExprNode::Concat(vec![char_range('a'), char_range('!')])),
            complemented: false,
        }
    );
}

#[test]
fn malformed_patterns_are_rejected_whole() {
    for pattern in [
        "(", ")", "a)", "(a", "[", "[]", "[z-a]", "]", "a{3,1}", "a{1,2,3}", "a{x}", "{3}", "*",
        "+", "?", "a\\", "\\q", "a**b)",
    ] {
        assert!(
            regex::parse::<u8>(pattern).is_err(),
            "pattern {:?} should be rejected",
            pattern
        );
    }
}

#[test]
fn alphabet_bounds_are_enforced() {
    // '√' is not representable over a byte alphabet, but is over code points.
    assert!(regex::parse::<u8>("√").is_err());
    assert!(regex::parse::<u32>("√").is_ok());
}
