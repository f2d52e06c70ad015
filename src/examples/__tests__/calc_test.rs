use crate::examples::calc::{parse_source, BinaryOp, CalcAst};
use std::collections::HashMap;

fn evaluate(text: &str) -> f64 {
    let (ast, undefined) = parse_source(text).unwrap();
    assert!(undefined.is_empty(), "undefined names: {:?}", undefined);
    ast.evaluate(&mut HashMap::new())
}

#[test]
fn precedence_and_grouping() {
    assert_eq!(evaluate("1 + 2 * 3;"), 7.0);
    assert_eq!(evaluate("(1 + 2) * 3;"), 9.0);
    assert_eq!(evaluate("2 * 3 - 4 / 2;"), 4.0);
    assert_eq!(evaluate("10 - 3 - 2;"), 5.0);
}

#[test]
fn assignments_thread_through_the_program() {
    let program = "radius = 4;\narea = 3.14159 * radius * radius;\narea / 2;";
    let result = evaluate(program);
    assert!((result - 3.14159 * 16.0 / 2.0).abs() < 1e-9);
}

#[test]
fn the_tree_shape_reflects_precedence() {
    let (ast, _) = parse_source("1 + 2 * 3;").unwrap();
    match ast {
        CalcAst::Program(statements) => match &statements[0] {
            CalcAst::Binary { op, rhs, .. } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(
                    **rhs,
                    CalcAst::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected a binary root, got {:?}", other),
        },
        other => panic!("expected a program, got {:?}", other),
    }
}

#[test]
fn undefined_variables_are_collected_during_the_parse() {
    let (_, undefined) = parse_source("a = b + 1; c;").unwrap();
    let names: Vec<&str> = undefined.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);
    // Spans point into the source.
    assert_eq!(undefined[0].1.begin, 4);
    assert_eq!(undefined[1].1.line, 1);
}

#[test]
fn malformed_programs_report_errors() {
    assert!(parse_source("1 + ;").is_err());
    assert!(parse_source("a = ;").is_err());
    assert!(parse_source("1 + 2").is_err()); // missing semicolon
    assert!(parse_source("π;").is_err()); // no rule covers 'π'
}

#[test]
fn unassigned_variables_evaluate_to_zero() {
    let (ast, undefined) = parse_source("x + 5;").unwrap();
    assert_eq!(undefined.len(), 1);
    assert_eq!(ast.evaluate(&mut HashMap::new()), 5.0);
}
