use crate::{
	diagnostic::Severity,
	eval::NoStats,
	parse::{parse, parse_with_diagnostics, Formula},
	roller::Fixed as FixedRoller,
	scan::scan,
	span::Span,
	term::{Operator, Term, TermKind},
};

fn parse_source(source: &str) -> Option<Term> {
	parse(source, &scan(source))
}

fn value_of(source: &str) -> f64 {
	Formula::parse(source)
		.unwrap()
		.eval(&NoStats, &mut FixedRoller(1))
		.unwrap()
		.value
}

#[test]
fn multiplication_binds_tighter() {
	assert_eq!(value_of("1 + 2 * 3"), 7.0);
}

#[test]
fn parentheses_group() {
	assert_eq!(value_of("(1 + 2) * 3"), 9.0);
}

#[test]
fn binary_operators_are_left_associative() {
	assert_eq!(value_of("10 - 4 - 3"), 3.0);
	assert_eq!(value_of("24 / 4 / 3"), 2.0);
}

#[test]
fn backslash_divides() {
	assert_eq!(value_of("8 \\ 2"), 4.0);
}

#[test]
fn negation() {
	assert_eq!(value_of("-3 + 5"), 2.0);
	assert_eq!(value_of("-(-1)"), 1.0);
	assert_eq!(value_of("2 * -3"), -6.0);
}

#[test]
fn left_deep_tree() {
	let term = parse_source("1 - 2 - 3").unwrap();
	let TermKind::Binary { op, lhs, rhs } = term.kind else {
		panic!("expected binary term");
	};
	assert_eq!(op, Operator::Subtract);
	assert!(matches!(lhs.kind, TermKind::Binary { op: Operator::Subtract, .. }));
	assert_eq!(rhs.kind, TermKind::Literal(3));
}

#[test]
fn terms_keep_spans_and_source() {
	let term = parse_source("2d6 + STR").unwrap();
	assert_eq!(term.span, Span::new(0, 9));
	assert_eq!(term.source, "2d6 + STR");

	let TermKind::Binary { lhs, rhs, .. } = term.kind else {
		panic!("expected binary term");
	};
	assert_eq!(lhs.kind, TermKind::DieRoll { count: 2, sides: 6 });
	assert_eq!(lhs.source, "2d6");
	assert_eq!(rhs.kind, TermKind::Stat("STR".to_owned()));
	assert_eq!(rhs.span, Span::new(6, 3));
}

#[test]
fn unary_span_includes_operator() {
	let term = parse_source("-STR").unwrap();
	assert!(matches!(term.kind, TermKind::Unary { op: Operator::Subtract, .. }));
	assert_eq!(term.span, Span::new(0, 4));
	assert_eq!(term.source, "-STR");
}

#[test]
fn parenthesized_span_excludes_parentheses() {
	let term = parse_source("(1 + 2) * 3").unwrap();
	let TermKind::Binary { lhs, .. } = term.kind else {
		panic!("expected binary term");
	};
	assert_eq!(lhs.span, Span::new(1, 5));
	assert_eq!(lhs.source, "1 + 2");
}

#[test]
fn double_negation_fails() {
	assert!(parse_source("--1").is_none());
}

#[test]
fn incomplete_formulas_fail() {
	for source in ["", "   ", "1 +", "+", "* 2", "(1 + 2", "1 + 2)", "1 2", "()", "STR STR"] {
		assert!(parse_source(source).is_none(), "{source:?} parsed");
	}
}

#[test]
fn failures_produce_error_diagnostics() {
	let source = "1 + * 2";
	let diagnostics = parse_with_diagnostics(source, &scan(source)).unwrap_err();
	assert!(!diagnostics.is_empty());
	assert!(diagnostics.iter().all(|diag| diag.severity == Severity::Error));
	assert!(diagnostics.iter().all(|diag| diag.span.end() <= source.len()));
}

#[test]
fn formula_parse_error_includes_scan_warnings() {
	let err = Formula::parse("1 + $").unwrap_err();
	assert_eq!(err.formula, "1 + $");
	assert!(err.diagnostics.iter().any(|diag| diag.severity == Severity::Warning));
	assert!(err.diagnostics.iter().any(|diag| diag.severity == Severity::Error));
}

#[test]
fn formula_keeps_scan_warnings() {
	let formula = Formula::parse("1 + 2 $").unwrap();
	assert_eq!(formula.diagnostics().len(), 1);
	assert_eq!(formula.source(), "1 + 2 $");
	assert_eq!(formula.to_string(), "1 + 2 $");
}

#[test]
fn formula_from_str() {
	let formula: Formula = "2d6 + 1".parse().unwrap();
	assert!(!formula.term().is_deterministic());
	assert!("2d6 +".parse::<Formula>().is_err());
}

#[test]
fn zero_formula() {
	let formula = Formula::zero("1 +");
	assert_eq!(formula.term().kind, TermKind::Literal(0));
	assert_eq!(formula.term().source, "1 +");
	assert_eq!(formula.eval(&NoStats, &mut FixedRoller(1)).unwrap().value, 0.0);
}

#[test]
fn display_adds_only_needed_parentheses() {
	for (source, expected) in [
		("1 + 2 * 3", "1 + 2 * 3"),
		("(1 * 2) + 3", "1 * 2 + 3"),
		("(1 + 2) * 3", "(1 + 2) * 3"),
		("2 * (3 + 4)", "2 * (3 + 4)"),
		("1 - (2 - 3)", "1 - (2 - 3)"),
		("(1 - 2) - 3", "1 - 2 - 3"),
		("8 / (4 / 2)", "8 / (4 / 2)"),
		("-(1 + STR)", "-(1 + STR)"),
		("-2d6 \\ 3", "-2d6 / 3"),
	] {
		assert_eq!(parse_source(source).unwrap().to_string(), expected);
	}
}

#[test]
fn display_reparses_to_same_value() {
	for source in ["1 - (2 - 3)", "2 * (3 + 4) / 7", "-(4 - 6) * 3"] {
		let displayed = parse_source(source).unwrap().to_string();
		assert_eq!(value_of(&displayed), value_of(source), "{source} displayed as {displayed}");
	}
}

#[test]
fn deterministic_terms() {
	assert!(parse_source("1 + STR").unwrap().is_deterministic());
	assert!(parse_source("3d1 * 2").unwrap().is_deterministic());
	assert!(!parse_source("1d6 + 1").unwrap().is_deterministic());
	assert!(!parse_source("-(2 * 1d4)").unwrap().is_deterministic());
}

#[test]
fn stat_refs_in_source_order() {
	let term = parse_source("STR + dex * (STR - 1d4)").unwrap();
	assert_eq!(term.stat_refs(), vec!["STR", "dex", "STR"]);
}

#[test]
fn text_dropped_while_scanning_fails_the_formula() {
	for source in ["1 + 2 5000000000", "4 0d6", "0d6 + 5", "3d0"] {
		let err = Formula::parse(source).unwrap_err();
		assert_eq!(err.formula, source);
		assert!(
			err.diagnostics.iter().any(|diag| diag.severity == Severity::Error),
			"{source} should fail"
		);
	}
}

#[test]
fn ignored_characters_still_parse() {
	let formula = Formula::parse("1 + $2").unwrap();
	assert_eq!(formula.diagnostics().len(), 1);
	assert_eq!(formula.diagnostics()[0].severity, Severity::Warning);
	assert_eq!(value_of("1 + $2"), 3.0);
}
