//! Parsing of scanned formula tokens into [`Term`] trees.

use core::{fmt, str::FromStr};

use chumsky::prelude::*;

use crate::{
	diagnostic::Diagnostic,
	scan::{self, Token, TokenKind},
	span::Span,
	term::{Operator, Term, TermKind},
};

/// Generates a parser that handles full formulas: addition and subtraction, multiplication and division,
/// negation, grouping with parentheses, dice, stat names and integers. `source` is the text the tokens were
/// scanned from, used to record the source text of each parsed term.
///
/// Binding tightens in this order: add/subtract, multiply/divide, negation, then operands. Binary operators are
/// left-associative. Negation can be applied once per operand; `--1` must be written `-(-1)`.
pub fn formula_part<'src>(
	source: &'src str,
) -> impl Parser<'src, &'src [Token], Term, extra::Err<Rich<'src, Token>>> + Clone {
	recursive(move |formula| {
		// Parser for single-token operands
		let operand = select! {
			Token { kind: TokenKind::DiceRoll { count, sides }, span } => (TermKind::DieRoll { count, sides }, span),
			Token { kind: TokenKind::Name(name), span } => (TermKind::Stat(name), span),
			Token { kind: TokenKind::Integer(value), span } => (TermKind::Literal(value), span),
		}
		.map(move |(kind, span)| Term::new(kind, span, source));

		// Parser for formulas enclosed in parentheses (the resulting term only spans the inner formula)
		let group = formula.delimited_by(
			select! { Token { kind: TokenKind::LeftParen, .. } => () },
			select! { Token { kind: TokenKind::RightParen, .. } => () },
		);

		let atom = choice((group, operand)).labelled("operand");

		// Parser for negative sign
		let unary = select! { Token { kind: TokenKind::Hyphen, span } => span }
			.or_not()
			.then(atom)
			.map(move |(minus, operand)| match minus {
				Some(op_span) => Term::unary(Operator::Subtract, op_span, operand, source),
				None => operand,
			});

		// Parser for multiplication and division
		let product = unary.clone().foldl(
			select! {
				Token { kind: TokenKind::Asterisk, .. } => Operator::Multiply,
				Token { kind: TokenKind::Slash, .. } => Operator::Divide,
			}
			.then(unary)
			.repeated(),
			move |lhs, (op, rhs)| Term::binary(op, lhs, rhs, source),
		);

		// Parser for addition and subtraction
		product.clone().foldl(
			select! {
				Token { kind: TokenKind::Plus, .. } => Operator::Add,
				Token { kind: TokenKind::Hyphen, .. } => Operator::Subtract,
			}
			.then(product)
			.repeated(),
			move |lhs, (op, rhs)| Term::binary(op, lhs, rhs, source),
		)
	})
}

/// Generates a parser that handles full formulas (see [`formula_part()`]) and expects the end of the tokens
pub fn formula<'src>(
	source: &'src str,
) -> impl Parser<'src, &'src [Token], Term, extra::Err<Rich<'src, Token>>> + Clone {
	formula_part(source).then_ignore(end())
}

/// Parses scanned tokens into a term tree, or [`None`] if they don't form a complete formula.
/// Failure anywhere fails the whole parse; partially parsed trees are never returned.
///
/// # Examples
/// ```
/// use charsheet::{parse::parse, scan::scan};
///
/// let source = "(1 + 2) * 3";
/// let term = parse(source, &scan(source)).unwrap();
/// assert_eq!(term.to_string(), "(1 + 2) * 3");
///
/// assert!(parse("1 +", &scan("1 +")).is_none());
/// ```
#[must_use]
pub fn parse(source: &str, tokens: &[Token]) -> Option<Term> {
	match parse_with_diagnostics(source, tokens) {
		Ok(term) => Some(term),
		Err(diagnostics) => {
			for diag in &diagnostics {
				tracing::debug!(formula = source, %diag, "formula failed to parse");
			}
			None
		}
	}
}

/// Parses scanned tokens into a term tree, describing why parsing failed if it does.
///
/// # Errors
/// If the tokens don't form a complete formula, the parser's complaints are returned as error diagnostics, located
/// in the formula's source text.
pub fn parse_with_diagnostics(source: &str, tokens: &[Token]) -> Result<Term, Vec<Diagnostic>> {
	formula(source).parse(tokens).into_result().map_err(|errs| {
		errs.into_iter()
			.map(|err| Diagnostic::error(token_span(source, tokens, err.span().start), err.to_string()))
			.collect()
	})
}

/// Maps an index into the token sequence back onto the source text. Indices past the last token point at the end of
/// the source.
fn token_span(source: &str, tokens: &[Token], index: usize) -> Span {
	tokens
		.get(index)
		.map_or_else(|| Span::new(source.len(), 0), |token| token.span)
}

/// A formula's source text along with its parsed term tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
	source: String,
	term: Term,
	diagnostics: Vec<Diagnostic>,
}

impl Formula {
	/// Scans and parses formula source text.
	///
	/// # Errors
	/// If scanning had to drop invalid text (an integer too large to hold or dice without dice or sides), the scan
	/// diagnostics are returned without parsing. If the text doesn't form a complete formula, every diagnostic from
	/// scanning and parsing is returned.
	pub fn parse(source: impl Into<String>) -> Result<Self, ParseError> {
		let source = source.into();
		let (tokens, mut diagnostics) = scan::scan_with_diagnostics(&source);

		// Dropped tokens would silently change what the formula means
		if diagnostics.iter().any(Diagnostic::is_fatal) {
			return Err(ParseError {
				formula: source,
				diagnostics,
			});
		}

		match parse_with_diagnostics(&source, &tokens) {
			Ok(term) => Ok(Self {
				source,
				term,
				diagnostics,
			}),
			Err(parse_diagnostics) => {
				diagnostics.extend(parse_diagnostics);
				Err(ParseError {
					formula: source,
					diagnostics,
				})
			}
		}
	}

	/// Creates a formula that always evaluates to zero, used in place of malformed formulas.
	#[must_use]
	pub fn zero(source: impl Into<String>) -> Self {
		let source = source.into();
		Self {
			term: Term::zero(&source),
			source,
			diagnostics: Vec::new(),
		}
	}

	/// Source text the formula was parsed from.
	#[must_use]
	#[inline]
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Root of the parsed term tree.
	#[must_use]
	#[inline]
	pub const fn term(&self) -> &Term {
		&self.term
	}

	/// Non-fatal diagnostics produced while scanning (e.g. ignored characters).
	#[must_use]
	#[inline]
	pub fn diagnostics(&self) -> &[Diagnostic] {
		&self.diagnostics
	}
}

impl fmt::Display for Formula {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.source)
	}
}

impl FromStr for Formula {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

/// A formula that couldn't be parsed, along with everything that went wrong
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid formula \"{formula}\": {}", .diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
#[non_exhaustive]
pub struct ParseError {
	/// Source text of the formula
	pub formula: String,

	/// Everything reported while scanning and parsing the formula
	pub diagnostics: Vec<Diagnostic>,
}
