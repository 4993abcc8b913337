//! Expression trees for parsed formulas.

use core::fmt;

use crate::span::Span;

/// Generates an implementation of [`HasOpType`] for a tree node type.
/// This is tightly coupled with the expected variants of its `kind`:
/// `Literal`, `DieRoll`, `Stat`, `Unary`, and `Binary`.
macro_rules! op_type_impl {
	($name:ty, $kind:ident) => {
		impl HasOpType for $name {
			fn op_type(&self) -> OpType {
				match &self.kind {
					$kind::Literal(..) | $kind::DieRoll { .. } | $kind::Stat { .. } => OpType::Value,
					$kind::Unary { .. } => OpType::Unary,
					$kind::Binary { op, .. } => op.binary_op_type(),
				}
			}
		}
	};
}

pub(crate) use op_type_impl;

/// Arithmetic operators that can appear in a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_enums)]
pub enum Operator {
	/// `+`
	Add,

	/// `-` (subtraction when binary, negation when unary)
	Subtract,

	/// `*`
	Multiply,

	/// `/` or `\`
	Divide,
}

impl Operator {
	/// Gets the symbol used to write this operator.
	#[must_use]
	pub const fn symbol(self) -> char {
		match self {
			Self::Add => '+',
			Self::Subtract => '-',
			Self::Multiply => '*',
			Self::Divide => '/',
		}
	}

	/// Operation type of a binary expression using this operator.
	pub(crate) const fn binary_op_type(self) -> OpType {
		match self {
			Self::Add | Self::Subtract => OpType::Additive,
			Self::Multiply | Self::Divide => OpType::Multiplicative,
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.symbol())
	}
}

/// Node of a parsed formula, along with the span of source text it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct Term {
	/// What kind of node this is
	pub kind: TermKind,

	/// Union of the spans of every token this node was built from
	pub span: Span,

	/// Exact source text covered by [`Self::span`]
	pub source: String,
}

/// Individual kinds of formula terms
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TermKind {
	/// Standalone non-negative integer
	Literal(u32),

	/// Dice to roll and sum
	DieRoll {
		/// Number of dice to roll
		count: u32,

		/// Number of sides on each die
		sides: u32,
	},

	/// Reference to a statistic on the character, by id (as written; lookups ignore case)
	Stat(String),

	/// Operator applied to a single operand
	Unary {
		/// Operator to apply (only [`Operator::Subtract`] is produced by the parser)
		op: Operator,

		/// Operand to apply the operator to
		operand: Box<Term>,
	},

	/// Operator applied to two operands
	Binary {
		/// Operator to apply
		op: Operator,

		/// Left-hand operand
		lhs: Box<Term>,

		/// Right-hand operand
		rhs: Box<Term>,
	},
}

op_type_impl!(Term, TermKind);

impl Term {
	/// Creates a term covering `span` of `formula`.
	#[must_use]
	pub fn new(kind: TermKind, span: Span, formula: &str) -> Self {
		Self {
			kind,
			span,
			source: span.source(formula).to_owned(),
		}
	}

	/// Creates a unary term. Its span starts at the operator and extends over the operand.
	#[must_use]
	pub fn unary(op: Operator, op_span: Span, operand: Self, formula: &str) -> Self {
		let span = op_span.combine(&operand.span);
		Self::new(
			TermKind::Unary {
				op,
				operand: Box::new(operand),
			},
			span,
			formula,
		)
	}

	/// Creates a binary term spanning both of its operands.
	#[must_use]
	pub fn binary(op: Operator, lhs: Self, rhs: Self, formula: &str) -> Self {
		let span = lhs.span.combine(&rhs.span);
		Self::new(
			TermKind::Binary {
				op,
				lhs: Box::new(lhs),
				rhs: Box::new(rhs),
			},
			span,
			formula,
		)
	}

	/// Creates the literal zero that malformed formulas fall back to. It spans the whole formula.
	#[must_use]
	pub fn zero(formula: &str) -> Self {
		Self {
			kind: TermKind::Literal(0),
			span: Span::new(0, formula.len()),
			source: formula.to_owned(),
		}
	}

	/// Checks whether the term is deterministic (contains no dice anywhere within it).
	/// Stat references count as deterministic, even though the stat's own value may not be.
	#[must_use]
	pub fn is_deterministic(&self) -> bool {
		match &self.kind {
			TermKind::Literal(..) | TermKind::Stat(..) => true,
			TermKind::DieRoll { sides, .. } => *sides == 1,
			TermKind::Unary { operand, .. } => operand.is_deterministic(),
			TermKind::Binary { lhs, rhs, .. } => lhs.is_deterministic() && rhs.is_deterministic(),
		}
	}

	/// Collects the ids of every stat referenced within the term, in source order.
	#[must_use]
	pub fn stat_refs(&self) -> Vec<&str> {
		let mut refs = Vec::new();
		self.collect_stat_refs(&mut refs);
		refs
	}

	fn collect_stat_refs<'t>(&'t self, refs: &mut Vec<&'t str>) {
		match &self.kind {
			TermKind::Literal(..) | TermKind::DieRoll { .. } => {}
			TermKind::Stat(id) => refs.push(id),
			TermKind::Unary { operand, .. } => operand.collect_stat_refs(refs),
			TermKind::Binary { lhs, rhs, .. } => {
				lhs.collect_stat_refs(refs);
				rhs.collect_stat_refs(refs);
			}
		}
	}
}

impl Describe for Term {
	/// Builds a full usable formula string from the term. Operations are grouped with parentheses whenever the order of
	/// operations could be considered ambiguous, such as when mixing addition and multiplication together. Re-parsing
	/// the output yields an equivalent tree.
	///
	/// `list_limit` does not affect the output of this implementation in any way since there are no possible lists of
	/// elements included, so it is always safe to pass `None`.
	fn describe(&self, _list_limit: Option<usize>) -> String {
		match &self.kind {
			TermKind::Literal(value) => value.to_string(),
			TermKind::DieRoll { count, sides } => format!("{count}d{sides}"),
			TermKind::Stat(id) => id.clone(),
			TermKind::Unary { op, operand } => self.describe_unary_expr(*op, operand.as_ref(), None),
			TermKind::Binary { op, lhs, rhs } => {
				self.describe_binary_expr(op.symbol(), lhs.as_ref(), rhs.as_ref(), None)
			}
		}
	}
}

impl fmt::Display for Term {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output of this implementation is equivalent to [`Self::describe(None)`].
	///
	/// [`Self::describe(None)`]: Self::describe()
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

/// Operation type for an individual term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum OpType {
	/// Single value, no operation
	Value,

	/// Unary operation
	Unary,

	/// Additive operation (sum or difference)
	Additive,

	/// Multiplicative operation (product or quotient)
	Multiplicative,
}

/// Trait that offers [`OpType`]-related information
pub trait HasOpType {
	/// Gets the type of this term.
	fn op_type(&self) -> OpType;

	/// Checks whether this term is a single value.
	fn is_value(&self) -> bool {
		self.op_type() == OpType::Value
	}

	/// Checks whether this term is a binary (additive or multiplicative) operation.
	fn is_binary(&self) -> bool {
		matches!(self.op_type(), OpType::Additive | OpType::Multiplicative)
	}
}

/// Trait to allow creation of expanded descriptions with an optional max number of individual listed results where
/// applicable
pub trait Describe {
	/// Builds a detailed formula string with additional information about non-deterministic elements.
	/// Any elements of the formula that can have a different result between multiple evaluations or multiple results
	/// should list all of the specific individual results that occurred (ideally, up to `list_limit` of them).
	#[must_use]
	fn describe(&self, list_limit: Option<usize>) -> String;
}

/// Trait for describing unary and binary terms with influence from own type.
/// Used for wrapping parentheses around operands based on the [`OpType`] of self and the operand.
pub(crate) trait DescribeOperation: HasOpType + Describe {
	/// Builds a detailed description for a unary term, wrapping any operation operand in parentheses.
	fn describe_unary_expr(&self, op: Operator, operand: &impl DescribeOperation, list_limit: Option<usize>) -> String {
		if operand.is_value() {
			format!("{op}{}", operand.describe(list_limit))
		} else {
			format!("{op}{}", paren_wrap(operand.describe(list_limit)))
		}
	}

	/// Builds a detailed description for a binary term with parentheses added to disambiguate mixed
	/// additive/multiplicative operations. Right-hand operands of the same precedence are also wrapped, since
	/// operators are left-associative.
	fn describe_binary_expr(
		&self,
		op: char,
		lhs: &impl DescribeOperation,
		rhs: &impl DescribeOperation,
		list_limit: Option<usize>,
	) -> String {
		let lhs_desc = match (self.op_type(), lhs.op_type()) {
			(OpType::Multiplicative, OpType::Additive) => paren_wrap(lhs.describe(list_limit)),
			_ => lhs.describe(list_limit),
		};
		let rhs_desc = match (self.op_type(), rhs.op_type()) {
			(OpType::Multiplicative, OpType::Additive | OpType::Multiplicative)
			| (OpType::Additive, OpType::Additive) => paren_wrap(rhs.describe(list_limit)),
			_ => rhs.describe(list_limit),
		};
		format!("{lhs_desc} {op} {rhs_desc}")
	}
}

impl<T: HasOpType + Describe> DescribeOperation for T {}

/// Wraps a string in parentheses.
#[must_use]
fn paren_wrap(mut text: String) -> String {
	text.insert(0, '(');
	text.push(')');
	text
}
