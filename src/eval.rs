//! Evaluation of [`Term`] trees into [`Evaled`] trees: dice are rolled, stat references are resolved and arithmetic is
//! carried out, all while keeping a structured record of how the final value came to be.

use core::fmt;

use crate::{
	diagnostic::Diagnostic,
	parse::Formula,
	roller::Roller,
	span::Span,
	term::{op_type_impl, Describe, DescribeOperation, HasOpType, OpType, Operator, Term, TermKind},
};

/// Read access to a character's statistics during evaluation
pub trait Statistics {
	/// Looks up a stat by id (ignoring case) and fully evaluates it, including any modifications to it.
	/// Returns [`None`] if there is no such stat.
	///
	/// # Errors
	/// Evaluating the stat may itself require evaluating a formula, which can fail.
	fn resolve_stat<R: Roller>(&self, id: &str, roller: &mut R) -> Result<Option<ResolvedStat>, EvalError>;
}

/// A stat reference that was found
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct ResolvedStat {
	/// Canonical id of the stat
	pub id: String,

	/// Final value of the stat
	pub value: f64,
}

/// Statistics with nothing in them. Every stat reference evaluates as unresolved.
#[derive(Debug, Default, Clone, Copy)]
#[allow(clippy::exhaustive_structs)]
pub struct NoStats;

impl Statistics for NoStats {
	#[inline]
	fn resolve_stat<R: Roller>(&self, _id: &str, _roller: &mut R) -> Result<Option<ResolvedStat>, EvalError> {
		Ok(None)
	}
}

impl Term {
	/// Evaluates the term against a set of statistics, rolling any dice it contains with the given roller.
	/// Every evaluation rolls dice anew and looks stats up anew, so the result can differ between calls.
	///
	/// Division is floating-point and unguarded: dividing by zero yields an infinity (or NaN for `0 / 0`), which then
	/// propagates through the rest of the formula.
	///
	/// # Errors
	/// If a referenced stat fails to evaluate, or the term contains a unary operator other than negation (which the
	/// parser never produces), an error variant is returned.
	pub fn eval<S: Statistics, R: Roller>(&self, stats: &S, roller: &mut R) -> Result<Evaled, EvalError> {
		let (kind, value) = match &self.kind {
			TermKind::Literal(value) => (EvaledKind::Literal(*value), f64::from(*value)),

			TermKind::DieRoll { count, sides } => {
				let rolls = roller.roll_dice(*count, *sides);
				let value: f64 = rolls.iter().copied().map(f64::from).sum();
				tracing::trace!(dice = %self.source, ?rolls, "rolled dice");
				(
					EvaledKind::DieRoll {
						count: *count,
						sides: *sides,
						rolls,
					},
					value,
				)
			}

			TermKind::Stat(id) => match stats.resolve_stat(id, roller)? {
				Some(resolved) => (
					EvaledKind::Stat {
						id: id.clone(),
						resolved: Some(resolved.id),
					},
					resolved.value,
				),
				None => (
					EvaledKind::Stat {
						id: id.clone(),
						resolved: None,
					},
					0.0,
				),
			},

			TermKind::Unary { op, operand } => {
				let operand = operand.eval(stats, roller)?;
				let value = match op {
					Operator::Subtract => -operand.value,
					Operator::Add | Operator::Multiply | Operator::Divide => {
						return Err(EvalError::UnsupportedUnary {
							op: *op,
							span: self.span,
						})
					}
				};
				(
					EvaledKind::Unary {
						op: *op,
						operand: Box::new(operand),
					},
					value,
				)
			}

			TermKind::Binary { op, lhs, rhs } => {
				let lhs = lhs.eval(stats, roller)?;
				let rhs = rhs.eval(stats, roller)?;
				let value = match op {
					Operator::Add => lhs.value + rhs.value,
					Operator::Subtract => lhs.value - rhs.value,
					Operator::Multiply => lhs.value * rhs.value,
					Operator::Divide => lhs.value / rhs.value,
				};
				(
					EvaledKind::Binary {
						op: *op,
						lhs: Box::new(lhs),
						rhs: Box::new(rhs),
					},
					value,
				)
			}
		};

		Ok(Evaled {
			kind,
			span: self.span,
			source: self.source.clone(),
			value,
		})
	}
}

impl Formula {
	/// Evaluates the formula. See [`Term::eval()`].
	///
	/// # Errors
	/// See [`Term::eval()`].
	#[inline]
	pub fn eval<S: Statistics, R: Roller>(&self, stats: &S, roller: &mut R) -> Result<Evaled, EvalError> {
		self.term().eval(stats, roller)
	}
}

/// Scans, parses, and evaluates formula source text in one go.
///
/// Parsing isn't free, so formulas that are evaluated repeatedly should be parsed once into a [`Formula`] instead.
///
/// # Examples
/// ```
/// use charsheet::{eval::{evaluate_formula, NoStats}, roller::Fixed as FixedRoller};
///
/// let evaled = evaluate_formula("2d6 + 1", &NoStats, &mut FixedRoller(3))?;
/// assert_eq!(evaled.value, 7.0);
/// assert_eq!(evaled.to_string(), "2d6[3, 3] + 1");
/// # Ok::<(), charsheet::eval::FormulaError>(())
/// ```
///
/// # Errors
/// If the text doesn't form a complete formula, [`FormulaError::Parse`] is returned with the reasons why. Failure
/// during evaluation is returned as [`FormulaError::Eval`].
pub fn evaluate_formula<S: Statistics, R: Roller>(
	source: &str,
	stats: &S,
	roller: &mut R,
) -> Result<Evaled, FormulaError> {
	let formula = Formula::parse(source).map_err(|err| FormulaError::Parse {
		diagnostics: err.diagnostics,
	})?;
	Ok(formula.eval(stats, roller)?)
}

/// Node of an evaluated formula: the source term's location, the concrete value it produced, and how
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct Evaled {
	/// How the value was produced
	pub kind: EvaledKind,

	/// Span of the source term
	pub span: Span,

	/// Source text of the source term
	pub source: String,

	/// Value the term evaluated to
	pub value: f64,
}

/// Individual kinds of evaluated terms, matching [`TermKind`] one-to-one
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EvaledKind {
	/// Standalone integer
	Literal(u32),

	/// Rolled dice
	DieRoll {
		/// Number of dice rolled
		count: u32,

		/// Number of sides on each die
		sides: u32,

		/// Individual results, in the order they were rolled
		rolls: Vec<u32>,
	},

	/// Stat reference
	Stat {
		/// Id as written in the formula
		id: String,

		/// Canonical id of the stat the reference resolved to, or [`None`] if no such stat exists
		resolved: Option<String>,
	},

	/// Operator applied to a single evaluated operand
	Unary {
		/// Operator that was applied
		op: Operator,

		/// Evaluated operand
		operand: Box<Evaled>,
	},

	/// Operator applied to two evaluated operands
	Binary {
		/// Operator that was applied
		op: Operator,

		/// Evaluated left-hand operand
		lhs: Box<Evaled>,

		/// Evaluated right-hand operand
		rhs: Box<Evaled>,
	},
}

op_type_impl!(Evaled, EvaledKind);

impl Evaled {
	/// Collects every stat reference in the tree that didn't resolve to a stat, by id as written.
	#[must_use]
	pub fn unresolved_stats(&self) -> Vec<&str> {
		match &self.kind {
			EvaledKind::Literal(..) | EvaledKind::DieRoll { .. } => Vec::new(),
			EvaledKind::Stat { id, resolved } => {
				if resolved.is_none() {
					vec![id.as_str()]
				} else {
					Vec::new()
				}
			}
			EvaledKind::Unary { operand, .. } => operand.unresolved_stats(),
			EvaledKind::Binary { lhs, rhs, .. } => {
				let mut unresolved = lhs.unresolved_stats();
				unresolved.extend(rhs.unresolved_stats());
				unresolved
			}
		}
	}
}

impl Describe for Evaled {
	/// Builds a description of the evaluated formula that lists each individual die roll and the value of each stat,
	/// e.g. `2d6[3, 4] + STR(2) - 1`. At most `list_limit` rolls are listed per set of dice.
	fn describe(&self, list_limit: Option<usize>) -> String {
		match &self.kind {
			EvaledKind::Literal(value) => value.to_string(),

			EvaledKind::DieRoll { count, sides, rolls } => {
				let list_limit = list_limit.unwrap_or(usize::MAX);
				let truncated_rolls = rolls.len().saturating_sub(list_limit);

				format!(
					"{count}d{sides}[{}{}]",
					rolls
						.iter()
						.take(list_limit)
						.map(ToString::to_string)
						.collect::<Vec<_>>()
						.join(", "),
					if truncated_rolls > 0 {
						format!(", {truncated_rolls} more...")
					} else {
						String::new()
					}
				)
			}

			EvaledKind::Stat { id, resolved } => match resolved {
				Some(resolved) => format!("{resolved}({})", self.value),
				None => format!("{id}(unknown)"),
			},

			EvaledKind::Unary { op, operand } => self.describe_unary_expr(*op, operand.as_ref(), list_limit),
			EvaledKind::Binary { op, lhs, rhs } => {
				self.describe_binary_expr(op.symbol(), lhs.as_ref(), rhs.as_ref(), list_limit)
			}
		}
	}
}

impl fmt::Display for Evaled {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output of this implementation is equivalent to [`Self::describe(None)`].
	///
	/// [`Self::describe(None)`]: Self::describe()
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

/// Error that can occur during [`Term::eval()`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
	/// A unary operator other than negation reached evaluation. The parser never produces these, so this indicates a
	/// term tree that was built or altered by hand.
	#[error("unsupported unary operator `{op}` at {span}")]
	UnsupportedUnary {
		/// Offending operator
		op: Operator,

		/// Location of the unary term
		span: Span,
	},

	/// A stat's formula references the stat itself, directly or through other stats.
	#[error("stat {stat_id} references itself")]
	CyclicReference {
		/// Id of the stat that was reached a second time
		stat_id: String,
	},
}

impl EvalError {
	/// Describes the error as a diagnostic located in the formula's source text, if it happened at a particular
	/// location. Unsupported operators are [`Severity::Bug`](crate::diagnostic::Severity::Bug)s.
	#[must_use]
	pub fn diagnostic(&self) -> Option<Diagnostic> {
		match self {
			Self::UnsupportedUnary { span, .. } => Some(Diagnostic::bug(*span, self.to_string())),
			Self::CyclicReference { .. } => None,
		}
	}
}

/// Error that can occur during [`evaluate_formula()`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormulaError {
	/// The formula couldn't be parsed.
	#[error("invalid formula: {}", .diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
	Parse {
		/// Everything reported while scanning and parsing
		diagnostics: Vec<Diagnostic>,
	},

	/// The formula was parsed, but evaluating it failed.
	#[error(transparent)]
	Eval(#[from] EvalError),
}
