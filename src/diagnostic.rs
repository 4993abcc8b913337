//! Non-fatal messages produced while scanning and parsing formulas.

use core::fmt;

use crate::span::Span;

/// How serious a [`Diagnostic`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Severity {
	/// Something was ignored, but the formula may still produce a value
	Warning,

	/// User error that prevents the formula from producing a value
	Error,

	/// Programming defect (the scanner, parser and evaluator disagree about the grammar)
	Bug,
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Warning => "warning",
			Self::Error => "error",
			Self::Bug => "bug",
		})
	}
}

/// A message tied to a location in formula source text
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Diagnostic {
	/// Seriousness of the message
	pub severity: Severity,

	/// Location the message refers to
	pub span: Span,

	/// Human-readable message
	pub message: String,
}

impl Diagnostic {
	/// Creates a warning diagnostic.
	#[must_use]
	pub fn warning(span: Span, message: impl Into<String>) -> Self {
		Self {
			severity: Severity::Warning,
			span,
			message: message.into(),
		}
	}

	/// Creates an error diagnostic.
	#[must_use]
	pub fn error(span: Span, message: impl Into<String>) -> Self {
		Self {
			severity: Severity::Error,
			span,
			message: message.into(),
		}
	}

	/// Creates a bug diagnostic, for input the scanner, parser and evaluator disagree about.
	#[must_use]
	pub fn bug(span: Span, message: impl Into<String>) -> Self {
		Self {
			severity: Severity::Bug,
			span,
			message: message.into(),
		}
	}

	/// Checks whether this diagnostic prevents a value from being produced.
	#[must_use]
	#[inline]
	pub const fn is_fatal(&self) -> bool {
		matches!(self.severity, Severity::Error | Severity::Bug)
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} at {}: {}", self.severity, self.span, self.message)
	}
}

/// Renders diagnostics against the formula they were produced for using ariadne, returning the terminal output.
/// Spans are byte offsets into the formula.
#[cfg(feature = "build-binary")]
#[must_use]
pub fn render(source: &str, diagnostics: &[Diagnostic]) -> String {
	use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

	const NAME: &str = "formula";

	let mut output = Vec::new();
	for diag in diagnostics {
		let (kind, color) = match diag.severity {
			Severity::Warning => (ReportKind::Warning, Color::Yellow),
			Severity::Error => (ReportKind::Error, Color::Red),
			Severity::Bug => (ReportKind::Custom("bug", Color::Magenta), Color::Magenta),
		};

		// Zero-length spans (e.g. end of input) still need a visible label
		let range = if diag.span.length == 0 {
			diag.span.start..diag.span.start.saturating_add(1)
		} else {
			diag.span.range()
		};

		Report::build(kind, (NAME, range.clone()))
			.with_config(Config::default().with_index_type(IndexType::Byte))
			.with_message(&diag.message)
			.with_label(Label::new((NAME, range)).with_message(&diag.message).with_color(color))
			.finish()
			.write((NAME, Source::from(source)), &mut output)
			.ok();
	}

	String::from_utf8(output).unwrap_or_default()
}
