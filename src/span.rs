//! Source locations within formula text.

use core::{fmt, ops::Range};

use serde::{Deserialize, Serialize};

/// A range of formula source text, as a start offset and a length (both in bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::exhaustive_structs)]
pub struct Span {
	/// Offset of the first byte covered by the span
	pub start: usize,

	/// Number of bytes covered by the span
	pub length: usize,
}

impl Span {
	/// Creates a new span from a start offset and a length.
	#[must_use]
	#[inline]
	pub const fn new(start: usize, length: usize) -> Self {
		Self { start, length }
	}

	/// Offset one past the last byte covered by the span.
	#[must_use]
	#[inline]
	pub const fn end(&self) -> usize {
		self.start.saturating_add(self.length)
	}

	/// Creates the smallest span that covers both this span and `other`.
	#[must_use]
	pub fn combine(&self, other: &Self) -> Self {
		let start = self.start.min(other.start);
		let end = self.end().max(other.end());
		Self::new(start, end - start)
	}

	/// Gets the portion of `source` that this span covers. Spans that fall outside of `source` (or split a
	/// character) yield an empty string rather than panicking.
	#[must_use]
	pub fn source<'s>(&self, source: &'s str) -> &'s str {
		source.get(self.range()).unwrap_or_default()
	}

	/// Converts the span into an equivalent byte range.
	#[must_use]
	#[inline]
	pub const fn range(&self) -> Range<usize> {
		self.start..self.end()
	}
}

impl From<Range<usize>> for Span {
	#[inline]
	fn from(range: Range<usize>) -> Self {
		Self::new(range.start, range.end.saturating_sub(range.start))
	}
}

impl fmt::Display for Span {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}..{}", self.start, self.end())
	}
}
