//! Lexical scanning of formula text into [`Token`]s.

use core::fmt;

use logos::Logos;

use crate::{diagnostic::Diagnostic, span::Span};

/// Kinds of formula tokens, along with any values they carry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenKind {
	/// Run of ASCII letters, exactly as written
	Name(String),

	/// Run of ASCII digits
	Integer(u32),

	/// Dice literal such as `2d6` (no whitespace allowed inside)
	DiceRoll {
		/// Number of dice to roll
		count: u32,

		/// Number of sides on each die
		sides: u32,
	},

	/// `(`
	LeftParen,

	/// `)`
	RightParen,

	/// `+`
	Plus,

	/// `-`
	Hyphen,

	/// `*`
	Asterisk,

	/// `/` or `\`
	Slash,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Name(name) => write!(f, "{name}"),
			Self::Integer(value) => write!(f, "{value}"),
			Self::DiceRoll { count, sides } => write!(f, "{count}d{sides}"),
			Self::LeftParen => f.write_str("("),
			Self::RightParen => f.write_str(")"),
			Self::Plus => f.write_str("+"),
			Self::Hyphen => f.write_str("-"),
			Self::Asterisk => f.write_str("*"),
			Self::Slash => f.write_str("/"),
		}
	}
}

/// Single scanned token and the location it was scanned from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct Token {
	/// What was scanned
	pub kind: TokenKind,

	/// Where it was scanned from
	pub span: Span,
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.kind.fmt(f)
	}
}

/// Borrowing token recognized by logos, converted to an owned [`Token`] by [`scan_with_diagnostics()`]
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
	#[token("(")]
	LeftParen,

	#[token(")")]
	RightParen,

	#[token("+")]
	Plus,

	#[token("-")]
	Hyphen,

	#[token("*")]
	Asterisk,

	#[token("/")]
	#[token("\\")]
	Slash,

	// Longest match wins, so "2d6" is a single dice token rather than an integer followed by a name
	#[regex("[0-9]+[dD][0-9]+")]
	DiceRoll,

	#[regex("[0-9]+")]
	Integer,

	#[regex("[a-zA-Z]+")]
	Name,
}

/// Scans formula text into tokens, discarding anything that isn't recognized.
///
/// # Examples
/// ```
/// use charsheet::scan::{scan, TokenKind};
///
/// let tokens = scan("2d6 + STR");
/// let kinds: Vec<_> = tokens.into_iter().map(|token| token.kind).collect();
/// assert_eq!(
/// 	kinds,
/// 	vec![
/// 		TokenKind::DiceRoll { count: 2, sides: 6 },
/// 		TokenKind::Plus,
/// 		TokenKind::Name("STR".to_owned()),
/// 	]
/// );
/// ```
#[must_use]
pub fn scan(source: &str) -> Vec<Token> {
	let (tokens, diagnostics) = scan_with_diagnostics(source);
	for diag in &diagnostics {
		tracing::debug!(formula = source, %diag, "skipped formula text while scanning");
	}
	tokens
}

/// Scans formula text into tokens in a single left-to-right pass. Whitespace is skipped silently. Any other
/// unrecognized text is skipped too, but is reported with a warning diagnostic. Integers that don't fit in a
/// [`u32`] and dice with zero count or sides are dropped with an error diagnostic.
#[must_use]
pub fn scan_with_diagnostics(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
	let mut tokens = Vec::new();
	let mut diagnostics = Vec::new();
	let mut lexer = RawToken::lexer(source);

	while let Some(result) = lexer.next() {
		let span = Span::from(lexer.span());
		let slice = lexer.slice();

		let kind = match result {
			Ok(RawToken::LeftParen) => TokenKind::LeftParen,
			Ok(RawToken::RightParen) => TokenKind::RightParen,
			Ok(RawToken::Plus) => TokenKind::Plus,
			Ok(RawToken::Hyphen) => TokenKind::Hyphen,
			Ok(RawToken::Asterisk) => TokenKind::Asterisk,
			Ok(RawToken::Slash) => TokenKind::Slash,
			Ok(RawToken::Name) => TokenKind::Name(slice.to_owned()),
			Ok(RawToken::Integer) => match slice.parse() {
				Ok(value) => TokenKind::Integer(value),
				Err(_) => {
					diagnostics.push(Diagnostic::error(span, format!("integer `{slice}` is too large")));
					continue;
				}
			},
			Ok(RawToken::DiceRoll) => match dice_roll(slice) {
				Ok(kind) => kind,
				Err(message) => {
					diagnostics.push(Diagnostic::error(span, message));
					continue;
				}
			},
			Err(()) => {
				diagnostics.push(Diagnostic::warning(
					span,
					format!("unrecognized character `{slice}` ignored"),
				));
				continue;
			}
		};

		tokens.push(Token { kind, span });
	}

	(tokens, diagnostics)
}

/// Splits a matched dice literal into its count and sides.
fn dice_roll(slice: &str) -> Result<TokenKind, String> {
	let (count, sides) = slice
		.split_once(['d', 'D'])
		.ok_or_else(|| format!("malformed dice `{slice}`"))?;
	let count: u32 = count
		.parse()
		.map_err(|_err| format!("dice count in `{slice}` is too large"))?;
	let sides: u32 = sides
		.parse()
		.map_err(|_err| format!("dice sides in `{slice}` is too large"))?;

	if count == 0 || sides == 0 {
		return Err(format!("dice `{slice}` must have at least one die with at least one side"));
	}

	Ok(TokenKind::DiceRoll { count, sides })
}
