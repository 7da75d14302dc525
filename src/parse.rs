#![cfg(feature = "parse")]

//! Parser generators for dice terms and full formulas.
//!
//! Parsers expect lowercase input; the [`FromStr`] implementations (and [`crate::formula::evaluate`]) lowercase for
//! you, which is what makes identifiers and the `d` marker case-insensitive.
//!
//! [`FromStr`]: core::str::FromStr

use alloc::{
	boxed::Box,
	format,
	string::{String, ToString},
	vec::Vec,
};

use chumsky::prelude::*;

use crate::{
	dice::Dice,
	expr::{DiceCount, DiceTerm, Expr},
};

/// Roll-behavior suffix on a dice term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
	/// The exploding (`!`) marker
	Exploding,

	/// The vicious (`v`) marker
	Vicious,
}

/// Generates a parser for any run of dice suffix markers, in either order (`!v` and `v!` are equivalent).
fn suffixes<'src>() -> impl Parser<'src, &'src str, Vec<Suffix>, extra::Err<Rich<'src, char>>> + Clone {
	choice((just('!').to(Suffix::Exploding), just('v').to(Suffix::Vicious)))
		.repeated()
		.collect()
}

/// Builds a dice term from its parsed parts.
fn dice_term(count: DiceCount, sides: u32, suffixes: &[Suffix]) -> DiceTerm {
	DiceTerm {
		count,
		sides,
		exploding: suffixes.contains(&Suffix::Exploding),
		vicious: suffixes.contains(&Suffix::Vicious),
	}
}

/// Outcome of classifying an identifier-led word.
enum Word {
	/// The word reads as a dice term (`d20`, `strd6`, `d8v`)
	Dice(DiceTerm),

	/// The word is a plain attribute name
	Var(String),
}

/// Classifies an identifier-led word as either a dice term or a plain variable.
///
/// A single identifier token can hide a whole dice term: `d20` (no count), `strd6` (identifier count), or `d8v`
/// (the trailing `v` is an identifier character, so the tokenizer can't split it off). Externally parsed suffix
/// markers are merged with any found inside the word.
fn classify_word(word: &str, suffixes: &[Suffix]) -> Result<Word, String> {
	if let Some((count, sides, vicious_tail)) = split_dice_word(word) {
		let count = if count.is_empty() {
			DiceCount::Fixed(1)
		} else {
			DiceCount::Var(count.to_string())
		};
		let sides = sides.parse().map_err(|err| format!("Dice sides: {err}"))?;

		let mut term = dice_term(count, sides, suffixes);
		term.vicious |= vicious_tail;
		Ok(Word::Dice(term))
	} else if suffixes.is_empty() {
		Ok(Word::Var(word.to_string()))
	} else {
		Err(format!("Roll suffix on non-dice value: {word}"))
	}
}

/// Splits a word of the shape `<count?>d<sides><v*>`, returning the count prefix (possibly empty), the side count
/// digits, and whether a trailing `v` run was present. Returns [`None`] for words that don't read as dice.
fn split_dice_word(word: &str) -> Option<(&str, &str, bool)> {
	let bytes = word.as_bytes();
	for p in (0..bytes.len()).rev() {
		if bytes[p] != b'd' {
			continue;
		}

		let digits = p + 1;
		let mut end = digits;
		while end < bytes.len() && bytes[end].is_ascii_digit() {
			end += 1;
		}

		if end > digits && bytes[end..].iter().all(|&b| b == b'v') {
			return Some((&word[..p], &word[digits..end], end < bytes.len()));
		}
	}
	None
}

/// Generates a parser that specifically handles dice terms like "d20", "2d6!", "strd6v", etc.
pub fn dice_part<'src>() -> impl Parser<'src, &'src str, DiceTerm, extra::Err<Rich<'src, char>>> + Clone {
	// Parser for terms with a numeric count (or none hidden in the leading word)
	let counted = text::int::<&'src str, _, _>(10)
		.then_ignore(just('d'))
		.then(text::int(10))
		.then(suffixes())
		.try_map(|((count, sides), sfx), span| {
			let count = count
				.parse()
				.map_err(|err| Rich::custom(span, format!("Dice count: {err}")))?;
			let sides = sides
				.parse()
				.map_err(|err| Rich::custom(span, format!("Dice sides: {err}")))?;
			Ok(dice_term(DiceCount::Fixed(count), sides, &sfx))
		});

	// Parser for terms led by an identifier character ("d20", "strd6")
	let word = text::ident()
		.then(suffixes())
		.try_map(|(word, sfx): (&str, Vec<Suffix>), span| match classify_word(word, &sfx) {
			Ok(Word::Dice(term)) => Ok(term),
			Ok(Word::Var(name)) => Err(Rich::custom(span, format!("Expected dice, found identifier: {name}"))),
			Err(msg) => Err(Rich::custom(span, msg)),
		});

	counted.or(word)
}

/// Generates a parser that specifically handles dice terms like "d20", "2d6!", "strd6v", etc.
/// and expects end of input
pub fn dice<'src>() -> impl Parser<'src, &'src str, DiceTerm, extra::Err<Rich<'src, char>>> + Clone {
	dice_part().then_ignore(end())
}

/// Generates a parser that handles full formulas including mathematical operations, grouping with parentheses,
/// dice terms, variables, etc.
pub fn expr_part<'src>() -> impl Parser<'src, &'src str, Expr, extra::Err<Rich<'src, char>>> + Clone {
	// Helper function for operators
	let op = |c| just(c).padded();

	recursive(|expr| {
		// Parser for numbers
		let int = text::int(10).try_map(|s: &str, span| {
			s.parse()
				.map(Expr::Num)
				.map_err(|err| Rich::custom(span, format!("{err}")))
		});

		// Parser for dice terms with a numeric count
		let counted_dice = text::int::<&'src str, _, _>(10)
			.then_ignore(just('d'))
			.then(text::int(10))
			.then(suffixes())
			.try_map(|((count, sides), sfx), span| {
				let count = count
					.parse()
					.map_err(|err| Rich::custom(span, format!("Dice count: {err}")))?;
				let sides = sides
					.parse()
					.map_err(|err| Rich::custom(span, format!("Dice sides: {err}")))?;
				Ok(Expr::Dice(dice_term(DiceCount::Fixed(count), sides, &sfx)))
			});

		// Parser for identifier-led atoms: countless dice ("d20"), identifier-counted dice ("strd6"),
		// or plain variables ("str")
		let word = text::ident()
			.then(suffixes())
			.try_map(|(word, sfx): (&str, Vec<Suffix>), span| match classify_word(word, &sfx) {
				Ok(Word::Dice(term)) => Ok(Expr::Dice(term)),
				Ok(Word::Var(name)) => Ok(Expr::Var(name)),
				Err(msg) => Err(Rich::custom(span, msg)),
			});

		// Parser for expressions enclosed in parentheses
		let atom = choice((counted_dice, word, int, expr.delimited_by(just('('), just(')')))).padded();

		// Parser for negative sign
		let unary = op('-').repeated().foldr(atom, |_op, rhs| Expr::Neg(Box::new(rhs)));

		// Parser for multiplication and division
		let product = unary.clone().foldl(
			choice((
				op('*').to(Expr::Mul as fn(_, _) -> _),
				op('/').to(Expr::Div as fn(_, _) -> _),
			))
			.then(unary)
			.repeated(),
			|lhs, (op, rhs)| op(Box::new(lhs), Box::new(rhs)),
		);

		// Parser for addition and subtraction operators
		product.clone().foldl(
			choice((
				op('+').to(Expr::Add as fn(_, _) -> _),
				op('-').to(Expr::Sub as fn(_, _) -> _),
			))
			.then(product)
			.repeated(),
			|lhs, (op, rhs)| op(Box::new(lhs), Box::new(rhs)),
		)
	})
}

/// Generates a parser that handles full formulas including mathematical operations, grouping with parentheses,
/// dice terms, variables, etc. and expects end of input
pub fn expr<'src>() -> impl Parser<'src, &'src str, Expr, extra::Err<Rich<'src, char>>> + Clone {
	expr_part().then_ignore(end())
}

/// A formula parsing error with aggregated diagnostics
#[derive(Debug, Clone, thiserror::Error)]
#[error("{details}")]
pub struct Error {
	/// Combined messages of all diagnostics emitted by the parser
	pub details: String,
}

/// Joins every diagnostic from a failed parse into a single error.
fn join_errors(errs: &[Rich<char>]) -> Error {
	Error {
		details: errs.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
	}
}

impl core::str::FromStr for Dice {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lc = s.to_lowercase();
		let term = dice()
			.parse(&lc)
			.into_result()
			.map_err(|errs| join_errors(&errs))?;
		term.to_dice().map_err(|err| Error {
			details: err.to_string(),
		})
	}
}

impl core::str::FromStr for Expr {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lc = s.to_lowercase();
		let result = expr().parse(&lc).into_result().map_err(|errs| join_errors(&errs));
		result
	}
}
