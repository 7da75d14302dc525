//! High-level formula evaluation: the one-call pipeline from formula text to a fully categorized, displayable
//! result, consumed identically by character sheet UIs and chat-bot command handlers.

use alloc::{
	string::{String, ToString},
	vec::Vec,
};

use crate::{
	dice::{DieCategory, DieRoll, RollOptions, Roller},
	display::{self, Segment, Skeleton},
	expr::{binary_child_parens, CalcError, Context, Evaled, EvalError, Expr, HasOpType},
};

/// Fully categorized outcome of the dice portion of a formula evaluation.
///
/// Presentation layers read the categories, values, and summary flags from this to build rich displays; they must
/// not reinterpret rolls.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct DiceRollData {
	/// Every die rolled across all terms, in original roll order with formula-wide indices
	pub dice: Vec<DieRoll>,

	/// Arithmetic text appearing before the first dice term, if any
	pub before: Option<String>,

	/// Arithmetic text appearing after the last dice term, if any
	pub after: Option<String>,

	/// Total of the whole formula, counting only kept dice
	pub total: i32,

	/// Whether any term used a composite double-digit size
	pub double_digit: bool,

	/// Whether the primary term came up a fumble
	pub fumble: bool,

	/// Advantage level the roll was made with
	pub advantage: i8,

	/// Number of critical dice added by explosions
	pub criticals: usize,
}

/// The public result of evaluating a dice formula.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct FormulaResult {
	/// The formula as supplied by the caller (trimmed)
	pub formula: String,

	/// Total of the whole formula
	pub total: i32,

	/// Human-readable breakdown of the roll (see [`crate::display`])
	pub display: String,

	/// Categorized dice data - [`None`] for formulas containing no dice terms
	pub dice: Option<DiceRollData>,
}

/// An error from any stage of formula evaluation.
///
/// Wrapping is transparent: callers see the failing stage's own message (e.g. `Invalid dice type: d7`), ready to be
/// rendered to the user.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// The formula text is malformed.
	#[cfg(feature = "parse")]
	#[error(transparent)]
	Parse(#[from] crate::parse::Error),

	/// Resolution or rolling failed.
	#[error(transparent)]
	Eval(#[from] EvalError),

	/// Calculating the total failed.
	#[error(transparent)]
	Calc(#[from] CalcError),
}

/// Parses and evaluates a dice formula, producing a categorized, displayable result.
///
/// This is the engine's sole high-level entry point. The formula is lowercased for parsing (identifiers and the `d`
/// marker are case-insensitive), variables are substituted from `context`, dice are rolled through the game rules
/// for `options` using `roller`, and the outcome is packaged with a display breakdown. On failure an error is
/// returned, never a partial result.
///
/// # Errors
/// If parsing, resolution, rolling, or totalling fails, the corresponding error variant is returned.
///
/// # Examples
/// ```
/// use fortuna::dice::{roller::Iter, RollOptions};
/// use fortuna::expr::Context;
///
/// let mut roller = Iter::new([3, 5]);
/// let result = fortuna::evaluate("2d6 + 5", &Context::new(), &RollOptions::default(), &mut roller)?;
///
/// assert_eq!(result.total, 13);
/// assert_eq!(result.display, "(3 + 5) + 5");
/// # Ok::<(), fortuna::formula::Error>(())
/// ```
///
/// ```
/// use fortuna::dice::{roller::Iter, RollOptions};
/// use fortuna::expr::Context;
///
/// // 1d20 at one level of advantage: both dice shown, the dropped one struck through
/// let options = RollOptions { advantage: 1, ..RollOptions::default() };
/// let result = fortuna::evaluate("1d20", &Context::new(), &options, &mut Iter::new([14, 8]))?;
///
/// assert_eq!(result.total, 14);
/// assert_eq!(result.display, "(14) (~~8~~)");
/// # Ok::<(), fortuna::formula::Error>(())
/// ```
#[cfg(feature = "parse")]
pub fn evaluate(
	formula: &str,
	context: &Context,
	options: &RollOptions,
	roller: &mut impl Roller,
) -> Result<FormulaResult, Error> {
	let trimmed = formula.trim();
	let expr: Expr = trimmed.parse()?;
	evaluate_expr(trimmed, &expr, context, options, roller)
}

/// Evaluates an already-parsed formula tree, for callers that construct or cache [`Expr`] trees themselves.
///
/// `formula` is only echoed into the result; it does not need to re-parse to `expr`.
///
/// # Errors
/// If resolution, rolling, or totalling fails, the corresponding error variant is returned.
pub fn evaluate_expr(
	formula: &str,
	expr: &Expr,
	context: &Context,
	options: &RollOptions,
	roller: &mut impl Roller,
) -> Result<FormulaResult, Error> {
	let resolved = expr.resolve(context)?;
	let evaled = resolved.eval(options, roller)?;
	let total = evaled.calc()?;
	Ok(package(formula, &evaled, total, options))
}

/// Packages an evaluated tree into the public result: flattens the dice into one indexed list, extracts the
/// arithmetic skeleton, and renders the display breakdown.
fn package(formula: &str, evaled: &Evaled, total: i32, options: &RollOptions) -> FormulaResult {
	let mut segments = Vec::new();
	let mut dice = Vec::new();
	flatten(evaled, &mut segments, &mut dice);
	let skeleton = Skeleton { segments };

	let display = display::format(&dice, &skeleton);
	let data = (!dice.is_empty()).then(|| DiceRollData {
		before: skeleton.before(),
		after: skeleton.after(),
		total,
		double_digit: dice.iter().any(|die| die.size.is_double_digit()),
		fumble: dice.iter().any(|die| die.category == DieCategory::Fumble),
		advantage: options.advantage,
		criticals: dice
			.iter()
			.filter(|die| die.category == DieCategory::Critical)
			.count(),
		dice,
	});

	FormulaResult {
		formula: formula.to_string(),
		total,
		display,
		dice: data,
	}
}

/// Walks an evaluated tree in formula order, emitting display segments and collecting every die into one flat list
/// with formula-wide indices. Dice keep their roll order; only the indices are rewritten.
fn flatten(evaled: &Evaled, segments: &mut Vec<Segment>, dice: &mut Vec<DieRoll>) {
	match evaled {
		Evaled::Num(x) => segments.push(Segment::Text(x.to_string())),
		Evaled::Dice(rolled) => {
			let start = dice.len();
			for roll in &rolled.rolls {
				let mut die = roll.clone();
				die.index = dice.len();
				dice.push(die);
			}
			segments.push(Segment::Dice {
				start,
				len: rolled.rolls.len(),
			});
		}

		Evaled::Neg(x) => {
			segments.push(Segment::Text("-".to_string()));
			flatten_child(evaled, x, segments, dice);
		}

		Evaled::Add(a, b) => flatten_binary(evaled, " + ", a, b, segments, dice),
		Evaled::Sub(a, b) => flatten_binary(evaled, " - ", a, b, segments, dice),
		Evaled::Mul(a, b) => flatten_binary(evaled, " * ", a, b, segments, dice),
		Evaled::Div(a, b) => flatten_binary(evaled, " / ", a, b, segments, dice),
	}
}

/// Emits both children of a binary node around its operator text.
fn flatten_binary(
	parent: &Evaled,
	op: &str,
	a: &Evaled,
	b: &Evaled,
	segments: &mut Vec<Segment>,
	dice: &mut Vec<DieRoll>,
) {
	flatten_child(parent, a, segments, dice);
	segments.push(Segment::Text(op.to_string()));
	flatten_child(parent, b, segments, dice);
}

/// Emits a child node, parenthesized whenever the mix of operation types would read ambiguously.
fn flatten_child(parent: &Evaled, child: &Evaled, segments: &mut Vec<Segment>, dice: &mut Vec<DieRoll>) {
	if binary_child_parens(parent.op_type(), child.op_type()) {
		segments.push(Segment::Text("(".to_string()));
		flatten(child, segments, dice);
		segments.push(Segment::Text(")".to_string()));
	} else {
		flatten(child, segments, dice);
	}
}
