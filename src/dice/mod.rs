//! All functionality for directly creating dice, rolling them through the game rules, and working with their
//! resulting rolls.
//!
//! This is the home of the dice "primitives". For using as part of a larger formula, see [`Expr::dice`].
//!
//! [`Expr::dice`]: crate::expr::Expr::Dice

pub mod roller;
pub mod rules;

use alloc::{
	borrow::Cow,
	format,
	string::{String, ToString},
	vec::Vec,
};
use core::fmt;

pub use self::roller::Roller;
use crate::expr::Describe;

/// Maximum number of dice a single term is permitted to roll.
pub const MAX_COUNT: u8 = 20;

/// Die face counts permitted by the game rules.
///
/// The composite sizes ([`Self::D44`], [`Self::D66`], [`Self::D88`]) represent two physical dice of the implied base
/// size read as the tens and ones digits of a single logical result - see [`DiceSize::base()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[expect(clippy::exhaustive_enums, reason = "The supported die sizes are a fixed game rule")]
pub enum DiceSize {
	/// Four-sided die
	D4,

	/// Six-sided die
	D6,

	/// Eight-sided die
	D8,

	/// Ten-sided die
	D10,

	/// Twelve-sided die
	D12,

	/// Twenty-sided die
	D20,

	/// Double-digit die read from two d4s (tens and ones)
	D44,

	/// Double-digit die read from two d6s (tens and ones)
	D66,

	/// Double-digit die read from two d8s (tens and ones)
	D88,

	/// Plain hundred-sided die
	D100,
}

impl DiceSize {
	/// Creates a dice size from a raw side count.
	///
	/// # Errors
	/// If the side count isn't one of the permitted sizes, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use fortuna::dice::DiceSize;
	///
	/// assert_eq!(DiceSize::from_sides(20), Ok(DiceSize::D20));
	/// assert_eq!(
	/// 	DiceSize::from_sides(7).unwrap_err().to_string(),
	/// 	"Invalid dice type: d7"
	/// );
	/// ```
	pub const fn from_sides(sides: u32) -> Result<Self, Error> {
		Ok(match sides {
			4 => Self::D4,
			6 => Self::D6,
			8 => Self::D8,
			10 => Self::D10,
			12 => Self::D12,
			20 => Self::D20,
			44 => Self::D44,
			66 => Self::D66,
			88 => Self::D88,
			100 => Self::D100,
			_ => return Err(Error::InvalidType(sides)),
		})
	}

	/// Gets the nominal side count of the size - `44` for [`Self::D44`], and so on.
	///
	/// For every size, this is also the highest value a die of the size can show.
	#[must_use]
	pub const fn sides(self) -> u8 {
		match self {
			Self::D4 => 4,
			Self::D6 => 6,
			Self::D8 => 8,
			Self::D10 => 10,
			Self::D12 => 12,
			Self::D20 => 20,
			Self::D44 => 44,
			Self::D66 => 66,
			Self::D88 => 88,
			Self::D100 => 100,
		}
	}

	/// Gets the side count of the physical dice that are actually rolled for the size.
	///
	/// For the composite sizes this is the base die rolled twice (4, 6, or 8); for all other sizes it is the same as
	/// [`Self::sides()`].
	#[must_use]
	pub const fn base(self) -> u8 {
		match self {
			Self::D44 => 4,
			Self::D66 => 6,
			Self::D88 => 8,
			other => other.sides(),
		}
	}

	/// Indicates whether this size is one of the composite double-digit sizes.
	#[must_use]
	pub const fn is_double_digit(self) -> bool {
		matches!(self, Self::D44 | Self::D66 | Self::D88)
	}
}

impl fmt::Display for DiceSize {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "d{}", self.sides())
	}
}

/// A set of one or more rollable dice of a single size, along with the roll behaviors baked into the term itself
/// (exploding and vicious).
///
/// Whether those behaviors actually fire is additionally governed by the [`RollOptions`] supplied when rolling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct Dice {
	/// Number of dice to roll
	pub count: u8,

	/// Size of each die
	pub size: DiceSize,

	/// Whether dice that show their maximum value explode into additional critical dice
	pub exploding: bool,

	/// Whether a maximum value on the first kept die grants a single vicious bonus die
	pub vicious: bool,
}

impl Dice {
	/// Creates a new set of plain dice with a given count and size.
	#[must_use]
	pub const fn new(count: u8, size: DiceSize) -> Self {
		Self {
			count,
			size,
			exploding: false,
			vicious: false,
		}
	}

	/// Creates a new dice builder.
	#[must_use]
	#[inline]
	pub fn builder() -> Builder {
		Builder::default()
	}
}

impl Default for Dice {
	/// Creates the default dice (1d20).
	#[inline]
	fn default() -> Self {
		Self::new(1, DiceSize::D20)
	}
}

impl fmt::Display for Dice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}{}{}{}",
			self.count,
			self.size,
			if self.exploding { "!" } else { "" },
			if self.vicious { "v" } else { "" }
		)
	}
}

/// Caller-supplied rule configuration for a single evaluation.
///
/// Consumers derive these from UI state and ability semantics: the advantage level from a signed toggle, criticals
/// and fumbles from whether the ability allows them (healing typically excludes both), and vicious from
/// equipped-weapon metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct RollOptions {
	/// Signed advantage level: positive rolls extra dice and keeps the highest, negative keeps the lowest,
	/// zero rolls normally. Applies to the first dice term of a formula only.
	pub advantage: i8,

	/// Whether exploding (`!`) terms are allowed to produce critical dice
	pub criticals: bool,

	/// Whether a natural 1 on a primary d20 term is flagged as a fumble
	pub fumbles: bool,

	/// Whether vicious (`v`) terms are allowed to produce their bonus die
	pub vicious: bool,
}

impl Default for RollOptions {
	/// Creates the default options: no advantage, criticals and fumbles enabled, vicious disabled.
	fn default() -> Self {
		Self {
			advantage: 0,
			criticals: true,
			fumbles: true,
			vicious: false,
		}
	}
}

/// Role a single rolled die plays in its roll's outcome.
///
/// Categories are mutually exclusive and assigned only by the rolling rules, never by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "The category set is a fixed game rule")]
pub enum DieCategory {
	/// Ordinary kept die
	Normal,

	/// Die added by an explosion
	Critical,

	/// Bonus die added by the vicious rule
	Vicious,

	/// Die discarded by advantage or disadvantage
	Dropped,

	/// Natural 1 on a primary d20 term
	Fumble,
}

/// Single die produced from rolling [`Dice`], tagged with its role in the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct DieRoll {
	/// Value that was rolled (for composite sizes, the combined double-digit reading)
	pub val: u8,

	/// Size of the die
	pub size: DiceSize,

	/// Role of the die in the roll's outcome
	pub category: DieCategory,

	/// Position of the die in original roll order - dice are never reordered, only flagged
	pub index: usize,
}

impl DieRoll {
	/// Creates a new kept, normal die roll with the given value.
	#[must_use]
	pub const fn new(val: u8, size: DiceSize, index: usize) -> Self {
		Self {
			val,
			size,
			category: DieCategory::Normal,
			index,
		}
	}

	/// Indicates whether this die roll is being kept (has *not* been dropped by advantage or disadvantage).
	#[must_use]
	#[inline]
	pub fn is_kept(&self) -> bool {
		self.category != DieCategory::Dropped
	}

	/// Indicates whether this die roll has been dropped by advantage or disadvantage.
	/// This is the direct inverse of [`DieRoll::is_kept()`].
	#[must_use]
	#[inline]
	pub fn is_dropped(&self) -> bool {
		self.category == DieCategory::Dropped
	}
}

impl fmt::Display for DieRoll {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The format of a die roll is the plain numeric value of the roll, appended with ` (d)` if it was dropped,
	/// ` (c)` if it is a critical die, ` (v)` if it is a vicious die, or ` (f)` if it is a fumble.
	///
	/// # Examples
	/// ```
	/// use fortuna::dice::{DiceSize, DieRoll};
	///
	/// let roll = DieRoll::new(4, DiceSize::D6, 0);
	/// assert_eq!(roll.to_string(), "4");
	/// ```
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}{}",
			self.val,
			match self.category {
				DieCategory::Normal => "",
				DieCategory::Critical => " (c)",
				DieCategory::Vicious => " (v)",
				DieCategory::Dropped => " (d)",
				DieCategory::Fumble => " (f)",
			}
		)
	}
}

/// Representation of the result from rolling [`Dice`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct Rolled<'a> {
	/// Each individual die roll that was made, in original roll order
	pub rolls: Vec<DieRoll>,

	/// Dice that were rolled to produce this
	pub dice: Cow<'a, Dice>,
}

impl Rolled<'_> {
	/// Calculates the total of all kept roll values. Dropped dice never contribute; critical and vicious dice do.
	///
	/// # Errors
	/// If there is an integer overflow while summing the die rolls, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use fortuna::dice::{roller::{Iter, Roller}, Dice, DiceSize, RollOptions};
	///
	/// let dice = Dice::new(2, DiceSize::D6);
	/// let rolled = Iter::new([3, 5]).roll(&dice, &RollOptions::default(), false)?;
	/// assert_eq!(rolled.total()?, 8);
	/// # Ok::<(), fortuna::dice::Error>(())
	/// ```
	pub fn total(&self) -> Result<u16, Error> {
		let mut sum: u16 = 0;

		// Sum all rolls that haven't been dropped
		for r in self.rolls.iter().filter(|roll| roll.is_kept()) {
			sum = sum.checked_add(u16::from(r.val)).ok_or(Error::Overflow)?;
		}

		Ok(sum)
	}

	/// Counts the critical dice added to this roll by explosions.
	#[must_use]
	pub fn criticals(&self) -> usize {
		self.rolls
			.iter()
			.filter(|roll| roll.category == DieCategory::Critical)
			.count()
	}

	/// Indicates whether this roll's core die came up a fumble.
	#[must_use]
	pub fn is_fumble(&self) -> bool {
		self.rolls.iter().any(|roll| roll.category == DieCategory::Fumble)
	}

	/// Indicates whether this roll was made with a composite double-digit size.
	#[must_use]
	pub fn is_double_digit(&self) -> bool {
		self.dice.size.is_double_digit()
	}

	/// Moves all of self's owned data into a new instance and clones any unowned data in order to create a `'static`
	/// instance of self.
	#[must_use]
	pub fn into_owned(self) -> Rolled<'static> {
		Rolled {
			rolls: self.rolls,
			dice: Cow::Owned(self.dice.into_owned()),
		}
	}

	/// Creates a new rolled set of dice from a given set of dice and an iterator of values, all kept and normal.
	#[must_use]
	pub fn from_dice_and_rolls(dice: &Dice, rolls: impl IntoIterator<Item = u8>) -> Rolled {
		Rolled {
			rolls: rolls
				.into_iter()
				.enumerate()
				.map(|(index, val)| DieRoll::new(val, dice.size, index))
				.collect(),
			dice: Cow::Borrowed(dice),
		}
	}
}

impl Describe for Rolled<'_> {
	/// Builds a string of the dice the roll is from and a list of all of the individual rolled dice
	/// (see [`DieRoll::fmt()`]).
	///
	/// If `list_limit` is specified and there are more rolls than it, the list of rolled dice will be truncated and
	/// appended with "X more..." (where X is the remaining roll count past the max).
	///
	/// # Examples
	/// ```
	/// use fortuna::{dice::{roller::{Iter, Roller}, Dice, DiceSize, RollOptions}, expr::Describe};
	///
	/// let dice = Dice::builder().count(4).size(DiceSize::D6).build();
	/// let rolled = Iter::new([6, 2, 5, 3]).roll(&dice, &RollOptions::default(), false)?;
	///
	/// assert_eq!(rolled.describe(None), "4d6[6, 2, 5, 3]");
	/// assert_eq!(rolled.describe(Some(2)), "4d6[6, 2, 2 more...]");
	/// # Ok::<(), fortuna::dice::Error>(())
	/// ```
	///
	/// [`DieRoll::fmt()`]: ./struct.DieRoll.html#method.fmt
	fn describe(&self, list_limit: Option<usize>) -> String {
		let list_limit = list_limit.unwrap_or(usize::MAX);
		let total_rolls = self.rolls.len();
		let truncated_rolls = total_rolls.saturating_sub(list_limit);

		format!(
			"{}[{}{}]",
			self.dice,
			self.rolls
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
}

impl fmt::Display for Rolled<'_> {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output is equivalent to calling [`Self::describe(None)`].
	///
	/// [`Self::describe(None)`]: Self::describe()
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

/// An error resulting from a dice operation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The requested side count isn't one of the sizes permitted by the game rules.
	///
	/// # Examples
	/// ```
	/// use fortuna::dice::{DiceSize, Error};
	///
	/// assert_eq!(DiceSize::from_sides(7), Err(Error::InvalidType(7)));
	/// ```
	#[error("Invalid dice type: d{0}")]
	InvalidType(u32),

	/// The requested die count is outside the permitted range.
	#[error("Invalid dice count: {0} (expected 1 to 20)")]
	InvalidCount(i64),

	/// An exploding term kept rolling maximum values past the safety limit.
	/// This guards against faulty rollers rather than any realistic run of luck.
	#[error("{0} exceeded the explosion limit of 100 chained rolls")]
	ExplosionLimit(Dice),

	/// There was an integer overflow when performing mathematical operations on roll values.
	/// This normally should not ever happen given the types used for die counts, sizes, and totals.
	#[error("integer overflow")]
	Overflow,
}

/// Builds [`Dice`] with a fluent interface.
///
/// # Examples
///
/// ## Basic dice
/// ```
/// use fortuna::dice::{Dice, DiceSize};
///
/// let dice = Dice::builder().count(2).size(DiceSize::D6).build();
/// assert_eq!(dice, Dice::new(2, DiceSize::D6));
/// ```
///
/// ## Roll behaviors
/// ```
/// use fortuna::dice::{Dice, DiceSize};
///
/// let dice = Dice::builder().count(1).size(DiceSize::D8).exploding().vicious().build();
/// assert_eq!(
/// 	dice,
/// 	Dice {
/// 		count: 1,
/// 		size: DiceSize::D8,
/// 		exploding: true,
/// 		vicious: true,
/// 	},
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder(Dice);

impl Builder {
	/// Sets the number of dice to roll.
	#[must_use]
	pub const fn count(mut self, count: u8) -> Self {
		self.0.count = count;
		self
	}

	/// Sets the size of each die.
	#[must_use]
	pub const fn size(mut self, size: DiceSize) -> Self {
		self.0.size = size;
		self
	}

	/// Marks the dice as exploding.
	#[must_use]
	pub const fn exploding(mut self) -> Self {
		self.0.exploding = true;
		self
	}

	/// Marks the dice as vicious.
	#[must_use]
	pub const fn vicious(mut self) -> Self {
		self.0.vicious = true;
		self
	}

	/// Finalizes the dice.
	#[must_use]
	pub fn build(self) -> Dice {
		self.0
	}
}
