//! Abstractions for generating die values using various means.
//!
//! A [`Roller`] is the only place entropy enters the engine; every other component is pure given the sequence of
//! rolls it receives, which is what makes scripted rollers usable for exact-outcome tests.

use core::iter::Peekable;

#[cfg(feature = "fastrand")]
use fastrand::Rng;

use super::{rules, Dice, Error, RollOptions, Rolled};

/// Rolls dice - what else is there to say?
pub trait Roller {
	/// Rolls a single die, producing a value in `1..=sides`.
	#[must_use]
	fn roll_die(&mut self, sides: u8) -> u8;

	/// Rolls a set of dice, applying the game rules for the given options.
	///
	/// `primary` marks the dice as the first term of a formula, which is the only term advantage/disadvantage and
	/// fumble detection apply to. When rolling standalone dice, pass `true` to get the full rule treatment.
	///
	/// # Errors
	/// If the dice themselves are invalid or an exploding term exceeds the chain limit, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use fortuna::dice::{roller::{Iter, Roller}, Dice, RollOptions};
	///
	/// // 1d20 with one level of advantage: two dice rolled, the higher kept
	/// let options = RollOptions { advantage: 1, ..RollOptions::default() };
	/// let dice = Dice::default();
	/// let rolled = Iter::new([8, 14]).roll(&dice, &options, true)?;
	/// assert_eq!(rolled.total()?, 14);
	/// assert!(rolled.rolls[0].is_dropped());
	/// # Ok::<(), fortuna::dice::Error>(())
	/// ```
	fn roll<'d, 'r>(&mut self, dice: &'d Dice, options: &RollOptions, primary: bool) -> Result<Rolled<'r>, Error>
	where
		'd: 'r,
		Self: Sized,
	{
		rules::roll(self, dice, options, primary)
	}
}

/// Generates rolls with random values using [fastrand]. Requires the `fastrand` feature (enabled by default).
///
/// # Examples
///
/// ## Default fastrand roller
/// ```
/// use fortuna::dice::{roller::{FastRand, Roller}, Dice, RollOptions};
///
/// let mut roller = FastRand::default();
///
/// let dice = Dice::new(4, fortuna::dice::DiceSize::D6);
/// let _ = roller.roll(&dice, &RollOptions::default(), true)?;
/// let _ = roller.roll(&dice, &RollOptions::default(), true)?;
/// # Ok::<(), fortuna::dice::Error>(())
/// ```
///
/// ## Manually seeded fastrand roller
/// ```
/// use fortuna::dice::{roller::{FastRand, Roller}, Dice, RollOptions};
///
/// let mut roller = FastRand::with_seed(0x750c38d574400);
///
/// let dice = Dice::new(4, fortuna::dice::DiceSize::D6);
/// let _ = roller.roll(&dice, &RollOptions::default(), true)?;
/// # Ok::<(), fortuna::dice::Error>(())
/// ```
#[cfg(feature = "fastrand")]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "std", derive(Default))]
pub struct FastRand(Rng);

#[cfg(feature = "fastrand")]
impl FastRand {
	/// Creates a new fastrand roller that uses the given RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub const fn new(rng: Rng) -> Self {
		Self(rng)
	}

	/// Creates a new fastrand roller that uses a pre-seeded RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub fn with_seed(seed: u64) -> Self {
		Self(Rng::with_seed(seed))
	}
}

#[cfg(feature = "fastrand")]
impl Roller for FastRand {
	/// Rolls a single die using the [`fastrand::Rng`] the roller was created with.
	#[inline]
	fn roll_die(&mut self, sides: u8) -> u8 {
		if sides > 0 {
			self.0.u8(1..=sides)
		} else {
			0
		}
	}
}

/// Generates rolls that always have a specific value.
///
/// # Examples
/// ```
/// use fortuna::dice::{roller::{Roller, Val}, Dice, DiceSize, RollOptions};
///
/// let mut roller = Val(3);
///
/// let dice = Dice::new(4, DiceSize::D6);
/// let rolled = roller.roll(&dice, &RollOptions::default(), true)?;
/// assert!(rolled.rolls.iter().all(|roll| roll.val == 3));
/// # Ok::<(), fortuna::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Val(pub u8);

impl Roller for Val {
	/// Rolls a single die, always with one specific value.
	#[inline]
	fn roll_die(&mut self, _sides: u8) -> u8 {
		self.0
	}
}

/// Generates rolls that always have their max value.
///
/// Note that rolling exploding dice with this roller will hit the explosion safety limit, by design of both.
///
/// # Examples
/// ```
/// use fortuna::dice::{roller::{Max, Roller}, Dice, DiceSize, RollOptions};
///
/// let mut roller = Max;
///
/// let dice = Dice::new(4, DiceSize::D6);
/// let rolled = roller.roll(&dice, &RollOptions::default(), true)?;
/// assert!(rolled.rolls.iter().all(|roll| roll.val == 6));
/// # Ok::<(), fortuna::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Max;

impl Roller for Max {
	/// Rolls a single die, always with the max value (same as the number of sides).
	#[inline]
	fn roll_die(&mut self, sides: u8) -> u8 {
		sides
	}
}

/// Generates rolls from an iterator of values. Mainly useful for testing purposes.
///
/// # Examples
/// ```
/// use fortuna::dice::{roller::{Iter, Roller}, Dice, DiceSize, RollOptions};
///
/// let mut roller = Iter::new(vec![1, 2, 3, 4, 5]);
/// let dice = Dice::new(5, DiceSize::D6);
/// let rolled = roller.roll(&dice, &RollOptions::default(), true)?;
/// assert_eq!(
/// 	rolled.rolls.iter().map(|roll| roll.val).collect::<Vec<_>>(),
/// 	vec![1, 2, 3, 4, 5]
/// );
/// # Ok::<(), fortuna::dice::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Iter<I: Iterator<Item = u8>>(Peekable<I>);

impl<I: Iterator<Item = u8>> Iter<I> {
	/// Checks whether the iterator still has values available.
	#[inline]
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}

	/// Creates a new roller that uses the given iterator to provide roll values.
	#[must_use]
	#[inline]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}
}

impl<I: Iterator<Item = u8>> Roller for Iter<I> {
	/// Rolls a die with the value from the next iteration.
	///
	/// # Panics
	/// If the iterator has finished, this will panic.
	#[inline]
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn roll_die(&mut self, _sides: u8) -> u8 {
		self.0.next().expect("iterator is finished")
	}
}
