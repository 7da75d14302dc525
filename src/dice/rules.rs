//! The game rules applied while rolling: advantage/disadvantage keep logic, exploding criticals, vicious bonus dice,
//! double-digit expansion, and fumble detection.
//!
//! Everything here is pure given the sequence of values produced by the supplied [`Roller`]; entry is through
//! [`Roller::roll()`] rather than calling these routines directly.

use alloc::{borrow::Cow, vec::Vec};

use super::{roller::Roller, Dice, DiceSize, DieCategory, DieRoll, Error, RollOptions, Rolled, MAX_COUNT};

/// Maximum number of chained critical dice a single exploding term may add before rolling fails.
///
/// A legitimate roller makes chains of this length astronomically unlikely (each link requires rolling the maximum
/// face again); the cap exists so a faulty roller cannot loop unboundedly.
pub const EXPLOSION_LIMIT: usize = 100;

/// Rolls a set of dice and applies the full rule treatment for the given options.
///
/// `primary` marks the dice as the first term of a formula; advantage/disadvantage and fumble detection apply only
/// to primary terms.
pub(super) fn roll<'d, 'r>(
	roller: &mut impl Roller,
	dice: &'d Dice,
	options: &RollOptions,
	primary: bool,
) -> Result<Rolled<'r>, Error>
where
	'd: 'r,
{
	if dice.count < 1 || dice.count > MAX_COUNT {
		return Err(Error::InvalidCount(i64::from(dice.count)));
	}

	// Composite sizes expand to pairs of physical dice and take part in none of the other rules
	if dice.size.is_double_digit() {
		return Ok(Rolled {
			rolls: roll_double_digit(roller, dice),
			dice: Cow::Borrowed(dice),
		});
	}

	// Roll the dice, including any extras called for by the advantage level
	let advantage = if primary { options.advantage } else { 0 };
	let total = usize::from(dice.count) + usize::from(advantage.unsigned_abs());
	let mut rolls = Vec::with_capacity(total);
	for index in 0..total {
		rolls.push(DieRoll::new(roller.roll_die(dice.size.sides()), dice.size, index));
	}

	if advantage != 0 {
		apply_advantage(&mut rolls, usize::from(dice.count), advantage > 0);
	}

	let originals = rolls.len();
	let explode = dice.exploding && options.criticals;
	if explode {
		apply_explosions(roller, &mut rolls, dice)?;
	}
	// Exploding takes precedence over vicious on the same maximum roll
	if dice.vicious && options.vicious && !explode {
		apply_vicious(roller, &mut rolls, dice, originals);
	}
	if primary && options.fumbles && dice.size == DiceSize::D20 {
		apply_fumble(&mut rolls, originals);
	}

	Ok(Rolled {
		rolls,
		dice: Cow::Borrowed(dice),
	})
}

/// Rolls a composite term: each logical die is two physical base dice read as tens and ones digits.
fn roll_double_digit(roller: &mut impl Roller, dice: &Dice) -> Vec<DieRoll> {
	let base = dice.size.base();
	let mut rolls = Vec::with_capacity(usize::from(dice.count));
	for index in 0..usize::from(dice.count) {
		let tens = roller.roll_die(base);
		let ones = roller.roll_die(base);
		rolls.push(DieRoll::new(tens * 10 + ones, dice.size, index));
	}
	rolls
}

/// Drops all but the highest (or lowest) `keep` rolls.
///
/// The sort happens on a separate index list purely to decide which dice to keep; the rolls themselves stay in
/// original roll order so that display ordering remains stable. Ties keep the earlier-rolled die.
fn apply_advantage(rolls: &mut [DieRoll], keep: usize, highest: bool) {
	let mut order: Vec<usize> = (0..rolls.len()).collect();
	if highest {
		order.sort_by(|&a, &b| rolls[b].val.cmp(&rolls[a].val));
	} else {
		order.sort_by(|&a, &b| rolls[a].val.cmp(&rolls[b].val));
	}

	for &dropped in order.iter().skip(keep) {
		rolls[dropped].category = DieCategory::Dropped;
	}
}

/// Appends a critical die for every kept die showing its maximum value, re-checking each appended die so that chains
/// continue until a non-maximum roll occurs.
///
/// Expressed iteratively (a pending counter per "generation") rather than recursively so an adversarial roller is
/// bounded by [`EXPLOSION_LIMIT`] instead of the call stack.
fn apply_explosions(roller: &mut impl Roller, rolls: &mut Vec<DieRoll>, dice: &Dice) -> Result<(), Error> {
	let max = dice.size.sides();
	let mut pending = rolls.iter().filter(|roll| roll.is_kept() && roll.val == max).count();
	let mut added = 0_usize;

	while pending > 0 {
		let mut next = 0;
		for _ in 0..pending {
			added += 1;
			if added > EXPLOSION_LIMIT {
				return Err(Error::ExplosionLimit(dice.clone()));
			}

			let val = roller.roll_die(max);
			if val == max {
				next += 1;
			}

			let index = rolls.len();
			rolls.push(DieRoll {
				val,
				size: dice.size,
				category: DieCategory::Critical,
				index,
			});
		}
		pending = next;
	}

	Ok(())
}

/// Appends exactly one vicious bonus die if the first kept original die shows its maximum value. Never chains.
fn apply_vicious(roller: &mut impl Roller, rolls: &mut Vec<DieRoll>, dice: &Dice, originals: usize) {
	let max = dice.size.sides();
	let triggered = rolls[..originals]
		.iter()
		.find(|roll| roll.is_kept())
		.is_some_and(|roll| roll.val == max);

	if triggered {
		let index = rolls.len();
		rolls.push(DieRoll {
			val: roller.roll_die(max),
			size: dice.size,
			category: DieCategory::Vicious,
			index,
		});
	}
}

/// Recategorizes a natural 1 as a fumble when a single kept original die determines the core roll.
fn apply_fumble(rolls: &mut [DieRoll], originals: usize) {
	let mut kept = rolls[..originals].iter_mut().filter(|roll| roll.is_kept());
	let first = kept.next();
	let rest = kept.next();

	if let (Some(die), None) = (first, rest) {
		if die.val == 1 {
			die.category = DieCategory::Fumble;
		}
	}
}
