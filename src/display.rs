//! Markdown-flavored rendering of roll results for presentation layers.
//!
//! Everything here is a pure projection of already-categorized data: values and categories are never altered, dice
//! are rendered strictly in original roll order, and the same inputs always produce the same string. The markup is
//! plain markdown (bold and strike-through) so both chat embeds and web tooltips can consume it directly.

use alloc::{
	format,
	string::{String, ToString},
	vec::Vec,
};

use crate::dice::{DieCategory, DieRoll};

/// Marker appended to a critical die's value.
const CRITICAL_MARK: &str = "!";

/// Marker appended to a vicious die's value.
const VICIOUS_MARK: &str = "v";

/// Marker appended to a fumbled die's value.
const FUMBLE_MARK: &str = "\u{2717}";

/// One piece of a formula's display: either literal arithmetic text or a slice of the flat dice list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_enums, reason = "A display is text around dice; no other segment kind exists")]
pub enum Segment {
	/// Literal arithmetic text (numbers, operators, parentheses)
	Text(String),

	/// A dice term's rolls, as a range into the flat dice list
	Dice {
		/// Index of the term's first die in the flat dice list
		start: usize,

		/// Number of dice the term produced
		len: usize,
	},
}

/// The arithmetic shape of an evaluated formula: alternating text and dice segments in formula order.
///
/// Produced by the result assembler; consumed by [`format()`] together with the flat dice list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct Skeleton {
	/// Segments in formula order
	pub segments: Vec<Segment>,
}

impl Skeleton {
	/// Concatenates the arithmetic text appearing before the first dice term.
	/// Returns [`None`] if there is none, or if the formula has no dice at all.
	#[must_use]
	pub fn before(&self) -> Option<String> {
		let first = self.segments.iter().position(|s| matches!(s, Segment::Dice { .. }))?;
		let text: String = self.segments[..first]
			.iter()
			.map(|s| match s {
				Segment::Text(text) => text.as_str(),
				Segment::Dice { .. } => "",
			})
			.collect();
		(!text.is_empty()).then_some(text)
	}

	/// Concatenates the arithmetic text appearing after the last dice term.
	/// Returns [`None`] if there is none, or if the formula has no dice at all.
	#[must_use]
	pub fn after(&self) -> Option<String> {
		let last = self.segments.iter().rposition(|s| matches!(s, Segment::Dice { .. }))?;
		let text: String = self.segments[last + 1..]
			.iter()
			.map(|s| match s {
				Segment::Text(text) => text.as_str(),
				Segment::Dice { .. } => "",
			})
			.collect();
		(!text.is_empty()).then_some(text)
	}
}

/// Renders a single die with its category's styling: plain for normal, strike-through for dropped, bold plus a
/// marker for critical, vicious, and fumble.
///
/// # Examples
/// ```
/// use fortuna::dice::{DiceSize, DieCategory, DieRoll};
/// use fortuna::display::die_markup;
///
/// let mut die = DieRoll::new(6, DiceSize::D6, 0);
/// assert_eq!(die_markup(&die), "6");
///
/// die.category = DieCategory::Critical;
/// assert_eq!(die_markup(&die), "**6!**");
///
/// die.category = DieCategory::Dropped;
/// assert_eq!(die_markup(&die), "~~6~~");
/// ```
#[must_use]
pub fn die_markup(die: &DieRoll) -> String {
	match die.category {
		DieCategory::Normal => die.val.to_string(),
		DieCategory::Dropped => format!("~~{}~~", die.val),
		DieCategory::Critical => format!("**{}{CRITICAL_MARK}**", die.val),
		DieCategory::Vicious => format!("**{}{VICIOUS_MARK}**", die.val),
		DieCategory::Fumble => format!("**{}{FUMBLE_MARK}**", die.val),
	}
}

/// Renders a dice term's rolls in original order, grouping contiguous runs of kept and dropped dice into separate
/// parenthesized lists so a reader can visually separate what counted from what was discarded.
///
/// Kept runs are joined with ` + ` (their values sum into the total); dropped runs are joined with `, `.
///
/// # Examples
/// ```
/// use fortuna::dice::{DiceSize, DieCategory, DieRoll};
/// use fortuna::display::group_markup;
///
/// let kept = DieRoll::new(14, DiceSize::D20, 0);
/// let mut dropped = DieRoll::new(8, DiceSize::D20, 1);
/// dropped.category = DieCategory::Dropped;
///
/// assert_eq!(group_markup(&[kept, dropped]), "(14) (~~8~~)");
/// ```
#[must_use]
pub fn group_markup(dice: &[DieRoll]) -> String {
	let mut groups: Vec<String> = Vec::new();
	let mut run: Vec<&DieRoll> = Vec::new();
	let mut run_kept = true;

	for die in dice {
		if !run.is_empty() && die.is_kept() != run_kept {
			groups.push(run_markup(&run, run_kept));
			run.clear();
		}
		run_kept = die.is_kept();
		run.push(die);
	}
	if !run.is_empty() {
		groups.push(run_markup(&run, run_kept));
	}

	groups.join(" ")
}

/// Renders one contiguous run of dice that are either all kept or all dropped.
fn run_markup(run: &[&DieRoll], kept: bool) -> String {
	let sep = if kept { " + " } else { ", " };
	format!(
		"({})",
		run.iter().copied().map(die_markup).collect::<Vec<_>>().join(sep)
	)
}

/// Builds the full display string for a roll: the skeleton's arithmetic text verbatim, with each dice segment
/// rendered through [`group_markup()`].
///
/// This is a pure function of its inputs - re-formatting the same data always yields the same string.
#[must_use]
pub fn format(dice: &[DieRoll], skeleton: &Skeleton) -> String {
	let mut out = String::new();
	for segment in &skeleton.segments {
		match segment {
			Segment::Text(text) => out.push_str(text),
			Segment::Dice { start, len } => out.push_str(&group_markup(&dice[*start..start + len])),
		}
	}
	out
}
