use alloc::string::{String, ToString};

use crate::{
	dice::{DiceSize, DieCategory, DieRoll},
	display::{die_markup, format, group_markup, Segment, Skeleton},
};

fn die(val: u8, category: DieCategory, index: usize) -> DieRoll {
	DieRoll {
		val,
		size: DiceSize::D6,
		category,
		index,
	}
}

#[test]
fn markup_per_category() {
	assert_eq!(die_markup(&die(4, DieCategory::Normal, 0)), "4");
	assert_eq!(die_markup(&die(4, DieCategory::Dropped, 0)), "~~4~~");
	assert_eq!(die_markup(&die(6, DieCategory::Critical, 0)), "**6!**");
	assert_eq!(die_markup(&die(6, DieCategory::Vicious, 0)), "**6v**");
	assert_eq!(die_markup(&die(1, DieCategory::Fumble, 0)), "**1\u{2717}**");
}

#[test]
fn kept_run_joined_with_plus() {
	let dice = [die(3, DieCategory::Normal, 0), die(5, DieCategory::Normal, 1)];
	assert_eq!(group_markup(&dice), "(3 + 5)");
}

#[test]
fn dropped_runs_grouped_separately() {
	let dice = [
		die(4, DieCategory::Normal, 0),
		die(2, DieCategory::Dropped, 1),
		die(5, DieCategory::Dropped, 2),
		die(6, DieCategory::Normal, 3),
	];
	assert_eq!(group_markup(&dice), "(4) (~~2~~, ~~5~~) (6)");
}

#[test]
fn appended_dice_render_in_roll_order() {
	let dice = [
		die(6, DieCategory::Normal, 0),
		die(6, DieCategory::Critical, 1),
		die(2, DieCategory::Critical, 2),
	];
	assert_eq!(group_markup(&dice), "(6 + **6!** + **2!**)");
}

#[test]
fn format_weaves_text_and_dice() {
	let dice = [die(3, DieCategory::Normal, 0), die(5, DieCategory::Normal, 1)];
	let skeleton = Skeleton {
		segments: alloc::vec![
			Segment::Dice { start: 0, len: 2 },
			Segment::Text(" + 5".to_string()),
		],
	};

	assert_eq!(format(&dice, &skeleton), "(3 + 5) + 5");
}

#[test]
fn format_is_pure() {
	let dice = [die(3, DieCategory::Normal, 0), die(5, DieCategory::Dropped, 1)];
	let skeleton = Skeleton {
		segments: alloc::vec![
			Segment::Text("2 * ".to_string()),
			Segment::Dice { start: 0, len: 2 },
		],
	};

	let first = format(&dice, &skeleton);
	let second = format(&dice, &skeleton);
	assert_eq!(first, second);
	assert_eq!(first, "2 * (3) (~~5~~)");
}

#[test]
fn skeleton_before_and_after() {
	let skeleton = Skeleton {
		segments: alloc::vec![
			Segment::Text("(".to_string()),
			Segment::Dice { start: 0, len: 2 },
			Segment::Text(" + 3".to_string()),
			Segment::Text(") * 2".to_string()),
		],
	};

	assert_eq!(skeleton.before().as_deref(), Some("("));
	assert_eq!(skeleton.after().as_deref(), Some(" + 3) * 2"));
}

#[test]
fn skeleton_without_dice_has_no_surroundings() {
	let skeleton = Skeleton {
		segments: alloc::vec![Segment::Text("3 + 4".to_string())],
	};

	assert_eq!(skeleton.before(), None);
	assert_eq!(skeleton.after(), None);
	assert_eq!(format(&[], &skeleton), "3 + 4");
}

#[test]
fn empty_text_surroundings_are_none() {
	let skeleton = Skeleton {
		segments: alloc::vec![Segment::Dice { start: 0, len: 1 }],
	};

	assert_eq!(skeleton.before(), None);
	assert_eq!(skeleton.after(), None);
}

#[test]
fn markup_is_plain_string() {
	let rendered: String = die_markup(&die(6, DieCategory::Critical, 0));
	assert!(rendered.starts_with("**"));
	assert!(rendered.ends_with("**"));
}
