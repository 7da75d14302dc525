use alloc::boxed::Box;

use crate::{
	dice::{Dice, DiceSize},
	expr::{DiceCount, DiceTerm, Expr},
};

fn term(count: i64, sides: u32) -> DiceTerm {
	DiceTerm {
		count: DiceCount::Fixed(count),
		sides,
		exploding: false,
		vicious: false,
	}
}

fn parse(formula: &str) -> Expr {
	formula.parse().unwrap()
}

#[test]
fn basic_dice() {
	assert_eq!(parse("2d6"), Expr::Dice(term(2, 6)));
}

#[test]
fn omitted_count_defaults_to_one() {
	assert_eq!(parse("d20"), Expr::Dice(term(1, 20)));
}

#[test]
fn identifier_count() {
	assert_eq!(
		parse("strd6"),
		Expr::Dice(DiceTerm {
			count: DiceCount::Var("str".into()),
			sides: 6,
			exploding: false,
			vicious: false,
		})
	);
}

#[test]
fn suffixes_in_either_order() {
	let mut expected = term(1, 20);
	expected.exploding = true;
	expected.vicious = true;

	assert_eq!(parse("1d20!v"), Expr::Dice(expected.clone()));
	assert_eq!(parse("1d20v!"), Expr::Dice(expected));
}

#[test]
fn vicious_suffix_inside_word() {
	let mut expected = term(1, 8);
	expected.vicious = true;
	assert_eq!(parse("d8v"), Expr::Dice(expected));
}

#[test]
fn exploding_after_word() {
	let mut expected = term(1, 8);
	expected.exploding = true;
	assert_eq!(parse("d8!"), Expr::Dice(expected));

	let expected = DiceTerm {
		count: DiceCount::Var("str".into()),
		sides: 6,
		exploding: true,
		vicious: true,
	};
	assert_eq!(parse("strd6v!"), Expr::Dice(expected));
}

#[test]
fn plain_variable() {
	assert_eq!(parse("str"), Expr::Var("str".into()));
}

#[test]
fn case_insensitive_via_fromstr() {
	assert_eq!(
		parse("2D6 + STR"),
		Expr::Add(Box::new(Expr::Dice(term(2, 6))), Box::new(Expr::Var("str".into())))
	);
}

#[test]
fn arithmetic_precedence() {
	assert_eq!(
		parse("1 + 2 * 3"),
		Expr::Add(
			Box::new(Expr::Num(1)),
			Box::new(Expr::Mul(Box::new(Expr::Num(2)), Box::new(Expr::Num(3))))
		)
	);
}

#[test]
fn parentheses_group() {
	assert_eq!(
		parse("(2d6 + 3) * 2"),
		Expr::Mul(
			Box::new(Expr::Add(Box::new(Expr::Dice(term(2, 6))), Box::new(Expr::Num(3)))),
			Box::new(Expr::Num(2))
		)
	);
}

#[test]
fn unary_negation() {
	assert_eq!(parse("-d20"), Expr::Neg(Box::new(Expr::Dice(term(1, 20)))));
}

#[test]
fn surrounding_whitespace() {
	assert_eq!(parse(" 2d6 + 5 "), parse("2d6+5"));
}

#[test]
fn unsupported_sides_parse_fine() {
	// Size validation is an evaluation concern, not a parse concern
	assert_eq!(parse("1d7"), Expr::Dice(term(1, 7)));
}

#[test]
fn malformed_formulas() {
	assert!("2d6 +".parse::<Expr>().is_err());
	assert!("(2d6".parse::<Expr>().is_err());
	assert!("2d".parse::<Expr>().is_err());
	assert!("2d6 $ 3".parse::<Expr>().is_err());
	assert!("str!".parse::<Expr>().is_err());
	assert!("".parse::<Expr>().is_err());
}

#[test]
fn display_reparses_to_same_tree() {
	for formula in ["2d6! + 5 * 2", "-(2d6 + 3) * 2", "strd6v + d20 - 4"] {
		let parsed = parse(formula);
		assert_eq!(parse(&parsed.to_string()), parsed);
	}
}

#[test]
fn dice_fromstr() {
	let dice: Dice = "2d6!".parse().unwrap();
	assert_eq!(dice, Dice::builder().count(2).size(DiceSize::D6).exploding().build());
}

#[test]
fn dice_fromstr_validates() {
	assert_eq!("1d7".parse::<Dice>().unwrap_err().to_string(), "Invalid dice type: d7");
	assert_eq!(
		"strd6".parse::<Dice>().unwrap_err().to_string(),
		"Unknown variable: str"
	);
	assert!("2d6 + 1".parse::<Dice>().is_err());
}
