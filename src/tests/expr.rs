use alloc::boxed::Box;

use crate::{
	dice::{
		roller::{Iter, Val},
		Error as DiceError, RollOptions,
	},
	expr::{CalcError, Context, Describe, DiceCount, DiceTerm, EvalError, Evaled, Expr},
};

fn term(count: i64, sides: u32) -> DiceTerm {
	DiceTerm {
		count: DiceCount::Fixed(count),
		sides,
		exploding: false,
		vicious: false,
	}
}

fn calc(expr: &Expr) -> Result<i32, CalcError> {
	expr.eval(&RollOptions::default(), &mut Val(1)).unwrap().calc()
}

#[test]
fn basic_negation() {
	let expr = Expr::Neg(Box::new(Expr::Num(42)));
	assert_eq!(calc(&expr).unwrap(), -42);
}

#[test]
fn basic_addition() {
	let expr = Expr::Add(Box::new(Expr::Num(42)), Box::new(Expr::Num(69)));
	assert_eq!(calc(&expr).unwrap(), 111);
}

#[test]
fn basic_subtraction() {
	let expr = Expr::Sub(Box::new(Expr::Num(42)), Box::new(Expr::Num(69)));
	assert_eq!(calc(&expr).unwrap(), -27);
}

#[test]
fn basic_multiplication() {
	let expr = Expr::Mul(Box::new(Expr::Num(42)), Box::new(Expr::Num(69)));
	assert_eq!(calc(&expr).unwrap(), 2898);
}

#[test]
fn basic_division() {
	let expr = Expr::Div(Box::new(Expr::Num(50)), Box::new(Expr::Num(11)));
	assert_eq!(calc(&expr).unwrap(), 4);
}

#[test]
fn complex_math() {
	let expr = Expr::Sub(
		Box::new(Expr::Mul(
			Box::new(Expr::Neg(Box::new(Expr::Num(5)))),
			Box::new(Expr::Add(Box::new(Expr::Num(3)), Box::new(Expr::Num(1)))),
		)),
		Box::new(Expr::Div(
			Box::new(Expr::Neg(Box::new(Expr::Num(4)))),
			Box::new(Expr::Num(2)),
		)),
	);
	assert_eq!(calc(&expr).unwrap(), -18);
}

#[test]
fn division_by_zero() {
	let expr = Expr::Div(Box::new(Expr::Num(1)), Box::new(Expr::Num(0)));
	let result = calc(&expr);
	assert_eq!(result.unwrap_err(), CalcError::DivisionByZero);
	assert_eq!(CalcError::DivisionByZero.to_string(), "Division by zero");
}

#[test]
fn calc_overflow() {
	let expr = Expr::Add(Box::new(Expr::Num(i32::MAX)), Box::new(Expr::Num(1)));
	assert_eq!(calc(&expr).unwrap_err(), CalcError::Overflow);
}

#[test]
fn basic_dice_math() {
	let expr = Expr::Add(Box::new(Expr::Dice(term(2, 6))), Box::new(Expr::Num(8)));
	let evaled = expr.eval(&RollOptions::default(), &mut Iter::new([3, 5])).unwrap();

	assert_eq!(evaled.calc().unwrap(), 16);
	assert_eq!(evaled.describe(None), "2d6[3, 5] + 8");
}

#[test]
fn dropped_dice_excluded_from_total() {
	let options = RollOptions {
		advantage: 1,
		..RollOptions::default()
	};
	let expr = Expr::Dice(term(1, 20));
	let evaled = expr.eval(&options, &mut Iter::new([8, 14])).unwrap();
	assert_eq!(evaled.calc().unwrap(), 14);
}

#[test]
fn resolve_variable() {
	let context = Context::from_iter([("str", 4)]);
	let expr = Expr::Var("str".into());
	assert_eq!(expr.resolve(&context).unwrap(), Expr::Num(4));
}

#[test]
fn resolve_is_case_insensitive() {
	let mut context = Context::new();
	context.set("STR", 4);
	let expr = Expr::Var("sTr".into());
	assert_eq!(expr.resolve(&context).unwrap(), Expr::Num(4));
}

#[test]
fn resolve_unknown_variable() {
	let expr = Expr::Var("dex".into());
	let err = expr.resolve(&Context::new()).unwrap_err();
	assert_eq!(err, EvalError::UnknownVariable("dex".into()));
	assert_eq!(err.to_string(), "Unknown variable: dex");
}

#[test]
fn resolve_variable_dice_count() {
	let context = Context::from_iter([("str", 2)]);
	let expr = Expr::Dice(DiceTerm {
		count: DiceCount::Var("str".into()),
		sides: 6,
		exploding: false,
		vicious: false,
	});

	let resolved = expr.resolve(&context).unwrap();
	assert_eq!(resolved, Expr::Dice(term(2, 6)));

	let evaled = resolved.eval(&RollOptions::default(), &mut Iter::new([3, 4])).unwrap();
	assert_eq!(evaled.calc().unwrap(), 7);
}

#[test]
fn resolve_happens_deeply() {
	let context = Context::from_iter([("str", 3), ("dex", 1)]);
	let expr = Expr::Add(
		Box::new(Expr::Var("str".into())),
		Box::new(Expr::Neg(Box::new(Expr::Var("dex".into())))),
	);
	let resolved = expr.resolve(&context).unwrap();
	assert_eq!(calc(&resolved).unwrap(), 2);
}

#[test]
fn eval_rejects_unresolved_variables() {
	let expr = Expr::Var("str".into());
	let err = expr.eval(&RollOptions::default(), &mut Val(1)).unwrap_err();
	assert!(matches!(err, EvalError::UnknownVariable(..)));
}

#[test]
fn invalid_dice_type_at_eval() {
	let err = term(1, 7).to_dice().unwrap_err();
	assert_eq!(err.to_string(), "Invalid dice type: d7");
	assert_eq!(err, EvalError::Dice(DiceError::InvalidType(7)));
}

#[test]
fn invalid_dice_count_at_eval() {
	assert_eq!(
		term(0, 6).to_dice().unwrap_err(),
		EvalError::Dice(DiceError::InvalidCount(0))
	);
	assert_eq!(
		term(21, 6).to_dice().unwrap_err(),
		EvalError::Dice(DiceError::InvalidCount(21))
	);
	assert_eq!(
		term(-3, 6).to_dice().unwrap_err(),
		EvalError::Dice(DiceError::InvalidCount(-3))
	);
}

#[test]
fn advantage_applies_to_first_term_only() {
	let options = RollOptions {
		advantage: 1,
		..RollOptions::default()
	};
	let expr = Expr::Add(Box::new(Expr::Dice(term(1, 20))), Box::new(Expr::Dice(term(1, 20))));
	let evaled = expr.eval(&options, &mut Iter::new([14, 8, 5])).unwrap();

	let Evaled::Add(first, second) = &evaled else {
		panic!("expected an addition");
	};
	let (Evaled::Dice(first), Evaled::Dice(second)) = (first.as_ref(), second.as_ref()) else {
		panic!("expected dice on both sides");
	};

	assert_eq!(first.rolls.len(), 2);
	assert_eq!(second.rolls.len(), 1);
	assert_eq!(evaled.calc().unwrap(), 19);
}

#[test]
fn term_display() {
	assert_eq!(term(2, 6).to_string(), "2d6");

	let mut exploding = term(1, 20);
	exploding.exploding = true;
	exploding.vicious = true;
	assert_eq!(exploding.to_string(), "1d20!v");

	let named = DiceTerm {
		count: DiceCount::Var("str".into()),
		sides: 6,
		exploding: false,
		vicious: false,
	};
	assert_eq!(named.to_string(), "strd6");
}

#[test]
fn expr_display_disambiguates() {
	let expr = Expr::Mul(
		Box::new(Expr::Add(Box::new(Expr::Dice(term(2, 6))), Box::new(Expr::Num(3)))),
		Box::new(Expr::Num(2)),
	);
	assert_eq!(expr.to_string(), "(2d6 + 3) * 2");
}

#[test]
fn determinism_check() {
	assert!(Expr::Num(4).is_deterministic());
	assert!(Expr::Var("str".into()).is_deterministic());
	assert!(!Expr::Dice(term(1, 20)).is_deterministic());
	assert!(!Expr::Add(Box::new(Expr::Num(4)), Box::new(Expr::Dice(term(1, 20)))).is_deterministic());
}

#[test]
fn context_accessors() {
	let mut context = Context::new();
	assert!(context.is_empty());
	context.set("str", 4);
	context.set("STR", 5);
	assert_eq!(context.len(), 1);
	assert_eq!(context.get("Str"), Some(5));
}
