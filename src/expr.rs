//! AST-like data structures for evaluating full mathematical dice formulas and working with their results.

use alloc::{
	boxed::Box,
	collections::BTreeMap,
	format,
	string::{String, ToString},
};
use core::{fmt, mem};

use crate::dice::{Dice, DiceSize, Error as DiceError, RollOptions, Rolled, Roller, MAX_COUNT};

/// Individual elements of a full mathematical dice formula
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Expr {
	/// Standalone integer
	Num(i32),

	/// Dice term, not yet validated or rolled
	Dice(DiceTerm),

	/// Named attribute to be substituted from a [`Context`] before rolling
	Var(String),

	/// Negation of an expression (makes the result of it negative)
	Neg(Box<Self>),

	/// Sum of two expressions
	Add(Box<Self>, Box<Self>),

	/// Difference of two expressions
	Sub(Box<Self>, Box<Self>),

	/// Product of two expressions
	Mul(Box<Self>, Box<Self>),

	/// Integer quotient of two expressions
	Div(Box<Self>, Box<Self>),
}

impl Expr {
	/// Substitutes every variable leaf (including variable dice counts) with its value from the given context,
	/// producing a tree that contains no variables.
	///
	/// Resolution is total and happens before any rolling begins - variables never change value mid-evaluation.
	///
	/// # Errors
	/// If an identifier isn't present in the context, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use fortuna::expr::{Context, Expr};
	///
	/// let context = Context::from_iter([("STR", 3)]);
	/// let expr = Expr::Var("str".into());
	/// assert_eq!(expr.resolve(&context)?, Expr::Num(3));
	/// # Ok::<(), fortuna::expr::EvalError>(())
	/// ```
	pub fn resolve(&self, context: &Context) -> Result<Self, EvalError> {
		Ok(match self {
			Self::Num(x) => Self::Num(*x),
			Self::Dice(term) => Self::Dice(term.resolve(context)?),
			Self::Var(name) => Self::Num(
				context
					.get(name)
					.ok_or_else(|| EvalError::UnknownVariable(name.clone()))?,
			),

			Self::Neg(x) => Self::Neg(Box::new(x.resolve(context)?)),

			Self::Add(a, b) => Self::Add(Box::new(a.resolve(context)?), Box::new(b.resolve(context)?)),
			Self::Sub(a, b) => Self::Sub(Box::new(a.resolve(context)?), Box::new(b.resolve(context)?)),
			Self::Mul(a, b) => Self::Mul(Box::new(a.resolve(context)?), Box::new(b.resolve(context)?)),
			Self::Div(a, b) => Self::Div(Box::new(a.resolve(context)?), Box::new(b.resolve(context)?)),
		})
	}

	/// Evaluates the expression. For most types of expressions, this will directly result in a 1:1 equivalent
	/// [`Evaled`], with the notable exception of [`Expr::Dice`]. For dice terms, the dice they contain are validated
	/// and rolled through the game rules, resulting in an [`Evaled::Dice`] with the [`Rolled`] set of dice.
	///
	/// The first dice term encountered (leftmost in the formula) is rolled as the primary term, which is the only
	/// term advantage/disadvantage and fumble detection apply to.
	///
	/// # Errors
	/// If the tree still contains variables, or a dice term is invalid, or rolling fails, an error variant is
	/// returned.
	pub fn eval(&self, options: &RollOptions, roller: &mut impl Roller) -> Result<Evaled, EvalError> {
		let mut primary = true;
		self.eval_inner(options, roller, &mut primary)
	}

	/// Recursive worker for [`Self::eval()`], threading the primary-term marker through the walk.
	fn eval_inner(
		&self,
		options: &RollOptions,
		roller: &mut impl Roller,
		primary: &mut bool,
	) -> Result<Evaled, EvalError> {
		Ok(match self {
			Self::Num(x) => Evaled::Num(*x),
			Self::Dice(term) => {
				let dice = term.to_dice()?;
				let was_primary = mem::replace(primary, false);
				Evaled::Dice(roller.roll(&dice, options, was_primary)?.into_owned())
			}
			Self::Var(name) => return Err(EvalError::UnknownVariable(name.clone())),

			Self::Neg(x) => Evaled::Neg(Box::new(x.eval_inner(options, roller, primary)?)),

			Self::Add(a, b) => Evaled::Add(
				Box::new(a.eval_inner(options, roller, primary)?),
				Box::new(b.eval_inner(options, roller, primary)?),
			),
			Self::Sub(a, b) => Evaled::Sub(
				Box::new(a.eval_inner(options, roller, primary)?),
				Box::new(b.eval_inner(options, roller, primary)?),
			),
			Self::Mul(a, b) => Evaled::Mul(
				Box::new(a.eval_inner(options, roller, primary)?),
				Box::new(b.eval_inner(options, roller, primary)?),
			),
			Self::Div(a, b) => Evaled::Div(
				Box::new(a.eval_inner(options, roller, primary)?),
				Box::new(b.eval_inner(options, roller, primary)?),
			),
		})
	}

	/// Checks whether the expression is deterministic (will always yield the same value with every evaluation).
	/// A [`Self::Num`] or [`Self::Var`] will always return `true`, a [`Self::Dice`] always `false`, and all unary and
	/// binary expressions forward the check to their children.
	#[must_use]
	pub fn is_deterministic(&self) -> bool {
		match self {
			Self::Num(..) | Self::Var(..) => true,
			Self::Dice(..) => false,
			Self::Neg(x) => x.is_deterministic(),
			Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) | Self::Div(a, b) => {
				a.is_deterministic() && b.is_deterministic()
			}
		}
	}
}

impl HasOpType for Expr {
	fn op_type(&self) -> OpType {
		match self {
			Self::Num(..) | Self::Dice(..) | Self::Var(..) => OpType::Value,
			Self::Neg(..) => OpType::Unary,
			Self::Add(..) | Self::Sub(..) => OpType::Additive,
			Self::Mul(..) | Self::Div(..) => OpType::Multiplicative,
		}
	}
}

impl Describe for Expr {
	/// Builds a full usable formula string from the expressions. Operations are grouped with parentheses whenever
	/// the order of operations could be considered ambiguous, such as when mixing addition and multiplication
	/// together. All strings output from this should result in the exact same expression layout when re-parsing them.
	///
	/// `list_limit` does not affect the output of this implementation in any way since there are no possible lists of
	/// elements included, so it is always safe to pass `None`.
	fn describe(&self, _list_limit: Option<usize>) -> String {
		match self {
			Self::Num(x) => x.to_string(),
			Self::Dice(term) => term.to_string(),
			Self::Var(name) => name.clone(),

			Self::Neg(x) => match x.as_ref() {
				Self::Num(..) | Self::Dice(..) | Self::Var(..) => format!("-{}", x.describe(None)),
				_ => format!("-({})", x.describe(None)),
			},

			Self::Add(a, b) => self.describe_binary_expr('+', a.as_ref(), b.as_ref(), None),
			Self::Sub(a, b) => self.describe_binary_expr('-', a.as_ref(), b.as_ref(), None),
			Self::Mul(a, b) => self.describe_binary_expr('*', a.as_ref(), b.as_ref(), None),
			Self::Div(a, b) => self.describe_binary_expr('/', a.as_ref(), b.as_ref(), None),
		}
	}
}

impl fmt::Display for Expr {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output of this implementation is equivalent to [`Self::describe(None)`].
	///
	/// [`Self::describe(None)`]: Self::describe()
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

/// Dice term as it appears in a parsed formula, before validation.
///
/// The side count is an arbitrary number and the die count may still be an identifier at this stage; both are checked
/// only when the term is rolled, so that `1d7` parses successfully but fails to evaluate, and `STRd6` can carry its
/// attribute name until resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct DiceTerm {
	/// Number of dice to roll - a number, or an identifier to be resolved
	pub count: DiceCount,

	/// Raw side count as written in the formula
	pub sides: u32,

	/// Whether the term carried the exploding (`!`) suffix
	pub exploding: bool,

	/// Whether the term carried the vicious (`v`) suffix
	pub vicious: bool,
}

impl DiceTerm {
	/// Substitutes a variable die count with its value from the given context.
	///
	/// # Errors
	/// If the count is an identifier that isn't present in the context, an error variant is returned.
	pub fn resolve(&self, context: &Context) -> Result<Self, EvalError> {
		Ok(match &self.count {
			DiceCount::Fixed(..) => self.clone(),
			DiceCount::Var(name) => {
				let value = context
					.get(name)
					.ok_or_else(|| EvalError::UnknownVariable(name.clone()))?;
				Self {
					count: DiceCount::Fixed(i64::from(value)),
					..self.clone()
				}
			}
		})
	}

	/// Validates the term into rollable [`Dice`].
	///
	/// # Errors
	/// If the count is still an identifier, or outside `1..=20`, or the side count isn't a permitted size, an error
	/// variant is returned.
	///
	/// # Examples
	/// ```
	/// use fortuna::expr::{DiceCount, DiceTerm};
	///
	/// let term = DiceTerm {
	/// 	count: DiceCount::Fixed(1),
	/// 	sides: 7,
	/// 	exploding: false,
	/// 	vicious: false,
	/// };
	/// assert_eq!(term.to_dice().unwrap_err().to_string(), "Invalid dice type: d7");
	/// ```
	pub fn to_dice(&self) -> Result<Dice, EvalError> {
		let count = match &self.count {
			DiceCount::Fixed(n) => u8::try_from(*n)
				.ok()
				.filter(|count| (1..=MAX_COUNT).contains(count))
				.ok_or(EvalError::Dice(DiceError::InvalidCount(*n)))?,
			DiceCount::Var(name) => return Err(EvalError::UnknownVariable(name.clone())),
		};
		let size = DiceSize::from_sides(self.sides)?;

		Ok(Dice {
			count,
			size,
			exploding: self.exploding,
			vicious: self.vicious,
		})
	}
}

impl fmt::Display for DiceTerm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}d{}{}{}",
			self.count,
			self.sides,
			if self.exploding { "!" } else { "" },
			if self.vicious { "v" } else { "" }
		)
	}
}

/// Die count of a [`DiceTerm`]: either written as a number, or an identifier standing in for one (as in `STRd6`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(clippy::exhaustive_enums, reason = "A count is either known or named; no logical fallback")]
pub enum DiceCount {
	/// Literal or already-resolved count
	Fixed(i64),

	/// Attribute name to be resolved from a [`Context`]
	Var(String),
}

impl fmt::Display for DiceCount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Fixed(n) => write!(f, "{n}"),
			Self::Var(name) => f.write_str(name),
		}
	}
}

/// Case-insensitive map of attribute names to values, supplied by the character layer.
///
/// # Examples
/// ```
/// use fortuna::expr::Context;
///
/// let mut context = Context::new();
/// context.set("STR", 4);
/// assert_eq!(context.get("str"), Some(4));
/// assert_eq!(context.get("Str"), Some(4));
/// assert_eq!(context.get("dex"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context(BTreeMap<String, i32>);

impl Context {
	/// Creates a new empty context.
	#[must_use]
	pub const fn new() -> Self {
		Self(BTreeMap::new())
	}

	/// Sets the value of a named attribute. Names are stored case-insensitively.
	pub fn set(&mut self, name: &str, value: i32) {
		self.0.insert(name.to_lowercase(), value);
	}

	/// Gets the value of a named attribute, ignoring case.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<i32> {
		self.0.get(&name.to_lowercase()).copied()
	}

	/// Checks whether the context contains no attributes.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Counts the attributes in the context.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}
}

impl<'a> FromIterator<(&'a str, i32)> for Context {
	fn from_iter<T: IntoIterator<Item = (&'a str, i32)>>(iter: T) -> Self {
		let mut context = Self::new();
		for (name, value) in iter {
			context.set(name, value);
		}
		context
	}
}

/// Individual elements of an evaluated mathematical dice formula
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Evaled {
	/// Standalone integer
	Num(i32),

	/// Rolled dice
	Dice(Rolled<'static>),

	/// Negation of an expression (makes the result of it negative)
	Neg(Box<Self>),

	/// Sum of two expressions
	Add(Box<Self>, Box<Self>),

	/// Difference of two expressions
	Sub(Box<Self>, Box<Self>),

	/// Product of two expressions
	Mul(Box<Self>, Box<Self>),

	/// Integer quotient of two expressions
	Div(Box<Self>, Box<Self>),
}

impl Evaled {
	/// Calculates the final result of the evaluated expression and all of its children (if any).
	/// Dice leaves contribute the sum of only their kept dice values.
	///
	/// # Errors
	/// If there is an integer overflow or a division by zero, an error variant will be returned.
	pub fn calc(&self) -> Result<i32, CalcError> {
		match self {
			Self::Num(x) => Ok(*x),
			Self::Dice(rolled) => Ok(i32::from(rolled.total()?)),

			Self::Neg(x) => x.calc()?.checked_neg().ok_or(CalcError::Overflow),

			Self::Add(a, b) => a.calc()?.checked_add(b.calc()?).ok_or(CalcError::Overflow),
			Self::Sub(a, b) => a.calc()?.checked_sub(b.calc()?).ok_or(CalcError::Overflow),
			Self::Mul(a, b) => a.calc()?.checked_mul(b.calc()?).ok_or(CalcError::Overflow),
			Self::Div(a, b) => {
				let divisor = b.calc()?;
				if divisor == 0 {
					return Err(CalcError::DivisionByZero);
				}
				a.calc()?.checked_div(divisor).ok_or(CalcError::Overflow)
			}
		}
	}
}

impl HasOpType for Evaled {
	fn op_type(&self) -> OpType {
		match self {
			Self::Num(..) | Self::Dice(..) => OpType::Value,
			Self::Neg(..) => OpType::Unary,
			Self::Add(..) | Self::Sub(..) => OpType::Additive,
			Self::Mul(..) | Self::Div(..) => OpType::Multiplicative,
		}
	}
}

impl Describe for Evaled {
	fn describe(&self, list_limit: Option<usize>) -> String {
		match self {
			Self::Num(x) => x.to_string(),
			Self::Dice(rolled) => rolled.describe(list_limit),

			Self::Neg(x) => match x.as_ref() {
				Self::Num(..) | Self::Dice(..) => format!("-{}", x.describe(list_limit)),
				_ => format!("-({})", x.describe(list_limit)),
			},

			Self::Add(a, b) => self.describe_binary_expr('+', a.as_ref(), b.as_ref(), list_limit),
			Self::Sub(a, b) => self.describe_binary_expr('-', a.as_ref(), b.as_ref(), list_limit),
			Self::Mul(a, b) => self.describe_binary_expr('*', a.as_ref(), b.as_ref(), list_limit),
			Self::Div(a, b) => self.describe_binary_expr('/', a.as_ref(), b.as_ref(), list_limit),
		}
	}
}

impl fmt::Display for Evaled {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output of this implementation is equivalent to [`Self::describe(None)`].
	///
	/// [`Self::describe(None)`]: Self::describe()
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

/// Error that can occur while resolving or evaluating an [`Expr`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
	/// An identifier couldn't be found in the supplied [`Context`].
	#[error("Unknown variable: {0}")]
	UnknownVariable(String),

	/// Dice-related error (invalid term or failed roll)
	#[error(transparent)]
	Dice(#[from] DiceError),
}

/// Error that can occur during [`Evaled::calc()`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CalcError {
	/// Dice-related error (likely during totalling)
	#[error(transparent)]
	Dice(#[from] DiceError),

	/// A division had a zero divisor at runtime.
	#[error("Division by zero")]
	DivisionByZero,

	/// Integer overflow (likely during calculation of a sum or product)
	#[error("integer overflow")]
	Overflow,
}

/// Operation type for an individual expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum OpType {
	/// Single value, no operation
	Value,

	/// Unary operation
	Unary,

	/// Additive operation (sum or difference)
	Additive,

	/// Multiplicative operation (product or quotient)
	Multiplicative,
}

/// Trait that offers [`OpType`]-related information
pub trait HasOpType {
	/// Gets the type of this expression.
	fn op_type(&self) -> OpType;

	/// Checks whether this expression is a single value.
	fn is_value(&self) -> bool {
		self.op_type() == OpType::Value
	}

	/// Checks whether this expression is a unary operation.
	fn is_unary(&self) -> bool {
		self.op_type() == OpType::Unary
	}

	/// Checks whether this expression is a binary (additive or multiplicative) operation.
	fn is_binary(&self) -> bool {
		matches!(self.op_type(), OpType::Additive | OpType::Multiplicative)
	}
}

/// Decides whether a binary expression's child needs parentheses to disambiguate mixed additive/multiplicative
/// operations, based on the operation types of the parent and the child.
pub(crate) const fn binary_child_parens(parent: OpType, child: OpType) -> bool {
	matches!(
		(parent, child),
		(OpType::Additive | OpType::Unary, OpType::Multiplicative)
			| (OpType::Multiplicative | OpType::Unary, OpType::Additive)
			| (OpType::Unary, OpType::Unary)
	)
}

/// Trait to allow creation of expanded descriptions with an optional max number of individual listed results where
/// applicable
pub trait Describe {
	/// Builds a detailed expression string with additional information about non-deterministic elements.
	/// Any elements of the expression that can have a different result between multiple evaluations or multiple
	/// results should list all of the specific individual results that occurred (ideally, up to `list_limit` of
	/// them).
	#[must_use]
	fn describe(&self, list_limit: Option<usize>) -> String;
}

/// Trait for describing binary expressions with influence from own type.
/// Used for wrapping parentheses around parts of expressions based on [`OpType`] of self and the expression.
trait DescribeBinaryExpr: HasOpType + Describe {
	/// Builds a detailed description for a binary expression with parentheses added to disambiguate mixed
	/// additive/multiplicative operations.
	fn describe_binary_expr(
		&self,
		op: char,
		a: &impl DescribeBinaryExpr,
		b: &impl DescribeBinaryExpr,
		list_limit: Option<usize>,
	) -> String {
		format!(
			"{} {} {}",
			if binary_child_parens(self.op_type(), a.op_type()) {
				paren_wrap(a.describe(list_limit))
			} else {
				a.describe(list_limit)
			},
			op,
			if binary_child_parens(self.op_type(), b.op_type()) {
				paren_wrap(b.describe(list_limit))
			} else {
				b.describe(list_limit)
			}
		)
	}
}

impl<T: HasOpType + Describe> DescribeBinaryExpr for T {}

/// Wraps a string in parentheses.
#[must_use]
fn paren_wrap(mut text: String) -> String {
	text.insert(0, '(');
	text.push(')');
	text
}
