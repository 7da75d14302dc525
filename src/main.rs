#[cfg(feature = "build-binary")]
fn main() {
	use std::env;
	use std::io::{self, Write};

	use ariadne::{Color, Label, Report, ReportKind, Source};
	use chumsky::Parser;

	use fortuna::dice::{roller::FastRand, RollOptions};
	use fortuna::expr::Context;

	let mut options = RollOptions::default();
	let mut context = Context::new();
	let mut words = Vec::new();

	for arg in env::args().skip(1) {
		match arg.as_str() {
			"--adv" => options.advantage = options.advantage.saturating_add(1),
			"--dis" => options.advantage = options.advantage.saturating_sub(1),
			"--vicious" => options.vicious = true,
			"--no-crits" => options.criticals = false,
			"--no-fumbles" => options.fumbles = false,
			_ => match arg.split_once('=') {
				Some((name, value)) => match value.parse() {
					Ok(value) => context.set(name, value),
					Err(err) => {
						eprintln!("Invalid value for variable {name}: {err}");
						return;
					}
				},
				None => words.push(arg),
			},
		}
	}

	let input = if words.is_empty() {
		let mut lines = io::stdin().lines();

		// If there isn't already input available in stdin, display a prompt for it
		if lines.size_hint().1.is_none() {
			print!("Enter dice formula: ");
			io::stdout().flush().unwrap();
		}

		// Grab the first line available from stdin
		lines.next().unwrap().unwrap()
	} else {
		// Combining all non-flag args lets the formula be left unquoted even with spaces
		words.join(" ")
	};

	let formula = input.trim();
	let lowered = formula.to_lowercase();

	match fortuna::parser().parse(&lowered).into_result() {
		Ok(ast) => {
			println!("Formula: {ast}");

			match fortuna::formula::evaluate_expr(formula, &ast, &context, &options, &mut FastRand::default()) {
				Ok(result) => {
					println!("Rolled: {}", result.display);
					println!("Total: {}", result.total);
					if let Some(data) = result.dice {
						if data.fumble {
							println!("Fumble!");
						}
						if data.criticals > 0 {
							println!("Criticals: {}", data.criticals);
						}
					}
				}
				Err(eval_err) => eprintln!("Error rolling dice: {eval_err}"),
			}
		}
		Err(parse_errs) => {
			for err in parse_errs {
				Report::build(ReportKind::Error, ("formula", err.span().into_range()))
					.with_message(err.to_string())
					.with_label(
						Label::new(("formula", err.span().into_range()))
							.with_message(err.reason().to_string())
							.with_color(Color::Red),
					)
					.finish()
					.eprint(("formula", Source::from(&lowered)))
					.unwrap();
			}
		}
	}
}

#[cfg(not(feature = "build-binary"))]
fn main() {
	println!("Nothing to do since the build-binary feature is disabled.")
}
