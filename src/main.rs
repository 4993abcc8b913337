use std::{
	fs,
	path::{Path, PathBuf},
	process::ExitCode,
};

use charsheet::{
	check::Difficulty,
	diagnostic,
	eval::NoStats,
	persist::CharacterSnapshot,
	roller::FastRand,
	Character, Formula, Ruleset,
};
use clap::{Args, Parser, Subcommand};

/// Evaluates character sheet formulas and rolls skill checks
#[derive(Parser)]
#[command(name = "charsheet", version, about, long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Evaluate a formula, optionally against a character
	Eval {
		/// Formula to evaluate (multiple arguments are joined with spaces, so it can be left unquoted)
		#[arg(required = true)]
		formula: Vec<String>,

		#[command(flatten)]
		sheet: SheetArgs,
	},

	/// Roll a skill check for a character
	Check {
		/// Id of the stat to check
		stat: String,

		/// Base difficulty of the check
		#[arg(short, long, default_value_t = Difficulty::Moderate)]
		difficulty: Difficulty,

		/// Net advantage (negative for disadvantage)
		#[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
		advantage: i32,

		/// Net bonus (negative for a penalty)
		#[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
		bonus: i32,

		#[command(flatten)]
		sheet: SheetArgs,
	},
}

#[derive(Args)]
struct SheetArgs {
	/// Game content JSON to build the character from
	#[arg(long)]
	content: Option<PathBuf>,

	/// Saved character JSON to apply (requires --content)
	#[arg(long, requires = "content")]
	character: Option<PathBuf>,

	/// Seed for dice rolls
	#[arg(long)]
	seed: Option<u64>,
}

impl SheetArgs {
	/// Builds the character described by the arguments, if content was given.
	fn load_character(&self) -> Result<Option<Character>, CliError> {
		let Some(content) = &self.content else {
			return Ok(None);
		};

		let ruleset = Ruleset::from_json(&read(content)?)?;
		let character = match &self.character {
			Some(path) => Character::from_snapshot(&ruleset, &CharacterSnapshot::from_json(&read(path)?)?),
			None => Character::new(&ruleset),
		};
		Ok(Some(character))
	}

	fn roller(&self) -> FastRand {
		self.seed.map_or_else(FastRand::default, FastRand::with_seed)
	}
}

/// Error that ends the program
#[derive(thiserror::Error, Debug)]
enum CliError {
	#[error("unable to read {path}: {source}")]
	Io { path: PathBuf, source: std::io::Error },

	#[error(transparent)]
	Content(#[from] charsheet::content::ContentError),

	#[error(transparent)]
	Persist(#[from] charsheet::persist::PersistError),

	#[error(transparent)]
	Eval(#[from] charsheet::eval::EvalError),

	#[error("skill checks need game content (--content)")]
	MissingContent,

	#[error("no stat with id \"{0}\"")]
	UnknownStat(String),

	/// Diagnostics have already been printed.
	#[error("formula is invalid")]
	InvalidFormula,
}

fn read(path: &Path) -> Result<String, CliError> {
	fs::read_to_string(path).map_err(|source| CliError::Io {
		path: path.to_owned(),
		source,
	})
}

fn eval(formula: &str, sheet: &SheetArgs) -> Result<(), CliError> {
	let parsed = match Formula::parse(formula) {
		Ok(parsed) => parsed,
		Err(err) => {
			eprint!("{}", diagnostic::render(formula, &err.diagnostics));
			return Err(CliError::InvalidFormula);
		}
	};
	if !parsed.diagnostics().is_empty() {
		eprint!("{}", diagnostic::render(formula, parsed.diagnostics()));
	}

	println!("Parsed: {}", parsed.term());
	println!("Deterministic: {}", parsed.term().is_deterministic());

	let mut roller = sheet.roller();
	let evaled = match sheet.load_character()? {
		Some(character) => parsed.eval(&character, &mut roller),
		None => parsed.eval(&NoStats, &mut roller),
	}
	.inspect_err(|err| {
		if let Some(diag) = err.diagnostic() {
			eprint!("{}", diagnostic::render(formula, &[diag]));
		}
	})?;

	println!("Described: {evaled}");
	for unresolved in evaled.unresolved_stats() {
		eprintln!("warning: no stat with id \"{unresolved}\", treated as 0");
	}
	println!("Total: {}", evaled.value);
	Ok(())
}

fn check(stat: &str, difficulty: Difficulty, advantage: i32, bonus: i32, sheet: &SheetArgs) -> Result<(), CliError> {
	let mut character = sheet.load_character()?.ok_or(CliError::MissingContent)?;
	let mut roller = sheet.roller();
	let check = character
		.roll_skill_check(stat, difficulty, advantage, bonus, &mut roller)?
		.ok_or_else(|| CliError::UnknownStat(stat.to_owned()))?;

	let effective = check.effective_difficulty();
	let evaluation = check.evaluation();
	println!(
		"{} check ({} -> {}, d{})",
		check.stat_id(),
		check.base_difficulty(),
		effective.roll_difficulty,
		effective.roll_difficulty.die_sides()
	);
	println!("Base value: {}", evaluation.base_value());
	for modification in evaluation.modifications() {
		println!(
			"  {} ({}): {:+}",
			modification.display_name, modification.display_formula, modification.amount
		);
	}
	println!("Skill value: {}", check.effective_skill_value());
	println!("Rolled: {}", check.die_roll());
	println!(
		"{} (degree {}, critical {})",
		if check.is_success() { "Success" } else { "Failure" },
		check.success_degree(),
		check.critical_degree()
	);
	Ok(())
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let result = match &cli.command {
		Command::Eval { formula, sheet } => eval(&formula.join(" "), sheet),
		Command::Check {
			stat,
			difficulty,
			advantage,
			bonus,
			sheet,
		} => check(stat, *difficulty, *advantage, *bonus, sheet),
	};

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(CliError::InvalidFormula) => ExitCode::FAILURE,
		Err(err) => {
			eprintln!("error: {err}");
			ExitCode::FAILURE
		}
	}
}
