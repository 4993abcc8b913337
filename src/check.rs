//! Skill check difficulty tiers and the scoring of resolved checks.

use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::stat::StatisticEvaluation;

/// Difficulty tier of a skill check, from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(clippy::exhaustive_enums)]
pub enum Difficulty {
	/// Rolls a d4
	Trivial,

	/// Rolls a d6
	Easy,

	/// Rolls a d8
	Moderate,

	/// Rolls a d10
	Hard,

	/// Rolls a d12
	Formidable,

	/// Rolls a d20, and ignores advantage and disadvantage
	Impossible,
}

impl Difficulty {
	/// Every difficulty, from easiest to hardest.
	pub const ALL: [Self; 6] = [
		Self::Trivial,
		Self::Easy,
		Self::Moderate,
		Self::Hard,
		Self::Formidable,
		Self::Impossible,
	];

	/// Position of the difficulty in [`Self::ALL`].
	#[must_use]
	#[inline]
	pub const fn tier(self) -> i32 {
		self as i32
	}

	/// Gets the difficulty at a position in [`Self::ALL`], if there is one.
	#[must_use]
	pub fn from_tier(tier: i32) -> Option<Self> {
		Self::ALL.get(usize::try_from(tier).ok()?).copied()
	}

	/// Number of sides on the die rolled for a check of this difficulty.
	#[must_use]
	pub const fn die_sides(self) -> u32 {
		match self {
			Self::Trivial => 4,
			Self::Easy => 6,
			Self::Moderate => 8,
			Self::Hard => 10,
			Self::Formidable => 12,
			Self::Impossible => 20,
		}
	}

	/// Lowercase name of the difficulty.
	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Self::Trivial => "trivial",
			Self::Easy => "easy",
			Self::Moderate => "moderate",
			Self::Hard => "hard",
			Self::Formidable => "formidable",
			Self::Impossible => "impossible",
		}
	}
}

impl fmt::Display for Difficulty {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Difficulty {
	type Err = ParseDifficultyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|difficulty| difficulty.name().eq_ignore_ascii_case(s))
			.ok_or_else(|| ParseDifficultyError(s.to_owned()))
	}
}

/// Error for a difficulty name that doesn't match any [`Difficulty`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown difficulty \"{0}\" (expected one of trivial, easy, moderate, hard, formidable, impossible)")]
#[allow(clippy::exhaustive_structs)]
pub struct ParseDifficultyError(pub String);

/// Difficulty actually rolled against once advantage and disadvantage are taken into account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::exhaustive_structs)]
pub struct EffectiveDifficulty {
	/// Difficulty of the die to roll
	pub roll_difficulty: Difficulty,

	/// Bonus (or penalty, if negative) from advantage (or disadvantage) beyond the range of difficulties
	pub extra_bonus: i32,
}

/// Applies net advantage to a base difficulty. Each point of advantage lowers the difficulty a tier, and each point
/// of disadvantage raises it. Tiers can't go below [`Difficulty::Trivial`] or above [`Difficulty::Formidable`]; any
/// advantage or disadvantage past those limits turns into an extra bonus or penalty instead.
///
/// Checks with a base difficulty of [`Difficulty::Impossible`] aren't affected by advantage at all.
///
/// # Examples
/// ```
/// use charsheet::check::{effective_difficulty, Difficulty, EffectiveDifficulty};
///
/// assert_eq!(
/// 	effective_difficulty(Difficulty::Easy, 3),
/// 	EffectiveDifficulty { roll_difficulty: Difficulty::Trivial, extra_bonus: 2 }
/// );
/// ```
#[must_use]
pub fn effective_difficulty(base: Difficulty, net_advantage: i32) -> EffectiveDifficulty {
	if base == Difficulty::Impossible {
		return EffectiveDifficulty {
			roll_difficulty: base,
			extra_bonus: 0,
		};
	}

	let lowest = Difficulty::Trivial.tier();
	let highest = Difficulty::Formidable.tier();
	let tier = base.tier().saturating_sub(net_advantage);
	let clamped = tier.clamp(lowest, highest);

	EffectiveDifficulty {
		roll_difficulty: Difficulty::from_tier(clamped).unwrap_or(base),
		extra_bonus: clamped.saturating_sub(tier),
	}
}

/// Record of a resolved skill check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCheck {
	stat_id: String,
	evaluation: StatisticEvaluation,
	base_difficulty: Difficulty,
	net_advantage: i32,
	die_roll: u32,
	extra_bonus: i32,
}

impl SkillCheck {
	/// Creates a record of a check. `evaluation` should already include every bonus and penalty, including
	/// `extra_bonus`.
	#[must_use]
	pub fn new(
		stat_id: impl Into<String>,
		evaluation: StatisticEvaluation,
		base_difficulty: Difficulty,
		net_advantage: i32,
		die_roll: u32,
		extra_bonus: i32,
	) -> Self {
		Self {
			stat_id: stat_id.into(),
			evaluation,
			base_difficulty,
			net_advantage,
			die_roll,
			extra_bonus,
		}
	}

	/// Id of the stat the check was made against.
	#[must_use]
	#[inline]
	pub fn stat_id(&self) -> &str {
		&self.stat_id
	}

	/// Evaluation of the stat at the time of the check, with all bonuses and penalties applied.
	#[must_use]
	#[inline]
	pub const fn evaluation(&self) -> &StatisticEvaluation {
		&self.evaluation
	}

	/// Difficulty before advantage was applied.
	#[must_use]
	#[inline]
	pub const fn base_difficulty(&self) -> Difficulty {
		self.base_difficulty
	}

	/// Advantage minus disadvantage. One advantage and two disadvantage is -1.
	#[must_use]
	#[inline]
	pub const fn net_advantage(&self) -> i32 {
		self.net_advantage
	}

	/// Value rolled on the effective difficulty's die.
	#[must_use]
	#[inline]
	pub const fn die_roll(&self) -> u32 {
		self.die_roll
	}

	/// Bonus from advantage beyond the range of difficulties.
	#[must_use]
	#[inline]
	pub const fn extra_bonus(&self) -> i32 {
		self.extra_bonus
	}

	/// Difficulty that was actually rolled.
	#[must_use]
	pub fn effective_difficulty(&self) -> EffectiveDifficulty {
		effective_difficulty(self.base_difficulty, self.net_advantage)
	}

	/// Value of the stat with every bonus and penalty applied.
	#[must_use]
	#[inline]
	pub const fn effective_skill_value(&self) -> f64 {
		self.evaluation.final_value()
	}

	/// Degree of success (when >= 0) or failure (when < 0). Rolling a 1 is always at least a flat success.
	#[must_use]
	pub fn success_degree(&self) -> f64 {
		let degree = f64::from(self.die_roll) - self.effective_skill_value();
		if self.die_roll == 1 && degree < 0.0 {
			0.0
		} else {
			degree
		}
	}

	/// Level of critical success or failure: 0 for a standard result, then one more per 5 points of success degree
	/// (e.g. 2 is a double critical success and -2 a double critical failure).
	#[must_use]
	#[expect(
		clippy::cast_possible_truncation,
		reason = "Degrees come from die rolls and stat levels, far inside i32's range; NaN saturates to 0"
	)]
	pub fn critical_degree(&self) -> i32 {
		(self.success_degree() / 5.0).trunc() as i32
	}

	/// Checks whether the check succeeded.
	#[must_use]
	pub fn is_success(&self) -> bool {
		self.success_degree() >= 0.0
	}
}
