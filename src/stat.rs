//! Character statistics: leveled attributes and skills, formula-derived stats, and evaluated stat values.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::parse::Formula;

/// Leveling state of an upgradable stat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::exhaustive_structs)]
pub struct Progress {
	/// Number of levels gained
	pub upgrade_level: u32,

	/// Points accumulated towards the next level
	pub upgrade_points: u32,
}

impl Progress {
	/// Creates progress at a given level and point count.
	#[must_use]
	#[inline]
	pub const fn new(upgrade_level: u32, upgrade_points: u32) -> Self {
		Self {
			upgrade_level,
			upgrade_points,
		}
	}

	/// Lists what changed between this progress and `after`, level first. Unchanged fields are left out.
	#[must_use]
	pub fn changes_to(self, after: Self) -> Vec<UpgradeChange> {
		let mut changes = Vec::with_capacity(2);
		if self.upgrade_level != after.upgrade_level {
			changes.push(UpgradeChange {
				field: UpgradeField::Level,
				old: self.upgrade_level,
				new: after.upgrade_level,
			});
		}
		if self.upgrade_points != after.upgrade_points {
			changes.push(UpgradeChange {
				field: UpgradeField::Points,
				old: self.upgrade_points,
				new: after.upgrade_points,
			});
		}
		changes
	}
}

/// Field of [`Progress`] that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_enums)]
pub enum UpgradeField {
	/// [`Progress::upgrade_level`]
	Level,

	/// [`Progress::upgrade_points`]
	Points,
}

/// Old and new value of a single [`Progress`] field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct UpgradeChange {
	/// Which field changed
	pub field: UpgradeField,

	/// Value before the change
	pub old: u32,

	/// Value after the change
	pub new: u32,
}

/// A stat that is leveled up by adding upgrade points to it (and leveled back down by removing them).
///
/// The number of points needed to advance past each level comes from a schedule, which also limits how many levels
/// the stat can gain. A stat at its max level holds no points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradableStat {
	id: String,
	display_name: String,
	display_description: String,
	progress: Progress,
	level_up_points: Arc<[u32]>,
}

impl UpgradableStat {
	/// Creates a stat at level zero with no points.
	#[must_use]
	pub fn new(
		id: impl Into<String>,
		display_name: impl Into<String>,
		display_description: impl Into<String>,
		level_up_points: Arc<[u32]>,
	) -> Self {
		Self {
			id: id.into(),
			display_name: display_name.into(),
			display_description: display_description.into(),
			progress: Progress::default(),
			level_up_points,
		}
	}

	/// Canonical (uppercase) id.
	#[must_use]
	#[inline]
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Name to show to users.
	#[must_use]
	#[inline]
	pub fn display_name(&self) -> &str {
		&self.display_name
	}

	/// Description to show to users.
	#[must_use]
	#[inline]
	pub fn display_description(&self) -> &str {
		&self.display_description
	}

	/// Current leveling state.
	#[must_use]
	#[inline]
	pub const fn progress(&self) -> Progress {
		self.progress
	}

	/// Number of levels gained.
	#[must_use]
	#[inline]
	pub const fn upgrade_level(&self) -> u32 {
		self.progress.upgrade_level
	}

	/// Points accumulated towards the next level.
	#[must_use]
	#[inline]
	pub const fn upgrade_points(&self) -> u32 {
		self.progress.upgrade_points
	}

	/// Points needed to advance past each level, indexed by level.
	#[must_use]
	#[inline]
	pub fn level_up_points(&self) -> &[u32] {
		&self.level_up_points
	}

	/// Highest level the stat can reach.
	#[must_use]
	#[inline]
	pub fn max_level(&self) -> u32 {
		u32::try_from(self.level_up_points.len()).unwrap_or(u32::MAX)
	}

	/// Checks whether the stat is at its highest level.
	#[must_use]
	#[inline]
	pub fn is_max_level(&self) -> bool {
		self.upgrade_level() >= self.max_level()
	}

	/// Points needed to advance past `level`, or [`None`] past the end of the schedule.
	fn points_for_level(&self, level: u32) -> Option<u32> {
		self.level_up_points.get(usize::try_from(level).ok()?).copied()
	}

	/// Adds a single upgrade point, gaining a level (and starting over from zero points) once enough have been
	/// added. Does nothing at max level. Returns what changed.
	pub fn try_add_upgrade_point(&mut self) -> Vec<UpgradeChange> {
		let before = self.progress;
		let Some(needed) = self.points_for_level(before.upgrade_level) else {
			return Vec::new();
		};

		let points = before.upgrade_points.saturating_add(1);
		self.progress = if points >= needed {
			Progress::new(before.upgrade_level.saturating_add(1), 0)
		} else {
			Progress::new(before.upgrade_level, points)
		};

		before.changes_to(self.progress)
	}

	/// Removes a single upgrade point. With no points left in the current level, the stat drops a level and ends up one
	/// point short of regaining it. Does nothing at level zero with no points. Returns what changed.
	pub fn try_remove_upgrade_point(&mut self) -> Vec<UpgradeChange> {
		let before = self.progress;

		if before.upgrade_points > 0 {
			self.progress.upgrade_points -= 1;
		} else if before.upgrade_level > 0 {
			let level = before.upgrade_level - 1;
			let points = self.points_for_level(level).unwrap_or(0).saturating_sub(1);
			self.progress = Progress::new(level, points);
		}

		before.changes_to(self.progress)
	}

	/// Sets the leveling state directly, clamping it into the stat's valid range. Returns whether clamping was needed.
	pub fn set_progress(&mut self, progress: Progress) -> bool {
		let level = progress.upgrade_level.min(self.max_level());
		let points = match self.points_for_level(level) {
			Some(needed) => progress.upgrade_points.min(needed.saturating_sub(1)),
			None => 0,
		};

		self.progress = Progress::new(level, points);
		self.progress != progress
	}
}

/// Attribute on a character: an upgradable stat that owns a group of skills
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct CharacterAttribute {
	/// Leveling state and identity of the attribute
	pub stat: UpgradableStat,

	/// Skills belonging to the attribute
	pub skills: Vec<CharacterSkill>,
}

impl CharacterAttribute {
	/// Base value of the attribute: its level.
	#[must_use]
	#[inline]
	pub fn value(&self) -> f64 {
		f64::from(self.stat.upgrade_level())
	}

	/// Finds one of the attribute's skills by canonical id.
	#[must_use]
	pub fn skill(&self, id: &str) -> Option<&CharacterSkill> {
		self.skills.iter().find(|skill| skill.stat.id() == id)
	}
}

/// Skill on a character: an upgradable stat whose value builds on its parent attribute's
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct CharacterSkill {
	/// Leveling state and identity of the skill
	pub stat: UpgradableStat,

	/// Canonical id of the attribute that owns the skill
	pub attribute_id: String,
}

impl CharacterSkill {
	/// Base value of the skill: its own level plus the level of its attribute.
	#[must_use]
	#[inline]
	pub fn value(&self, attribute: &CharacterAttribute) -> f64 {
		f64::from(self.stat.upgrade_level()) + attribute.value()
	}
}

/// Stat whose value is computed from a formula every time it is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedStat {
	id: String,
	display_name: String,
	display_description: String,
	formula: Formula,
}

impl DerivedStat {
	/// Creates a derived stat from an already-parsed formula.
	#[must_use]
	pub fn new(
		id: impl Into<String>,
		display_name: impl Into<String>,
		display_description: impl Into<String>,
		formula: Formula,
	) -> Self {
		Self {
			id: id.into(),
			display_name: display_name.into(),
			display_description: display_description.into(),
			formula,
		}
	}

	/// Creates a derived stat by parsing its formula. A formula that fails to parse is replaced with one that always
	/// evaluates to zero, so malformed content degrades rather than failing.
	#[must_use]
	pub fn parse(
		id: impl Into<String>,
		display_name: impl Into<String>,
		display_description: impl Into<String>,
		formula: &str,
	) -> Self {
		let id = id.into();
		let formula = Formula::parse(formula).unwrap_or_else(|err| {
			tracing::warn!(stat = %id, %err, "derived stat formula is invalid, using 0 instead");
			Formula::zero(err.formula)
		});
		Self::new(id, display_name, display_description, formula)
	}

	/// Canonical (uppercase) id.
	#[must_use]
	#[inline]
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Name to show to users.
	#[must_use]
	#[inline]
	pub fn display_name(&self) -> &str {
		&self.display_name
	}

	/// Description to show to users.
	#[must_use]
	#[inline]
	pub fn display_description(&self) -> &str {
		&self.display_description
	}

	/// Formula the stat's value is computed from.
	#[must_use]
	#[inline]
	pub const fn formula(&self) -> &Formula {
		&self.formula
	}
}

/// Single adjustment applied on top of a stat's base value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::exhaustive_structs)]
pub struct StatisticModification {
	/// Short label to show to users (e.g. "Bonus")
	pub display_name: String,

	/// Formula or description of where the amount came from
	pub display_formula: String,

	/// Amount added to the value
	pub amount: f64,
}

impl StatisticModification {
	/// Creates a modification.
	#[must_use]
	pub fn new(display_name: impl Into<String>, display_formula: impl Into<String>, amount: f64) -> Self {
		Self {
			display_name: display_name.into(),
			display_formula: display_formula.into(),
			amount,
		}
	}
}

/// Snapshot of a stat's value: its base value, every modification applied to it, and the resulting final value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "EvaluationParts")]
pub struct StatisticEvaluation {
	base_value: f64,
	modifications: Vec<StatisticModification>,
	final_value: f64,
}

/// Serialized form of a [`StatisticEvaluation`]. The final value is always recomputed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationParts {
	base_value: f64,
	#[serde(default)]
	modifications: Vec<StatisticModification>,
}

impl From<EvaluationParts> for StatisticEvaluation {
	fn from(parts: EvaluationParts) -> Self {
		Self::new(parts.base_value, parts.modifications)
	}
}

impl StatisticEvaluation {
	/// Creates an evaluation, totalling the final value from the base value and modifications.
	#[must_use]
	pub fn new(base_value: f64, modifications: Vec<StatisticModification>) -> Self {
		let final_value = base_value + modifications.iter().map(|modification| modification.amount).sum::<f64>();
		Self {
			base_value,
			modifications,
			final_value,
		}
	}

	/// Creates a new evaluation with additional modifications applied after the existing ones.
	#[must_use]
	pub fn with_modifications(&self, extra: impl IntoIterator<Item = StatisticModification>) -> Self {
		let mut modifications = self.modifications.clone();
		modifications.extend(extra);
		Self::new(self.base_value, modifications)
	}

	/// Value before any modifications.
	#[must_use]
	#[inline]
	pub const fn base_value(&self) -> f64 {
		self.base_value
	}

	/// Modifications applied, in order.
	#[must_use]
	#[inline]
	pub fn modifications(&self) -> &[StatisticModification] {
		&self.modifications
	}

	/// Base value plus every modification.
	#[must_use]
	#[inline]
	pub const fn final_value(&self) -> f64 {
		self.final_value
	}
}
