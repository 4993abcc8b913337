//! Character sheets: identity, leveled attributes and skills, derived stats, and skill check history.

use core::{cell::RefCell, fmt, mem};
use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
	check::{effective_difficulty, Difficulty, SkillCheck},
	content::{normalize_id, Ruleset},
	eval::{EvalError, ResolvedStat, Statistics},
	roller::Roller,
	stat::{
		CharacterAttribute, CharacterSkill, DerivedStat, Progress, StatisticEvaluation, StatisticModification,
		UpgradableStat, UpgradeChange, UpgradeField,
	},
};

/// Who a character is, separate from what they can do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::exhaustive_structs)]
pub struct Identity {
	/// Character name
	pub name: String,

	/// Pronouns to refer to the character with
	pub pronouns: String,

	/// Id of the character's power
	pub power_id: String,

	/// Overall character level
	pub level: u32,

	/// Age in years
	pub age: u32,

	/// Wealth gained every week
	pub wealth_weekly: i64,

	/// Wealth left to spend this week
	pub wealth_remaining: i64,
}

impl Default for Identity {
	fn default() -> Self {
		Self {
			name: String::new(),
			pronouns: String::new(),
			power_id: String::new(),
			level: 0,
			age: 18,
			wealth_weekly: 0,
			wealth_remaining: 0,
		}
	}
}

/// Where a stat lives within a [`Character`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatLocation {
	/// Index into the attributes
	Attribute(usize),

	/// Skill within an attribute
	Skill {
		/// Index into the attributes
		attribute: usize,

		/// Index into the attribute's skills
		skill: usize,
	},

	/// Index into the derived stats
	Derived(usize),
}

/// Borrowed view of any stat on a [`Character`]
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum Statistic<'c> {
	/// Attribute
	Attribute(&'c CharacterAttribute),

	/// Skill, along with the attribute that owns it
	Skill {
		/// The skill itself
		skill: &'c CharacterSkill,

		/// Attribute the skill belongs to
		attribute: &'c CharacterAttribute,
	},

	/// Derived stat
	Derived(&'c DerivedStat),
}

impl Statistic<'_> {
	/// Canonical (uppercase) id of the stat.
	#[must_use]
	pub fn id(&self) -> &str {
		match self {
			Self::Attribute(attribute) => attribute.stat.id(),
			Self::Skill { skill, .. } => skill.stat.id(),
			Self::Derived(derived) => derived.id(),
		}
	}

	/// Name to show to users.
	#[must_use]
	pub fn display_name(&self) -> &str {
		match self {
			Self::Attribute(attribute) => attribute.stat.display_name(),
			Self::Skill { skill, .. } => skill.stat.display_name(),
			Self::Derived(derived) => derived.display_name(),
		}
	}

	/// Leveling state, for attributes and skills.
	#[must_use]
	pub fn progress(&self) -> Option<Progress> {
		match self {
			Self::Attribute(attribute) => Some(attribute.stat.progress()),
			Self::Skill { skill, .. } => Some(skill.stat.progress()),
			Self::Derived(..) => None,
		}
	}
}

/// Notification that a field of an attribute's or skill's [`Progress`] changed
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct StatChanged {
	/// Canonical id of the stat that changed
	pub stat_id: String,

	/// Field that changed
	pub field: UpgradeField,

	/// Value before the change
	pub old: u32,

	/// Value after the change
	pub new: u32,
}

/// Handle for removing an observer registered with [`Character::subscribe()`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Callback invoked for every stat change
type Callback = Box<dyn FnMut(&Character, &StatChanged)>;

/// Registered observers, in subscription order
#[derive(Default)]
struct Observers {
	next_id: u64,
	callbacks: Vec<(ObserverId, Callback)>,
}

impl fmt::Debug for Observers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.callbacks.iter().map(|(id, _)| id)).finish()
	}
}

/// A player character: identity, attributes with their skills, derived stats, and a history of skill checks.
///
/// Stats are looked up by id without regard to case. Derived stats are evaluated against the character every time
/// they are read, so they always reflect the current attribute and skill levels.
#[derive(Debug)]
pub struct Character {
	/// Who the character is
	pub identity: Identity,

	attributes: Vec<CharacterAttribute>,
	derived: Vec<Arc<DerivedStat>>,
	index: HashMap<String, StatLocation>,
	history: Vec<SkillCheck>,

	/// Ids of the derived stats currently being evaluated, innermost last
	evaluating: RefCell<Vec<String>>,

	observers: Observers,
}

/// Marks a derived stat as being evaluated until dropped, so the mark is cleared even if evaluation unwinds
struct EvaluatingGuard<'c> {
	stack: &'c RefCell<Vec<String>>,
}

impl<'c> EvaluatingGuard<'c> {
	fn enter(stack: &'c RefCell<Vec<String>>, id: &str) -> Result<Self, EvalError> {
		let mut evaluating = stack.borrow_mut();
		if evaluating.iter().any(|evaluating_id| evaluating_id == id) {
			return Err(EvalError::CyclicReference {
				stat_id: id.to_owned(),
			});
		}
		evaluating.push(id.to_owned());
		drop(evaluating);
		Ok(Self { stack })
	}
}

impl Drop for EvaluatingGuard<'_> {
	fn drop(&mut self) {
		self.stack.borrow_mut().pop();
	}
}

impl Character {
	/// Creates a character with default identity and every attribute and skill of the ruleset at level zero.
	#[must_use]
	pub fn new(ruleset: &Ruleset) -> Self {
		let mut index = HashMap::new();
		let mut insert = |id: &str, location: StatLocation| {
			if let Some(previous) = index.insert(id.to_owned(), location) {
				tracing::warn!(stat = id, ?previous, "duplicate stat id, replacing the earlier stat");
			}
		};

		let attributes = ruleset
			.attributes()
			.iter()
			.enumerate()
			.map(|(attribute_idx, rule)| {
				let skills = rule
					.skills
					.iter()
					.enumerate()
					.map(|(skill_idx, skill)| {
						insert(
							&skill.id,
							StatLocation::Skill {
								attribute: attribute_idx,
								skill: skill_idx,
							},
						);
						CharacterSkill {
							stat: UpgradableStat::new(
								&skill.id,
								&skill.definition.display_name,
								&skill.definition.display_description,
								Arc::clone(ruleset.skill_level_up_points()),
							),
							attribute_id: rule.id.clone(),
						}
					})
					.collect();

				insert(&rule.id, StatLocation::Attribute(attribute_idx));
				CharacterAttribute {
					stat: UpgradableStat::new(
						&rule.id,
						&rule.definition.display_name,
						&rule.definition.display_description,
						Arc::clone(ruleset.attribute_level_up_points()),
					),
					skills,
				}
			})
			.collect();

		let derived: Vec<_> = ruleset.derived_stats().to_vec();
		for (idx, stat) in derived.iter().enumerate() {
			insert(stat.id(), StatLocation::Derived(idx));
		}

		Self {
			identity: Identity::default(),
			attributes,
			derived,
			index,
			history: Vec::new(),
			evaluating: RefCell::new(Vec::new()),
			observers: Observers::default(),
		}
	}

	/// Every attribute, each with its skills, sorted by content key.
	#[must_use]
	#[inline]
	pub fn attributes(&self) -> &[CharacterAttribute] {
		&self.attributes
	}

	/// Every derived stat, in id order.
	#[must_use]
	#[inline]
	pub fn derived_stats(&self) -> &[Arc<DerivedStat>] {
		&self.derived
	}

	/// Every skill check made so far, oldest first.
	#[must_use]
	#[inline]
	pub fn check_history(&self) -> &[SkillCheck] {
		&self.history
	}

	/// Looks up any stat by id, ignoring case.
	#[must_use]
	pub fn statistic(&self, id: &str) -> Option<Statistic<'_>> {
		match *self.index.get(&normalize_id(id))? {
			StatLocation::Attribute(idx) => self.attributes.get(idx).map(Statistic::Attribute),
			StatLocation::Skill { attribute, skill } => {
				let attribute = self.attributes.get(attribute)?;
				let skill = attribute.skills.get(skill)?;
				Some(Statistic::Skill { skill, attribute })
			}
			StatLocation::Derived(idx) => self.derived.get(idx).map(|stat| Statistic::Derived(stat)),
		}
	}

	/// Leveling state of an attribute or skill, ignoring case.
	#[must_use]
	pub fn progress(&self, id: &str) -> Option<Progress> {
		self.statistic(id)?.progress()
	}

	/// Evaluates a stat by id (ignoring case). Attributes are worth their level and skills their level plus their
	/// attribute's level, while derived stats evaluate their formula against this character, rolling any dice in it.
	/// Returns [`None`] if there is no such stat.
	///
	/// # Errors
	/// If a derived stat's formula references the stat itself (directly or through other derived stats),
	/// [`EvalError::CyclicReference`] is returned. Other evaluation failures are passed along.
	pub fn evaluate_statistic<R: Roller>(
		&self,
		id: &str,
		roller: &mut R,
	) -> Result<Option<StatisticEvaluation>, EvalError> {
		let Some(stat) = self.statistic(id) else {
			return Ok(None);
		};

		let base_value = match stat {
			Statistic::Attribute(attribute) => attribute.value(),
			Statistic::Skill { skill, attribute } => skill.value(attribute),
			Statistic::Derived(derived) => {
				let _guard = EvaluatingGuard::enter(&self.evaluating, derived.id())?;
				derived.formula().eval(self, roller)?.value
			}
		};

		Ok(Some(StatisticEvaluation::new(base_value, Vec::new())))
	}

	/// Adds an upgrade point to an attribute or skill (see [`UpgradableStat::try_add_upgrade_point()`]), notifying
	/// observers of whatever changed. Returns whether anything changed.
	pub fn try_add_upgrade_point(&mut self, id: &str) -> bool {
		self.upgrade(id, UpgradableStat::try_add_upgrade_point)
	}

	/// Removes an upgrade point from an attribute or skill (see [`UpgradableStat::try_remove_upgrade_point()`]),
	/// notifying observers of whatever changed. Returns whether anything changed.
	pub fn try_remove_upgrade_point(&mut self, id: &str) -> bool {
		self.upgrade(id, UpgradableStat::try_remove_upgrade_point)
	}

	/// Applies an upgrade operation to a stat and notifies observers of the changes.
	fn upgrade(&mut self, id: &str, op: impl FnOnce(&mut UpgradableStat) -> Vec<UpgradeChange>) -> bool {
		let Some(stat) = self.upgradable_mut(id) else {
			return false;
		};
		let stat_id = stat.id().to_owned();
		let changes = op(stat);
		if changes.is_empty() {
			return false;
		}

		let mut observers = mem::take(&mut self.observers);
		for change in changes {
			tracing::trace!(stat = %stat_id, field = ?change.field, old = change.old, new = change.new, "stat changed");
			let event = StatChanged {
				stat_id: stat_id.clone(),
				field: change.field,
				old: change.old,
				new: change.new,
			};
			for (_, callback) in &mut observers.callbacks {
				callback(self, &event);
			}
		}
		self.observers = observers;

		true
	}

	/// Gets an attribute or skill for modification, ignoring case.
	pub(crate) fn upgradable_mut(&mut self, id: &str) -> Option<&mut UpgradableStat> {
		match *self.index.get(&normalize_id(id))? {
			StatLocation::Attribute(idx) => self.attributes.get_mut(idx).map(|attribute| &mut attribute.stat),
			StatLocation::Skill { attribute, skill } => self
				.attributes
				.get_mut(attribute)?
				.skills
				.get_mut(skill)
				.map(|skill| &mut skill.stat),
			StatLocation::Derived(..) => None,
		}
	}

	/// Checks whether an id (ignoring case) belongs to an attribute.
	pub(crate) fn is_attribute(&self, id: &str) -> bool {
		matches!(self.index.get(&normalize_id(id)), Some(StatLocation::Attribute(..)))
	}

	/// Checks whether an id (ignoring case) belongs to a skill.
	pub(crate) fn is_skill(&self, id: &str) -> bool {
		matches!(self.index.get(&normalize_id(id)), Some(StatLocation::Skill { .. }))
	}

	/// Registers a callback to run synchronously after every change to an attribute's or skill's level or points.
	/// Each changed field is reported separately, level before points. Callbacks may read the character but can't
	/// modify it.
	pub fn subscribe(&mut self, callback: impl FnMut(&Self, &StatChanged) + 'static) -> ObserverId {
		let id = ObserverId(self.observers.next_id);
		self.observers.next_id = self.observers.next_id.wrapping_add(1);
		self.observers.callbacks.push((id, Box::new(callback)));
		id
	}

	/// Removes a callback registered with [`Self::subscribe()`]. Returns whether it was registered.
	pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
		let before = self.observers.callbacks.len();
		self.observers.callbacks.retain(|(observer, _)| *observer != id);
		self.observers.callbacks.len() != before
	}

	/// Rolls a skill check against a stat and records it in the check history.
	///
	/// Net advantage shifts the difficulty tier (see [`effective_difficulty()`]) and a single die of the resulting
	/// tier is rolled. The net bonus and any advantage beyond the range of tiers are added to the stat's evaluation as
	/// separate modifications. Returns [`None`] if there is no such stat.
	///
	/// # Errors
	/// See [`Self::evaluate_statistic()`].
	pub fn roll_skill_check<R: Roller>(
		&mut self,
		stat_id: &str,
		base_difficulty: Difficulty,
		net_advantage: i32,
		net_bonus: i32,
		roller: &mut R,
	) -> Result<Option<SkillCheck>, EvalError> {
		let Some(evaluation) = self.evaluate_statistic(stat_id, &mut *roller)? else {
			return Ok(None);
		};

		let effective = effective_difficulty(base_difficulty, net_advantage);
		let mut modifications = Vec::with_capacity(2);
		if net_bonus != 0 {
			modifications.push(StatisticModification::new(
				if net_bonus > 0 { "Bonus" } else { "Penalty" },
				format!("{net_bonus:+}"),
				f64::from(net_bonus),
			));
		}
		if effective.extra_bonus != 0 {
			modifications.push(StatisticModification::new(
				if effective.extra_bonus > 0 {
					"Excess advantage"
				} else {
					"Excess disadvantage"
				},
				format!("{net_advantage:+} advantage on {base_difficulty}"),
				f64::from(effective.extra_bonus),
			));
		}

		let die_roll = roller.roll_die(effective.roll_difficulty.die_sides());
		let check = SkillCheck::new(
			normalize_id(stat_id),
			evaluation.with_modifications(modifications),
			base_difficulty,
			net_advantage,
			die_roll,
			effective.extra_bonus,
		);

		tracing::debug!(
			stat = check.stat_id(),
			difficulty = %effective.roll_difficulty,
			die_roll,
			skill_value = check.effective_skill_value(),
			degree = check.success_degree(),
			"rolled skill check"
		);

		self.history.push(check.clone());
		Ok(Some(check))
	}
}

impl Statistics for Character {
	fn resolve_stat<R: Roller>(&self, id: &str, roller: &mut R) -> Result<Option<ResolvedStat>, EvalError> {
		Ok(self.evaluate_statistic(id, roller)?.map(|evaluation| ResolvedStat {
			id: normalize_id(id),
			value: evaluation.final_value(),
		}))
	}
}
