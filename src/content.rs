//! Static game content: which attributes, skills and derived stats exist, and how they level up.
//!
//! Content is authored as JSON ([`GameData`]) and compiled once into a [`Ruleset`], which every character is then
//! built from. Compiling parses every derived stat formula, so that evaluating them later never has to.

use std::{
	collections::{BTreeMap, HashMap},
	sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::{parse::Formula, stat::DerivedStat};

/// Skill as defined by game content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct SkillDefinition {
	/// Name to show to users
	pub display_name: String,

	/// Description to show to users
	pub display_description: String,
}

/// Attribute as defined by game content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct AttributeDefinition {
	/// Name to show to users
	pub display_name: String,

	/// Description to show to users
	pub display_description: String,

	/// Skills belonging to the attribute, by id
	pub skills: BTreeMap<String, SkillDefinition>,
}

/// Named group of attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct AttributeGroupDefinition {
	/// Name to show to users
	pub display_name: String,

	/// Attributes in the group, by id
	pub attributes: BTreeMap<String, AttributeDefinition>,
}

/// Derived stat as defined by game content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct DerivedStatDefinition {
	/// Name to show to users
	pub display_name: String,

	/// Description to show to users
	pub display_description: String,

	/// Formula the stat's value is computed from. Dice are allowed, but make the stat change on every read.
	pub formula: String,
}

/// Immutable rules content, as authored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[non_exhaustive]
pub struct GameData {
	/// Version of the game rules the content is for (e.g. `"Beta2.1"`)
	pub game_version: String,

	/// Version of the content itself
	pub data_version: String,

	/// Points needed to advance past each attribute level. Also caps attribute levels.
	pub attribute_level_up_points: Vec<u32>,

	/// Points needed to advance past each skill level. Also caps skill levels.
	pub skill_level_up_points: Vec<u32>,

	/// Attributes, in named groups
	pub attribute_groups: Vec<AttributeGroupDefinition>,

	/// Derived stats, by id
	pub derived_statistics: BTreeMap<String, DerivedStatDefinition>,
}

impl GameData {
	/// Reads game data from JSON and validates it.
	///
	/// # Errors
	/// If the JSON doesn't describe game data, or the game data is invalid (see [`Self::validate()`]), an error
	/// variant is returned.
	pub fn from_json(json: &str) -> Result<Self, ContentError> {
		let data: Self = serde_json::from_str(json)?;
		data.validate()?;
		Ok(data)
	}

	/// Checks that every level in both level-up schedules needs at least one point.
	///
	/// # Errors
	/// If any level needs zero points, [`ContentError::ZeroLevelUpPoints`] is returned.
	pub fn validate(&self) -> Result<(), ContentError> {
		for (schedule, points) in [
			("attribute", &self.attribute_level_up_points),
			("skill", &self.skill_level_up_points),
		] {
			if let Some(level) = points.iter().position(|&needed| needed == 0) {
				return Err(ContentError::ZeroLevelUpPoints { schedule, level });
			}
		}
		Ok(())
	}
}

/// Normalizes an id for case-insensitive comparison.
#[must_use]
pub fn normalize_id(id: &str) -> String {
	id.to_uppercase()
}

/// Skill in a compiled [`Ruleset`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SkillRule {
	/// Canonical (uppercase) id
	pub id: String,

	/// Content definition
	pub definition: SkillDefinition,
}

/// Attribute in a compiled [`Ruleset`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct AttributeRule {
	/// Canonical (uppercase) id
	pub id: String,

	/// Display name of the group the attribute belongs to
	pub group: String,

	/// Content definition
	pub definition: AttributeDefinition,

	/// Skills belonging to the attribute
	pub skills: Vec<SkillRule>,
}

/// Game content compiled for building characters: ids normalized and derived stat formulas parsed
#[derive(Debug, Clone)]
pub struct Ruleset {
	data: GameData,
	attribute_level_up_points: Arc<[u32]>,
	skill_level_up_points: Arc<[u32]>,
	attributes: Vec<AttributeRule>,
	derived: Vec<Arc<DerivedStat>>,
}

impl Ruleset {
	/// Compiles game data. Identical formulas are only parsed once.
	#[must_use]
	pub fn new(data: GameData) -> Self {
		let attributes = data
			.attribute_groups
			.iter()
			.flat_map(|group| {
				group.attributes.iter().map(|(id, definition)| AttributeRule {
					id: normalize_id(id),
					group: group.display_name.clone(),
					definition: definition.clone(),
					skills: definition
						.skills
						.iter()
						.map(|(id, definition)| SkillRule {
							id: normalize_id(id),
							definition: definition.clone(),
						})
						.collect(),
				})
			})
			.collect();

		let derived = {
			let mut parsed: HashMap<&str, Formula> = HashMap::new();
			let derived: Vec<_> = data
				.derived_statistics
				.iter()
				.map(|(id, definition)| {
					let id = normalize_id(id);
					let stat = match parsed.get(definition.formula.as_str()) {
						Some(formula) => DerivedStat::new(
							id,
							&definition.display_name,
							&definition.display_description,
							formula.clone(),
						),
						None => {
							let stat = DerivedStat::parse(
								id,
								&definition.display_name,
								&definition.display_description,
								&definition.formula,
							);
							parsed.insert(&definition.formula, stat.formula().clone());
							stat
						}
					};
					Arc::new(stat)
				})
				.collect();
			derived
		};

		Self {
			attribute_level_up_points: data.attribute_level_up_points.as_slice().into(),
			skill_level_up_points: data.skill_level_up_points.as_slice().into(),
			attributes,
			derived,
			data,
		}
	}

	/// Reads, validates, and compiles game data from JSON.
	///
	/// # Errors
	/// See [`GameData::from_json()`].
	pub fn from_json(json: &str) -> Result<Self, ContentError> {
		GameData::from_json(json).map(Self::new)
	}

	/// Content the ruleset was compiled from.
	#[must_use]
	#[inline]
	pub const fn data(&self) -> &GameData {
		&self.data
	}

	/// Level-up schedule shared by every attribute.
	#[must_use]
	#[inline]
	pub fn attribute_level_up_points(&self) -> &Arc<[u32]> {
		&self.attribute_level_up_points
	}

	/// Level-up schedule shared by every skill.
	#[must_use]
	#[inline]
	pub fn skill_level_up_points(&self) -> &Arc<[u32]> {
		&self.skill_level_up_points
	}

	/// Every attribute, sorted by content key.
	#[must_use]
	#[inline]
	pub fn attributes(&self) -> &[AttributeRule] {
		&self.attributes
	}

	/// Every derived stat, in id order.
	#[must_use]
	#[inline]
	pub fn derived_stats(&self) -> &[Arc<DerivedStat>] {
		&self.derived
	}
}

/// Error that can occur while loading game content
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ContentError {
	/// The content isn't valid JSON, or doesn't have the expected shape.
	#[error("invalid game data JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// A level-up schedule has a level that needs no points to advance past.
	#[error("{schedule} level {level} needs zero points to level up")]
	ZeroLevelUpPoints {
		/// Which schedule the level is in
		schedule: &'static str,

		/// Level that needs zero points
		level: usize,
	},
}
