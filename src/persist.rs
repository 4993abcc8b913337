//! Saving and loading the mutable state of a [`Character`].
//!
//! Only identity and the leveling state of attributes and skills are saved. Everything else (derived stats, display
//! names, level-up schedules) comes from the content the character is rebuilt from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
	character::{Character, Identity},
	content::Ruleset,
	stat::Progress,
};

/// Saved state of a character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::exhaustive_structs)]
pub struct CharacterSnapshot {
	/// Who the character is
	#[serde(flatten)]
	pub identity: Identity,

	/// Leveling state of every attribute, by id
	pub attributes: BTreeMap<String, Progress>,

	/// Leveling state of every skill, by id
	pub skills: BTreeMap<String, Progress>,
}

impl CharacterSnapshot {
	/// Reads a snapshot from JSON.
	///
	/// # Errors
	/// If the JSON doesn't describe a snapshot, [`PersistError::Json`] is returned.
	pub fn from_json(json: &str) -> Result<Self, PersistError> {
		Ok(serde_json::from_str(json)?)
	}

	/// Writes the snapshot as pretty-printed JSON.
	///
	/// # Errors
	/// If serialization fails, [`PersistError::Json`] is returned.
	pub fn to_json(&self) -> Result<String, PersistError> {
		Ok(serde_json::to_string_pretty(self)?)
	}
}

impl Character {
	/// Captures the character's identity and the leveling state of every attribute and skill.
	#[must_use]
	pub fn snapshot(&self) -> CharacterSnapshot {
		let mut attributes = BTreeMap::new();
		let mut skills = BTreeMap::new();
		for attribute in self.attributes() {
			attributes.insert(attribute.stat.id().to_owned(), attribute.stat.progress());
			for skill in &attribute.skills {
				skills.insert(skill.stat.id().to_owned(), skill.stat.progress());
			}
		}

		CharacterSnapshot {
			identity: self.identity.clone(),
			attributes,
			skills,
		}
	}

	/// Applies a snapshot to the character. Stats the snapshot doesn't mention are left alone, and ids the character
	/// doesn't have are skipped. Progress outside of a stat's schedule is clamped into it. Observers aren't notified.
	pub fn restore(&mut self, snapshot: &CharacterSnapshot) {
		self.identity = snapshot.identity.clone();

		for (id, progress) in &snapshot.attributes {
			if self.is_attribute(id) {
				self.restore_progress(id, *progress);
			} else {
				tracing::warn!(attribute = %id, "skipping saved attribute that doesn't exist");
			}
		}

		for (id, progress) in &snapshot.skills {
			if self.is_skill(id) {
				self.restore_progress(id, *progress);
			} else {
				tracing::warn!(skill = %id, "skipping saved skill that doesn't exist");
			}
		}
	}

	/// Creates a character from a ruleset and applies a snapshot to it.
	#[must_use]
	pub fn from_snapshot(ruleset: &Ruleset, snapshot: &CharacterSnapshot) -> Self {
		let mut character = Self::new(ruleset);
		character.restore(snapshot);
		character
	}

	/// Sets an attribute's or skill's progress, warning if it had to be clamped.
	fn restore_progress(&mut self, id: &str, progress: Progress) {
		if let Some(stat) = self.upgradable_mut(id) {
			if stat.set_progress(progress) {
				tracing::warn!(
					stat = %id,
					saved = ?progress,
					restored = ?stat.progress(),
					"saved progress is out of range for the stat"
				);
			}
		}
	}
}

/// Error that can occur while saving or loading a character
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PersistError {
	/// The snapshot couldn't be converted to or from JSON.
	#[error("invalid character JSON: {0}")]
	Json(#[from] serde_json::Error),
}
