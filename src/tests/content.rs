use super::ruleset;
use crate::{
	content::{normalize_id, ContentError, GameData, Ruleset},
	term::TermKind,
};

#[test]
fn ids_are_normalized() {
	let ruleset = ruleset();
	let ids: Vec<_> = ruleset.attributes().iter().map(|attribute| attribute.id.as_str()).collect();
	assert_eq!(ids, vec!["DEX", "STR", "WIT"]);

	let strength = &ruleset.attributes()[1];
	assert_eq!(strength.group, "Physical");
	assert_eq!(strength.definition.display_name, "Strength");
	let skills: Vec<_> = strength.skills.iter().map(|skill| skill.id.as_str()).collect();
	assert_eq!(skills, vec!["ATHLETICS", "BRAWL"]);

	assert_eq!(normalize_id("Athletics"), "ATHLETICS");
}

#[test]
fn schedules_are_shared() {
	let ruleset = ruleset();
	assert_eq!(ruleset.attribute_level_up_points()[..], [2, 3]);
	assert_eq!(ruleset.skill_level_up_points()[..], [1, 2, 3]);
	assert_eq!(ruleset.data().game_version, "Beta2.1");
}

#[test]
fn derived_formulas_are_parsed_once_loaded() {
	let ruleset = ruleset();
	let hp = ruleset
		.derived_stats()
		.iter()
		.find(|stat| stat.id() == "HP")
		.unwrap();
	assert_eq!(hp.display_name(), "Hit Points");
	assert_eq!(hp.formula().term().to_string(), "10 + str * 2");

	let broken = ruleset
		.derived_stats()
		.iter()
		.find(|stat| stat.id() == "BROKEN")
		.unwrap();
	assert_eq!(broken.formula().term().kind, TermKind::Literal(0));
}

#[test]
fn identical_formulas_share_parse() {
	let data = GameData::from_json(
		r#"{
			"derivedStatistics": {
				"a": { "formula": "STR + 1" },
				"b": { "formula": "STR + 1" }
			}
		}"#,
	)
	.unwrap();
	let ruleset = Ruleset::new(data);
	let [a, b] = ruleset.derived_stats() else {
		panic!("expected two derived stats");
	};
	assert_eq!(a.id(), "A");
	assert_eq!(b.id(), "B");
	assert_eq!(a.formula(), b.formula());
}

#[test]
fn missing_sections_default_to_empty() {
	let ruleset = Ruleset::from_json("{}").unwrap();
	assert!(ruleset.attributes().is_empty());
	assert!(ruleset.derived_stats().is_empty());
	assert!(ruleset.attribute_level_up_points().is_empty());
}

#[test]
fn zero_level_up_points_are_rejected() {
	let err = GameData::from_json(r#"{ "attributeLevelUpPoints": [1], "skillLevelUpPoints": [1, 0] }"#).unwrap_err();
	assert!(matches!(
		err,
		ContentError::ZeroLevelUpPoints {
			schedule: "skill",
			level: 1
		}
	));
}

#[test]
fn malformed_json_is_rejected() {
	assert!(matches!(Ruleset::from_json("{ nope"), Err(ContentError::Json(..))));
	assert!(matches!(
		Ruleset::from_json(r#"{ "attributeLevelUpPoints": "many" }"#),
		Err(ContentError::Json(..))
	));
}
