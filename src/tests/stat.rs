use std::sync::Arc;

use proptest::prelude::*;

use crate::{
	stat::{
		CharacterAttribute, CharacterSkill, DerivedStat, Progress, StatisticEvaluation, StatisticModification,
		UpgradableStat, UpgradeChange, UpgradeField,
	},
	term::TermKind,
};

fn stat(schedule: &[u32]) -> UpgradableStat {
	UpgradableStat::new("STR", "Strength", "", Arc::from(schedule))
}

#[test]
fn adding_points_levels_up() {
	let mut stat = stat(&[2, 3]);
	let mut states = Vec::new();
	for _ in 0..4 {
		stat.try_add_upgrade_point();
		states.push(stat.progress());
	}
	assert_eq!(
		states,
		vec![
			Progress::new(0, 1),
			Progress::new(1, 0),
			Progress::new(1, 1),
			Progress::new(1, 2),
		]
	);

	stat.try_add_upgrade_point();
	assert_eq!(stat.progress(), Progress::new(2, 0));
	assert!(stat.is_max_level());

	assert!(stat.try_add_upgrade_point().is_empty());
	assert_eq!(stat.progress(), Progress::new(2, 0));
}

#[test]
fn removing_points_borrows_from_level_below() {
	let mut stat = stat(&[2, 3]);
	assert!(!stat.set_progress(Progress::new(2, 0)));

	stat.try_remove_upgrade_point();
	assert_eq!(stat.progress(), Progress::new(1, 2));

	for _ in 0..3 {
		stat.try_remove_upgrade_point();
	}
	assert_eq!(stat.progress(), Progress::new(0, 1));

	stat.try_remove_upgrade_point();
	assert_eq!(stat.progress(), Progress::new(0, 0));
	assert!(stat.try_remove_upgrade_point().is_empty());
	assert_eq!(stat.progress(), Progress::new(0, 0));
}

#[test]
fn changes_are_reported_level_first() {
	let mut stat = stat(&[2, 3]);
	assert_eq!(
		stat.try_add_upgrade_point(),
		vec![UpgradeChange {
			field: UpgradeField::Points,
			old: 0,
			new: 1,
		}]
	);
	assert_eq!(
		stat.try_add_upgrade_point(),
		vec![
			UpgradeChange {
				field: UpgradeField::Level,
				old: 0,
				new: 1,
			},
			UpgradeChange {
				field: UpgradeField::Points,
				old: 1,
				new: 0,
			},
		]
	);
}

#[test]
fn level_up_on_single_point_schedule_only_changes_level() {
	let mut stat = stat(&[1, 1]);
	assert_eq!(
		stat.try_add_upgrade_point(),
		vec![UpgradeChange {
			field: UpgradeField::Level,
			old: 0,
			new: 1,
		}]
	);
}

#[test]
fn empty_schedule_is_always_max_level() {
	let mut stat = stat(&[]);
	assert!(stat.is_max_level());
	assert!(stat.try_add_upgrade_point().is_empty());
	assert!(stat.try_remove_upgrade_point().is_empty());
}

#[test]
fn set_progress_clamps() {
	let mut stat = stat(&[2, 3]);
	assert!(stat.set_progress(Progress::new(9, 9)));
	assert_eq!(stat.progress(), Progress::new(2, 0));

	assert!(stat.set_progress(Progress::new(1, 7)));
	assert_eq!(stat.progress(), Progress::new(1, 2));

	assert!(!stat.set_progress(Progress::new(0, 1)));
	assert_eq!(stat.progress(), Progress::new(0, 1));
}

#[derive(Debug, Clone, Copy)]
enum Op {
	Add,
	Remove,
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![Just(Op::Add), Just(Op::Remove)]
}

proptest! {
	#[test]
	fn progress_stays_in_range(
		schedule in prop::collection::vec(1_u32..5, 0..5),
		ops in prop::collection::vec(op(), 0..64),
	) {
		let mut stat = stat(&schedule);
		for op in ops {
			let before = stat.progress();
			let changes = match op {
				Op::Add => stat.try_add_upgrade_point(),
				Op::Remove => stat.try_remove_upgrade_point(),
			};
			prop_assert_eq!(changes.is_empty(), before == stat.progress());

			let progress = stat.progress();
			prop_assert!(progress.upgrade_level <= stat.max_level());
			match schedule.get(progress.upgrade_level as usize) {
				Some(&needed) => prop_assert!(progress.upgrade_points < needed),
				None => prop_assert_eq!(progress.upgrade_points, 0),
			}
		}
	}

	#[test]
	fn add_then_remove_is_identity(schedule in prop::collection::vec(1_u32..5, 1..5), adds in 0_usize..20) {
		let mut stat = stat(&schedule);
		for _ in 0..adds {
			stat.try_add_upgrade_point();
		}
		let before = stat.progress();
		if !stat.is_max_level() {
			stat.try_add_upgrade_point();
			stat.try_remove_upgrade_point();
			prop_assert_eq!(stat.progress(), before);
		}
	}
}

#[test]
fn skill_value_includes_attribute_level() {
	let mut attribute = CharacterAttribute {
		stat: stat(&[1, 1, 1]),
		skills: Vec::new(),
	};
	let mut skill = CharacterSkill {
		stat: UpgradableStat::new("ATHLETICS", "Athletics", "", Arc::from([1_u32, 1].as_slice())),
		attribute_id: "STR".to_owned(),
	};

	attribute.stat.try_add_upgrade_point();
	attribute.stat.try_add_upgrade_point();
	skill.stat.try_add_upgrade_point();

	assert_eq!(attribute.value(), 2.0);
	assert_eq!(skill.value(&attribute), 3.0);

	attribute.skills.push(skill);
	assert!(attribute.skill("ATHLETICS").is_some());
	assert!(attribute.skill("STEALTH").is_none());
}

#[test]
fn invalid_derived_formula_falls_back_to_zero() {
	let derived = DerivedStat::parse("BROKEN", "Broken", "", "1 + ");
	assert_eq!(derived.formula().term().kind, TermKind::Literal(0));
	assert_eq!(derived.formula().source(), "1 + ");
}

#[test]
fn evaluation_totals_modifications() {
	let evaluation = StatisticEvaluation::new(
		4.0,
		vec![
			StatisticModification::new("Bonus", "+2", 2.0),
			StatisticModification::new("Penalty", "-3", -3.0),
		],
	);
	assert_eq!(evaluation.final_value(), 3.0);

	let more = evaluation.with_modifications([StatisticModification::new("Bonus", "+1", 1.0)]);
	assert_eq!(more.base_value(), 4.0);
	assert_eq!(more.modifications().len(), 3);
	assert_eq!(more.final_value(), 4.0);
	assert_eq!(evaluation.modifications().len(), 2);
}

#[test]
fn derived_formula_with_dropped_text_falls_back_to_zero() {
	let derived = DerivedStat::parse("BIG", "Big", "", "4 0d6");
	assert_eq!(derived.formula().term().kind, TermKind::Literal(0));
}

#[test]
fn deserialized_evaluation_recomputes_final_value() {
	let evaluation: StatisticEvaluation = serde_json::from_str(
		r#"{
			"baseValue": 3.0,
			"modifications": [{ "displayName": "Bonus", "displayFormula": "+2", "amount": 2.0 }],
			"finalValue": 99.0
		}"#,
	)
	.unwrap();
	assert_eq!(evaluation.final_value(), 5.0);
	assert_eq!(evaluation, StatisticEvaluation::new(3.0, vec![StatisticModification::new("Bonus", "+2", 2.0)]));

	let json = serde_json::to_string(&evaluation).unwrap();
	assert!(json.contains("\"finalValue\":5.0"));
}
