use crate::{
	check::{effective_difficulty, Difficulty, EffectiveDifficulty, SkillCheck},
	stat::StatisticEvaluation,
};

fn effective(roll_difficulty: Difficulty, extra_bonus: i32) -> EffectiveDifficulty {
	EffectiveDifficulty {
		roll_difficulty,
		extra_bonus,
	}
}

fn check(die_roll: u32, skill_value: f64) -> SkillCheck {
	SkillCheck::new(
		"ATHLETICS",
		StatisticEvaluation::new(skill_value, Vec::new()),
		Difficulty::Moderate,
		0,
		die_roll,
		0,
	)
}

#[test]
fn no_advantage_keeps_difficulty() {
	assert_eq!(
		effective_difficulty(Difficulty::Moderate, 0),
		effective(Difficulty::Moderate, 0)
	);
}

#[test]
fn advantage_lowers_difficulty() {
	assert_eq!(effective_difficulty(Difficulty::Moderate, 2), effective(Difficulty::Trivial, 0));
	assert_eq!(effective_difficulty(Difficulty::Hard, -1), effective(Difficulty::Formidable, 0));
}

#[test]
fn excess_advantage_becomes_bonus() {
	assert_eq!(effective_difficulty(Difficulty::Easy, 3), effective(Difficulty::Trivial, 2));
	assert_eq!(effective_difficulty(Difficulty::Trivial, 1), effective(Difficulty::Trivial, 1));
}

#[test]
fn excess_disadvantage_becomes_penalty() {
	assert_eq!(effective_difficulty(Difficulty::Hard, -3), effective(Difficulty::Formidable, -2));
	assert_eq!(
		effective_difficulty(Difficulty::Formidable, -1),
		effective(Difficulty::Formidable, -1)
	);
}

#[test]
fn impossible_ignores_advantage() {
	for advantage in [-10, -1, 0, 1, 10, i32::MIN, i32::MAX] {
		assert_eq!(
			effective_difficulty(Difficulty::Impossible, advantage),
			effective(Difficulty::Impossible, 0)
		);
	}
}

#[test]
fn extreme_advantage_saturates() {
	let result = effective_difficulty(Difficulty::Moderate, i32::MAX);
	assert_eq!(result.roll_difficulty, Difficulty::Trivial);
	assert!(result.extra_bonus > 0);

	let result = effective_difficulty(Difficulty::Moderate, i32::MIN);
	assert_eq!(result.roll_difficulty, Difficulty::Formidable);
	assert!(result.extra_bonus < 0);
}

#[test]
fn die_sides_increase_with_difficulty() {
	let sides: Vec<_> = Difficulty::ALL.iter().map(|difficulty| difficulty.die_sides()).collect();
	assert_eq!(sides, vec![4, 6, 8, 10, 12, 20]);
}

#[test]
fn difficulty_names() {
	for difficulty in Difficulty::ALL {
		assert_eq!(difficulty.to_string().parse::<Difficulty>(), Ok(difficulty));
	}
	assert_eq!("Formidable".parse::<Difficulty>(), Ok(Difficulty::Formidable));
	assert!("legendary".parse::<Difficulty>().is_err());
	assert_eq!(
		serde_json::to_string(&Difficulty::Formidable).unwrap(),
		"\"formidable\""
	);
}

#[test]
fn rolling_one_always_at_least_succeeds() {
	let check = check(1, 5.0);
	assert_eq!(check.success_degree(), 0.0);
	assert!(check.is_success());
	assert_eq!(check.critical_degree(), 0);
}

#[test]
fn rolling_one_keeps_positive_degree() {
	let check = check(1, 0.0);
	assert_eq!(check.success_degree(), 1.0);
}

#[test]
fn success_and_failure_degrees() {
	let success = check(7, 3.0);
	assert_eq!(success.success_degree(), 4.0);
	assert!(success.is_success());
	assert_eq!(success.critical_degree(), 0);

	let exact = check(3, 3.0);
	assert_eq!(exact.success_degree(), 0.0);
	assert!(exact.is_success());

	let failure = check(2, 9.0);
	assert_eq!(failure.success_degree(), -7.0);
	assert!(!failure.is_success());
	assert_eq!(failure.critical_degree(), -1);
}

#[test]
fn critical_degree_truncates_toward_zero() {
	assert_eq!(check(12, 1.0).critical_degree(), 2);
	assert_eq!(check(10, 0.0).critical_degree(), 2);
	assert_eq!(check(9, 0.0).critical_degree(), 1);
	assert_eq!(check(2, 6.0).critical_degree(), 0);
	assert_eq!(check(2, 12.0).critical_degree(), -2);
}

#[test]
fn check_reports_effective_difficulty() {
	let check = SkillCheck::new(
		"STR",
		StatisticEvaluation::new(2.0, Vec::new()),
		Difficulty::Easy,
		3,
		2,
		2,
	);
	assert_eq!(check.effective_difficulty(), effective(Difficulty::Trivial, 2));
	assert_eq!(check.stat_id(), "STR");
	assert_eq!(check.effective_skill_value(), 2.0);
}

#[test]
fn deserialized_check_keeps_consistent_skill_value() {
	let original = check(7, 3.0);
	let mut json: serde_json::Value = serde_json::to_value(&original).unwrap();
	json["evaluation"]["finalValue"] = serde_json::json!(-40.0);

	let check: SkillCheck = serde_json::from_value(json).unwrap();
	assert_eq!(check, original);
	assert_eq!(check.effective_skill_value(), 3.0);
	assert_eq!(check.success_degree(), 4.0);
}
