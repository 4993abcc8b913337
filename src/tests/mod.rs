mod check;
mod content;
mod parse;
mod stat;

use crate::content::Ruleset;

/// Game content shared by the character tests
const CONTENT: &str = r#"{
	"gameVersion": "Beta2.1",
	"dataVersion": "1",
	"attributeLevelUpPoints": [2, 3],
	"skillLevelUpPoints": [1, 2, 3],
	"attributeGroups": [
		{
			"displayName": "Physical",
			"attributes": {
				"str": {
					"displayName": "Strength",
					"skills": {
						"athletics": { "displayName": "Athletics" },
						"brawl": { "displayName": "Brawling" }
					}
				},
				"dex": {
					"displayName": "Dexterity",
					"skills": { "stealth": { "displayName": "Stealth" } }
				}
			}
		},
		{
			"displayName": "Mental",
			"attributes": {
				"wit": { "displayName": "Wits" }
			}
		}
	],
	"derivedStatistics": {
		"hp": { "displayName": "Hit Points", "formula": "10 + str * 2" },
		"guard": { "displayName": "Guard", "formula": "(DEX + Athletics) / 2" },
		"luck": { "displayName": "Luck", "formula": "1d6" },
		"broken": { "displayName": "Broken", "formula": "1 +" },
		"loop": { "displayName": "Loop", "formula": "LOOP + 1" },
		"ping": { "formula": "PONG" },
		"pong": { "formula": "PING + 1" }
	}
}"#;

fn ruleset() -> Ruleset {
	Ruleset::from_json(CONTENT).unwrap()
}
