//! Shared builders for test catalogues, quests and players.

use crate::player::Player;
use crate::quest::catalogue::QuestCatalogue;
use crate::quest::reward::{LampReward, LampType, QuestRewards, SkillSet};
use crate::quest::Quest;
use crate::skill::Skill;

/// A fresh player with floor experience and nothing completed.
pub fn player() -> Player {
    Player::new(None)
}

/// A minimal quest: no requirements, no rewards, eligible in every mode.
pub fn quest(id: i32, title: &str) -> Quest {
    Quest {
        id,
        title: title.to_string(),
        members: false,
        ironman: true,
        recommended: true,
        priority: 0,
        skill_requirements: Vec::new(),
        quest_requirements: Vec::new(),
        rewards: QuestRewards::default(),
    }
}

pub fn catalogue(quests: Vec<Quest>) -> QuestCatalogue {
    QuestCatalogue::new(quests).expect("test catalogue must validate")
}

/// A flat xp lamp usable on any single skill at level 1.
pub fn xp_lamp(id: i32, xp: f64) -> LampReward {
    LampReward {
        id,
        requirements: Skill::ALL
            .iter()
            .map(|&skill| (SkillSet::from([skill]), 1))
            .collect(),
        xp,
        exclusive: false,
        lamp_type: LampType::Xp,
        single_choice: false,
        multiplier: 1.0,
    }
}
