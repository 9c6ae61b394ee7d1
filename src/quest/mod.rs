pub mod catalogue;
pub mod requirement;
pub mod reward;

use serde::{Deserialize, Serialize};

use crate::player::Player;
use requirement::{skill_requirement_map, QuestRequirement, SkillRequirement};
use reward::QuestRewards;

fn default_true() -> bool {
    true
}

/// A static quest catalogue entry.
///
/// Negative ids denote placeholder quests: pre-satisfied narrative gates that
/// are auto-completed before planning begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub members: bool,
    /// Whether the quest can be completed on an ironman account.
    #[serde(default = "default_true")]
    pub ironman: bool,
    /// Whether the quest is part of the recommended route.
    #[serde(default = "default_true")]
    pub recommended: bool,
    /// Configured selection weight; higher is chosen sooner.
    #[serde(default)]
    pub priority: i32,
    #[serde(default, with = "skill_requirement_map")]
    pub skill_requirements: Vec<SkillRequirement>,
    #[serde(default)]
    pub quest_requirements: Vec<QuestRequirement>,
    #[serde(default)]
    pub rewards: QuestRewards,
}

impl Quest {
    pub fn is_placeholder(&self) -> bool {
        self.id < 0
    }

    pub fn meets_skill_requirements(&self, player: &Player) -> bool {
        self.skill_requirements.iter().all(|r| r.is_met(player))
    }

    pub fn meets_quest_requirements(&self, player: &Player) -> bool {
        self.quest_requirements.iter().all(|r| r.is_met(player))
    }

    /// Mode gates: a quest excluded under the active mode is never eligible,
    /// regardless of levels.
    pub fn meets_other_requirements(&self, ironman: bool, recommended: bool) -> bool {
        (!ironman || self.ironman) && (!recommended || self.recommended)
    }

    pub fn meets_all_requirements(&self, player: &Player, ironman: bool, recommended: bool) -> bool {
        self.meets_other_requirements(ironman, recommended)
            && self.meets_quest_requirements(player)
            && self.meets_skill_requirements(player)
    }

    /// The unmet skill requirements, as the training gaps needed to close
    /// them.
    pub fn remaining_skill_requirements(&self, player: &Player) -> Vec<SkillRequirement> {
        self.skill_requirements
            .iter()
            .filter(|r| !r.is_met(player))
            .copied()
            .collect()
    }

    /// Ranking weight among otherwise-eligible quests. The configured
    /// priority dominates; quest points and any residual skill gap break
    /// ties between equally prioritised quests.
    pub fn priority_for(&self, player: &Player) -> i32 {
        let remaining: u32 = self
            .remaining_skill_requirements(player)
            .iter()
            .map(|r| r.level)
            .sum();
        self.priority * 1000 + self.rewards.quest_points - remaining as i32
    }
}
