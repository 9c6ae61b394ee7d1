use serde::{Deserialize, Serialize};

use crate::player::Player;
use crate::skill::Skill;

/// A minimum level in a single skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub skill: Skill,
    pub level: u32,
}

impl SkillRequirement {
    pub fn new(skill: Skill, level: u32) -> Self {
        Self { skill, level }
    }

    pub fn is_met(&self, player: &Player) -> bool {
        player.level(self.skill) >= self.level
    }
}

/// Completion of another quest, referenced by catalogue id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestRequirement {
    pub id: i32,
}

impl QuestRequirement {
    pub fn is_met(&self, player: &Player) -> bool {
        player.is_quest_completed(self.id)
    }
}

/// Merges `other` into `remaining`, keeping the higher level when both sets
/// require the same skill. Associative and idempotent.
pub fn amalgamate_requirements(remaining: &mut Vec<SkillRequirement>, other: &[SkillRequirement]) {
    for req in other {
        match remaining.iter_mut().find(|r| r.skill == req.skill) {
            Some(existing) => {
                if req.level > existing.level {
                    existing.level = req.level;
                }
            }
            None => remaining.push(*req),
        }
    }
}

/// Codec for skill requirements stored as a `{"SKILL": level}` JSON object.
pub mod skill_requirement_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::SkillRequirement;
    use crate::skill::Skill;

    pub fn serialize<S>(requirements: &[SkillRequirement], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let map: BTreeMap<Skill, u32> = requirements.iter().map(|r| (r.skill, r.level)).collect();
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<SkillRequirement>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = BTreeMap::<Skill, u32>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .map(|(skill, level)| SkillRequirement { skill, level })
            .collect())
    }
}
