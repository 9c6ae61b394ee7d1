use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::Player;
use crate::skill::Skill;

/// A combination of skills a lamp can be spent on.
pub type SkillSet = BTreeSet<Skill>;

/// Xp for each level for small lamps.
const SMALL_XP_LAMP_VALUES: [f64; 98] = [
    62.0, 69.0, 77.0, 85.0, 93.0, 104.0, 123.0, 127.0, 144.0, 153.0, 170.0, 188.0, 205.0, 229.0,
    252.0, 261.0, 274.0, 285.0, 298.0, 310.0, 324.0, 337.0, 352.0, 367.0, 384.0, 399.0, 405.0,
    414.0, 453.0, 473.0, 493.0, 514.0, 536.0, 559.0, 583.0, 608.0, 635.0, 662.0, 691.0, 720.0,
    752.0, 784.0, 818.0, 853.0, 889.0, 929.0, 970.0, 1012.0, 1055.0, 1101.0, 1148.0, 1200.0,
    1249.0, 1304.0, 1362.0, 1422.0, 1485.0, 1546.0, 1616.0, 1684.0, 1757.0, 1835.0, 1911.0, 2004.0,
    2108.0, 2171.0, 2269.0, 2379.0, 2470.0, 2592.0, 2693.0, 2809.0, 2946.0, 3082.0, 3213.0, 3339.0,
    3495.0, 3646.0, 3792.0, 3980.0, 4166.0, 4347.0, 4521.0, 4762.0, 4918.0, 5033.0, 5375.0, 5592.0,
    5922.0, 6121.0, 6451.0, 6614.0, 6928.0, 7236.0, 7532.0, 8064.0, 8347.0, 8602.0,
];

/// Xp for each level for medium lamps.
const MEDIUM_XP_LAMP_VALUES: [f64; 98] = [
    125.0, 138.0, 154.0, 170.0, 186.0, 208.0, 246.0, 254.0, 288.0, 307.0, 340.0, 376.0, 411.0,
    458.0, 504.0, 523.0, 548.0, 570.0, 596.0, 620.0, 649.0, 674.0, 704.0, 735.0, 768.0, 798.0,
    810.0, 828.0, 906.0, 946.0, 986.0, 1028.0, 1072.0, 1118.0, 1166.0, 1217.0, 1270.0, 1324.0,
    1383.0, 1441.0, 1504.0, 1569.0, 1636.0, 1707.0, 1779.0, 1858.0, 1941.0, 2025.0, 2110.0, 2202.0,
    2296.0, 2400.0, 2499.0, 2609.0, 2724.0, 2844.0, 2970.0, 3092.0, 3233.0, 3368.0, 3515.0, 3671.0,
    3822.0, 4009.0, 4216.0, 4343.0, 4538.0, 4758.0, 4940.0, 5185.0, 5386.0, 5618.0, 5893.0, 6164.0,
    6427.0, 6679.0, 6990.0, 7293.0, 7584.0, 7960.0, 8332.0, 8695.0, 9043.0, 9524.0, 9837.0,
    10066.0, 10751.0, 11185.0, 11845.0, 12243.0, 12903.0, 13229.0, 13857.0, 14472.0, 15065.0,
    16129.0, 16695.0, 17204.0,
];

/// Xp for each level for large lamps.
const LARGE_XP_LAMP_VALUES: [f64; 98] = [
    250.0, 276.0, 308.0, 340.0, 373.0, 416.0, 492.0, 508.0, 577.0, 614.0, 680.0, 752.0, 822.0,
    916.0, 1008.0, 1046.0, 1096.0, 1140.0, 1192.0, 1240.0, 1298.0, 1348.0, 1408.0, 1470.0, 1536.0,
    1596.0, 1621.0, 1656.0, 1812.0, 1892.0, 1973.0, 2056.0, 2144.0, 2237.0, 2332.0, 2434.0, 2540.0,
    2648.0, 2766.0, 2882.0, 3008.0, 3138.0, 3272.0, 3414.0, 3558.0, 3716.0, 3882.0, 4050.0, 4220.0,
    4404.0, 4593.0, 4800.0, 4998.0, 5218.0, 5448.0, 5688.0, 5940.0, 6184.0, 6466.0, 6737.0, 7030.0,
    7342.0, 7645.0, 8018.0, 8432.0, 8686.0, 9076.0, 9516.0, 9880.0, 10371.0, 10772.0, 11237.0,
    11786.0, 12328.0, 12855.0, 13358.0, 13980.0, 14587.0, 15169.0, 15920.0, 16664.0, 17390.0,
    18087.0, 19048.0, 19674.0, 20132.0, 21502.0, 22370.0, 23690.0, 24486.0, 25806.0, 26458.0,
    27714.0, 28944.0, 30130.0, 32258.0, 33390.0, 34408.0,
];

/// Xp for each level for huge lamps.
const HUGE_XP_LAMP_VALUES: [f64; 98] = [
    500.0, 552.0, 616.0, 680.0, 746.0, 832.0, 984.0, 1016.0, 1154.0, 1228.0, 1360.0, 1504.0,
    1644.0, 1832.0, 2016.0, 2092.0, 2192.0, 2280.0, 2384.0, 2480.0, 2596.0, 2696.0, 2816.0, 2940.0,
    3072.0, 3192.0, 3242.0, 3312.0, 3624.0, 3784.0, 3946.0, 4112.0, 4288.0, 4474.0, 4664.0, 4868.0,
    5080.0, 5296.0, 5532.0, 5764.0, 6016.0, 6276.0, 6544.0, 6828.0, 7116.0, 7432.0, 7764.0, 8100.0,
    8440.0, 8808.0, 9186.0, 9600.0, 9996.0, 10436.0, 10896.0, 11376.0, 11880.0, 12368.0, 12932.0,
    13474.0, 14060.0, 14684.0, 15290.0, 16036.0, 16864.0, 17372.0, 18152.0, 19032.0, 19760.0,
    20742.0, 21544.0, 22474.0, 23572.0, 24656.0, 25710.0, 26716.0, 27960.0, 29174.0, 30338.0,
    31840.0, 33328.0, 34780.0, 36174.0, 38096.0, 39348.0, 40264.0, 43004.0, 44740.0, 47380.0,
    48972.0, 51612.0, 52916.0, 55428.0, 57888.0, 60260.0, 64516.0, 66780.0, 68816.0,
];

/// How a lamp's experience amount is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LampType {
    /// A flat, configured amount.
    Xp,
    SmallXp,
    MediumXp,
    LargeXp,
    HugeXp,
    /// Closed-form level-scaled curve.
    Dragonkin,
}

impl LampType {
    pub fn is_scaled(self) -> bool {
        self != LampType::Xp
    }
}

/// A level-scaled lamp was applied to more than one skill.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dynamic lamp {id} can only be used on one skill")]
pub struct DynamicLampRewardError {
    pub id: i32,
}

fn default_requirements() -> BTreeMap<SkillSet, u32> {
    Skill::ALL
        .iter()
        .map(|&skill| (SkillSet::from([skill]), 1))
        .collect()
}

fn default_multiplier() -> f64 {
    1.0
}

/// An xp lamp attached to a quest's reward bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LampReward {
    #[serde(default)]
    pub id: i32,
    /// Skill-set to minimum-level eligibility table. Defaults to any single
    /// skill at level 1 when the catalogue omits it.
    #[serde(default = "default_requirements", with = "lamp_requirement_map")]
    pub requirements: BTreeMap<SkillSet, u32>,
    #[serde(default)]
    pub xp: f64,
    #[serde(default)]
    pub exclusive: bool,
    #[serde(rename = "type")]
    pub lamp_type: LampType,
    #[serde(default)]
    pub single_choice: bool,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl LampReward {
    /// The skill selections currently available to `player`.
    ///
    /// Single-choice lamps expand each requirement key into singleton sets.
    /// Exclusive lamps drop selections already present in `previous_choices`.
    pub fn choices(&self, player: &Player, previous_choices: &BTreeSet<SkillSet>) -> Vec<SkillSet> {
        let candidates: BTreeMap<SkillSet, u32> = if self.single_choice {
            let mut expanded = BTreeMap::new();
            for (skills, &level) in &self.requirements {
                for &skill in skills {
                    expanded.insert(SkillSet::from([skill]), level);
                }
            }
            expanded
        } else {
            self.requirements.clone()
        };

        candidates
            .into_iter()
            .filter(|(skills, level)| {
                entry_met(player, skills, *level)
                    && (!self.exclusive || !previous_choices.contains(skills))
            })
            .map(|(skills, _)| skills)
            .collect()
    }

    /// The xp this lamp grants when spent on `skills`.
    pub fn xp_for_skills(
        &self,
        player: &Player,
        skills: &SkillSet,
    ) -> Result<f64, DynamicLampRewardError> {
        if !self.lamp_type.is_scaled() {
            return Ok(self.xp * self.multiplier);
        }

        let skill = match (skills.len(), skills.iter().next()) {
            (1, Some(&skill)) => skill,
            _ => return Err(DynamicLampRewardError { id: self.id }),
        };

        let level = player.level(skill);
        let index = (level.min(98) - 1) as usize;
        let base = match self.lamp_type {
            LampType::SmallXp => SMALL_XP_LAMP_VALUES[index],
            LampType::MediumXp => MEDIUM_XP_LAMP_VALUES[index],
            LampType::LargeXp => LARGE_XP_LAMP_VALUES[index],
            LampType::HugeXp => HUGE_XP_LAMP_VALUES[index],
            LampType::Dragonkin => {
                let level = f64::from(level);
                ((level.powi(3) - 2.0 * level.powi(2) + 100.0 * level) / 20.0).floor()
            }
            LampType::Xp => self.xp,
        };

        Ok(base * self.multiplier)
    }

    /// Whether at least one requirement entry is fully satisfied.
    pub fn meets_requirements(&self, player: &Player) -> bool {
        if self.requirements.is_empty() {
            return true;
        }
        self.requirements
            .iter()
            .any(|(skills, &level)| entry_met(player, skills, level))
    }
}

fn entry_met(player: &Player, skills: &SkillSet, level: u32) -> bool {
    skills.iter().all(|&skill| {
        if skill == Skill::Invention && !invention_unlocked(player) {
            return false;
        }
        player.level(skill) >= level
    })
}

/// Invention is gated on level 80 in each of its three parent skills.
fn invention_unlocked(player: &Player) -> bool {
    player.level(Skill::Crafting) >= 80
        && player.level(Skill::Divination) >= 80
        && player.level(Skill::Smithing) >= 80
}

/// All rewards granted by completing a quest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestRewards {
    pub xp: BTreeMap<Skill, f64>,
    pub lamps: Vec<LampReward>,
    pub quest_points: i32,
}

/// Codec for lamp requirement maps.
///
/// The catalogue uses `"*"` for "any single skill at this level" and `"&"`
/// for "every skill at this level"; explicit keys are comma-joined skill
/// names. Shorthand is expanded to the canonical per-skill-set map at load
/// time and collapsed back when the special shapes are detected at save time.
mod lamp_requirement_map {
    use std::collections::BTreeMap;

    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::SkillSet;
    use crate::skill::Skill;

    const ANY_SKILL: &str = "*";
    const ALL_SKILLS: &str = "&";

    pub fn serialize<S>(
        requirements: &BTreeMap<SkillSet, u32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut out: BTreeMap<String, u32> = BTreeMap::new();

        let all_singletons = requirements.len() == Skill::ALL.len()
            && requirements.keys().all(|skills| skills.len() == 1);
        let mut levels = requirements.values();
        let first_level = levels.next().copied();
        let uniform = first_level.is_some() && levels.all(|&level| Some(level) == first_level);

        if let (true, true, Some(level)) = (all_singletons, uniform, first_level) {
            out.insert(ANY_SKILL.to_string(), level);
        } else if requirements.len() == 1
            && requirements
                .keys()
                .next()
                .is_some_and(|skills| skills.len() == Skill::ALL.len())
        {
            if let Some((_, &level)) = requirements.iter().next() {
                out.insert(ALL_SKILLS.to_string(), level);
            }
        } else {
            for (skills, &level) in requirements {
                let key = skills
                    .iter()
                    .map(Skill::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                out.insert(key, level);
            }
        }

        out.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<SkillSet, u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, u32>::deserialize(deserializer)?;
        let mut requirements = BTreeMap::new();

        for (key, level) in raw {
            match key.as_str() {
                ANY_SKILL => {
                    for &skill in &Skill::ALL {
                        requirements.insert(SkillSet::from([skill]), level);
                    }
                }
                ALL_SKILLS => {
                    requirements.insert(Skill::ALL.iter().copied().collect(), level);
                }
                _ => {
                    let skills = key
                        .split(',')
                        .map(|name| {
                            name.trim().to_uppercase().parse::<Skill>().map_err(|_| {
                                D::Error::custom(format!(
                                    "unknown skill in lamp requirement key: {name}"
                                ))
                            })
                        })
                        .collect::<Result<SkillSet, _>>()?;
                    requirements.insert(skills, level);
                }
            }
        }

        Ok(requirements)
    }
}
