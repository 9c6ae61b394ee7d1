use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Highest level reachable on the standard experience curve.
pub const MAX_LEVEL: u32 = 99;

/// Highest level for the extended-curve skills (Dungeoneering, Invention).
pub const MAX_EXTENDED_LEVEL: u32 = 120;

lazy_static! {
    /// Total experience required for each level, indexed by level.
    ///
    /// XP_TABLE[1] == 0.0 and the table extends through the extended level
    /// cap so every skill can share it.
    static ref XP_TABLE: Vec<f64> = {
        let mut table = Vec::with_capacity(MAX_EXTENDED_LEVEL as usize + 1);
        table.push(0.0); // level 0 unused
        table.push(0.0);
        let mut points: f64 = 0.0;
        for level in 1..MAX_EXTENDED_LEVEL {
            points += (level as f64 + 300.0 * 2f64.powf(level as f64 / 7.0)).floor();
            table.push((points / 4.0).floor());
        }
        table
    };
}

/// A trainable skill, declared in hiscores row order so that
/// `id` doubles as the feed row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Skill {
    Attack,
    Defence,
    Strength,
    Constitution,
    Ranged,
    Prayer,
    Magic,
    Cooking,
    Woodcutting,
    Fletching,
    Fishing,
    Firemaking,
    Crafting,
    Smithing,
    Mining,
    Herblore,
    Agility,
    Thieving,
    Slayer,
    Farming,
    Runecrafting,
    Hunter,
    Construction,
    Summoning,
    Dungeoneering,
    Divination,
    Invention,
}

serde_plain::derive_display_from_serialize!(Skill);
serde_plain::derive_fromstr_from_deserialize!(Skill);

impl Skill {
    pub const ALL: [Skill; 27] = [
        Skill::Attack,
        Skill::Defence,
        Skill::Strength,
        Skill::Constitution,
        Skill::Ranged,
        Skill::Prayer,
        Skill::Magic,
        Skill::Cooking,
        Skill::Woodcutting,
        Skill::Fletching,
        Skill::Fishing,
        Skill::Firemaking,
        Skill::Crafting,
        Skill::Smithing,
        Skill::Mining,
        Skill::Herblore,
        Skill::Agility,
        Skill::Thieving,
        Skill::Slayer,
        Skill::Farming,
        Skill::Runecrafting,
        Skill::Hunter,
        Skill::Construction,
        Skill::Summoning,
        Skill::Dungeoneering,
        Skill::Divination,
        Skill::Invention,
    ];

    /// Hiscores id, starting at 1 for Attack.
    pub fn id(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_id(id: u32) -> Option<Skill> {
        if id == 0 {
            return None;
        }
        Skill::ALL.get(id as usize - 1).copied()
    }

    pub fn max_level(self) -> u32 {
        match self {
            Skill::Dungeoneering | Skill::Invention => MAX_EXTENDED_LEVEL,
            _ => MAX_LEVEL,
        }
    }

    /// The experience floor a fresh character starts with.
    pub fn initial_xp(self) -> f64 {
        match self {
            // Constitution starts at level 10.
            Skill::Constitution => 1154.0,
            _ => 0.0,
        }
    }

    /// Total experience required for `level`, clamped to the defined range.
    pub fn xp_at(self, level: u32) -> f64 {
        let level = level.clamp(1, self.max_level());
        XP_TABLE[level as usize]
    }

    /// The level reached with `xp` experience, clamped to the defined range.
    pub fn level_at(self, xp: f64) -> u32 {
        let max = self.max_level();
        let mut level = 1;
        while level < max && XP_TABLE[level as usize + 1] <= xp {
            level += 1;
        }
        level
    }
}
