//! Serialized views of a planning run, shaped for transport.

use serde::Serialize;

use crate::action::Action;
use crate::path::{Path, PathStats};
use crate::player::Player;
use crate::quest::Quest;
use crate::skill::Skill;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDto {
    pub actions: Vec<ActionDto>,
    pub stats: PathStats,
}

impl PathDto {
    pub fn from_path(path: &Path) -> Self {
        Self {
            actions: path.actions().iter().map(ActionDto::from_action).collect(),
            stats: *path.stats(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ActionDto {
    #[serde(rename = "TRAIN")]
    Train {
        message: String,
        player: PlayerDto,
        skill: Skill,
        start_xp: f64,
        end_xp: f64,
    },
    #[serde(rename = "QUEST")]
    Quest {
        message: String,
        player: PlayerDto,
        quest: QuestDto,
    },
    #[serde(rename = "LAMP")]
    Lamp {
        message: String,
        player: PlayerDto,
        quest: QuestDto,
        lamp_id: i32,
        skills: Vec<Skill>,
        future: bool,
    },
}

impl ActionDto {
    pub fn from_action(action: &Action) -> Self {
        match action {
            Action::Train(train) => ActionDto::Train {
                message: train.message(),
                player: PlayerDto::from_player(&train.player),
                skill: train.skill,
                start_xp: train.start_xp,
                end_xp: train.end_xp,
            },
            Action::Quest(quest) => ActionDto::Quest {
                message: quest.message(),
                player: PlayerDto::from_player(&quest.player),
                quest: QuestDto::from_quest(&quest.quest),
            },
            Action::Lamp(lamp) => ActionDto::Lamp {
                message: lamp.message(),
                player: PlayerDto::from_player(&lamp.player),
                quest: QuestDto::from_quest(&lamp.quest),
                lamp_id: lamp.lamp.id,
                skills: lamp.skills().iter().copied().collect(),
                future: lamp.is_future(),
            },
        }
    }
}

/// The player snapshot an action was generated against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub name: Option<String>,
    pub quest_points: i32,
    pub total_level: u32,
}

impl PlayerDto {
    pub fn from_player(player: &Player) -> Self {
        Self {
            name: player.name().map(str::to_owned),
            quest_points: player.quest_points(),
            total_level: player.total_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestDto {
    pub id: i32,
    pub title: String,
}

impl QuestDto {
    pub fn from_quest(quest: &Quest) -> Self {
        Self {
            id: quest.id,
            title: quest.title.clone(),
        }
    }
}
