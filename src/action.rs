use serde::Serialize;

use crate::path::PlanContext;
use crate::player::Player;
use crate::quest::reward::{DynamicLampRewardError, LampReward, SkillSet};
use crate::quest::Quest;
use crate::skill::Skill;

/// Discriminant tag exposed on the wire for each action variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Train,
    Quest,
    Lamp,
}

/// One simulated state transition in a planned path.
///
/// Each variant snapshots the player it was generated against; the snapshot
/// is display data only and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Train(TrainAction),
    Quest(QuestAction),
    Lamp(LampAction),
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::Train(_) => ActionType::Train,
            Action::Quest(_) => ActionType::Quest,
            Action::Lamp(_) => ActionType::Lamp,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Action::Train(action) => action.message(),
            Action::Quest(action) => action.message(),
            Action::Lamp(action) => action.message(),
        }
    }

    pub fn player(&self) -> &Player {
        match self {
            Action::Train(action) => &action.player,
            Action::Quest(action) => &action.player,
            Action::Lamp(action) => &action.player,
        }
    }

    pub fn is_future(&self) -> bool {
        match self {
            Action::Lamp(action) => action.is_future(),
            _ => false,
        }
    }

    /// Re-applies this action against another player, for hypothetical
    /// replay. Train and quest actions are idempotent; a lamp grants its
    /// experience on every application.
    pub fn process(
        &self,
        player: &mut Player,
        context: &PlanContext,
    ) -> Result<(), DynamicLampRewardError> {
        match self {
            Action::Train(action) => {
                action.process(player);
                Ok(())
            }
            Action::Quest(action) => action.process(player, context),
            Action::Lamp(action) => action.process(player),
        }
    }

    /// A structurally equal action bound to a different player snapshot.
    pub fn copy_for_player(&self, player: Player) -> Action {
        match self {
            Action::Train(action) => Action::Train(TrainAction { player, ..action.clone() }),
            Action::Quest(action) => Action::Quest(QuestAction { player, ..action.clone() }),
            Action::Lamp(action) => Action::Lamp(LampAction { player, ..action.clone() }),
        }
    }
}

/// Training a skill from one experience total to another.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainAction {
    pub(crate) player: Player,
    pub skill: Skill,
    pub start_xp: f64,
    pub end_xp: f64,
}

impl TrainAction {
    pub fn new(player: Player, skill: Skill, start_xp: f64, end_xp: f64) -> Self {
        Self {
            player,
            skill,
            start_xp,
            end_xp,
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Train {} to level {}, gaining {} xp",
            self.skill,
            self.skill.level_at(self.end_xp),
            (self.end_xp - self.start_xp).round()
        )
    }

    pub fn process(&self, player: &mut Player) {
        player.raise_experience_to(self.skill, self.end_xp);
    }
}

/// Completing a quest.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestAction {
    pub(crate) player: Player,
    pub quest: Quest,
}

impl QuestAction {
    pub fn new(player: Player, quest: Quest) -> Self {
        Self { player, quest }
    }

    pub fn message(&self) -> String {
        self.quest.title.clone()
    }

    pub fn meets_requirements(&self, player: &Player, ironman: bool, recommended: bool) -> bool {
        self.quest.meets_all_requirements(player, ironman, recommended)
    }

    pub fn process(
        &self,
        player: &mut Player,
        context: &PlanContext,
    ) -> Result<(), DynamicLampRewardError> {
        if player.is_quest_completed(self.quest.id) {
            return Ok(());
        }
        player.complete_quest(&self.quest, context)?;
        Ok(())
    }
}

/// Spending a lamp reward on the chosen skills.
#[derive(Debug, Clone, PartialEq)]
pub struct LampAction {
    pub(crate) player: Player,
    pub quest: Quest,
    pub lamp: LampReward,
    skills: SkillSet,
    /// Generated speculatively rather than actually executed yet.
    future: bool,
}

impl LampAction {
    pub fn new(player: Player, quest: Quest, lamp: LampReward, skills: SkillSet, future: bool) -> Self {
        Self {
            player,
            quest,
            lamp,
            skills,
            future,
        }
    }

    pub fn skills(&self) -> &SkillSet {
        &self.skills
    }

    pub fn is_future(&self) -> bool {
        self.future
    }

    pub fn message(&self) -> String {
        let skills = if self.skills.is_empty() {
            "a skill of choice".to_string()
        } else {
            self.skills
                .iter()
                .map(Skill::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        if self.future {
            format!(
                "{}: use xp lamp on {} when requirements are met",
                self.quest.title, skills
            )
        } else {
            format!("{}: use xp lamp on {}", self.quest.title, skills)
        }
    }

    pub fn process(&self, player: &mut Player) -> Result<(), DynamicLampRewardError> {
        if self.future || self.skills.is_empty() {
            return Ok(());
        }
        let xp = self.lamp.xp_for_skills(player, &self.skills)?;
        for &skill in &self.skills {
            player.add_experience(skill, xp);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::fixtures;

    #[test]
    fn train_action_message_and_process() {
        let player = fixtures::player();
        let target = Skill::Cooking.xp_at(10);
        let action = TrainAction::new(player.clone(), Skill::Cooking, 0.0, target);

        assert_eq!(
            action.message(),
            "Train COOKING to level 10, gaining 1154 xp"
        );

        let mut subject = fixtures::player();
        action.process(&mut subject);
        assert_eq!(subject.xp(Skill::Cooking), target);

        // Idempotent, and never lowers experience.
        subject.add_experience(Skill::Cooking, 10_000.0);
        let before = subject.xp(Skill::Cooking);
        action.process(&mut subject);
        assert_eq!(subject.xp(Skill::Cooking), before);
    }

    #[test]
    fn quest_action_message_is_title_and_process_completes() {
        let mut quest = fixtures::quest(1, "Cook's Assistant");
        quest.rewards.quest_points = 1;
        let catalogue = fixtures::catalogue(vec![quest.clone()]);
        let context = PlanContext::new(&catalogue);

        let action = QuestAction::new(fixtures::player(), quest);
        assert_eq!(action.message(), "Cook's Assistant");

        let mut subject = fixtures::player();
        action.process(&mut subject, &context).unwrap();
        assert!(subject.is_quest_completed(1));
        assert_eq!(subject.quest_points(), 1);

        // Re-applying is a no-op.
        action.process(&mut subject, &context).unwrap();
        assert_eq!(subject.quest_points(), 1);
    }

    #[test]
    fn lamp_action_applies_xp_to_each_chosen_skill() {
        let quest = fixtures::quest(1, "Lamp quest");
        let lamp = fixtures::xp_lamp(1, 500.0);
        let skills = SkillSet::from([Skill::Attack, Skill::Defence]);
        let action = LampAction::new(fixtures::player(), quest, lamp, skills, false);

        assert_eq!(
            action.message(),
            "Lamp quest: use xp lamp on ATTACK, DEFENCE"
        );

        let mut subject = fixtures::player();
        action.process(&mut subject).unwrap();
        assert_eq!(subject.xp(Skill::Attack), 500.0);
        assert_eq!(subject.xp(Skill::Defence), 500.0);
    }

    #[test]
    fn future_lamp_action_is_inert() {
        let quest = fixtures::quest(1, "Lamp quest");
        let lamp = fixtures::xp_lamp(1, 500.0);
        let action = LampAction::new(fixtures::player(), quest, lamp, SkillSet::new(), true);

        assert_eq!(
            action.message(),
            "Lamp quest: use xp lamp on a skill of choice when requirements are met"
        );

        let mut subject = fixtures::player();
        action.process(&mut subject).unwrap();
        assert_eq!(subject.xp(Skill::Attack), 0.0);
    }

    #[test]
    fn copy_for_player_rebinds_only_the_snapshot() {
        let quest = fixtures::quest(1, "Quest");
        let original = Action::Quest(QuestAction::new(fixtures::player(), quest.clone()));

        let mut other = fixtures::player();
        other.add_experience(Skill::Attack, 1000.0);
        let copied = original.copy_for_player(other.clone());

        assert_eq!(copied.player(), &other);
        match (&original, &copied) {
            (Action::Quest(a), Action::Quest(b)) => assert_eq!(a.quest, b.quest),
            _ => panic!("variant changed by copy_for_player"),
        }
    }
}
