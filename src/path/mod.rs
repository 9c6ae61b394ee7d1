use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::action::{Action, TrainAction};
use crate::player::Player;
use crate::quest::catalogue::QuestCatalogue;
use crate::quest::reward::DynamicLampRewardError;
use crate::quest::Quest;
use crate::skill::Skill;

/// Everything a planning run reads: the shared catalogue plus the run
/// configuration. Replaces ambient global state; construct one per run (or
/// per request) and pass it down.
#[derive(Debug, Clone)]
pub struct PlanContext<'a> {
    pub catalogue: &'a QuestCatalogue,
    pub ironman: bool,
    pub recommended: bool,
    /// When non-empty, lamp rewards are forced onto these skills instead of
    /// the lookahead heuristic.
    pub lamp_skills: BTreeSet<Skill>,
}

impl<'a> PlanContext<'a> {
    pub fn new(catalogue: &'a QuestCatalogue) -> Self {
        Self {
            catalogue,
            ironman: false,
            recommended: false,
            lamp_skills: BTreeSet::new(),
        }
    }
}

/// The planner could not find a next quest even under the relaxed
/// closest-quest filter: the catalogue's requirement graph is unsatisfiable
/// or cyclic for this player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("unable to find next quest to complete ({open} quests still open)")]
    QuestNotFound { open: usize },
    #[error(transparent)]
    Lamp(#[from] DynamicLampRewardError),
}

/// Greedy single-pass quest selection over the open quest set.
pub struct PathFinder<'a> {
    context: &'a PlanContext<'a>,
}

impl<'a> PathFinder<'a> {
    pub fn new(context: &'a PlanContext<'a>) -> Self {
        Self { context }
    }

    /// Runs the selection loop to completion, consuming the player.
    pub fn find(&self, mut player: Player) -> Result<Path, PathError> {
        let mut actions: Vec<Action> = Vec::new();
        let mut open: Vec<&Quest> = self
            .context
            .catalogue
            .quests()
            .iter()
            .filter(|q| !player.is_quest_completed(q.id))
            .collect();

        // Placeholder quests are pre-satisfied narrative gates: complete
        // them up front and keep them out of the action list.
        let placeholders: Vec<&Quest> = open.iter().copied().filter(|q| q.is_placeholder()).collect();
        open.retain(|q| !q.is_placeholder());
        for quest in placeholders {
            debug!(quest = %quest.title, id = quest.id, "auto-completing placeholder quest");
            player.complete_quest(quest, self.context)?;
        }

        while !open.is_empty() {
            let index = self.next_quest(&mut player, &open, &mut actions)?;
            let quest = open.remove(index);

            debug!(quest = %quest.title, "completing quest");
            let new_actions = player.complete_quest(quest, self.context)?;
            actions.extend(new_actions);
        }

        let stats = PathStats::from_player(&player, self.context.catalogue);
        Ok(Path { actions, stats })
    }

    /// Picks the next quest from the open set, appending synthesized train
    /// actions when falling back to the closest quest.
    ///
    /// The best quest is the highest-priority open quest whose requirements
    /// and lamp requirements are all met. Failing that, the closest quest is
    /// the one needing the fewest total levels of training among those
    /// meeting every non-skill requirement; its skill gaps are trained
    /// before it is selected. Lamp eligibility is checked once, before the
    /// synthesized training.
    fn next_quest(
        &self,
        player: &mut Player,
        open: &[&Quest],
        actions: &mut Vec<Action>,
    ) -> Result<usize, PathError> {
        if let Some(index) = self.best_quest(player, open) {
            return Ok(index);
        }

        let index = self
            .closest_quest(player, open)
            .ok_or(PathError::QuestNotFound { open: open.len() })?;

        // Materialize the training the player must do to reach it. The gaps
        // are trained in skill order for determinism.
        let mut remaining = open[index].remaining_skill_requirements(player);
        remaining.sort_by_key(|r| r.skill);
        for requirement in remaining {
            let target = requirement.skill.xp_at(requirement.level);
            let current = player.xp(requirement.skill);
            player.raise_experience_to(requirement.skill, target);

            let action = TrainAction::new(player.clone(), requirement.skill, current, target);
            debug!(message = %action.message(), "adding train action");
            actions.push(Action::Train(action));
        }

        Ok(index)
    }

    fn best_quest(&self, player: &Player, open: &[&Quest]) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;
        for (index, quest) in open.iter().enumerate() {
            if !quest.meets_all_requirements(player, self.context.ironman, self.context.recommended)
            {
                continue;
            }
            if !quest
                .rewards
                .lamps
                .iter()
                .all(|lamp| lamp.meets_requirements(player))
            {
                continue;
            }

            let priority = quest.priority_for(player);
            // Strictly-greater keeps the earliest catalogue entry on ties.
            if best.map_or(true, |(_, current)| priority > current) {
                best = Some((index, priority));
            }
        }
        best.map(|(index, _)| index)
    }

    fn closest_quest(&self, player: &Player, open: &[&Quest]) -> Option<usize> {
        let mut closest: Option<(usize, u32)> = None;
        for (index, quest) in open.iter().enumerate() {
            if !quest.meets_other_requirements(self.context.ironman, self.context.recommended)
                || !quest.meets_quest_requirements(player)
            {
                continue;
            }
            if !quest
                .rewards
                .lamps
                .iter()
                .all(|lamp| lamp.meets_requirements(player))
            {
                continue;
            }

            let distance: u32 = quest
                .remaining_skill_requirements(player)
                .iter()
                .map(|r| r.level)
                .sum();
            if closest.map_or(true, |(_, current)| distance < current) {
                closest = Some((index, distance));
            }
        }
        closest.map(|(index, _)| index)
    }
}

/// The finished output of a planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    actions: Vec<Action>,
    stats: PathStats,
}

impl Path {
    pub fn new(actions: Vec<Action>, stats: PathStats) -> Self {
        Self { actions, stats }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn stats(&self) -> &PathStats {
        &self.stats
    }
}

/// Completion statistics derived at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStats {
    pub percent_complete: f64,
    pub quest_points: i32,
}

impl PathStats {
    pub fn new(percent_complete: f64, quest_points: i32) -> Self {
        Self {
            percent_complete,
            quest_points,
        }
    }

    fn from_player(player: &Player, catalogue: &QuestCatalogue) -> Self {
        let total = catalogue.len();
        let completed = catalogue
            .quests()
            .iter()
            .filter(|q| player.is_quest_completed(q.id))
            .count();
        let percent_complete = if total == 0 {
            100.0
        } else {
            completed as f64 / total as f64 * 100.0
        };

        Self {
            percent_complete,
            quest_points: player.quest_points(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::action::ActionType;
    use crate::quest::requirement::{QuestRequirement, SkillRequirement};
    use crate::quest::reward::SkillSet;
    use crate::testdata::fixtures;

    #[test]
    fn single_quest_catalogue_completes_in_one_action() {
        let mut quest = fixtures::quest(0, "Cook's Assistant");
        quest.rewards.quest_points = 5;
        quest.rewards.xp = BTreeMap::from([(Skill::Attack, 5000.0)]);

        let catalogue = fixtures::catalogue(vec![quest]);
        let context = PlanContext::new(&catalogue);

        let path = PathFinder::new(&context).find(fixtures::player()).unwrap();

        assert_eq!(path.actions().len(), 1);
        assert_eq!(path.actions()[0].action_type(), ActionType::Quest);
        assert_eq!(path.stats().percent_complete, 100.0);
        assert_eq!(path.stats().quest_points, 5);

        let final_player = path.actions()[0].player();
        assert!(final_player.xp(Skill::Attack) >= 5000.0);
    }

    #[test]
    fn orders_prerequisite_quest_first_and_trains_the_gap() {
        let mut first = fixtures::quest(0, "First");
        first.rewards.xp = BTreeMap::from([(Skill::Attack, 100.0)]);

        let mut second = fixtures::quest(1, "Second");
        second.quest_requirements = vec![QuestRequirement { id: 0 }];
        second.skill_requirements = vec![SkillRequirement::new(Skill::Attack, 10)];

        let catalogue = fixtures::catalogue(vec![second, first]);
        let context = PlanContext::new(&catalogue);

        let path = PathFinder::new(&context).find(fixtures::player()).unwrap();

        let kinds: Vec<ActionType> = path.actions().iter().map(Action::action_type).collect();
        assert_eq!(
            kinds,
            vec![ActionType::Quest, ActionType::Train, ActionType::Quest]
        );

        let messages: Vec<String> = path.actions().iter().map(Action::message).collect();
        assert_eq!(messages[0], "First");
        assert_eq!(messages[2], "Second");

        // The train action brings Attack exactly to the level-10 threshold.
        match &path.actions()[1] {
            Action::Train(train) => {
                assert_eq!(train.skill, Skill::Attack);
                assert_eq!(train.start_xp, 100.0);
                assert_eq!(train.end_xp, Skill::Attack.xp_at(10));
            }
            other => panic!("expected train action, got {other:?}"),
        }
    }

    #[test]
    fn placeholder_quests_never_appear_in_the_path() {
        let mut placeholder = fixtures::quest(-1, "Tutorial");
        placeholder.rewards.xp = BTreeMap::from([(Skill::Attack, 1000.0)]);

        let mut quest = fixtures::quest(1, "Real quest");
        quest.skill_requirements = vec![SkillRequirement::new(Skill::Attack, 5)];

        let catalogue = fixtures::catalogue(vec![placeholder, quest]);
        let context = PlanContext::new(&catalogue);

        let path = PathFinder::new(&context).find(fixtures::player()).unwrap();

        // The placeholder xp satisfied the requirement, so no training
        // either: one quest action only.
        assert_eq!(path.actions().len(), 1);
        assert_eq!(path.actions()[0].message(), "Real quest");
        assert_eq!(path.stats().percent_complete, 100.0);
    }

    #[test]
    fn higher_priority_quest_is_selected_first() {
        let mut low = fixtures::quest(0, "Low");
        low.rewards.quest_points = 1;
        let mut high = fixtures::quest(1, "High");
        high.priority = 1;
        high.rewards.quest_points = 1;

        let catalogue = fixtures::catalogue(vec![low, high]);
        let context = PlanContext::new(&catalogue);

        let path = PathFinder::new(&context).find(fixtures::player()).unwrap();
        let messages: Vec<String> = path.actions().iter().map(Action::message).collect();
        assert_eq!(messages, vec!["High", "Low"]);
    }

    #[test]
    fn priority_ties_keep_catalogue_order() {
        let catalogue = fixtures::catalogue(vec![
            fixtures::quest(5, "Alpha"),
            fixtures::quest(3, "Beta"),
            fixtures::quest(9, "Gamma"),
        ]);
        let context = PlanContext::new(&catalogue);

        let path = PathFinder::new(&context).find(fixtures::player()).unwrap();
        let messages: Vec<String> = path.actions().iter().map(Action::message).collect();
        assert_eq!(messages, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn closest_quest_minimizes_total_training() {
        let mut far = fixtures::quest(0, "Far");
        far.skill_requirements = vec![SkillRequirement::new(Skill::Mining, 60)];
        let mut near = fixtures::quest(1, "Near");
        near.skill_requirements = vec![SkillRequirement::new(Skill::Fishing, 20)];

        let catalogue = fixtures::catalogue(vec![far, near]);
        let context = PlanContext::new(&catalogue);

        let path = PathFinder::new(&context).find(fixtures::player()).unwrap();
        let messages: Vec<String> = path.actions().iter().map(Action::message).collect();

        // Near (20 levels) is trained and completed before Far (60 levels).
        assert_eq!(messages[0], "Train FISHING to level 20, gaining 4470 xp");
        assert_eq!(messages[1], "Near");
        assert_eq!(messages[3], "Far");
    }

    #[test]
    fn ironman_mode_excludes_ineligible_quests() {
        let mut excluded = fixtures::quest(0, "Not for ironmen");
        excluded.ironman = false;
        let quest = fixtures::quest(1, "Open to all");

        let catalogue = fixtures::catalogue(vec![excluded, quest]);
        let mut context = PlanContext::new(&catalogue);
        context.ironman = true;

        // The excluded quest can never be selected: the run fails once only
        // it remains open.
        let result = PathFinder::new(&context).find(fixtures::player());
        assert_eq!(result.unwrap_err(), PathError::QuestNotFound { open: 1 });
    }

    #[test]
    fn unsatisfiable_requirements_fail_with_quest_not_found() {
        // A two-quest cycle: each requires the other.
        let mut a = fixtures::quest(0, "A");
        a.quest_requirements = vec![QuestRequirement { id: 1 }];
        let mut b = fixtures::quest(1, "B");
        b.quest_requirements = vec![QuestRequirement { id: 0 }];

        let catalogue = fixtures::catalogue(vec![a, b]);
        let context = PlanContext::new(&catalogue);

        let result = PathFinder::new(&context).find(fixtures::player());
        assert_eq!(result.unwrap_err(), PathError::QuestNotFound { open: 2 });
    }

    #[test]
    fn lamp_eligibility_is_checked_before_synthesized_training() {
        // The quest's lamp needs Agility 30 and its skill requirement would
        // train Agility to 30, but the lamp filter runs before training:
        // the quest is never selectable. Pinned deliberately; see the
        // closest-quest fallback notes.
        let mut lamp = fixtures::xp_lamp(1, 100.0);
        lamp.requirements = BTreeMap::from([(SkillSet::from([Skill::Agility]), 30)]);

        let mut quest = fixtures::quest(0, "Gated by its own lamp");
        quest.skill_requirements = vec![SkillRequirement::new(Skill::Agility, 30)];
        quest.rewards.lamps = vec![lamp];

        let catalogue = fixtures::catalogue(vec![quest]);
        let context = PlanContext::new(&catalogue);

        let result = PathFinder::new(&context).find(fixtures::player());
        assert_eq!(result.unwrap_err(), PathError::QuestNotFound { open: 1 });
    }

    #[test]
    fn already_completed_quests_are_skipped() {
        let done = fixtures::quest(0, "Done");
        let mut remaining = fixtures::quest(1, "Remaining");
        remaining.quest_requirements = vec![QuestRequirement { id: 0 }];

        let catalogue = fixtures::catalogue(vec![done.clone(), remaining]);
        let context = PlanContext::new(&catalogue);

        let mut player = fixtures::player();
        player.mark_completed(&done);

        let path = PathFinder::new(&context).find(player).unwrap();
        let messages: Vec<String> = path.actions().iter().map(Action::message).collect();
        assert_eq!(messages, vec!["Remaining"]);
    }

    #[test]
    fn equal_inputs_produce_equal_paths() {
        let mut first = fixtures::quest(0, "First");
        first.rewards.lamps = vec![fixtures::xp_lamp(1, 500.0)];
        let mut second = fixtures::quest(1, "Second");
        second.skill_requirements = vec![SkillRequirement::new(Skill::Herblore, 5)];

        let catalogue = fixtures::catalogue(vec![first, second]);
        let context = PlanContext::new(&catalogue);

        let a = PathFinder::new(&context).find(fixtures::player()).unwrap();
        let b = PathFinder::new(&context).find(fixtures::player()).unwrap();
        assert_eq!(a, b);
    }
}
