pub mod hiscores;
pub mod runemetrics;
pub mod service;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::action::{Action, LampAction, QuestAction};
use crate::path::PlanContext;
use crate::quest::reward::{DynamicLampRewardError, LampReward, SkillSet};
use crate::quest::Quest;
use crate::skill::Skill;

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    xp: BTreeMap<Skill, f64>,
    completed_quests: BTreeSet<i32>,
    quest_points: i32,
}

fn initial_xp_map() -> BTreeMap<Skill, f64> {
    Skill::ALL
        .iter()
        .map(|&skill| (skill, skill.initial_xp()))
        .collect()
}

/// Mutable simulation state for a single planning run.
///
/// Cloning is cheap by design: the lamp-choice lookahead clones the player
/// once per candidate choice, never the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    name: Option<String>,
    xp: BTreeMap<Skill, f64>,
    completed_quests: BTreeSet<i32>,
    quest_points: i32,
    /// Skill-sets already spent per lamp id, enforcing exclusive lamps.
    lamp_choices: BTreeMap<i32, BTreeSet<SkillSet>>,
    baseline: Option<Box<Snapshot>>,
}

impl Player {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            xp: initial_xp_map(),
            completed_quests: BTreeSet::new(),
            quest_points: 0,
            lamp_choices: BTreeMap::new(),
            baseline: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn xp(&self, skill: Skill) -> f64 {
        self.xp.get(&skill).copied().unwrap_or_else(|| skill.initial_xp())
    }

    pub fn level(&self, skill: Skill) -> u32 {
        skill.level_at(self.xp(skill))
    }

    pub fn total_level(&self) -> u32 {
        Skill::ALL.iter().map(|&skill| self.level(skill)).sum()
    }

    pub fn quest_points(&self) -> i32 {
        self.quest_points
    }

    pub fn is_quest_completed(&self, id: i32) -> bool {
        self.completed_quests.contains(&id)
    }

    pub fn completed_quests(&self) -> &BTreeSet<i32> {
        &self.completed_quests
    }

    /// Adds experience to a skill. Experience never decreases.
    pub fn add_experience(&mut self, skill: Skill, amount: f64) {
        let entry = self.xp.entry(skill).or_insert_with(|| skill.initial_xp());
        *entry += amount.max(0.0);
    }

    /// Raises a skill to `target` xp, never lowering it.
    pub fn raise_experience_to(&mut self, skill: Skill, target: f64) {
        let entry = self.xp.entry(skill).or_insert_with(|| skill.initial_xp());
        if target > *entry {
            *entry = target;
        }
    }

    /// Overwrites skill experience from an external feed, clamping values
    /// below the skill's floor up to the floor.
    pub fn merge_skill_xp(&mut self, xps: &BTreeMap<Skill, f64>) {
        for (&skill, &xp) in xps {
            self.xp.insert(skill, xp.max(skill.initial_xp()));
        }
    }

    /// Marks a quest as already completed, crediting its quest points but no
    /// other rewards. Used when merging a completion-status feed.
    pub fn mark_completed(&mut self, quest: &Quest) {
        if self.completed_quests.insert(quest.id) {
            self.quest_points += quest.rewards.quest_points;
        }
    }

    /// Captures the current state as the baseline that `reset` restores.
    pub fn snapshot_baseline(&mut self) {
        self.baseline = Some(Box::new(Snapshot {
            xp: self.xp.clone(),
            completed_quests: self.completed_quests.clone(),
            quest_points: self.quest_points,
        }));
    }

    /// Discards simulation progress, restoring the baseline snapshot (or the
    /// fresh-player defaults when none was captured).
    pub fn reset(&mut self) {
        match &self.baseline {
            Some(snapshot) => {
                self.xp = snapshot.xp.clone();
                self.completed_quests = snapshot.completed_quests.clone();
                self.quest_points = snapshot.quest_points;
            }
            None => {
                self.xp = initial_xp_map();
                self.completed_quests.clear();
                self.quest_points = 0;
            }
        }
        self.lamp_choices.clear();
    }

    /// Completes a quest: marks it done, applies its rewards, and spends each
    /// attached lamp. Returns the quest action followed by any lamp actions,
    /// in generation order.
    pub fn complete_quest(
        &mut self,
        quest: &Quest,
        context: &PlanContext,
    ) -> Result<Vec<Action>, DynamicLampRewardError> {
        let mut actions = Vec::new();

        self.completed_quests.insert(quest.id);
        self.quest_points += quest.rewards.quest_points;
        for (&skill, &xp) in &quest.rewards.xp {
            self.add_experience(skill, xp);
        }
        actions.push(Action::Quest(QuestAction::new(self.clone(), quest.clone())));

        for lamp in &quest.rewards.lamps {
            match self.choose_lamp_skills(lamp, context)? {
                Some(skills) => {
                    let xp = lamp.xp_for_skills(self, &skills)?;
                    for &skill in &skills {
                        self.add_experience(skill, xp);
                    }
                    self.lamp_choices
                        .entry(lamp.id)
                        .or_default()
                        .insert(skills.clone());
                    actions.push(Action::Lamp(LampAction::new(
                        self.clone(),
                        quest.clone(),
                        lamp.clone(),
                        skills,
                        false,
                    )));
                }
                None => {
                    debug!(
                        quest = %quest.title,
                        lamp = lamp.id,
                        "no eligible lamp choice, deferring"
                    );
                    actions.push(Action::Lamp(LampAction::new(
                        self.clone(),
                        quest.clone(),
                        lamp.clone(),
                        SkillSet::new(),
                        true,
                    )));
                }
            }
        }

        Ok(actions)
    }

    /// Picks the skill-set to spend a lamp on: the forced selection when it
    /// matches an eligible choice, otherwise the choice unlocking the most
    /// currently-ineligible quests (ties to the lowest skill id).
    fn choose_lamp_skills(
        &self,
        lamp: &LampReward,
        context: &PlanContext,
    ) -> Result<Option<SkillSet>, DynamicLampRewardError> {
        if !lamp.meets_requirements(self) {
            return Ok(None);
        }

        let previous = self
            .lamp_choices
            .get(&lamp.id)
            .cloned()
            .unwrap_or_default();
        let choices = lamp.choices(self, &previous);
        if choices.is_empty() {
            return Ok(None);
        }

        if !context.lamp_skills.is_empty() {
            if let Some(forced) = choices
                .iter()
                .find(|choice| choice.iter().all(|skill| context.lamp_skills.contains(skill)))
            {
                return Ok(Some(forced.clone()));
            }
        }

        // One-step lookahead: simulate each candidate on a cloned player and
        // count newly eligible quests. Choices arrive sorted by skill id, so
        // keeping strict improvements makes ties deterministic.
        let mut best: Option<(usize, SkillSet)> = None;
        for choice in choices {
            let xp = lamp.xp_for_skills(self, &choice)?;
            let mut lookahead = self.clone();
            for &skill in &choice {
                lookahead.add_experience(skill, xp);
            }

            let unlocked = context
                .catalogue
                .quests()
                .iter()
                .filter(|q| !self.is_quest_completed(q.id))
                .filter(|q| {
                    !q.meets_all_requirements(self, context.ironman, context.recommended)
                        && q.meets_all_requirements(
                            &lookahead,
                            context.ironman,
                            context.recommended,
                        )
                })
                .count();

            if best.as_ref().map_or(true, |(most, _)| unlocked > *most) {
                best = Some((unlocked, choice));
            }
        }

        Ok(best.map(|(_, choice)| choice))
    }
}
