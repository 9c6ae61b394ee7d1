//! Builds the initial player snapshot from the external feeds.

use tracing::warn;

use super::hiscores::HiscoreService;
use super::runemetrics::{QuestStatus, RuneMetricsService};
use super::Player;
use crate::quest::catalogue::QuestCatalogue;

/// Merges the skill-experience and quest-status feeds into a Player.
///
/// Each feed is independently optional: a failure degrades to that feed's
/// defaults (skill floors, nothing completed) and is logged, never fatal.
pub struct PlayerService {
    hiscores: HiscoreService,
    runemetrics: RuneMetricsService,
}

impl PlayerService {
    pub fn new(hiscores: HiscoreService, runemetrics: RuneMetricsService) -> Self {
        Self {
            hiscores,
            runemetrics,
        }
    }

    pub async fn load(&self, name: Option<&str>, catalogue: &QuestCatalogue) -> Player {
        let mut player = Player::new(name.map(str::to_owned));

        if let Some(name) = name {
            match self.hiscores.load(name).await {
                Ok(xps) => player.merge_skill_xp(&xps),
                Err(e) => warn!("failed to load hiscores for {name}: {e:#}"),
            }

            match self.runemetrics.load(name).await {
                Ok(quests) => {
                    for entry in quests {
                        if entry.status != QuestStatus::Completed {
                            continue;
                        }
                        match catalogue.quest_by_title(&entry.title) {
                            Some(quest) => player.mark_completed(quest),
                            None => warn!("completed quest not in catalogue: {}", entry.title),
                        }
                    }
                }
                Err(e) => warn!("failed to load quest status for {name}: {e:#}"),
            }
        }

        player.snapshot_baseline();
        player
    }
}
