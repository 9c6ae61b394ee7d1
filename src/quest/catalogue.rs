use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use tracing::info;

use super::Quest;

/// The static, read-only quest catalogue shared by all planning runs.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestCatalogue {
    quests: Vec<Quest>,
}

impl QuestCatalogue {
    /// Wraps an ordered quest collection, validating it first. Duplicate ids
    /// and dangling quest-requirement references are catalogue defects and
    /// must surface before any run starts.
    pub fn new(quests: Vec<Quest>) -> Result<Self> {
        let mut ids = HashSet::new();
        for quest in &quests {
            if !ids.insert(quest.id) {
                bail!("duplicate quest id in catalogue: {}", quest.id);
            }
        }

        for quest in &quests {
            for requirement in &quest.quest_requirements {
                if !ids.contains(&requirement.id) {
                    bail!(
                        "quest {} ({}) requires unknown quest id {}",
                        quest.id,
                        quest.title,
                        requirement.id
                    );
                }
            }
        }

        Ok(Self { quests })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let quests: Vec<Quest> =
            serde_json::from_str(json).context("failed to deserialize quest catalogue")?;
        Self::new(quests)
    }

    /// Loads the catalogue from an http(s) url or a local file path.
    pub async fn fetch(url: &str) -> Result<Self> {
        info!("loading quest catalogue from {url}");

        let json = if url.starts_with("http://") || url.starts_with("https://") {
            reqwest::get(url)
                .await
                .and_then(reqwest::Response::error_for_status)
                .with_context(|| format!("failed to fetch quest catalogue from {url}"))?
                .text()
                .await
                .context("failed to read quest catalogue response")?
        } else {
            std::fs::read_to_string(url)
                .with_context(|| format!("failed to read quest catalogue file {url}"))?
        };

        let catalogue = Self::from_json(&json)?;
        info!("loaded {} quests", catalogue.len());
        Ok(catalogue)
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn quest_by_id(&self, id: i32) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn quest_by_title(&self, title: &str) -> Option<&Quest> {
        self.quests
            .iter()
            .find(|q| q.title.eq_ignore_ascii_case(title))
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}
