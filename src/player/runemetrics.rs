//! Quest-completion-status feed: a JSON document with a `quests` array.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Completion state reported by the feed for a single quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestStatus {
    Completed,
    Started,
    NotStarted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuneMetricsQuest {
    pub title: String,
    pub status: QuestStatus,
    #[serde(default)]
    pub difficulty: i32,
    #[serde(default)]
    pub members: bool,
    #[serde(default)]
    pub quest_points: i32,
    #[serde(default)]
    pub user_eligible: bool,
}

#[derive(Debug, Deserialize)]
struct QuestsResponse {
    quests: Vec<RuneMetricsQuest>,
}

/// Retrieves quest completion state for a player.
///
/// The configured url contains a `{name}` placeholder for the url-encoded
/// player name; non-http urls are read as local file paths.
pub struct RuneMetricsService {
    url: String,
    client: reqwest::Client,
}

impl RuneMetricsService {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub async fn load(&self, name: &str) -> Result<Vec<RuneMetricsQuest>> {
        debug!("loading quest status for player: {name}");

        let url = self.url.replace("{name}", &urlencoding::encode(name));
        let json = if url.starts_with("http://") || url.starts_with("https://") {
            self.client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .with_context(|| format!("failed to fetch quest status for {name}"))?
                .text()
                .await
                .context("failed to read quest status response")?
        } else {
            std::fs::read_to_string(&url)
                .with_context(|| format!("failed to read quest status file {url}"))?
        };

        parse(&json)
    }
}

fn parse(json: &str) -> Result<Vec<RuneMetricsQuest>> {
    let response: QuestsResponse =
        serde_json::from_str(json).context("failed to parse quest status feed")?;
    Ok(response.quests)
}
