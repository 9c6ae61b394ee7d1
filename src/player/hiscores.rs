//! Skill-experience feed in the hiscores CSV format: one row per skill in
//! skill-id order after a leading total row, xp in the third column.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::skill::Skill;

/// Retrieves skill xp for a player from a hiscores-style CSV feed.
///
/// The configured url contains a `{name}` placeholder for the url-encoded
/// player name; non-http urls are read as local file paths.
pub struct HiscoreService {
    url: String,
    client: reqwest::Client,
}

impl HiscoreService {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub async fn load(&self, name: &str) -> Result<BTreeMap<Skill, f64>> {
        debug!("loading hiscores for player: {name}");

        let url = self.url.replace("{name}", &urlencoding::encode(name));
        let body = if url.starts_with("http://") || url.starts_with("https://") {
            self.client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .with_context(|| format!("failed to fetch hiscores for {name}"))?
                .text()
                .await
                .context("failed to read hiscores response")?
        } else {
            std::fs::read_to_string(&url)
                .with_context(|| format!("failed to read hiscores file {url}"))?
        };

        Ok(parse(&body))
    }
}

/// Parses the CSV body. Missing or malformed rows are skipped, never fatal;
/// xp below a skill's floor clamps up to the floor.
fn parse(csv: &str) -> BTreeMap<Skill, f64> {
    let rows: Vec<&str> = csv.lines().collect();
    let mut skill_xps = BTreeMap::new();

    for &skill in &Skill::ALL {
        // Row 0 is the overall total, so the skill id doubles as row index.
        let row = match rows.get(skill.id() as usize) {
            Some(row) => *row,
            None => {
                warn!("missing hiscore row for skill: {skill}");
                continue;
            }
        };

        match row.split(',').nth(2).map(str::trim).map(str::parse::<f64>) {
            Some(Ok(xp)) => {
                skill_xps.insert(skill, xp.max(skill.initial_xp()));
            }
            _ => {
                warn!("malformed hiscore row for skill {skill}: {row}");
            }
        }
    }

    skill_xps
}
