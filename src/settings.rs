//! Persisted run configuration: a flat key/value record stored as JSON.
//! Absent keys take the documented defaults.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::skill::Skill;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub name: Option<String>,
    pub ironman: bool,
    pub recommended: bool,
    /// Skills to force every lamp onto; empty means the lookahead chooses.
    pub lamp_skills: BTreeSet<Skill>,
}

impl Settings {
    /// Loads settings, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create settings dir {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;

        info!("saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("missing.json")).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(!settings.ironman);
        assert!(!settings.recommended);
        assert!(settings.lamp_skills.is_empty());
        assert!(settings.name.is_none());
    }

    #[test]
    fn absent_keys_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"name":"durial"}"#).unwrap();

        assert_eq!(settings.name.as_deref(), Some("durial"));
        assert!(!settings.ironman);
        assert!(settings.lamp_skills.is_empty());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings {
            name: Some("durial".to_string()),
            ironman: true,
            recommended: false,
            lamp_skills: BTreeSet::from([Skill::Prayer, Skill::Herblore]),
        };
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }
}
