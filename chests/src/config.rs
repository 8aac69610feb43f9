use chests_core::ChestData;
use chests_utils::ResourceLocation;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::PluginError;

const DEFAULT_CONFIG: &str = include_str!("../../package-content/chests_config.json5");

fn default_container_block() -> ResourceLocation {
    ResourceLocation::vanilla_static("chest")
}

fn default_journal_path() -> PathBuf {
    PathBuf::from("chests.journal")
}

/// Contents of `chests_config.json5`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChestsConfig {
    /// The block a chest must stand on to stay registered.
    #[serde(default = "default_container_block")]
    pub container_block: ResourceLocation,
    /// Where placed chests are journaled.
    #[serde(default = "default_journal_path")]
    pub journal_path: PathBuf,
    /// Chest templates by name.
    #[serde(default)]
    pub templates: BTreeMap<String, ChestData>,
}

impl ChestsConfig {
    /// Reads the config at `path`, writing the bundled default there first if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self, PluginError> {
        if path.exists() {
            let config_str = fs::read_to_string(path)?;
            Self::from_json5(&config_str)
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG)?;
            log::info!("Wrote default chest config to {}", path.display());
            Self::from_json5(DEFAULT_CONFIG)
        }
    }

    /// Parses a config and checks every template.
    pub fn from_json5(source: &str) -> Result<Self, PluginError> {
        let mut config: ChestsConfig = serde_json5::from_str(source)?;
        for (name, data) in &mut config.templates {
            data.name.clone_from(name);
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks every template.
    pub fn validate(&self) -> Result<(), PluginError> {
        for data in self.templates.values() {
            data.validate()?;
        }
        Ok(())
    }
}

impl Default for ChestsConfig {
    fn default() -> Self {
        Self {
            container_block: default_container_block(),
            journal_path: default_journal_path(),
            templates: BTreeMap::new(),
        }
    }
}
