use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::boss::BossConfig;
use crate::enemy::EnemyData;
use crate::player::PlayerStats;

pub const CONFIG_FILE_NAME: &str = "encounter.ron";
const CONFIG_DIR_NAME: &str = "space-boss";

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_encounter_config);
    }
}

/// Everything tunable about the encounter, in one RON file.
///
/// ```ron
/// (
///     boss: (defence_duration: 4.0, search_range: 20.0),
///     player: (bullet_damage: 25.0),
/// )
/// ```
///
/// Every section and every field inside it is optional; missing ones take
/// their Default.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EncounterConfig {
    pub boss: BossConfig,
    pub player: PlayerStats,
    pub enemy: EnemyData,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse encounter config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialize encounter config: {0}")]
    Serialize(#[from] ron::Error),
}

impl EncounterConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(contents)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }
}

pub fn read_config(path: &Path) -> Result<EncounterConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    EncounterConfig::from_ron_str(&contents)
}

/// Where to look, in order: the working directory, then the user config dir.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths
}

/// First candidate that exists wins. A file that exists but is broken is
/// logged and skipped, it doesn't stop the game.
pub fn load_from(paths: &[PathBuf]) -> EncounterConfig {
    for path in paths {
        if !path.exists() {
            debug!("no encounter config at {:?}", path);
            continue;
        }
        match read_config(path) {
            Ok(config) => {
                info!("loaded encounter config from {:?}", path);
                return config;
            }
            Err(e) => error!("{}. Trying the next location.", e),
        }
    }
    info!("no usable encounter config found, using defaults");
    let config = EncounterConfig::default();
    match config.to_ron_string() {
        Ok(ron) => debug!("default encounter config:\n{}", ron),
        Err(e) => warn!("{}", e),
    }
    config
}

#[cfg(not(target_arch = "wasm32"))]
fn load() -> EncounterConfig {
    load_from(&candidate_paths())
}

#[cfg(target_arch = "wasm32")]
fn load() -> EncounterConfig {
    warn!("no filesystem on wasm, using default encounter config");
    EncounterConfig::default()
}

/// Inserts each section as its own resource.
fn load_encounter_config(mut commands: Commands) {
    let config = load();
    commands.insert_resource(config.boss);
    commands.insert_resource(config.player);
    commands.insert_resource(config.enemy);
}
