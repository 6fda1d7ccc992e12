//! TOML configuration consumed when building a [`Simulation`](crate::Simulation).

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use seedpath_core::{Difficulty, ResearchModifiers, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use serde::Deserialize;
use thiserror::Error;

use crate::DEFAULT_GAME_SPEED;

/// Settings applied to a freshly created simulation.
///
/// Every field is optional in the TOML source; missing keys keep their
/// defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Map seed. `None` derives one from the wall clock.
    pub seed: Option<u32>,
    /// Requested canvas width in world units.
    pub canvas_width: f32,
    /// Requested canvas height in world units.
    pub canvas_height: f32,
    /// Difficulty selected before the first wave.
    pub difficulty: Difficulty,
    /// Whether performance based difficulty adjustment is enabled.
    pub dynamic_difficulty: bool,
    /// Tick bodies executed per [`Simulation::tick`](crate::Simulation::tick) call.
    pub game_speed: u32,
    /// Research multipliers applied to newly built towers and rewards.
    pub research: ResearchModifiers,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            difficulty: Difficulty::Normal,
            dynamic_difficulty: true,
            game_speed: DEFAULT_GAME_SPEED,
            research: ResearchModifiers::NEUTRAL,
        }
    }
}

impl SimulationConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses the configuration stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

/// Failures raised while loading a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration text is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
