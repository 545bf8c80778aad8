//! Punishment missions and explosion titles.
//!
//! The tables are opaque data: the selector only needs them to be non-empty.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::random::RandomSource;

pub const DEFAULT_MISSIONS: &[&str] = &[
    "Drain your whole glass!",
    "Drink half, then pass the rest to the next player.",
    "The player on your left drinks for you.",
    "The player on your right drinks for you.",
    "Everyone at the table drinks!",
    "The player across from you drinks a full glass!",
    "Saved! Whoever passed it to you drinks instead.",
    "Double up: two glasses!",
];

pub const DEFAULT_TITLES: &[&str] = &[
    "BOOM! WRONG PLACE, WRONG TIME!",
    "GAME OVER!",
    "STOP RIGHT THERE!",
    "YOU'RE UP!",
    "TIME'S UP!",
];

/// The outcome shown when a run explodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplosionResult {
    pub mission: String,
    pub title: String,
}

/// Mission and title tables as stored in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(default = "default_missions")]
    pub missions: Vec<String>,
    #[serde(default = "default_titles")]
    pub titles: Vec<String>,
}

fn default_missions() -> Vec<String> {
    DEFAULT_MISSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_titles() -> Vec<String> {
    DEFAULT_TITLES.iter().map(|s| s.to_string()).collect()
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            missions: default_missions(),
            titles: default_titles(),
        }
    }
}

/// Picks a mission and, independently, a title.
#[derive(Debug, Clone)]
pub struct MissionSelector {
    missions: Vec<String>,
    titles: Vec<String>,
}

impl MissionSelector {
    pub fn new(missions: Vec<String>, titles: Vec<String>) -> Result<Self, ValidationError> {
        if missions.is_empty() {
            return Err(ValidationError::EmptyCollection("missions".into()));
        }
        if titles.is_empty() {
            return Err(ValidationError::EmptyCollection("titles".into()));
        }
        Ok(Self { missions, titles })
    }

    pub fn from_config(config: &MissionConfig) -> Result<Self, ValidationError> {
        Self::new(config.missions.clone(), config.titles.clone())
    }

    pub fn missions(&self) -> &[String] {
        &self.missions
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn pick(&self, rng: &mut dyn RandomSource) -> ExplosionResult {
        let mission = &self.missions[rng.index(self.missions.len())];
        let title = &self.titles[rng.index(self.titles.len())];
        ExplosionResult {
            mission: mission.clone(),
            title: title.clone(),
        }
    }
}

impl Default for MissionSelector {
    fn default() -> Self {
        Self {
            missions: default_missions(),
            titles: default_titles(),
        }
    }
}
