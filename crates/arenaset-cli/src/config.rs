//! Training configuration file.

use anyhow::{Context, Result};
use arenaset::prelude::{CurriculumParameters, CurriculumPhase};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPhase {
    Dojo,
    Arena,
    /// Start in Dojo and let the curriculum switch
    #[default]
    Auto,
}

/// Contents of a `training_config.json`. Every field is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub training_phase: TrainingPhase,
    /// "scenario" keeps scenario resets even when starting in the Arena phase
    pub game_mode: String,
    pub num_games: usize,
    pub scenario_reward_log_interval: u32,
    /// Defaults to `training_phase == auto` when absent
    pub auto_switch: Option<bool>,
    pub auto_switch_threshold: f64,
    pub auto_switch_min_samples: u64,
    pub tick_skip: u32,
    pub action_delay: u32,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            training_phase: TrainingPhase::Auto,
            game_mode: "scenario".to_string(),
            num_games: 256,
            scenario_reward_log_interval: 512,
            auto_switch: None,
            auto_switch_threshold: 120.0,
            auto_switch_min_samples: 256,
            tick_skip: 8,
            action_delay: 7,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    /// Read `path`; a missing file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no training config, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn auto_switch(&self) -> bool {
        self.auto_switch
            .unwrap_or(self.training_phase == TrainingPhase::Auto)
    }

    /// Whether resets should draw from the scenario pool at all.
    pub fn wants_scenarios(&self) -> bool {
        self.training_phase != TrainingPhase::Arena || self.game_mode == "scenario"
    }

    pub fn curriculum_parameters(&self) -> CurriculumParameters {
        CurriculumParameters {
            initial_phase: match self.training_phase {
                TrainingPhase::Arena => CurriculumPhase::Arena,
                TrainingPhase::Dojo | TrainingPhase::Auto => CurriculumPhase::Dojo,
            },
            auto_switch: self.auto_switch(),
            log_interval: self.scenario_reward_log_interval,
            auto_switch_threshold: self.auto_switch_threshold,
            auto_switch_min_samples: self.auto_switch_min_samples,
        }
    }
}
