//! Environment set configuration.

use crate::{ArenaSetError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which agent's unweighted reward is captured per arena when
/// `save_rewards` is on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSampling {
    /// A uniformly random agent, drawn from the arena's own seeded stream
    #[default]
    Random,
    /// The agent with the lowest `AgentId`
    LowestId,
}

/// Configuration for an `EnvSet`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvSetConfig {
    /// Number of arenas
    pub num_arenas: usize,
    /// Physics ticks per full step
    pub tick_skip: u32,
    /// Ticks stepped with the previous controls before new actions apply
    pub action_delay: u32,
    /// Record one agent's unweighted reward per entry for diagnostics
    pub save_rewards: bool,
    pub reward_sampling: RewardSampling,
    /// Random seed base; arena `i` uses `seed + i`
    pub seed: u64,
    /// Worker threads, rayon's default when unset
    pub num_threads: Option<usize>,
}

impl Default for EnvSetConfig {
    fn default() -> Self {
        Self {
            num_arenas: 1,
            tick_skip: 8,
            action_delay: 7,
            save_rewards: false,
            reward_sampling: RewardSampling::Random,
            seed: 42,
            num_threads: None,
        }
    }
}

impl EnvSetConfig {
    /// Create a new config with the specified number of arenas
    pub fn new(num_arenas: usize) -> Self {
        Self {
            num_arenas,
            ..Default::default()
        }
    }

    pub fn with_tick_skip(mut self, tick_skip: u32) -> Self {
        self.tick_skip = tick_skip;
        self
    }

    pub fn with_action_delay(mut self, action_delay: u32) -> Self {
        self.action_delay = action_delay;
        self
    }

    pub fn with_save_rewards(mut self, save_rewards: bool) -> Self {
        self.save_rewards = save_rewards;
        self
    }

    pub fn with_reward_sampling(mut self, sampling: RewardSampling) -> Self {
        self.reward_sampling = sampling;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Read a JSON config; absent fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_arenas == 0 {
            return Err(ArenaSetError::InvalidConfig(
                "num_arenas must be > 0".to_string(),
            ));
        }
        if self.tick_skip == 0 {
            return Err(ArenaSetError::InvalidConfig(
                "tick_skip must be > 0".to_string(),
            ));
        }
        if self.action_delay > self.tick_skip {
            return Err(ArenaSetError::InvalidConfig(format!(
                "action_delay ({}) must be within [0, tick_skip ({})]",
                self.action_delay, self.tick_skip
            )));
        }
        if self.num_threads == Some(0) {
            return Err(ArenaSetError::InvalidConfig(
                "num_threads must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Ticks stepped after new actions are applied
    pub fn ticks_after_action(&self) -> u32 {
        self.tick_skip - self.action_delay
    }
}
