//! # arenaset
//!
//! Lockstep execution of many independent multi-agent arenas for
//! high-throughput reinforcement learning.
//!
//! ## Overview
//!
//! arenaset provides:
//! - The `Arena` contract for an external physics collaborator
//! - Per-step `GameState` snapshots consumed by policy objects
//! - Pluggable `Reward`, `TerminalCondition`, `ObsBuilder`, `ActionParser`
//!   and `StateSetter` traits with a library of common implementations
//! - `EnvSet`, which fans every step out across arenas on a rayon pool and
//!   packs observations, action masks, rewards and terminals into flat,
//!   agent-indexed buffers
//! - Scenario injection and curriculum coordination for staged training
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use arenaset::prelude::*;
//!
//! let config = EnvSetConfig::new(64).with_tick_skip(8).with_action_delay(7);
//! let mut envs = EnvSet::new(config, make_env, None)?;
//!
//! loop {
//!     envs.step_first_half(true)?;
//!     envs.sync()?;
//!     let actions = policy.act(envs.state()?.obs());
//!     envs.step_second_half(&actions, false)?;
//!     envs.reset()?;
//! }
//! ```

pub mod arena;
pub mod curriculum;
pub mod envset;
pub mod events;
pub mod gamestate;
pub mod log;
pub mod math;
pub mod policy;
pub mod scenario;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::arena::{
        AgentId, AgentInfo, Arena, BallState, BoostPadState, CarControls, CarState, EventSink,
        GameEvent, Team,
    };
    pub use crate::curriculum::{CurriculumCoordinator, CurriculumParameters, CurriculumPhase};
    pub use crate::envset::{
        EnvCreateResult, EnvSet, EnvSetConfig, EnvState, RewardSampling, TerminalType,
    };
    pub use crate::gamestate::{GameState, Player, PlayerEvents};
    pub use crate::log::{CompositeLogger, ConsoleLogger, MetricLogger};
    pub use crate::math::{Angle, RotMat, Vec3};
    pub use crate::policy::{
        ActionParser, ObsBuilder, Reward, StateSetter, TerminalCondition, WeightedReward,
    };
    pub use crate::scenario::{Scenario, ScenarioGenerator, ScenarioProvider, ScenarioState};
    pub use crate::{ArenaSetError, Result};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum ArenaSetError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Arena index {index} out of range for {count} arenas")]
    ArenaIndex { index: usize, count: usize },

    #[error("Batched job panicked: {0}")]
    JobPanicked(String),

    #[error("Environment set is unusable after a failed asynchronous job")]
    Poisoned,

    #[error("Jobs are still running; call sync() before reading buffers")]
    JobsPending,

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArenaSetError>;
