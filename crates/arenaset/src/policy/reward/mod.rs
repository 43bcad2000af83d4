//! Reward functions.
//!
//! Provides:
//! - `Reward` trait and `WeightedReward` entries
//! - Common per-player rewards in `common`
//! - Composites: `ZeroSumReward`, `WeightedSumReward`, `PhaseAwareReward`

mod common;
mod phase_aware;
mod tactical;
mod weighted_sum;
mod zero_sum;

pub use common::{
    AirReward, BumpReward, DemoReward, EventReward, FaceBallReward, GoalReward,
    PickupBoostReward, SaveBoostReward, StrongTouchReward, TouchBallReward,
    VelocityBallToGoalReward, VelocityPlayerToBallReward,
};
pub use phase_aware::PhaseAwareReward;
pub use tactical::TacticalDuelReward;
pub use weighted_sum::WeightedSumReward;
pub use zero_sum::ZeroSumReward;

use super::TerminalType;
use crate::gamestate::{GameState, Player};

pub trait Reward: Send {
    fn reset(&mut self, _initial: &GameState) {}

    /// Called once per step before any reward is computed.
    fn pre_step(&mut self, _state: &GameState) {}

    fn get_reward(&mut self, player: &Player, state: &GameState, is_final: bool) -> f32;

    /// One reward per player, in `state.players` order.
    fn get_all_rewards(&mut self, state: &GameState, terminal: TerminalType) -> Vec<f32> {
        let is_final = terminal.is_terminal();
        state
            .players
            .iter()
            .map(|p| self.get_reward(p, state, is_final))
            .collect()
    }

    /// Per-player values before any redistribution, for rewards that
    /// redistribute between players. Valid after `get_all_rewards`.
    ///
    /// Only consulted on the top-level entries of an arena. Composites such
    /// as `WeightedSumReward` and `PhaseAwareReward` do not forward it, so a
    /// `ZeroSumReward` nested inside one is captured with its redistributed
    /// value.
    fn diagnostic_rewards(&self) -> Option<&[f32]> {
        None
    }
}

/// A reward paired with its scale.
pub struct WeightedReward {
    pub reward: Box<dyn Reward>,
    pub weight: f32,
}

impl WeightedReward {
    pub fn new(reward: impl Reward + 'static, weight: f32) -> Self {
        Self {
            reward: Box::new(reward),
            weight,
        }
    }
}

impl std::fmt::Debug for WeightedReward {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedReward")
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}
