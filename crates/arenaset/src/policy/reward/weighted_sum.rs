//! Weighted combination of several rewards.

use super::{Reward, WeightedReward};
use crate::gamestate::{GameState, Player};
use crate::policy::TerminalType;

/// Sums `weight * reward` over its entries.
#[derive(Debug, Default)]
pub struct WeightedSumReward {
    entries: Vec<WeightedReward>,
}

impl WeightedSumReward {
    pub fn new(entries: Vec<WeightedReward>) -> Self {
        Self { entries }
    }

    pub fn with(mut self, reward: impl Reward + 'static, weight: f32) -> Self {
        self.entries.push(WeightedReward::new(reward, weight));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Reward for WeightedSumReward {
    fn reset(&mut self, initial: &GameState) {
        for entry in &mut self.entries {
            entry.reward.reset(initial);
        }
    }

    fn pre_step(&mut self, state: &GameState) {
        for entry in &mut self.entries {
            entry.reward.pre_step(state);
        }
    }

    fn get_reward(&mut self, player: &Player, state: &GameState, is_final: bool) -> f32 {
        self.entries
            .iter_mut()
            .map(|e| e.weight * e.reward.get_reward(player, state, is_final))
            .sum()
    }

    fn get_all_rewards(&mut self, state: &GameState, terminal: TerminalType) -> Vec<f32> {
        let mut total = vec![0.0; state.players.len()];
        for entry in &mut self.entries {
            let values = entry.reward.get_all_rewards(state, terminal);
            for (t, v) in total.iter_mut().zip(values) {
                *t += entry.weight * v;
            }
        }
        total
    }
}
