//! Match-play reward for one-versus-one training.

use super::Reward;
use crate::gamestate::{GameState, Player};

/// Large outcome terms for goals, saves and concessions plus a small dense
/// term for staying close to the ball.
#[derive(Clone, Debug)]
pub struct TacticalDuelReward {
    pub goal: f32,
    pub concede: f32,
    pub save: f32,
    pub proximity: f32,
    /// Distance at which the proximity term reaches zero
    pub proximity_range: f32,
}

impl Default for TacticalDuelReward {
    fn default() -> Self {
        Self {
            goal: 120.0,
            concede: -90.0,
            save: 12.0,
            proximity: 0.04,
            proximity_range: 3600.0,
        }
    }
}

impl Reward for TacticalDuelReward {
    fn get_reward(&mut self, player: &Player, state: &GameState, _is_final: bool) -> f32 {
        let mut reward = 0.0;
        if player.events.goal {
            reward += self.goal;
        } else if state
            .players
            .iter()
            .any(|p| p.team != player.team && p.events.goal)
        {
            reward += self.concede;
        }
        if player.events.save {
            reward += self.save;
        }

        let dist = player.car.pos.dist(state.ball.pos);
        reward += self.proximity * (1.0 - (dist / self.proximity_range).min(1.0));
        reward
    }
}
