//! Per-step gameplay metrics for the run report.

use arenaset::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Running averages keyed by metric name, emptied on every flush.
#[derive(Debug, Default)]
pub struct StepMetrics {
    sums: BTreeMap<String, (f64, u64)>,
}

impl StepMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_avg(&mut self, name: &str, value: f64) {
        let entry = self.sums.entry(name.to_string()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Player and game averages over every arena's latest snapshot.
    pub fn record_states(&mut self, states: &[&GameState]) {
        for state in states {
            for player in &state.players {
                let car = &player.car;
                self.add_avg("Player/In Air Ratio", (!car.is_on_ground) as u8 as f64);
                self.add_avg("Player/Ball Touch Ratio", player.ball_touched_step as u8 as f64);
                self.add_avg("Player/Demoed Ratio", player.is_demoed as u8 as f64);
                self.add_avg("Player/Speed", car.vel.length() as f64);
                let to_ball = (state.ball.pos - car.pos).normalized();
                self.add_avg(
                    "Player/Speed Towards Ball",
                    car.vel.dot(to_ball).max(0.0) as f64,
                );
                self.add_avg("Player/Boost", car.boost as f64);
                if player.ball_touched_step {
                    self.add_avg("Player/Touch Height", state.ball.pos.z as f64);
                }
            }
            if state.goal_scored {
                self.add_avg("Game/Goal Speed", state.ball.vel.length() as f64);
            }
        }
    }

    /// Unweighted per-entry rewards captured for one agent of each arena.
    pub fn record_reward_entries(&mut self, env_state: &EnvState, names: &[&str]) {
        for arena in 0..env_state.num_arenas() {
            for (name, value) in names.iter().zip(env_state.last_rewards(arena)) {
                self.add_avg(&format!("Rewards/{}", name), *value as f64);
            }
        }
    }

    /// Averages so far, then start over.
    pub fn take(&mut self) -> HashMap<String, f64> {
        std::mem::take(&mut self.sums)
            .into_iter()
            .map(|(name, (sum, count))| (name, sum / count.max(1) as f64))
            .collect()
    }
}
