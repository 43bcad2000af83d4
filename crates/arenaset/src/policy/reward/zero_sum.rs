//! Team-spirit and opponent-penalty redistribution.

use super::Reward;
use crate::arena::Team;
use crate::gamestate::{GameState, Player};
use crate::policy::TerminalType;

/// Wraps a reward so that what one team gains the other loses.
///
/// Each player receives
/// `own * (1 - team_spirit) + team_avg * team_spirit - opp_avg * opponent_scale`,
/// where the averages are taken over the inner values of each team.
pub struct ZeroSumReward {
    inner: Box<dyn Reward>,
    team_spirit: f32,
    opponent_scale: f32,
    last_inner: Vec<f32>,
}

impl ZeroSumReward {
    pub fn new(inner: impl Reward + 'static, team_spirit: f32, opponent_scale: f32) -> Self {
        Self {
            inner: Box::new(inner),
            team_spirit,
            opponent_scale,
            last_inner: Vec::new(),
        }
    }

    pub fn team_spirit(&self) -> f32 {
        self.team_spirit
    }

    pub fn opponent_scale(&self) -> f32 {
        self.opponent_scale
    }
}

fn team_average(state: &GameState, values: &[f32], team: Team) -> f32 {
    let (sum, count) = state
        .players
        .iter()
        .zip(values)
        .filter(|(p, _)| p.team == team)
        .fold((0.0f32, 0usize), |(s, n), (_, &v)| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

impl Reward for ZeroSumReward {
    fn reset(&mut self, initial: &GameState) {
        self.inner.reset(initial);
        self.last_inner.clear();
    }

    fn pre_step(&mut self, state: &GameState) {
        self.inner.pre_step(state);
    }

    /// The inner value alone; redistribution needs every player at once.
    fn get_reward(&mut self, player: &Player, state: &GameState, is_final: bool) -> f32 {
        self.inner.get_reward(player, state, is_final)
    }

    fn get_all_rewards(&mut self, state: &GameState, terminal: TerminalType) -> Vec<f32> {
        let inner = self.inner.get_all_rewards(state, terminal);
        let blue_avg = team_average(state, &inner, Team::Blue);
        let orange_avg = team_average(state, &inner, Team::Orange);

        let rewards = state
            .players
            .iter()
            .zip(&inner)
            .map(|(p, &own)| {
                let (team_avg, opp_avg) = match p.team {
                    Team::Blue => (blue_avg, orange_avg),
                    Team::Orange => (orange_avg, blue_avg),
                };
                own * (1.0 - self.team_spirit) + team_avg * self.team_spirit
                    - opp_avg * self.opponent_scale
            })
            .collect();
        self.last_inner = inner;
        rewards
    }

    fn diagnostic_rewards(&self) -> Option<&[f32]> {
        Some(&self.last_inner)
    }
}
