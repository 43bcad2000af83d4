//! One arena together with everything it owns.

use super::config::{EnvSetConfig, RewardSampling};
use super::state::ArenaRows;
use crate::arena::{Arena, CarControls};
use crate::events::EventTracker;
use crate::gamestate::GameState;
use crate::policy::{
    resolve_terminal, ActionParser, ObsBuilder, StateSetter, TerminalCondition, TerminalType,
    WeightedReward,
};
use crate::scenario::{apply_scenario, Scenario, ScenarioProvider, ScenarioState, MANUAL_SCENARIO_NAME};
use crate::{ArenaSetError, Result};
use ndarray::ArrayViewMut2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// What the per-arena factory of an `EnvSet` returns.
pub struct EnvCreateResult {
    pub arena: Box<dyn Arena>,
    pub rewards: Vec<WeightedReward>,
    pub terminal_conditions: Vec<Box<dyn TerminalCondition>>,
    pub obs_builder: Box<dyn ObsBuilder>,
    pub action_parser: Box<dyn ActionParser>,
    pub state_setter: Box<dyn StateSetter>,
}

pub(crate) struct ArenaSlot {
    index: usize,
    arena: Box<dyn Arena>,
    rewards: Vec<WeightedReward>,
    terminal_conditions: Vec<Box<dyn TerminalCondition>>,
    obs_builder: Box<dyn ObsBuilder>,
    action_parser: Box<dyn ActionParser>,
    state_setter: Box<dyn StateSetter>,
    events: EventTracker,
    state: GameState,
    prev: Option<Arc<GameState>>,
    /// Set by a reset: the next step must not link a previous snapshot.
    prev_cleared: bool,
    last_actions: Vec<CarControls>,
    rng: StdRng,
}

impl ArenaSlot {
    pub fn new(index: usize, created: EnvCreateResult, seed: u64) -> Self {
        let events = EventTracker::register(index, created.arena.as_ref());
        let num_agents = created.arena.num_agents();
        Self {
            index,
            arena: created.arena,
            rewards: created.rewards,
            terminal_conditions: created.terminal_conditions,
            obs_builder: created.obs_builder,
            action_parser: created.action_parser,
            state_setter: created.state_setter,
            events,
            state: GameState::default(),
            prev: None,
            prev_cleared: true,
            last_actions: vec![CarControls::default(); num_agents],
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn num_agents(&self) -> usize {
        self.last_actions.len()
    }

    pub fn num_reward_entries(&self) -> usize {
        self.rewards.len()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Observation and action widths, from a default reset of this arena.
    pub fn measure_sizes(&mut self) -> Result<(usize, usize)> {
        self.state_setter.reset_arena(self.arena.as_mut());
        let state = GameState::from_arena(self.arena.as_ref());
        self.obs_builder.reset(&state);

        let first = state.players.first().ok_or_else(|| {
            ArenaSetError::InvalidConfig(format!("arena {} has no agents", self.index))
        })?;
        let obs_size = self.obs_builder.build_obs(first, &state).len();
        Ok((obs_size, self.action_parser.action_amount()))
    }

    /// Put the arena in its initial state and rebuild its buffer rows.
    ///
    /// An explicit `scenario` wins over the provider; without either the
    /// state setter's default reset stands.
    pub fn reset(
        &mut self,
        scenario: Option<&ScenarioState>,
        provider: Option<&ScenarioProvider>,
        rows: &mut ArenaRows<'_>,
    ) -> Result<()> {
        let chosen = match scenario {
            Some(state) => Some(Scenario {
                name: MANUAL_SCENARIO_NAME.to_string(),
                initial_state: *state,
            }),
            None => provider.and_then(|p| p(self.index)),
        };

        self.state_setter.reset_arena(self.arena.as_mut());
        if let Some(s) = &chosen {
            apply_scenario(self.arena.as_mut(), &s.initial_state);
        }
        self.arena.reset_event_tracking();
        self.events.clear();
        self.last_actions.fill(CarControls::default());

        self.state = GameState::from_arena(self.arena.as_ref());
        self.state.scenario_name = chosen.map(|s| s.name).unwrap_or_default();
        tracing::debug!(arena = self.index, scenario = %self.state.scenario_name, "arena reset");

        self.obs_builder.reset(&self.state);
        for cond in &mut self.terminal_conditions {
            cond.reset(&self.state);
        }
        for entry in &mut self.rewards {
            entry.reward.reset(&self.state);
        }

        self.write_obs(&mut rows.obs, &mut rows.masks)?;
        self.prev = None;
        self.prev_cleared = true;
        Ok(())
    }

    /// Keep the current snapshot as previous, then advance with the
    /// controls already resident in the arena.
    pub fn step_first_half(&mut self, action_delay: u32) {
        self.prev = if self.prev_cleared {
            None
        } else {
            let mut prev = self.state.clone();
            prev.prev = None;
            Some(Arc::new(prev))
        };
        self.prev_cleared = false;

        self.events.clear();
        if action_delay > 0 {
            self.arena.step(action_delay, &mut self.events);
        }
    }

    /// Apply `actions`, finish the step and write this arena's rows.
    pub fn step_second_half(
        &mut self,
        actions: &[usize],
        config: &EnvSetConfig,
        rows: &mut ArenaRows<'_>,
    ) -> Result<()> {
        if actions.len() != self.num_agents() {
            return Err(ArenaSetError::ShapeMismatch {
                what: "action list",
                expected: self.num_agents(),
                actual: actions.len(),
            });
        }

        let amount = self.action_parser.action_amount();
        for (i, &action) in actions.iter().enumerate() {
            if action >= amount {
                return Err(ArenaSetError::InvalidAction(format!(
                    "action {} for agent {} of arena {} is outside [0, {})",
                    action, i, self.index, amount
                )));
            }
            let controls = self
                .action_parser
                .parse_action(action, &self.state.players[i], &self.state);
            self.arena.set_controls(i, controls);
            self.last_actions[i] = controls;
        }

        let ticks = config.ticks_after_action();
        if ticks > 0 {
            self.arena.step(ticks, &mut self.events);
        }
        self.arena.update_events(&mut self.events);

        let prev = self.prev.take();
        self.state.update_from_arena(
            self.arena.as_ref(),
            &self.last_actions,
            prev,
            self.events.flags(),
        );

        let terminal = resolve_terminal(&mut self.terminal_conditions, &self.state);
        *rows.terminal = terminal;

        self.write_rewards(terminal, config, rows)?;
        self.write_obs(&mut rows.obs, &mut rows.masks)
    }

    fn write_rewards(
        &mut self,
        terminal: TerminalType,
        config: &EnvSetConfig,
        rows: &mut ArenaRows<'_>,
    ) -> Result<()> {
        for entry in &mut self.rewards {
            entry.reward.pre_step(&self.state);
        }

        let n = self.num_agents();
        let sample = if config.save_rewards && n > 0 {
            Some(self.sample_agent_index(config.reward_sampling))
        } else {
            None
        };

        rows.rewards.fill(0.0);
        for (entry_idx, entry) in self.rewards.iter_mut().enumerate() {
            let values = entry.reward.get_all_rewards(&self.state, terminal);
            if values.len() != n {
                return Err(ArenaSetError::ShapeMismatch {
                    what: "reward list",
                    expected: n,
                    actual: values.len(),
                });
            }
            for (out, v) in rows.rewards.iter_mut().zip(&values) {
                *out += entry.weight * v;
            }

            if let Some(agent) = sample {
                let diagnostic = entry
                    .reward
                    .diagnostic_rewards()
                    .and_then(|d| d.get(agent).copied());
                if let Some(slot) = rows.last_rewards.get_mut(entry_idx) {
                    *slot = diagnostic.unwrap_or(values[agent]);
                }
            }
        }
        Ok(())
    }

    /// Arena-local index of the agent whose reward is captured.
    pub fn sample_agent_index(&mut self, sampling: RewardSampling) -> usize {
        let players = &self.state.players;
        match sampling {
            RewardSampling::Random => self.rng.gen_range(0..players.len().max(1)),
            RewardSampling::LowestId => players
                .iter()
                .enumerate()
                .min_by_key(|(_, p)| p.id)
                .map(|(i, _)| i)
                .unwrap_or(0),
        }
    }

    fn write_obs(
        &mut self,
        obs: &mut ArrayViewMut2<'_, f32>,
        masks: &mut ArrayViewMut2<'_, u8>,
    ) -> Result<()> {
        for (i, player) in self.state.players.iter().enumerate() {
            let row = self.obs_builder.build_obs(player, &self.state);
            if row.len() != obs.ncols() {
                return Err(ArenaSetError::ShapeMismatch {
                    what: "observation",
                    expected: obs.ncols(),
                    actual: row.len(),
                });
            }
            for (dst, src) in obs.row_mut(i).iter_mut().zip(row) {
                *dst = src;
            }

            let mask = self.action_parser.action_mask(player, &self.state);
            if mask.len() != masks.ncols() {
                return Err(ArenaSetError::ShapeMismatch {
                    what: "action mask",
                    expected: masks.ncols(),
                    actual: mask.len(),
                });
            }
            for (dst, allowed) in masks.row_mut(i).iter_mut().zip(mask) {
                *dst = allowed as u8;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Team;
    use crate::envset::state::EnvState;
    use crate::policy::reward::ZeroSumReward;
    use crate::gamestate::Player;
    use crate::policy::Reward;
    use crate::testing::{ConstReward, KickoffSetter, MockArena, ThrottleParser, TickObs};

    struct IdReward;

    impl Reward for IdReward {
        fn get_reward(&mut self, player: &Player, _state: &GameState, _is_final: bool) -> f32 {
            player.id.0 as f32
        }
    }

    fn slot(arena: MockArena, rewards: Vec<WeightedReward>) -> ArenaSlot {
        ArenaSlot::new(
            0,
            EnvCreateResult {
                arena: Box::new(arena),
                rewards,
                terminal_conditions: Vec::new(),
                obs_builder: Box::new(TickObs),
                action_parser: Box::new(ThrottleParser(4)),
                state_setter: Box::new(KickoffSetter),
            },
            1,
        )
    }

    #[test]
    fn test_lowest_id_sampling_ignores_order() {
        let arena = MockArena::with_ids(&[Team::Blue, Team::Orange, Team::Blue], 10);
        let mut s = slot(arena, Vec::new());
        s.measure_sizes().unwrap();
        let mut state = EnvState::new(&[3], &[0], 3, 4);
        s.reset(None, None, &mut state.split_rows_mut()[0]).unwrap();

        s.state.players.reverse();
        let idx = s.sample_agent_index(RewardSampling::LowestId);
        assert_eq!(s.state.players[idx].id.0, 10);
        for _ in 0..5 {
            assert_eq!(s.sample_agent_index(RewardSampling::LowestId), idx);
        }
    }

    #[test]
    fn test_diagnostic_capture_prefers_undistributed_values() {
        let arena = MockArena::with_ids(&[Team::Blue, Team::Orange], 3);
        let mut s = slot(
            arena,
            vec![
                WeightedReward::new(ZeroSumReward::new(IdReward, 0.0, 1.0), 2.0),
                WeightedReward::new(ConstReward(0.5), 4.0),
            ],
        );
        let config = EnvSetConfig::default()
            .with_save_rewards(true)
            .with_reward_sampling(RewardSampling::LowestId);
        let mut state = EnvState::new(&[2], &[2], 3, 4);
        {
            let mut rows = state.split_rows_mut();
            s.reset(None, None, &mut rows[0]).unwrap();
            s.step_first_half(config.action_delay);
            s.step_second_half(&[0, 1], &config, &mut rows[0]).unwrap();
        }

        // Inner values 3 and 4; zero-sum gives -1 and +1
        assert_eq!(state.rewards(), &[2.0 * -1.0 + 2.0, 2.0 * 1.0 + 2.0]);
        assert_eq!(state.last_rewards(0), &[3.0, 0.5]);
        assert_eq!(state.terminals()[0], TerminalType::NotTerminal);
    }

    #[test]
    fn test_action_out_of_range() {
        let mut s = slot(MockArena::new(&[Team::Blue]), Vec::new());
        let mut state = EnvState::new(&[1], &[0], 3, 4);
        let mut rows = state.split_rows_mut();
        s.reset(None, None, &mut rows[0]).unwrap();
        let err = s
            .step_second_half(&[4], &EnvSetConfig::default(), &mut rows[0])
            .unwrap_err();
        assert!(matches!(err, ArenaSetError::InvalidAction(_)));
    }
}
