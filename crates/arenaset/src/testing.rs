//! Scripted arena and policies shared by unit tests.

use crate::arena::common_values::BOOST_LOCATIONS_AMOUNT;
use crate::arena::{
    AgentId, AgentInfo, Arena, BallState, BoostPadState, CarControls, CarState, EventSink,
    GameEvent, Team,
};
use crate::gamestate::{GameState, Player};
use crate::math::Vec3;
use crate::policy::{ActionParser, ObsBuilder, Reward, StateSetter, TerminalCondition};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Arena that records what it was asked to do.
pub(crate) struct MockArena {
    pub agents: Vec<AgentInfo>,
    pub cars: Vec<CarState>,
    pub controls: Vec<CarControls>,
    pub ball: BallState,
    pub pads: Vec<BoostPadState>,
    pub ticks: u64,
    /// Tick count of every `step` call together with the controls resident at the time
    pub step_log: Vec<(u32, Vec<CarControls>)>,
    pub pending_events: Vec<GameEvent>,
    pub scored: bool,
    pub kickoffs: usize,
}

impl MockArena {
    pub fn new(teams: &[Team]) -> Self {
        Self::with_ids(teams, 0)
    }

    pub fn with_ids(teams: &[Team], first_id: u32) -> Self {
        let agents = teams
            .iter()
            .enumerate()
            .map(|(i, &team)| AgentInfo {
                id: AgentId(first_id + i as u32),
                team,
            })
            .collect();
        Self {
            agents,
            cars: vec![CarState::default(); teams.len()],
            controls: vec![CarControls::default(); teams.len()],
            ball: BallState::default(),
            pads: vec![BoostPadState::default(); BOOST_LOCATIONS_AMOUNT],
            ticks: 0,
            step_log: Vec::new(),
            pending_events: Vec::new(),
            scored: false,
            kickoffs: 0,
        }
    }

    pub fn total_ticks_stepped(&self) -> u64 {
        self.step_log.iter().map(|(t, _)| *t as u64).sum()
    }
}

impl Arena for MockArena {
    fn tick_count(&self) -> u64 {
        self.ticks
    }

    fn agents(&self) -> Vec<AgentInfo> {
        self.agents.clone()
    }

    fn car_state(&self, index: usize) -> CarState {
        self.cars[index]
    }

    fn set_car_state(&mut self, index: usize, state: CarState) {
        self.cars[index] = state;
    }

    fn set_controls(&mut self, index: usize, controls: CarControls) {
        self.controls[index] = controls;
    }

    fn ball_state(&self) -> BallState {
        self.ball
    }

    fn set_ball_state(&mut self, state: BallState) {
        self.ball = state;
    }

    fn boost_pads(&self) -> Vec<BoostPadState> {
        self.pads.clone()
    }

    fn is_ball_scored(&self) -> bool {
        self.scored
    }

    fn step(&mut self, ticks: u32, events: &mut dyn EventSink) {
        self.ticks += ticks as u64;
        self.step_log.push((ticks, self.controls.clone()));
        for car in self.cars.iter_mut() {
            car.pos += Vec3::new(0.0, 1.0, 0.0) * ticks as f32;
        }
        for event in self.pending_events.drain(..) {
            events.on_event(event);
        }
    }

    fn reset_kickoff(&mut self, _seed: Option<u64>) {
        self.kickoffs += 1;
        self.ball = BallState::default();
        self.scored = false;
        for (i, car) in self.cars.iter_mut().enumerate() {
            *car = CarState::default();
            car.pos.x = i as f32 * 100.0;
        }
    }
}

/// Observation of constant width: the player's x, y and the arena tick.
pub(crate) struct TickObs;

impl ObsBuilder for TickObs {
    fn build_obs(&mut self, player: &Player, state: &GameState) -> Vec<f32> {
        vec![player.car.pos.x, player.car.pos.y, state.tick_count as f32]
    }
}

/// Action parser whose action `i` sets throttle to `i`.
pub(crate) struct ThrottleParser(pub usize);

impl ActionParser for ThrottleParser {
    fn action_amount(&self) -> usize {
        self.0
    }

    fn parse_action(&mut self, index: usize, _player: &Player, _state: &GameState) -> CarControls {
        CarControls {
            throttle: index as f32,
            ..Default::default()
        }
    }
}

/// Every agent receives `value`.
pub(crate) struct ConstReward(pub f32);

impl Reward for ConstReward {
    fn get_reward(&mut self, _player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        self.0
    }
}

/// Reports a fixed outcome and counts how often it was asked.
pub(crate) struct FixedCondition {
    pub terminal: bool,
    pub truncation: bool,
    pub calls: Arc<AtomicUsize>,
}

impl FixedCondition {
    pub fn new(terminal: bool, truncation: bool) -> Self {
        Self {
            terminal,
            truncation,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl TerminalCondition for FixedCondition {
    fn is_terminal(&mut self, _state: &GameState) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.terminal
    }

    fn is_truncation(&self) -> bool {
        self.truncation
    }
}

pub(crate) struct KickoffSetter;

impl StateSetter for KickoffSetter {
    fn reset_arena(&mut self, arena: &mut dyn Arena) {
        arena.reset_kickoff(None);
    }
}
