//! Scripted arena and policies for integration tests.
#![allow(dead_code)]

use arenaset::arena::common_values::BOOST_LOCATIONS_AMOUNT;
use arenaset::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Everything a test may want to look at after the arena moved into an EnvSet.
#[derive(Clone, Default)]
pub struct Recorder {
    /// `(ticks, controls)` of every `step` call
    pub steps: Arc<Mutex<Vec<(u32, Vec<CarControls>)>>>,
    pub resets: Arc<AtomicUsize>,
    /// Events fired during the next `step`
    pub events: Arc<Mutex<Vec<GameEvent>>>,
}

impl Recorder {
    pub fn steps(&self) -> Vec<(u32, Vec<CarControls>)> {
        self.steps.lock().unwrap().clone()
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn fire(&self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct ScriptedArena {
    agents: Vec<AgentInfo>,
    cars: Vec<CarState>,
    ball: BallState,
    ticks: u64,
    controls: Vec<CarControls>,
    recorder: Recorder,
}

impl ScriptedArena {
    pub fn new(teams: &[Team], first_id: u32, recorder: Recorder) -> Self {
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
            ball: BallState::default(),
            ticks: 0,
            controls: vec![CarControls::default(); teams.len()],
            recorder,
        }
    }
}

impl Arena for ScriptedArena {
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
        vec![BoostPadState::default(); BOOST_LOCATIONS_AMOUNT]
    }

    fn is_ball_scored(&self) -> bool {
        false
    }

    fn step(&mut self, ticks: u32, events: &mut dyn EventSink) {
        self.ticks += ticks as u64;
        for (car, c) in self.cars.iter_mut().zip(&self.controls) {
            car.pos.y += c.throttle * ticks as f32;
        }
        self.recorder
            .steps
            .lock()
            .unwrap()
            .push((ticks, self.controls.clone()));
        for event in self.recorder.events.lock().unwrap().drain(..) {
            events.on_event(event);
        }
    }

    fn reset_kickoff(&mut self, _seed: Option<u64>) {
        self.recorder.resets.fetch_add(1, Ordering::SeqCst);
        self.ball = BallState::default();
        for car in &mut self.cars {
            *car = CarState::default();
        }
    }
}

pub struct KickoffOnly;

impl StateSetter for KickoffOnly {
    fn reset_arena(&mut self, arena: &mut dyn Arena) {
        arena.reset_kickoff(None);
    }
}

/// Car position and tick count.
pub struct PosObs;

impl ObsBuilder for PosObs {
    fn build_obs(&mut self, player: &Player, state: &GameState) -> Vec<f32> {
        vec![player.car.pos.y, state.tick_count as f32]
    }
}

/// Observation whose width is fixed per instance.
pub struct WidthObs(pub usize);

impl ObsBuilder for WidthObs {
    fn build_obs(&mut self, _player: &Player, _state: &GameState) -> Vec<f32> {
        vec![0.0; self.0]
    }
}

/// Action `i` sets throttle `i`; panics on `panic_on`.
pub struct ThrottleActions {
    pub amount: usize,
    pub panic_on: Option<usize>,
}

impl ThrottleActions {
    pub fn new(amount: usize) -> Self {
        Self {
            amount,
            panic_on: None,
        }
    }
}

impl ActionParser for ThrottleActions {
    fn action_amount(&self) -> usize {
        self.amount
    }

    fn parse_action(&mut self, index: usize, _player: &Player, _state: &GameState) -> CarControls {
        if Some(index) == self.panic_on {
            panic!("action parser failure");
        }
        CarControls {
            throttle: index as f32,
            ..Default::default()
        }
    }
}

pub struct Const(pub f32);

impl Reward for Const {
    fn get_reward(&mut self, _player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        self.0
    }
}

/// Pays each agent its id.
pub struct IdReward;

impl Reward for IdReward {
    fn get_reward(&mut self, player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        player.id.0 as f32
    }
}

/// Records whether each scored snapshot carried a previous link.
pub struct PrevRecorder(pub Arc<Mutex<Vec<bool>>>);

impl Reward for PrevRecorder {
    fn get_reward(&mut self, _player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        0.0
    }

    fn get_all_rewards(&mut self, state: &GameState, _terminal: TerminalType) -> Vec<f32> {
        self.0.lock().unwrap().push(state.prev.is_some());
        vec![0.0; state.players.len()]
    }
}

/// Terminal while the shared flag is set.
pub struct FlagCondition {
    pub flag: Arc<AtomicBool>,
    pub truncation: bool,
    pub calls: Arc<AtomicUsize>,
}

impl FlagCondition {
    pub fn new(flag: Arc<AtomicBool>, truncation: bool) -> Self {
        Self {
            flag,
            truncation,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl TerminalCondition for FlagCondition {
    fn is_terminal(&mut self, _state: &GameState) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.flag.load(Ordering::SeqCst)
    }

    fn is_truncation(&self) -> bool {
        self.truncation
    }
}

/// A 1v1 arena with the scripted policies and the given rewards.
pub fn duel(recorder: Recorder, first_id: u32, rewards: Vec<WeightedReward>) -> EnvCreateResult {
    EnvCreateResult {
        arena: Box::new(ScriptedArena::new(&[Team::Blue, Team::Orange], first_id, recorder)),
        rewards,
        terminal_conditions: Vec::new(),
        obs_builder: Box::new(PosObs),
        action_parser: Box::new(ThrottleActions::new(4)),
        state_setter: Box::new(KickoffOnly),
    }
}

/// Shared counters for the reset and pre-step hooks of the counting policies.
#[derive(Clone, Default)]
pub struct Hooks {
    pub reward_resets: Arc<AtomicUsize>,
    pub condition_resets: Arc<AtomicUsize>,
    pub obs_resets: Arc<AtomicUsize>,
    /// `"pre_step <tag>"` / `"rewards <tag>"` in call order
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl Hooks {
    pub fn reward_resets(&self) -> usize {
        self.reward_resets.load(Ordering::SeqCst)
    }

    pub fn condition_resets(&self) -> usize {
        self.condition_resets.load(Ordering::SeqCst)
    }

    pub fn obs_resets(&self) -> usize {
        self.obs_resets.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct CountingReward {
    pub tag: &'static str,
    pub hooks: Hooks,
}

impl Reward for CountingReward {
    fn reset(&mut self, _initial: &GameState) {
        self.hooks.reward_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn pre_step(&mut self, _state: &GameState) {
        self.hooks
            .calls
            .lock()
            .unwrap()
            .push(format!("pre_step {}", self.tag));
    }

    fn get_reward(&mut self, _player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        0.0
    }

    fn get_all_rewards(&mut self, state: &GameState, _terminal: TerminalType) -> Vec<f32> {
        self.hooks
            .calls
            .lock()
            .unwrap()
            .push(format!("rewards {}", self.tag));
        vec![0.0; state.players.len()]
    }
}

pub struct CountingCondition(pub Hooks);

impl TerminalCondition for CountingCondition {
    fn reset(&mut self, _initial: &GameState) {
        self.0.condition_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn is_terminal(&mut self, _state: &GameState) -> bool {
        false
    }
}

/// `PosObs` that counts its resets.
pub struct CountingObs(pub Hooks);

impl ObsBuilder for CountingObs {
    fn reset(&mut self, _initial: &GameState) {
        self.0.obs_resets.fetch_add(1, Ordering::SeqCst);
    }

    fn build_obs(&mut self, player: &Player, state: &GameState) -> Vec<f32> {
        PosObs.build_obs(player, state)
    }
}

/// `ThrottleActions` whose action `i` is allowed once the car reached `y >= i * 1000`.
pub struct DistanceMask(pub ThrottleActions);

impl ActionParser for DistanceMask {
    fn action_amount(&self) -> usize {
        self.0.action_amount()
    }

    fn parse_action(&mut self, index: usize, player: &Player, state: &GameState) -> CarControls {
        self.0.parse_action(index, player, state)
    }

    fn action_mask(&self, player: &Player, _state: &GameState) -> Vec<bool> {
        (0..self.action_amount())
            .map(|i| player.car.pos.y >= i as f32 * 1000.0)
            .collect()
    }
}

/// Records `delta_time` of every scored snapshot.
pub struct DeltaTimes(pub Arc<Mutex<Vec<f32>>>);

impl Reward for DeltaTimes {
    fn get_reward(&mut self, _player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        0.0
    }

    fn get_all_rewards(&mut self, state: &GameState, _terminal: TerminalType) -> Vec<f32> {
        self.0.lock().unwrap().push(state.delta_time);
        vec![0.0; state.players.len()]
    }
}

/// A 1v1 arena whose policies report every hook call to `hooks`.
pub fn counted_duel(recorder: Recorder, hooks: Hooks) -> EnvCreateResult {
    EnvCreateResult {
        arena: Box::new(ScriptedArena::new(&[Team::Blue, Team::Orange], 0, recorder)),
        rewards: vec![
            WeightedReward::new(
                CountingReward {
                    tag: "a",
                    hooks: hooks.clone(),
                },
                1.0,
            ),
            WeightedReward::new(
                CountingReward {
                    tag: "b",
                    hooks: hooks.clone(),
                },
                1.0,
            ),
        ],
        terminal_conditions: vec![Box::new(CountingCondition(hooks.clone()))],
        obs_builder: Box::new(CountingObs(hooks)),
        action_parser: Box::new(DistanceMask(ThrottleActions::new(4))),
        state_setter: Box::new(KickoffOnly),
    }
}
