//! Per-step snapshot of one arena.
//!
//! A `GameState` is rebuilt from its arena after every step and handed to
//! every policy object. It links the snapshot from the step before for one
//! step only: the linked snapshot never carries a link of its own.

mod player;

pub use player::{Player, PlayerEvents};

use crate::arena::common_values::BOOST_LOCATIONS_AMOUNT;
use crate::arena::{AgentId, Arena, BallState, CarControls};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct GameState {
    /// Snapshot from the previous step, if one is retained
    pub prev: Option<Arc<GameState>>,
    /// Simulated seconds since this snapshot was last updated
    pub delta_time: f32,
    pub tick_count: u64,
    /// Ball is inside a goal
    pub goal_scored: bool,
    pub last_touch: Option<AgentId>,
    pub players: Vec<Player>,
    pub ball: BallState,
    pub boost_pads: Vec<bool>,
    pub boost_pads_inv: Vec<bool>,
    pub boost_pad_timers: Vec<f32>,
    pub boost_pad_timers_inv: Vec<f32>,
    /// Scenario applied at the last reset, empty for a default reset
    pub scenario_name: String,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            prev: None,
            delta_time: 0.0,
            tick_count: 0,
            goal_scored: false,
            last_touch: None,
            players: Vec::new(),
            ball: BallState::default(),
            boost_pads: vec![true; BOOST_LOCATIONS_AMOUNT],
            boost_pads_inv: vec![true; BOOST_LOCATIONS_AMOUNT],
            boost_pad_timers: vec![0.0; BOOST_LOCATIONS_AMOUNT],
            boost_pad_timers_inv: vec![0.0; BOOST_LOCATIONS_AMOUNT],
            scenario_name: String::new(),
        }
    }
}

impl GameState {
    /// Fresh snapshot of an arena, with no previous link and idle actions.
    pub fn from_arena(arena: &dyn Arena) -> Self {
        let mut state = GameState::default();
        let actions = vec![CarControls::default(); arena.num_agents()];
        let events = vec![PlayerEvents::default(); arena.num_agents()];
        state.update_from_arena(arena, &actions, None, &events);
        state
    }

    /// Rebuild this snapshot from `arena`.
    ///
    /// `actions` are the controls that were just applied and `events` the
    /// flags accumulated while stepping, both in arena agent order. The
    /// scenario name is kept. The arena is only read.
    pub fn update_from_arena(
        &mut self,
        arena: &dyn Arena,
        actions: &[CarControls],
        prev: Option<Arc<GameState>>,
        events: &[PlayerEvents],
    ) {
        let last_tick = self.tick_count;
        let tick_count = arena.tick_count();

        // From this snapshot's own last update, not from `prev`
        self.delta_time = if self.is_empty() {
            0.0
        } else {
            tick_count.saturating_sub(last_tick) as f32 / arena.tick_rate()
        };
        self.prev = prev.map(strip_prev);
        self.tick_count = tick_count;
        self.goal_scored = arena.is_ball_scored();
        self.ball = arena.ball_state();

        let agents = arena.agents();
        let mut players = Vec::with_capacity(agents.len());
        for (index, info) in agents.iter().enumerate() {
            let car = arena.car_state(index);
            let old_boost = self
                .players
                .get(index)
                .filter(|p| p.id == info.id)
                .map(|p| p.car.boost);

            players.push(Player {
                id: info.id,
                team: info.team,
                index,
                prev_action: actions.get(index).copied().unwrap_or_default(),
                events: events.get(index).copied().unwrap_or_default(),
                ball_touched_step: car.ball_hit.is_valid
                    && car.ball_hit.tick_count_when_hit > last_tick,
                is_demoed: car.is_demoed,
                boost_pickup: old_boost.map_or(0.0, |old| (car.boost - old).max(0.0)),
                car,
            });
        }

        if let Some(toucher) = players
            .iter()
            .filter(|p| p.car.ball_hit.is_valid)
            .max_by_key(|p| p.car.ball_hit.tick_count_when_hit)
        {
            self.last_touch = Some(toucher.id);
        }
        self.players = players;

        let pads = arena.boost_pads();
        self.boost_pads = pads.iter().map(|p| p.is_active).collect();
        self.boost_pad_timers = pads.iter().map(|p| p.cooldown).collect();
        self.boost_pads_inv = self.boost_pads.iter().rev().copied().collect();
        self.boost_pad_timers_inv = self.boost_pad_timers.iter().rev().copied().collect();
    }

    pub fn boost_pads(&self, inverted: bool) -> &[bool] {
        if inverted {
            &self.boost_pads_inv
        } else {
            &self.boost_pads
        }
    }

    pub fn boost_pad_timers(&self, inverted: bool) -> &[f32] {
        if inverted {
            &self.boost_pad_timers_inv
        } else {
            &self.boost_pad_timers
        }
    }

    pub fn player(&self, id: AgentId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn make_empty(&mut self) {
        self.players.clear();
        self.prev = None;
    }
}

/// Drop the link a retained snapshot would otherwise keep to its own past.
fn strip_prev(state: Arc<GameState>) -> Arc<GameState> {
    if state.prev.is_none() {
        return state;
    }
    let mut owned = Arc::unwrap_or_clone(state);
    owned.prev = None;
    Arc::new(owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{EventSink, Team};
    use crate::testing::MockArena;

    #[test]
    fn test_from_arena_reads_every_agent() {
        let arena = MockArena::new(&[Team::Blue, Team::Orange, Team::Orange]);
        let state = GameState::from_arena(&arena);

        assert_eq!(state.players.len(), 3);
        assert!(state.prev.is_none());
        assert_eq!(state.delta_time, 0.0);
        assert_eq!(state.players[1].team, Team::Orange);
        assert_eq!(state.players[2].index, 2);
        assert_eq!(state.boost_pads.len(), BOOST_LOCATIONS_AMOUNT);
    }

    #[test]
    fn test_update_links_prev_one_level() {
        let mut arena = MockArena::new(&[Team::Blue, Team::Orange]);
        let mut state = GameState::from_arena(&arena);
        let mut sink: Vec<crate::arena::GameEvent> = Vec::new();
        let events = vec![PlayerEvents::default(); 2];
        let actions = vec![CarControls::default(); 2];

        arena.step(8, &mut sink as &mut dyn EventSink);
        let prev = Arc::new(state.clone());
        state.update_from_arena(&arena, &actions, Some(prev), &events);
        assert!(state.prev.is_some());
        assert!((state.delta_time - 8.0 / 120.0).abs() < 1e-6);

        arena.step(8, &mut sink as &mut dyn EventSink);
        let prev = Arc::new(state.clone());
        state.update_from_arena(&arena, &actions, Some(prev), &events);
        let prev = state.prev.as_ref().unwrap();
        assert!(prev.prev.is_none());
    }

    #[test]
    fn test_delta_time_without_prev_link() {
        let mut arena = MockArena::new(&[Team::Blue, Team::Orange]);
        let mut state = GameState::from_arena(&arena);
        let mut sink: Vec<crate::arena::GameEvent> = Vec::new();

        arena.step(8, &mut sink as &mut dyn EventSink);
        state.update_from_arena(&arena, &[], None, &[]);
        assert!(state.prev.is_none());
        assert!((state.delta_time - 8.0 / 120.0).abs() < 1e-6);

        state.update_from_arena(&arena, &[], None, &[]);
        assert_eq!(state.delta_time, 0.0);
    }

    #[test]
    fn test_update_attaches_applied_actions_and_events() {
        let arena = MockArena::new(&[Team::Blue, Team::Orange]);
        let mut state = GameState::from_arena(&arena);
        let actions = vec![
            CarControls {
                throttle: 1.0,
                ..Default::default()
            },
            CarControls {
                boost: true,
                ..Default::default()
            },
        ];
        let mut events = vec![PlayerEvents::default(); 2];
        events[1].save = true;

        state.update_from_arena(&arena, &actions, None, &events);
        assert_eq!(state.players[0].prev_action.throttle, 1.0);
        assert!(state.players[1].prev_action.boost);
        assert!(state.players[1].events.save);
        assert!(!state.players[0].events.any());
    }

    #[test]
    fn test_scenario_name_survives_update() {
        let arena = MockArena::new(&[Team::Blue]);
        let mut state = GameState::from_arena(&arena);
        state.scenario_name = "aerial".to_string();
        state.update_from_arena(&arena, &[], None, &[]);
        assert_eq!(state.scenario_name, "aerial");
    }

    #[test]
    fn test_make_empty() {
        let arena = MockArena::new(&[Team::Blue]);
        let mut state = GameState::from_arena(&arena);
        assert!(!state.is_empty());
        state.make_empty();
        assert!(state.is_empty());
    }
}
