//! Core arena trait definitions.

use super::state::{AgentId, AgentInfo, BallState, BoostPadState, CarControls, CarState};
use super::common_values::TICK_RATE;

/// A discrete event reported by an arena while it advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Goal {
        scorer: AgentId,
        passer: Option<AgentId>,
    },
    Shot {
        shooter: AgentId,
        passer: Option<AgentId>,
    },
    Save {
        saver: AgentId,
    },
    Bump {
        bumper: AgentId,
        victim: AgentId,
        is_demo: bool,
    },
}

/// Receiver of discrete events.
///
/// Arenas call this from whichever worker is stepping them; an implementor
/// only ever sees events from the arena it was handed to.
pub trait EventSink {
    fn on_event(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn on_event(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// One physics instance.
///
/// Agents are addressed by their position in `agents()`. The agent set is
/// fixed for the arena's lifetime.
///
/// # Example
///
/// ```rust,ignore
/// let mut events = Vec::new();
/// arena.set_controls(0, CarControls { throttle: 1.0, ..Default::default() });
/// arena.step(8, &mut events);
/// let car = arena.car_state(0);
/// ```
pub trait Arena: Send {
    /// Physics ticks per simulated second
    fn tick_rate(&self) -> f32 {
        TICK_RATE
    }

    /// Total ticks simulated since creation
    fn tick_count(&self) -> u64;

    /// Agents in stable order
    fn agents(&self) -> Vec<AgentInfo>;

    fn num_agents(&self) -> usize {
        self.agents().len()
    }

    fn car_state(&self, index: usize) -> CarState;

    fn set_car_state(&mut self, index: usize, state: CarState);

    /// Controls persist until replaced
    fn set_controls(&mut self, index: usize, controls: CarControls);

    fn ball_state(&self) -> BallState;

    fn set_ball_state(&mut self, state: BallState);

    fn boost_pads(&self) -> Vec<BoostPadState>;

    /// Whether the ball is currently inside either goal
    fn is_ball_scored(&self) -> bool;

    /// Advance physics by `ticks`, reporting bumps and demolitions to `events`.
    fn step(&mut self, ticks: u32, events: &mut dyn EventSink);

    /// Run shot/goal/save detection on the current state.
    fn update_events(&mut self, _events: &mut dyn EventSink) {}

    /// Forget any event-detection memory carried between steps.
    fn reset_event_tracking(&mut self) {}

    /// Place ball and cars in a kickoff formation.
    fn reset_kickoff(&mut self, seed: Option<u64>);
}
