//! Per-agent snapshot data.

use crate::arena::{AgentId, CarControls, CarState, Team};

/// Discrete events an agent took part in during the current step.
///
/// Each flag is set at most once per step and cleared before the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerEvents {
    pub goal: bool,
    pub assist: bool,
    pub shot: bool,
    pub shot_pass: bool,
    pub save: bool,
    pub bump: bool,
    pub bumped: bool,
    pub demo: bool,
    pub demoed: bool,
}

impl PlayerEvents {
    pub fn any(&self) -> bool {
        *self != PlayerEvents::default()
    }
}

/// One agent as seen in a `GameState`.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub id: AgentId,
    pub team: Team,
    /// Position in the arena's agent order
    pub index: usize,
    pub car: CarState,
    /// Controls applied during the step that produced this snapshot
    pub prev_action: CarControls,
    pub events: PlayerEvents,
    pub ball_touched_step: bool,
    pub is_demoed: bool,
    /// Boost gained during the step (0 when none)
    pub boost_pickup: f32,
}

impl Player {
    /// Car state from this player's team perspective.
    pub fn perspective_car(&self) -> CarState {
        match self.team {
            Team::Blue => self.car,
            Team::Orange => self.car.inverted(),
        }
    }

    pub fn is_on_ground(&self) -> bool {
        self.car.is_on_ground
    }
}
