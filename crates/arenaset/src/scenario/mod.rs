//! Scenario injection for curriculum training.
//!
//! A scenario is a named initial physical state for the ball and one primary
//! car. Scenarios reach an `EnvSet` either explicitly through
//! `reset_arena(index, Some(..))` or through a `ScenarioProvider` consulted
//! on every reset.

mod apply;
mod generator;

pub use apply::{apply_scenario, primary_car_index};
pub use generator::ScenarioGenerator;

use crate::math::{Angle, Vec3};
use serde::{Deserialize, Serialize};

/// Initial state of the ball and the primary car.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioState {
    pub ball_pos: Vec3,
    pub ball_vel: Vec3,
    pub car_pos: Vec3,
    pub car_vel: Vec3,
    pub car_yaw: f32,
    pub car_pitch: f32,
    pub car_roll: f32,
    pub car_boost: f32,
}

impl Default for ScenarioState {
    fn default() -> Self {
        Self {
            ball_pos: Vec3::new(0.0, 0.0, 92.0),
            ball_vel: Vec3::ZERO,
            car_pos: Vec3::new(0.0, 0.0, 17.0),
            car_vel: Vec3::ZERO,
            car_yaw: 0.0,
            car_pitch: 0.0,
            car_roll: 0.0,
            car_boost: 100.0,
        }
    }
}

impl ScenarioState {
    pub fn car_angle(&self) -> Angle {
        Angle::new(self.car_yaw, self.car_pitch, self.car_roll)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub initial_state: ScenarioState,
}

/// Picks an optional scenario for the arena being reset.
///
/// Called from whichever worker resets that arena, possibly for several
/// arenas at once.
pub type ScenarioProvider = Box<dyn Fn(usize) -> Option<Scenario> + Send + Sync>;

/// Name recorded for scenarios passed to `EnvSet::reset_arena` directly.
pub const MANUAL_SCENARIO_NAME: &str = "manual";
