//! Teleporting an arena into a scenario's initial state.

use super::ScenarioState;
use crate::arena::common_values::{BOOST_MAX, CAR_SPAWN_REST_Z};
use crate::arena::{Arena, BallHitInfo, CarContact, CarControls, Team};
use crate::math::Vec3;

/// Height above spawn rest at which a car is still considered grounded.
const GROUND_TOLERANCE: f32 = 25.0;

/// The car a scenario drives: the first blue car, else the first car.
pub fn primary_car_index(arena: &dyn Arena) -> Option<usize> {
    let agents = arena.agents();
    agents
        .iter()
        .position(|a| a.team == Team::Blue)
        .or_else(|| (!agents.is_empty()).then_some(0))
}

/// Apply `state` to the ball and the primary car.
///
/// Every transient flag on the primary car is cleared so the car starts
/// from a consistent physical state. Other cars are left untouched.
pub fn apply_scenario(arena: &mut dyn Arena, state: &ScenarioState) {
    let mut ball = arena.ball_state();
    ball.pos = state.ball_pos;
    ball.vel = state.ball_vel;
    arena.set_ball_state(ball);

    let Some(index) = primary_car_index(arena) else {
        return;
    };

    let mut car = arena.car_state(index);
    car.pos = state.car_pos;
    car.vel = state.car_vel;
    car.ang_vel = Vec3::ZERO;
    car.rot_mat = state.car_angle().to_rot_mat();
    car.boost = state.car_boost.clamp(0.0, BOOST_MAX);

    car.is_on_ground = state.car_pos.z <= CAR_SPAWN_REST_Z + GROUND_TOLERANCE;
    car.world_contact = car.is_on_ground;
    car.has_jumped = false;
    car.has_double_jumped = false;
    car.has_flipped = false;
    car.is_jumping = false;
    car.jump_time = 0.0;
    car.flip_time = 0.0;
    car.air_time = 0.0;
    car.air_time_since_jump = 0.0;
    car.is_supersonic = false;
    car.supersonic_time = 0.0;
    car.time_spent_boosting = 0.0;
    car.handbrake_val = 0.0;
    car.last_controls = CarControls::default();
    car.car_contact = CarContact::default();
    car.ball_hit = BallHitInfo::default();

    arena.set_car_state(index, car);
}
