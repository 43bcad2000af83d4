//! Observation builders.

use crate::arena::common_values::BOOST_MAX;
use crate::arena::{CarState, Team};
use crate::gamestate::{GameState, Player};
use crate::math::Vec3;

pub trait ObsBuilder: Send {
    fn reset(&mut self, _initial: &GameState) {}

    /// Observation for one player. Every call must return the same width.
    fn build_obs(&mut self, player: &Player, state: &GameState) -> Vec<f32>;
}

const POS_COEF: f32 = 1.0 / 2300.0;
const VEL_COEF: f32 = 1.0 / 2300.0;
const ANG_VEL_COEF: f32 = 1.0 / std::f32::consts::PI;

/// Ball, own previous action, boost pads, own car, then every other car
/// (teammates first) relative to the player. Orange players see the field
/// mirrored so both teams attack towards +y.
#[derive(Clone, Debug, Default)]
pub struct DefaultObs;

impl DefaultObs {
    pub const BALL_SIZE: usize = 9;
    pub const ACTION_SIZE: usize = 8;
    pub const CAR_SIZE: usize = 19;
    pub const OTHER_CAR_SIZE: usize = Self::CAR_SIZE + 6;

    /// Observation width for an arena with `num_agents` cars.
    pub fn obs_size(num_agents: usize, num_pads: usize) -> usize {
        Self::BALL_SIZE
            + Self::ACTION_SIZE
            + num_pads
            + Self::CAR_SIZE
            + num_agents.saturating_sub(1) * Self::OTHER_CAR_SIZE
    }

    fn push_vec(obs: &mut Vec<f32>, v: Vec3, coef: f32) {
        obs.extend_from_slice(&(v * coef).to_array());
    }

    fn push_car(obs: &mut Vec<f32>, car: &CarState) {
        Self::push_vec(obs, car.pos, POS_COEF);
        Self::push_vec(obs, car.rot_mat.forward, 1.0);
        Self::push_vec(obs, car.rot_mat.up, 1.0);
        Self::push_vec(obs, car.vel, VEL_COEF);
        Self::push_vec(obs, car.ang_vel, ANG_VEL_COEF);
        obs.push(car.boost / BOOST_MAX);
        obs.push(car.is_on_ground as u8 as f32);
        obs.push((!car.has_flipped && !car.has_double_jumped) as u8 as f32);
        obs.push(car.is_demoed as u8 as f32);
    }
}

impl ObsBuilder for DefaultObs {
    fn build_obs(&mut self, player: &Player, state: &GameState) -> Vec<f32> {
        let inverted = player.team == Team::Orange;
        let ball = if inverted {
            state.ball.inverted()
        } else {
            state.ball
        };
        let own = player.perspective_car();

        let mut obs = Vec::with_capacity(Self::obs_size(state.players.len(), state.boost_pads.len()));
        Self::push_vec(&mut obs, ball.pos, POS_COEF);
        Self::push_vec(&mut obs, ball.vel, VEL_COEF);
        Self::push_vec(&mut obs, ball.ang_vel, ANG_VEL_COEF);
        obs.extend_from_slice(&player.prev_action.to_array());
        obs.extend(state.boost_pads(inverted).iter().map(|&b| b as u8 as f32));
        Self::push_car(&mut obs, &own);

        let teammates = state
            .players
            .iter()
            .filter(|p| p.index != player.index && p.team == player.team);
        let opponents = state.players.iter().filter(|p| p.team != player.team);
        for other in teammates.chain(opponents) {
            let car = if inverted {
                other.car.inverted()
            } else {
                other.car
            };
            Self::push_car(&mut obs, &car);
            Self::push_vec(&mut obs, car.pos - own.pos, POS_COEF);
            Self::push_vec(&mut obs, car.vel - own.vel, VEL_COEF);
        }

        obs
    }
}
