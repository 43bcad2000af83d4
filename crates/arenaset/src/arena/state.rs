//! Physical state value types exchanged with an arena.

use crate::math::{RotMat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a car inside its arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Blue,
    Orange,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Orange,
            Team::Orange => Team::Blue,
        }
    }

    /// +1 for blue, -1 for orange: blue attacks towards +y.
    pub fn direction(self) -> f32 {
        match self {
            Team::Blue => 1.0,
            Team::Orange => -1.0,
        }
    }
}

/// Identity of one agent slot in an arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentInfo {
    pub id: AgentId,
    pub team: Team,
}

/// Controls applied to one car until replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CarControls {
    pub throttle: f32,
    pub steer: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub jump: bool,
    pub boost: bool,
    pub handbrake: bool,
}

impl CarControls {
    /// Controls as eight floats in the conventional order.
    pub fn to_array(&self) -> [f32; 8] {
        [
            self.throttle,
            self.steer,
            self.pitch,
            self.yaw,
            self.roll,
            self.jump as u8 as f32,
            self.boost as u8 as f32,
            self.handbrake as u8 as f32,
        ]
    }
}

/// Car-to-car contact memory used to debounce bumps.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CarContact {
    pub other_car: Option<AgentId>,
    pub cooldown_timer: f32,
}

/// Information about the most recent ball touch by a car.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BallHitInfo {
    pub is_valid: bool,
    pub relative_pos_on_ball: Vec3,
    pub ball_pos: Vec3,
    pub extra_hit_vel: Vec3,
    pub tick_count_when_hit: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarState {
    pub pos: Vec3,
    pub vel: Vec3,
    pub ang_vel: Vec3,
    pub rot_mat: RotMat,
    pub boost: f32,

    pub is_on_ground: bool,
    pub world_contact: bool,
    pub has_jumped: bool,
    pub has_double_jumped: bool,
    pub has_flipped: bool,
    pub is_jumping: bool,
    pub jump_time: f32,
    pub flip_time: f32,
    pub air_time: f32,
    pub air_time_since_jump: f32,
    pub is_supersonic: bool,
    pub supersonic_time: f32,
    pub time_spent_boosting: f32,
    pub handbrake_val: f32,

    pub is_demoed: bool,
    pub demo_respawn_timer: f32,

    pub last_controls: CarControls,
    pub car_contact: CarContact,
    pub ball_hit: BallHitInfo,
}

impl Default for CarState {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, 0.0, super::common_values::CAR_SPAWN_REST_Z),
            vel: Vec3::ZERO,
            ang_vel: Vec3::ZERO,
            rot_mat: RotMat::IDENTITY,
            boost: 33.3,
            is_on_ground: true,
            world_contact: true,
            has_jumped: false,
            has_double_jumped: false,
            has_flipped: false,
            is_jumping: false,
            jump_time: 0.0,
            flip_time: 0.0,
            air_time: 0.0,
            air_time_since_jump: 0.0,
            is_supersonic: false,
            supersonic_time: 0.0,
            time_spent_boosting: 0.0,
            handbrake_val: 0.0,
            is_demoed: false,
            demo_respawn_timer: 0.0,
            last_controls: CarControls::default(),
            car_contact: CarContact::default(),
            ball_hit: BallHitInfo::default(),
        }
    }
}

impl CarState {
    /// Kinematic part of the state mirrored for the orange team.
    pub fn inverted(&self) -> CarState {
        CarState {
            pos: self.pos.inverted(),
            vel: self.vel.inverted(),
            ang_vel: self.ang_vel.inverted(),
            rot_mat: self.rot_mat.inverted(),
            ..*self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallState {
    pub pos: Vec3,
    pub vel: Vec3,
    pub ang_vel: Vec3,
}

impl Default for BallState {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, 0.0, super::common_values::BALL_REST_Z),
            vel: Vec3::ZERO,
            ang_vel: Vec3::ZERO,
        }
    }
}

impl BallState {
    pub fn inverted(&self) -> BallState {
        BallState {
            pos: self.pos.inverted(),
            vel: self.vel.inverted(),
            ang_vel: self.ang_vel.inverted(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoostPadState {
    pub is_active: bool,
    pub cooldown: f32,
}

impl Default for BoostPadState {
    fn default() -> Self {
        Self {
            is_active: true,
            cooldown: 0.0,
        }
    }
}
