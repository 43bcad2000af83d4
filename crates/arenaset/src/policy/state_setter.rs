//! Default (non-scenario) arena resets.

use crate::arena::common_values::{
    BALL_RADIUS, BALL_REST_Z, BOOST_MAX, CAR_SPAWN_REST_Z, CEILING_Z, SIDE_WALL_X,
};
use crate::arena::{Arena, BallState, CarState};
use crate::math::{Angle, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait StateSetter: Send {
    fn reset_arena(&mut self, arena: &mut dyn Arena);
}

/// Resets to one of the arena's kickoff formations.
pub struct KickoffState {
    rng: StdRng,
}

impl Default for KickoffState {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl KickoffState {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl StateSetter for KickoffState {
    fn reset_arena(&mut self, arena: &mut dyn Arena) {
        arena.reset_kickoff(Some(self.rng.gen()));
    }
}

/// Teleports the ball and every car to uniformly random positions.
pub struct RandomState {
    rng: StdRng,
    /// Allow cars to spawn airborne
    pub cars_in_air: bool,
    pub max_ball_speed: f32,
    pub max_car_speed: f32,
}

impl RandomState {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            cars_in_air: false,
            max_ball_speed: 1500.0,
            max_car_speed: 1000.0,
        }
    }

    fn random_dir(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
        )
        .normalized()
    }

    fn random_floor_pos(&mut self, margin: f32, z: f32) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(-(SIDE_WALL_X - margin)..=(SIDE_WALL_X - margin)),
            self.rng.gen_range(-4000.0..=4000.0),
            z,
        )
    }
}

impl StateSetter for RandomState {
    fn reset_arena(&mut self, arena: &mut dyn Arena) {
        arena.reset_kickoff(None);

        let ball_z = self.rng.gen_range(BALL_REST_Z..=(CEILING_Z - BALL_RADIUS));
        let ball_speed = self.rng.gen_range(0.0..=self.max_ball_speed);
        let ball = BallState {
            pos: self.random_floor_pos(BALL_RADIUS * 2.0, ball_z),
            vel: self.random_dir() * ball_speed,
            ang_vel: Vec3::ZERO,
        };
        arena.set_ball_state(ball);

        for index in 0..arena.num_agents() {
            let z = if self.cars_in_air {
                self.rng.gen_range(CAR_SPAWN_REST_Z..=(CEILING_Z / 2.0))
            } else {
                CAR_SPAWN_REST_Z
            };
            let yaw = self.rng.gen_range(-std::f32::consts::PI..=std::f32::consts::PI);
            let mut vel = self.random_dir() * self.rng.gen_range(0.0..=self.max_car_speed);
            if z <= CAR_SPAWN_REST_Z {
                vel.z = 0.0;
            }
            let car = CarState {
                pos: self.random_floor_pos(200.0, z),
                vel,
                rot_mat: Angle::new(yaw, 0.0, 0.0).to_rot_mat(),
                boost: self.rng.gen_range(0.0..=BOOST_MAX),
                is_on_ground: z <= CAR_SPAWN_REST_Z,
                world_contact: z <= CAR_SPAWN_REST_Z,
                ..CarState::default()
            };
            arena.set_car_state(index, car);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Team;
    use crate::testing::MockArena;

    #[test]
    fn test_kickoff_delegates_to_arena() {
        let mut arena = MockArena::new(&[Team::Blue, Team::Orange]);
        KickoffState::new(1).reset_arena(&mut arena);
        assert_eq!(arena.kickoffs, 1);
    }

    #[test]
    fn test_random_state_stays_in_bounds() {
        let mut arena = MockArena::new(&[Team::Blue, Team::Orange]);
        let mut setter = RandomState::new(7);
        for _ in 0..20 {
            setter.reset_arena(&mut arena);
            assert!(arena.ball.pos.x.abs() <= SIDE_WALL_X);
            assert!(arena.ball.pos.z <= CEILING_Z);
            for car in &arena.cars {
                assert!(car.pos.x.abs() <= SIDE_WALL_X);
                assert!(car.boost >= 0.0 && car.boost <= BOOST_MAX);
                assert!(car.is_on_ground);
            }
        }
    }
}
