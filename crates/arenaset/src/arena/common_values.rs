//! Field dimensions and physical limits shared by policies and arenas.

use crate::math::Vec3;

pub const TICK_RATE: f32 = 120.0;

pub const SIDE_WALL_X: f32 = 4096.0;
pub const BACK_WALL_Y: f32 = 5120.0;
pub const CEILING_Z: f32 = 2044.0;
pub const BACK_NET_Y: f32 = 6000.0;

pub const GOAL_HEIGHT: f32 = 642.775;
pub const GOAL_HALF_WIDTH: f32 = 892.755;

pub const BALL_RADIUS: f32 = 91.25;
pub const BALL_REST_Z: f32 = 93.15;
pub const BALL_MAX_SPEED: f32 = 6000.0;

pub const CAR_MAX_SPEED: f32 = 2300.0;
pub const CAR_MAX_ANG_VEL: f32 = 5.5;
pub const CAR_SPAWN_REST_Z: f32 = 17.0;
pub const SUPERSONIC_THRESHOLD: f32 = 2200.0;
pub const BOOST_MAX: f32 = 100.0;

pub const ORANGE_GOAL_CENTER: Vec3 = Vec3::new(0.0, BACK_WALL_Y, GOAL_HEIGHT / 2.0);
pub const BLUE_GOAL_CENTER: Vec3 = Vec3::new(0.0, -BACK_WALL_Y, GOAL_HEIGHT / 2.0);
pub const ORANGE_GOAL_BACK: Vec3 = Vec3::new(0.0, BACK_NET_Y, GOAL_HEIGHT / 2.0);
pub const BLUE_GOAL_BACK: Vec3 = Vec3::new(0.0, -BACK_NET_Y, GOAL_HEIGHT / 2.0);

/// Boost pad locations. The list is point-symmetric: pad `i` mirrors pad
/// `BOOST_LOCATIONS_AMOUNT - 1 - i`.
pub const BOOST_LOCATIONS: [Vec3; BOOST_LOCATIONS_AMOUNT] = [
    Vec3::new(0.0, -4240.0, 70.0),
    Vec3::new(-1792.0, -4184.0, 70.0),
    Vec3::new(1792.0, -4184.0, 70.0),
    Vec3::new(-3072.0, -4096.0, 73.0),
    Vec3::new(3072.0, -4096.0, 73.0),
    Vec3::new(-940.0, -3308.0, 70.0),
    Vec3::new(940.0, -3308.0, 70.0),
    Vec3::new(0.0, -2816.0, 70.0),
    Vec3::new(-3584.0, -2484.0, 70.0),
    Vec3::new(3584.0, -2484.0, 70.0),
    Vec3::new(-1788.0, -2300.0, 70.0),
    Vec3::new(1788.0, -2300.0, 70.0),
    Vec3::new(-2048.0, -1036.0, 70.0),
    Vec3::new(0.0, -1024.0, 70.0),
    Vec3::new(2048.0, -1036.0, 70.0),
    Vec3::new(-3584.0, 0.0, 73.0),
    Vec3::new(-1024.0, 0.0, 70.0),
    Vec3::new(1024.0, 0.0, 70.0),
    Vec3::new(3584.0, 0.0, 73.0),
    Vec3::new(-2048.0, 1036.0, 70.0),
    Vec3::new(0.0, 1024.0, 70.0),
    Vec3::new(2048.0, 1036.0, 70.0),
    Vec3::new(-1788.0, 2300.0, 70.0),
    Vec3::new(1788.0, 2300.0, 70.0),
    Vec3::new(-3584.0, 2484.0, 70.0),
    Vec3::new(3584.0, 2484.0, 70.0),
    Vec3::new(0.0, 2816.0, 70.0),
    Vec3::new(-940.0, 3308.0, 70.0),
    Vec3::new(940.0, 3308.0, 70.0),
    Vec3::new(-3072.0, 4096.0, 73.0),
    Vec3::new(3072.0, 4096.0, 73.0),
    Vec3::new(-1792.0, 4184.0, 70.0),
    Vec3::new(1792.0, 4184.0, 70.0),
    Vec3::new(0.0, 4240.0, 70.0),
];

pub const BOOST_LOCATIONS_AMOUNT: usize = 34;

/// Whether the pad at `index` is a full (100 boost) pad.
pub fn is_big_pad(index: usize) -> bool {
    BOOST_LOCATIONS.get(index).map_or(false, |p| p.z > 71.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_locations_are_mirrored() {
        for i in 0..BOOST_LOCATIONS_AMOUNT {
            let mirrored = BOOST_LOCATIONS[BOOST_LOCATIONS_AMOUNT - 1 - i];
            assert_eq!(BOOST_LOCATIONS[i].inverted(), mirrored, "pad {}", i);
        }
    }

    #[test]
    fn test_big_pad_count() {
        let big = (0..BOOST_LOCATIONS_AMOUNT).filter(|&i| is_big_pad(i)).count();
        assert_eq!(big, 6);
    }
}
