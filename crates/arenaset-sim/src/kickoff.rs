//! Kickoff spawn positions.

use arenaset::arena::common_values::CAR_SPAWN_REST_Z;
use arenaset::arena::Team;
use arenaset::math::{Angle, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;
use std::f32::consts::PI;

/// Blue kickoff spots as `(x, y, yaw)`; orange uses the mirrored spots.
const BLUE_SPAWNS: [(f32, f32, f32); 5] = [
    (-2048.0, -2560.0, PI * 0.25),
    (2048.0, -2560.0, PI * 0.75),
    (-256.0, -3840.0, PI * 0.5),
    (256.0, -3840.0, PI * 0.5),
    (0.0, -4608.0, PI * 0.5),
];

/// Where demolished cars come back.
const BLUE_RESPAWN: (f32, f32, f32) = (-2304.0, -4608.0, PI * 0.5);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spawn {
    pub pos: Vec3,
    pub angle: Angle,
}

impl Spawn {
    fn for_team((x, y, yaw): (f32, f32, f32), team: Team) -> Self {
        let pos = Vec3::new(x, y, CAR_SPAWN_REST_Z);
        match team {
            Team::Blue => Spawn {
                pos,
                angle: Angle::new(yaw, 0.0, 0.0),
            },
            Team::Orange => Spawn {
                pos: pos.inverted(),
                angle: Angle::new(yaw - PI, 0.0, 0.0),
            },
        }
    }
}

/// One spawn per car of `teams`, in order. Each team draws distinct spots
/// in random order; teams beyond five cars reuse spots.
pub fn kickoff_spawns(teams: &[Team], rng: &mut impl Rng) -> Vec<Spawn> {
    let mut order: Vec<usize> = (0..BLUE_SPAWNS.len()).collect();
    order.shuffle(rng);

    let mut used = [0usize; 2];
    teams
        .iter()
        .map(|&team| {
            let slot = &mut used[team as usize];
            let spot = BLUE_SPAWNS[order[*slot % order.len()]];
            *slot += 1;
            Spawn::for_team(spot, team)
        })
        .collect()
}

pub fn respawn(team: Team) -> Spawn {
    Spawn::for_team(BLUE_RESPAWN, team)
}
