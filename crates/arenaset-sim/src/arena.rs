//! The `SimArena` physics stand-in.

use crate::kickoff::{kickoff_spawns, respawn, Spawn};
use crate::physics::{give_boost, step_ball, step_car, CAR_RADIUS};
use crate::tracker::ShotTracker;
use arenaset::arena::common_values::{
    is_big_pad, BALL_RADIUS, BOOST_LOCATIONS, BOOST_LOCATIONS_AMOUNT, TICK_RATE,
};
use arenaset::arena::{
    AgentId, AgentInfo, Arena, BallHitInfo, BallState, BoostPadState, CarContact, CarControls,
    CarState, EventSink, GameEvent, Team,
};
use arenaset::math::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

const SPAWN_BOOST: f32 = 33.3;
const DEMO_RESPAWN_SECONDS: f32 = 3.0;
const BUMP_COOLDOWN: f32 = 0.25;
/// Closing speed below which car contact is not a bump
const BUMP_MIN_SPEED: f32 = 300.0;
const HIT_SCALE: f32 = 1.5;
const HIT_MIN_SPEED: f32 = 250.0;

const BIG_PAD_RADIUS: f32 = 208.0;
const SMALL_PAD_RADIUS: f32 = 144.0;
const BIG_PAD_BOOST: f32 = 100.0;
const SMALL_PAD_BOOST: f32 = 12.0;
const BIG_PAD_COOLDOWN: f32 = 10.0;
const SMALL_PAD_COOLDOWN: f32 = 4.0;

/// A kinematic soccar arena.
///
/// Cars drive, jump and boost; the ball bounces and can be scored; cars
/// touch the ball, bump and demolish each other and pick up boost. Shots,
/// saves and goals are inferred from the touch history.
pub struct SimArena {
    agents: Vec<AgentInfo>,
    cars: Vec<CarState>,
    controls: Vec<CarControls>,
    ball: BallState,
    pads: Vec<BoostPadState>,
    tick_count: u64,
    scored: Option<Team>,
    tracker: ShotTracker,
    rng: StdRng,
}

impl SimArena {
    /// One car per entry of `teams`, with ids counting up from 1.
    pub fn new(teams: &[Team], seed: u64) -> Self {
        let agents = teams
            .iter()
            .enumerate()
            .map(|(i, &team)| AgentInfo {
                id: AgentId(i as u32 + 1),
                team,
            })
            .collect();
        let mut arena = Self {
            agents,
            cars: vec![CarState::default(); teams.len()],
            controls: vec![CarControls::default(); teams.len()],
            ball: BallState::default(),
            pads: vec![BoostPadState::default(); BOOST_LOCATIONS_AMOUNT],
            tick_count: 0,
            scored: None,
            tracker: ShotTracker::default(),
            rng: StdRng::seed_from_u64(seed),
        };
        arena.reset_kickoff(None);
        arena
    }

    /// `team_size` blue cars followed by `team_size` orange cars.
    pub fn with_team_size(team_size: usize, seed: u64) -> Self {
        let teams: Vec<Team> = std::iter::repeat(Team::Blue)
            .take(team_size)
            .chain(std::iter::repeat(Team::Orange).take(team_size))
            .collect();
        Self::new(&teams, seed)
    }

    pub fn duel(seed: u64) -> Self {
        Self::with_team_size(1, seed)
    }

    /// Team that scored since the last kickoff.
    pub fn scored_by(&self) -> Option<Team> {
        self.scored
    }

    fn tick(&mut self, events: &mut dyn EventSink) {
        let dt = 1.0 / TICK_RATE;
        self.tick_count += 1;

        for ((car, controls), info) in self.cars.iter_mut().zip(&self.controls).zip(&self.agents) {
            let was_demoed = car.is_demoed;
            step_car(car, controls, dt);
            if was_demoed && car.demo_respawn_timer <= 0.0 {
                *car = spawned_car(respawn(info.team));
            }
        }

        if self.scored.is_none() {
            if let Some(team) = step_ball(&mut self.ball, dt) {
                tracing::debug!(?team, tick = self.tick_count, "goal");
                self.scored = Some(team);
            } else {
                self.hit_ball();
            }
        }

        self.collide_cars(events);
        self.update_pads(dt);
    }

    fn hit_ball(&mut self) {
        for car in self.cars.iter_mut().filter(|c| !c.is_demoed) {
            let offset = self.ball.pos - car.pos;
            let dist = offset.length();
            if dist >= BALL_RADIUS + CAR_RADIUS || dist == 0.0 {
                continue;
            }
            let normal = offset / dist;
            let closing = (car.vel - self.ball.vel).dot(normal).max(0.0);
            let extra = normal * (closing * HIT_SCALE).max(HIT_MIN_SPEED);

            self.ball.vel += extra;
            self.ball.pos = car.pos + normal * (BALL_RADIUS + CAR_RADIUS);
            car.ball_hit = BallHitInfo {
                is_valid: true,
                relative_pos_on_ball: car.pos - self.ball.pos,
                ball_pos: self.ball.pos,
                extra_hit_vel: extra,
                tick_count_when_hit: self.tick_count,
            };
        }
    }

    fn collide_cars(&mut self, events: &mut dyn EventSink) {
        let n = self.cars.len();
        for i in 0..n {
            for j in i + 1..n {
                let (a, b) = (&self.cars[i], &self.cars[j]);
                if a.is_demoed || b.is_demoed {
                    continue;
                }
                if a.car_contact.cooldown_timer > 0.0 || b.car_contact.cooldown_timer > 0.0 {
                    continue;
                }
                let offset = b.pos - a.pos;
                let dist = offset.length();
                if dist >= 2.0 * CAR_RADIUS || dist == 0.0 {
                    continue;
                }
                let dir = offset / dist;
                let a_closing = a.vel.dot(dir);
                let b_closing = -b.vel.dot(dir);
                let (bumper, victim, closing, push) = if a_closing >= b_closing {
                    (i, j, a_closing, dir)
                } else {
                    (j, i, b_closing, -dir)
                };
                if closing < BUMP_MIN_SPEED {
                    continue;
                }

                let is_demo = self.cars[bumper].is_supersonic
                    && self.agents[bumper].team != self.agents[victim].team;
                let victim_car = &mut self.cars[victim];
                if is_demo {
                    victim_car.is_demoed = true;
                    victim_car.demo_respawn_timer = DEMO_RESPAWN_SECONDS;
                    victim_car.vel = Vec3::ZERO;
                } else {
                    victim_car.vel += push * closing;
                    victim_car.is_on_ground = false;
                }

                for (me, other) in [(bumper, victim), (victim, bumper)] {
                    self.cars[me].car_contact = CarContact {
                        other_car: Some(self.agents[other].id),
                        cooldown_timer: BUMP_COOLDOWN,
                    };
                }
                events.on_event(GameEvent::Bump {
                    bumper: self.agents[bumper].id,
                    victim: self.agents[victim].id,
                    is_demo,
                });
            }
        }
    }

    fn update_pads(&mut self, dt: f32) {
        for (index, pad) in self.pads.iter_mut().enumerate() {
            if !pad.is_active {
                pad.cooldown = (pad.cooldown - dt).max(0.0);
                pad.is_active = pad.cooldown <= 0.0;
                continue;
            }
            let big = is_big_pad(index);
            let radius = if big { BIG_PAD_RADIUS } else { SMALL_PAD_RADIUS };
            let location = BOOST_LOCATIONS[index];
            let taker = self.cars.iter_mut().find(|car| {
                let (dx, dy) = (car.pos.x - location.x, car.pos.y - location.y);
                !car.is_demoed && car.boost < 100.0 && dx * dx + dy * dy < radius * radius
            });
            if let Some(car) = taker {
                give_boost(car, if big { BIG_PAD_BOOST } else { SMALL_PAD_BOOST });
                pad.is_active = false;
                pad.cooldown = if big { BIG_PAD_COOLDOWN } else { SMALL_PAD_COOLDOWN };
            }
        }
    }
}

fn spawned_car(spawn: Spawn) -> CarState {
    CarState {
        pos: spawn.pos,
        rot_mat: spawn.angle.to_rot_mat(),
        boost: SPAWN_BOOST,
        ..Default::default()
    }
}

impl Arena for SimArena {
    fn tick_count(&self) -> u64 {
        self.tick_count
    }

    fn agents(&self) -> Vec<AgentInfo> {
        self.agents.clone()
    }

    fn num_agents(&self) -> usize {
        self.agents.len()
    }

    fn car_state(&self, index: usize) -> CarState {
        self.cars[index]
    }

    fn set_car_state(&mut self, index: usize, state: CarState) {
        self.cars[index] = state;
    }

    fn set_controls(&mut self, index: usize, controls: CarControls) {
        self.controls[index] = controls;
    }

    fn ball_state(&self) -> BallState {
        self.ball
    }

    fn set_ball_state(&mut self, state: BallState) {
        self.ball = state;
    }

    fn boost_pads(&self) -> Vec<BoostPadState> {
        self.pads.clone()
    }

    fn is_ball_scored(&self) -> bool {
        self.scored.is_some()
    }

    fn step(&mut self, ticks: u32, events: &mut dyn EventSink) {
        for _ in 0..ticks {
            self.tick(events);
        }
    }

    fn update_events(&mut self, events: &mut dyn EventSink) {
        self.tracker
            .update(&self.agents, &self.cars, &self.ball, self.scored, events);
    }

    fn reset_event_tracking(&mut self) {
        self.tracker.reset();
    }

    fn reset_kickoff(&mut self, seed: Option<u64>) {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        let teams: Vec<Team> = self.agents.iter().map(|a| a.team).collect();
        self.cars = kickoff_spawns(&teams, &mut self.rng)
            .into_iter()
            .map(spawned_car)
            .collect();
        self.controls.fill(CarControls::default());
        self.ball = BallState::default();
        self.pads.fill(BoostPadState::default());
        self.scored = None;
        self.tracker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenaset::arena::common_values::{BACK_WALL_Y, CAR_SPAWN_REST_Z};
    use arenaset::math::Angle;

    fn drive(throttle: f32) -> CarControls {
        CarControls {
            throttle,
            ..Default::default()
        }
    }

    #[test]
    fn test_kickoff_layout() {
        let arena = SimArena::with_team_size(2, 1);
        assert_eq!(arena.num_agents(), 4);
        let agents = arena.agents();
        assert_eq!(agents[0].id, AgentId(1));
        assert_eq!(agents[3].team, Team::Orange);
        for (i, info) in agents.iter().enumerate() {
            let car = arena.car_state(i);
            assert_eq!(car.boost, SPAWN_BOOST);
            assert_eq!(car.pos.z, CAR_SPAWN_REST_Z);
            assert_eq!(car.pos.y < 0.0, info.team == Team::Blue);
        }
        assert_eq!(arena.ball_state(), BallState::default());
    }

    #[test]
    fn test_kickoff_seed_is_reproducible() {
        let mut a = SimArena::duel(0);
        let mut b = SimArena::duel(99);
        a.reset_kickoff(Some(5));
        b.reset_kickoff(Some(5));
        assert_eq!(a.car_state(0).pos, b.car_state(0).pos);
    }

    #[test]
    fn test_step_counts_ticks() {
        let mut arena = SimArena::duel(0);
        let mut events = Vec::new();
        arena.step(7, &mut events);
        arena.step(1, &mut events);
        assert_eq!(arena.tick_count(), 8);
    }

    #[test]
    fn test_driving_into_ball_registers_touch() {
        let mut arena = SimArena::duel(0);
        arena.set_car_state(
            0,
            CarState {
                pos: Vec3::new(0.0, -400.0, CAR_SPAWN_REST_Z),
                rot_mat: Angle::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0).to_rot_mat(),
                ..Default::default()
            },
        );
        arena.set_controls(0, drive(1.0));

        let mut events = Vec::new();
        arena.step(120, &mut events);
        let car = arena.car_state(0);
        assert!(car.ball_hit.is_valid);
        assert!(car.ball_hit.tick_count_when_hit > 0);
        assert!(arena.ball_state().vel.y > 0.0);
    }

    #[test]
    fn test_ball_in_goal_scores_and_reports() {
        let mut arena = SimArena::duel(0);
        let mut events = Vec::new();
        arena.set_car_state(
            0,
            CarState {
                pos: Vec3::new(0.0, BACK_WALL_Y - 600.0, CAR_SPAWN_REST_Z),
                ball_hit: BallHitInfo {
                    is_valid: true,
                    tick_count_when_hit: 1,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        arena.set_ball_state(BallState {
            pos: Vec3::new(0.0, BACK_WALL_Y - 300.0, 100.0),
            vel: Vec3::new(0.0, 3000.0, 0.0),
            ..Default::default()
        });

        arena.step(60, &mut events);
        arena.update_events(&mut events);
        assert!(arena.is_ball_scored());
        assert_eq!(arena.scored_by(), Some(Team::Blue));
        assert!(events.contains(&GameEvent::Goal {
            scorer: AgentId(1),
            passer: None,
        }));

        arena.reset_kickoff(None);
        assert!(!arena.is_ball_scored());
    }

    #[test]
    fn test_supersonic_hit_demolishes_opponent() {
        let mut arena = SimArena::duel(0);
        arena.set_car_state(
            0,
            CarState {
                pos: Vec3::new(0.0, 0.0, CAR_SPAWN_REST_Z),
                vel: Vec3::new(2250.0, 0.0, 0.0),
                is_supersonic: true,
                ..Default::default()
            },
        );
        arena.set_car_state(
            1,
            CarState {
                pos: Vec3::new(100.0, 0.0, CAR_SPAWN_REST_Z),
                ..Default::default()
            },
        );
        arena.set_controls(
            0,
            CarControls {
                throttle: 1.0,
                boost: true,
                ..Default::default()
            },
        );
        arena.set_ball_state(BallState {
            pos: Vec3::new(0.0, 3000.0, 93.15),
            ..Default::default()
        });

        let mut events = Vec::new();
        arena.step(1, &mut events);
        assert_eq!(
            events,
            vec![GameEvent::Bump {
                bumper: AgentId(1),
                victim: AgentId(2),
                is_demo: true,
            }]
        );
        assert!(arena.car_state(1).is_demoed);

        // Respawns after the timer
        arena.step((DEMO_RESPAWN_SECONDS * TICK_RATE) as u32 + 1, &mut events);
        assert!(!arena.car_state(1).is_demoed);
    }

    #[test]
    fn test_boost_pad_pickup() {
        let mut arena = SimArena::duel(0);
        let pad = BOOST_LOCATIONS[0];
        arena.set_car_state(
            0,
            CarState {
                pos: Vec3::new(pad.x, pad.y, CAR_SPAWN_REST_Z),
                boost: 50.0,
                ..Default::default()
            },
        );
        let mut events = Vec::new();
        arena.step(1, &mut events);
        assert_eq!(arena.car_state(0).boost, 62.0);
        assert!(!arena.boost_pads()[0].is_active);
    }
}
