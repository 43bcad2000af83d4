//! Per-tick kinematics for cars and the ball.
//!
//! Deliberately coarse: cars drive along their forward vector on the floor,
//! fly ballistically after a jump and never touch walls; the ball bounces
//! off every surface except the goal mouths.

use arenaset::arena::common_values::{
    BACK_WALL_Y, BALL_MAX_SPEED, BALL_RADIUS, BOOST_MAX, CAR_MAX_ANG_VEL, CAR_MAX_SPEED,
    CAR_SPAWN_REST_Z, CEILING_Z, GOAL_HALF_WIDTH, GOAL_HEIGHT, SIDE_WALL_X,
    SUPERSONIC_THRESHOLD,
};
use arenaset::arena::{BallState, CarControls, CarState, Team};
use arenaset::math::{Angle, Vec3};

pub const GRAVITY_Z: f32 = -650.0;

const THROTTLE_ACCEL: f32 = 1600.0;
const BRAKE_ACCEL: f32 = 3500.0;
const COAST_DECEL: f32 = 525.0;
const BOOST_ACCEL: f32 = 991.67;
const BOOST_USE_PER_SEC: f32 = 33.3;
const JUMP_IMPULSE: f32 = 500.0;
const DOUBLE_JUMP_WINDOW: f32 = 1.25;
const TURN_RATE: f32 = 2.6;
const AIR_TURN_RATE: f32 = 4.0;

const BALL_RESTITUTION: f32 = 0.6;
const BALL_DRAG: f32 = 0.03;

/// Car body radius used for ball and car contact
pub const CAR_RADIUS: f32 = 60.0;

/// Advance one car by `dt` seconds under `controls`.
pub fn step_car(car: &mut CarState, controls: &CarControls, dt: f32) {
    if car.is_demoed {
        car.demo_respawn_timer = (car.demo_respawn_timer - dt).max(0.0);
        return;
    }

    let mut angle = Angle::from_rot_mat(car.rot_mat);
    let boosting = controls.boost && car.boost > 0.0;

    if car.is_on_ground {
        let forward = car.rot_mat.forward;
        let mut speed = car.vel.dot(forward);
        let throttle = controls.throttle.clamp(-1.0, 1.0);

        speed += if throttle * speed < 0.0 {
            BRAKE_ACCEL * throttle.signum() * dt
        } else if throttle != 0.0 {
            THROTTLE_ACCEL * throttle * dt
        } else {
            -(COAST_DECEL * dt).min(speed.abs()) * speed.signum()
        };
        if boosting {
            speed += BOOST_ACCEL * dt;
        }
        let speed = speed.clamp(-CAR_MAX_SPEED, CAR_MAX_SPEED);

        let turn = controls.steer.clamp(-1.0, 1.0) * TURN_RATE * (speed.abs() / 500.0).min(1.0);
        angle.yaw += turn * speed.signum() * dt;
        angle.pitch = 0.0;
        angle.roll = 0.0;
        car.ang_vel = Vec3::new(0.0, 0.0, turn);

        car.rot_mat = angle.to_rot_mat();
        car.vel = car.rot_mat.forward * speed;

        if controls.jump && !car.has_jumped {
            car.vel.z += JUMP_IMPULSE;
            car.has_jumped = true;
            car.is_jumping = true;
            car.jump_time = 0.0;
            car.is_on_ground = false;
            car.world_contact = false;
        }
        car.handbrake_val = controls.handbrake as u8 as f32;
    } else {
        car.air_time += dt;
        if car.has_jumped {
            car.air_time_since_jump += dt;
        }
        angle.yaw += controls.yaw.clamp(-1.0, 1.0) * AIR_TURN_RATE * dt;
        angle.pitch += controls.pitch.clamp(-1.0, 1.0) * AIR_TURN_RATE * dt;
        angle.roll += controls.roll.clamp(-1.0, 1.0) * AIR_TURN_RATE * dt;
        car.rot_mat = angle.to_rot_mat();
        car.ang_vel = Vec3::new(controls.roll, controls.pitch, controls.yaw) * AIR_TURN_RATE;

        if controls.jump
            && !car.is_jumping
            && !car.has_double_jumped
            && !car.has_flipped
            && car.air_time_since_jump < DOUBLE_JUMP_WINDOW
        {
            car.vel.z += JUMP_IMPULSE;
            car.has_double_jumped = true;
        }
        car.is_jumping = controls.jump && car.is_jumping;
        car.jump_time += dt;

        car.vel.z += GRAVITY_Z * dt;
        if boosting {
            car.vel += car.rot_mat.forward * (BOOST_ACCEL * dt);
        }
    }

    if boosting {
        car.boost = (car.boost - BOOST_USE_PER_SEC * dt).max(0.0);
        car.time_spent_boosting += dt;
    } else {
        car.time_spent_boosting = 0.0;
    }

    clamp_length(&mut car.vel, CAR_MAX_SPEED);
    clamp_length(&mut car.ang_vel, CAR_MAX_ANG_VEL);
    car.pos += car.vel * dt;
    car.pos.x = car.pos.x.clamp(-SIDE_WALL_X, SIDE_WALL_X);
    car.pos.y = car.pos.y.clamp(-BACK_WALL_Y, BACK_WALL_Y);
    car.pos.z = car.pos.z.min(CEILING_Z);

    if !car.is_on_ground && car.pos.z <= CAR_SPAWN_REST_Z && car.vel.z <= 0.0 {
        land(car);
    }

    let speed = car.vel.length();
    if speed >= SUPERSONIC_THRESHOLD {
        car.is_supersonic = true;
        car.supersonic_time += dt;
    } else {
        car.is_supersonic = false;
        car.supersonic_time = 0.0;
    }
    car.last_controls = *controls;
    car.car_contact.cooldown_timer = (car.car_contact.cooldown_timer - dt).max(0.0);
}

fn land(car: &mut CarState) {
    car.pos.z = CAR_SPAWN_REST_Z;
    car.vel.z = 0.0;
    let yaw = Angle::from_rot_mat(car.rot_mat).yaw;
    car.rot_mat = Angle::new(yaw, 0.0, 0.0).to_rot_mat();
    car.is_on_ground = true;
    car.world_contact = true;
    car.has_jumped = false;
    car.has_double_jumped = false;
    car.has_flipped = false;
    car.is_jumping = false;
    car.jump_time = 0.0;
    car.air_time = 0.0;
    car.air_time_since_jump = 0.0;
}

/// Advance the ball by `dt` seconds. Returns the team that scored, if the
/// ball crossed a goal line during this tick.
pub fn step_ball(ball: &mut BallState, dt: f32) -> Option<Team> {
    ball.vel.z += GRAVITY_Z * dt;
    ball.vel = ball.vel * (1.0 - BALL_DRAG * dt);
    clamp_length(&mut ball.vel, BALL_MAX_SPEED);
    ball.pos += ball.vel * dt;

    if let Some(team) = goal_scored_by(ball.pos) {
        return Some(team);
    }

    bounce(&mut ball.pos.z, &mut ball.vel.z, BALL_RADIUS, CEILING_Z - BALL_RADIUS);
    bounce(
        &mut ball.pos.x,
        &mut ball.vel.x,
        -SIDE_WALL_X + BALL_RADIUS,
        SIDE_WALL_X - BALL_RADIUS,
    );
    if !in_goal_mouth(ball.pos) {
        bounce(
            &mut ball.pos.y,
            &mut ball.vel.y,
            -BACK_WALL_Y + BALL_RADIUS,
            BACK_WALL_Y - BALL_RADIUS,
        );
    }
    None
}

/// Whether the ball is inside a goal, and whose goal it is not.
pub fn goal_scored_by(pos: Vec3) -> Option<Team> {
    if !in_goal_mouth(pos) || pos.y.abs() < BACK_WALL_Y + BALL_RADIUS {
        return None;
    }
    // Blue attacks +y
    Some(if pos.y > 0.0 { Team::Blue } else { Team::Orange })
}

fn in_goal_mouth(pos: Vec3) -> bool {
    pos.x.abs() < GOAL_HALF_WIDTH - BALL_RADIUS && pos.z < GOAL_HEIGHT - BALL_RADIUS
}

fn bounce(pos: &mut f32, vel: &mut f32, min: f32, max: f32) {
    if *pos < min {
        *pos = min;
        *vel = vel.abs() * BALL_RESTITUTION;
    } else if *pos > max {
        *pos = max;
        *vel = -vel.abs() * BALL_RESTITUTION;
    }
}

fn clamp_length(v: &mut Vec3, max: f32) {
    let len = v.length();
    if len > max {
        *v = *v * (max / len);
    }
}

/// Add boost, capped at the maximum.
pub fn give_boost(car: &mut CarState, amount: f32) {
    car.boost = (car.boost + amount).min(BOOST_MAX);
}
