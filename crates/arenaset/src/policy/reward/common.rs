//! Common per-player rewards.

use super::Reward;
use crate::arena::common_values::{
    BALL_MAX_SPEED, BLUE_GOAL_BACK, BOOST_MAX, CAR_MAX_SPEED, ORANGE_GOAL_BACK,
};
use crate::arena::Team;
use crate::gamestate::{GameState, Player};

/// +1 when the player's team scores, `-concede_scale` when it concedes.
#[derive(Clone, Debug)]
pub struct GoalReward {
    pub concede_scale: f32,
}

impl Default for GoalReward {
    fn default() -> Self {
        Self { concede_scale: 1.0 }
    }
}

impl Reward for GoalReward {
    fn get_reward(&mut self, player: &Player, state: &GameState, _is_final: bool) -> f32 {
        let scorer = state.players.iter().find(|p| p.events.goal);
        match scorer {
            Some(s) if s.team == player.team => 1.0,
            Some(_) => -self.concede_scale,
            None => 0.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TouchBallReward;

impl Reward for TouchBallReward {
    fn get_reward(&mut self, player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        player.ball_touched_step as u8 as f32
    }
}

/// Rewards touches by how hard they hit the ball, in km/h of ball speed change.
#[derive(Clone, Debug)]
pub struct StrongTouchReward {
    pub min_rewarded_kph: f32,
    pub max_rewarded_kph: f32,
}

impl StrongTouchReward {
    pub fn new(min_rewarded_kph: f32, max_rewarded_kph: f32) -> Self {
        Self {
            min_rewarded_kph,
            max_rewarded_kph,
        }
    }
}

impl Reward for StrongTouchReward {
    fn get_reward(&mut self, player: &Player, state: &GameState, _is_final: bool) -> f32 {
        let Some(prev) = &state.prev else { return 0.0 };
        if !player.ball_touched_step {
            return 0.0;
        }
        // uu/s to km/h
        let hit_kph = (state.ball.vel - prev.ball.vel).length() * 0.036;
        if hit_kph < self.min_rewarded_kph {
            0.0
        } else {
            (hit_kph / self.max_rewarded_kph).min(1.0)
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct VelocityPlayerToBallReward;

impl Reward for VelocityPlayerToBallReward {
    fn get_reward(&mut self, player: &Player, state: &GameState, _is_final: bool) -> f32 {
        let dir = (state.ball.pos - player.car.pos).normalized();
        dir.dot(player.car.vel / CAR_MAX_SPEED)
    }
}

#[derive(Clone, Debug, Default)]
pub struct VelocityBallToGoalReward;

impl Reward for VelocityBallToGoalReward {
    fn get_reward(&mut self, player: &Player, state: &GameState, _is_final: bool) -> f32 {
        let target = match player.team {
            Team::Blue => ORANGE_GOAL_BACK,
            Team::Orange => BLUE_GOAL_BACK,
        };
        let dir = (target - state.ball.pos).normalized();
        dir.dot(state.ball.vel / BALL_MAX_SPEED)
    }
}

#[derive(Clone, Debug, Default)]
pub struct FaceBallReward;

impl Reward for FaceBallReward {
    fn get_reward(&mut self, player: &Player, state: &GameState, _is_final: bool) -> f32 {
        let dir = (state.ball.pos - player.car.pos).normalized();
        player.car.rot_mat.forward.dot(dir)
    }
}

#[derive(Clone, Debug, Default)]
pub struct AirReward;

impl Reward for AirReward {
    fn get_reward(&mut self, player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        (!player.car.is_on_ground) as u8 as f32
    }
}

/// Square root of the boost fraction: the first units of boost matter most.
#[derive(Clone, Debug, Default)]
pub struct SaveBoostReward;

impl Reward for SaveBoostReward {
    fn get_reward(&mut self, player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        (player.car.boost / BOOST_MAX).clamp(0.0, 1.0).sqrt()
    }
}

#[derive(Clone, Debug, Default)]
pub struct PickupBoostReward;

impl Reward for PickupBoostReward {
    fn get_reward(&mut self, player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        if player.boost_pickup <= 0.0 {
            return 0.0;
        }
        let now = (player.car.boost / BOOST_MAX).clamp(0.0, 1.0);
        let before = ((player.car.boost - player.boost_pickup) / BOOST_MAX).clamp(0.0, 1.0);
        now.sqrt() - before.sqrt()
    }
}

#[derive(Clone, Debug, Default)]
pub struct BumpReward;

impl Reward for BumpReward {
    fn get_reward(&mut self, player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        player.events.bump as u8 as f32
    }
}

#[derive(Clone, Debug, Default)]
pub struct DemoReward;

impl Reward for DemoReward {
    fn get_reward(&mut self, player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        player.events.demo as u8 as f32
    }
}

/// Fixed value per event flag.
#[derive(Clone, Debug, Default)]
pub struct EventReward {
    pub goal: f32,
    pub assist: f32,
    pub shot: f32,
    pub shot_pass: f32,
    pub save: f32,
    pub bump: f32,
    pub bumped: f32,
    pub demo: f32,
    pub demoed: f32,
    pub touch: f32,
}

impl Reward for EventReward {
    fn get_reward(&mut self, player: &Player, _state: &GameState, _is_final: bool) -> f32 {
        let e = &player.events;
        let flag = |set: bool, value: f32| if set { value } else { 0.0 };
        flag(e.goal, self.goal)
            + flag(e.assist, self.assist)
            + flag(e.shot, self.shot)
            + flag(e.shot_pass, self.shot_pass)
            + flag(e.save, self.save)
            + flag(e.bump, self.bump)
            + flag(e.bumped, self.bumped)
            + flag(e.demo, self.demo)
            + flag(e.demoed, self.demoed)
            + flag(player.ball_touched_step, self.touch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::testing::MockArena;
    use std::sync::Arc;

    fn duel() -> GameState {
        let arena = MockArena::new(&[Team::Blue, Team::Orange]);
        GameState::from_arena(&arena)
    }

    #[test]
    fn test_goal_reward_signs() {
        let mut state = duel();
        state.players[0].events.goal = true;
        let mut reward = GoalReward { concede_scale: 0.5 };
        let blue = reward.get_reward(&state.players[0], &state, true);
        let orange = reward.get_reward(&state.players[1], &state, true);
        assert_eq!(blue, 1.0);
        assert_eq!(orange, -0.5);
    }

    #[test]
    fn test_velocity_to_ball() {
        let mut state = duel();
        state.ball.pos = Vec3::new(0.0, 1000.0, 93.0);
        state.players[0].car.pos = Vec3::new(0.0, 0.0, 17.0);
        state.players[0].car.vel = Vec3::new(0.0, CAR_MAX_SPEED, 0.0);
        let r = VelocityPlayerToBallReward.get_reward(&state.players[0], &state, false);
        assert!(r > 0.99);
    }

    #[test]
    fn test_strong_touch_needs_prev() {
        let mut state = duel();
        state.players[0].ball_touched_step = true;
        state.ball.vel = Vec3::new(0.0, 2000.0, 0.0);
        let mut reward = StrongTouchReward::new(20.0, 100.0);
        assert_eq!(reward.get_reward(&state.players[0], &state, false), 0.0);

        state.prev = Some(Arc::new(duel()));
        // 2000 uu/s is 72 km/h
        let r = reward.get_reward(&state.players[0], &state, false);
        assert!((r - 0.72).abs() < 1e-4);
    }

    #[test]
    fn test_pickup_boost() {
        let mut state = duel();
        state.players[0].car.boost = 100.0;
        state.players[0].boost_pickup = 100.0;
        assert!((PickupBoostReward.get_reward(&state.players[0], &state, false) - 1.0).abs() < 1e-6);
        state.players[0].boost_pickup = 0.0;
        assert_eq!(PickupBoostReward.get_reward(&state.players[0], &state, false), 0.0);
    }

    #[test]
    fn test_event_reward_sums_flags() {
        let mut state = duel();
        state.players[0].events.shot = true;
        state.players[0].events.save = true;
        let mut reward = EventReward {
            shot: 2.0,
            save: 3.0,
            goal: 100.0,
            ..Default::default()
        };
        assert_eq!(reward.get_reward(&state.players[0], &state, false), 5.0);
    }
}
