//! Shot, save and goal detection from touch history.

use crate::physics::GRAVITY_Z;
use arenaset::arena::common_values::{BACK_WALL_Y, BALL_RADIUS, GOAL_HALF_WIDTH, GOAL_HEIGHT};
use arenaset::arena::{AgentId, AgentInfo, BallState, CarState, EventSink, GameEvent, Team};

/// Seconds ahead a ball trajectory is followed when judging a shot.
const SHOT_HORIZON: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Touch {
    agent: AgentId,
    team: Team,
}

#[derive(Debug, Default)]
pub struct ShotTracker {
    /// Most recent touch last
    touches: Vec<Touch>,
    last_touch_tick: u64,
    /// Team whose goal the ball is currently flying at after a shot
    threatened: Option<Team>,
    goal_reported: bool,
}

impl ShotTracker {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn update(
        &mut self,
        agents: &[AgentInfo],
        cars: &[CarState],
        ball: &BallState,
        scored: Option<Team>,
        events: &mut dyn EventSink,
    ) {
        let mut new_touches: Vec<(u64, usize)> = cars
            .iter()
            .enumerate()
            .filter(|(_, car)| {
                car.ball_hit.is_valid && car.ball_hit.tick_count_when_hit > self.last_touch_tick
            })
            .map(|(i, car)| (car.ball_hit.tick_count_when_hit, i))
            .collect();
        new_touches.sort_unstable();

        for &(tick, index) in &new_touches {
            let info = agents[index];
            self.last_touch_tick = self.last_touch_tick.max(tick);
            let touch = Touch {
                agent: info.id,
                team: info.team,
            };
            self.on_touch(touch, ball, events);
        }

        if let Some(team) = self.threatened {
            if !heading_into_goal(ball, team) && scored.is_none() {
                self.threatened = None;
            }
        }

        if let Some(team) = scored {
            if !self.goal_reported {
                self.goal_reported = true;
                if let Some((scorer, passer)) = self.credit(team) {
                    events.on_event(GameEvent::Goal { scorer, passer });
                }
            }
        }
    }

    fn on_touch(&mut self, touch: Touch, ball: &BallState, events: &mut dyn EventSink) {
        if self.threatened == Some(touch.team) {
            events.on_event(GameEvent::Save { saver: touch.agent });
            self.threatened = None;
        }

        self.touches.push(touch);
        if self.touches.len() > 2 {
            self.touches.remove(0);
        }

        let defender = touch.team.opponent();
        if self.threatened.is_none() && heading_into_goal(ball, defender) {
            let (shooter, passer) = self.credit(touch.team).unwrap_or((touch.agent, None));
            events.on_event(GameEvent::Shot { shooter, passer });
            self.threatened = Some(defender);
        }
    }

    /// Last toucher of `team`, with the touch before it as passer when a
    /// different teammate made it.
    fn credit(&self, team: Team) -> Option<(AgentId, Option<AgentId>)> {
        let last = self.touches.last().filter(|t| t.team == team)?;
        let passer = self
            .touches
            .iter()
            .rev()
            .nth(1)
            .filter(|t| t.team == team && t.agent != last.agent)
            .map(|t| t.agent);
        Some((last.agent, passer))
    }
}

/// Whether the ball's free-flight path crosses the goal line of `defender`
/// inside the goal mouth within the shot horizon.
pub fn heading_into_goal(ball: &BallState, defender: Team) -> bool {
    // Blue defends -y
    let goal_y = -defender.direction() * BACK_WALL_Y;
    let dy = goal_y - ball.pos.y;
    if ball.vel.y == 0.0 || dy.signum() != ball.vel.y.signum() {
        return false;
    }
    let t = dy / ball.vel.y;
    if t > SHOT_HORIZON {
        return false;
    }
    let x = ball.pos.x + ball.vel.x * t;
    let z = (ball.pos.z + ball.vel.z * t + 0.5 * GRAVITY_Z * t * t).max(BALL_RADIUS);
    x.abs() < GOAL_HALF_WIDTH && z < GOAL_HEIGHT
}
