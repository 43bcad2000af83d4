//! Terminal conditions and per-step terminal resolution.

use crate::gamestate::GameState;
use serde::{Deserialize, Serialize};

/// Terminal status of one arena after a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerminalType {
    #[default]
    NotTerminal = 0,
    /// The episode reached a natural end
    Normal = 1,
    /// The episode was cut off by a limit that does not decide the outcome
    Truncated = 2,
}

impl TerminalType {
    pub fn is_terminal(self) -> bool {
        self != TerminalType::NotTerminal
    }
}

pub trait TerminalCondition: Send {
    fn reset(&mut self, _initial: &GameState) {}

    /// Called exactly once per step.
    fn is_terminal(&mut self, state: &GameState) -> bool;

    /// Queried only after `is_terminal` returned true.
    fn is_truncation(&self) -> bool {
        false
    }
}

/// Evaluate every condition once and combine the outcomes.
///
/// A normal terminal always outranks a truncation, whatever the order in
/// which the conditions report. Conditions may keep state, so none is
/// skipped after the outcome is already known.
pub fn resolve_terminal(
    conditions: &mut [Box<dyn TerminalCondition>],
    state: &GameState,
) -> TerminalType {
    let mut result = TerminalType::NotTerminal;
    for cond in conditions.iter_mut() {
        if !cond.is_terminal(state) {
            continue;
        }
        let current = if cond.is_truncation() {
            TerminalType::Truncated
        } else {
            TerminalType::Normal
        };
        if result == TerminalType::NotTerminal || current == TerminalType::Normal {
            result = current;
        }
    }
    result
}

/// Ends the episode when a goal is scored.
#[derive(Clone, Debug, Default)]
pub struct GoalScoreCondition;

impl TerminalCondition for GoalScoreCondition {
    fn is_terminal(&mut self, state: &GameState) -> bool {
        state.goal_scored
    }
}

/// Truncates the episode when nobody has touched the ball for a while.
#[derive(Clone, Debug)]
pub struct NoTouchCondition {
    pub max_seconds: f32,
    since_touch: f32,
}

impl NoTouchCondition {
    pub fn new(max_seconds: f32) -> Self {
        Self {
            max_seconds,
            since_touch: 0.0,
        }
    }
}

impl TerminalCondition for NoTouchCondition {
    fn reset(&mut self, _initial: &GameState) {
        self.since_touch = 0.0;
    }

    fn is_terminal(&mut self, state: &GameState) -> bool {
        if state.players.iter().any(|p| p.ball_touched_step) {
            self.since_touch = 0.0;
            false
        } else {
            self.since_touch += state.delta_time;
            self.since_touch >= self.max_seconds
        }
    }

    fn is_truncation(&self) -> bool {
        true
    }
}

/// Truncates the episode after a fixed amount of simulated time.
#[derive(Clone, Debug)]
pub struct TimeoutCondition {
    pub max_seconds: f32,
    elapsed: f32,
}

impl TimeoutCondition {
    pub fn new(max_seconds: f32) -> Self {
        Self {
            max_seconds,
            elapsed: 0.0,
        }
    }
}

impl TerminalCondition for TimeoutCondition {
    fn reset(&mut self, _initial: &GameState) {
        self.elapsed = 0.0;
    }

    fn is_terminal(&mut self, state: &GameState) -> bool {
        self.elapsed += state.delta_time;
        self.elapsed >= self.max_seconds
    }

    fn is_truncation(&self) -> bool {
        true
    }
}
