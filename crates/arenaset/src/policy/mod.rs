//! Policy objects plugged into every arena.
//!
//! Each arena owns its own instances of:
//! - `Reward` (as an ordered list of `WeightedReward`s)
//! - `TerminalCondition`s
//! - one `ObsBuilder`, one `ActionParser` and one `StateSetter`
//!
//! Instances are never shared between arenas, so implementations may keep
//! per-episode state in `&mut self`.

mod action;
mod obs;
pub mod reward;
mod state_setter;
mod terminal;

pub use action::{ActionParser, LookupActionParser};
pub use obs::{DefaultObs, ObsBuilder};
pub use reward::{Reward, WeightedReward, WeightedSumReward, ZeroSumReward};
pub use state_setter::{KickoffState, RandomState, StateSetter};
pub use terminal::{
    resolve_terminal, GoalScoreCondition, NoTouchCondition, TerminalCondition, TerminalType,
    TimeoutCondition,
};
