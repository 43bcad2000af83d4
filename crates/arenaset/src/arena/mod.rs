//! The arena contract.
//!
//! An arena is one physics instance owned by a single `EnvSet` slot. The
//! simulation itself lives outside this crate; this module only fixes the
//! interface the orchestrator drives:
//! - `Arena` - stepping, per-agent physical state, kickoff reset
//! - `EventSink` / `GameEvent` - discrete events fired while stepping
//! - value types for car, ball and boost pad state

pub mod common_values;
mod state;
mod traits;

pub use state::{
    AgentId, AgentInfo, BallHitInfo, BallState, BoostPadState, CarContact, CarControls,
    CarState, Team,
};
pub use traits::{Arena, EventSink, GameEvent};
