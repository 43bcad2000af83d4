//! A lightweight kinematic arena for arenaset.
//!
//! `SimArena` implements the `Arena` contract well enough to drive an
//! `EnvSet` end to end: cars, ball, boost pads, kickoffs, goals, ball
//! touches, bumps and demolitions, plus shot/save/goal inference. It makes
//! no attempt at physical accuracy.

mod arena;
mod kickoff;
mod physics;
mod tracker;

pub use arena::SimArena;
pub use physics::CAR_RADIUS;
