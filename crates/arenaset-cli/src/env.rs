//! Per-arena setup for the training loop.

use arenaset::curriculum::CurriculumCoordinator;
use arenaset::policy::reward::{
    AirReward, BumpReward, DemoReward, FaceBallReward, GoalReward, PhaseAwareReward,
    PickupBoostReward, SaveBoostReward, StrongTouchReward, TacticalDuelReward,
    VelocityBallToGoalReward, VelocityPlayerToBallReward, WeightedSumReward, ZeroSumReward,
};
use arenaset::policy::{
    DefaultObs, GoalScoreCondition, KickoffState, LookupActionParser, NoTouchCondition,
};
use arenaset::prelude::*;
use arenaset_sim::SimArena;
use std::sync::Arc;

/// Seconds without a touch before an episode is truncated
const NO_TOUCH_SECONDS: f32 = 10.0;

/// Metric names of the weighted reward entries, in entry order.
pub const REWARD_NAMES: [&str; 1] = ["PhaseAware"];

/// Mechanics-oriented rewards for scenario drills.
pub fn skill_rewards() -> WeightedSumReward {
    WeightedSumReward::default()
        .with(AirReward, 0.25)
        .with(FaceBallReward, 0.25)
        .with(VelocityPlayerToBallReward, 4.0)
        .with(StrongTouchReward::new(20.0, 100.0), 60.0)
        .with(ZeroSumReward::new(VelocityBallToGoalReward, 1.0, 1.0), 2.0)
        .with(PickupBoostReward, 10.0)
        .with(SaveBoostReward, 0.2)
        .with(ZeroSumReward::new(BumpReward, 0.5, 1.0), 20.0)
        .with(ZeroSumReward::new(DemoReward, 0.5, 1.0), 80.0)
        .with(GoalReward::default(), 150.0)
}

/// Match-oriented rewards.
pub fn tactical_rewards() -> WeightedSumReward {
    WeightedSumReward::default().with(TacticalDuelReward::default(), 1.0)
}

/// Factory for a 1v1 arena whose reward follows `coordinator`.
pub fn env_factory(
    coordinator: Arc<CurriculumCoordinator>,
    seed: u64,
) -> impl Fn(usize) -> EnvCreateResult + Send + Sync {
    move |index| {
        let arena_seed = seed.wrapping_add(index as u64);
        let reward = PhaseAwareReward::new(coordinator.clone(), skill_rewards(), tactical_rewards());
        EnvCreateResult {
            arena: Box::new(SimArena::duel(arena_seed)),
            rewards: vec![WeightedReward::new(reward, 1.0)],
            terminal_conditions: vec![
                Box::new(NoTouchCondition::new(NO_TOUCH_SECONDS)),
                Box::new(GoalScoreCondition),
            ],
            obs_builder: Box::new(DefaultObs),
            action_parser: Box::new(LookupActionParser::new()),
            state_setter: Box::new(KickoffState::new(arena_seed)),
        }
    }
}
