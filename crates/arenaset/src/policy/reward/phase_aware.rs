//! Reward that follows the curriculum phase.

use super::{Reward, WeightedSumReward};
use crate::curriculum::{CurriculumCoordinator, CurriculumPhase};
use crate::gamestate::{GameState, Player};
use crate::policy::TerminalType;
use std::sync::Arc;

/// Pays the skill rewards during `Dojo` and the tactical rewards during
/// `Arena`, reading the phase from a shared coordinator on every step.
pub struct PhaseAwareReward {
    coordinator: Arc<CurriculumCoordinator>,
    skill: WeightedSumReward,
    tactical: WeightedSumReward,
}

impl PhaseAwareReward {
    pub fn new(
        coordinator: Arc<CurriculumCoordinator>,
        skill: WeightedSumReward,
        tactical: WeightedSumReward,
    ) -> Self {
        Self {
            coordinator,
            skill,
            tactical,
        }
    }

    fn active(&mut self) -> &mut WeightedSumReward {
        match self.coordinator.phase() {
            CurriculumPhase::Dojo => &mut self.skill,
            CurriculumPhase::Arena => &mut self.tactical,
        }
    }
}

impl Reward for PhaseAwareReward {
    fn reset(&mut self, initial: &GameState) {
        self.skill.reset(initial);
        self.tactical.reset(initial);
    }

    fn pre_step(&mut self, state: &GameState) {
        self.skill.pre_step(state);
        self.tactical.pre_step(state);
    }

    fn get_reward(&mut self, player: &Player, state: &GameState, is_final: bool) -> f32 {
        self.active().get_reward(player, state, is_final)
    }

    fn get_all_rewards(&mut self, state: &GameState, terminal: TerminalType) -> Vec<f32> {
        self.active().get_all_rewards(state, terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Team;
    use crate::curriculum::CurriculumParameters;
    use crate::testing::{ConstReward, MockArena};

    #[test]
    fn test_switches_with_phase() {
        let coordinator = Arc::new(CurriculumCoordinator::new(CurriculumParameters::default()));
        let mut reward = PhaseAwareReward::new(
            coordinator.clone(),
            WeightedSumReward::default().with(ConstReward(1.0), 1.0),
            WeightedSumReward::default().with(ConstReward(5.0), 2.0),
        );
        let arena = MockArena::new(&[Team::Blue, Team::Orange]);
        let state = GameState::from_arena(&arena);

        assert_eq!(
            reward.get_all_rewards(&state, TerminalType::NotTerminal),
            vec![1.0, 1.0]
        );
        coordinator.force_phase(CurriculumPhase::Arena);
        assert_eq!(
            reward.get_all_rewards(&state, TerminalType::NotTerminal),
            vec![10.0, 10.0]
        );
    }
}
