//! Flat, agent-indexed buffers shared by every arena.

use crate::policy::TerminalType;
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Axis};
use std::ops::Range;

/// Buffers read by the learner after every step.
///
/// Rows of `obs`, `action_masks` and `rewards` are global agent indices:
/// arena `a` owns rows `arena_agent_start[a]..arena_agent_start[a] + count`.
/// Sizes are fixed at construction.
#[derive(Clone, Debug)]
pub struct EnvState {
    arena_agent_start: Vec<usize>,
    arena_agent_count: Vec<usize>,
    obs: Array2<f32>,
    action_masks: Array2<u8>,
    rewards: Vec<f32>,
    last_rewards: Vec<Vec<f32>>,
    terminals: Vec<TerminalType>,
}

impl EnvState {
    /// `reward_entries[a]` is the number of weighted rewards arena `a` owns.
    pub(crate) fn new(
        agent_counts: &[usize],
        reward_entries: &[usize],
        obs_size: usize,
        num_actions: usize,
    ) -> Self {
        let arena_agent_start: Vec<usize> = agent_counts
            .iter()
            .scan(0, |acc, &count| {
                let start = *acc;
                *acc += count;
                Some(start)
            })
            .collect();
        let total: usize = agent_counts.iter().sum();

        Self {
            arena_agent_start,
            arena_agent_count: agent_counts.to_vec(),
            obs: Array2::zeros((total, obs_size)),
            action_masks: Array2::zeros((total, num_actions)),
            rewards: vec![0.0; total],
            last_rewards: reward_entries.iter().map(|&n| vec![0.0; n]).collect(),
            terminals: vec![TerminalType::NotTerminal; agent_counts.len()],
        }
    }

    pub fn num_arenas(&self) -> usize {
        self.arena_agent_count.len()
    }

    pub fn num_agents(&self) -> usize {
        self.rewards.len()
    }

    pub fn obs_size(&self) -> usize {
        self.obs.ncols()
    }

    pub fn num_actions(&self) -> usize {
        self.action_masks.ncols()
    }

    /// First global agent index of every arena.
    pub fn arena_agent_start(&self) -> &[usize] {
        &self.arena_agent_start
    }

    pub fn arena_agent_count(&self) -> &[usize] {
        &self.arena_agent_count
    }

    /// Global agent indices owned by `arena`.
    pub fn agent_range(&self, arena: usize) -> Range<usize> {
        let start = self.arena_agent_start[arena];
        start..start + self.arena_agent_count[arena]
    }

    /// Observations, one row per global agent.
    pub fn obs(&self) -> ArrayView2<'_, f32> {
        self.obs.view()
    }

    /// Allowed actions as 0/1, one row per global agent.
    pub fn action_masks(&self) -> ArrayView2<'_, u8> {
        self.action_masks.view()
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    pub fn arena_rewards(&self, arena: usize) -> &[f32] {
        &self.rewards[self.agent_range(arena)]
    }

    /// Unweighted value of each reward entry for the sampled agent.
    /// Only written when `save_rewards` is on.
    pub fn last_rewards(&self, arena: usize) -> &[f32] {
        &self.last_rewards[arena]
    }

    pub fn terminals(&self) -> &[TerminalType] {
        &self.terminals
    }

    pub(crate) fn clear_terminals(&mut self) {
        self.terminals.fill(TerminalType::NotTerminal);
    }

    /// Disjoint mutable views of every arena's rows, in arena order.
    pub(crate) fn split_rows_mut(&mut self) -> Vec<ArenaRows<'_>> {
        let mut obs = self.obs.view_mut();
        let mut masks = self.action_masks.view_mut();
        let mut rewards = self.rewards.as_mut_slice();
        let mut last_rewards = self.last_rewards.iter_mut();
        let mut terminals = self.terminals.iter_mut();

        let mut rows = Vec::with_capacity(self.arena_agent_count.len());
        for &count in &self.arena_agent_count {
            let (arena_obs, rest) = obs.split_at(Axis(0), count);
            obs = rest;
            let (arena_masks, rest) = masks.split_at(Axis(0), count);
            masks = rest;
            let (arena_rewards, rest) = std::mem::take(&mut rewards).split_at_mut(count);
            rewards = rest;

            if let (Some(last), Some(terminal)) = (last_rewards.next(), terminals.next()) {
                rows.push(ArenaRows {
                    obs: arena_obs,
                    masks: arena_masks,
                    rewards: arena_rewards,
                    last_rewards: last,
                    terminal,
                });
            }
        }
        rows
    }
}

/// One arena's share of the flat buffers.
pub(crate) struct ArenaRows<'a> {
    pub obs: ArrayViewMut2<'a, f32>,
    pub masks: ArrayViewMut2<'a, u8>,
    pub rewards: &'a mut [f32],
    pub last_rewards: &'a mut Vec<f32>,
    pub terminal: &'a mut TerminalType,
}
