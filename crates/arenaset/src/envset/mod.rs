//! Lockstep orchestration of many arenas.
//!
//! An `EnvSet` owns N arenas, each with its own policy objects, and a
//! single `EnvState` holding the flat buffers a learner reads. A step is
//! split in two halves so that the observation the learner acts on is
//! `action_delay` ticks stale when the new actions apply:
//!
//! ```text
//! step_first_half   prev = state, advance action_delay ticks (old controls)
//! learner           reads obs / action_masks, picks one action per agent
//! step_second_half  apply actions, advance tick_skip - action_delay ticks,
//!                   rebuild snapshot, terminals, rewards, obs, masks
//! reset             reset every arena left terminal
//! ```
//!
//! Every half-step and reset fans out over the arenas on a rayon pool. Each
//! arena writes only its own rows of the flat buffers.

mod config;
mod slot;
mod state;

pub use crate::policy::TerminalType;
pub use config::{EnvSetConfig, RewardSampling};
pub use slot::EnvCreateResult;
pub use state::EnvState;

use crate::gamestate::GameState;
use crate::scenario::{ScenarioProvider, ScenarioState};
use crate::scheduler::{JobScheduler, PendingJob};
use crate::{ArenaSetError, Result};
use slot::ArenaSlot;
use state::ArenaRows;

/// Everything a batch job needs, movable onto the worker pool.
struct EnvSetCore {
    slots: Vec<ArenaSlot>,
    state: EnvState,
    provider: Option<ScenarioProvider>,
}

impl EnvSetCore {
    /// Pair every slot with its rows of the flat buffers.
    fn jobs(&mut self) -> Vec<(&mut ArenaSlot, ArenaRows<'_>)> {
        self.slots.iter_mut().zip(self.state.split_rows_mut()).collect()
    }

    fn reset_all(&mut self, scheduler: &JobScheduler) -> Result<()> {
        let provider = self.provider.as_ref();
        let slots = &mut self.slots;
        let rows = self.state.split_rows_mut();
        let mut jobs: Vec<_> = slots.iter_mut().zip(rows).collect();
        scheduler.for_each_mut(&mut jobs, |_, (slot, rows)| slot.reset(None, provider, rows))
    }

    /// Reset the arenas flagged terminal, then clear every flag.
    fn reset_terminal(&mut self, scheduler: &JobScheduler) -> Result<usize> {
        let provider = self.provider.as_ref();
        let flagged: Vec<bool> = self.state.terminals().iter().map(|t| t.is_terminal()).collect();
        let count = flagged.iter().filter(|&&f| f).count();
        if count > 0 {
            let slots = &mut self.slots;
            let rows = self.state.split_rows_mut();
            let mut jobs: Vec<_> = slots
                .iter_mut()
                .zip(rows)
                .zip(&flagged)
                .filter(|(_, flagged)| **flagged)
                .map(|(job, _)| job)
                .collect();
            scheduler.for_each_mut(&mut jobs, |_, (slot, rows)| slot.reset(None, provider, rows))?;
        }
        self.state.clear_terminals();
        Ok(count)
    }

    fn step_first_half(&mut self, scheduler: &JobScheduler, config: &EnvSetConfig) -> Result<()> {
        let delay = config.action_delay;
        scheduler.for_each_mut(&mut self.slots, |_, slot| {
            slot.step_first_half(delay);
            Ok(())
        })
    }

    fn step_second_half(
        &mut self,
        scheduler: &JobScheduler,
        config: &EnvSetConfig,
        actions: &[usize],
    ) -> Result<()> {
        let starts = self.state.arena_agent_start().to_vec();
        let mut jobs = self.jobs();
        scheduler.for_each_mut(&mut jobs, |i, (slot, rows)| {
            let start = starts[i];
            let arena_actions = &actions[start..start + slot.num_agents()];
            slot.step_second_half(arena_actions, config, rows)
        })
    }
}

enum CoreState {
    Ready(Box<EnvSetCore>),
    Running(PendingJob<(Box<EnvSetCore>, Result<()>)>),
    Poisoned,
}

/// A set of arenas stepped in lockstep.
///
/// # Example
///
/// ```rust,ignore
/// let mut envs = EnvSet::new(EnvSetConfig::new(32), make_env, None)?;
/// envs.step_first_half(true)?;
/// // ... overlap other work with the first half ...
/// envs.sync()?;
/// let actions = policy.act(envs.state()?.obs());
/// envs.step_second_half(&actions, false)?;
/// envs.reset()?;
/// ```
///
/// Async variants return immediately; `sync()` joins the outstanding job.
/// Any other operation joins implicitly first, and reading buffers while a
/// job is in flight is an error (`JobsPending`) rather than a hidden wait.
pub struct EnvSet {
    config: EnvSetConfig,
    scheduler: JobScheduler,
    core: CoreState,
    num_agents: usize,
    obs_size: usize,
    num_actions: usize,
}

impl EnvSet {
    /// Create `config.num_arenas` arenas with `factory` and reset them all.
    ///
    /// Buffer widths come from a default reset of arena 0.
    pub fn new<F>(config: EnvSetConfig, factory: F, provider: Option<ScenarioProvider>) -> Result<Self>
    where
        F: Fn(usize) -> EnvCreateResult + Send + Sync,
    {
        config.validate()?;
        let scheduler = JobScheduler::new(config.num_threads)?;

        let created = scheduler.map_collect(config.num_arenas, |i| Ok(factory(i)))?;
        let mut slots: Vec<ArenaSlot> = created
            .into_iter()
            .enumerate()
            .map(|(i, c)| ArenaSlot::new(i, c, config.seed.wrapping_add(i as u64)))
            .collect();

        let (obs_size, num_actions) = slots[0].measure_sizes()?;
        let agent_counts: Vec<usize> = slots.iter().map(|s| s.num_agents()).collect();
        let reward_entries: Vec<usize> = slots.iter().map(|s| s.num_reward_entries()).collect();
        let state = EnvState::new(&agent_counts, &reward_entries, obs_size, num_actions);
        let num_agents = state.num_agents();

        let mut core = Box::new(EnvSetCore {
            slots,
            state,
            provider,
        });
        core.reset_all(&scheduler)?;

        tracing::info!(
            arenas = config.num_arenas,
            agents = num_agents,
            obs_size,
            num_actions,
            threads = scheduler.num_threads(),
            "environment set ready"
        );

        Ok(Self {
            config,
            scheduler,
            core: CoreState::Ready(core),
            num_agents,
            obs_size,
            num_actions,
        })
    }

    pub fn config(&self) -> &EnvSetConfig {
        &self.config
    }

    pub fn num_arenas(&self) -> usize {
        self.config.num_arenas
    }

    /// Total agents across all arenas.
    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    pub fn obs_size(&self) -> usize {
        self.obs_size
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    /// Whether an async job is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self.core, CoreState::Running(_))
    }

    /// Advance every arena by `action_delay` ticks with its current controls.
    pub fn step_first_half(&mut self, run_async: bool) -> Result<()> {
        let config = self.config.clone();
        self.dispatch(run_async, move |core, scheduler| {
            core.step_first_half(scheduler, &config)
        })
    }

    /// Apply one action index per global agent and finish the step.
    ///
    /// The action list is checked before any arena is touched.
    pub fn step_second_half(&mut self, actions: &[usize], run_async: bool) -> Result<()> {
        if actions.len() != self.num_agents {
            return Err(ArenaSetError::ShapeMismatch {
                what: "action list",
                expected: self.num_agents,
                actual: actions.len(),
            });
        }
        if let Some(i) = actions.iter().position(|&a| a >= self.num_actions) {
            return Err(ArenaSetError::InvalidAction(format!(
                "action {} for agent {} is outside [0, {})",
                actions[i], i, self.num_actions
            )));
        }

        let config = self.config.clone();
        let actions = actions.to_vec();
        self.dispatch(run_async, move |core, scheduler| {
            core.step_second_half(scheduler, &config, &actions)
        })
    }

    /// Wait for the outstanding async job, if any, and report its result.
    pub fn sync(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.core, CoreState::Poisoned) {
            CoreState::Ready(core) => {
                self.core = CoreState::Ready(core);
                Ok(())
            }
            CoreState::Running(job) => {
                let (core, result) = job.join()?;
                self.finish(core, result)
            }
            CoreState::Poisoned => Err(ArenaSetError::Poisoned),
        }
    }

    /// Reset one arena, optionally into an explicit scenario.
    ///
    /// The arena's terminal flag is left as it is.
    pub fn reset_arena(&mut self, index: usize, scenario: Option<&ScenarioState>) -> Result<()> {
        let count = self.num_arenas();
        if index >= count {
            return Err(ArenaSetError::ArenaIndex { index, count });
        }
        self.with_core(|core, _| {
            let provider = core.provider.as_ref();
            let mut rows = core.state.split_rows_mut();
            core.slots[index].reset(scenario, provider, &mut rows[index])
        })
    }

    /// Reset every arena flagged terminal and clear all flags.
    ///
    /// Arenas that are not terminal are not touched. Returns how many
    /// arenas were reset.
    pub fn reset(&mut self) -> Result<usize> {
        let reset = self.with_core(|core, scheduler| core.reset_terminal(scheduler))?;
        if reset > 0 {
            tracing::debug!(arenas = reset, "reset terminal arenas");
        }
        Ok(reset)
    }

    /// Flat buffers. Fails while an async job is in flight.
    pub fn state(&self) -> Result<&EnvState> {
        Ok(&self.core()?.state)
    }

    /// Current snapshot of every arena, in arena order.
    pub fn game_states(&self) -> Result<Vec<&GameState>> {
        Ok(self.core()?.slots.iter().map(|s| s.state()).collect())
    }

    pub fn game_state(&self, index: usize) -> Result<&GameState> {
        let count = self.num_arenas();
        self.core()?
            .slots
            .get(index)
            .map(|s| s.state())
            .ok_or(ArenaSetError::ArenaIndex { index, count })
    }

    /// Scenario applied at each arena's last reset, empty for default resets.
    pub fn scenario_names(&self) -> Result<Vec<String>> {
        Ok(self
            .core()?
            .slots
            .iter()
            .map(|s| s.state().scenario_name.clone())
            .collect())
    }

    fn core(&self) -> Result<&EnvSetCore> {
        match &self.core {
            CoreState::Ready(core) => Ok(core),
            CoreState::Running(_) => Err(ArenaSetError::JobsPending),
            CoreState::Poisoned => Err(ArenaSetError::Poisoned),
        }
    }

    /// Run `f` on the calling thread after joining any outstanding job.
    fn with_core<T>(
        &mut self,
        f: impl FnOnce(&mut EnvSetCore, &JobScheduler) -> Result<T>,
    ) -> Result<T> {
        self.sync()?;
        let CoreState::Ready(core) = &mut self.core else {
            return Err(ArenaSetError::Poisoned);
        };
        let result = f(core, &self.scheduler);
        if let Err(ArenaSetError::JobPanicked(_)) = &result {
            self.core = CoreState::Poisoned;
        }
        result
    }

    fn dispatch<F>(&mut self, run_async: bool, f: F) -> Result<()>
    where
        F: FnOnce(&mut EnvSetCore, &JobScheduler) -> Result<()> + Send + 'static,
    {
        if !run_async {
            return self.with_core(f);
        }

        self.sync()?;
        let mut core = match std::mem::replace(&mut self.core, CoreState::Poisoned) {
            CoreState::Ready(core) => core,
            _ => return Err(ArenaSetError::Poisoned),
        };
        let scheduler = self.scheduler.clone();
        self.core = CoreState::Running(self.scheduler.spawn(move || {
            let result = f(&mut core, &scheduler);
            (core, result)
        }));
        Ok(())
    }

    fn finish(&mut self, core: Box<EnvSetCore>, result: Result<()>) -> Result<()> {
        self.core = match &result {
            Err(ArenaSetError::JobPanicked(_)) => CoreState::Poisoned,
            _ => CoreState::Ready(core),
        };
        result
    }
}

impl Drop for EnvSet {
    fn drop(&mut self) {
        if let CoreState::Running(job) = std::mem::replace(&mut self.core, CoreState::Poisoned) {
            let _ = job.join();
        }
    }
}

impl std::fmt::Debug for EnvSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvSet")
            .field("config", &self.config)
            .field("num_agents", &self.num_agents)
            .field("obs_size", &self.obs_size)
            .field("num_actions", &self.num_actions)
            .field("running", &self.is_running())
            .finish()
    }
}
