//! Two-phase training curriculum.
//!
//! Training starts in the `Dojo` phase, where resets draw from a scenario
//! pool and skill rewards apply, and moves to the `Arena` phase for plain
//! match play. A `CurriculumCoordinator` is shared by `Arc` with whoever
//! needs the phase: the scenario provider, `PhaseAwareReward`, and the
//! training loop that feeds it per-step rewards.

use crate::envset::EnvState;
use crate::log::MetricLogger;
use crate::scenario::{Scenario, ScenarioGenerator, ScenarioProvider};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

/// Key under which arenas without a scenario are accumulated.
pub const DEFAULT_SCENARIO_KEY: &str = "Default";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurriculumPhase {
    /// Scenario drills with skill rewards
    #[default]
    Dojo,
    /// Full matches with tactical rewards
    Arena,
}

impl CurriculumPhase {
    fn from_u8(v: u8) -> Self {
        if v == 1 {
            CurriculumPhase::Arena
        } else {
            CurriculumPhase::Dojo
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            CurriculumPhase::Dojo => 0,
            CurriculumPhase::Arena => 1,
        }
    }
}

impl std::fmt::Display for CurriculumPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurriculumPhase::Dojo => write!(f, "Dojo"),
            CurriculumPhase::Arena => write!(f, "Arena"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumParameters {
    pub initial_phase: CurriculumPhase,
    pub auto_switch: bool,
    /// Steps between reward summaries; 0 disables them
    pub log_interval: u32,
    /// Average scenario reward that moves training to the Arena phase
    pub auto_switch_threshold: f64,
    /// Samples a scenario needs before its average counts
    pub auto_switch_min_samples: u64,
}

impl Default for CurriculumParameters {
    fn default() -> Self {
        Self {
            initial_phase: CurriculumPhase::Dojo,
            auto_switch: false,
            log_interval: 512,
            auto_switch_threshold: 120.0,
            auto_switch_min_samples: 256,
        }
    }
}

/// Summary produced every `log_interval` observed steps.
#[derive(Clone, Debug, PartialEq)]
pub struct CurriculumReport {
    /// Mean summed arena reward per scenario name
    pub averages: BTreeMap<String, f64>,
    pub phase: CurriculumPhase,
    /// Best average relative to the auto-switch threshold, capped at 1
    pub auto_switch_progress: Option<f64>,
    pub auto_switch_target: Option<f64>,
}

impl CurriculumReport {
    pub fn to_metrics(&self) -> HashMap<String, f64> {
        let mut metrics: HashMap<String, f64> = self
            .averages
            .iter()
            .map(|(name, avg)| (format!("Reward/{}", name), *avg))
            .collect();
        metrics.insert(
            "Curriculum/Phase".to_string(),
            (self.phase == CurriculumPhase::Arena) as u8 as f64,
        );
        if let (Some(progress), Some(target)) = (self.auto_switch_progress, self.auto_switch_target)
        {
            metrics.insert("Curriculum/AutoSwitchProgress".to_string(), progress);
            metrics.insert("Curriculum/AutoSwitchTarget".to_string(), target);
        }
        metrics
    }

    pub fn log_to(&self, logger: &dyn MetricLogger, step: u64) {
        logger.log_metrics(&self.to_metrics(), step);
    }
}

type PhaseCallback = Arc<dyn Fn(CurriculumPhase) + Send + Sync>;

#[derive(Default)]
struct Accumulators {
    sums: HashMap<String, (f64, u64)>,
    counter: u64,
}

/// Shared curriculum state.
///
/// The phase is read lock-free on every reward evaluation; reward
/// accumulation takes a lock.
pub struct CurriculumCoordinator {
    params: CurriculumParameters,
    phase: AtomicU8,
    accumulators: Mutex<Accumulators>,
    on_phase_change: Mutex<Option<PhaseCallback>>,
}

impl CurriculumCoordinator {
    pub fn new(params: CurriculumParameters) -> Self {
        Self {
            phase: AtomicU8::new(params.initial_phase.as_u8()),
            params,
            accumulators: Mutex::new(Accumulators::default()),
            on_phase_change: Mutex::new(None),
        }
    }

    pub fn params(&self) -> &CurriculumParameters {
        &self.params
    }

    pub fn phase(&self) -> CurriculumPhase {
        CurriculumPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Scenario resets are wanted only in the Dojo phase.
    pub fn use_scenario_curriculum(&self) -> bool {
        self.phase() == CurriculumPhase::Dojo
    }

    pub fn auto_switch_threshold(&self) -> f64 {
        self.params.auto_switch_threshold
    }

    /// Called with the new phase after every phase change.
    pub fn set_phase_change_callback(&self, callback: impl Fn(CurriculumPhase) + Send + Sync + 'static) {
        let mut slot = self.on_phase_change.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(callback));
    }

    pub fn force_phase(&self, phase: CurriculumPhase) {
        let old = self.phase.swap(phase.as_u8(), Ordering::AcqRel);
        if old == phase.as_u8() {
            return;
        }
        tracing::info!(%phase, "curriculum phase changed");
        let callback = self
            .on_phase_change
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(cb) = callback {
            cb(phase);
        }
    }

    pub fn observe_scenario_reward(&self, scenario: &str, reward: f64) {
        let mut acc = self.accumulators.lock().unwrap_or_else(|e| e.into_inner());
        let entry = acc.sums.entry(scenario.to_string()).or_insert((0.0, 0));
        entry.0 += reward;
        entry.1 += 1;
    }

    /// Count one step; on every `log_interval`-th call return the mean
    /// reward per scenario, try the auto switch and start a new window.
    pub fn collect_scenario_averages(&self) -> Option<BTreeMap<String, f64>> {
        if self.params.log_interval == 0 {
            return None;
        }
        let sums = {
            let mut acc = self.accumulators.lock().unwrap_or_else(|e| e.into_inner());
            acc.counter += 1;
            if acc.counter < self.params.log_interval as u64 {
                return None;
            }
            acc.counter = 0;
            std::mem::take(&mut acc.sums)
        };

        let averages = sums
            .iter()
            .filter(|(_, (_, count))| *count > 0)
            .map(|(name, (sum, count))| (name.clone(), sum / *count as f64))
            .collect();
        self.try_auto_switch(&sums);
        Some(averages)
    }

    fn try_auto_switch(&self, sums: &HashMap<String, (f64, u64)>) {
        if !self.params.auto_switch || self.phase() != CurriculumPhase::Dojo {
            return;
        }
        let ready = sums.iter().find(|(_, (sum, count))| {
            *count >= self.params.auto_switch_min_samples
                && *count > 0
                && sum / *count as f64 >= self.params.auto_switch_threshold
        });
        if let Some((name, _)) = ready {
            tracing::info!(scenario = %name, "auto-switch threshold reached");
            self.force_phase(CurriculumPhase::Arena);
        }
    }

    /// Record one step of an `EnvSet`.
    ///
    /// Each arena contributes the sum of its agents' rewards under its
    /// scenario name. Returns a report whenever a log window closes.
    pub fn observe_step(
        &self,
        state: &EnvState,
        scenario_names: &[String],
    ) -> Option<CurriculumReport> {
        for (arena, name) in scenario_names.iter().enumerate() {
            let key = if name.is_empty() {
                DEFAULT_SCENARIO_KEY
            } else {
                name.as_str()
            };
            let total: f64 = state.arena_rewards(arena).iter().map(|&r| r as f64).sum();
            self.observe_scenario_reward(key, total);
        }

        let averages = self.collect_scenario_averages()?;
        let best = averages.values().copied().fold(None, |best: Option<f64>, v| {
            Some(best.map_or(v, |b| b.max(v)))
        });
        let threshold = self.params.auto_switch_threshold;
        let (progress, target) = match best {
            Some(best) if threshold > 0.0 => (Some((best / threshold).min(1.0)), Some(threshold)),
            _ => (None, None),
        };

        Some(CurriculumReport {
            averages,
            phase: self.phase(),
            auto_switch_progress: progress,
            auto_switch_target: target,
        })
    }
}

impl std::fmt::Debug for CurriculumCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurriculumCoordinator")
            .field("params", &self.params)
            .field("phase", &self.phase())
            .finish()
    }
}

/// A provider that draws from `generator` while the curriculum is in the
/// Dojo phase and yields nothing otherwise.
pub fn scenario_provider(
    generator: Arc<ScenarioGenerator>,
    coordinator: Arc<CurriculumCoordinator>,
) -> ScenarioProvider {
    Box::new(move |_arena: usize| -> Option<Scenario> {
        if !coordinator.use_scenario_curriculum() {
            return None;
        }
        generator.generate()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioState;
    use std::sync::atomic::AtomicUsize;

    fn params(log_interval: u32) -> CurriculumParameters {
        CurriculumParameters {
            auto_switch: true,
            log_interval,
            auto_switch_threshold: 10.0,
            auto_switch_min_samples: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_averages_every_interval() {
        let coordinator = CurriculumCoordinator::new(params(2));
        coordinator.observe_scenario_reward("aerial", 1.0);
        assert!(coordinator.collect_scenario_averages().is_none());
        coordinator.observe_scenario_reward("aerial", 3.0);
        let averages = coordinator.collect_scenario_averages().unwrap();
        assert_eq!(averages["aerial"], 2.0);

        // New window
        assert!(coordinator.collect_scenario_averages().is_none());
        assert!(coordinator.collect_scenario_averages().unwrap().is_empty());
    }

    #[test]
    fn test_auto_switch_needs_samples_and_threshold() {
        let coordinator = CurriculumCoordinator::new(params(1));
        let switches = Arc::new(AtomicUsize::new(0));
        let s = switches.clone();
        coordinator.set_phase_change_callback(move |phase| {
            assert_eq!(phase, CurriculumPhase::Arena);
            s.fetch_add(1, Ordering::SeqCst);
        });

        // High average, too few samples
        coordinator.observe_scenario_reward("shot", 50.0);
        coordinator.collect_scenario_averages();
        assert_eq!(coordinator.phase(), CurriculumPhase::Dojo);

        for _ in 0..3 {
            coordinator.observe_scenario_reward("shot", 12.0);
        }
        coordinator.collect_scenario_averages();
        assert_eq!(coordinator.phase(), CurriculumPhase::Arena);
        assert!(!coordinator.use_scenario_curriculum());
        assert_eq!(switches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_auto_switch_when_disabled() {
        let coordinator = CurriculumCoordinator::new(CurriculumParameters {
            auto_switch: false,
            ..params(1)
        });
        for _ in 0..5 {
            coordinator.observe_scenario_reward("shot", 100.0);
        }
        coordinator.collect_scenario_averages();
        assert_eq!(coordinator.phase(), CurriculumPhase::Dojo);
    }

    #[test]
    fn test_force_phase_same_phase_is_silent() {
        let coordinator = CurriculumCoordinator::new(CurriculumParameters::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        coordinator.set_phase_change_callback(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        coordinator.force_phase(CurriculumPhase::Dojo);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        coordinator.force_phase(CurriculumPhase::Arena);
        coordinator.force_phase(CurriculumPhase::Arena);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_report_metrics() {
        let mut averages = BTreeMap::new();
        averages.insert("Default".to_string(), 5.0);
        let report = CurriculumReport {
            averages,
            phase: CurriculumPhase::Arena,
            auto_switch_progress: Some(0.5),
            auto_switch_target: Some(10.0),
        };
        let metrics = report.to_metrics();
        assert_eq!(metrics["Reward/Default"], 5.0);
        assert_eq!(metrics["Curriculum/Phase"], 1.0);
        assert_eq!(metrics["Curriculum/AutoSwitchProgress"], 0.5);
        assert_eq!(metrics["Curriculum/AutoSwitchTarget"], 10.0);
    }

    #[test]
    fn test_provider_follows_phase() {
        let generator = Arc::new(ScenarioGenerator::new(
            vec![Scenario {
                name: "kick".to_string(),
                initial_state: ScenarioState::default(),
            }],
            0,
        ));
        let coordinator = Arc::new(CurriculumCoordinator::new(CurriculumParameters::default()));
        let provider = scenario_provider(generator, coordinator.clone());

        assert_eq!(provider(0).map(|s| s.name), Some("kick".to_string()));
        coordinator.force_phase(CurriculumPhase::Arena);
        assert!(provider(0).is_none());
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: CurriculumParameters =
            serde_json::from_str(r#"{"initial_phase": "arena", "auto_switch": true}"#).unwrap();
        assert_eq!(params.initial_phase, CurriculumPhase::Arena);
        assert!(params.auto_switch);
        assert_eq!(params.log_interval, 512);
    }
}
