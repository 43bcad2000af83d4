//! Scenario pool loaded from CSV, sampled with jitter.

use super::{Scenario, ScenarioState};
use crate::arena::common_values::BOOST_MAX;
use crate::math::Vec3;
use crate::{ArenaSetError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// name + 16 numeric columns
const MIN_FIELDS: usize = 17;

/// Parent directories searched when a relative path does not exist.
const SEARCH_DEPTH: usize = 6;

/// Column fallbacks for unparsable values, indexed by column - 1.
const COLUMN_DEFAULTS: [f32; MIN_FIELDS - 1] = [
    0.0, 0.0, 92.0, // ball pos
    0.0, 0.0, 0.0, // ball vel
    0.0, 0.0, 17.0, // car pos
    0.0, 0.0, 0.0, // car vel
    0.0, 0.0, 0.0, // yaw pitch roll
    100.0, // boost
];

/// Base scenarios from a CSV file.
///
/// Each row is `name, ball_pos(3), ball_vel(3), car_pos(3), car_vel(3),
/// yaw, pitch, roll, boost`. The first line is a header. Empty lines, lines
/// starting with `#` and rows with fewer than 17 fields are skipped.
///
/// `generate` picks a base scenario uniformly and perturbs it, so repeated
/// resets of the same scenario never start from an identical state.
pub struct ScenarioGenerator {
    scenarios: Vec<Scenario>,
    rng: Mutex<StdRng>,
    source: Option<PathBuf>,
}

impl ScenarioGenerator {
    pub fn new(scenarios: Vec<Scenario>, seed: u64) -> Self {
        Self {
            scenarios,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            source: None,
        }
    }

    /// Load from `path`, searching parent directories for relative paths.
    pub fn load(path: impl AsRef<Path>, seed: u64) -> Result<Self> {
        let mut generator = Self::new(Vec::new(), seed);
        generator.reload(path)?;
        Ok(generator)
    }

    pub fn from_reader(reader: impl Read, seed: u64) -> Result<Self> {
        Ok(Self::new(parse_csv(reader)?, seed))
    }

    /// Replace the pool with the contents of `path`.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let requested = path.as_ref();
        let resolved = resolve_path(requested).ok_or_else(|| {
            ArenaSetError::Scenario(format!("could not locate {}", requested.display()))
        })?;
        let file = std::fs::File::open(&resolved)?;
        self.scenarios = parse_csv(file)?;
        if self.scenarios.is_empty() {
            tracing::warn!(path = %resolved.display(), "no valid scenarios loaded");
        } else {
            tracing::info!(
                path = %resolved.display(),
                count = self.scenarios.len(),
                "loaded scenarios"
            );
        }
        self.source = Some(resolved);
        Ok(())
    }

    pub fn has_scenarios(&self) -> bool {
        !self.scenarios.is_empty()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// File the pool was last loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// A jittered copy of a random base scenario, `None` for an empty pool.
    pub fn generate(&self) -> Option<Scenario> {
        if self.scenarios.is_empty() {
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let base = &self.scenarios[rng.gen_range(0..self.scenarios.len())];
        let s = base.initial_state;

        let mut jitter = |value: f32, variance: f32| value + rng.gen_range(-variance..=variance);
        let ball_pos = Vec3::new(
            jitter(s.ball_pos.x, 50.0),
            jitter(s.ball_pos.y, 50.0),
            jitter(s.ball_pos.z, 15.0),
        );
        let ball_vel = Vec3::new(
            jitter(s.ball_vel.x, 200.0),
            jitter(s.ball_vel.y, 200.0),
            jitter(s.ball_vel.z, 200.0),
        );
        let car_pos = Vec3::new(
            jitter(s.car_pos.x, 80.0),
            jitter(s.car_pos.y, 80.0),
            jitter(s.car_pos.z, 30.0).max(0.0),
        );
        let car_vel = Vec3::new(
            jitter(s.car_vel.x, 150.0),
            jitter(s.car_vel.y, 150.0),
            jitter(s.car_vel.z, 120.0),
        );
        let initial_state = ScenarioState {
            ball_pos,
            ball_vel,
            car_pos,
            car_vel,
            car_yaw: jitter(s.car_yaw, 0.25),
            car_pitch: jitter(s.car_pitch, 0.12),
            car_roll: jitter(s.car_roll, 0.12),
            car_boost: jitter(s.car_boost, 6.0).clamp(0.0, BOOST_MAX),
        };

        Some(Scenario {
            name: base.name.clone(),
            initial_state,
        })
    }
}

impl std::fmt::Debug for ScenarioGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioGenerator")
            .field("scenarios", &self.scenarios.len())
            .field("source", &self.source)
            .finish()
    }
}

fn resolve_path(requested: &Path) -> Option<PathBuf> {
    if requested.as_os_str().is_empty() {
        return None;
    }
    if requested.exists() {
        return Some(requested.to_path_buf());
    }
    if requested.is_absolute() {
        return None;
    }
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .take(SEARCH_DEPTH)
        .map(|dir| dir.join(requested))
        .find(|candidate| candidate.exists())
}

fn parse_csv(reader: impl Read) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    // Skip header
    for line in BufReader::new(reader).lines().skip(1) {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < MIN_FIELDS {
            tracing::debug!(fields = fields.len(), "skipping short scenario row");
            continue;
        }

        let mut values = COLUMN_DEFAULTS;
        for (value, field) in values.iter_mut().zip(&fields[1..MIN_FIELDS]) {
            if let Ok(parsed) = field.parse::<f32>() {
                *value = parsed;
            }
        }
        let v = |i: usize| Vec3::new(values[i], values[i + 1], values[i + 2]);

        scenarios.push(Scenario {
            name: fields[0].to_string(),
            initial_state: ScenarioState {
                ball_pos: v(0),
                ball_vel: v(3),
                car_pos: v(6),
                car_vel: v(9),
                car_yaw: values[12],
                car_pitch: values[13],
                car_roll: values[14],
                car_boost: values[15].clamp(0.0, BOOST_MAX),
            },
        });
    }
    Ok(scenarios)
}
