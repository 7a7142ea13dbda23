//! Randomly placed tasks, redrawn every cycle.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use survey_core::{CampaignId, InterestMap, Location, PolicyError, TaskData};
use survey_policy::CampaignPolicy;
use tracing::debug;

/// Where and how many tasks [`ScatterPolicy`] draws.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterConfig {
    /// South-west corner of the square, as `[latitude, longitude]`.
    pub corner: [f64; 2],
    /// Side length of the square, in degrees.
    pub spread: f64,
    /// Tasks drawn per cycle.
    pub count: usize,
    /// Base seed. Each cycle draws from `seed ^ now`.
    pub seed: u64,
}

/// Replaces its interest map every cycle with `count` tasks placed
/// uniformly at random inside a square.
///
/// Draws are reproducible: the same config and cycle time always yield
/// the same tasks. Every task carries unit interest and a 10 s duration,
/// with no request time. Completions are ignored.
#[derive(Debug)]
pub struct ScatterPolicy {
    id: CampaignId,
    config: ScatterConfig,
    interest_map: InterestMap,
}

impl ScatterPolicy {
    /// Per-task duration of scattered tasks, in seconds.
    pub const TASK_DURATION_SECS: f64 = 10.0;

    /// Create a policy holding the draw for time 0.
    pub fn new(id: CampaignId, config: ScatterConfig) -> Self {
        let mut policy = Self {
            id,
            config,
            interest_map: InterestMap::new(),
        };
        policy.interest_map = policy.draw(0);
        policy
    }

    fn draw(&self, now: i64) -> InterestMap {
        let ScatterConfig {
            corner,
            spread,
            count,
            seed,
        } = self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ now as u64);
        (0..count)
            .map(|_| {
                let lat = corner[0] + rng.random::<f64>() * spread;
                let lon = corner[1] + rng.random::<f64>() * spread;
                let data = TaskData::new(self.id, Location::new(lat, lon))
                    .with_duration(Self::TASK_DURATION_SECS);
                (data.task(), data)
            })
            .collect()
    }
}

impl CampaignPolicy for ScatterPolicy {
    fn id(&self) -> CampaignId {
        self.id
    }

    fn name(&self) -> &str {
        "scatter"
    }

    fn interest_map(&self) -> &InterestMap {
        &self.interest_map
    }

    fn update(&mut self, _completed: &[TaskData], now: i64) -> Result<(), PolicyError> {
        self.interest_map = self.draw(now);
        debug!(campaign = %self.id, now, tasks = self.interest_map.len(), "scattered tasks");
        Ok(())
    }
}
