//! Streaming mean and variance using Welford's algorithm.

/// Incremental sample statistics with O(1) memory per location.
///
/// Numerically stable for long histories, and equal (within rounding) to
/// the two-pass sample standard deviation with an `n - 1` denominator.
///
/// # Example
///
/// ```
/// use survey_policy::RunningStats;
///
/// let mut stats = RunningStats::new();
/// for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     stats.push(x);
/// }
/// assert!((stats.mean() - 5.0).abs() < 1e-12);
/// let sd = stats.sample_std_dev().unwrap();
/// assert!((sd - 2.138_089_935).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    /// Sum of squared deviations from the running mean.
    m2: f64,
}

impl RunningStats {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation.
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Number of observations.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running mean; zero when empty.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance, or `None` with fewer than two observations.
    pub fn sample_variance(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        Some((self.m2 / (self.count - 1) as f64).max(0.0))
    }

    /// Sample standard deviation, or `None` with fewer than two observations.
    pub fn sample_std_dev(&self) -> Option<f64> {
        self.sample_variance().map(f64::sqrt)
    }
}
