//! Per-cycle metrics for a lockstep campaign.

/// Counters and timing collected during a single scheduling cycle.
///
/// [`LockstepCampaign`](crate::LockstepCampaign) fills one of these on
/// every successful [`step()`](crate::LockstepCampaign::step).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleMetrics {
    /// One-based index of the cycle.
    pub cycle: u64,
    /// Cycle time passed to the policy.
    pub now: i64,
    /// Completion reports folded in this cycle.
    pub completions: usize,
    /// Interest-map size before the update.
    pub tasks_before: usize,
    /// Interest-map size after the update.
    pub tasks_after: usize,
    /// Wall-clock time spent in the policy update, in microseconds.
    pub update_us: u64,
}

impl CycleMetrics {
    /// Net change in requested tasks over the cycle.
    pub fn task_delta(&self) -> i64 {
        self.tasks_after as i64 - self.tasks_before as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = CycleMetrics::default();
        assert_eq!(m.cycle, 0);
        assert_eq!(m.completions, 0);
        assert_eq!(m.update_us, 0);
        assert_eq!(m.task_delta(), 0);
    }

    #[test]
    fn delta_can_be_negative() {
        let m = CycleMetrics {
            tasks_before: 7,
            tasks_after: 2,
            ..CycleMetrics::default()
        };
        assert_eq!(m.task_delta(), -5);
    }
}
