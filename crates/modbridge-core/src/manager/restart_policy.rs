//! Per-bot child-process restart cadence (§4.6, §8 P7).

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct FailureRecord {
    failure_count: u32,
    last_failure: Option<Instant>,
}

impl FailureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn last_failure(&self) -> Option<Instant> {
        self.last_failure
    }

    /// On child exit: bump the counter and compute the restart delay,
    /// `min(initial * 2^(f-1), max)` (§4.6).
    pub fn record_failure(&mut self, now: Instant, initial: Duration, max: Duration) -> Duration {
        self.failure_count += 1;
        self.last_failure = Some(now);
        let multiplier = 1u64.checked_shl(self.failure_count - 1).unwrap_or(u64::MAX);
        let scaled = initial.checked_mul(multiplier as u32).unwrap_or(max);
        std::cmp::min(scaled, max)
    }

    /// Recovery sweep eligibility (§4.6): failure counter at/above threshold
    /// and the last failure old enough.
    pub fn eligible_for_recovery_sweep(&self, now: Instant, failure_threshold: u32, age: Duration) -> bool {
        self.failure_count >= failure_threshold
            && self
                .last_failure
                .is_some_and(|t| now.duration_since(t) >= age)
    }

    pub fn reset(&mut self) {
        self.failure_count = 0;
        self.last_failure = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restart_delay_doubles_and_caps() {
        let mut r = FailureRecord::new();
        let now = Instant::now();
        let initial = Duration::from_secs(300);
        let max = Duration::from_secs(3_600);
        assert_eq!(r.record_failure(now, initial, max), Duration::from_secs(300));
        assert_eq!(r.record_failure(now, initial, max), Duration::from_secs(600));
        assert_eq!(r.record_failure(now, initial, max), Duration::from_secs(1_200));
        assert_eq!(r.record_failure(now, initial, max), Duration::from_secs(2_400));
        // 300 * 2^4 = 4800s, capped to 3600s.
        assert_eq!(r.record_failure(now, initial, max), Duration::from_secs(3_600));
    }

    #[test]
    fn recovery_sweep_requires_both_count_and_age() {
        let mut r = FailureRecord::new();
        let t0 = Instant::now();
        for _ in 0..5 {
            r.record_failure(t0, Duration::from_secs(1), Duration::from_secs(10));
        }
        assert!(!r.eligible_for_recovery_sweep(t0, 5, Duration::from_secs(3_600)));
        let later = t0 + Duration::from_secs(4_000);
        assert!(r.eligible_for_recovery_sweep(later, 5, Duration::from_secs(3_600)));
    }

    #[test]
    fn reset_clears_record() {
        let mut r = FailureRecord::new();
        r.record_failure(Instant::now(), Duration::from_secs(1), Duration::from_secs(10));
        r.reset();
        assert_eq!(r.failure_count(), 0);
        assert!(r.last_failure().is_none());
    }
}
