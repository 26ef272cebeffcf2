//! Per-bot bookkeeping the supervisor keeps alongside each child process
//! (§4.6: restart backoff, recovery sweep).

use std::time::Instant;

use modbridge_types::config::ManagerTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotStatus {
    Starting,
    Running,
    Backoff,
}

pub struct BotState {
    pub status: BotStatus,
    pub started_at: Instant,
    pub failure_count: u32,
    pub last_failure: Option<Instant>,
}

impl BotState {
    pub fn starting(now: Instant) -> Self {
        Self {
            status: BotStatus::Starting,
            started_at: now,
            failure_count: 0,
            last_failure: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.status = BotStatus::Running;
    }

    /// Record a child exit and compute how long to wait before respawning,
    /// doubling on every consecutive failure up to the configured ceiling.
    pub fn record_failure(&mut self, tuning: &ManagerTuning, now: Instant) -> std::time::Duration {
        self.status = BotStatus::Backoff;
        self.failure_count += 1;
        self.last_failure = Some(now);
        backoff_delay(tuning, self.failure_count)
    }

    /// Reset the failure counter after a sustained clean run, matching the
    /// periodic recovery sweep's reset-and-restart rule.
    pub fn reset(&mut self, now: Instant) {
        self.failure_count = 0;
        self.last_failure = None;
        self.started_at = now;
        self.status = BotStatus::Starting;
    }

    pub fn eligible_for_recovery_sweep(&self, tuning: &ManagerTuning, now: Instant) -> bool {
        let Some(last_failure) = self.last_failure else {
            return false;
        };
        self.failure_count >= tuning.recovery_sweep_failure_threshold
            && now.duration_since(last_failure) >= tuning.recovery_sweep_age()
    }
}

pub fn backoff_delay(tuning: &ManagerTuning, failure_count: u32) -> std::time::Duration {
    let exponent = failure_count.saturating_sub(1).min(16);
    let scaled = tuning.restart_initial_secs.saturating_mul(1u64 << exponent);
    std::time::Duration::from_secs(scaled.min(tuning.restart_max_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        let tuning = ManagerTuning::default();
        assert_eq!(backoff_delay(&tuning, 1), std::time::Duration::from_secs(300));
        assert_eq!(backoff_delay(&tuning, 2), std::time::Duration::from_secs(600));
        assert_eq!(backoff_delay(&tuning, 3), std::time::Duration::from_secs(1_200));
        assert_eq!(backoff_delay(&tuning, 20), std::time::Duration::from_secs(3_600));
    }
}
