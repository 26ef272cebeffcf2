//! Ambient tuning knobs shared by worker, manager, and data-plane.
//!
//! These are the timing constants named throughout the design: queue pacing,
//! watchdog thresholds, backoff parameters, reconciliation intervals. They
//! have spec-mandated defaults but are not hardcoded at every call site so a
//! deployment can override them via `config.toml` or environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Worker-side timing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerTuning {
    /// Outgoing-queue ticker period (§4.1.2).
    pub queue_tick_ms: u64,
    /// Authoritative entity-set reconciliation interval (§4.1.4).
    pub reconciliation_interval_secs: u64,
    /// How long a just-unassigned entity id is suppressed (§4.1.4).
    pub recently_unassigned_debounce_secs: u64,
    /// Reception watchdog poll interval (§4.1.6).
    pub reception_watchdog_interval_secs: u64,
    /// Reception watchdog trip threshold: reconnect past this silence.
    pub reception_watchdog_threshold_secs: u64,
    /// Process watchdog poll interval (§4.1.6).
    pub process_watchdog_interval_secs: u64,
    /// Process watchdog trip threshold: exit past this silence.
    pub process_watchdog_threshold_secs: u64,
    /// Memory-cleanup sweep interval.
    pub memory_cleanup_interval_secs: u64,
    /// Initial reconnect delay (§4.1.3).
    pub backoff_initial_ms: u64,
    /// Reconnect delay cap (§4.1.3).
    pub backoff_max_ms: u64,
    /// Circuit breaker trip threshold: consecutive failed reconnects (§4.1.3).
    pub circuit_breaker_threshold: u32,
    /// Startup-retry budget before a clean exit (§7 DataPlaneUnreachable).
    pub startup_retry_budget: u32,
    /// Default read-only mute duration (§4.3 Stage B) -- not present in
    /// per-entity config; §9 Open Question resolved in DESIGN.md.
    pub read_only_mute_secs: u64,
    /// Pre-delay before issuing a delete, to avoid racing the upstream's
    /// message commit (§4.4).
    pub delete_predelay_ms: u64,
    /// Rate limit for reception-watchdog warning logs.
    pub reception_warning_rate_limit_secs: u64,
}

impl Default for WorkerTuning {
    fn default() -> Self {
        Self {
            queue_tick_ms: 300,
            reconciliation_interval_secs: 600,
            recently_unassigned_debounce_secs: 300,
            reception_watchdog_interval_secs: 30,
            reception_watchdog_threshold_secs: 300,
            process_watchdog_interval_secs: 60,
            process_watchdog_threshold_secs: 600,
            memory_cleanup_interval_secs: 3600,
            backoff_initial_ms: 5_000,
            backoff_max_ms: 300_000,
            circuit_breaker_threshold: 10,
            startup_retry_budget: 5,
            read_only_mute_secs: 10,
            delete_predelay_ms: 300,
            reception_warning_rate_limit_secs: 60,
        }
    }
}

impl WorkerTuning {
    pub fn queue_tick(&self) -> Duration {
        Duration::from_millis(self.queue_tick_ms)
    }

    pub fn reconciliation_interval(&self) -> Duration {
        Duration::from_secs(self.reconciliation_interval_secs)
    }

    pub fn recently_unassigned_debounce(&self) -> Duration {
        Duration::from_secs(self.recently_unassigned_debounce_secs)
    }

    pub fn backoff_initial(&self) -> Duration {
        Duration::from_millis(self.backoff_initial_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    pub fn read_only_mute(&self) -> Duration {
        Duration::from_secs(self.read_only_mute_secs)
    }

    pub fn delete_predelay(&self) -> Duration {
        Duration::from_millis(self.delete_predelay_ms)
    }
}

/// Manager-side timing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerTuning {
    pub warmup_secs: u64,
    pub dataplane_poll_interval_secs: u64,
    pub dataplane_poll_budget_secs: u64,
    pub spawn_stagger_secs: u64,
    pub child_startup_timeout_secs: u64,
    pub restart_initial_secs: u64,
    pub restart_max_secs: u64,
    pub recovery_sweep_interval_secs: u64,
    pub recovery_sweep_failure_threshold: u32,
    pub recovery_sweep_age_secs: u64,
    pub shutdown_grace_secs: u64,
}

impl Default for ManagerTuning {
    fn default() -> Self {
        Self {
            warmup_secs: 5,
            dataplane_poll_interval_secs: 30,
            dataplane_poll_budget_secs: 1_800,
            spawn_stagger_secs: 3,
            child_startup_timeout_secs: 60,
            restart_initial_secs: 300,
            restart_max_secs: 3_600,
            recovery_sweep_interval_secs: 1_800,
            recovery_sweep_failure_threshold: 5,
            recovery_sweep_age_secs: 3_600,
            shutdown_grace_secs: 8,
        }
    }
}

impl ManagerTuning {
    pub fn warmup(&self) -> Duration {
        Duration::from_secs(self.warmup_secs)
    }

    pub fn dataplane_poll_interval(&self) -> Duration {
        Duration::from_secs(self.dataplane_poll_interval_secs)
    }

    pub fn dataplane_poll_budget(&self) -> Duration {
        Duration::from_secs(self.dataplane_poll_budget_secs)
    }

    pub fn spawn_stagger(&self) -> Duration {
        Duration::from_secs(self.spawn_stagger_secs)
    }

    pub fn child_startup_timeout(&self) -> Duration {
        Duration::from_secs(self.child_startup_timeout_secs)
    }

    pub fn restart_initial(&self) -> Duration {
        Duration::from_secs(self.restart_initial_secs)
    }

    pub fn restart_max(&self) -> Duration {
        Duration::from_secs(self.restart_max_secs)
    }

    pub fn recovery_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.recovery_sweep_interval_secs)
    }

    pub fn recovery_sweep_age(&self) -> Duration {
        Duration::from_secs(self.recovery_sweep_age_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Data-plane refresh-throttle configuration (§4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshThrottleTuning {
    pub non_forced_min_interval_secs: u64,
    pub forced_min_interval_secs: u64,
}

impl Default for RefreshThrottleTuning {
    fn default() -> Self {
        Self {
            non_forced_min_interval_secs: 1_800,
            forced_min_interval_secs: 60,
        }
    }
}

impl RefreshThrottleTuning {
    pub fn non_forced_min_interval(&self) -> Duration {
        Duration::from_secs(self.non_forced_min_interval_secs)
    }

    pub fn forced_min_interval(&self) -> Duration {
        Duration::from_secs(self.forced_min_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_tuning_defaults_match_spec() {
        let t = WorkerTuning::default();
        assert_eq!(t.queue_tick_ms, 300);
        assert_eq!(t.circuit_breaker_threshold, 10);
        assert_eq!(t.backoff_max(), Duration::from_secs(300));
    }

    #[test]
    fn manager_tuning_defaults_match_spec() {
        let t = ManagerTuning::default();
        assert_eq!(t.restart_initial(), Duration::from_secs(300));
        assert_eq!(t.restart_max(), Duration::from_secs(3_600));
    }

    #[test]
    fn tuning_roundtrips_through_toml() {
        let t = WorkerTuning::default();
        let s = toml::to_string(&t).unwrap();
        let back: WorkerTuning = toml::from_str(&s).unwrap();
        assert_eq!(t, back);
    }
}
