//! Global configuration loader.
//!
//! Reads `config.toml` from the current directory (overridable via
//! `MODBRIDGE_CONFIG_PATH`) into [`FleetConfig`]. Falls back to defaults when
//! the file is missing or malformed, same as the per-process tunables it
//! wraps (§9: no ambient singletons -- this is constructed once per process
//! and passed down explicitly).

use std::path::Path;

use modbridge_types::config::{ManagerTuning, RefreshThrottleTuning, WorkerTuning};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FleetConfig {
    #[serde(default)]
    pub worker: WorkerTuning,
    #[serde(default)]
    pub manager: ManagerTuning,
    #[serde(default)]
    pub refresh_throttle: RefreshThrottleTuning,
}

/// Database host/port/user/password/name, and the upstream/client
/// credentials the spec's environment-variable table names (§6).
#[derive(Debug, Clone)]
pub struct Environment {
    pub database_url: String,
    pub dataplane_port: u16,
    /// Base URL the worker/manager processes use to reach the data-plane's
    /// own HTTP surface (distinct from `dataplane_port`, which is what the
    /// data-plane binds to).
    pub dataplane_url: String,
    pub manager_health_port: u16,
    pub upstream_ws_url: String,
    pub upstream_auth_url: String,
    pub upstream_admin_url: String,
    pub upstream_client_id: String,
    pub upstream_client_secret: String,
    pub muc_domain: String,
    pub supergroup_domain: String,
    pub verbose: bool,
    /// §9 open question: whether the data-plane HTTP surface requires
    /// authentication is a deployment-time decision. `None` means the
    /// surface is unauthenticated (private-network deployment); `Some`
    /// requires a matching `Authorization: Bearer` header on every request.
    pub dataplane_auth_token: Option<String>,
}

impl Environment {
    /// Load from process environment, applying the spec's documented
    /// defaults for ports.
    pub fn from_env() -> anyhow::Result<Self> {
        use std::env::var;

        Ok(Self {
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|_| crate::sqlite::pool::default_database_url()),
            dataplane_port: var("DATAPLANE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3008),
            dataplane_url: var("DATAPLANE_URL").unwrap_or_else(|_| "http://127.0.0.1:3008".to_string()),
            manager_health_port: var("MANAGER_HEALTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3009),
            upstream_ws_url: var("UPSTREAM_WS_URL")
                .unwrap_or_else(|_| "wss://chat.example.com/ws".to_string()),
            upstream_auth_url: var("UPSTREAM_AUTH_URL")
                .unwrap_or_else(|_| "https://auth.example.com".to_string()),
            upstream_admin_url: var("UPSTREAM_ADMIN_URL")
                .unwrap_or_else(|_| "https://admin.example.com".to_string()),
            upstream_client_id: var("UPSTREAM_CLIENT_ID").unwrap_or_default(),
            upstream_client_secret: var("UPSTREAM_CLIENT_SECRET").unwrap_or_default(),
            muc_domain: var("MUC_DOMAIN").unwrap_or_else(|_| "muclight.example.com".to_string()),
            supergroup_domain: var("SUPERGROUP_DOMAIN")
                .unwrap_or_else(|_| "supergroup.example.com".to_string()),
            verbose: var("VERBOSE").map(|v| v == "1" || v == "true").unwrap_or(false),
            dataplane_auth_token: var("DATAPLANE_AUTH_TOKEN").ok().filter(|v| !v.is_empty()),
        })
    }
}

/// Load [`FleetConfig`] from `{dir}/config.toml`, falling back to defaults on
/// missing file or parse failure.
pub async fn load_fleet_config(dir: &Path) -> FleetConfig {
    let path = dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config.toml found, using defaults");
            return FleetConfig::default();
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "failed to read config.toml, using defaults");
            return FleetConfig::default();
        }
    };

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "failed to parse config.toml, using defaults");
            FleetConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_fleet_config(dir.path()).await;
        assert_eq!(config.worker.queue_tick_ms, 300);
    }

    #[tokio::test]
    async fn valid_toml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("config.toml"), "[worker]\nqueue_tick_ms = 500\n")
            .await
            .unwrap();
        let config = load_fleet_config(dir.path()).await;
        assert_eq!(config.worker.queue_tick_ms, 500);
        assert_eq!(config.worker.circuit_breaker_threshold, 10);
    }

    #[tokio::test]
    async fn invalid_toml_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("config.toml"), "not valid {{{")
            .await
            .unwrap();
        let config = load_fleet_config(dir.path()).await;
        assert_eq!(config.worker.queue_tick_ms, 300);
    }
}
