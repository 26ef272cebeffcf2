//! Control-plane commands funnelled into the single supervisor task (§5
//! applied one level up: the manager owns all child-process state on one
//! logical scheduler, same as each worker owns its session state).

use modbridge_types::ids::BotId;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug)]
pub enum Command {
    /// `POST /restart-bot/:botId`: tear down and respawn a single child,
    /// resetting its failure counter.
    RestartBot { bot_id: BotId },
    Status { reply: oneshot::Sender<Vec<BotStatusSnapshot>> },
    Health { reply: oneshot::Sender<HealthSnapshot> },
}

#[derive(Debug, Clone, Serialize)]
pub struct BotStatusSnapshot {
    pub bot_id: i64,
    pub status: String,
    pub failure_count: u32,
    pub uptime_secs: u64,
}

/// `GET /health` response (§6).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub active_bots: usize,
    pub failed_bots: usize,
    pub total_bots: usize,
    pub uptime: u64,
    pub memory_usage: u64,
}

/// Cheaply cloneable front for the supervisor's command channel.
#[derive(Clone)]
pub struct ManagerHandle {
    tx: mpsc::Sender<Command>,
}

impl ManagerHandle {
    pub fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    pub async fn restart_bot(&self, bot_id: BotId) {
        let _ = self.tx.send(Command::RestartBot { bot_id }).await;
    }

    pub async fn status(&self) -> Vec<BotStatusSnapshot> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Status { reply }).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    pub async fn health(&self) -> Option<HealthSnapshot> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Health { reply }).await.is_err() {
            return None;
        }
        rx.await.ok()
    }
}
