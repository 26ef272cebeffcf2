//! Control-plane commands funnelled into the single session-driver task
//! (§5: all Worker state mutation happens on one logical scheduler).

use modbridge_types::entity::Entity;
use modbridge_types::ids::{EntityGuid, PresetId};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug)]
pub enum Command {
    /// `POST /assign/:entityId`. `entity` is `Some` when the caller supplied
    /// a body; `None` means "fetch it from the data-plane" (used by
    /// reconciliation and by assign calls with no body).
    Assign { guid: EntityGuid, entity: Option<Entity> },
    Unassign { guid: EntityGuid },
    Update { guid: EntityGuid },
    RefreshPreset { preset_id: PresetId },
    ReconnectionState { reply: oneshot::Sender<ReconnectionStateSnapshot> },
    ExitProcess,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconnectionStateSnapshot {
    pub worker_state: String,
    pub attempt_count: u32,
    pub current_delay_ms: u64,
    pub entity_count: usize,
}

/// Cheaply cloneable front for the driver's command channel.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<Command>,
}

impl WorkerHandle {
    pub fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    pub async fn assign(&self, guid: EntityGuid, entity: Option<Entity>) {
        let _ = self.tx.send(Command::Assign { guid, entity }).await;
    }

    pub async fn unassign(&self, guid: EntityGuid) {
        let _ = self.tx.send(Command::Unassign { guid }).await;
    }

    pub async fn update(&self, guid: EntityGuid) {
        let _ = self.tx.send(Command::Update { guid }).await;
    }

    pub async fn refresh_preset(&self, preset_id: PresetId) {
        let _ = self.tx.send(Command::RefreshPreset { preset_id }).await;
    }

    pub async fn exit_process(&self) {
        let _ = self.tx.send(Command::ExitProcess).await;
    }

    pub async fn reconnection_state(&self) -> Option<ReconnectionStateSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::ReconnectionState { reply }).await.ok()?;
        rx.await.ok()
    }
}
