//! The manager's single supervising task: owns every spawned child and all
//! restart/recovery bookkeeping (§4.6, mirroring the worker's single-actor
//! session driver one process level up).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use modbridge_infra::http::dataplane_client::DataPlaneClient;
use modbridge_types::config::ManagerTuning;
use modbridge_types::ids::BotId;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::commands::{BotStatusSnapshot, Command, HealthSnapshot};
use crate::process::{self, WorkerProcess};
use crate::state::{BotState, BotStatus};

type ChildExit = (BotId, std::io::Result<std::process::ExitStatus>);

pub struct Supervisor {
    tuning: ManagerTuning,
    dataplane: DataPlaneClient,
    worker_binary: String,
    otel: bool,
    pids: HashMap<BotId, i32>,
    abort_handles: HashMap<BotId, AbortHandle>,
    states: HashMap<BotId, BotState>,
    children: JoinSet<ChildExit>,
    self_tx: mpsc::Sender<Command>,
    shutdown: CancellationToken,
    shutting_down: bool,
    started_at: Instant,
}

impl Supervisor {
    pub fn new(
        tuning: ManagerTuning,
        dataplane: DataPlaneClient,
        worker_binary: String,
        otel: bool,
        self_tx: mpsc::Sender<Command>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            tuning,
            dataplane,
            worker_binary,
            otel,
            pids: HashMap::new(),
            abort_handles: HashMap::new(),
            states: HashMap::new(),
            children: JoinSet::new(),
            self_tx,
            shutdown,
            shutting_down: false,
            started_at: Instant::now(),
        }
    }

    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<Command>) {
        self.startup().await;

        let mut recovery_sweep = tokio::time::interval(self.tuning.recovery_sweep_interval());
        recovery_sweep.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    self.shutdown_all().await;
                    break;
                }

                Some(cmd) = cmd_rx.recv() => {
                    self.handle_command(cmd).await;
                }

                Some(res) = self.children.join_next() => {
                    self.handle_child_exit(res).await;
                }

                _ = recovery_sweep.tick() => {
                    self.run_recovery_sweep().await;
                }
            }
        }
    }

    async fn startup(&mut self) {
        tokio::time::sleep(self.tuning.warmup()).await;

        let deadline = Instant::now() + self.tuning.dataplane_poll_budget();
        let bot_ids = loop {
            match self.dataplane.bots_active().await {
                Ok(ids) => break ids,
                Err(err) if Instant::now() >= deadline => {
                    tracing::error!(%err, "dataplane unreachable past startup budget, starting with no bots");
                    break Vec::new();
                }
                Err(err) => {
                    tracing::warn!(%err, "dataplane unreachable during startup, retrying");
                    tokio::time::sleep(self.tuning.dataplane_poll_interval()).await;
                }
            }
        };

        for bot_id in bot_ids {
            self.spawn_and_track(bot_id).await;
            tokio::time::sleep(self.tuning.spawn_stagger()).await;
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::RestartBot { bot_id } => {
                match self.dataplane.bots_active().await {
                    Ok(active) if active.contains(&bot_id) => {
                        if let Some(pid) = self.pids.remove(&bot_id) {
                            let _ = process::terminate_pid(pid);
                        }
                        if let Some(abort) = self.abort_handles.remove(&bot_id) {
                            abort.abort();
                        }
                        self.states.entry(bot_id).or_insert_with(|| BotState::starting(Instant::now())).reset(Instant::now());
                        self.spawn_and_track(bot_id).await;
                    }
                    Ok(_) => {
                        tracing::warn!(%bot_id, "restart requested but data-plane no longer lists this bot active, skipping");
                    }
                    Err(err) => {
                        tracing::warn!(%bot_id, %err, "restart requested but data-plane unreachable, rescheduling");
                        self.schedule_restart(bot_id, self.tuning.dataplane_poll_interval());
                    }
                }
            }
            Command::Status { reply } => {
                let now = Instant::now();
                let snapshots = self
                    .states
                    .iter()
                    .map(|(bot_id, state)| BotStatusSnapshot {
                        bot_id: bot_id.0,
                        status: format!("{:?}", state.status),
                        failure_count: state.failure_count,
                        uptime_secs: now.duration_since(state.started_at).as_secs(),
                    })
                    .collect();
                let _ = reply.send(snapshots);
            }
            Command::Health { reply } => {
                let total_bots = self.states.len();
                let active_bots = self.states.values().filter(|s| s.status == BotStatus::Running).count();
                let failed_bots = self.states.values().filter(|s| s.status == BotStatus::Backoff).count();
                let snapshot = HealthSnapshot {
                    status: "ok",
                    active_bots,
                    failed_bots,
                    total_bots,
                    uptime: self.started_at.elapsed().as_secs(),
                    memory_usage: process::self_memory_usage_bytes(),
                };
                let _ = reply.send(snapshot);
            }
        }
    }

    async fn handle_child_exit(&mut self, res: Result<ChildExit, tokio::task::JoinError>) {
        let (bot_id, status) = match res {
            Ok(pair) => pair,
            Err(join_err) => {
                tracing::error!(%join_err, "worker wait task panicked");
                return;
            }
        };
        self.pids.remove(&bot_id);
        self.abort_handles.remove(&bot_id);

        if self.shutting_down {
            return;
        }

        tracing::warn!(%bot_id, ?status, "worker process exited unexpectedly, scheduling restart");
        let now = Instant::now();
        let delay = self
            .states
            .entry(bot_id)
            .or_insert_with(|| BotState::starting(now))
            .record_failure(&self.tuning, now);
        self.schedule_restart(bot_id, delay);
    }

    async fn run_recovery_sweep(&mut self) {
        let now = Instant::now();
        let candidates: Vec<BotId> = self
            .states
            .iter()
            .filter(|(_, state)| state.eligible_for_recovery_sweep(&self.tuning, now))
            .map(|(bot_id, _)| *bot_id)
            .collect();

        for bot_id in candidates {
            tracing::info!(%bot_id, "recovery sweep resetting failure counter");
            if let Some(state) = self.states.get_mut(&bot_id) {
                state.reset(now);
            }
            if !self.pids.contains_key(&bot_id) {
                self.spawn_and_track(bot_id).await;
            }
        }
    }

    fn schedule_restart(&self, bot_id: BotId, delay: Duration) {
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Command::RestartBot { bot_id }).await;
        });
    }

    async fn spawn_and_track(&mut self, bot_id: BotId) {
        match self.try_spawn_with_readiness(bot_id).await {
            Ok(()) => {
                self.states
                    .entry(bot_id)
                    .or_insert_with(|| BotState::starting(Instant::now()))
                    .mark_running();
                tracing::info!(%bot_id, "worker ready");
            }
            Err(err) => {
                tracing::error!(%bot_id, %err, "worker failed to become ready, scheduling restart");
                let now = Instant::now();
                let delay = self
                    .states
                    .entry(bot_id)
                    .or_insert_with(|| BotState::starting(now))
                    .record_failure(&self.tuning, now);
                self.schedule_restart(bot_id, delay);
            }
        }
    }

    async fn try_spawn_with_readiness(&mut self, bot_id: BotId) -> anyhow::Result<()> {
        let worker = WorkerProcess::spawn(bot_id, &self.worker_binary, self.otel)?;
        let pid = worker.pid()?;
        self.pids.insert(bot_id, pid);

        let mut child = worker.child;
        let abort = self.children.spawn(async move {
            let status = child.wait().await;
            (bot_id, status)
        });
        self.abort_handles.insert(bot_id, abort);

        if let Err(err) = wait_until_ready(bot_id, self.tuning.child_startup_timeout()).await {
            let _ = process::kill_pid(pid);
            if let Some(abort) = self.abort_handles.remove(&bot_id) {
                abort.abort();
            }
            self.pids.remove(&bot_id);
            return Err(err);
        }

        Ok(())
    }

    async fn shutdown_all(&mut self) {
        self.shutting_down = true;
        tracing::info!("shutting down, terminating {} worker(s)", self.pids.len());

        for pid in self.pids.values() {
            let _ = process::terminate_pid(*pid);
        }

        let grace = tokio::time::sleep(self.tuning.shutdown_grace());
        tokio::pin!(grace);
        loop {
            if self.children.is_empty() {
                break;
            }
            tokio::select! {
                _ = &mut grace => break,
                res = self.children.join_next() => {
                    if res.is_none() {
                        break;
                    }
                }
            }
        }

        for pid in self.pids.values() {
            let _ = process::kill_pid(*pid);
        }
        self.children.shutdown().await;
    }
}

async fn wait_until_ready(bot_id: BotId, timeout: Duration) -> anyhow::Result<()> {
    let port = bot_id
        .worker_port()
        .ok_or_else(|| anyhow::anyhow!("bot {bot_id} has no valid worker control port"))?;
    let url = format!("http://127.0.0.1:{port}/reconnection-state");
    let client = reqwest::Client::new();
    let deadline = Instant::now() + timeout;

    loop {
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return Ok(());
            }
        }
        if Instant::now() >= deadline {
            return Err(anyhow::anyhow!("worker {bot_id} did not become ready within startup timeout"));
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}
