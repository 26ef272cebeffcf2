//! Child-process spawning and POSIX signal delivery for worker processes
//! (§4.6: SIGTERM-then-SIGKILL shutdown, SIGKILL on a stuck startup).

use std::process::Stdio;

use modbridge_types::ids::BotId;
use tokio::process::{Child, Command};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn worker process: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("child has no pid (already reaped)")]
    NoPid,
}

/// A running `modbridge-worker` child, tracked by the bot identity it drives.
pub struct WorkerProcess {
    pub bot_id: BotId,
    pub child: Child,
}

impl WorkerProcess {
    pub fn spawn(bot_id: BotId, worker_binary: &str, otel: bool) -> Result<Self, ProcessError> {
        let mut cmd = Command::new(worker_binary);
        cmd.arg("--bot-id")
            .arg(bot_id.0.to_string())
            .env("BOT_ID", bot_id.0.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if otel {
            cmd.arg("--otel");
        }
        let child = cmd.spawn()?;
        Ok(Self { bot_id, child })
    }

    pub fn pid(&self) -> Result<i32, ProcessError> {
        self.child.id().map(|p| p as i32).ok_or(ProcessError::NoPid)
    }

    /// Send SIGTERM: ask the worker to drain and exit on its own.
    pub fn terminate(&self) -> Result<(), ProcessError> {
        send_signal(self.pid()?, libc::SIGTERM)
    }

    /// Send SIGKILL: used when a worker missed its startup deadline or
    /// ignored SIGTERM past the shutdown grace period (§4.6).
    pub fn kill(&self) -> Result<(), ProcessError> {
        send_signal(self.pid()?, libc::SIGKILL)
    }
}

/// Signal a pid directly, for use once the owning `WorkerProcess` has been
/// handed off to a join task awaiting its exit.
pub fn terminate_pid(pid: i32) -> Result<(), ProcessError> {
    send_signal(pid, libc::SIGTERM)
}

pub fn kill_pid(pid: i32) -> Result<(), ProcessError> {
    send_signal(pid, libc::SIGKILL)
}

/// Resident set size of the manager process itself, for `/health` (§6).
pub fn self_memory_usage_bytes() -> u64 {
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    // SAFETY: `usage` is a valid out-pointer for the duration of this call.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return 0;
    }
    // Linux reports ru_maxrss in KiB.
    (usage.ru_maxrss as u64).saturating_mul(1024)
}

fn send_signal(pid: i32, signal: i32) -> Result<(), ProcessError> {
    // SAFETY: `pid` is a process we spawned and still hold a `Child` handle
    // for, so the pid cannot yet have been recycled by the OS.
    let rc = unsafe { libc::kill(pid, signal) };
    if rc != 0 {
        return Err(ProcessError::Spawn(std::io::Error::last_os_error()));
    }
    Ok(())
}
