//! Supervises one `modbridge-worker` child process per active bot identity
//! (§2, §4.6).
//!
//! Binary name: `modbridge-manager`.

mod commands;
mod control;
mod process;
mod state;
mod supervisor;

use clap::Parser;
use modbridge_infra::config::{Environment, load_fleet_config};
use modbridge_infra::http::dataplane_client::DataPlaneClient;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use supervisor::Supervisor;

#[derive(Parser, Debug)]
#[command(name = "modbridge-manager", about = "Supervises one modbridge-worker child process per active bot identity")]
struct Cli {
    /// Path to the `modbridge-worker` binary to spawn.
    #[arg(long, default_value = "modbridge-worker")]
    worker_binary: String,

    /// Bridge tracing spans to OpenTelemetry (stdout exporter).
    #[arg(long)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    modbridge_observe::tracing_setup::init_tracing("manager", cli.otel)?;

    let env = Environment::from_env()?;
    let fleet_config = load_fleet_config(std::path::Path::new(".")).await;

    let dataplane = DataPlaneClient::new(env.dataplane_url.clone());

    let shutdown = CancellationToken::new();
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let handle = commands::ManagerHandle::new(cmd_tx.clone());

    let supervisor = Supervisor::new(
        fleet_config.manager,
        dataplane,
        cli.worker_binary,
        cli.otel,
        cmd_tx,
        shutdown.clone(),
    );

    let supervisor_task = tokio::spawn(supervisor.run(cmd_rx));

    let addr = format!("127.0.0.1:{}", env.manager_health_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "manager control surface listening");

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_shutdown.cancel();
    });

    let router = control::build_router(handle);
    let server_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .await?;

    let _ = supervisor_task.await;
    modbridge_observe::tracing_setup::shutdown_tracing();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
