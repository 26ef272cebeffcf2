//! One process per active bot identity: XMPP session, moderation pipeline,
//! loopback control surface (§2, §4.1, §6).
//!
//! Binary name: `modbridge-worker`.

mod control;
mod session;

use clap::Parser;
use modbridge_infra::config::{Environment, load_fleet_config};
use modbridge_infra::http::admin_api::AdminApiClient;
use modbridge_infra::http::dataplane_client::DataPlaneClient;
use modbridge_infra::http::discord_webhook::DiscordWebhookClient;
use modbridge_infra::http::oauth::UpstreamAuthClient;
use modbridge_types::ids::BotId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use session::driver::Driver;

#[derive(Parser, Debug)]
#[command(name = "modbridge-worker", about = "One XMPP session + moderation pipeline per active bot identity")]
struct Cli {
    /// Bot identity this process drives. Falls back to the `BOT_ID`
    /// environment variable so the manager can spawn children without
    /// shelling out extra flags.
    #[arg(long)]
    bot_id: Option<i64>,

    /// Bridge tracing spans to OpenTelemetry (stdout exporter).
    #[arg(long)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    modbridge_observe::tracing_setup::init_tracing("worker", cli.otel)?;

    let bot_id = cli
        .bot_id
        .or_else(|| std::env::var("BOT_ID").ok().and_then(|v| v.parse().ok()))
        .ok_or_else(|| anyhow::anyhow!("bot id not supplied via --bot-id or BOT_ID"))?;
    let bot_id = BotId(bot_id);

    let env = Environment::from_env()?;
    let fleet_config = load_fleet_config(std::path::Path::new(".")).await;

    let dataplane = DataPlaneClient::new(env.dataplane_url.clone());
    let auth = UpstreamAuthClient::new(
        env.upstream_auth_url.clone(),
        env.upstream_client_id.clone(),
        env.upstream_client_secret.clone(),
    );
    let admin = AdminApiClient::new(env.upstream_admin_url.clone());
    let webhook = DiscordWebhookClient::new();

    let shutdown = CancellationToken::new();
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let handle = session::commands::WorkerHandle::new(cmd_tx);

    let driver = Driver::new(
        bot_id,
        env.upstream_ws_url.clone(),
        env.muc_domain.clone(),
        env.supergroup_domain.clone(),
        fleet_config.worker,
        dataplane,
        auth,
        admin,
        webhook,
        shutdown.clone(),
    );

    let driver_task = tokio::spawn(driver.run(cmd_rx));

    let port = bot_id
        .worker_port()
        .ok_or_else(|| anyhow::anyhow!("bot id {bot_id} has no valid worker control port"))?;
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %bot_id, "worker control surface listening");

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

    let _ = driver_task.await;
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
