//! Data-plane HTTP service entry point (§4.5).
//!
//! Binary name: `modbridge-dataplane`.

mod auth;
mod error;
mod handlers;
mod router;
mod state;

use clap::Parser;
use modbridge_infra::config::{Environment, load_fleet_config};
use modbridge_infra::http::oauth::UpstreamAuthClient;
use modbridge_infra::sqlite::DatabasePool;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "modbridge-dataplane", about = "Bot/entity/preset coordination HTTP service")]
struct Cli {
    /// Override DATAPLANE_PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Bridge tracing spans to OpenTelemetry (stdout exporter).
    #[arg(long)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    modbridge_observe::tracing_setup::init_tracing("dataplane", cli.otel)?;

    let env = Environment::from_env()?;
    let fleet_config = load_fleet_config(std::path::Path::new(".")).await;

    let pool = DatabasePool::new(&env.database_url).await?;
    let auth_client = UpstreamAuthClient::new(
        env.upstream_auth_url.clone(),
        env.upstream_client_id.clone(),
        env.upstream_client_secret.clone(),
    );

    let auth_token = env.dataplane_auth_token.clone();
    let state = AppState::new(pool, auth_client, fleet_config.refresh_throttle);
    let router = router::build_router(state, auth_token);

    let port = cli.port.unwrap_or(env.dataplane_port);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "data-plane listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

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
