use std::sync::Arc;

use anyhow::Context;
use droidhost_control::config::Config;
use droidhost_control::state::AppState;
use droidhost_runtime::{ContainerRuntime, TokioProcessRunner};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().context("load configuration")?;
    let runtime = ContainerRuntime::new(config.runtime_bin.clone(), Arc::new(TokioProcessRunner));
    let addr = config.listen_addr();
    tracing::info!(
        runtime = %config.runtime_bin,
        container = %config.container_name,
        image = %config.image,
        display_url = %config.display_url(),
        public_dir = %config.public_dir.display(),
        "droidhost-control configured"
    );

    let app = droidhost_control::router(AppState::new(config, runtime));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "droidhost-control HTTP listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
