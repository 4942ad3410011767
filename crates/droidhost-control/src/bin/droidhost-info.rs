use anyhow::Context;
use droidhost_control::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let addr = Config::from_env()
        .context("load configuration")?
        .listen_addr();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "droidhost-info HTTP listening");
    axum::serve(listener, droidhost_control::info_router()).await?;

    Ok(())
}
