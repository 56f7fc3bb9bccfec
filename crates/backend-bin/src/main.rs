// ============================
// contacts-backend-bin/src/main.rs
// ============================
//! Tokio / Axum entry-point for the contacts server.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use backend_lib::{config::Settings, router::create_router, AppState};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "contacts-server", about = "Contacts API server")]
struct Args {
    /// TOML configuration file (defaults to ./contacts.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen address
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load_from(args.config.as_deref()).context("loading settings")?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = settings.bind_addr;
    let sweep_every = settings.rate_limit.sweep_interval();
    let state = AppState::from_settings(settings).context("building application state")?;
    let _sweeper = state.rate_limiter.clone().spawn_sweeper(sweep_every);

    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
