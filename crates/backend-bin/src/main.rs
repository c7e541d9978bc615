// ============================
// crates/backend-bin/src/main.rs
// ============================
//! Server entry point.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use backend_lib::{
    config::{Settings, DEFAULT_CONFIG_PATH},
    connect_storage, create_router,
    logging::init_tracing,
    mail, spawn_maintenance, AppState,
};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

#[derive(Debug, Parser)]
#[command(name = "saas-server", version, about = "SaaS account server")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Do not apply database migrations on startup
        #[arg(long)]
        skip_migrations: bool,
    },
    /// Apply database migrations and exit
    Migrate,
    /// Delete expired email verification tokens and exit
    CleanupTokens,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    init_tracing(&settings)?;

    tracing::info!(
        environment = settings.environment.as_str(),
        storage = ?settings.storage,
        config = %cli.config.display(),
        "settings loaded"
    );

    match cli.command.unwrap_or(Command::Serve { skip_migrations: false }) {
        Command::Serve { skip_migrations } => serve(settings, !skip_migrations).await,
        Command::Migrate => {
            connect_storage(&settings, true).await?;
            tracing::info!("migrations complete");
            Ok(())
        },
        Command::CleanupTokens => {
            let storage = connect_storage(&settings, false).await?;
            let mailer = mail::from_settings(&settings.smtp)?;
            let state = AppState::new(settings, storage, mailer);
            let removed = state.verifier.cleanup_expired_tokens().await;
            state.storage.close().await;
            tracing::info!(removed, "token cleanup complete");
            Ok(())
        },
    }
}

async fn serve(settings: Settings, run_migrations: bool) -> anyhow::Result<()> {
    let addr = settings.bind_addr;
    let storage = connect_storage(&settings, run_migrations).await?;
    let mailer = mail::from_settings(&settings.smtp)?;
    let state = Arc::new(AppState::new(settings, storage, mailer));

    let storage = state.storage.clone();
    let maintenance = spawn_maintenance(state.clone());
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    maintenance.abort();
    storage.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
