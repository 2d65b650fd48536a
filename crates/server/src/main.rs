use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};

use strengths_api::crypto;
use strengths_llm::{AnthropicClient, CompletionClient};
use strengths_mailer::{EmailSender, ResendClient};
use strengths_server::jobs::{scheduler, weekly_emails};
use strengths_server::{build_router, storage, AppConfig, AppState};

#[derive(Parser)]
#[command(name = "strengths-server", about = "Strengths Manager API server", version)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the API and dashboard (default)
    Serve,
    /// Run one weekly coaching email pass and exit
    SendWeeklyEmails,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strengths_server=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = cli.config;

    if config.jwt_secret.trim().is_empty() {
        warn!("JWT_SECRET not set, generating an ephemeral secret; sessions end on restart");
        config.jwt_secret = crypto::generate_token()?;
    }

    info!("data directory: {}", config.data_dir.display());
    let db = storage::init_db(&config.data_dir)?;
    info!("database initialized");

    let llm = AnthropicClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
        config.anthropic_base_url.clone(),
    )
    .context("building LLM client")?;
    if !llm.is_configured() {
        warn!(
            "ANTHROPIC_API_KEY not set, AI content will use fallback templates \
             and chat is unavailable"
        );
    }

    let mailer = ResendClient::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
        config.resend_base_url.clone(),
    )
    .context("building email client")?;
    if !mailer.is_configured() {
        warn!("RESEND_API_KEY not set, emails will not be sent");
    }

    let state = AppState::new(db, Arc::new(config), Arc::new(llm), Arc::new(mailer));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state).await,
        Command::SendWeeklyEmails => {
            match weekly_emails::process_weekly_emails(&state, Utc::now()).await? {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => warn!("another weekly email pass is running"),
            }
            Ok(())
        }
    }
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let period = scheduler::period_from_hours(state.config.weekly_email_interval_hours);
    let scheduler_handle = match period {
        Some(period) if state.scheduler_enabled() => Some(tokio::spawn(
            scheduler::run_scheduler(state.clone(), period, shutdown_rx),
        )),
        _ => {
            info!("weekly email scheduler disabled");
            None
        }
    };

    let addr = format!("0.0.0.0:{}", state.config.port);
    let app = build_router(state);

    info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    info!("shutdown signal received, stopping...");
    let _ = shutdown_tx.send(true);
    if let Some(handle) = scheduler_handle {
        let _ = handle.await;
    }
    info!("strengths-server stopped");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("received SIGTERM"),
                    _ = sigint.recv() => info!("received SIGINT"),
                }
            }
            _ => {
                warn!("failed to register signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C");
    }
}
