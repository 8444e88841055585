//! Build runner
//!
//! Loads an app configuration document, runs one build attempt against the
//! Gemini backend, mirrors the build console to the terminal, and writes
//! the artifacts on success.

use anyhow::{Context, Result};
use build_orchestrator::{
    write_artifacts, BuildEvent, BuildOrchestrator, BuildSession, LogLevel,
};
use apkforge_common::ConfigParser;
use gemini_client::GeminiClient;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "build_orchestrator=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Configuration
    let config_file = env::var("CONFIG_FILE").unwrap_or_else(|_| "./app-config.json".to_string());
    let output_dir = env::var("OUTPUT_DIR").unwrap_or_else(|_| "./output".to_string());

    let config = ConfigParser::parse_file(&config_file)
        .with_context(|| format!("Failed to load app configuration from {config_file}"))?;

    info!("Loaded configuration for {} ({})", config.app_name, config.package_name);

    let backend = Arc::new(GeminiClient::from_env().context("Failed to configure Gemini client")?);
    let orchestrator = BuildOrchestrator::new(backend);
    let session = BuildSession::new();
    let cancel = CancellationToken::new();

    // Mirror build console events to the terminal.
    let mut events = session.subscribe();
    let console = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                BuildEvent::StatusChanged { status } => info!("==> {status}"),
                BuildEvent::Log { entry } => match entry.level {
                    LogLevel::Error => error!("[{}] {}", entry.timestamp, entry.message),
                    LogLevel::Warning => warn!("[{}] {}", entry.timestamp, entry.message),
                    _ => info!("[{}] {}", entry.timestamp, entry.message),
                },
            }
        }
    });

    let result = orchestrator.start_build(&session, &config, &cancel).await;
    console.abort();

    match result {
        Ok(()) => {
            let report = session
                .report()
                .await
                .context("Build completed without a report")?;
            let files = session
                .project_files()
                .await
                .context("Build completed without project files")?;

            let output_dir = PathBuf::from(output_dir);
            write_artifacts(&output_dir, &report, &files)?;

            info!("Build report: {}", output_dir.join(report.file_name()).display());
            Ok(())
        }
        Err(err) => {
            error!("Build failed: {err}");
            Err(err.into())
        }
    }
}
