//! Build orchestrator - drives one attempt through the pipeline
//!
//! The workflow is strictly sequential: each remote call and each local
//! work unit completes before the next begins, and control returns to the
//! caller at every suspension point so the session's status and log stream
//! can be observed mid-build.

use crate::models::{BuildStatus, LogLevel};
use crate::report::BuildReport;
use crate::session::BuildSession;
use crate::steps::{SimulatedExecutor, StepExecutor, COMPILE_STEPS, SIGNING_STEP};
use apkforge_common::{AppConfig, GenerationBackend, RemoteError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Console line emitted when a build attempt fails without a usable message.
const FALLBACK_FAILURE_REASON: &str = "Environment timeout";

/// Terminal failure of a build attempt
#[derive(Error, Debug)]
pub enum BuildError {
    /// A remote collaborator call failed; the attempt stopped there.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The caller cancelled the attempt.
    #[error("build cancelled")]
    Cancelled,

    /// A local work unit failed.
    #[error("{step} failed: {reason}")]
    Step { step: String, reason: String },
}

/// Drives build attempts against a session
///
/// Holds the remote backend and the local work-unit executor. Attempts are
/// serialized: a second `start_build` waits until the running one reaches a
/// terminal state.
pub struct BuildOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    executor: Arc<dyn StepExecutor>,
    attempt_lock: Mutex<()>,
}

impl BuildOrchestrator {
    /// Create an orchestrator with the sleep-based executor.
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            executor: Arc::new(SimulatedExecutor),
            attempt_lock: Mutex::new(()),
        }
    }

    /// Replace the work-unit executor.
    pub fn with_executor(mut self, executor: Arc<dyn StepExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Run one build attempt to a terminal state.
    ///
    /// The caller is expected to have checked [`AppConfig::is_buildable`];
    /// the orchestrator does not re-validate. The session is reset first,
    /// so any prior attempt's logs and results are discarded.
    ///
    /// `cancel` is honored before every stage, remote call, and work unit;
    /// a cancelled attempt ends in [`BuildStatus::Cancelled`] and emits no
    /// further log entries.
    pub async fn start_build(
        &self,
        session: &BuildSession,
        config: &AppConfig,
        cancel: &CancellationToken,
    ) -> Result<(), BuildError> {
        let _attempt = self.attempt_lock.lock().await;

        let build_id = session.begin_attempt().await;
        info!("Starting build attempt {}", build_id);

        match self.run_pipeline(session, config, build_id, cancel).await {
            Ok(()) => {
                info!("Build attempt {} completed", build_id);
                Ok(())
            }
            Err(BuildError::Cancelled) => {
                session.transition(BuildStatus::Cancelled).await;
                info!("Build attempt {} cancelled", build_id);
                Err(BuildError::Cancelled)
            }
            Err(err) => {
                let mut reason = err.to_string();
                if reason.is_empty() {
                    reason = FALLBACK_FAILURE_REASON.to_string();
                }

                session
                    .log(LogLevel::Error, format!("CRITICAL BUILD FAILURE: {reason}"))
                    .await;
                session.transition(BuildStatus::Failed).await;

                error!("Build attempt {} failed: {}", build_id, reason);
                Err(err)
            }
        }
    }

    async fn run_pipeline(
        &self,
        session: &BuildSession,
        config: &AppConfig,
        build_id: uuid::Uuid,
        cancel: &CancellationToken,
    ) -> Result<(), BuildError> {
        // Stage 1: site analysis
        ensure_live(cancel)?;
        session.transition(BuildStatus::Analyzing).await;
        session
            .log(LogLevel::Info, "Initializing Android Build Server (AWS-US-EAST-1)...")
            .await;
        session
            .log(LogLevel::Info, format!("Deep analysis of URL target: {}", config.url))
            .await;

        ensure_live(cancel)?;
        let analysis = self.backend.analyze_site(&config.url).await?;
        session.store_analysis(analysis.clone()).await;
        session
            .log(
                LogLevel::Success,
                format!("Analysis complete. Security Score: {}/100.", analysis.security_score),
            )
            .await;
        session
            .log(
                LogLevel::Info,
                format!(
                    "PWA Compatibility: {}.",
                    if analysis.pwa_compatible { "Full" } else { "Limited" }
                ),
            )
            .await;

        // Stage 2: branding assets
        ensure_live(cancel)?;
        session.transition(BuildStatus::GeneratingAssets).await;
        session
            .log(LogLevel::Info, "Building production asset pipeline...")
            .await;

        if config.wants_generated_logo() {
            session
                .log(LogLevel::Info, "Requesting Gemini Vision for high-resolution app icon...")
                .await;

            ensure_live(cancel)?;
            // A backend that produces no image is tolerated; the build
            // simply ships without a generated icon.
            if let Some(asset) = self
                .backend
                .generate_logo(&config.app_name, &config.theme_color)
                .await?
            {
                session.store_logo(asset).await;
                session.log(LogLevel::Success, "AI Assets cached in CDN.").await;
            }
        } else if config.custom_logo_url.is_some() {
            session
                .log(LogLevel::Info, "Validating user-uploaded manifest icon...")
                .await;
            session
                .log(LogLevel::Success, "Optimization: Icon resized for mipmap-xxxhdpi.")
                .await;
        }

        // Stage 3: code synthesis
        ensure_live(cancel)?;
        session.transition(BuildStatus::GeneratingCode).await;
        session
            .log(LogLevel::Info, "Synthesizing native Android Kotlin shell...")
            .await;

        ensure_live(cancel)?;
        let files = self.backend.synthesize_project(config, &analysis).await?;
        session.store_project_files(files).await;
        session
            .log(
                LogLevel::Success,
                format!("Native bridge compiled for {} structure.", analysis.detected_framework),
            )
            .await;

        // Stage 4: simulated compilation
        ensure_live(cancel)?;
        session.transition(BuildStatus::Compiling).await;

        for step in &COMPILE_STEPS {
            ensure_live(cancel)?;
            session.log(LogLevel::Info, step.label).await;
            self.executor.run(step).await?;
        }

        // Stage 5: simulated signing
        ensure_live(cancel)?;
        session.transition(BuildStatus::Signing).await;
        session.log(LogLevel::Warning, SIGNING_STEP.label).await;
        self.executor.run(&SIGNING_STEP).await?;
        session
            .log(LogLevel::Success, "Signing verified. APK is Play Store ready.")
            .await;

        // Stage 6: completion
        ensure_live(cancel)?;
        session.transition(BuildStatus::Completed).await;
        session
            .log(
                LogLevel::Success,
                "NATIVE BUILD SUCCESSFUL: Binary is ready for installation.",
            )
            .await;
        session.store_report(BuildReport::new(config, build_id)).await;

        Ok(())
    }
}

fn ensure_live(cancel: &CancellationToken) -> Result<(), BuildError> {
    if cancel.is_cancelled() {
        Err(BuildError::Cancelled)
    } else {
        Ok(())
    }
}
