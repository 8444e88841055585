//! End-to-end tests for the build pipeline

use apkforge_common::{
    AnalysisResult, AppConfig, GenerationBackend, ImageAsset, ProjectFiles, RemoteError,
};
use async_trait::async_trait;
use build_orchestrator::{
    BuildError, BuildEvent, BuildOrchestrator, BuildSession, BuildStatus, BuildStep, LogLevel,
    StepExecutor,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Backend with scripted results and per-call failure injection.
#[derive(Default)]
struct ScriptedBackend {
    fail_analyze: Option<String>,
    fail_logo: Option<String>,
    fail_synthesize: Option<String>,
    /// Return no image from logo generation.
    no_logo: bool,
    /// Cancel this token from inside the analysis call.
    cancel_during_analyze: Option<CancellationToken>,
    logo_calls: AtomicUsize,
}

fn sample_analysis() -> AnalysisResult {
    AnalysisResult {
        is_responsive: true,
        detected_framework: "React".to_string(),
        pwa_compatible: true,
        security_score: 82,
        suggested_permissions: vec!["CAMERA".to_string()],
        optimization_tips: vec!["Enable HTTP caching".to_string()],
    }
}

fn sample_files() -> ProjectFiles {
    ProjectFiles {
        main_activity: "class MainActivity : AppCompatActivity()".to_string(),
        manifest: "<manifest package=\"com.shop.app\"/>".to_string(),
        build_gradle: "plugins { id(\"com.android.application\") }".to_string(),
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn analyze_site(&self, _url: &str) -> Result<AnalysisResult, RemoteError> {
        if let Some(reason) = &self.fail_analyze {
            return Err(RemoteError::Request(reason.clone()));
        }
        if let Some(token) = &self.cancel_during_analyze {
            token.cancel();
        }
        Ok(sample_analysis())
    }

    async fn generate_logo(
        &self,
        _app_name: &str,
        _theme_color: &str,
    ) -> Result<Option<ImageAsset>, RemoteError> {
        self.logo_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.fail_logo {
            return Err(RemoteError::Request(reason.clone()));
        }
        if self.no_logo {
            return Ok(None);
        }
        Ok(Some(ImageAsset::new("image/png", vec![0x89, 0x50])))
    }

    async fn synthesize_project(
        &self,
        _config: &AppConfig,
        _analysis: &AnalysisResult,
    ) -> Result<ProjectFiles, RemoteError> {
        if let Some(reason) = &self.fail_synthesize {
            return Err(RemoteError::Request(reason.clone()));
        }
        Ok(sample_files())
    }
}

/// Executor that completes every work unit immediately.
struct InstantExecutor;

#[async_trait]
impl StepExecutor for InstantExecutor {
    async fn run(&self, _step: &BuildStep) -> Result<(), BuildError> {
        Ok(())
    }
}

/// Executor that fails on one specific work unit.
struct FailingExecutor {
    fail_label: &'static str,
}

#[async_trait]
impl StepExecutor for FailingExecutor {
    async fn run(&self, step: &BuildStep) -> Result<(), BuildError> {
        if step.label == self.fail_label {
            return Err(BuildError::Step {
                step: step.label.to_string(),
                reason: "worker crashed".to_string(),
            });
        }
        Ok(())
    }
}

fn shop_config() -> AppConfig {
    AppConfig {
        url: "https://shop.example.com".to_string(),
        app_name: "Shop".to_string(),
        package_name: "com.shop.app".to_string(),
        generate_logo_with_ai: true,
        ..AppConfig::default()
    }
}

fn orchestrator(backend: ScriptedBackend) -> BuildOrchestrator {
    BuildOrchestrator::new(Arc::new(backend)).with_executor(Arc::new(InstantExecutor))
}

/// Drain every buffered event and split into (statuses, log messages).
fn drain_events(rx: &mut broadcast::Receiver<BuildEvent>) -> (Vec<BuildStatus>, Vec<String>) {
    let mut statuses = Vec::new();
    let mut messages = Vec::new();

    while let Ok(event) = rx.try_recv() {
        match event {
            BuildEvent::StatusChanged { status } => statuses.push(status),
            BuildEvent::Log { entry } => messages.push(entry.message),
        }
    }

    (statuses, messages)
}

#[tokio::test]
async fn success_visits_stages_in_exact_order() {
    let orchestrator = orchestrator(ScriptedBackend::default());
    let session = BuildSession::new();
    let mut events = session.subscribe();

    orchestrator
        .start_build(&session, &shop_config(), &CancellationToken::new())
        .await
        .unwrap();

    let (statuses, _) = drain_events(&mut events);
    assert_eq!(
        statuses,
        vec![
            BuildStatus::Analyzing,
            BuildStatus::GeneratingAssets,
            BuildStatus::GeneratingCode,
            BuildStatus::Compiling,
            BuildStatus::Signing,
            BuildStatus::Completed,
        ]
    );
}

#[tokio::test]
async fn end_to_end_success_scenario() {
    let orchestrator = orchestrator(ScriptedBackend::default());
    let session = BuildSession::new();

    orchestrator
        .start_build(&session, &shop_config(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(session.status().await, BuildStatus::Completed);

    let logs = session.logs().await;
    assert!(logs.len() >= 10, "expected >= 10 logs, got {}", logs.len());
    assert!(logs
        .iter()
        .any(|l| l.message.contains("Security Score: 82/100")));
    assert!(logs
        .iter()
        .any(|l| l.message.contains("Native bridge compiled for React structure.")));

    assert!(session.report().await.is_some());
    assert!(session.project_files().await.is_some());
    assert!(session.logo().await.is_some());
    assert!(session.analysis().await.is_some());
}

#[tokio::test]
async fn analysis_failure_stops_the_pipeline() {
    let orchestrator = orchestrator(ScriptedBackend {
        fail_analyze: Some("dns lookup failed".to_string()),
        ..ScriptedBackend::default()
    });
    let session = BuildSession::new();
    let mut events = session.subscribe();

    let result = orchestrator
        .start_build(&session, &shop_config(), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(BuildError::Remote(_))));
    assert_eq!(session.status().await, BuildStatus::Failed);

    let (statuses, messages) = drain_events(&mut events);
    assert_eq!(statuses, vec![BuildStatus::Analyzing, BuildStatus::Failed]);
    // Nothing from later stages may appear after the failure.
    assert!(!messages.iter().any(|m| m.contains("asset pipeline")));
    assert!(!messages.iter().any(|m| m.contains("Gradle")));

    let logs = session.logs().await;
    let last = logs.last().unwrap();
    assert_eq!(last.level, LogLevel::Error);
    assert!(last.message.contains("dns lookup failed"));
}

#[tokio::test]
async fn logo_generation_failure_stops_the_pipeline() {
    let orchestrator = orchestrator(ScriptedBackend {
        fail_logo: Some("image service unavailable".to_string()),
        ..ScriptedBackend::default()
    });
    let session = BuildSession::new();
    let mut events = session.subscribe();

    let result = orchestrator
        .start_build(&session, &shop_config(), &CancellationToken::new())
        .await;

    assert!(result.is_err());
    assert_eq!(session.status().await, BuildStatus::Failed);

    let (statuses, messages) = drain_events(&mut events);
    assert_eq!(
        statuses,
        vec![
            BuildStatus::Analyzing,
            BuildStatus::GeneratingAssets,
            BuildStatus::Failed
        ]
    );
    assert!(!messages.iter().any(|m| m.contains("Kotlin shell")));
}

#[tokio::test]
async fn synthesis_quota_failure_leaves_no_project_files() {
    let orchestrator = orchestrator(ScriptedBackend {
        fail_synthesize: Some("quota exceeded".to_string()),
        ..ScriptedBackend::default()
    });
    let session = BuildSession::new();

    let result = orchestrator
        .start_build(&session, &shop_config(), &CancellationToken::new())
        .await;

    assert!(result.is_err());
    assert_eq!(session.status().await, BuildStatus::Failed);
    assert!(session.project_files().await.is_none());

    let logs = session.logs().await;
    let last = logs.last().unwrap();
    assert_eq!(last.level, LogLevel::Error);
    assert!(last.message.contains("quota exceeded"));

    // The compile stage never ran.
    assert!(!logs.iter().any(|l| l.message.contains("Gradle")));

    // Results stored before the failure stay visible for diagnostics.
    assert!(session.analysis().await.is_some());
}

#[tokio::test]
async fn missing_generated_logo_is_tolerated() {
    let orchestrator = orchestrator(ScriptedBackend {
        no_logo: true,
        ..ScriptedBackend::default()
    });
    let session = BuildSession::new();

    orchestrator
        .start_build(&session, &shop_config(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(session.status().await, BuildStatus::Completed);
    assert!(session.logo().await.is_none());

    let logs = session.logs().await;
    assert!(!logs.iter().any(|l| l.message.contains("AI Assets cached")));
}

#[tokio::test]
async fn uploaded_logo_wins_over_stale_ai_flag() {
    let backend = ScriptedBackend::default();
    let logo_calls = Arc::new(backend);

    let orchestrator =
        BuildOrchestrator::new(logo_calls.clone()).with_executor(Arc::new(InstantExecutor));
    let session = BuildSession::new();

    let mut config = shop_config();
    config.custom_logo_url = Some("data:image/png;base64,AAAA".to_string());
    // Deliberately inconsistent: the stored flag says AI, the upload says no.
    config.generate_logo_with_ai = true;

    orchestrator
        .start_build(&session, &config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(logo_calls.logo_calls.load(Ordering::SeqCst), 0);

    let logs = session.logs().await;
    assert!(logs
        .iter()
        .any(|l| l.message.contains("Validating user-uploaded manifest icon")));
    assert!(logs
        .iter()
        .any(|l| l.message.contains("mipmap-xxxhdpi")));
}

#[tokio::test]
async fn logs_reset_at_each_attempt() {
    let orchestrator = orchestrator(ScriptedBackend::default());
    let session = BuildSession::new();
    let cancel = CancellationToken::new();
    let config = shop_config();

    orchestrator.start_build(&session, &config, &cancel).await.unwrap();
    let first_len = session.logs().await.len();
    let first_id = session.build_id().await;

    orchestrator.start_build(&session, &config, &cancel).await.unwrap();
    let second_len = session.logs().await.len();
    let second_id = session.build_id().await;

    // Identical script, so an un-reset log would double in length.
    assert_eq!(first_len, second_len);
    assert_ne!(first_id, second_id);
}

#[tokio::test]
async fn cancellation_before_start_emits_nothing() {
    let orchestrator = orchestrator(ScriptedBackend::default());
    let session = BuildSession::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = orchestrator.start_build(&session, &shop_config(), &cancel).await;

    assert!(matches!(result, Err(BuildError::Cancelled)));
    assert_eq!(session.status().await, BuildStatus::Cancelled);
    assert!(session.logs().await.is_empty());
}

#[tokio::test]
async fn cancellation_mid_pipeline_stops_before_next_stage() {
    let cancel = CancellationToken::new();
    let orchestrator = orchestrator(ScriptedBackend {
        cancel_during_analyze: Some(cancel.clone()),
        ..ScriptedBackend::default()
    });
    let session = BuildSession::new();

    let result = orchestrator.start_build(&session, &shop_config(), &cancel).await;

    assert!(matches!(result, Err(BuildError::Cancelled)));
    assert_eq!(session.status().await, BuildStatus::Cancelled);

    let logs = session.logs().await;
    // The analysis stage finished logging, the asset stage never started.
    assert!(logs.iter().any(|l| l.message.contains("Security Score")));
    assert!(!logs.iter().any(|l| l.message.contains("asset pipeline")));
}

#[tokio::test]
async fn failing_work_unit_fails_the_build() {
    let backend = ScriptedBackend::default();
    let orchestrator = BuildOrchestrator::new(Arc::new(backend)).with_executor(Arc::new(
        FailingExecutor {
            fail_label: "Task :app:dexBuilderRelease - Dexing Bytecode...",
        },
    ));
    let session = BuildSession::new();

    let result = orchestrator
        .start_build(&session, &shop_config(), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(BuildError::Step { .. })));
    assert_eq!(session.status().await, BuildStatus::Failed);

    let logs = session.logs().await;
    // The failing unit was announced, its successors were not.
    assert!(logs.iter().any(|l| l.message.contains("Dexing Bytecode")));
    assert!(!logs.iter().any(|l| l.message.contains("Compressing Binary APK")));

    let last = logs.last().unwrap();
    assert_eq!(last.level, LogLevel::Error);
    assert!(last.message.contains("worker crashed"));
}

#[tokio::test]
async fn log_stream_grows_monotonically_during_a_run() {
    let orchestrator = orchestrator(ScriptedBackend::default());
    let session = BuildSession::new();
    let mut events = session.subscribe();

    orchestrator
        .start_build(&session, &shop_config(), &CancellationToken::new())
        .await
        .unwrap();

    let (_, messages) = drain_events(&mut events);
    let final_logs = session.logs().await;

    // Every appended entry was observed exactly once, in order.
    assert_eq!(messages.len(), final_logs.len());
    for (observed, stored) in messages.iter().zip(final_logs.iter()) {
        assert_eq!(observed, &stored.message);
    }
}
