//! Per-attempt build session state
//!
//! [`BuildSession`] owns everything a build attempt produces: the status,
//! the append-only log stream, the stored collaborator results, and the
//! downloadable report. It is designed to be shared as `Arc<BuildSession>`
//! between the orchestrator (sole mutator) and any number of observers.

use crate::events::{BuildEvent, EVENT_CHANNEL_CAPACITY};
use crate::models::{BuildLog, BuildStatus, LogLevel};
use crate::report::BuildReport;
use apkforge_common::{AnalysisResult, ImageAsset, ProjectFiles};
use tokio::sync::{broadcast, RwLock};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Default)]
struct SessionState {
    status: BuildStatus,
    logs: Vec<BuildLog>,
    analysis: Option<AnalysisResult>,
    project_files: Option<ProjectFiles>,
    logo: Option<ImageAsset>,
    report: Option<BuildReport>,
    build_id: Option<Uuid>,
}

/// Observable state of build attempts
///
/// Exactly one attempt is in flight at a time; starting a new attempt
/// discards everything the previous one stored.
pub struct BuildSession {
    state: RwLock<SessionState>,
    events: broadcast::Sender<BuildEvent>,
}

impl BuildSession {
    /// Create an idle session with no attempt state.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(SessionState::default()),
            events,
        }
    }

    /// Subscribe to status and log events, in emission order.
    pub fn subscribe(&self) -> broadcast::Receiver<BuildEvent> {
        self.events.subscribe()
    }

    /// Current pipeline status.
    pub async fn status(&self) -> BuildStatus {
        self.state.read().await.status
    }

    /// Snapshot of the log stream so far.
    pub async fn logs(&self) -> Vec<BuildLog> {
        self.state.read().await.logs.clone()
    }

    /// Analysis result, once stored.
    pub async fn analysis(&self) -> Option<AnalysisResult> {
        self.state.read().await.analysis.clone()
    }

    /// Synthesized project sources, once stored.
    pub async fn project_files(&self) -> Option<ProjectFiles> {
        self.state.read().await.project_files.clone()
    }

    /// Generated launcher icon, if one was produced.
    pub async fn logo(&self) -> Option<ImageAsset> {
        self.state.read().await.logo.clone()
    }

    /// Downloadable build report; present once the attempt completed.
    pub async fn report(&self) -> Option<BuildReport> {
        self.state.read().await.report.clone()
    }

    /// Identifier of the current attempt.
    pub async fn build_id(&self) -> Option<Uuid> {
        self.state.read().await.build_id
    }

    /// Reset the session for a fresh attempt and assign its identifier.
    ///
    /// Clears the log stream and every stored result from the previous
    /// attempt.
    pub(crate) async fn begin_attempt(&self) -> Uuid {
        let build_id = Uuid::new_v4();
        let mut state = self.state.write().await;
        *state = SessionState {
            build_id: Some(build_id),
            ..SessionState::default()
        };
        build_id
    }

    /// Move the pipeline to `status` and notify subscribers.
    ///
    /// Terminal states are absorbing and the success path only moves
    /// forward; a transition violating either rule is dropped.
    pub(crate) async fn transition(&self, status: BuildStatus) {
        {
            let mut state = self.state.write().await;
            let current = state.status;

            if current.is_terminal() {
                warn!("Ignoring transition {} -> {} after terminal state", current, status);
                return;
            }

            if let (Some(from), Some(to)) = (current.stage_index(), status.stage_index()) {
                if to <= from {
                    warn!("Ignoring backwards transition {} -> {}", current, status);
                    return;
                }
            }

            state.status = status;
        }

        let _ = self.events.send(BuildEvent::StatusChanged { status });
    }

    /// Append a log entry and notify subscribers.
    ///
    /// A cancelled attempt emits nothing further.
    pub(crate) async fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = BuildLog::new(level, message);

        {
            let mut state = self.state.write().await;
            if state.status == BuildStatus::Cancelled {
                return;
            }
            state.logs.push(entry.clone());
        }

        let _ = self.events.send(BuildEvent::Log { entry });
    }

    pub(crate) async fn store_analysis(&self, analysis: AnalysisResult) {
        self.state.write().await.analysis = Some(analysis);
    }

    pub(crate) async fn store_project_files(&self, files: ProjectFiles) {
        self.state.write().await.project_files = Some(files);
    }

    pub(crate) async fn store_logo(&self, asset: ImageAsset) {
        self.state.write().await.logo = Some(asset);
    }

    pub(crate) async fn store_report(&self, report: BuildReport) {
        self.state.write().await.report = Some(report);
    }
}

impl Default for BuildSession {
    fn default() -> Self {
        Self::new()
    }
}
