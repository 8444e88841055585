//! Build Orchestrator
//!
//! Sequential, observable build pipeline for simulated native Android
//! wrapper builds: remote site analysis, branding asset generation, and
//! code synthesis through a [`GenerationBackend`], followed by scripted
//! compile and signing stages, ending in a downloadable build report.

pub mod events;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod session;
pub mod steps;

pub use events::BuildEvent;
pub use models::{BuildLog, BuildStatus, LogLevel};
pub use orchestrator::{BuildError, BuildOrchestrator};
pub use report::{write_artifacts, BuildReport};
pub use session::BuildSession;
pub use steps::{BuildStep, Pause, SimulatedExecutor, StepExecutor};

pub use apkforge_common::GenerationBackend;
