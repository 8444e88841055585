//! Data models for the build pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline status of a build attempt
///
/// The success path is totally ordered: `Idle` through `Completed`, each
/// stage reachable only from the one before it. `Failed` and `Cancelled`
/// are terminal and reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// No build attempt in flight
    #[default]
    Idle,
    /// Remote site analysis running
    Analyzing,
    /// Branding assets being produced
    GeneratingAssets,
    /// Remote code synthesis running
    GeneratingCode,
    /// Simulated compile steps running
    Compiling,
    /// Simulated signature application
    Signing,
    /// Build finished, artifacts downloadable
    Completed,
    /// Build aborted by a collaborator failure
    Failed,
    /// Build aborted by the caller
    Cancelled,
}

impl BuildStatus {
    /// Position of this status on the success path, if it is on it.
    pub fn stage_index(&self) -> Option<u8> {
        match self {
            BuildStatus::Idle => Some(0),
            BuildStatus::Analyzing => Some(1),
            BuildStatus::GeneratingAssets => Some(2),
            BuildStatus::GeneratingCode => Some(3),
            BuildStatus::Compiling => Some(4),
            BuildStatus::Signing => Some(5),
            BuildStatus::Completed => Some(6),
            BuildStatus::Failed | BuildStatus::Cancelled => None,
        }
    }

    /// Whether no further stage transitions may occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BuildStatus::Completed | BuildStatus::Failed | BuildStatus::Cancelled
        )
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BuildStatus::Idle => "IDLE",
            BuildStatus::Analyzing => "ANALYZING",
            BuildStatus::GeneratingAssets => "GENERATING_ASSETS",
            BuildStatus::GeneratingCode => "GENERATING_CODE",
            BuildStatus::Compiling => "COMPILING",
            BuildStatus::Signing => "SIGNING",
            BuildStatus::Completed => "COMPLETED",
            BuildStatus::Failed => "FAILED",
            BuildStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

/// Severity of a build log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One entry in the append-only build log stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildLog {
    /// Human-readable emission time (`%H:%M:%S`, local)
    pub timestamp: String,

    /// Message text shown in the console
    pub message: String,

    /// Severity tag
    pub level: LogLevel,
}

impl BuildLog {
    /// Create an entry stamped with the current local time.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
            level,
        }
    }
}
