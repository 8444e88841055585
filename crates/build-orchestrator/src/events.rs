//! Build events published to session subscribers
//!
//! The presentation layer reacts to these instead of sharing mutable
//! state with the orchestrator. Events are delivered in strict emission
//! order over a `tokio::sync::broadcast` channel owned by the session.

use crate::models::{BuildLog, BuildStatus};
use serde::Serialize;

/// Buffer capacity of the session's broadcast channel.
///
/// A full success run emits well under a hundred events; the buffer only
/// needs to absorb a slow subscriber, not a backlog.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A state change observed on a build attempt
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildEvent {
    /// The pipeline moved to a new stage.
    StatusChanged { status: BuildStatus },

    /// A log entry was appended to the build console stream.
    Log { entry: BuildLog },
}
