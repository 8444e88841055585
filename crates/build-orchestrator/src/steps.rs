//! Named local work units of the compile and signing stages
//!
//! Each unit is a label plus a pause policy. The executor is pluggable so
//! that the scripted pauses standing in for real work today can be swapped
//! for a real task backend without touching the pipeline, and so tests can
//! run the pipeline instantly.

use crate::orchestrator::BuildError;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// How long a work unit holds the pipeline
#[derive(Debug, Clone, Copy)]
pub enum Pause {
    /// Uniformly random pause, inclusive on both ends
    Jittered { min_ms: u64, max_ms: u64 },
    /// Deterministic pause
    Fixed { ms: u64 },
}

/// One named unit of local build work
#[derive(Debug, Clone, Copy)]
pub struct BuildStep {
    /// Console line announced before the unit runs
    pub label: &'static str,

    /// Pause policy modeling the unit's elapsed time
    pub pause: Pause,
}

/// The six compile-stage sub-steps, announced in this exact order.
pub const COMPILE_STEPS: [BuildStep; 6] = [
    BuildStep {
        label: "Fetching Gradle 8.2.1 daemon...",
        pause: Pause::Jittered { min_ms: 800, max_ms: 1500 },
    },
    BuildStep {
        label: "Task :app:mergeReleaseResources - Completed",
        pause: Pause::Jittered { min_ms: 800, max_ms: 1500 },
    },
    BuildStep {
        label: "Task :app:compileReleaseKotlin - Optimizing WebView...",
        pause: Pause::Jittered { min_ms: 800, max_ms: 1500 },
    },
    BuildStep {
        label: "Task :app:dexBuilderRelease - Dexing Bytecode...",
        pause: Pause::Jittered { min_ms: 800, max_ms: 1500 },
    },
    BuildStep {
        label: "Task :app:packageRelease - Compressing Binary APK...",
        pause: Pause::Jittered { min_ms: 800, max_ms: 1500 },
    },
    BuildStep {
        label: "Running R8 obfuscation for release security...",
        pause: Pause::Jittered { min_ms: 800, max_ms: 1500 },
    },
];

/// The signing-stage work unit; its pause is fixed, not jittered.
pub const SIGNING_STEP: BuildStep = BuildStep {
    label: "Applying cryptographically secure V3 APK Signature...",
    pause: Pause::Fixed { ms: 1500 },
};

/// Executes one work unit to completion
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn run(&self, step: &BuildStep) -> Result<(), BuildError>;
}

/// Executor that models elapsed time by sleeping
pub struct SimulatedExecutor;

#[async_trait]
impl StepExecutor for SimulatedExecutor {
    async fn run(&self, step: &BuildStep) -> Result<(), BuildError> {
        let ms = match step.pause {
            // ThreadRng is not Send; pick the duration before suspending.
            Pause::Jittered { min_ms, max_ms } => rand::thread_rng().gen_range(min_ms..=max_ms),
            Pause::Fixed { ms } => ms,
        };

        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }
}
