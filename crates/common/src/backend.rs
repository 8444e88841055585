//! Remote collaborator contract
//!
//! The build orchestrator drives the three generative calls through this
//! trait so that the pipeline can run against the real Gemini client or a
//! scripted stand-in in tests.

use crate::{AnalysisResult, AppConfig, ImageAsset, ProjectFiles, RemoteError};
use async_trait::async_trait;

/// The three remote generative operations a build depends on
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Analyze a website for native wrapper conversion.
    async fn analyze_site(&self, url: &str) -> Result<AnalysisResult, RemoteError>;

    /// Generate a launcher icon for the app.
    ///
    /// `Ok(None)` means the generator produced no image; that is a valid,
    /// non-error outcome and the build proceeds without an asset.
    async fn generate_logo(
        &self,
        app_name: &str,
        theme_color: &str,
    ) -> Result<Option<ImageAsset>, RemoteError>;

    /// Synthesize the wrapper project sources from the configuration and
    /// the stored analysis result.
    async fn synthesize_project(
        &self,
        config: &AppConfig,
        analysis: &AnalysisResult,
    ) -> Result<ProjectFiles, RemoteError>;
}
