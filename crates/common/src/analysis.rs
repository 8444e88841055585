use serde::{Deserialize, Serialize};

/// Structured result of the remote site analysis
///
/// Every field is required; a response missing any of them is treated as
/// malformed by the client. The result is immutable once received and held
/// for the remainder of the build attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Whether the site renders acceptably on mobile viewports
    pub is_responsive: bool,

    /// Detected technology stack ("React", "WordPress", ...)
    pub detected_framework: String,

    /// PWA readiness of the target
    pub pwa_compatible: bool,

    /// Security score, 0-100 inclusive
    pub security_score: u8,

    /// Android permissions the wrapper should request
    pub suggested_permissions: Vec<String>,

    /// Performance advice for the native shell
    pub optimization_tips: Vec<String>,
}
