use base64::Engine;
use serde::{Deserialize, Serialize};

/// A generated image asset (launcher icon)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    /// MIME type reported by the generator, e.g. `image/png`
    pub mime_type: String,

    /// Raw image bytes
    pub data: Vec<u8>,
}

impl ImageAsset {
    /// Create a new asset from raw bytes
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Render the asset as a `data:` URI for embedding in a preview
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// The three source artifacts produced by remote code synthesis
///
/// All three are required; a synthesis response missing any of them is
/// malformed. Immutable once received, offered for individual download.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFiles {
    /// Kotlin source of the primary activity
    pub main_activity: String,

    /// AndroidManifest.xml contents
    pub manifest: String,

    /// Gradle build configuration
    pub build_gradle: String,
}
