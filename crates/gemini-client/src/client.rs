//! Client for the Gemini generative API

use crate::wire::{GenerateContentRequest, GenerateContentResponse};
use apkforge_common::{
    AnalysisResult, AppConfig, GenerationBackend, ImageAsset, ProjectFiles, RemoteError,
};
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;
use tracing::debug;

/// Public Gemini API endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const ANALYSIS_MODEL: &str = "gemini-3-flash-preview";
const IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const SYNTHESIS_MODEL: &str = "gemini-3-pro-preview";

/// Client for the three generative build collaborators
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a new client against the public endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different endpoint (local stub, proxy)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a client from `GEMINI_API_KEY` (and optional `GEMINI_BASE_URL`)
    pub fn from_env() -> anyhow::Result<Self> {
        use anyhow::Context;

        let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;

        let mut client = Self::new(api_key);
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            client = client.with_base_url(base_url);
        }

        Ok(client)
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, RemoteError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!("Calling Gemini model: {}", model);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}

/// Extract the text payload of the first candidate.
fn text_payload(response: &GenerateContentResponse) -> Result<&str, RemoteError> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|content| content.parts.iter().find_map(|p| p.text.as_deref()))
        .ok_or(RemoteError::MissingField("candidates[0].content.parts.text"))
}

/// Find the first inline image in the response, if any.
///
/// Absence of an image part is not an error; a part that carries
/// undecodable data is.
fn first_inline_image(
    response: &GenerateContentResponse,
) -> Result<Option<ImageAsset>, RemoteError> {
    let Some(content) = response.candidates.first().and_then(|c| c.content.as_ref()) else {
        return Ok(None);
    };

    for part in &content.parts {
        if let Some(inline) = &part.inline_data {
            let data = base64::engine::general_purpose::STANDARD
                .decode(&inline.data)
                .map_err(|e| RemoteError::Malformed(format!("bad inline image data: {e}")))?;
            return Ok(Some(ImageAsset::new(inline.mime_type.clone(), data)));
        }
    }

    Ok(None)
}

fn parse_analysis(payload: &str) -> Result<AnalysisResult, RemoteError> {
    let result: AnalysisResult =
        serde_json::from_str(payload).map_err(|e| RemoteError::Malformed(e.to_string()))?;

    if result.security_score > 100 {
        return Err(RemoteError::Malformed(format!(
            "security score {} out of range",
            result.security_score
        )));
    }

    Ok(result)
}

fn parse_project_files(payload: &str) -> Result<ProjectFiles, RemoteError> {
    serde_json::from_str(payload).map_err(|e| RemoteError::Malformed(e.to_string()))
}

fn analysis_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isResponsive": { "type": "BOOLEAN" },
            "detectedFramework": { "type": "STRING" },
            "pwaCompatible": { "type": "BOOLEAN" },
            "securityScore": { "type": "NUMBER" },
            "suggestedPermissions": { "type": "ARRAY", "items": { "type": "STRING" } },
            "optimizationTips": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": [
            "isResponsive", "detectedFramework", "pwaCompatible",
            "securityScore", "suggestedPermissions", "optimizationTips"
        ]
    })
}

fn project_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "mainActivity": { "type": "STRING" },
            "manifest": { "type": "STRING" },
            "buildGradle": { "type": "STRING" }
        },
        "required": ["mainActivity", "manifest", "buildGradle"]
    })
}

fn analysis_prompt(url: &str) -> String {
    format!(
        "Deeply analyze this URL for native Android WebView conversion: {url}.\n\
         Evaluate:\n\
         1. Mobile responsiveness.\n\
         2. Technology stack (React, WordPress, etc.).\n\
         3. PWA readiness.\n\
         4. Required Android permissions (Camera, Location, etc.).\n\
         5. Performance optimization tips for a native wrapper.\n\
         Provide a security score (0-100).\n\
         Output as JSON."
    )
}

fn logo_prompt(app_name: &str, theme_color: &str) -> String {
    format!(
        "A 1024x1024 ultra-high-definition Android app launcher icon for \"{app_name}\".\n\
         Style: Modern, flat, minimalist vector.\n\
         Background: Rounded square.\n\
         Primary Color: {theme_color}.\n\
         Focus: Central abstract symbol representing the brand.\n\
         No text in the icon, just a clean logo."
    )
}

fn synthesis_prompt(config: &AppConfig, analysis: &AnalysisResult) -> String {
    let analysis_json =
        serde_json::to_string(analysis).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Act as a senior Android Engineer. Generate a fully functional native Kotlin source set for a WebView app.\n\
         Name: {}\n\
         URL: {}\n\
         Package: {}\n\
         Analysis Data: {}\n\
         \n\
         The code must handle:\n\
         - Custom UserAgent\n\
         - WebChromeClient for File Uploads\n\
         - Pull-to-refresh implementation\n\
         - App Color branding: {}\n\
         \n\
         Return JSON with fields: mainActivity, manifest, buildGradle.",
        config.app_name, config.url, config.package_name, analysis_json, config.theme_color
    )
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn analyze_site(&self, url: &str) -> Result<AnalysisResult, RemoteError> {
        let request =
            GenerateContentRequest::from_text(analysis_prompt(url)).with_json_schema(analysis_schema());

        let response = self.generate_content(ANALYSIS_MODEL, &request).await?;
        parse_analysis(text_payload(&response)?)
    }

    async fn generate_logo(
        &self,
        app_name: &str,
        theme_color: &str,
    ) -> Result<Option<ImageAsset>, RemoteError> {
        let request =
            GenerateContentRequest::from_text(logo_prompt(app_name, theme_color)).with_square_image();

        let response = self.generate_content(IMAGE_MODEL, &request).await?;
        first_inline_image(&response)
    }

    async fn synthesize_project(
        &self,
        config: &AppConfig,
        analysis: &AnalysisResult,
    ) -> Result<ProjectFiles, RemoteError> {
        let request = GenerateContentRequest::from_text(synthesis_prompt(config, analysis))
            .with_json_schema(project_schema());

        let response = self.generate_content(SYNTHESIS_MODEL, &request).await?;
        parse_project_files(text_payload(&response)?)
    }
}
