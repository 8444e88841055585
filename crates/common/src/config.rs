//! App configuration model and validation
//!
//! This module defines the user-authored specification for a wrapper app
//! and the predicates that gate a build.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PACKAGE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z0-9_]+)+$").unwrap());

static HEX_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

/// User-authored specification for a native wrapper app
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Website the wrapper points at
    pub url: String,

    /// Display name of the app
    pub app_name: String,

    /// Android package identifier (reverse-domain form)
    pub package_name: String,

    /// Theme color as a `#rrggbb` hex value
    pub theme_color: String,

    /// Data URI of the AI-generated launcher icon, once produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Data URI of a user-uploaded launcher icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_logo_url: Option<String>,

    /// Request an AI-generated launcher icon during the build
    #[serde(rename = "generateLogoWithAI")]
    pub generate_logo_with_ai: bool,

    /// Native runtime capabilities baked into the shell
    pub features: Features,
}

/// Feature flags for the generated shell
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    /// Swipe-down refresh in the WebView
    pub pull_to_refresh: bool,

    /// Offline screen when connectivity is lost
    pub offline_fallback: bool,

    /// Camera, gallery, and file picker support
    pub file_uploads: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            pull_to_refresh: true,
            offline_fallback: true,
            file_uploads: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            app_name: String::new(),
            package_name: "com.nativeapp.shell".to_string(),
            theme_color: "#3b82f6".to_string(),
            logo_url: None,
            custom_logo_url: None,
            generate_logo_with_ai: true,
            features: Features::default(),
        }
    }
}

impl AppConfig {
    /// Whether this configuration may enter the build pipeline.
    ///
    /// Gates advancement out of the first wizard step; the orchestrator
    /// does not re-check it.
    pub fn is_buildable(&self) -> bool {
        !self.url.is_empty() && !self.app_name.is_empty() && is_valid_package_name(&self.package_name)
    }

    /// Whether the build should request an AI-generated icon.
    ///
    /// An uploaded logo always wins over the stored AI flag.
    pub fn wants_generated_logo(&self) -> bool {
        self.generate_logo_with_ai && self.custom_logo_url.is_none()
    }

    /// Attach a user-uploaded launcher icon.
    ///
    /// Disables AI icon generation for this build; the two logo sources
    /// are mutually exclusive from this point on.
    pub fn set_custom_logo(&mut self, data_uri: String) {
        self.custom_logo_url = Some(data_uri);
        self.generate_logo_with_ai = false;
    }
}

/// Check a package identifier against the Android reverse-domain form:
/// lowercase alphanumeric/underscore segments, at least two, dot-separated,
/// first segment starting with a letter.
pub fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME_REGEX.is_match(name)
}

/// Check a theme color for the `#rrggbb` form.
pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR_REGEX.is_match(color)
}

/// Lowercase a package identifier and strip whitespace, the way the wizard
/// input field normalizes keystrokes.
pub fn normalize_package_name(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect()
}

/// Parser for app configuration documents
pub struct ConfigParser;

impl ConfigParser {
    /// Parse a configuration from a JSON string
    ///
    /// # Arguments
    /// * `json_str` - JSON string containing the configuration
    ///
    /// # Returns
    /// * Parsed and validated configuration
    pub fn parse_str(json_str: &str) -> anyhow::Result<AppConfig> {
        use anyhow::Context;

        let config: AppConfig =
            serde_json::from_str(json_str).context("Failed to parse app configuration")?;

        Self::validate(&config)?;

        Ok(config)
    }

    /// Parse a configuration from a JSON file
    pub fn parse_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<AppConfig> {
        use anyhow::Context;

        let json_str = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;

        Self::parse_str(&json_str)
    }

    /// Validate a parsed configuration
    ///
    /// Checks for:
    /// - Non-empty URL and app name
    /// - Well-formed package identifier
    /// - Well-formed theme color
    /// - The uploaded-logo / AI-logo mutual exclusion
    fn validate(config: &AppConfig) -> anyhow::Result<()> {
        if config.url.is_empty() {
            anyhow::bail!("url cannot be empty");
        }

        if config.app_name.is_empty() {
            anyhow::bail!("appName cannot be empty");
        }

        if !is_valid_package_name(&config.package_name) {
            anyhow::bail!(
                "packageName '{}' is not a valid Android identifier (expected e.g. com.example.app)",
                config.package_name
            );
        }

        if !is_valid_hex_color(&config.theme_color) {
            anyhow::bail!(
                "themeColor '{}' is not a hex color (expected e.g. #3b82f6)",
                config.theme_color
            );
        }

        if config.custom_logo_url.is_some() && config.generate_logo_with_ai {
            anyhow::bail!("generateLogoWithAI must be false when a custom logo is attached");
        }

        Ok(())
    }
}
