//! Platform manifest loading
//!
//! Reads the application manifest (`app.json`) that carries the
//! platform-configured API URL under `extra.apiUrl`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Application manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppManifest {
    /// Free-form application extras
    #[serde(default)]
    pub extra: ManifestExtra,
}

/// Manifest extras relevant to the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestExtra {
    /// Platform-configured API base URL
    #[serde(rename = "apiUrl", default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AppManifest {
    /// Load manifest from JSON file
    ///
    /// Accepts both a bare manifest and one nested under an `"expo"` key.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading app manifest from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read app manifest: {:?}", path))?;

        Self::from_json(&content)
    }

    /// Parse manifest from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let mut value: serde_json::Value =
            serde_json::from_str(content).context("Failed to parse app manifest JSON")?;

        if let Some(inner) = value.get_mut("expo").map(serde_json::Value::take) {
            value = inner;
        }

        let manifest: AppManifest =
            serde_json::from_value(value).context("Invalid app manifest structure")?;

        debug!("App manifest apiUrl present: {}", manifest.api_url().is_some());
        Ok(manifest)
    }

    /// Load manifest from default locations
    /// Searches in order:
    /// 1. <config_dir>/crm-client/app.json
    /// 2. ./app.json
    ///
    /// A missing manifest is not an error: the platform source is simply empty.
    pub fn load_default() -> Result<Option<Self>> {
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("crm-client").join("app.json");
            if config_path.exists() {
                return Self::load(&config_path).map(Some);
            }
        }

        let local_path = Path::new("app.json");
        if local_path.exists() {
            return Self::load(local_path).map(Some);
        }

        debug!("No app manifest found, platform base URL source is empty");
        Ok(None)
    }

    /// Platform API URL, blank values treated as absent
    pub fn api_url(&self) -> Option<&str> {
        self.extra
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
