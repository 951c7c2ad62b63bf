//! Base URL resolution
//!
//! Resolves the backend base URL once per process from an ordered chain of
//! sources and builds request URLs against it

use once_cell::sync::OnceCell;
use reqwest::Url;
use tracing::{debug, info};

use super::file::AppManifest;
use super::settings::Settings;
use crate::models::Endpoint;
use crate::utils::error::{ClientError, ClientResult};

/// Compiled-in production base URL
pub const PRODUCTION_BASE_URL: &str = "https://api.example.com";

/// Development server location used by the dev heuristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevServer {
    /// Host the app was served from; any `:port` suffix is ignored.
    /// IPv6 literals may be bracketed (`[::1]:8081`) or bare (`::1`).
    pub host: String,
    /// Port of the development API
    pub port: u16,
}

impl DevServer {
    /// URL of the development API on the serving host
    pub fn url(&self) -> Option<String> {
        let host = strip_port(self.host.trim());
        if host.is_empty() || host == "[]" {
            return None;
        }
        if host.contains(':') && !host.starts_with('[') {
            return Some(format!("http://[{}]:{}", host, self.port));
        }
        Some(format!("http://{}:{}", host, self.port))
    }
}

/// Drop a trailing `:port`, leaving IPv6 literals intact
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

/// Raw values for each resolution source
#[derive(Debug, Clone, Default)]
pub struct BaseUrlSources {
    /// Explicit environment/override value
    pub override_url: Option<String>,
    /// Platform/application configuration value
    pub platform_url: Option<String>,
    /// Development flag gating the dev heuristic
    pub dev_mode: bool,
    /// Dev heuristic input
    pub dev_server: Option<DevServer>,
    /// Production fallback
    pub fallback_url: Option<String>,
}

impl BaseUrlSources {
    /// Candidates in resolution order
    fn chain(&self) -> [(&'static str, Option<String>); 4] {
        let dev = if self.dev_mode {
            self.dev_server.as_ref().and_then(DevServer::url)
        } else {
            None
        };

        [
            ("override", self.override_url.clone()),
            ("platform", self.platform_url.clone()),
            ("dev-server", dev),
            ("fallback", self.fallback_url.clone()),
        ]
    }
}

/// Memoizing base URL resolver
#[derive(Debug)]
pub struct ConfigResolver {
    sources: BaseUrlSources,
    resolved: OnceCell<String>,
}

impl ConfigResolver {
    pub fn new(sources: BaseUrlSources) -> Self {
        Self {
            sources,
            resolved: OnceCell::new(),
        }
    }

    /// Build the source chain from settings, reading the platform manifest
    pub fn from_settings(settings: &Settings) -> ClientResult<Self> {
        let manifest = match &settings.api.app_config_path {
            Some(path) => Some(AppManifest::load(path)?),
            None => AppManifest::load_default()?,
        };

        Ok(Self::new(BaseUrlSources {
            override_url: settings.api.base_url_override.clone(),
            platform_url: manifest
                .as_ref()
                .and_then(AppManifest::api_url)
                .map(str::to_string),
            dev_mode: settings.api.dev_mode,
            dev_server: Some(DevServer {
                host: settings.api.dev_server_host.clone(),
                port: settings.api.dev_server_port,
            }),
            fallback_url: settings.api.fallback_url.clone(),
        }))
    }

    /// Resolve the base URL; later calls return the memoized value
    pub fn resolve_base_url(&self) -> ClientResult<&str> {
        self.resolved
            .get_or_try_init(|| {
                for (source, candidate) in self.sources.chain() {
                    let Some(candidate) = candidate else {
                        continue;
                    };
                    let url = candidate.trim().trim_end_matches('/');
                    if url.is_empty() {
                        debug!("Base URL source '{}' is empty, skipping", source);
                        continue;
                    }
                    if !url.starts_with("http") {
                        return Err(ClientError::InvalidBaseUrl(url.to_string()));
                    }
                    info!("Resolved API base URL from {} source: {}", source, url);
                    return Ok(url.to_string());
                }
                Err(ClientError::MissingBaseUrl)
            })
            .map(String::as_str)
    }

    /// Join the resolved base with the endpoint path and query
    pub fn build_url(&self, endpoint: &Endpoint) -> ClientResult<String> {
        let base = self.resolve_base_url()?;
        let joined = format!("{}{}", base, endpoint.normalized_path());

        if endpoint.query_pairs().is_empty() {
            return Ok(joined);
        }

        let mut url =
            Url::parse(&joined).map_err(|_| ClientError::InvalidBaseUrl(base.to_string()))?;
        url.query_pairs_mut().extend_pairs(endpoint.query_pairs());
        Ok(url.to_string())
    }
}
