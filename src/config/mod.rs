//! Configuration management module
//!
//! Loads settings from the environment and the platform manifest, and
//! resolves the process-wide client configuration

pub mod file;
pub mod resolver;
pub mod settings;

pub use file::AppManifest;
pub use resolver::{BaseUrlSources, ConfigResolver, DevServer, PRODUCTION_BASE_URL};
pub use settings::Settings;

use std::time::Duration;

use crate::models::Endpoint;
use crate::services::retry::RetryPolicy;
use crate::utils::error::ClientResult;

/// Resolved client configuration; immutable once built
#[derive(Debug)]
pub struct ClientConfig {
    resolver: ConfigResolver,
    /// Per-attempt deadline when a call does not override it
    pub default_timeout: Duration,
    /// Retry parameters applied to every call
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(resolver: ConfigResolver, default_timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            resolver,
            default_timeout,
            retry,
        }
    }

    /// Build from settings, reading the platform manifest
    pub fn from_settings(settings: &Settings) -> ClientResult<Self> {
        Ok(Self::new(
            ConfigResolver::from_settings(settings)?,
            Duration::from_secs(settings.api.timeout),
            RetryPolicy::from(&settings.retry),
        ))
    }

    /// Configuration with a fixed base URL and default timing
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(
            ConfigResolver::new(BaseUrlSources {
                override_url: Some(base_url.into()),
                ..Default::default()
            }),
            Duration::from_secs(30),
            RetryPolicy::default(),
        )
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> ClientResult<&str> {
        self.resolver.resolve_base_url()
    }

    pub fn build_url(&self, endpoint: &Endpoint) -> ClientResult<String> {
        self.resolver.build_url(endpoint)
    }
}
