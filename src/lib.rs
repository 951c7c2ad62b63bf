//! CRM API Client Library
//!
//! Typed HTTP client for the CRM backend: base URL resolution, bearer
//! authentication, retries with backoff, and normalized response envelopes

pub mod config;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{ClientConfig, Settings};
pub use middleware::{FileTokenStore, Interceptor, MemoryTokenStore, TokenStore};
pub use models::{ApiResponse, Endpoint, HttpMethod, RequestConfig};
pub use services::{ApiClient, ApiClientBuilder, RetryPolicy};
pub use utils::error::{ApiError, ClientError, ClientResult, ErrorKind};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
