//! Service layer module
//!
//! Contains the API client façade, HTTP transport, retry policy and
//! response normalizer

pub mod client;
pub mod normalizer;
pub mod retry;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder};
pub use normalizer::{detect_shape, ResponseNormalizer, ResponseShape};
pub use retry::{RetryDecision, RetryPolicy};
pub use transport::{HttpTransport, RawResponse, Transport};
