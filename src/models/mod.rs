//! Data models module
//!
//! Defines request descriptions and the canonical response envelope

pub mod envelope;
pub mod request;

pub use envelope::ApiResponse;
pub use request::{Endpoint, HttpMethod, OutgoingRequest, RequestConfig};
