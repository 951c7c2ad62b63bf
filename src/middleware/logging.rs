//! Logging interceptors
//!
//! Records outgoing requests and completed responses. Registered only in
//! debug builds.

use reqwest::header::{HeaderMap, AUTHORIZATION};
use tracing::{debug, info, warn};

use super::ResponseContext;
use crate::models::OutgoingRequest;
use crate::utils::logging::body_summary;

/// Responses slower than this are flagged
const SLOW_REQUEST_SECS: u64 = 5;

/// Log an outgoing request with redacted credentials
pub fn log_request(request: &OutgoingRequest) {
    let headers = redact_headers(&request.config.headers);
    let body = request
        .config
        .body
        .as_ref()
        .map(body_summary)
        .unwrap_or_else(|| "<none>".to_string());

    debug!(
        method = %request.config.method,
        url = %request.url,
        "📤 Request: headers={:?} body={}",
        headers,
        body
    );
}

/// Log a completed response
pub fn log_response(context: &ResponseContext) {
    let millis = context.elapsed.as_secs_f64() * 1000.0;
    let status = context
        .status
        .map_or_else(|| "no response".to_string(), |s| s.to_string());

    if context.success {
        info!(
            "📥 {} {} -> {} in {:.2}ms ({} attempt(s))",
            context.method, context.url, status, millis, context.attempts
        );
    } else {
        warn!(
            "📥 {} {} -> {} in {:.2}ms ({} attempt(s)): {}",
            context.method,
            context.url,
            status,
            millis,
            context.attempts,
            context.error.as_deref().unwrap_or("unknown error")
        );
    }

    if context.elapsed.as_secs() > SLOW_REQUEST_SECS {
        warn!(
            "Slow request detected: {} {} - Duration: {:.2}s",
            context.method,
            context.url,
            context.elapsed.as_secs_f64()
        );
    }
}

/// Header pairs with the Authorization value masked
pub fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if *name == AUTHORIZATION {
                "[redacted]".to_string()
            } else {
                value.to_str().unwrap_or("[binary]").to_string()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}
