//! Response normalization
//!
//! Turns the server's heterogeneous payloads into `ApiResponse<T>`. Three
//! shapes are recognised:
//!
//! - bare: any JSON value, used directly as `data`
//! - envelope: an object with a boolean `success` plus `data`/`error`
//! - paginated: an object with `data` and a numeric `total`
//!
//! Detection is checked in the order paginated, envelope, bare. A domain
//! object that itself carries `data` plus a non-negative integer `total` is
//! therefore read as a page and its `data` is unwrapped. A non-boolean
//! `success` key rules both wrapped shapes out.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::models::ApiResponse;
use crate::utils::error::{classify, ApiError, Failure};

/// Detected payload shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Bare,
    Envelope,
    Paginated,
}

/// Detect which of the supported shapes a parsed body has
pub fn detect_shape(body: &Value) -> ResponseShape {
    match body {
        Value::Object(map)
            if map.contains_key("data")
                && map.get("total").map_or(false, Value::is_u64)
                && map.get("success").map_or(true, Value::is_boolean) =>
        {
            ResponseShape::Paginated
        }
        Value::Object(map) if map.get("success").map_or(false, Value::is_boolean) => {
            ResponseShape::Envelope
        }
        _ => ResponseShape::Bare,
    }
}

/// Wire form of the envelope and paginated shapes
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    success: Option<bool>,
    #[serde(default)]
    data: Value,
    error: Option<Value>,
    message: Option<String>,
    total: Option<Value>,
}

impl WireEnvelope {
    fn error_text(&self) -> Option<String> {
        self.error
            .as_ref()
            .and_then(error_value_text)
            .or_else(|| self.message.clone().filter(|m| !m.trim().is_empty()))
    }
}

/// Normalizes raw bodies into canonical envelopes
#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw body; failures become `success == false` responses
    /// carrying the server's message or a generic status message
    pub fn parse<T: DeserializeOwned>(&self, raw_body: &str, status: u16) -> ApiResponse<T> {
        self.normalize(raw_body, status)
            .unwrap_or_else(|error| ApiResponse::failure(error.message))
    }

    /// Parse a raw body, keeping classification for failures
    ///
    /// `Err` is returned for HTTP error statuses, malformed JSON, and payloads
    /// that do not decode into `T`. An envelope reporting `success: false` on
    /// a 2xx status is a domain-level answer and comes back as `Ok`.
    pub fn normalize<T: DeserializeOwned>(
        &self,
        raw_body: &str,
        status: u16,
    ) -> Result<ApiResponse<T>, ApiError> {
        if status >= 400 {
            let message = server_error_text(raw_body).unwrap_or_else(|| generic_status_message(status));
            return Err(classify(Failure::Status { status, message }));
        }

        let body: Value = if raw_body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(raw_body).map_err(|e| {
                classify(Failure::Decode(format!("Malformed JSON response: {}", e)))
            })?
        };

        match detect_shape(&body) {
            ResponseShape::Bare => decode(body).map(ApiResponse::success),
            ResponseShape::Envelope | ResponseShape::Paginated => {
                let envelope: WireEnvelope = serde_json::from_value(body).map_err(|e| {
                    classify(Failure::Decode(format!("Malformed response envelope: {}", e)))
                })?;

                if envelope.success == Some(false) {
                    let message = envelope
                        .error_text()
                        .unwrap_or_else(|| "Request failed".to_string());
                    return Ok(ApiResponse::failure(message));
                }

                let total = envelope.total.as_ref().and_then(Value::as_u64);
                let data = decode(envelope.data)?;
                Ok(match total {
                    Some(total) => ApiResponse::paginated(data, total),
                    None => ApiResponse::success(data),
                })
            }
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| classify(Failure::Decode(format!("Unexpected response payload: {}", e))))
}

/// `error` may be a string or an object with a `message`
fn error_value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Message carried by an error body, if any
fn server_error_text(raw_body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw_body).ok()?;
    value
        .get("error")
        .and_then(error_value_text)
        .or_else(|| {
            value
                .get("message")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        })
}

pub fn generic_status_message(status: u16) -> String {
    format!("Request failed with status code {}", status)
}
