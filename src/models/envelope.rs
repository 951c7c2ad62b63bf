//! Canonical response envelope
//!
//! `ApiResponse<T>` is the only shape callers receive. Its fields are private
//! so the success/data/error invariant cannot be broken from outside.

use serde::Serialize;

/// Normalized result of a request
///
/// `success == true` means `data` is present and `error` is absent;
/// `success == false` means `error` is present and `data` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            total: None,
        }
    }

    /// Successful page of results with the server-reported total
    pub fn paginated(data: T, total: u64) -> Self {
        Self {
            total: Some(total),
            ..Self::success(data)
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            total: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, Some(error)) => Err(error),
            (None, None) => Err("Response carried neither data nor error".to_string()),
        }
    }

    /// Transform the payload, keeping success state and total
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            total: self.total,
        }
    }
}
