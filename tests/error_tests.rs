//! Error classification tests

use crm_api_client::utils::error::{
    classify, classify_status, ApiError, ClientError, ErrorKind, Failure, InterceptorError,
    TransportError,
};
use std::time::Duration;

#[test]
fn test_user_messages_are_fixed_per_kind() {
    let expected = [
        (
            ErrorKind::NetworkError,
            "Unable to reach the server. Please check your internet connection.",
        ),
        (ErrorKind::TimeoutError, "The request took too long. Please try again."),
        (ErrorKind::AuthError, "Please log in to continue."),
        (ErrorKind::ValidationError, "Please check your input and try again."),
        (
            ErrorKind::ServerError,
            "Something went wrong on our end. Please try again later.",
        ),
        (ErrorKind::UnknownError, "An unexpected error occurred. Please try again."),
    ];

    for (kind, message) in expected {
        assert_eq!(kind.user_message(), message);
        // server text never leaks into the user message
        assert_eq!(ApiError::new(kind, "raw server detail").user_message(), message);
    }
}

#[test]
fn test_status_classification() {
    for status in [401, 403] {
        assert_eq!(classify_status(status), ErrorKind::AuthError);
    }
    for status in [400, 422] {
        assert_eq!(classify_status(status), ErrorKind::ValidationError);
    }
    for status in [500, 502, 503, 504, 599] {
        assert_eq!(classify_status(status), ErrorKind::ServerError);
    }
    for status in [404, 408, 409, 429, 302] {
        assert_eq!(classify_status(status), ErrorKind::UnknownError);
    }
}

#[test]
fn test_retryability() {
    assert!(ApiError::new(ErrorKind::NetworkError, "reset").retryable());
    assert!(ApiError::new(ErrorKind::TimeoutError, "slow").retryable());
    assert!(ApiError::from_status(503, "unavailable").retryable());
    assert!(!ApiError::from_status(401, "expired").retryable());
    assert!(!ApiError::from_status(422, "invalid").retryable());
    assert!(!ApiError::from_status(404, "missing").retryable());
    assert!(!ApiError::unknown("bad payload").retryable());
}

#[test]
fn test_transport_failures() {
    let err = classify(Failure::Transport(TransportError::Connect("refused".into())));
    assert_eq!(err.kind, ErrorKind::NetworkError);
    assert_eq!(err.status_code, None);

    let err = classify(Failure::Transport(TransportError::NoResponse("reset".into())));
    assert_eq!(err.kind, ErrorKind::NetworkError);

    let err = classify(Failure::Transport(TransportError::Timeout("read".into())));
    assert_eq!(err.kind, ErrorKind::TimeoutError);

    let err = classify(Failure::Transport(TransportError::InvalidRequest("bad header".into())));
    assert_eq!(err.kind, ErrorKind::UnknownError);
    assert!(!err.retryable());
}

#[test]
fn test_deadline_and_decode_failures() {
    let err = classify(Failure::DeadlineExceeded(Duration::from_millis(1500)));
    assert_eq!(err.kind, ErrorKind::TimeoutError);
    assert_eq!(err.message, "Deadline of 1500ms exceeded");

    let err = classify(Failure::Decode("Malformed JSON response".into()));
    assert_eq!(err.kind, ErrorKind::UnknownError);
}

#[test]
fn test_status_failure_keeps_server_message() {
    let err = classify(Failure::Status {
        status: 500,
        message: "database unavailable".into(),
    });
    assert_eq!(err.kind, ErrorKind::ServerError);
    assert_eq!(err.status_code, Some(500));
    assert_eq!(err.message, "database unavailable");
    assert_eq!(err.to_string(), "ServerError: database unavailable");
}

#[test]
fn test_interceptor_failure_is_unknown() {
    let err = classify(Failure::Interceptor(InterceptorError::new("audit", "sink closed")));
    assert_eq!(err.kind, ErrorKind::UnknownError);
    assert!(err.message.contains("audit"));
}

#[test]
fn test_auth_errors_hide_details() {
    assert!(!ApiError::from_status(401, "token expired").should_log_details());
    assert!(ApiError::from_status(500, "boom").should_log_details());
}

#[test]
fn test_kind_serialization() {
    let json = serde_json::to_string(&ErrorKind::ValidationError).unwrap();
    assert_eq!(json, "\"ValidationError\"");
    assert_eq!(ErrorKind::ALL.len(), 6);
}

#[test]
fn test_client_error_display() {
    assert!(ClientError::MissingBaseUrl.to_string().contains("No base URL configured"));
    assert_eq!(
        ClientError::InvalidBaseUrl("ftp://x".into()).to_string(),
        "Invalid base URL 'ftp://x', should start with 'http'"
    );
}
