//! Middleware module unit tests

use crm_api_client::middleware::auth::inject_bearer;
use crm_api_client::middleware::logging::redact_headers;
use crm_api_client::middleware::{
    FileTokenStore, Interceptor, InterceptorPipeline, MemoryTokenStore, Phase, PipelineBuilder,
    ResponseContext, TokenStore,
};
use crm_api_client::models::OutgoingRequest;
use crm_api_client::utils::error::InterceptorError;
use crm_api_client::{HttpMethod, RequestConfig};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;
use uuid::Uuid;

fn outgoing() -> OutgoingRequest {
    OutgoingRequest::new("https://api.example.com/clients", RequestConfig::new(HttpMethod::Post))
}

fn context(status: u16) -> ResponseContext {
    ResponseContext {
        request_id: Uuid::new_v4(),
        method: HttpMethod::Get,
        url: "https://api.example.com/clients".to_string(),
        status: Some(status),
        attempts: 1,
        elapsed: Duration::from_millis(42),
        success: status < 400,
        error: None,
    }
}

#[tokio::test]
async fn test_default_pipeline_attaches_token_and_content_type() {
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::with_token("abc123"));
    let pipeline = PipelineBuilder::new().with_defaults(Some(store)).build();

    let request = pipeline.run_request(outgoing()).await.unwrap();
    assert_eq!(request.config.headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
    assert_eq!(request.config.headers.get(CONTENT_TYPE).unwrap(), "application/json");
}

#[tokio::test]
async fn test_default_pipeline_without_store() {
    let pipeline = PipelineBuilder::new().with_defaults(None).build();
    assert!(!pipeline.names().contains(&"auth-header"));

    let request = pipeline.run_request(outgoing()).await.unwrap();
    assert!(request.config.headers.get(AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_token_changes_apply_to_next_request() {
    let store = Arc::new(MemoryTokenStore::default());
    let pipeline = PipelineBuilder::new()
        .register(Interceptor::AuthHeader(store.clone()))
        .unwrap()
        .build();

    let request = pipeline.run_request(outgoing()).await.unwrap();
    assert!(request.config.headers.get(AUTHORIZATION).is_none());

    store.set_token("fresh").await;
    let request = pipeline.run_request(outgoing()).await.unwrap();
    assert_eq!(request.config.headers.get(AUTHORIZATION).unwrap(), "Bearer fresh");

    store.clear().await;
    let request = pipeline.run_request(outgoing()).await.unwrap();
    assert!(request.config.headers.get(AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_file_store_blank_token_is_absent() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"authToken": "   "}"#).unwrap();

    let store = FileTokenStore::new(file.path());
    assert!(store.read_token().await.unwrap().is_none());

    let request = inject_bearer(&store, outgoing()).await.unwrap();
    assert!(request.config.headers.get(AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_bearer_value_is_sensitive() {
    let store = MemoryTokenStore::with_token("secret-token");
    let request = inject_bearer(&store, outgoing()).await.unwrap();

    let value = request.config.headers.get(AUTHORIZATION).unwrap();
    assert!(value.is_sensitive());
    assert!(!format!("{:?}", redact_headers(&request.config.headers)).contains("secret-token"));
}

#[tokio::test]
async fn test_registration_order_is_execution_order() {
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut builder = PipelineBuilder::new();
    for name in ["first", "second", "third"] {
        let order = order.clone();
        builder = builder
            .register(Interceptor::request(name, move |req: OutgoingRequest| {
                order.lock().unwrap().push(name);
                async move { Ok(req) }
            }))
            .unwrap();
    }
    let pipeline = builder.build();

    pipeline.run_request(outgoing()).await.unwrap();
    pipeline.run_request(outgoing()).await.unwrap();

    assert_eq!(
        *order.lock().unwrap(),
        vec!["first", "second", "third", "first", "second", "third"]
    );
}

#[tokio::test]
async fn test_same_interceptor_registered_twice_runs_twice() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let interceptor = Interceptor::request("count", move |req: OutgoingRequest| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok(req) }
    });

    let pipeline = PipelineBuilder::new()
        .register(interceptor.clone())
        .unwrap()
        .register(interceptor)
        .unwrap()
        .build();
    assert_eq!(pipeline.names(), vec!["count", "count"]);

    pipeline.run_request(outgoing()).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    pipeline.run_request(outgoing()).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_request_interceptor_can_override_headers() {
    let pipeline = PipelineBuilder::new()
        .with_defaults(None)
        .register(Interceptor::request("csv", |mut req: OutgoingRequest| async move {
            req.config
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
            Ok(req)
        }))
        .unwrap()
        .build();

    let request = pipeline.run_request(outgoing()).await.unwrap();
    assert_eq!(request.config.headers.get(CONTENT_TYPE).unwrap(), "text/csv");
}

#[test]
fn test_response_interceptors_observe_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let first = seen.clone();
    let second = seen.clone();

    let pipeline = InterceptorPipeline::builder()
        .register(Interceptor::response("first", move |ctx: &ResponseContext| {
            first.lock().unwrap().push(("first", ctx.status.unwrap_or_default()));
            Ok(())
        }))
        .unwrap()
        .register(Interceptor::response("second", move |ctx: &ResponseContext| {
            second.lock().unwrap().push(("second", ctx.status.unwrap_or_default()));
            Ok(())
        }))
        .unwrap()
        .build();

    pipeline.run_response(&context(201)).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![("first", 201), ("second", 201)]);
}

#[test]
fn test_response_interceptor_failure_stops_chain() {
    let reached = Arc::new(Mutex::new(false));
    let flag = reached.clone();

    let pipeline = PipelineBuilder::new()
        .register(Interceptor::response("audit", |_: &ResponseContext| {
            Err(InterceptorError::new("audit", "sink closed"))
        }))
        .unwrap()
        .register(Interceptor::response("after", move |_: &ResponseContext| {
            *flag.lock().unwrap() = true;
            Ok(())
        }))
        .unwrap()
        .build();

    let err = pipeline.run_response(&context(200)).unwrap_err();
    assert_eq!(err.name, "audit");
    assert!(!*reached.lock().unwrap());
}

#[test]
fn test_invalid_names_rejected() {
    assert!(PipelineBuilder::new()
        .register(Interceptor::response("", |_: &ResponseContext| Ok(())))
        .is_err());
    assert!(PipelineBuilder::new()
        .register(Interceptor::response(" padded ", |_: &ResponseContext| Ok(())))
        .is_err());
}

#[test]
fn test_interceptor_phases() {
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::default());
    assert_eq!(Interceptor::AuthHeader(store).phase(), Phase::Request);
    assert_eq!(Interceptor::ContentType.phase(), Phase::Request);
    assert_eq!(Interceptor::RequestLogger.phase(), Phase::Request);
    assert_eq!(Interceptor::ResponseLogger.phase(), Phase::Response);
    assert_eq!(Interceptor::ResponseLogger.name(), "response-logger");
}

#[test]
fn test_empty_pipeline() {
    let pipeline = InterceptorPipeline::default();
    assert!(pipeline.is_empty());
    assert_eq!(pipeline.len(), 0);
    assert!(pipeline.run_response(&context(500)).is_ok());
}
