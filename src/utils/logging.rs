//! Logging utilities
//!
//! Subscriber initialisation and helpers for compact log output

use crate::config::settings::LoggingConfig;
use tracing::info;

/// Longest body excerpt written to the logs
const MAX_BODY_LOG_CHARS: usize = 200;

/// Initialize logging system
pub fn init_logging(config: &LoggingConfig) {
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(config.level.as_str())
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging system initialized");
}

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_len: usize) -> String {
    let total = s.chars().count();
    if total > max_len {
        let kept: String = s.chars().take(max_len).collect();
        format!("{}... ({} chars truncated)", kept, total - max_len)
    } else {
        s.to_string()
    }
}

/// Short description of a JSON body for request logs
pub fn body_summary(body: &serde_json::Value) -> String {
    match body {
        serde_json::Value::Array(items) => format!("[...{} items]", items.len()),
        other => truncate_content(&other.to_string(), MAX_BODY_LOG_CHARS),
    }
}
