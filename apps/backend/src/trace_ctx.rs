//! Task-local trace context for web requests.
//!
//! Minimal API for reading the current request's trace_id from anywhere in
//! the request pipeline, backed by Tokio task-local storage. Web boundary
//! only; core/service code must not import it.

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

/// Trace id for the current task, or "unknown" outside a request scope.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Run a future within a trace context. Used by middleware to establish the
/// task-local scope.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}
