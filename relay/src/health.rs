//! Status payload for the read-only health endpoint.

use crate::backends::BackendTarget;
use serde_json::Value;

/// Builds the health status payload from one discovery snapshot.
///
/// This reflects configuration only; no backend is contacted to produce it.
pub fn health_payload(
    configured: &[BackendTarget],
    active: &[BackendTarget],
    timestamp: &str,
) -> Value {
    serde_json::json!({
        "status": "healthy",
        "timestamp": timestamp,
        "total_backends": configured.len(),
        "active_backends": active.len(),
        "backend_urls": active.iter().map(|t| t.url.as_str()).collect::<Vec<_>>(),
    })
}
