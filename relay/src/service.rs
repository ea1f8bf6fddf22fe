//! The relay's HTTP surface: `POST /webhook` and `GET /health`.

use crate::backends::{self, BackendSource};
use crate::config::Config;
use crate::delivery::{DeliveryEngine, RelayReport};
use crate::errors::RelayError;
use crate::health::health_payload;
use crate::http::ForwardHeaders;
use crate::metrics_defs;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_TYPE, DATE};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type RelayResponse = Response<BoxBody<Bytes, RelayError>>;

/// Hyper service handling one inbound notification at a time.
///
/// Everything derived from a request (target list, outcomes, report) is
/// request-scoped; the service itself only owns the delivery engine, the
/// configuration source, and the policy flags.
#[derive(Clone)]
pub struct RelayService {
    engine: DeliveryEngine,
    source: Arc<dyn BackendSource>,
    require_active_backends: bool,
    health_endpoint: bool,
}

impl RelayService {
    pub fn new(config: &Config, source: Arc<dyn BackendSource>) -> Self {
        Self {
            engine: DeliveryEngine::new(config.delivery_timeout_secs),
            source,
            require_active_backends: config.require_active_backends,
            health_endpoint: config.health_endpoint,
        }
    }
}

impl Service<Request<Incoming>> for RelayService {
    type Response = RelayResponse;
    type Error = RelayError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let engine = self.engine.clone();
        let source = self.source.clone();
        let require_active_backends = self.require_active_backends;
        let health_endpoint = self.health_endpoint;

        Box::pin(async move {
            let method = req.method().clone();
            let path = req.uri().path().to_owned();

            let result = if method == Method::POST && path == "/webhook" {
                handle_webhook(engine, source, require_active_backends, req).await
            } else if method == Method::GET && path == "/health" && health_endpoint {
                handle_health(source, &req)
            } else {
                Ok(make_error_response(StatusCode::NOT_FOUND))
            };

            // Internal errors become a 500 carrying the raw message; these
            // indicate a defect, not an operational condition.
            Ok(result.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Request handling failed");
                text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }))
        })
    }
}

async fn handle_webhook(
    engine: DeliveryEngine,
    source: Arc<dyn BackendSource>,
    require_active_backends: bool,
    req: Request<Incoming>,
) -> Result<RelayResponse, RelayError> {
    tracing::info!("Processing App Store server notification");
    metrics::counter!(metrics_defs::WEBHOOK_REQUESTS.name).increment(1);

    let headers = ForwardHeaders::from_request(&req);
    let body = req
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| RelayError::RequestBodyError(e.to_string()))?;

    // One snapshot per request; the active set does not change mid-flight
    let configured = backends::discover(source.as_ref());
    let active = backends::active_targets(&configured);

    if active.is_empty() && require_active_backends {
        tracing::warn!("No active backends configured");
        return Ok(text_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "No active backends configured",
        ));
    }

    let outcomes = engine.deliver_to_all(&active, body, &headers).await;
    let report = RelayReport::new(configured.len(), active.len(), outcomes);

    if report.all_delivered() {
        tracing::info!(
            backends = report.total_active,
            "Delivered to all active backends"
        );
        Ok(text_response(StatusCode::OK, "OK"))
    } else {
        tracing::error!(
            failed = report.failed_count(),
            total = report.total_active,
            "Delivery failed for some backends"
        );
        Ok(text_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            report.failure_summary(),
        ))
    }
}

fn handle_health(
    source: Arc<dyn BackendSource>,
    req: &Request<Incoming>,
) -> Result<RelayResponse, RelayError> {
    let configured = backends::discover(source.as_ref());
    let active = backends::active_targets(&configured);

    let timestamp = req
        .headers()
        .get(DATE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    let payload = health_payload(&configured, &active, timestamp);
    let body = serde_json::to_string(&payload)
        .map_err(|e| RelayError::InternalError(format!("Failed to serialize health info: {e}")))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)).map_err(|e| match e {}).boxed())
        .map_err(|e| RelayError::InternalError(format!("Failed to build response: {e}")))
}

fn text_response(status: StatusCode, body: impl Into<Bytes>) -> RelayResponse {
    let mut response = Response::new(Full::new(body.into()).map_err(|e| match e {}).boxed());
    *response.status_mut() = status;
    response
}

fn make_error_response(status_code: StatusCode) -> RelayResponse {
    let message = status_code
        .canonical_reason()
        .unwrap_or("an error occurred");
    text_response(status_code, message)
}
