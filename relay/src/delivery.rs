//! Sequential fan-out of one notification to every active backend.

use crate::backends::BackendTarget;
use crate::errors::DeliveryError;
use crate::http::{ForwardHeaders, post_to_backend};
use crate::metrics_defs;
use http_body_util::Full;
use hyper::StatusCode;
use hyper::body::Bytes;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use url::Url;

/// Result of one delivery attempt at one backend.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub target: BackendTarget,
    pub result: Result<StatusCode, DeliveryError>,
}

impl DeliveryOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Attempts delivery to every active target, in order, exactly once each.
#[derive(Clone)]
pub struct DeliveryEngine {
    client: Client<HttpConnector, Full<Bytes>>,
    timeout_secs: u64,
}

impl DeliveryEngine {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            timeout_secs,
        }
    }

    /// Delivers the notification body to all targets sequentially.
    ///
    /// A failed attempt is recorded and the loop continues to the next
    /// target; nothing here short-circuits. Per-target errors never escape
    /// as errors, they become [`DeliveryOutcome`] records.
    pub async fn deliver_to_all(
        &self,
        targets: &[BackendTarget],
        body: Bytes,
        headers: &ForwardHeaders,
    ) -> Vec<DeliveryOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());

        for target in targets {
            metrics::counter!(metrics_defs::DELIVERY_ATTEMPTS.name).increment(1);
            let result = self.deliver_one(target, body.clone(), headers).await;

            match &result {
                Ok(status) => {
                    tracing::info!(
                        url = %target.url,
                        status = %status,
                        "Forwarded notification to backend"
                    );
                }
                Err(error) => {
                    metrics::counter!(metrics_defs::DELIVERY_FAILURES.name).increment(1);
                    tracing::error!(
                        url = %target.url,
                        %error,
                        "Failed to forward notification to backend"
                    );
                }
            }

            outcomes.push(DeliveryOutcome {
                target: target.clone(),
                result,
            });
        }

        outcomes
    }

    async fn deliver_one(
        &self,
        target: &BackendTarget,
        body: Bytes,
        headers: &ForwardHeaders,
    ) -> Result<StatusCode, DeliveryError> {
        // Discovery never validates URLs, so a garbage value surfaces here
        // as a per-target failure rather than aborting the whole fan-out.
        let backend_url = Url::parse(&target.url)
            .map_err(|e| DeliveryError::Other(format!("invalid backend URL: {e}")))?;

        post_to_backend(&self.client, &backend_url, body, headers, self.timeout_secs).await
    }
}

/// Aggregate view of one inbound request's fan-out, built after every
/// attempt has completed.
#[derive(Debug)]
pub struct RelayReport {
    pub total_configured: usize,
    pub total_active: usize,
    outcomes: Vec<DeliveryOutcome>,
}

impl RelayReport {
    pub fn new(
        total_configured: usize,
        total_active: usize,
        outcomes: Vec<DeliveryOutcome>,
    ) -> Self {
        Self {
            total_configured,
            total_active,
            outcomes,
        }
    }

    pub fn all_delivered(&self) -> bool {
        self.outcomes.iter().all(DeliveryOutcome::succeeded)
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }

    /// Body for the aggregate failure response, listing every failed URL
    /// with its classified reason in attempt order.
    pub fn failure_summary(&self) -> String {
        let failed: Vec<String> = self
            .outcomes
            .iter()
            .filter_map(|outcome| match &outcome.result {
                Ok(_) => None,
                Err(error) => Some(format!("{} ({})", outcome.target.url, error)),
            })
            .collect();

        format!(
            "Failed to deliver to {} out of {} backends: {}",
            failed.len(),
            self.total_active,
            failed.join(", ")
        )
    }
}
