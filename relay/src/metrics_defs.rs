//! Metric definitions for the relay.
//!
//! Definitions are plain constants so the full metric surface can be
//! enumerated (e.g. for docs or exporter allow-lists) without grepping for
//! `metrics::` call sites.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

pub const WEBHOOK_REQUESTS: MetricDef = MetricDef {
    name: "webhook.requests",
    metric_type: MetricType::Counter,
    description: "Inbound notifications accepted on /webhook",
};

pub const DELIVERY_ATTEMPTS: MetricDef = MetricDef {
    name: "delivery.attempts",
    metric_type: MetricType::Counter,
    description: "Outbound delivery attempts, one per active backend per notification",
};

pub const DELIVERY_FAILURES: MetricDef = MetricDef {
    name: "delivery.failures",
    metric_type: MetricType::Counter,
    description: "Delivery attempts that timed out, failed to connect, or got a non-2xx",
};

pub const ALL_METRICS: &[MetricDef] = &[WEBHOOK_REQUESTS, DELIVERY_ATTEMPTS, DELIVERY_FAILURES];
