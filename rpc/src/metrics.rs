//! Prometheus metrics for the HTTP API.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry, Encoder,
    HistogramVec, IntCounterVec, Registry, TextEncoder,
};

use crate::RpcError;

pub struct RpcMetrics {
    pub registry: Registry,
    /// Requests by action and outcome (`ok` or an error label).
    pub requests: IntCounterVec,
    /// Time spent in the lifecycle per action, in seconds.
    pub latency: HistogramVec,
}

impl RpcMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let requests = register_int_counter_vec_with_registry!(
            "procura_requests_total",
            "Requests handled, by action and outcome",
            &["action", "outcome"],
            registry
        )?;
        let latency = register_histogram_vec_with_registry!(
            "procura_request_duration_seconds",
            "Lifecycle time per request",
            &["action"],
            registry
        )?;
        Ok(Self {
            registry,
            requests,
            latency,
        })
    }

    pub fn observe(&self, action: &str, outcome: &str, seconds: f64) {
        self.requests.with_label_values(&[action, outcome]).inc();
        self.latency.with_label_values(&[action]).observe(seconds);
    }

    pub fn encode(&self) -> Result<String, RpcError> {
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|e| RpcError::Server(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| RpcError::Server(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_requests_show_up_in_text() {
        let metrics = RpcMetrics::new().unwrap();
        metrics.observe("create_tender", "ok", 0.01);
        metrics.observe("create_tender", "denied", 0.02);
        let text = metrics.encode().unwrap();
        assert!(text.contains("procura_requests_total{action=\"create_tender\",outcome=\"ok\"} 1"));
        assert!(text.contains("procura_request_duration_seconds"));
    }
}
