//! Shared handler state and the blocking-pool bridge into the lifecycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use procura_lifecycle::{Deadline, LifecycleError, Procurement};
use procura_store::ProcurementStore;

use crate::{RpcError, RpcMetrics};

pub struct ApiState<S> {
    pub procurement: Procurement<S>,
    /// Per-request deadline handed to the lifecycle.
    pub timeout: Duration,
    pub metrics: Option<Arc<RpcMetrics>>,
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            procurement: self.procurement.clone(),
            timeout: self.timeout,
            metrics: self.metrics.clone(),
        }
    }
}

impl<S: ProcurementStore + 'static> ApiState<S> {
    pub fn new(procurement: Procurement<S>, timeout: Duration) -> Self {
        Self {
            procurement,
            timeout,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<RpcMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run one lifecycle operation on the blocking pool under a fresh deadline.
    pub async fn run<T, F>(&self, action: &'static str, op: F) -> Result<T, RpcError>
    where
        T: Send + 'static,
        F: FnOnce(&Procurement<S>, Deadline) -> Result<T, LifecycleError> + Send + 'static,
    {
        let procurement = self.procurement.clone();
        let deadline = Deadline::after(self.timeout);
        let span = tracing::info_span!("rpc", action);
        let started = Instant::now();

        let result = tokio::task::spawn_blocking(move || span.in_scope(|| op(&procurement, deadline)))
            .await
            .map_err(|e| RpcError::Server(format!("lifecycle task failed: {e}")))?
            .map_err(RpcError::from);

        if let Some(metrics) = &self.metrics {
            let outcome = match &result {
                Ok(_) => "ok",
                Err(e) => e.label(),
            };
            metrics.observe(action, outcome, started.elapsed().as_secs_f64());
        }
        result
    }
}
