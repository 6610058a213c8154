//! Axum router and server.

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use procura_store::ProcurementStore;

use crate::handlers::*;
use crate::{ApiState, RpcError};

/// Every route, with `/metrics` added when the state carries metrics.
pub fn router<S: ProcurementStore + 'static>(state: ApiState<S>) -> Router {
    let api = Router::new()
        .route("/ping", get(ping))
        .route("/tenders", get(list_tenders::<S>))
        .route("/tenders/my", get(my_tenders::<S>))
        .route("/tenders/new", axum::routing::post(create_tender::<S>))
        .route(
            "/tenders/:id/status",
            get(tender_status::<S>).put(update_tender_status::<S>),
        )
        .route("/tenders/:id/edit", axum::routing::patch(edit_tender::<S>))
        .route(
            "/tenders/:id/rollback/:version",
            axum::routing::put(rollback_tender::<S>),
        )
        .route("/bids/new", axum::routing::post(create_bid::<S>))
        .route("/bids/my", get(my_bids::<S>))
        .route("/bids/:id/list", get(tender_bids::<S>))
        .route(
            "/bids/:id/status",
            get(bid_status::<S>).put(update_bid_status::<S>),
        )
        .route("/bids/:id/edit", axum::routing::patch(edit_bid::<S>))
        .route(
            "/bids/:id/submit_decision",
            axum::routing::put(submit_decision::<S>),
        )
        .route("/bids/:id/feedback", axum::routing::put(feedback_bid::<S>))
        .route("/bids/:id/reviews", get(reviews::<S>))
        .route(
            "/bids/:id/rollback/:version",
            axum::routing::put(rollback_bid::<S>),
        );

    let mut app = Router::new().nest("/api", api);
    if state.metrics.is_some() {
        app = app.route("/metrics", get(metrics::<S>));
    }
    app.with_state(state)
}

pub struct RpcServer {
    pub addr: SocketAddr,
}

impl RpcServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Serve `app` until `shutdown` resolves.
    pub async fn start<F>(&self, app: Router, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.addr)))?;
        tracing::info!(addr = %self.addr, "http api listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
