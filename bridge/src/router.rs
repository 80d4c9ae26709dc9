use std::future::ready;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::capi::CapiClient;
use crate::config::Config;
use crate::prometheus::{setup_metrics_recorder, track_metrics};
use crate::time::TimeSource;
use crate::webhook;

#[derive(Clone)]
pub struct State {
    pub capi: Arc<CapiClient>,
    pub timesource: Arc<dyn TimeSource + Send + Sync>,
    pub config: Config,
}

pub fn router<TZ: TimeSource + Send + Sync + 'static>(
    timesource: TZ,
    capi: CapiClient,
    config: Config,
    metrics: bool,
) -> Router {
    let state = State {
        capi: Arc::new(capi),
        timesource: Arc::new(timesource),
        config,
    };

    let router = Router::new()
        .route("/", get(webhook::index))
        .route("/_liveness", get(webhook::index))
        .route("/health", get(webhook::health))
        .route("/webhook", post(webhook::webhook))
        .route("/test-event", post(webhook::test_event))
        .route("/test-connection", get(webhook::test_connection))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state);

    // Don't install metrics unless asked to
    // Installing a global recorder when bridge is used as a library (during tests etc)
    // does not work well.
    if metrics {
        let recorder_handle = setup_metrics_recorder();
        router.route("/metrics", get(move || ready(recorder_handle.render())))
    } else {
        router
    }
}
