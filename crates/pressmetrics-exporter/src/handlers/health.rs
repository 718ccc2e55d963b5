use std::{sync::Arc, time::Duration};

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::warn;

use crate::{handlers::run_store, router::ExporterState};

pub async fn health_live() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<Arc<ExporterState>>) -> impl IntoResponse {
    let store = Arc::clone(&state.store);
    match run_store(state.config.store_timeout, move || {
        store.query_latest(Duration::ZERO)
    })
    .await
    {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            warn!(error = %err, "sample store not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
