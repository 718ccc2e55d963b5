use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    events::{Event, FlushSummary, RequestScope},
    handlers::run_blocking,
    router::ExporterState,
};

/// Events of one host request, applied under a single request scope.
#[derive(Debug, Deserialize)]
pub struct EventBatch {
    /// Host timestamp of the request start, in unix seconds.
    #[serde(default)]
    pub request_started_at: Option<f64>,
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub accepted: usize,
    #[serde(flatten)]
    pub summary: FlushSummary,
}

pub async fn ingest_events(
    State(state): State<Arc<ExporterState>>,
    Json(batch): Json<EventBatch>,
) -> impl IntoResponse {
    let accepted = batch.events.len();
    let collector = state.collector.clone();

    let summary = run_blocking(move || {
        let mut scope = batch
            .request_started_at
            .map_or_else(RequestScope::begin, RequestScope::starting_at);
        for event in &batch.events {
            collector.on_event(&mut scope, event);
        }
        Ok(collector.flush(scope))
    })
    .await
    .unwrap_or_else(|err| {
        warn!(error = %err, "event batch dropped");
        FlushSummary::default()
    });

    debug!(accepted, applied = summary.applied, "event batch ingested");
    (
        StatusCode::ACCEPTED,
        Json(IngestResponse { accepted, summary }),
    )
}
