use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use pressmetrics_common::Result;
use pressmetrics_host::WordPressInstall;
use tracing::{debug, error, warn};

use crate::{
    handlers::{run_blocking, run_store},
    metrics::{
        ActiveUsers, ExporterInfo, HostCollector, ScrapeContext, SnapshotResolver,
        SystemCollector,
        exposition::{self, CONTENT_TYPE},
    },
    router::ExporterState,
};

/// Serves one scrape. Always answers 200 with a valid exposition body; a
/// scrape that cannot collect anything reports its failure as the error
/// metric.
pub async fn prometheus_metrics(state: Arc<ExporterState>) -> Response {
    let scrape = ScrapeContext::begin();
    let payload = match collect(&state, scrape).await {
        Ok(payload) => payload,
        Err(err) => {
            if err.is_fatal_for_scrape() {
                warn!(error = %err, reason = err.reason(), "wordpress unavailable, reporting error metric");
            } else {
                error!(error = %err, reason = err.reason(), "scrape failed");
            }
            exposition::render_error(err.reason())
        }
    };

    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = StatusCode::OK;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE));
    response
}

async fn collect(state: &ExporterState, scrape: ScrapeContext) -> Result<String> {
    let config = state.config.clone();
    let install = run_blocking(move || {
        WordPressInstall::bootstrap(&config.wordpress_path)
            .map(|install| install.with_runtime_version(config.runtime_version))
    })
    .await?;

    let timeout = state.config.store_timeout;
    let store = Arc::clone(&state.store);
    let window = state.config.window;
    let stored = run_store(timeout, move || store.query_latest(window)).await;

    let store = Arc::clone(&state.store);
    let active_window = state.config.active_user_window;
    let active = match run_store(timeout, move || store.count_active(active_window)).await {
        Ok(active) => Some(active),
        Err(err) => {
            warn!(error = %err, "active users unavailable");
            None
        }
    };

    let mut resolver = SnapshotResolver::new(Arc::clone(&state.store));
    if let Some(active) = active {
        resolver = resolver.with_source(ActiveUsers::new(active));
    }
    let resolver = resolver
        .with_source(HostCollector::new(
            Arc::new(install),
            state.config.active_user_window,
        ))
        .with_source(SystemCollector)
        .with_source(ExporterInfo);
    let registry = Arc::clone(&state.registry);

    run_blocking(move || {
        let mut snapshot = resolver.assemble(stored);
        scrape.finish(&mut snapshot);
        debug!(series = snapshot.series_count(), "snapshot resolved");
        Ok(exposition::render(&snapshot, &registry))
    })
    .await
}
