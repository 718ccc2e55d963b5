use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pressmetrics_common::Result;
use pressmetrics_store::SampleStore;
use tower_http::trace::TraceLayer;

use crate::{config::ExporterConfig, events::Collector, handlers, metrics::MetricRegistry};

pub struct ExporterState {
    pub config: ExporterConfig,
    pub registry: Arc<MetricRegistry>,
    pub store: Arc<dyn SampleStore>,
    pub collector: Collector,
}

impl ExporterState {
    pub fn new(config: ExporterConfig, store: Arc<dyn SampleStore>) -> Result<Self> {
        let registry = Arc::new(MetricRegistry::wordpress()?);
        let collector = Collector::new(Arc::clone(&registry), Arc::clone(&store));

        Ok(Self {
            config,
            registry,
            store,
            collector,
        })
    }
}

pub fn exporter_router(state: Arc<ExporterState>) -> Router {
    Router::new()
        .route("/health/live", get(handlers::health::health_live))
        .route("/health/ready", get(handlers::health::health_ready))
        .route("/events", post(handlers::events::ingest_events))
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Metrics are served on any path or query that asks for them; everything
/// else is a plain 404.
async fn dispatch(State(state): State<Arc<ExporterState>>, method: Method, uri: Uri) -> Response {
    if (method == Method::GET || method == Method::HEAD) && is_metrics_request(&uri) {
        return handlers::metrics::prometheus_metrics(state).await;
    }
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

pub fn is_metrics_request(uri: &Uri) -> bool {
    let path = uri.path();
    if path.contains("/wp-metrics") || path.contains("/metrics") {
        return true;
    }

    uri.query().is_some_and(|query| {
        query.split('&').any(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == "action" && value == "prometheus_metrics") || key == "metrics"
        })
    })
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Arc, time::Duration};

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, Uri, header},
    };
    use pressmetrics_common::LabelSet;
    use pressmetrics_store::{RedbSampleStore, SampleStore};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::{ExporterState, exporter_router, is_metrics_request};
    use crate::config::ExporterConfig;

    fn wordpress_tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("wp-config.php"),
            "<?php\ndefine( 'DB_NAME', 'wordpress' );\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("wp-includes")).unwrap();
        fs::write(
            dir.path().join("wp-includes/version.php"),
            "<?php\n$wp_version = '6.4.2';\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("wp-content/plugins/akismet")).unwrap();
        dir
    }

    fn state(root: &std::path::Path) -> (Arc<ExporterState>, Arc<RedbSampleStore>) {
        let store = Arc::new(RedbSampleStore::open_in_memory().unwrap());
        let config = ExporterConfig {
            wordpress_path: root.to_path_buf(),
            runtime_version: Some("8.2.12".to_string()),
            ..ExporterConfig::default()
        };
        let state = ExporterState::new(config, store.clone()).unwrap();
        (Arc::new(state), store)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn selects_metrics_requests() {
        for uri in [
            "/wp-metrics",
            "/blog/wp-metrics/",
            "/metrics",
            "/?action=prometheus_metrics",
            "/index.php?page=2&metrics",
            "/index.php?metrics=1",
        ] {
            assert!(is_metrics_request(&uri.parse::<Uri>().unwrap()), "{uri}");
        }
        for uri in ["/", "/wp-admin/", "/?action=login", "/?p=metrics"] {
            assert!(!is_metrics_request(&uri.parse::<Uri>().unwrap()), "{uri}");
        }
    }

    #[tokio::test]
    async fn other_paths_are_not_found() {
        let dir = wordpress_tree();
        let (state, _) = state(dir.path());
        let response = exporter_router(state)
            .oneshot(Request::get("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Not Found");
    }

    #[tokio::test]
    async fn missing_config_reports_error_metric() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state(dir.path());
        let response = exporter_router(state)
            .oneshot(Request::get("/wp-metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let body = body_text(response).await;
        assert_eq!(body.lines().count(), 3);
        assert!(body.ends_with("wordpress_exporter_error{type=\"config_not_found\"} 1\n"));
    }

    #[tokio::test]
    async fn incomplete_config_reports_bootstrap_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wp-config.php"), "<?php\n").unwrap();
        let (state, _) = state(dir.path());
        let response = exporter_router(state)
            .oneshot(
                Request::get("/?action=prometheus_metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_text(response).await;
        assert!(body.contains("wordpress_exporter_error{type=\"bootstrap_failed\"} 1\n"));
    }

    #[tokio::test]
    async fn scrape_merges_stored_and_live_series() {
        let dir = wordpress_tree();
        let (state, store) = state(dir.path());
        store
            .increment_counter("wordpress_errors_total", &LabelSet::new(), 1.0)
            .unwrap();

        let response = exporter_router(state)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("# TYPE wordpress_errors_total counter\nwordpress_errors_total 1\n"));
        assert!(body.contains("wordpress_version_info{version=\"6.4.2\"} 1\n"));
        assert!(body.contains("wordpress_php_version_info{version=\"8.2.12\"} 1\n"));
        assert!(body.contains("wordpress_plugins_total 1\n"));
        assert!(body.contains("wordpress_themes_total 0\n"));
        assert!(body.contains("wordpress_metrics_plugin_info{version=\""));
        assert!(body.contains("wordpress_exporter_last_scrape_timestamp_seconds "));
        assert!(!body.contains("wordpress_exporter_error"));
    }

    #[tokio::test]
    async fn ingested_events_show_up_in_next_scrape() {
        let dir = wordpress_tree();
        let (state, store) = state(dir.path());
        let router = exporter_router(state);

        let payload = r#"{"events": [
            {"event": "login", "user_id": 3, "roles": ["editor"]},
            {"event": "query_executed", "sql": "SELECT * FROM wp_posts"},
            {"event": "cache_get", "key": "alloptions", "hit": true},
            {"event": "page_rendered", "request": {"is_admin": true}}
        ]}"#;
        let response = router
            .clone()
            .oneshot(
                Request::post("/events")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["accepted"], 4);
        assert_eq!(json["applied"], 4);
        assert_eq!(store.query_latest(Duration::from_secs(60)).unwrap().len(), 3);

        let response = router
            .oneshot(Request::get("/wp-metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.contains("wordpress_user_logins_total{user_role=\"editor\"} 1\n"));
        assert!(body.contains("wordpress_database_queries_total{type=\"select\"} 1\n"));
        assert!(body.contains("wordpress_cache_hits_total{type=\"object\"} 1\n"));
        assert!(body.contains("wordpress_active_users_total 1\n"));
        assert!(!body.contains("wordpress_http_requests_total"));
    }

    async fn post_events(router: axum::Router, payload: &'static str) -> serde_json::Value {
        let response = router
            .oneshot(
                Request::post("/events")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn batches_without_host_timing_store_no_durations() {
        let dir = wordpress_tree();
        let (state, store) = state(dir.path());
        let json = post_events(
            exporter_router(state),
            r#"{"events": [
                {"event": "plugins_started"},
                {"event": "plugins_loaded"},
                {"event": "page_rendered", "request": {"is_home": true}},
                {"event": "shutdown", "memory_usage_bytes": 1024,
                 "memory_peak_bytes": 2048, "query_count": 9}
            ]}"#,
        )
        .await;
        assert_eq!(json["applied"], 4);

        let names = store
            .query_latest(Duration::from_secs(60))
            .unwrap()
            .into_iter()
            .map(|record| record.metric_name)
            .collect::<Vec<_>>();
        for timing in [
            "wordpress_plugins_execution_time_seconds",
            "wordpress_http_request_duration_seconds",
            "wordpress_page_generation_time_seconds",
        ] {
            assert!(!names.iter().any(|name| name == timing), "{timing}");
        }
    }

    #[tokio::test]
    async fn batches_with_host_timing_measure_the_host_request() {
        let dir = wordpress_tree();
        let (state, store) = state(dir.path());
        post_events(
            exporter_router(state),
            r#"{"request_started_at": 1700000000.0, "events": [
                {"event": "plugins_started", "at": 1700000000.125},
                {"event": "plugins_loaded", "at": 1700000000.25},
                {"event": "page_rendered", "request": {"is_home": true}, "at": 1700000000.5},
                {"event": "shutdown", "memory_usage_bytes": 1024,
                 "memory_peak_bytes": 2048, "query_count": 9, "at": 1700000000.75}
            ]}"#,
        )
        .await;

        let value = |name: &str| {
            store
                .query_latest(Duration::from_secs(60))
                .unwrap()
                .into_iter()
                .find(|record| record.metric_name == name)
                .map(|record| record.value)
        };
        assert_eq!(value("wordpress_plugins_execution_time_seconds"), Some(0.125));
        assert_eq!(value("wordpress_http_request_duration_seconds"), Some(0.5));
        assert_eq!(value("wordpress_page_generation_time_seconds"), Some(0.75));
    }

    #[tokio::test]
    async fn container_config_is_scraped_normally() {
        let dir = wordpress_tree();
        fs::write(
            dir.path().join("wp-config.php"),
            "<?php\ndefine( 'DB_NAME', getenv_docker('WORDPRESS_DB_NAME', 'wordpress') );\n\
             define( 'DB_HOST', getenv_docker('WORDPRESS_DB_HOST', 'mysql') );\n",
        )
        .unwrap();
        let (state, _) = state(dir.path());
        let response = exporter_router(state)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_text(response).await;
        assert!(!body.contains("wordpress_exporter_error"));
        assert!(body.contains("wordpress_version_info{version=\"6.4.2\"} 1\n"));
    }

    #[tokio::test]
    async fn unreadable_version_keeps_stored_series() {
        let dir = wordpress_tree();
        let version = dir.path().join("wp-includes/version.php");
        fs::remove_file(&version).unwrap();
        fs::create_dir(&version).unwrap();
        let (state, store) = state(dir.path());
        store
            .increment_counter("wordpress_errors_total", &LabelSet::new(), 1.0)
            .unwrap();

        let response = exporter_router(state)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_text(response).await;
        assert!(!body.contains("wordpress_exporter_error"));
        assert!(body.contains("wordpress_errors_total 1\n"));
        assert!(body.contains("wordpress_version_info{version=\"unknown\"} 1\n"));
    }

    #[tokio::test]
    async fn malformed_events_are_rejected() {
        let dir = wordpress_tree();
        let (state, _) = state(dir.path());
        let response = exporter_router(state)
            .oneshot(
                Request::post("/events")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"events": [{"event": "teleport"}]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn health_endpoints_answer() {
        let dir = wordpress_tree();
        let (state, _) = state(dir.path());
        let router = exporter_router(state);
        for path in ["/health/live", "/health/ready"] {
            let response = router
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }
}
