use pressmetrics_common::Result;

use crate::metrics::{registry::MetricRegistry, types::MetricKind};

// Stored metrics, written by the event collector.
pub const HTTP_REQUESTS_TOTAL: &str = "wordpress_http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "wordpress_http_request_duration_seconds";
pub const USER_LOGINS_TOTAL: &str = "wordpress_user_logins_total";
pub const USER_LOGOUTS_TOTAL: &str = "wordpress_user_logouts_total";
pub const COMMENTS_CREATED_TOTAL: &str = "wordpress_comments_created_total";
pub const POST_STATUS_CHANGES_TOTAL: &str = "wordpress_post_status_changes_total";
pub const PLUGINS_EXECUTION_TIME_SECONDS: &str = "wordpress_plugins_execution_time_seconds";
pub const DATABASE_QUERIES_TOTAL: &str = "wordpress_database_queries_total";
pub const CACHE_HITS_TOTAL: &str = "wordpress_cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "wordpress_cache_misses_total";
pub const CACHE_SETS_TOTAL: &str = "wordpress_cache_sets_total";
pub const ERRORS_TOTAL: &str = "wordpress_errors_total";
pub const MEMORY_USAGE_BYTES: &str = "wordpress_memory_usage_bytes";
pub const MEMORY_PEAK_BYTES: &str = "wordpress_memory_peak_bytes";
pub const QUERIES_COUNT: &str = "wordpress_queries_count";
pub const PAGE_GENERATION_TIME_SECONDS: &str = "wordpress_page_generation_time_seconds";

// Live metrics, read at scrape time.
pub const POSTS_TOTAL: &str = "wordpress_posts_total";
pub const USERS_TOTAL: &str = "wordpress_users_total";
pub const COMMENTS_TOTAL: &str = "wordpress_comments_total";
pub const ACTIVE_USERS_TOTAL: &str = "wordpress_active_users_total";
pub const DATABASE_CONNECTIONS: &str = "wordpress_database_connections";
pub const OBJECT_CACHE_HITS_TOTAL: &str = "wordpress_object_cache_hits_total";
pub const OBJECT_CACHE_MISSES_TOTAL: &str = "wordpress_object_cache_misses_total";
pub const PLUGINS_TOTAL: &str = "wordpress_plugins_total";
pub const THEMES_TOTAL: &str = "wordpress_themes_total";
pub const EXPORTER_MEMORY_USAGE_BYTES: &str = "wordpress_exporter_memory_usage_bytes";
pub const EXPORTER_MEMORY_PEAK_BYTES: &str = "wordpress_exporter_memory_peak_bytes";
pub const VERSION_INFO: &str = "wordpress_version_info";
pub const PHP_VERSION_INFO: &str = "wordpress_php_version_info";
pub const PLUGIN_INFO: &str = "wordpress_metrics_plugin_info";
pub const EXPORTER_DURATION_SECONDS: &str = "wordpress_exporter_duration_seconds";
pub const EXPORTER_LAST_SCRAPE_TIMESTAMP_SECONDS: &str =
    "wordpress_exporter_last_scrape_timestamp_seconds";

pub const EXPORTER_ERROR: &str = "wordpress_exporter_error";
pub const EXPORTER_ERROR_HELP: &str = "Set to 1 when the exporter could not collect metrics";

const CATALOG: &[(&str, MetricKind, &str)] = &[
    (
        HTTP_REQUESTS_TOTAL,
        MetricKind::Counter,
        "Total number of HTTP requests to WordPress",
    ),
    (
        HTTP_REQUEST_DURATION_SECONDS,
        MetricKind::Histogram,
        "HTTP request duration in seconds",
    ),
    (USER_LOGINS_TOTAL, MetricKind::Counter, "Total number of user logins"),
    (USER_LOGOUTS_TOTAL, MetricKind::Counter, "Total number of user logouts"),
    (
        COMMENTS_CREATED_TOTAL,
        MetricKind::Counter,
        "Total number of comments created",
    ),
    (
        POST_STATUS_CHANGES_TOTAL,
        MetricKind::Counter,
        "Total number of post status transitions",
    ),
    (
        PLUGINS_EXECUTION_TIME_SECONDS,
        MetricKind::Histogram,
        "Time spent loading plugins in seconds",
    ),
    (
        DATABASE_QUERIES_TOTAL,
        MetricKind::Counter,
        "Total number of database queries",
    ),
    (CACHE_HITS_TOTAL, MetricKind::Counter, "Total number of cache hits"),
    (CACHE_MISSES_TOTAL, MetricKind::Counter, "Total number of cache misses"),
    (CACHE_SETS_TOTAL, MetricKind::Counter, "Total number of cache sets"),
    (ERRORS_TOTAL, MetricKind::Counter, "Total number of errors"),
    (
        MEMORY_USAGE_BYTES,
        MetricKind::Gauge,
        "Memory usage of the last completed request in bytes",
    ),
    (
        MEMORY_PEAK_BYTES,
        MetricKind::Gauge,
        "Peak memory usage of the last completed request in bytes",
    ),
    (
        QUERIES_COUNT,
        MetricKind::Gauge,
        "Database queries executed by the last completed request",
    ),
    (
        PAGE_GENERATION_TIME_SECONDS,
        MetricKind::Histogram,
        "Page generation time in seconds",
    ),
    (POSTS_TOTAL, MetricKind::Gauge, "Total number of published posts"),
    (USERS_TOTAL, MetricKind::Gauge, "Total number of registered users"),
    (COMMENTS_TOTAL, MetricKind::Gauge, "Total number of comments"),
    (
        ACTIVE_USERS_TOTAL,
        MetricKind::Gauge,
        "Number of currently active users",
    ),
    (
        DATABASE_CONNECTIONS,
        MetricKind::Gauge,
        "Number of open database connections",
    ),
    (
        OBJECT_CACHE_HITS_TOTAL,
        MetricKind::Counter,
        "Object cache hits reported by the cache backend",
    ),
    (
        OBJECT_CACHE_MISSES_TOTAL,
        MetricKind::Counter,
        "Object cache misses reported by the cache backend",
    ),
    (PLUGINS_TOTAL, MetricKind::Gauge, "Number of installed plugins"),
    (THEMES_TOTAL, MetricKind::Gauge, "Number of installed themes"),
    (
        EXPORTER_MEMORY_USAGE_BYTES,
        MetricKind::Gauge,
        "Resident memory of the exporter process in bytes",
    ),
    (
        EXPORTER_MEMORY_PEAK_BYTES,
        MetricKind::Gauge,
        "Peak resident memory of the exporter process in bytes",
    ),
    (VERSION_INFO, MetricKind::Gauge, "WordPress version information"),
    (PHP_VERSION_INFO, MetricKind::Gauge, "PHP version information"),
    (PLUGIN_INFO, MetricKind::Gauge, "Metrics exporter version information"),
    (
        EXPORTER_DURATION_SECONDS,
        MetricKind::Gauge,
        "Time spent producing this scrape in seconds",
    ),
    (
        EXPORTER_LAST_SCRAPE_TIMESTAMP_SECONDS,
        MetricKind::Gauge,
        "Unix timestamp of the last scrape",
    ),
];

impl MetricRegistry {
    /// Registry with every metric the WordPress exporter knows about.
    pub fn wordpress() -> Result<Self> {
        let mut registry = Self::new();
        for (name, kind, help) in CATALOG {
            registry.define(name, *kind, help)?;
        }
        Ok(registry)
    }
}
