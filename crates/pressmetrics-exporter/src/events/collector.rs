use std::sync::Arc;

use pressmetrics_common::{ExporterError, LabelSet, Result};
use pressmetrics_store::SampleStore;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    events::{
        Event,
        classify::{Endpoint, QueryType},
        scope::{MetricUpdate, RequestScope},
    },
    metrics::{
        catalog::{
            CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL, CACHE_SETS_TOTAL, COMMENTS_CREATED_TOTAL,
            DATABASE_QUERIES_TOTAL, ERRORS_TOTAL, HTTP_REQUEST_DURATION_SECONDS,
            HTTP_REQUESTS_TOTAL, MEMORY_PEAK_BYTES, MEMORY_USAGE_BYTES,
            PAGE_GENERATION_TIME_SECONDS, PLUGINS_EXECUTION_TIME_SECONDS,
            POST_STATUS_CHANGES_TOTAL, QUERIES_COUNT, USER_LOGINS_TOTAL, USER_LOGOUTS_TOTAL,
        },
        registry::MetricRegistry,
        types::MetricKind,
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlushSummary {
    pub applied: usize,
    pub dropped: usize,
    pub failed: usize,
}

/// Turns host events into durable metric writes.
///
/// Nothing here ever fails the caller: unknown metrics are dropped and store
/// failures are logged and skipped.
#[derive(Clone)]
pub struct Collector {
    registry: Arc<MetricRegistry>,
    store: Arc<dyn SampleStore>,
}

impl Collector {
    pub fn new(registry: Arc<MetricRegistry>, store: Arc<dyn SampleStore>) -> Self {
        Self { registry, store }
    }

    pub fn on_event(&self, scope: &mut RequestScope, event: &Event) {
        let updates = derive_updates(scope, event);
        debug!(kind = ?event.kind(), updates = updates.len(), "event received");
        for update in updates {
            scope.push(update);
        }
    }

    /// Writes every pending update and user activity of the scope and ends it.
    pub fn flush(&self, scope: RequestScope) -> FlushSummary {
        let mut summary = FlushSummary::default();
        let (pending, active_users) = scope.into_parts();

        for user_id in active_users {
            match self.store.record_activity(user_id) {
                Ok(()) => summary.applied += 1,
                Err(err) => {
                    warn!(user_id, error = %err, "user activity skipped");
                    summary.failed += 1;
                }
            }
        }

        for update in pending {
            match self.apply(&update) {
                Ok(()) => summary.applied += 1,
                Err(ExporterError::UnknownMetric(name)) => {
                    debug!(metric = %name, "dropping update for unknown metric");
                    summary.dropped += 1;
                }
                Err(err) => {
                    warn!(metric = update.name(), error = %err, "metric update skipped");
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Handles a single event as a request of its own.
    pub fn publish(&self, event: &Event) -> FlushSummary {
        let mut scope = RequestScope::begin();
        self.on_event(&mut scope, event);
        self.flush(scope)
    }

    fn apply(&self, update: &MetricUpdate) -> Result<()> {
        let definition = self.registry.lookup(update.name())?;

        match (update, definition.kind) {
            (MetricUpdate::Increment { labels, delta, .. }, MetricKind::Counter) => {
                self.store
                    .increment_counter(&definition.name, labels, *delta)
                    .map(|_| ())
            }
            (MetricUpdate::Set { labels, value, .. }, MetricKind::Gauge)
            | (MetricUpdate::Observe { labels, value, .. }, MetricKind::Histogram) => {
                self.store.append_gauge(&definition.name, labels, *value)
            }
            (_, kind) => Err(ExporterError::InvalidArgument(format!(
                "{} is a {}",
                definition.name,
                kind.as_prometheus_type()
            ))),
        }
    }
}

fn derive_updates(scope: &mut RequestScope, event: &Event) -> Vec<MetricUpdate> {
    match event {
        Event::Login { user_id, roles } => {
            scope.mark_active(*user_id);
            vec![MetricUpdate::increment(
                USER_LOGINS_TOTAL,
                LabelSet::new().with("user_role", roles.join(",")),
            )]
        }
        Event::Activity { user_id } => {
            scope.mark_active(*user_id);
            Vec::new()
        }
        Event::Logout => vec![MetricUpdate::increment(USER_LOGOUTS_TOTAL, LabelSet::new())],
        Event::CommentCreated { comment_id, status } => {
            debug!(comment_id, "comment created");
            vec![MetricUpdate::increment(
                COMMENTS_CREATED_TOTAL,
                LabelSet::new().with("status", normalize_comment_status(status)),
            )]
        }
        Event::PostStatusChanged {
            post_type,
            old_status,
            new_status,
        } => {
            if old_status == new_status {
                return Vec::new();
            }
            vec![MetricUpdate::increment(
                POST_STATUS_CHANGES_TOTAL,
                LabelSet::new()
                    .with("post_type", post_type.as_str())
                    .with("old_status", old_status.as_str())
                    .with("new_status", new_status.as_str()),
            )]
        }
        Event::QueryExecuted { sql } => vec![MetricUpdate::increment(
            DATABASE_QUERIES_TOTAL,
            LabelSet::new().with("type", QueryType::classify(sql).as_str()),
        )],
        Event::CacheGet { hit, .. } => {
            let name = if *hit { CACHE_HITS_TOTAL } else { CACHE_MISSES_TOTAL };
            vec![MetricUpdate::increment(
                name,
                LabelSet::new().with("type", "object"),
            )]
        }
        Event::CacheSet { .. } => vec![MetricUpdate::increment(
            CACHE_SETS_TOTAL,
            LabelSet::new().with("type", "object"),
        )],
        Event::PluginsStarted { at } => {
            if let Some(at) = at {
                scope.mark_plugins_started(*at);
            }
            Vec::new()
        }
        Event::PluginsLoaded {
            duration_seconds,
            at,
        } => {
            let Some(duration) = duration_seconds.or_else(|| scope.plugins_elapsed_until(*at))
            else {
                return Vec::new();
            };
            vec![MetricUpdate::Observe {
                name: PLUGINS_EXECUTION_TIME_SECONDS,
                labels: LabelSet::new(),
                value: duration,
            }]
        }
        Event::PageRendered {
            method,
            status,
            request,
            duration_seconds,
            at,
        } => {
            if request.is_admin || request.is_ajax {
                return Vec::new();
            }
            let endpoint = Endpoint::classify(request).as_str();
            let mut updates = vec![MetricUpdate::increment(
                HTTP_REQUESTS_TOTAL,
                LabelSet::new()
                    .with("method", method.as_str())
                    .with("status", status.to_string())
                    .with("endpoint", endpoint),
            )];
            if let Some(duration) = duration_seconds.or_else(|| scope.elapsed_until(*at)) {
                updates.push(MetricUpdate::Observe {
                    name: HTTP_REQUEST_DURATION_SECONDS,
                    labels: LabelSet::new()
                        .with("method", method.as_str())
                        .with("endpoint", endpoint),
                    value: duration,
                });
            }
            updates
        }
        Event::Error => vec![MetricUpdate::increment(ERRORS_TOTAL, LabelSet::new())],
        Event::Shutdown {
            memory_usage_bytes,
            memory_peak_bytes,
            query_count,
            generation_seconds,
            at,
        } => {
            let mut updates = vec![
                MetricUpdate::Set {
                    name: MEMORY_USAGE_BYTES,
                    labels: LabelSet::new(),
                    value: *memory_usage_bytes as f64,
                },
                MetricUpdate::Set {
                    name: MEMORY_PEAK_BYTES,
                    labels: LabelSet::new(),
                    value: *memory_peak_bytes as f64,
                },
                MetricUpdate::Set {
                    name: QUERIES_COUNT,
                    labels: LabelSet::new(),
                    value: *query_count as f64,
                },
            ];
            if let Some(generation) = generation_seconds.or_else(|| scope.elapsed_until(*at)) {
                updates.push(MetricUpdate::Observe {
                    name: PAGE_GENERATION_TIME_SECONDS,
                    labels: LabelSet::new(),
                    value: generation,
                });
            }
            updates
        }
    }
}

fn normalize_comment_status(status: &str) -> &str {
    match status {
        "1" => "approved",
        "0" => "pending",
        other => other,
    }
}
