use std::{fmt::Display, sync::Arc, time::Duration};

use pressmetrics_host::HostApplication;
use tracing::warn;

use crate::metrics::{
    catalog::{
        ACTIVE_USERS_TOTAL, COMMENTS_TOTAL, DATABASE_CONNECTIONS, OBJECT_CACHE_HITS_TOTAL,
        OBJECT_CACHE_MISSES_TOTAL, PHP_VERSION_INFO, PLUGINS_TOTAL, POSTS_TOTAL, THEMES_TOTAL,
        USERS_TOTAL, VERSION_INFO,
    },
    collectors::{LiveSample, LiveSource},
};

const UNKNOWN_VERSION: &str = "unknown";

/// Content, extension and version figures read from the hosted site.
pub struct HostCollector {
    host: Arc<dyn HostApplication>,
    active_window: Duration,
}

impl HostCollector {
    pub fn new(host: Arc<dyn HostApplication>, active_window: Duration) -> Self {
        Self {
            host,
            active_window,
        }
    }

    fn collect_content(&self, samples: &mut Vec<LiveSample>) {
        let Some(content) = self.host.content() else {
            return;
        };

        if let Some(posts) = absorb(POSTS_TOTAL, content.published_posts_by_type()) {
            for (post_type, count) in posts {
                samples.push(LiveSample::new(POSTS_TOTAL, count as f64).with_label("post_type", &post_type));
            }
        }

        if let Some(users) = absorb(USERS_TOTAL, content.users_by_role()) {
            for (role, count) in users {
                samples.push(LiveSample::new(USERS_TOTAL, count as f64).with_label("role", &role));
            }
        }

        if let Some(comments) = absorb(COMMENTS_TOTAL, content.comments_by_status()) {
            for (status, count) in comments {
                samples.push(LiveSample::new(COMMENTS_TOTAL, count as f64).with_label("status", &status));
            }
        }

        if let Some(active) = absorb(ACTIVE_USERS_TOTAL, content.active_users(self.active_window)) {
            samples.push(LiveSample::new(ACTIVE_USERS_TOTAL, active as f64));
        }
    }
}

impl LiveSource for HostCollector {
    fn collect(&self) -> Vec<LiveSample> {
        let mut samples = Vec::new();

        let version = self.host.version().unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        samples.push(LiveSample::new(VERSION_INFO, 1.0).with_label("version", &version));

        let runtime = self
            .host
            .runtime_version()
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        samples.push(LiveSample::new(PHP_VERSION_INFO, 1.0).with_label("version", &runtime));

        if let Some(plugins) = absorb(PLUGINS_TOTAL, self.host.plugin_count()) {
            samples.push(LiveSample::new(PLUGINS_TOTAL, plugins as f64));
        }
        if let Some(themes) = absorb(THEMES_TOTAL, self.host.theme_count()) {
            samples.push(LiveSample::new(THEMES_TOTAL, themes as f64));
        }

        self.collect_content(&mut samples);

        if let Some(cache) = self.host.object_cache()
            && let Some(stats) = absorb(OBJECT_CACHE_HITS_TOTAL, cache.stats())
        {
            samples.push(
                LiveSample::new(OBJECT_CACHE_HITS_TOTAL, stats.hits as f64).with_label("type", "object"),
            );
            samples.push(
                LiveSample::new(OBJECT_CACHE_MISSES_TOTAL, stats.misses as f64)
                    .with_label("type", "object"),
            );
        }

        if let Some(probe) = self.host.connections()
            && let Some(open) = absorb(DATABASE_CONNECTIONS, probe.open_connections())
        {
            samples.push(LiveSample::new(DATABASE_CONNECTIONS, open as f64));
        }

        samples
    }
}

fn absorb<T, E: Display>(metric: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(metric, error = %err, "skipping live metric");
            None
        }
    }
}
