use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use pressmetrics_common::Result;
use pressmetrics_store::{SampleRecord, SampleStore};
use tracing::warn;

use crate::metrics::{collectors::LiveSource, types::MetricSnapshot};

/// Builds the per-scrape snapshot from stored records and live sources.
pub struct SnapshotResolver {
    store: Arc<dyn SampleStore>,
    sources: Vec<Box<dyn LiveSource>>,
}

impl SnapshotResolver {
    pub fn new(store: Arc<dyn SampleStore>) -> Self {
        Self {
            store,
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl LiveSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn resolve(&self, window: Duration) -> MetricSnapshot {
        self.assemble(self.store.query_latest(window))
    }

    /// Merges an already performed store read with the live sources.
    ///
    /// A failed read leaves only the live values; live values replace stored
    /// values of the identical series.
    pub fn assemble(&self, stored: Result<Vec<SampleRecord>>) -> MetricSnapshot {
        let mut snapshot = match stored {
            Ok(records) => deduplicate(records),
            Err(err) => {
                warn!(error = %err, "stored series unavailable, serving live values only");
                MetricSnapshot::new()
            }
        };

        for source in &self.sources {
            for sample in source.collect() {
                snapshot.set(sample.name, sample.labels, sample.value);
            }
        }

        snapshot
    }
}

/// Keeps the newest record per series, in first-seen order.
pub fn deduplicate(records: Vec<SampleRecord>) -> MetricSnapshot {
    let mut newest: HashMap<String, (DateTime<Utc>, u64)> = HashMap::new();
    let mut snapshot = MetricSnapshot::new();

    for record in records {
        let key = record.series_key();
        let stamp = (record.recorded_at, record.id);
        if let Some(seen) = newest.get(&key)
            && *seen >= stamp
        {
            continue;
        }

        newest.insert(key, stamp);
        snapshot.set(&record.metric_name, record.labels, record.value);
    }

    snapshot
}
