use std::time::Instant;

use chrono::{DateTime, Utc};
use pressmetrics_common::LabelSet;

use crate::metrics::{
    catalog::{EXPORTER_DURATION_SECONDS, EXPORTER_LAST_SCRAPE_TIMESTAMP_SECONDS},
    types::MetricSnapshot,
};

/// Lives for exactly one scrape request, from entry until the body is rendered.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeContext {
    started_at: Instant,
    scraped_at: DateTime<Utc>,
}

impl ScrapeContext {
    pub fn begin() -> Self {
        Self {
            started_at: Instant::now(),
            scraped_at: Utc::now(),
        }
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }

    /// Adds the scrape's own duration and timestamp to the snapshot.
    pub fn finish(&self, snapshot: &mut MetricSnapshot) {
        snapshot.set(
            EXPORTER_DURATION_SECONDS,
            LabelSet::new(),
            self.started_at.elapsed().as_secs_f64(),
        );
        snapshot.set(
            EXPORTER_LAST_SCRAPE_TIMESTAMP_SECONDS,
            LabelSet::new(),
            self.scraped_at.timestamp() as f64,
        );
    }
}
