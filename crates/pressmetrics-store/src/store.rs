//! RedbSampleStore: redb-backed persistence for metric samples.
//!
//! Records are append-only and JSON-encoded into the `SAMPLES` table. The
//! `LATEST` index points every series at its newest record so counter
//! increments and scrapes never scan the full history. Each write runs in a
//! single redb write transaction; redb serializes writers, which makes the
//! counter read-then-insert an atomic accumulator.
//!
//! Record ids and timestamps are both assigned inside the write transaction,
//! so id order is time order and retention only ever removes an id prefix.

use std::{path::Path, sync::Arc, time::Duration};

use pressmetrics_common::{
    Clock, ExporterError, LabelSet, Result, SystemClock, time::window_start,
};
use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::{debug, warn};

use crate::{
    record::{SampleRecord, series_key},
    tables::{ACTIVITY, LATEST, META, NEXT_RECORD_ID, SAMPLES},
    traits::SampleStore,
};

/// Maps any `Display` storage error into `StorageUnavailable` with context.
macro_rules! unavailable {
    ($context:literal) => {
        |err| ExporterError::StorageUnavailable(format!(concat!($context, ": {}"), err))
    };
}

#[derive(Debug, Clone, Copy)]
enum Write {
    Set(f64),
    Add(f64),
}

#[derive(Clone)]
pub struct RedbSampleStore {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl RedbSampleStore {
    /// Open (or create) a persistent sample store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(unavailable!("failed to open sample store"))?;
        let store = Self {
            db: Arc::new(db),
            clock: Arc::new(SystemClock),
        };
        store.ensure_tables()?;
        debug!(?path, "sample store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory sample store.
    pub fn open_in_memory() -> Result<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(unavailable!("failed to open in-memory sample store"))?;
        let store = Self {
            db: Arc::new(db),
            clock: Arc::new(SystemClock),
        };
        store.ensure_tables()?;
        debug!("in-memory sample store opened");
        Ok(store)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Every stored record of one series, oldest first.
    pub fn history(&self, name: &str, labels: &LabelSet) -> Result<Vec<SampleRecord>> {
        let key = series_key(name, labels);
        let txn = self
            .db
            .begin_read()
            .map_err(unavailable!("read transaction"))?;
        let samples = txn
            .open_table(SAMPLES)
            .map_err(unavailable!("open samples table"))?;

        let mut records = Vec::new();
        for entry in samples.iter().map_err(unavailable!("scan samples"))? {
            let (_, value) = entry.map_err(unavailable!("scan samples"))?;
            if let Some(record) = decode(value.value())
                && record.series_key() == key
            {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn ensure_tables(&self) -> Result<()> {
        let txn = self
            .db
            .begin_write()
            .map_err(unavailable!("write transaction"))?;
        txn.open_table(SAMPLES)
            .map_err(unavailable!("open samples table"))?;
        txn.open_table(LATEST)
            .map_err(unavailable!("open latest table"))?;
        txn.open_table(META).map_err(unavailable!("open meta table"))?;
        txn.open_table(ACTIVITY)
            .map_err(unavailable!("open activity table"))?;
        txn.commit().map_err(unavailable!("commit"))?;
        Ok(())
    }

    fn write(&self, name: &str, labels: &LabelSet, write: Write) -> Result<f64> {
        let key = series_key(name, labels);
        let txn = self
            .db
            .begin_write()
            .map_err(unavailable!("write transaction"))?;
        let recorded_at = self.clock.now();
        let id;
        let value;
        {
            let mut samples = txn
                .open_table(SAMPLES)
                .map_err(unavailable!("open samples table"))?;
            let mut latest = txn
                .open_table(LATEST)
                .map_err(unavailable!("open latest table"))?;
            let mut meta = txn.open_table(META).map_err(unavailable!("open meta table"))?;

            value = match write {
                Write::Set(value) => value,
                Write::Add(delta) => {
                    let previous_id = latest
                        .get(key.as_str())
                        .map_err(unavailable!("read latest index"))?
                        .map(|guard| guard.value());
                    let previous = match previous_id {
                        Some(previous_id) => read_record(&samples, previous_id)?
                            .map(|record| record.value),
                        None => None,
                    };
                    previous.unwrap_or(0.0) + delta
                }
            };

            id = meta
                .get(NEXT_RECORD_ID)
                .map_err(unavailable!("read record id"))?
                .map(|guard| guard.value())
                .unwrap_or(1);

            let record = SampleRecord {
                id,
                metric_name: name.to_string(),
                labels: labels.clone(),
                value,
                recorded_at,
            };
            let bytes = serde_json::to_vec(&record).map_err(unavailable!("encode sample"))?;
            samples
                .insert(id, bytes.as_slice())
                .map_err(unavailable!("insert sample"))?;
            latest
                .insert(key.as_str(), id)
                .map_err(unavailable!("update latest index"))?;
            meta.insert(NEXT_RECORD_ID, id + 1)
                .map_err(unavailable!("advance record id"))?;
        }
        txn.commit().map_err(unavailable!("commit"))?;
        debug!(%key, id, value, "sample recorded");
        Ok(value)
    }
}

impl SampleStore for RedbSampleStore {
    fn append_gauge(&self, name: &str, labels: &LabelSet, value: f64) -> Result<()> {
        self.write(name, labels, Write::Set(value)).map(|_| ())
    }

    fn increment_counter(&self, name: &str, labels: &LabelSet, delta: f64) -> Result<f64> {
        self.write(name, labels, Write::Add(delta))
    }

    fn query_latest(&self, window: Duration) -> Result<Vec<SampleRecord>> {
        let cutoff = window_start(self.clock.now(), window);
        let txn = self
            .db
            .begin_read()
            .map_err(unavailable!("read transaction"))?;
        let samples = txn
            .open_table(SAMPLES)
            .map_err(unavailable!("open samples table"))?;
        let latest = txn
            .open_table(LATEST)
            .map_err(unavailable!("open latest table"))?;

        let mut records = Vec::new();
        for entry in latest.iter().map_err(unavailable!("scan latest index"))? {
            let (_, id) = entry.map_err(unavailable!("scan latest index"))?;
            let Some(record) = read_record(&samples, id.value())? else {
                continue;
            };
            if record.recorded_at >= cutoff {
                records.push(record);
            }
        }

        records.sort_by(|left, right| {
            left.metric_name
                .cmp(&right.metric_name)
                .then_with(|| right.recorded_at.cmp(&left.recorded_at))
                .then_with(|| left.labels.canonical().cmp(&right.labels.canonical()))
        });
        Ok(records)
    }

    fn purge_older_than(&self, horizon: Duration) -> Result<usize> {
        let cutoff = window_start(self.clock.now(), horizon);
        let txn = self
            .db
            .begin_write()
            .map_err(unavailable!("write transaction"))?;
        let removed;
        let forgotten;
        {
            let mut samples = txn
                .open_table(SAMPLES)
                .map_err(unavailable!("open samples table"))?;
            let mut latest = txn
                .open_table(LATEST)
                .map_err(unavailable!("open latest table"))?;
            let mut activity = txn
                .open_table(ACTIVITY)
                .map_err(unavailable!("open activity table"))?;

            // Oldest first; the scan stops at the first live record.
            let mut expired = Vec::new();
            for entry in samples.iter().map_err(unavailable!("scan samples"))? {
                let (id, value) = entry.map_err(unavailable!("scan samples"))?;
                match decode(value.value()) {
                    Some(record) if record.recorded_at >= cutoff => break,
                    _ => expired.push(id.value()),
                }
            }

            let dangling: Vec<String> = match expired.last() {
                Some(&newest_expired) => latest
                    .iter()
                    .map_err(unavailable!("scan latest index"))?
                    .filter_map(|entry| {
                        let (key, id) = entry.ok()?;
                        (id.value() <= newest_expired).then(|| key.value().to_string())
                    })
                    .collect(),
                None => Vec::new(),
            };

            let cutoff_millis = cutoff.timestamp_millis();
            let idle: Vec<u64> = activity
                .iter()
                .map_err(unavailable!("scan activity"))?
                .filter_map(|entry| {
                    let (user_id, seen) = entry.ok()?;
                    (seen.value() < cutoff_millis).then(|| user_id.value())
                })
                .collect();

            for id in &expired {
                samples
                    .remove(*id)
                    .map_err(unavailable!("remove sample"))?;
            }
            for key in &dangling {
                latest
                    .remove(key.as_str())
                    .map_err(unavailable!("remove latest index"))?;
            }
            for user_id in &idle {
                activity
                    .remove(*user_id)
                    .map_err(unavailable!("remove activity"))?;
            }
            removed = expired.len();
            forgotten = idle.len();
        }
        txn.commit().map_err(unavailable!("commit"))?;
        if removed > 0 || forgotten > 0 {
            debug!(removed, forgotten, %cutoff, "expired samples purged");
        }
        Ok(removed)
    }

    fn record_activity(&self, user_id: u64) -> Result<()> {
        let txn = self
            .db
            .begin_write()
            .map_err(unavailable!("write transaction"))?;
        let seen = self.clock.now().timestamp_millis();
        {
            let mut activity = txn
                .open_table(ACTIVITY)
                .map_err(unavailable!("open activity table"))?;
            activity
                .insert(user_id, seen)
                .map_err(unavailable!("record activity"))?;
        }
        txn.commit().map_err(unavailable!("commit"))?;
        debug!(user_id, "user activity recorded");
        Ok(())
    }

    fn count_active(&self, window: Duration) -> Result<u64> {
        let cutoff_millis = window_start(self.clock.now(), window).timestamp_millis();
        let txn = self
            .db
            .begin_read()
            .map_err(unavailable!("read transaction"))?;
        let activity = txn
            .open_table(ACTIVITY)
            .map_err(unavailable!("open activity table"))?;

        let mut active = 0;
        for entry in activity.iter().map_err(unavailable!("scan activity"))? {
            let (_, seen) = entry.map_err(unavailable!("scan activity"))?;
            if seen.value() >= cutoff_millis {
                active += 1;
            }
        }
        Ok(active)
    }
}

fn read_record(
    table: &impl ReadableTable<u64, &'static [u8]>,
    id: u64,
) -> Result<Option<SampleRecord>> {
    let Some(guard) = table.get(id).map_err(unavailable!("read sample"))? else {
        return Ok(None);
    };
    Ok(decode(guard.value()))
}

fn decode(bytes: &[u8]) -> Option<SampleRecord> {
    match serde_json::from_slice(bytes) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(error = %err, "skipping undecodable sample record");
            None
        }
    }
}
