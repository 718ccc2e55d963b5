use std::time::Duration;

use pressmetrics_common::{LabelSet, Result};

use crate::record::SampleRecord;

/// Shared persistence for samples written by independent requests.
///
/// Every failure is reported as `ExporterError::StorageUnavailable`; callers
/// skip the affected metric instead of failing their own request.
pub trait SampleStore: Send + Sync {
    /// Inserts a record holding `value` as-is (gauges and histogram observations).
    fn append_gauge(&self, name: &str, labels: &LabelSet, value: f64) -> Result<()>;

    /// Inserts a record holding the previous latest value of the series plus
    /// `delta` and returns the new cumulative value.
    fn increment_counter(&self, name: &str, labels: &LabelSet, delta: f64) -> Result<f64>;

    /// The most recent record of every series recorded within `window`.
    fn query_latest(&self, window: Duration) -> Result<Vec<SampleRecord>>;

    /// Removes records older than `horizon` and returns how many were removed.
    /// User activity older than `horizon` is forgotten as well.
    fn purge_older_than(&self, horizon: Duration) -> Result<usize>;

    /// Marks `user_id` as active now.
    fn record_activity(&self, user_id: u64) -> Result<()>;

    /// Number of distinct users active within `window`.
    fn count_active(&self, window: Duration) -> Result<u64>;
}
