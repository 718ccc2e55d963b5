//! pressmetrics-store: durable sample storage shared by every request.
//!
//! Backed by [redb](https://docs.rs/redb). Event ingestion appends records,
//! scrapes read the newest record per series, and a retention sweep removes
//! expired history.

pub mod record;
pub mod store;
pub mod tables;
pub mod traits;

pub use record::{SampleRecord, series_key};
pub use store::RedbSampleStore;
pub use traits::SampleStore;
