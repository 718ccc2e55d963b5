pub mod config;
pub mod events;
pub mod handlers;
pub mod metrics;
pub mod router;

pub use config::ExporterConfig;
pub use events::{Collector, Event, RequestScope};
pub use metrics::{MetricRegistry, MetricSnapshot, SnapshotResolver};
pub use router::{ExporterState, exporter_router};
