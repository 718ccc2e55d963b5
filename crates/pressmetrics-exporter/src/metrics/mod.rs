pub mod catalog;
pub mod collectors;
pub mod exposition;
pub mod registry;
pub mod resolver;
pub mod scrape;
pub mod types;

pub use collectors::{
    ActiveUsers, ExporterInfo, HostCollector, LiveSample, LiveSource, SystemCollector,
};
pub use registry::MetricRegistry;
pub use resolver::SnapshotResolver;
pub use scrape::ScrapeContext;
pub use types::{MetricDefinition, MetricKind, MetricSnapshot, SeriesValue};
