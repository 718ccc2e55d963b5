pub mod activity;
pub mod host;
pub mod info;
pub mod system;

use pressmetrics_common::LabelSet;

/// A point-in-time value read during a scrape. Never stored, never windowed.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSample {
    pub name: &'static str,
    pub labels: LabelSet,
    pub value: f64,
}

impl LiveSample {
    pub fn new(name: &'static str, value: f64) -> Self {
        Self {
            name,
            labels: LabelSet::new(),
            value,
        }
    }

    pub fn with_label(mut self, name: &str, value: &str) -> Self {
        self.labels.insert(name, value);
        self
    }
}

/// Source of live values merged into every scrape.
///
/// Implementations absorb their own failures: a source that cannot answer
/// logs and returns fewer samples.
pub trait LiveSource: Send + Sync {
    fn collect(&self) -> Vec<LiveSample>;
}

pub use activity::ActiveUsers;
pub use host::HostCollector;
pub use info::ExporterInfo;
pub use system::SystemCollector;
