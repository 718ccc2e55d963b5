use std::collections::BTreeSet;

use pressmetrics_common::LabelSet;

#[derive(Debug, Clone, PartialEq)]
pub enum MetricUpdate {
    Increment {
        name: &'static str,
        labels: LabelSet,
        delta: f64,
    },
    Set {
        name: &'static str,
        labels: LabelSet,
        value: f64,
    },
    Observe {
        name: &'static str,
        labels: LabelSet,
        value: f64,
    },
}

impl MetricUpdate {
    pub fn increment(name: &'static str, labels: LabelSet) -> Self {
        Self::Increment {
            name,
            labels,
            delta: 1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Increment { name, .. } | Self::Set { name, .. } | Self::Observe { name, .. } => {
                name
            }
        }
    }

    pub fn labels(&self) -> &LabelSet {
        match self {
            Self::Increment { labels, .. }
            | Self::Set { labels, .. }
            | Self::Observe { labels, .. } => labels,
        }
    }
}

/// State of one host request, from its first event until `Collector::flush`.
///
/// Timing markers are host timestamps in unix seconds, as the host's own
/// clock reported them. Durations are only derived between two host
/// timestamps; the time an event reaches the exporter says nothing about the
/// request that produced it.
#[derive(Debug, Default)]
pub struct RequestScope {
    started_at: Option<f64>,
    plugins_started_at: Option<f64>,
    active_users: BTreeSet<u64>,
    pending: Vec<MetricUpdate>,
}

impl RequestScope {
    /// A scope without a known request start.
    pub fn begin() -> Self {
        Self::default()
    }

    pub fn starting_at(started_at: f64) -> Self {
        Self {
            started_at: Some(started_at),
            ..Self::default()
        }
    }

    /// Seconds from the request start to `at`.
    pub fn elapsed_until(&self, at: Option<f64>) -> Option<f64> {
        span(self.started_at, at)
    }

    /// Only the first call sets the marker.
    pub fn mark_plugins_started(&mut self, at: f64) {
        self.plugins_started_at.get_or_insert(at);
    }

    pub fn plugins_elapsed_until(&self, at: Option<f64>) -> Option<f64> {
        span(self.plugins_started_at, at)
    }

    pub fn mark_active(&mut self, user_id: u64) {
        self.active_users.insert(user_id);
    }

    pub fn active_users(&self) -> impl Iterator<Item = u64> + '_ {
        self.active_users.iter().copied()
    }

    pub fn push(&mut self, update: MetricUpdate) {
        self.pending.push(update);
    }

    pub fn pending(&self) -> &[MetricUpdate] {
        &self.pending
    }

    pub(crate) fn into_parts(self) -> (Vec<MetricUpdate>, BTreeSet<u64>) {
        (self.pending, self.active_users)
    }
}

fn span(start: Option<f64>, end: Option<f64>) -> Option<f64> {
    let seconds = end? - start?;
    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}
