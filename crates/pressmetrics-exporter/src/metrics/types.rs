use std::collections::HashMap;

use pressmetrics_common::LabelSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_prometheus_type(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDefinition {
    pub name: String,
    pub kind: MetricKind,
    pub help: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesValue {
    pub labels: LabelSet,
    pub value: f64,
}

/// Current value of every series for one scrape.
///
/// Metric names keep the order in which they were first seen and series keep
/// their discovery order within a metric, so rendering is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MetricSnapshot {
    families: Vec<(String, Vec<SeriesValue>)>,
    index: HashMap<String, usize>,
}

impl MetricSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a series value, replacing an entry with identical labels in place.
    pub fn set(&mut self, name: &str, labels: LabelSet, value: f64) {
        let position = match self.index.get(name) {
            Some(position) => *position,
            None => {
                self.families.push((name.to_string(), Vec::new()));
                self.index.insert(name.to_string(), self.families.len() - 1);
                self.families.len() - 1
            }
        };

        let series = &mut self.families[position].1;
        match series.iter_mut().find(|existing| existing.labels == labels) {
            Some(existing) => existing.value = value,
            None => series.push(SeriesValue { labels, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[SeriesValue]> {
        self.index
            .get(name)
            .map(|position| self.families[*position].1.as_slice())
    }

    pub fn value(&self, name: &str, labels: &LabelSet) -> Option<f64> {
        self.get(name)?
            .iter()
            .find(|series| series.labels == *labels)
            .map(|series| series.value)
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(|(name, _)| name.as_str())
    }

    pub fn series_count(&self) -> usize {
        self.families.iter().map(|(_, series)| series.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series_count() == 0
    }
}
