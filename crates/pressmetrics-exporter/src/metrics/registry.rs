use std::collections::HashMap;

use pressmetrics_common::{ExporterError, Result};

use crate::metrics::types::{MetricDefinition, MetricKind};

/// Known metrics in definition order. Built once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct MetricRegistry {
    definitions: Vec<MetricDefinition>,
    index: HashMap<String, usize>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, kind: MetricKind, help: &str) -> Result<()> {
        if !is_valid_metric_name(name) {
            return Err(ExporterError::InvalidArgument(format!(
                "invalid metric name: {name}"
            )));
        }

        if self.index.contains_key(name) {
            return Err(ExporterError::InvalidArgument(format!(
                "metric already registered: {name}"
            )));
        }

        self.index.insert(name.to_string(), self.definitions.len());
        self.definitions.push(MetricDefinition {
            name: name.to_string(),
            kind,
            help: help.to_string(),
        });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&MetricDefinition> {
        self.index
            .get(name)
            .map(|position| &self.definitions[*position])
            .ok_or_else(|| ExporterError::UnknownMetric(name.to_string()))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == ':' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == ':')
}
