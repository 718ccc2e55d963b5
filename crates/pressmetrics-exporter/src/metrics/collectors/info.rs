use crate::metrics::{
    catalog::PLUGIN_INFO,
    collectors::{LiveSample, LiveSource},
};

/// Version of the exporter itself, emitted as a constant info metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExporterInfo;

impl LiveSource for ExporterInfo {
    fn collect(&self) -> Vec<LiveSample> {
        vec![LiveSample::new(PLUGIN_INFO, 1.0).with_label("version", env!("CARGO_PKG_VERSION"))]
    }
}
