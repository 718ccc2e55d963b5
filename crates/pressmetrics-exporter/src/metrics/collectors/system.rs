use crate::metrics::{
    catalog::{EXPORTER_MEMORY_PEAK_BYTES, EXPORTER_MEMORY_USAGE_BYTES},
    collectors::{LiveSample, LiveSource},
};

/// Memory of the exporter process itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCollector;

impl LiveSource for SystemCollector {
    fn collect(&self) -> Vec<LiveSample> {
        let Some(memory) = read_process_memory() else {
            return Vec::new();
        };

        let mut samples = Vec::new();
        if let Some(resident) = memory.resident_bytes {
            samples.push(LiveSample::new(EXPORTER_MEMORY_USAGE_BYTES, resident as f64));
        }
        if let Some(peak) = memory.peak_bytes {
            samples.push(LiveSample::new(EXPORTER_MEMORY_PEAK_BYTES, peak as f64));
        }
        samples
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ProcessMemory {
    resident_bytes: Option<u64>,
    peak_bytes: Option<u64>,
}

#[cfg(target_os = "linux")]
fn read_process_memory() -> Option<ProcessMemory> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    Some(parse_status(&status))
}

#[cfg(not(target_os = "linux"))]
fn read_process_memory() -> Option<ProcessMemory> {
    None
}

fn parse_status(status: &str) -> ProcessMemory {
    let mut memory = ProcessMemory::default();
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            memory.resident_bytes = parse_kilobytes(rest);
        } else if let Some(rest) = line.strip_prefix("VmHWM:") {
            memory.peak_bytes = parse_kilobytes(rest);
        }
    }
    memory
}

fn parse_kilobytes(field: &str) -> Option<u64> {
    field
        .split_whitespace()
        .next()
        .and_then(|value| value.parse::<u64>().ok())?
        .checked_mul(1024)
}
