use crate::placement::{FilePlacement, PlacementReport};

/// Trait for reporting registry scans and file placement.
///
/// The CLI implements it with indicatif bars. All methods have default no-op
/// implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _processes: usize, _duration_secs: f64) {}
    fn on_place_start(&self, _total_files: usize) {}
    fn on_file_placed(&self, _entry: &FilePlacement) {}
    fn on_place_complete(&self, _report: &PlacementReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
