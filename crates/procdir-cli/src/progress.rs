use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use procdir_core::placement::FilePlacement;
use procdir_core::{PlacementReport, ProgressReporter};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Registry scan: spinner (process count unknown upfront)
/// - Placement: bar over the files of the batch
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.slot();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.slot().take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for CliReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars(TICK_CHARS));
        }
        pb.set_message("Scanning process folders...");
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_scan_complete(&self, processes: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Scan complete: {} processes in {:.2}s",
            "✓".green(),
            processes,
            duration_secs
        );
    }

    fn on_place_start(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Placing [{bar:30.cyan/dim}] {pos}/{len} files",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_file_placed(&self, entry: &FilePlacement) {
        if let Some(pb) = self.slot().as_ref() {
            pb.set_message(entry.file.clone());
            pb.inc(1);
        }
    }

    fn on_place_complete(&self, report: &PlacementReport) {
        self.finish_bar();
        eprintln!(
            "  {} Placement complete: {} stored, {} skipped, {} rejected",
            "✓".green(),
            report.stored_count(),
            report.skipped_count(),
            report.rejected_count()
        );
    }
}
