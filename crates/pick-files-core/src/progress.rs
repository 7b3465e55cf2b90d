/// Trait for reporting run progress.
///
/// CLI implements with indicatif. All methods have default no-op
/// implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_progress(&self, _files_found: usize, _current_path: &str) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_select_complete(&self, _eligible: usize, _picked: usize) {}
    fn on_copy_start(&self, _total_files: usize) {}
    fn on_copy_progress(&self, _files_copied: usize, _total_files: usize) {}
    fn on_copy_complete(&self, _files_copied: usize, _duration_secs: f64) {}
    fn on_store_write_complete(&self, _records: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
