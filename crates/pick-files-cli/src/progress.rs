use indicatif::{ProgressBar, ProgressStyle};
use pick_files_core::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan phase: spinner (unknown total files upfront)
/// - Copy phase: progress bar (number of picks known)
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .progress_chars("━╸─")
        .tick_chars(TICK_CHARS)
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(style("{spinner:.cyan} {msg}"));
        pb.set_message("Scanning files...");
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_scan_progress(&self, files_found: usize, _current_path: &str) {
        self.with_bar(|pb| pb.set_message(format!("Scanning... {} files found", files_found)));
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files in {:.2}s",
            total_files, duration_secs
        );
    }

    fn on_select_complete(&self, eligible: usize, picked: usize) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Selection complete: {} of {} eligible files picked",
            picked, eligible
        );
    }

    fn on_copy_start(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        pb.set_style(style(
            "  {spinner:.cyan} Copying [{bar:30.cyan/dim}] {pos}/{len} files",
        ));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_copy_progress(&self, files_copied: usize, _total_files: usize) {
        self.with_bar(|pb| pb.set_position(files_copied as u64));
    }

    fn on_copy_complete(&self, files_copied: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Copy complete: {} files in {:.2}s",
            files_copied, duration_secs
        );
    }

    fn on_store_write_complete(&self, records: usize, duration_secs: f64) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m History write complete: {} records in {:.2}s",
            records, duration_secs
        );
    }
}

impl Drop for CliReporter {
    fn drop(&mut self) {
        self.finish_bar();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropping_reporter_finishes_open_bar() {
        let reporter = CliReporter::new();
        reporter.on_copy_start(3);
        reporter.on_copy_progress(1, 3);
        let bar = reporter.bar.lock().unwrap().clone().unwrap();
        assert!(!bar.is_finished());

        // A failed copy never reaches on_copy_complete
        drop(reporter);
        assert!(bar.is_finished());
    }
}
