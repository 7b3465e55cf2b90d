use crate::config::AppConfig;
use crate::error::Error;
use crate::expire;
use crate::model::FileRecord;
use crate::policy::SelectionPolicy;
use crate::progress::ProgressReporter;
use crate::reconcile;
use crate::scanner;
use crate::selector;
use crate::store::HistoryStore;
use chrono::Utc;
use rand::Rng;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct PickEngine {
    folders: Vec<String>,
    ignore_patterns: Vec<String>,
    policy: SelectionPolicy,
    store: HistoryStore,
}

#[derive(Debug)]
pub struct RunResult {
    pub scan_duration: Duration,
    pub select_duration: Duration,
    pub store_write_duration: Duration,
    pub total_files_scanned: usize,
    pub eligible_files: usize,
    pub picked: Vec<FileRecord>,
    pub placements: Vec<PathBuf>,
    pub expired_records: usize,
    pub history_size: usize,
}

impl PickEngine {
    pub fn new(folders: Vec<String>, policy: SelectionPolicy, store: HistoryStore) -> Self {
        Self {
            folders,
            ignore_patterns: Vec::new(),
            policy,
            store,
        }
    }

    pub fn from_config(config: &AppConfig, dry_run: bool) -> Result<Self, Error> {
        let folders = config.source_folders()?;
        let policy = config.selection_policy(dry_run)?;
        Ok(Self::new(folders, policy, config.history_store())
            .with_ignore_patterns(config.ignore_patterns.clone()))
    }

    pub fn with_ignore_patterns(mut self, ignore_patterns: Vec<String>) -> Self {
        self.ignore_patterns = ignore_patterns;
        self
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunResult, Error> {
        self.run_with_rng(&mut rand::rng(), reporter)
    }

    /// Run the full pipeline:
    /// 1. Load history
    /// 2. Scan source folders
    /// 3. Carry last-picked times onto the scan
    /// 4. Select and copy
    /// 5. Merge with history, expire, save
    ///
    /// Any error returns before the store is written.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunResult, Error> {
        self.policy.validate()?;
        if self.folders.is_empty() {
            return Err(Error::InvalidPolicy("no source folders given".to_string()));
        }

        let history = self.store.load()?;
        debug!("Loaded {} history records", history.len());

        // Phase 1: Scan
        info!("Scanning source folders: {:?}", self.folders);
        reporter.on_scan_start();
        let scan_start = Instant::now();
        let ignore_patterns = scanner::compile_ignore_patterns(&self.ignore_patterns);
        let scanned =
            scanner::scan_folders(&self.folders, &ignore_patterns, Utc::now(), reporter)?;
        let scan_duration = scan_start.elapsed();
        let total_files_scanned = scanned.len();
        reporter.on_scan_complete(total_files_scanned, scan_duration.as_secs_f64());

        // Phase 2: Reconcile + select
        let current = reconcile::refresh_picked(&history, scanned);
        let select_start = Instant::now();
        let selection = selector::select(current, &self.policy, Utc::now(), rng, reporter)?;
        let select_duration = select_start.elapsed();
        info!(
            "Considered {} eligible files and picked {}",
            selection.eligible,
            selection.picked.len()
        );

        // Phase 3: Merge, expire, persist
        let merged = reconcile::merge_history(history, selection.records);
        let merged_len = merged.len();
        let kept = expire::expire(merged, self.policy.retention, Utc::now());
        let expired_records = merged_len - kept.len();

        let write_start = Instant::now();
        self.store.save(&kept)?;
        let store_write_duration = write_start.elapsed();
        reporter.on_store_write_complete(kept.len(), store_write_duration.as_secs_f64());

        Ok(RunResult {
            scan_duration,
            select_duration,
            store_write_duration,
            total_files_scanned,
            eligible_files: selection.eligible,
            picked: selection.picked,
            placements: selection.placements,
            expired_records,
            history_size: kept.len(),
        })
    }
}
