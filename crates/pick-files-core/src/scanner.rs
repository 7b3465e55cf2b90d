use crate::error::Error;
use crate::hasher;
use crate::model::FileRecord;
use crate::progress::ProgressReporter;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Remove directories that are subdirectories of other directories in the list.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for dir in dirs {
        let dir_path = Path::new(&dir);

        if result.iter().any(|kept| dir_path.starts_with(kept)) {
            debug!("Skipping {}: nested in another source folder", dir);
            continue;
        }

        result.retain(|kept| !Path::new(kept).starts_with(dir_path));
        result.push(dir);
    }

    result
}

/// Compile ignore globs, dropping (and logging) invalid ones.
pub fn compile_ignore_patterns(ignore_globs: &[String]) -> Vec<Pattern> {
    ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

/// Recursively walk `root_paths`, fingerprinting every regular file.
///
/// Every returned record has `last_seen == scan_time` and no `last_picked`.
/// Symbolic links are followed and recorded under the link's own path; a
/// link loop or dangling link is logged and skipped. A root that is missing or not a directory is a configuration error;
/// a single unreadable file is logged and left out. Results are sorted by
/// path.
pub fn scan_folders(
    root_paths: &[String],
    ignore_patterns: &[Pattern],
    scan_time: DateTime<Utc>,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<FileRecord>, Error> {
    for root in root_paths {
        if !Path::new(root).is_dir() {
            return Err(Error::MissingFolder(PathBuf::from(root)));
        }
    }

    let mut records: Vec<FileRecord> = Vec::new();

    for root in root_paths {
        debug!("Reading folder {}", root);
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_ignored(entry.path(), ignore_patterns));

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry under {}: {}", root, err);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                if !entry.file_type().is_dir() {
                    debug!("Skipping {}: not a regular file", entry.path().display());
                }
                continue;
            }

            let path = entry.path();
            match hasher::fingerprint_file(path) {
                Ok(fingerprint) => {
                    records.push(FileRecord::new(path, fingerprint, scan_time));
                    reporter.on_scan_progress(records.len(), &path.to_string_lossy());
                }
                Err(err) => {
                    warn!("Excluding {}: {}", path.display(), err);
                }
            }
        }
    }

    records.sort_by(|a, b| a.path.cmp(&b.path));
    warn_duplicate_names(&records);
    debug!(
        "Found {} files in folder(s) {}",
        records.len(),
        root_paths.join(",")
    );

    Ok(records)
}

fn is_ignored(path: &Path, ignore_patterns: &[Pattern]) -> bool {
    ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(path))
}

/// Warn about distinct paths sharing a base name; the records are not altered.
fn warn_duplicate_names(records: &[FileRecord]) -> usize {
    let mut first_seen: AHashMap<&str, &str> = AHashMap::new();
    let mut duplicates = 0;

    for record in records {
        match first_seen.get(record.name.as_str()) {
            Some(previous) => {
                warn!(
                    "Filename {} ({}) already read before at {}",
                    record.name, record.path, previous
                );
                duplicates += 1;
            }
            None => {
                first_seen.insert(&record.name, &record.path);
            }
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use std::fs;
    use tempfile::tempdir;

    fn paths(records: &[FileRecord]) -> Vec<String> {
        records.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_non_overlapping_no_overlap() {
        let dirs = vec![
            "/home/user/photos".to_string(),
            "/home/user/docs".to_string(),
            "/var/data".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_non_overlapping_with_subdirectory() {
        let dirs = vec![
            "/home/user/docs".to_string(),
            "/home/user".to_string(),
            "/var/data".to_string(),
            "/var/data/cache".to_string(),
        ];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result, vec!["/home/user".to_string(), "/var/data".to_string()]);
    }

    #[test]
    fn test_non_overlapping_is_component_wise() {
        let dirs = vec!["/srv/pics".to_string(), "/srv/pics2".to_string()];
        let result = non_overlapping_directories(dirs);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_scan_recurses_and_stamps_records() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("root");
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("top.txt"), "top").unwrap();
        fs::write(root.join("sub/mid.txt"), "mid").unwrap();
        fs::write(root.join("sub/deeper/low.txt"), "low").unwrap();

        let now = Utc::now();
        let roots = vec![root.to_string_lossy().into_owned()];
        let records = scan_folders(&roots, &[], now, &SilentReporter).unwrap();

        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.last_seen, now);
            assert!(record.last_picked.is_none());
            assert!(record.path.starts_with(&roots[0]));
        }
        let mut names = paths(&records);
        names.sort();
        assert_eq!(names, vec!["low.txt", "mid.txt", "top.txt"]);
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let tmp = tempdir().unwrap();
        let roots = vec![tmp.path().join("absent").to_string_lossy().into_owned()];
        let err = scan_folders(&roots, &[], Utc::now(), &SilentReporter).unwrap_err();
        assert!(matches!(err, Error::MissingFolder(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_scan_honours_ignore_patterns() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("root");
        fs::create_dir_all(root.join("keep")).unwrap();
        fs::create_dir_all(root.join("thumbs")).unwrap();
        fs::write(root.join("keep/a.jpg"), "a").unwrap();
        fs::write(root.join("thumbs/a_small.jpg"), "small").unwrap();
        fs::write(root.join("notes.tmp"), "tmp").unwrap();

        let patterns =
            compile_ignore_patterns(&["*/thumbs".to_string(), "*.tmp".to_string()]);
        let roots = vec![root.to_string_lossy().into_owned()];
        let records = scan_folders(&roots, &patterns, Utc::now(), &SilentReporter).unwrap();

        assert_eq!(paths(&records), vec!["a.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_symlinked_files() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("root");
        let elsewhere = tmp.path().join("elsewhere");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&elsewhere).unwrap();
        fs::write(elsewhere.join("real.jpg"), "pixels").unwrap();
        std::os::unix::fs::symlink(elsewhere.join("real.jpg"), root.join("link.jpg")).unwrap();
        std::os::unix::fs::symlink(root.join("missing.jpg"), root.join("dangling.jpg")).unwrap();

        let roots = vec![root.to_string_lossy().into_owned()];
        let records = scan_folders(&roots, &[], Utc::now(), &SilentReporter).unwrap();

        assert_eq!(paths(&records), vec!["link.jpg"]);
        assert_eq!(
            records[0].fingerprint,
            hasher::fingerprint_file(&elsewhere.join("real.jpg")).unwrap()
        );
    }

    #[test]
    fn test_invalid_glob_is_dropped() {
        let patterns = compile_ignore_patterns(&["[".to_string(), "*.bak".to_string()]);
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("same.txt"), "one").unwrap();
        fs::write(b.join("same.txt"), "two").unwrap();

        let roots = vec![
            a.to_string_lossy().into_owned(),
            b.to_string_lossy().into_owned(),
        ];
        let records = scan_folders(&roots, &[], Utc::now(), &SilentReporter).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(warn_duplicate_names(&records), 1);
    }
}
