use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// History entries not seen for this long are expired.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(120 * 24 * 60 * 60);

/// What to do with a destination folder that already has entries.
///
/// Only `Append` renames on a name collision. Under `Fail` and
/// `OverwriteClear`, two picks sharing a base name (from different source
/// folders) abort the run with `NameCollision` at the second copy and no
/// history is saved; use `Append` when folders repeat file names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Abort before copying anything.
    #[default]
    #[serde(alias = "panic")]
    Fail,
    /// Copy alongside existing entries, renaming on collision.
    Append,
    /// Delete every existing entry first.
    #[serde(alias = "delete")]
    OverwriteClear,
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::Fail => "fail",
            ConflictPolicy::Append => "append",
            ConflictPolicy::OverwriteClear => "overwrite-clear",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" | "panic" => Ok(ConflictPolicy::Fail),
            "append" => Ok(ConflictPolicy::Append),
            "overwrite-clear" | "delete" => Ok(ConflictPolicy::OverwriteClear),
            other => Err(Error::InvalidPolicy(format!(
                "unknown destination option '{}' (expected fail, append or overwrite-clear)",
                other
            ))),
        }
    }
}

/// Strip leading dots, so `.jpg` and `jpg` name the same suffix.
pub fn normalize_suffix(suffix: &str) -> String {
    suffix.trim_start_matches('.').to_string()
}

/// Everything one run needs to know about what to pick and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub count: usize,
    /// Dot-stripped, matched case-sensitively against the end of the path.
    pub suffixes: Vec<String>,
    /// Zero disables blocking.
    pub block_duration: Duration,
    pub destination: PathBuf,
    pub conflict_policy: ConflictPolicy,
    pub dry_run: bool,
    pub retention: Duration,
}

impl SelectionPolicy {
    pub fn new(count: usize, destination: impl Into<PathBuf>) -> Self {
        Self {
            count,
            suffixes: Vec::new(),
            block_duration: Duration::ZERO,
            destination: destination.into(),
            conflict_policy: ConflictPolicy::default(),
            dry_run: false,
            retention: DEFAULT_RETENTION,
        }
    }

    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.suffixes = suffixes
            .into_iter()
            .map(|s| normalize_suffix(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn with_block_duration(mut self, block_duration: Duration) -> Self {
        self.block_duration = block_duration;
        self
    }

    pub fn with_conflict_policy(mut self, conflict_policy: ConflictPolicy) -> Self {
        self.conflict_policy = conflict_policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.count == 0 {
            return Err(Error::InvalidPolicy(
                "number of files to pick must be positive".to_string(),
            ));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(Error::InvalidPolicy("destination must not be empty".to_string()));
        }
        if self.retention.is_zero() {
            return Err(Error::InvalidPolicy("retention must be positive".to_string()));
        }
        Ok(())
    }

    /// True when no suffix filter is set or `path` ends in `.<suffix>`.
    pub fn matches_suffix(&self, path: &str) -> bool {
        if self.suffixes.is_empty() {
            return true;
        }
        self.suffixes.iter().any(|suffix| {
            path.strip_suffix(suffix.as_str())
                .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_policy_parsing_accepts_legacy_names() {
        assert_eq!("fail".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Fail);
        assert_eq!("panic".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Fail);
        assert_eq!("append".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Append);
        assert_eq!(
            "delete".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::OverwriteClear
        );
        assert!("merge".parse::<ConflictPolicy>().is_err());
    }

    #[test]
    fn test_suffix_match_is_dot_stripped_and_case_sensitive() {
        let policy = SelectionPolicy::new(1, "out").with_suffixes([".jpg", "avi"]);
        assert_eq!(policy.suffixes, vec!["jpg".to_string(), "avi".to_string()]);
        assert!(policy.matches_suffix("photos/beach.jpg"));
        assert!(policy.matches_suffix("clips/a.b.avi"));
        assert!(!policy.matches_suffix("photos/beach.JPG"));
        assert!(!policy.matches_suffix("photos/beachjpg"));
        assert!(!policy.matches_suffix("photos/beach.jpeg"));
    }

    #[test]
    fn test_empty_suffix_list_matches_everything() {
        let policy = SelectionPolicy::new(1, "out");
        assert!(policy.matches_suffix("anything"));
        assert!(policy.matches_suffix("dir/file.txt"));
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        let err = SelectionPolicy::new(0, "out").validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(SelectionPolicy::new(3, "out").validate().is_ok());
    }
}
