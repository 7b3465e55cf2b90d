use crate::model::FileRecord;
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseStatistics {
    pub entries: usize,
    pub disk_size: Option<u64>,
    pub never_picked: usize,
    pub oldest_last_seen: Option<DateTime<Utc>>,
    pub oldest_last_picked: Option<DateTime<Utc>>,
}

impl DatabaseStatistics {
    pub fn compute(records: &[FileRecord], disk_size: Option<u64>) -> Self {
        Self {
            entries: records.len(),
            disk_size,
            never_picked: records.iter().filter(|r| r.last_picked.is_none()).count(),
            oldest_last_seen: records.iter().map(|r| r.last_seen).min(),
            oldest_last_picked: records.iter().filter_map(|r| r.last_picked).min(),
        }
    }
}

impl fmt::Display for DatabaseStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The database has {} entries", self.entries)?;
        match self.disk_size {
            Some(size) => writeln!(f, "Disk usage: {} bytes", size)?,
            None => writeln!(f, "Disk usage: unknown")?,
        }
        writeln!(f, "Never picked: {}", self.never_picked)?;
        writeln!(f, "Oldest last seen: {}", display_time(self.oldest_last_seen))?;
        write!(f, "Oldest last picked: {}", display_time(self.oldest_last_picked))
    }
}

fn display_time(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string())
}
