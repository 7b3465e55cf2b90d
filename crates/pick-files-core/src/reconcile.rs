//! Reconciliation of a fresh scan with the persisted history.
//!
//! Both operations key records by fingerprint. Identical content under two
//! different names is one logical file here: its history collapses into a
//! single entry.

use crate::model::FileRecord;
use ahash::AHashMap;

/// Annotate the current scan with history: every record in `new` whose
/// fingerprint appears in `old` takes over the old `last_picked`. Records
/// only present in `old` are not part of the result.
pub fn refresh_picked(old: &[FileRecord], new: Vec<FileRecord>) -> Vec<FileRecord> {
    let mut picked_by_fingerprint: AHashMap<&str, &FileRecord> = AHashMap::new();
    for record in old {
        picked_by_fingerprint
            .entry(record.fingerprint.as_str())
            .or_insert(record);
    }

    new.into_iter()
        .map(|mut record| {
            if let Some(previous) = picked_by_fingerprint.get(record.fingerprint.as_str()) {
                record.last_picked = previous.last_picked;
            }
            record
        })
        .collect()
}

/// Union of `a` and `b` by fingerprint with newest-wins timestamps.
///
/// Output order is `a` (first occurrence of each fingerprint) followed by the
/// fingerprints only `b` contains. Name and path come from whichever side was
/// seen last, `a` on a tie.
pub fn merge_history(a: Vec<FileRecord>, b: Vec<FileRecord>) -> Vec<FileRecord> {
    let mut merged: Vec<FileRecord> = Vec::with_capacity(a.len() + b.len());
    let mut index: AHashMap<String, usize> = AHashMap::new();

    for record in a.into_iter().chain(b) {
        match index.get(&record.fingerprint) {
            Some(&i) => merge_into(&mut merged[i], record),
            None => {
                index.insert(record.fingerprint.clone(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

fn merge_into(target: &mut FileRecord, other: FileRecord) {
    if other.last_seen > target.last_seen {
        target.name = other.name;
        target.path = other.path;
        target.last_seen = other.last_seen;
    }
    // None orders before any timestamp
    if other.last_picked > target.last_picked {
        target.last_picked = other.last_picked;
    }
}
