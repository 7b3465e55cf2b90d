use crate::model::FileRecord;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

/// Keep records seen less than `max_age` before `now`.
pub fn expire(records: Vec<FileRecord>, max_age: Duration, now: DateTime<Utc>) -> Vec<FileRecord> {
    debug!("Expiring files not seen for more than {:?}", max_age);
    records
        .into_iter()
        .filter(|record| {
            let keep = match now.signed_duration_since(record.last_seen).to_std() {
                Ok(age) => age < max_age,
                Err(_) => true,
            };
            if !keep {
                debug!("Expiring {} ({})", record.path, record.fingerprint);
            }
            keep
        })
        .collect()
}
