use crate::error::Error;
use crate::model::FileRecord;
use crate::placer;
use crate::policy::SelectionPolicy;
use crate::progress::ProgressReporter;
use ahash::AHashSet;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of one selection.
#[derive(Debug)]
pub struct Selection {
    /// Every input record; picked ones carry their new `last_picked` unless
    /// the run was dry.
    pub records: Vec<FileRecord>,
    /// Drawn records in draw order, no two from the same slot.
    pub picked: Vec<FileRecord>,
    /// Where each picked record was copied; empty on a dry run.
    pub placements: Vec<PathBuf>,
    /// Size of the eligible pool before drawing.
    pub eligible: usize,
}

/// True when `last_picked` lies less than `window` before `now`. Timestamps
/// in the future count as recent.
pub fn picked_within(
    last_picked: Option<DateTime<Utc>>,
    window: Duration,
    now: DateTime<Utc>,
) -> bool {
    match last_picked {
        None => false,
        Some(picked) => match now.signed_duration_since(picked).to_std() {
            Ok(elapsed) => elapsed < window,
            Err(_) => true,
        },
    }
}

/// Indices of records passing the suffix and block-duration filters, one
/// per fingerprint.
///
/// When several paths share content, only the first one in `records` order
/// that passes the filters enters the pool; that is the path that gets
/// copied.
pub fn eligible_indices(
    records: &[FileRecord],
    policy: &SelectionPolicy,
    now: DateTime<Utc>,
) -> Vec<usize> {
    let blocking = !policy.block_duration.is_zero();
    if !blocking {
        debug!("No block selection duration set");
    }

    let mut seen: AHashSet<&str> = AHashSet::new();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| policy.matches_suffix(&record.path))
        .filter(|(_, record)| {
            if blocking && picked_within(record.last_picked, policy.block_duration, now) {
                debug!("{} was picked recently; skipping", record.path);
                return false;
            }
            true
        })
        .filter(|(_, record)| {
            if !seen.insert(record.fingerprint.as_str()) {
                debug!("{} has the same content as another candidate; skipping", record.path);
                return false;
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}

/// Draw up to `count` entries from `pool` uniformly without replacement.
///
/// Each draw picks a random slot and removes it with `swap_remove`, so the
/// pool shrinks by one in O(1) and a drawn entry can't come up again.
pub fn draw<R: Rng + ?Sized>(mut pool: Vec<usize>, count: usize, rng: &mut R) -> Vec<usize> {
    let mut drawn = Vec::with_capacity(count.min(pool.len()));
    for _ in 0..count {
        if pool.is_empty() {
            warn!("Ran out of eligible files after picking {}", drawn.len());
            break;
        }
        let slot = rng.random_range(0..pool.len());
        drawn.push(pool.swap_remove(slot));
    }
    drawn
}

/// Filter, draw and (unless dry) copy the picks into the destination.
///
/// The destination is prepared once, before the first copy, and only when
/// something was drawn. A copy failure aborts with the error; files already
/// copied stay where they are.
pub fn select<R: Rng + ?Sized>(
    mut records: Vec<FileRecord>,
    policy: &SelectionPolicy,
    now: DateTime<Utc>,
    rng: &mut R,
    reporter: &dyn ProgressReporter,
) -> Result<Selection, Error> {
    let pool = eligible_indices(&records, policy, now);
    let eligible = pool.len();
    debug!("Considering {} of {} files for picking", eligible, records.len());

    let drawn = draw(pool, policy.count, rng);
    reporter.on_select_complete(eligible, drawn.len());
    let mut placements = Vec::new();

    if drawn.is_empty() {
        info!("Could not find any eligible files");
    } else if policy.dry_run {
        info!("Dry run, skipping copying of files");
        for &i in &drawn {
            info!("Would pick {}", records[i].path);
        }
    } else {
        placer::prepare_destination(&policy.destination, policy.conflict_policy)?;

        let copy_start = Instant::now();
        reporter.on_copy_start(drawn.len());
        for (n, &i) in drawn.iter().enumerate() {
            let record = &mut records[i];
            let placed = placer::place_file(
                Path::new(&record.path),
                &policy.destination,
                &record.name,
                policy.conflict_policy,
            )?;
            record.last_picked = Some(Utc::now());
            info!("Picked {} -> {}", record.path, placed.display());
            placements.push(placed);
            reporter.on_copy_progress(n + 1, drawn.len());
        }
        reporter.on_copy_complete(placements.len(), copy_start.elapsed().as_secs_f64());
    }

    let picked = drawn.iter().map(|&i| records[i].clone()).collect();

    Ok(Selection {
        records,
        picked,
        placements,
        eligible,
    })
}
