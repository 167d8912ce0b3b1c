//! Schedule-conflict detection for candidate acceptors.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Shift, ShiftStatus};

/// Half-open interval overlap: `[a_start, a_end)` intersects
/// `[b_start, b_end)`. Back-to-back shifts (one ends exactly when the
/// other starts) do not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Scan a candidate's shifts for one that collides with the window of
/// the shift being transferred. Only `SCHEDULED` shifts count, and the
/// shift the candidate is offering in return (`excluding`) is skipped:
/// it leaves their schedule if the swap completes.
pub fn find_conflict<'a>(
    existing: &'a [Shift],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    excluding: Option<Uuid>,
) -> Option<&'a Shift> {
    existing.iter().find(|shift| {
        shift.status == ShiftStatus::Scheduled
            && Some(shift.id) != excluding
            && overlaps(shift.starts_at, shift.ends_at, window_start, window_end)
    })
}
