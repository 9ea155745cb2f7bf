//! Ad lifecycle rules — derived temporal fields.
//!
//! The canonical temporal model is the derived end date: the caller supplies
//! `start_date` and `working_days`, and `end_date = start_date +
//! working_days` days, recomputed whenever either input changes. The
//! recomputation is pure and idempotent. Status is never auto-transitioned
//! by date.

use chrono::{Days, NaiveDate};

use crate::models::ad::{Ad, UpdateAd};

/// Derived end date for a campaign schedule.
///
/// `working_days` is validated to be ≥ 1 before it gets here; a negative
/// input clamps to the start date itself.
pub fn end_date(start_date: NaiveDate, working_days: i64) -> NaiveDate {
    let days = working_days.max(0) as u64;
    start_date
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

/// Days left until the end date, floored at zero. Display-only; never
/// stored.
pub fn remaining_days(end: NaiveDate, today: NaiveDate) -> i64 {
    (end - today).num_days().max(0)
}

/// Fold a schedule change into an update: if either `start_date` or
/// `working_days` moves, the end date is recomputed from the effective pair
/// so the store applies both atomically.
pub fn apply_schedule_change(current: &Ad, mut update: UpdateAd) -> UpdateAd {
    if update.start_date.is_some() || update.working_days.is_some() {
        let start = update.start_date.unwrap_or(current.start_date);
        let days = update.working_days.unwrap_or(current.working_days);
        update.end_date = Some(end_date(start, days));
    }
    update
}
