//! Late-fine computation for payment records.
//!
//! Fines accrue from the day after the due date at a steep initial rate,
//! flatten after five days, and stop accruing entirely at the 5th of the
//! month after the due date's month. The functions here are pure; the write
//! path in `payment_service` invokes [`derive`] explicitly on every save
//! that carries a paid date.

use chrono::NaiveDate;
use shared::PaymentStatus;

use crate::domain::schedule::fifth_of_following_month;

/// Per-day fine for the first five late days.
const INITIAL_DAILY_FINE: f64 = 100.0;
/// Per-day fine from the sixth late day onward.
const REDUCED_DAILY_FINE: f64 = 25.0;
/// Number of late days charged at the initial rate.
const INITIAL_TIER_DAYS: i64 = 5;

/// Fine owed for a payment made on `paid_date` against a deadline of
/// `due_date`.
///
/// Rules:
/// - Paid on or before the due date: no fine.
/// - Days 1-5 late: 100 per day.
/// - Days 6+ late: 500 for the first five days plus 25 per additional day.
/// - Accrual stops at the 5th of the month after the due date's month; a
///   payment made any later is fined only up to that boundary.
pub fn calculate_fine(paid_date: NaiveDate, due_date: NaiveDate) -> f64 {
    let mut days_late = (paid_date - due_date).num_days();

    if days_late <= 0 {
        return 0.0;
    }

    let stop_date = fifth_of_following_month(due_date);
    if paid_date > stop_date {
        days_late = (stop_date - due_date).num_days();
    }

    if days_late <= INITIAL_TIER_DAYS {
        days_late as f64 * INITIAL_DAILY_FINE
    } else {
        INITIAL_TIER_DAYS as f64 * INITIAL_DAILY_FINE
            + (days_late - INITIAL_TIER_DAYS) as f64 * REDUCED_DAILY_FINE
    }
}

/// Whether a payment with a recorded paid date was on time or late.
/// A record with no paid date stays `Pending` and never reaches this.
pub fn determine_status(paid_date: NaiveDate, due_date: NaiveDate) -> PaymentStatus {
    if (paid_date - due_date).num_days() <= 0 {
        PaymentStatus::OnTime
    } else {
        PaymentStatus::Late
    }
}

/// Fine and status together, exactly as the write path applies them.
pub fn derive(paid_date: NaiveDate, due_date: NaiveDate) -> (f64, PaymentStatus) {
    (
        calculate_fine(paid_date, due_date),
        determine_status(paid_date, due_date),
    )
}
