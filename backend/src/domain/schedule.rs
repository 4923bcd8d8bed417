//! Contribution schedule date logic.
//!
//! All date arithmetic for billing periods lives here: normalizing a month
//! to its first day, deriving the payment deadline for a period, and the
//! matching cutoff used by fine accrual.

use chrono::{Datelike, NaiveDate};

/// Normalize a date to the first day of its calendar month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("day 1 exists in every month")
}

/// The 5th day of the calendar month after `date`'s month, rolling December
/// over into January of the next year.
pub fn fifth_of_following_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 5).expect("day 5 exists in every month")
}

/// Default payment deadline for a contribution month.
pub fn default_due_date(month: NaiveDate) -> NaiveDate {
    fifth_of_following_month(month)
}

/// Human-readable label for a contribution month, e.g. "June 2024".
pub fn month_label(month: NaiveDate) -> String {
    month.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn month_start_normalizes_to_first_day() {
        assert_eq!(month_start(date(2024, 6, 15)), date(2024, 6, 1));
        assert_eq!(month_start(date(2024, 6, 1)), date(2024, 6, 1));
    }

    #[test]
    fn due_date_is_fifth_of_following_month() {
        assert_eq!(default_due_date(date(2024, 6, 1)), date(2024, 7, 5));
    }

    #[test]
    fn december_rolls_over_to_january() {
        assert_eq!(default_due_date(date(2024, 12, 1)), date(2025, 1, 5));
    }

    #[test]
    fn label_formats_month_and_year() {
        assert_eq!(month_label(date(2024, 6, 1)), "June 2024");
        assert_eq!(month_label(date(2025, 1, 1)), "January 2025");
    }
}
