use chrono::{DateTime, Datelike, Local, NaiveDate};
use crate::domain::models::MonthCursor;

/// Number of blank cells before day 1 on a Sunday-first grid
pub fn leading_blank_days(cursor: MonthCursor) -> u32 {
    cursor.first_day().weekday().num_days_from_sunday()
}

/// How many rows (weeks) the month needs on a Sunday-first grid.
///
/// ```text
///      March 2024
/// Su Mo Tu We Th Fr Sa
///                 1  2   < 5 blanks
///  3  4  5  6  7  8  9
/// 10 11 12 13 14 15 16
/// 17 18 19 20 21 22 23
/// 24 25 26 27 28 29 30
/// 31                     < 6 rows
/// ```
pub fn calculate_weeks_in_month(cursor: MonthCursor) -> u32 {
    let total_cells = cursor.days_in_month() + leading_blank_days(cursor);
    total_cells.div_ceil(7)
}

/// Short label for a grid cell, e.g. "Fri 01 Mar"
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a %d %b").to_string()
}

pub fn now_local() -> DateTime<Local> {
    Local::now()
}

#[cfg(test)]
mod time_tests {
    use super::*;

    #[test]
    fn march_2024_needs_six_rows() {
        let cursor = MonthCursor::new(2024, 3).unwrap();
        assert_eq!(leading_blank_days(cursor), 5);
        assert_eq!(calculate_weeks_in_month(cursor), 6);
    }

    #[test]
    fn february_2015_fits_four_rows() {
        // starts on a Sunday, 28 days
        assert_eq!(calculate_weeks_in_month(MonthCursor::new(2015, 2).unwrap()), 4);
    }

    #[test]
    fn labels_are_short() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(day_label(date), "Fri 01 Mar");
    }
}
