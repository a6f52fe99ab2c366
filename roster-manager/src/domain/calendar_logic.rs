use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::models::{AssignmentMap, DateKey, MonthCursor, Rotation};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadMode {
    /// Assign only dates that have no entry yet
    FillGaps,
    /// Throw the month away and generate it afresh
    Reset,
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Default assignment for one month: strict round robin over weekdays.
///
/// ```text
///      March 2024          rotation [A, B, C, D]
/// Mo Tu We Th Fr Sa Su
///              1  2  3     1:A  (2, 3 skipped)
///  4  5  6  7  8  9 10     4:B 5:C 6:D 7:A 8:B
/// ```
pub fn generate(year: i32, month: u32, rotation: &Rotation) -> Result<AssignmentMap> {
    Ok(generate_month(MonthCursor::new(year, month)?, rotation))
}

pub fn generate_month(cursor: MonthCursor, rotation: &Rotation) -> AssignmentMap {
    let mut assignments = AssignmentMap::new();
    preload_month(&mut assignments, cursor, rotation, PreloadMode::FillGaps);
    assignments
}

/// Materializes one month into `assignments`, returns how many dates were filled.
///
/// The rotation cursor starts at 0 for every month and only advances when a
/// gap is actually filled, so dates already holding a role are left alone and
/// do not consume a rotation slot.
pub fn preload_month(
    assignments: &mut AssignmentMap,
    cursor: MonthCursor,
    rotation: &Rotation,
    mode: PreloadMode,
) -> usize {
    if mode == PreloadMode::Reset {
        assignments.clear_month(cursor);
    }

    let mut rotation_cursor = 0;
    for date in cursor.days().filter(|d| is_weekday(*d)) {
        let key = DateKey::new(date);
        if assignments.contains(&key) {
            continue;
        }
        assignments.insert(key, rotation.role_at(rotation_cursor).clone());
        rotation_cursor += 1;
    }
    rotation_cursor
}

#[cfg(test)]
mod calendar_logic_tests {
    use super::*;
    use crate::domain::models::Role;

    fn rotation() -> Rotation {
        Rotation::new(["A", "B", "C", "D"]).unwrap()
    }

    fn key(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::from_ymd(y, m, d).unwrap()
    }

    fn role_on(map: &AssignmentMap, d: u32) -> Option<&str> {
        map.get(&key(2024, 3, d)).map(|r| r.as_str())
    }

    #[test]
    fn march_2024_round_robin() {
        let map = generate(2024, 3, &rotation()).unwrap();

        assert_eq!(role_on(&map, 1), Some("A"));
        assert_eq!(role_on(&map, 2), None);
        assert_eq!(role_on(&map, 3), None);
        assert_eq!(role_on(&map, 4), Some("B"));
        assert_eq!(role_on(&map, 5), Some("C"));
        assert_eq!(role_on(&map, 6), Some("D"));
        assert_eq!(role_on(&map, 7), Some("A"));
        assert_eq!(role_on(&map, 8), Some("B"));
        // 21 weekdays in March 2024
        assert_eq!(map.len(), 21);
    }

    #[test]
    fn every_weekday_once_and_no_weekend() {
        let rotation = rotation();
        for year in [2023, 2024, 2025] {
            for month in 1..=12 {
                let cursor = MonthCursor::new(year, month).unwrap();
                let map = generate_month(cursor, &rotation);

                let weekdays: Vec<NaiveDate> = cursor.days().filter(|d| is_weekday(*d)).collect();
                assert_eq!(map.len(), weekdays.len());
                for (i, date) in weekdays.iter().enumerate() {
                    assert_eq!(map.get(&DateKey::new(*date)), Some(rotation.role_at(i)));
                }
                assert!(map.iter().all(|(k, _)| !k.is_weekend()));
            }
        }
    }

    #[test]
    fn each_month_restarts_at_the_first_role() {
        let rotation = rotation();
        let mut map = generate(2024, 3, &rotation).unwrap();
        preload_month(&mut map, MonthCursor::new(2024, 4).unwrap(), &rotation, PreloadMode::FillGaps);

        // Mon 1 April 2024
        assert_eq!(map.get(&key(2024, 4, 1)).map(|r| r.as_str()), Some("A"));
    }

    #[test]
    fn fill_gaps_never_clobbers() {
        let rotation = rotation();
        let mut map = AssignmentMap::new();
        map.insert(key(2024, 3, 1), Role::new("D"));

        let filled = preload_month(&mut map, MonthCursor::new(2024, 3).unwrap(), &rotation, PreloadMode::FillGaps);

        assert_eq!(filled, 20);
        assert_eq!(role_on(&map, 1), Some("D"));
        // the occupied date did not consume a rotation slot
        assert_eq!(role_on(&map, 4), Some("A"));
    }

    #[test]
    fn reset_regenerates_the_month_only() {
        let rotation = rotation();
        let mut map = generate(2024, 3, &rotation).unwrap();
        map.insert(key(2024, 3, 4), Role::new("D"));
        map.insert(key(2024, 4, 1), Role::new("C"));

        preload_month(&mut map, MonthCursor::new(2024, 3).unwrap(), &rotation, PreloadMode::Reset);

        assert_eq!(role_on(&map, 4), Some("B"));
        assert_eq!(map.get(&key(2024, 4, 1)).map(|r| r.as_str()), Some("C"));
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(generate(2024, 0, &rotation()).is_err());
    }
}
