use serde::Serialize;

use crate::application::time::{calculate_weeks_in_month, day_label, leading_blank_days};
use crate::domain::models::{AssignmentMap, DateKey, MonthCursor};

/// One day on the month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCellDto {
    pub date: String,       // "2024-03-01"
    pub label: String,      // "Fri 01 Mar"
    pub is_weekend: bool,
    pub role: Option<String>,
}

/// One grid row, Sunday first. `None` = blank cell outside the month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekRowDto {
    pub days: Vec<Option<DayCellDto>>,
}

/// What the presentation layer renders for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGridDto {
    pub title: String, // "March 2024"
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<WeekRowDto>,
}

impl MonthGridDto {
    pub fn build(cursor: MonthCursor, assignments: &AssignmentMap) -> Self {
        let blanks = leading_blank_days(cursor) as usize;
        let rows = calculate_weeks_in_month(cursor) as usize;

        let mut cells: Vec<Option<DayCellDto>> = vec![None; blanks];
        cells.extend(cursor.days().map(|date| {
            let key = DateKey::new(date);
            Some(DayCellDto {
                date: key.to_string(),
                label: day_label(date),
                is_weekend: key.is_weekend(),
                role: assignments.get(&key).map(|r| r.to_string()),
            })
        }));
        cells.resize(rows * 7, None);

        let weeks = cells
            .chunks(7)
            .map(|week| WeekRowDto { days: week.to_vec() })
            .collect();

        Self {
            title: cursor.title(),
            year: cursor.year(),
            month: cursor.month(),
            weeks,
        }
    }

    /// Every filled cell in date order
    pub fn days(&self) -> impl Iterator<Item = &DayCellDto> {
        self.weeks.iter().flat_map(|w| w.days.iter().flatten())
    }
}

#[cfg(test)]
mod dto_tests {
    use super::*;
    use crate::domain::calendar_logic::generate_month;
    use crate::domain::models::Rotation;

    #[test]
    fn grid_places_march_2024() {
        let cursor = MonthCursor::new(2024, 3).unwrap();
        let rotation = Rotation::new(["A", "B", "C", "D"]).unwrap();
        let grid = MonthGridDto::build(cursor, &generate_month(cursor, &rotation));

        assert_eq!(grid.title, "March 2024");
        assert_eq!(grid.weeks.len(), 6);
        assert!(grid.weeks.iter().all(|w| w.days.len() == 7));

        // Friday of the first row
        let first = grid.weeks[0].days[5].as_ref().unwrap();
        assert_eq!(first.date, "2024-03-01");
        assert_eq!(first.role.as_deref(), Some("A"));

        let saturday = grid.weeks[0].days[6].as_ref().unwrap();
        assert!(saturday.is_weekend);
        assert_eq!(saturday.role, None);

        assert_eq!(grid.days().count(), 31);
    }
}
