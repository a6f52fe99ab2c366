use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::models::{DateKey, Role, SwapRecord};

pub const CSV_HEADER: &str = "timestamp,person,from_date,to_date,swapped_with";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapHistoryEntry {
    pub timestamp: DateTime<Local>,
    pub requesting_role: Role,
    pub from: DateKey,
    pub to: DateKey,
    pub counterparty_role: Option<Role>,
}

impl SwapHistoryEntry {
    pub fn to_record(&self) -> SwapRecord {
        SwapRecord {
            from: self.from,
            to: self.to,
            person: self.requesting_role.clone(),
            swapped_with: self.counterparty_role.clone(),
        }
    }

    pub fn to_csv_row(&self) -> String {
        let timestamp = self.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let from = self.from.to_string();
        let to = self.to.to_string();
        let counterparty = self
            .counterparty_role
            .as_ref()
            .map(Role::as_str)
            .unwrap_or("");

        [
            timestamp.as_str(),
            self.requesting_role.as_str(),
            from.as_str(),
            to.as_str(),
            counterparty,
        ]
        .iter()
        .map(|v| quote(v))
        .collect::<Vec<_>>()
        .join(",")
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Append-only log of the swaps applied during this session
#[derive(Debug, Default)]
pub struct SwapHistory {
    entries: Vec<SwapHistoryEntry>,
}

impl SwapHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: SwapHistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SwapHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header plus one CSV row per entry, oldest first
    pub fn export(&self) -> Vec<String> {
        std::iter::once(CSV_HEADER.to_string())
            .chain(self.entries.iter().map(SwapHistoryEntry::to_csv_row))
            .collect()
    }
}

#[cfg(test)]
mod swap_history_tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(from: u32, to: u32, person: &str, with: Option<&str>) -> SwapHistoryEntry {
        SwapHistoryEntry {
            timestamp: Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            requesting_role: Role::new(person),
            from: DateKey::from_ymd(2024, 3, from).unwrap(),
            to: DateKey::from_ymd(2024, 3, to).unwrap(),
            counterparty_role: with.map(Role::new),
        }
    }

    #[test]
    fn export_empty_is_header_only() {
        assert_eq!(SwapHistory::new().export(), vec![CSV_HEADER.to_string()]);
    }

    #[test]
    fn export_keeps_append_order_and_field_order() {
        let mut history = SwapHistory::new();
        history.append(entry(4, 5, "B", Some("C")));
        history.append(entry(6, 9, "HD DCS", None));

        let lines = history.export();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,person,from_date,to_date,swapped_with");
        assert_eq!(
            lines[1],
            r#""2024-03-01 09:30:00","B","2024-03-04","2024-03-05","C""#
        );
        assert_eq!(
            lines[2],
            r#""2024-03-01 09:30:00","HD DCS","2024-03-06","2024-03-09","""#
        );
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote(r#"a"b"#), r#""a""b""#);
    }
}
