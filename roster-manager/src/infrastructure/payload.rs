// =====================
// Remote payload adapter
// =====================
//
// Remote stores answer a read with one of two JSON shapes:
//
//   {"2024-03-04": "DC", "2024-03-05": "2IC"}                         mapping
//   [{"from": "2024-03-04", "to": "2024-03-05",
//     "person": "DC", "swappedWith": "2IC"}]                          records
//
// Both are parsed here and normalized into `BackendSnapshot` so nothing past
// this module ever sees the raw strings.

use std::collections::BTreeMap;

use chrono::DateTime;
use serde::Deserialize;

use crate::domain::models::{AssignmentMap, BackendSnapshot, DateKey, Role, SwapRecord};
use crate::error::{Result, RosterError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSnapshot {
    Mapping(BTreeMap<String, String>),
    Records(Vec<RawSwapRecord>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSwapRecord {
    from: String,
    to: String,
    person: String,
    #[serde(default)]
    swapped_with: Option<String>,
}

pub fn parse_snapshot(body: &str) -> Result<BackendSnapshot> {
    let raw: RawSnapshot = serde_json::from_str(body)
        .map_err(|e| RosterError::MalformedBackendPayload(e.to_string()))?;

    match raw {
        RawSnapshot::Mapping(entries) => {
            let mut assignments = AssignmentMap::new();
            for (date, role) in entries {
                // blank cells are gaps, preload fills them later
                if let Some(role) = non_blank(&role) {
                    assignments.insert(parse_date_key(&date)?, role);
                }
            }
            Ok(BackendSnapshot::Mapping(assignments))
        }
        RawSnapshot::Records(rows) => rows
            .into_iter()
            .map(|row| {
                Ok(SwapRecord {
                    from: parse_date_key(&row.from)?,
                    to: parse_date_key(&row.to)?,
                    person: non_blank(&row.person).ok_or_else(|| {
                        RosterError::MalformedBackendPayload("record without person".to_string())
                    })?,
                    swapped_with: row.swapped_with.as_deref().and_then(non_blank),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(BackendSnapshot::RecordList),
    }
}

/// Accepts `YYYY-MM-DD`, or a full RFC 3339 timestamp as spreadsheet readers
/// return it. A timestamp is reduced to its *local* calendar day, never to the
/// UTC day, otherwise a swap lands one day off.
pub fn parse_date_key(raw: &str) -> Result<DateKey> {
    if let Some(key) = DateKey::parse(raw) {
        return Ok(key);
    }
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|at| DateKey::from_local(&at))
        .map_err(|_| RosterError::MalformedBackendPayload(format!("bad date key {:?}", raw)))
}

fn non_blank(raw: &str) -> Option<Role> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "undefined" || raw == "null" {
        None
    } else {
        Some(Role::new(raw))
    }
}
