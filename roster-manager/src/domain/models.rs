// =====================
// Domain model definitions
// =====================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, TimeZone, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, RosterError};

/// A duty title occupying one slot of the rotation (e.g. "DC", "2IC")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Role::new(name)
    }
}

/// Fixed, ordered list of roles cycled across weekdays.
/// Never empty and never contains the same role twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation(Vec<Role>);

impl Rotation {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roles: Vec<Role> = names.into_iter().map(|n| Role::new(n.as_ref())).collect();

        if roles.is_empty() {
            return Err(RosterError::Config(
                "rotation must contain at least one role".to_string(),
            ));
        }
        if roles.iter().any(|r| r.as_str().is_empty()) {
            return Err(RosterError::Config("rotation contains a blank role".to_string()));
        }
        for (i, role) in roles.iter().enumerate() {
            if roles[..i].contains(role) {
                return Err(RosterError::Config(format!(
                    "rotation lists {} more than once",
                    role
                )));
            }
        }
        Ok(Self(roles))
    }

    /// Role for the given rotation cursor, wrapping around the list
    pub fn role_at(&self, cursor: usize) -> &Role {
        &self.0[cursor % self.0.len()]
    }

    pub fn roles(&self) -> &[Role] {
        &self.0
    }

    pub fn find(&self, name: &str) -> Option<&Role> {
        let name = name.trim();
        self.0.iter().find(|r| r.as_str() == name)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self(
            ["DC", "2IC", "DSM", "HD DCS"]
                .iter()
                .map(|n| Role::new(n))
                .collect(),
        )
    }
}

/// A local calendar day, always rendered as `YYYY-MM-DD`.
///
/// Every constructor goes through the local calendar day so that two
/// representations of the same local day produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Normalizes an instant to the day it falls on in the local time zone
    pub fn from_local<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self(at.with_timezone(&Local).date_naive())
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// `None` for anything that is not a `YYYY-MM-DD` date
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.0.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, Self::FORMAT).map(Self)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// (year, month) of the materialized / displayed month.
/// Holds the first day of the month so it is always a valid month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthCursor(NaiveDate);

impl MonthCursor {
    /// `month` is 1 (January) to 12 (December)
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or(RosterError::InvalidMonth { year, month })
    }

    pub fn current() -> Self {
        Self::containing(&DateKey::today())
    }

    pub fn containing(key: &DateKey) -> Self {
        // day 1 always exists for a month that already holds `key`
        Self(key.0 - chrono::Duration::days(i64::from(key.0.day0())))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Moves by `months` (negative goes back), wrapping across years.
    /// Stays put if the result would leave chrono's supported range.
    pub fn offset(self, months: i32) -> Self {
        let step = Months::new(months.unsigned_abs());
        let moved = if months >= 0 {
            self.0.checked_add_months(step)
        } else {
            self.0.checked_sub_months(step)
        };
        moved.map(Self).unwrap_or(self)
    }

    /// Every calendar day of the month, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.month();
        self.0.iter_days().take_while(move |d| d.month() == month)
    }

    pub fn days_in_month(&self) -> u32 {
        self.days().count() as u32
    }

    pub fn contains(&self, key: &DateKey) -> bool {
        key.0.year() == self.year() && key.0.month() == self.month()
    }

    /// e.g. "March 2024"
    pub fn title(&self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

/// date -> assigned role, ordered by date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentMap(BTreeMap<DateKey, Role>);

impl AssignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &DateKey) -> Option<&Role> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &DateKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: DateKey, role: Role) -> Option<Role> {
        self.0.insert(key, role)
    }

    pub fn remove(&mut self, key: &DateKey) -> Option<Role> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &Role)> {
        self.0.iter()
    }

    /// Entries falling inside one month
    pub fn month_entries(&self, cursor: MonthCursor) -> impl Iterator<Item = (&DateKey, &Role)> {
        self.0.iter().filter(move |(k, _)| cursor.contains(k))
    }

    /// Drops every entry of one month, returns how many were removed
    pub fn clear_month(&mut self, cursor: MonthCursor) -> usize {
        let before = self.0.len();
        self.0.retain(|k, _| !cursor.contains(k));
        before - self.0.len()
    }
}

impl FromIterator<(DateKey, Role)> for AssignmentMap {
    fn from_iter<I: IntoIterator<Item = (DateKey, Role)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An applied swap in the form shared backends store and return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRecord {
    pub from: DateKey,
    pub to: DateKey,
    pub person: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swapped_with: Option<Role>,
}

/// What a backend hands back on read, already normalized to domain types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSnapshot {
    /// Flat date -> role mapping (key-value stores, local persistence)
    Mapping(AssignmentMap),
    /// Swap records committed by earlier sessions, oldest first
    RecordList(Vec<SwapRecord>),
}
