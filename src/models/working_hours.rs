//! Working hours models (weekly template, date overrides, schedule document)

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::time::{weekday_index, CalendarDate, TimeOfDay, WEEKDAYS, WEEKDAY_NAMES};
use crate::error::ScheduleError;

pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

const BUSINESS_START: TimeOfDay = TimeOfDay::hm(9, 0);
const BUSINESS_END: TimeOfDay = TimeOfDay::hm(17, 0);

fn default_enabled() -> bool {
    true
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

// ---------------------------------------------------------------------------
// DayRule
// ---------------------------------------------------------------------------

/// Availability rule for one day. A disabled rule keeps its times so the day
/// can be re-enabled without entering them again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRule {
    pub enabled: bool,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DayRule {
    pub fn open(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { enabled: true, start, end }
    }

    /// Disabled rule carrying the business-hours times
    pub fn closed() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// A disabled rule is always valid; an enabled one needs `start < end`
    pub fn is_valid_range(&self) -> bool {
        !self.enabled || self.start < self.end
    }

    /// Merge a partial edit onto this rule
    pub fn apply(self, patch: &DayRulePatch) -> Self {
        Self {
            enabled: patch.enabled.unwrap_or(self.enabled),
            start: patch.start.unwrap_or(self.start),
            end: patch.end.unwrap_or(self.end),
        }
    }
}

impl Default for DayRule {
    /// Enabled 09:00-17:00
    fn default() -> Self {
        Self::open(BUSINESS_START, BUSINESS_END)
    }
}

/// Partial edit of a day rule; unset fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct DayRulePatch {
    pub enabled: Option<bool>,
    #[schema(value_type = Option<String>, example = "09:00")]
    pub start: Option<TimeOfDay>,
    #[schema(value_type = Option<String>, example = "17:00")]
    pub end: Option<TimeOfDay>,
}

impl DayRulePatch {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn start(start: TimeOfDay) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn end(end: TimeOfDay) -> Self {
        Self {
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn window(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// WeeklyTemplate
// ---------------------------------------------------------------------------

/// Wire form of one weekly entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeeklyDayRecord {
    /// Weekday name (Sunday..Saturday); must match the entry position when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    pub enabled: bool,
    /// Start time (HH:MM)
    #[schema(value_type = String, example = "09:00")]
    pub start: TimeOfDay,
    /// End time (HH:MM)
    #[schema(value_type = String, example = "17:00")]
    pub end: TimeOfDay,
}

/// The recurring schedule: exactly one rule per weekday, Sunday first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WeeklyDayRecord>", into = "Vec<WeeklyDayRecord>")]
pub struct WeeklyTemplate {
    days: [DayRule; 7],
}

impl Default for WeeklyTemplate {
    /// Monday to Friday 09:00-17:00, weekend off
    fn default() -> Self {
        let mut days = [DayRule::default(); 7];
        days[weekday_index(Weekday::Sun)] = DayRule::closed();
        days[weekday_index(Weekday::Sat)] = DayRule::closed();
        Self { days }
    }
}

impl WeeklyTemplate {
    pub fn from_days(days: [DayRule; 7]) -> Self {
        Self { days }
    }

    /// Template where every day is disabled
    pub fn all_closed() -> Self {
        Self {
            days: [DayRule::closed(); 7],
        }
    }

    /// Strictly interpret a raw weekly array
    pub fn from_raw(raw: &Value) -> Result<Self, ScheduleError> {
        serde_json::from_value(raw.clone())
            .map_err(|e| ScheduleError::MalformedSchedule(format!("weekly: {}", e)))
    }

    /// Interpret a raw weekly array, replacing it wholesale by the default
    /// template when any part of it is malformed
    pub fn normalize(raw: &Value) -> Self {
        Self::from_raw(raw).unwrap_or_default()
    }

    pub fn day_rule_for(&self, weekday: Weekday) -> &DayRule {
        &self.days[weekday_index(weekday)]
    }

    /// Copy of the template with one weekday's rule patched. Range validity
    /// is not enforced here.
    pub fn set_day(mut self, weekday: Weekday, patch: &DayRulePatch) -> Self {
        let idx = weekday_index(weekday);
        self.days[idx] = self.days[idx].apply(patch);
        self
    }

    /// Rules in template order with their weekday
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DayRule)> {
        WEEKDAYS.iter().copied().zip(self.days.iter())
    }
}

impl TryFrom<Vec<WeeklyDayRecord>> for WeeklyTemplate {
    type Error = ScheduleError;

    fn try_from(records: Vec<WeeklyDayRecord>) -> Result<Self, Self::Error> {
        if records.len() != 7 {
            return Err(ScheduleError::MalformedSchedule(format!(
                "weekly must contain 7 days, found {}",
                records.len()
            )));
        }

        let mut days = [DayRule::closed(); 7];
        for (idx, record) in records.into_iter().enumerate() {
            if let Some(name) = record.day.as_deref() {
                if name != WEEKDAY_NAMES[idx] {
                    return Err(ScheduleError::MalformedSchedule(format!(
                        "weekly entry {} is '{}', expected '{}'",
                        idx, name, WEEKDAY_NAMES[idx]
                    )));
                }
            }
            days[idx] = DayRule {
                enabled: record.enabled,
                start: record.start,
                end: record.end,
            };
        }

        Ok(Self { days })
    }
}

impl From<WeeklyTemplate> for Vec<WeeklyDayRecord> {
    fn from(template: WeeklyTemplate) -> Self {
        template
            .days
            .iter()
            .zip(WEEKDAY_NAMES)
            .map(|(rule, name)| WeeklyDayRecord {
                day: Some(name.to_string()),
                enabled: rule.enabled,
                start: rule.start,
                end: rule.end,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// DateOverride / OverrideSet
// ---------------------------------------------------------------------------

/// Wire form of one override; times may be omitted for a day off
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DateOverrideRecord {
    /// Date (YYYY-MM-DD)
    #[schema(value_type = String, example = "2024-07-04")]
    pub date: CalendarDate,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Start time (HH:MM), defaults to 09:00
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "09:00")]
    pub start: Option<TimeOfDay>,
    /// End time (HH:MM), defaults to 17:00
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "17:00")]
    pub end: Option<TimeOfDay>,
}

/// A single date's rule, superseding the weekly template for that date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DateOverrideRecord")]
pub struct DateOverride {
    pub date: CalendarDate,
    pub enabled: bool,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DateOverride {
    /// New override, enabled 09:00-17:00
    pub fn new(date: CalendarDate) -> Self {
        Self::with_rule(date, DayRule::default())
    }

    pub fn with_rule(date: CalendarDate, rule: DayRule) -> Self {
        Self {
            date,
            enabled: rule.enabled,
            start: rule.start,
            end: rule.end,
        }
    }

    pub fn rule(&self) -> DayRule {
        DayRule {
            enabled: self.enabled,
            start: self.start,
            end: self.end,
        }
    }

    pub fn apply(self, patch: &DayRulePatch) -> Self {
        Self::with_rule(self.date, self.rule().apply(patch))
    }
}

impl From<DateOverrideRecord> for DateOverride {
    fn from(record: DateOverrideRecord) -> Self {
        Self {
            date: record.date,
            enabled: record.enabled,
            start: record.start.unwrap_or(BUSINESS_START),
            end: record.end.unwrap_or(BUSINESS_END),
        }
    }
}

/// Sparse date -> override mapping; at most one override per date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DateOverride>", into = "Vec<DateOverride>")]
pub struct OverrideSet {
    entries: BTreeMap<CalendarDate, DateOverride>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret a raw override array, dropping malformed entries one by one
    pub fn normalize(raw: &Value) -> Self {
        Self::normalize_reporting(raw).0
    }

    /// Like [`OverrideSet::normalize`], also returning why entries were dropped
    pub fn normalize_reporting(raw: &Value) -> (Self, Vec<ScheduleError>) {
        let mut set = Self::new();
        let mut dropped = Vec::new();

        let items: &[Value] = match raw {
            Value::Array(items) => items.as_slice(),
            Value::Null => &[],
            _ => {
                dropped.push(ScheduleError::MalformedSchedule(
                    "overrides must be an array".to_string(),
                ));
                &[]
            }
        };

        for (idx, item) in items.iter().enumerate() {
            match serde_json::from_value::<DateOverride>(item.clone()) {
                Ok(entry) if set.contains(entry.date) => {
                    dropped.push(ScheduleError::MalformedSchedule(format!(
                        "duplicate override for {}",
                        entry.date
                    )));
                }
                Ok(entry) => {
                    set.entries.insert(entry.date, entry);
                }
                Err(e) => dropped.push(ScheduleError::MalformedSchedule(format!(
                    "override {}: {}",
                    idx, e
                ))),
            }
        }

        (set, dropped)
    }

    pub fn get(&self, date: CalendarDate) -> Option<&DateOverride> {
        self.entries.get(&date)
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.entries.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a default override for `date`; unchanged if one already exists
    pub fn add(mut self, date: CalendarDate) -> Self {
        self.entries
            .entry(date)
            .or_insert_with(|| DateOverride::new(date));
        self
    }

    /// Insert a fully specified override, replacing any existing one
    pub fn insert(mut self, entry: DateOverride) -> Self {
        self.entries.insert(entry.date, entry);
        self
    }

    /// Patch the override at `date`; unchanged if there is none
    pub fn update(mut self, date: CalendarDate, patch: &DayRulePatch) -> Self {
        if let Some(entry) = self.entries.get_mut(&date) {
            *entry = entry.apply(patch);
        }
        self
    }

    pub fn remove(mut self, date: CalendarDate) -> Self {
        self.entries.remove(&date);
        self
    }

    /// Overrides in ascending date order
    pub fn sorted_by_date(&self) -> Vec<DateOverride> {
        self.entries.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateOverride> {
        self.entries.values()
    }
}

impl TryFrom<Vec<DateOverride>> for OverrideSet {
    type Error = ScheduleError;

    fn try_from(items: Vec<DateOverride>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for item in items {
            if entries.insert(item.date, item).is_some() {
                return Err(ScheduleError::MalformedSchedule(format!(
                    "duplicate override for {}",
                    item.date
                )));
            }
        }
        Ok(Self { entries })
    }
}

impl From<OverrideSet> for Vec<DateOverride> {
    fn from(set: OverrideSet) -> Self {
        set.entries.into_values().collect()
    }
}

// ---------------------------------------------------------------------------
// ScheduleDocument
// ---------------------------------------------------------------------------

/// The persisted working hours of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleDocument {
    /// IANA timezone the rules are expressed in
    #[serde(default = "default_timezone")]
    #[schema(example = "America/Los_Angeles")]
    pub timezone: String,
    #[schema(value_type = Vec<WeeklyDayRecord>)]
    pub weekly: WeeklyTemplate,
    #[serde(default)]
    #[schema(value_type = Vec<DateOverrideRecord>)]
    pub overrides: OverrideSet,
}

impl Default for ScheduleDocument {
    fn default() -> Self {
        Self::with_timezone(DEFAULT_TIMEZONE)
    }
}

/// Result of leniently reading a stored document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSchedule {
    pub document: ScheduleDocument,
    /// Non-fatal `MalformedSchedule` findings
    pub warnings: Vec<ScheduleError>,
}

/// A field-tied problem in a document, suitable for inline display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationIssue {
    /// Weekday name, override date, or `timezone`
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ScheduleDocument {
    /// Default template, no overrides, in the given zone
    pub fn with_timezone(timezone: &str) -> Self {
        Self {
            timezone: timezone.to_string(),
            weekly: WeeklyTemplate::default(),
            overrides: OverrideSet::new(),
        }
    }

    pub fn normalize(raw: &Value) -> NormalizedSchedule {
        Self::normalize_with_default_timezone(raw, DEFAULT_TIMEZONE)
    }

    /// Leniently read a stored document. The weekly template is replaced as a
    /// whole when malformed, bad overrides are dropped individually, and a
    /// missing timezone falls back to `default_timezone`.
    pub fn normalize_with_default_timezone(raw: &Value, default_timezone: &str) -> NormalizedSchedule {
        let mut warnings = Vec::new();

        let obj = match raw {
            Value::Object(obj) => obj,
            other => {
                if !other.is_null() {
                    warnings.push(ScheduleError::MalformedSchedule(
                        "document must be an object".to_string(),
                    ));
                }
                return NormalizedSchedule {
                    document: Self::with_timezone(default_timezone),
                    warnings,
                };
            }
        };

        let timezone = obj
            .get("timezone")
            .and_then(Value::as_str)
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or(default_timezone)
            .to_string();

        let weekly = match WeeklyTemplate::from_raw(obj.get("weekly").unwrap_or(&Value::Null)) {
            Ok(weekly) => weekly,
            Err(e) => {
                warnings.push(e);
                WeeklyTemplate::default()
            }
        };

        let (overrides, dropped) =
            OverrideSet::normalize_reporting(obj.get("overrides").unwrap_or(&Value::Null));
        warnings.extend(dropped);

        NormalizedSchedule {
            document: Self {
                timezone,
                weekly,
                overrides,
            },
            warnings,
        }
    }

    /// Every enabled rule whose end is not after its start
    pub fn range_errors(&self) -> Vec<ScheduleError> {
        let weekly = self
            .weekly
            .iter()
            .filter(|(_, rule)| !rule.is_valid_range())
            .map(|(weekday, _)| WEEKDAY_NAMES[weekday_index(weekday)].to_string());
        let overrides = self
            .overrides
            .iter()
            .filter(|o| !o.rule().is_valid_range())
            .map(|o| o.date.to_string());

        weekly
            .chain(overrides)
            .map(|field| ScheduleError::InvalidRange { field })
            .collect()
    }

    /// Field-tied issues for inline display; none of them block saving
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues: Vec<ValidationIssue> = self
            .range_errors()
            .into_iter()
            .filter_map(|e| match e {
                ScheduleError::InvalidRange { field } => Some(ValidationIssue {
                    field,
                    message: "End must be after start".to_string(),
                }),
                _ => None,
            })
            .collect();

        if self.tz().is_err() {
            issues.push(ValidationIssue {
                field: "timezone".to_string(),
                message: format!("Unknown timezone '{}'", self.timezone),
            });
        }

        issues
    }

    pub fn tz(&self) -> Result<Tz, ScheduleError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ScheduleError::InvalidTimezone(self.timezone.clone()))
    }

    /// Local calendar date and time of day of `instant` in this document's zone
    pub fn localize(&self, instant: DateTime<Utc>) -> Result<(CalendarDate, TimeOfDay), ScheduleError> {
        let local = instant.with_timezone(&self.tz()?);
        Ok((
            CalendarDate::from(local.date_naive()),
            TimeOfDay::from_naive_time(local.time()),
        ))
    }
}
