//! Time-of-day and calendar date value types

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScheduleError;

/// Weekday names, indexed Sunday (0) to Saturday (6)
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Weekdays in template order, Sunday first
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Index of a weekday in a weekly template (0 = Sunday)
pub fn weekday_index(weekday: Weekday) -> usize {
    weekday.num_days_from_sunday() as usize
}

// ---------------------------------------------------------------------------
// TimeOfDay
// ---------------------------------------------------------------------------

/// A wall-clock time without a date, stored as minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MINUTES_PER_DAY: u16 = 24 * 60;

    pub(crate) const fn hm(hour: u16, minute: u16) -> Self {
        assert!(hour < 24 && minute < 60);
        Self(hour * 60 + minute)
    }

    /// Build from a minute offset in `[0, 1440)`
    pub fn from_minutes(minutes: u16) -> Result<Self, ScheduleError> {
        if minutes >= Self::MINUTES_PER_DAY {
            return Err(ScheduleError::InvalidTimeFormat(format!("{} minutes", minutes)));
        }
        Ok(Self(minutes))
    }

    /// Build from hour and minute
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTimeFormat(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Parse a strict 24-hour `HH:MM` string
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidTimeFormat(s.to_string());

        let (hh, mm) = s.split_once(':').ok_or_else(invalid)?;
        let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !two_digits(hh) || !two_digits(mm) {
            return Err(invalid());
        }

        let hour: u16 = hh.parse().map_err(|_| invalid())?;
        let minute: u16 = mm.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }

    pub fn to_minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn compare(self, other: TimeOfDay) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// Convert from a chrono time, truncating seconds
    pub fn from_naive_time(time: chrono::NaiveTime) -> Self {
        use chrono::Timelike;
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// CalendarDate
// ---------------------------------------------------------------------------

/// A timezone-naive calendar date, written canonically as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidDate(s.to_string());

        let bytes = s.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shaped {
            return Err(invalid());
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| invalid())
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, ScheduleError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| ScheduleError::InvalidDate(format!("{:04}-{:02}-{:02}", year, month, day)))
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    /// 0 = Sunday
    pub fn weekday_index(self) -> usize {
        weekday_index(self.weekday())
    }

    pub fn day_name(self) -> &'static str {
        WEEKDAY_NAMES[self.weekday_index()]
    }

    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Number of days from `self` to `other` (negative when `other` is earlier)
    pub fn days_until(self, other: CalendarDate) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        let t = TimeOfDay::parse("09:30").unwrap();
        assert_eq!(t.to_minutes(), 570);
        assert_eq!(t.to_string(), "09:30");
        assert_eq!(TimeOfDay::parse("00:00").unwrap().to_minutes(), 0);
        assert_eq!(TimeOfDay::parse("23:59").unwrap().to_minutes(), 1439);
    }

    #[test]
    fn test_parse_time_rejects_malformed() {
        for bad in ["24:00", "12:60", "9:30", "09:3", "09-30", "ab:cd", "", "09:30:00", "+9:30"] {
            assert_eq!(
                TimeOfDay::parse(bad),
                Err(ScheduleError::InvalidTimeFormat(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_compare_time() {
        let a = TimeOfDay::parse("08:00").unwrap();
        let b = TimeOfDay::parse("17:00").unwrap();
        assert_eq!(a.compare(b), Ordering::Less);
        assert_eq!(b.compare(a), Ordering::Greater);
        assert_eq!(a.compare(a), Ordering::Equal);
        assert!(TimeOfDay::from_minutes(1440).is_err());
    }

    #[test]
    fn test_time_serde_uses_string_form() {
        let t = TimeOfDay::from_hm(7, 5).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:05\"");
        let back: TimeOfDay = serde_json::from_str("\"07:05\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<TimeOfDay>("\"7:05\"").is_err());
    }

    #[test]
    fn test_parse_date_and_weekday() {
        let d = CalendarDate::parse("2024-07-01").unwrap();
        assert_eq!(d.weekday(), Weekday::Mon);
        assert_eq!(d.weekday_index(), 1);
        assert_eq!(d.day_name(), "Monday");
        assert_eq!(d.to_string(), "2024-07-01");
        assert_eq!(CalendarDate::parse("2024-07-07").unwrap().weekday_index(), 0);
    }

    #[test]
    fn test_parse_date_rejects_non_canonical() {
        for bad in ["2024-7-1", "2024-02-30", "20240701", "2024/07/01", "", "2024-07-01T00:00"] {
            assert!(CalendarDate::parse(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_date_order_is_chronological() {
        let a = CalendarDate::parse("2023-12-31").unwrap();
        let b = CalendarDate::parse("2024-01-01").unwrap();
        assert!(a < b);
        assert_eq!(a.succ(), Some(b));
        assert_eq!(a.days_until(b), 1);
    }
}
