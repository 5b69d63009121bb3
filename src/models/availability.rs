//! Resolved availability for a calendar date

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::time::{CalendarDate, TimeOfDay};

/// Why a date has no booking window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReason {
    /// A date override turns the day off
    OverrideClosed,
    /// The weekly rule for that weekday is disabled
    DayOff,
    /// No weekly template is available for the weekday
    NoWeeklyRule,
    /// The applicable rule is enabled but its end is not after its start
    InvalidRange,
    /// Neither a weekly template nor any override exists
    NotConfigured,
}

impl ClosedReason {
    pub fn describe(self) -> &'static str {
        match self {
            ClosedReason::OverrideClosed => "Closed on this date",
            ClosedReason::DayOff => "Day off",
            ClosedReason::NoWeeklyRule => "No weekly schedule for this day",
            ClosedReason::InvalidRange => "Working hours for this day are invalid",
            ClosedReason::NotConfigured => "Schedule not configured",
        }
    }
}

/// The effective answer for one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    Closed { reason: ClosedReason },
    Open { start: TimeOfDay, end: TimeOfDay },
}

impl Availability {
    pub fn closed(reason: ClosedReason) -> Self {
        Availability::Closed { reason }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Availability::Open { .. })
    }

    /// `(start, end)` when open
    pub fn window(&self) -> Option<(TimeOfDay, TimeOfDay)> {
        match *self {
            Availability::Open { start, end } => Some((start, end)),
            Availability::Closed { .. } => None,
        }
    }
}

/// One resolved day, as shown on calendar and day views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    pub date: CalendarDate,
    #[serde(flatten)]
    pub availability: Availability,
    /// Whether a date override decided the answer
    pub overridden: bool,
}

/// A proposed appointment in the schedule's local wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookingRequest {
    /// Date (YYYY-MM-DD)
    #[schema(value_type = String, example = "2024-07-01")]
    pub date: CalendarDate,
    /// Start time (HH:MM)
    #[schema(value_type = String, example = "10:00")]
    pub start: TimeOfDay,
    /// End time (HH:MM)
    #[schema(value_type = String, example = "10:30")]
    pub end: TimeOfDay,
}
