//! Data models for working hours

pub mod availability;
pub mod time;
pub mod user;
pub mod working_hours;

// Re-export commonly used types
pub use availability::{Availability, BookingRequest, ClosedReason, DayAvailability};
pub use time::{CalendarDate, TimeOfDay, WEEKDAY_NAMES};
pub use user::{Identity, UserClaims};
pub use working_hours::{
    DateOverride, DayRule, DayRulePatch, NormalizedSchedule, OverrideSet, ScheduleDocument,
    ValidationIssue, WeeklyTemplate,
};
