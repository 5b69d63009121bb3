//! Working hours resolution: weekly template + date overrides -> availability
//!
//! Everything here is pure. Callers pass explicit snapshots, so any number of
//! surfaces can resolve concurrently without coordination.

use chrono::Weekday;

use crate::{
    error::ScheduleError,
    models::{
        availability::{Availability, BookingRequest, ClosedReason, DayAvailability},
        time::CalendarDate,
        working_hours::{DayRule, OverrideSet, WeeklyTemplate},
    },
};

/// Longest span `resolve_range` accepts, in days
pub const MAX_RANGE_DAYS: i64 = 366;

fn rule_availability(rule: &DayRule, closed: ClosedReason) -> Availability {
    if !rule.enabled {
        Availability::closed(closed)
    } else if rule.start < rule.end {
        Availability::Open {
            start: rule.start,
            end: rule.end,
        }
    } else {
        Availability::closed(ClosedReason::InvalidRange)
    }
}

/// Resolve one date with an explicit weekday calculator.
///
/// Precedence:
/// 1. an override for the date wins outright, enabled or not;
/// 2. otherwise the weekly rule for the date's weekday applies;
/// 3. with no template and no overrides at all the schedule is reported as
///    not configured rather than closed for the day.
///
/// An enabled rule whose end is not after its start resolves to closed.
pub fn resolve_with<F>(
    template: Option<&WeeklyTemplate>,
    overrides: &OverrideSet,
    date: CalendarDate,
    weekday_of: F,
) -> DayAvailability
where
    F: Fn(CalendarDate) -> Weekday,
{
    if let Some(entry) = overrides.get(date) {
        return DayAvailability {
            date,
            availability: rule_availability(&entry.rule(), ClosedReason::OverrideClosed),
            overridden: true,
        };
    }

    let availability = match template {
        Some(template) => rule_availability(template.day_rule_for(weekday_of(date)), ClosedReason::DayOff),
        None if overrides.is_empty() => Availability::closed(ClosedReason::NotConfigured),
        None => Availability::closed(ClosedReason::NoWeeklyRule),
    };

    DayAvailability {
        date,
        availability,
        overridden: false,
    }
}

/// Resolve one date using the Gregorian weekday
pub fn resolve(
    template: Option<&WeeklyTemplate>,
    overrides: &OverrideSet,
    date: CalendarDate,
) -> Availability {
    resolve_with(template, overrides, date, CalendarDate::weekday).availability
}

/// Resolve a `YYYY-MM-DD` date key
pub fn resolve_str(
    template: Option<&WeeklyTemplate>,
    overrides: &OverrideSet,
    date: &str,
) -> Result<Availability, ScheduleError> {
    let date = CalendarDate::parse(date)?;
    Ok(resolve(template, overrides, date))
}

/// Resolve every date of the inclusive range `from..=to`
pub fn resolve_range(
    template: Option<&WeeklyTemplate>,
    overrides: &OverrideSet,
    from: CalendarDate,
    to: CalendarDate,
) -> Result<Vec<DayAvailability>, ScheduleError> {
    let span = from.days_until(to);
    if span < 0 {
        return Err(ScheduleError::InvalidDateRange(format!("{} is after {}", from, to)));
    }
    if span >= MAX_RANGE_DAYS {
        return Err(ScheduleError::InvalidDateRange(format!(
            "at most {} days can be resolved at once",
            MAX_RANGE_DAYS
        )));
    }

    let mut days = Vec::with_capacity(span as usize + 1);
    let mut current = Some(from);
    while let Some(date) = current.filter(|d| *d <= to) {
        days.push(resolve_with(template, overrides, date, CalendarDate::weekday));
        current = date.succ();
    }
    Ok(days)
}

/// Check that a proposed appointment falls inside the working window of its date
pub fn check_booking(
    template: Option<&WeeklyTemplate>,
    overrides: &OverrideSet,
    request: &BookingRequest,
) -> Result<DayAvailability, ScheduleError> {
    if request.start >= request.end {
        return Err(ScheduleError::InvalidRange {
            field: "appointment".to_string(),
        });
    }

    let day = resolve_with(template, overrides, request.date, CalendarDate::weekday);
    let outside = |reason: String| ScheduleError::OutsideWorkingHours {
        date: request.date.to_string(),
        reason,
    };

    match day.availability {
        Availability::Closed { reason } => Err(outside(reason.describe().to_string())),
        Availability::Open { start, end } if request.start < start || request.end > end => {
            Err(outside(format!("Working hours are {}-{}", start, end)))
        }
        Availability::Open { .. } => Ok(day),
    }
}
