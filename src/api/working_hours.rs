//! Working hours API endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        availability::{Availability, BookingRequest, ClosedReason, DayAvailability},
        time::CalendarDate,
        working_hours::ScheduleDocument,
    },
};

use super::AuthenticatedUser;

/// Query parameters for a single date
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    /// Date (YYYY-MM-DD)
    pub date: String,
}

/// Query parameters for a date range
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CalendarQuery {
    /// First date, inclusive (YYYY-MM-DD)
    pub from: String,
    /// Last date, inclusive (YYYY-MM-DD)
    pub to: String,
}

/// Effective working hours for one date
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Date (YYYY-MM-DD)
    pub date: String,
    /// Weekday name
    pub day: String,
    /// `open` or `closed`
    pub status: String,
    /// Start of the window (HH:MM) when open
    pub start: Option<String>,
    /// End of the window (HH:MM) when open
    pub end: Option<String>,
    /// Why the date is closed
    pub reason: Option<ClosedReason>,
    /// Human readable status
    pub message: String,
    /// Whether a date override decided the answer
    pub overridden: bool,
}

impl From<DayAvailability> for AvailabilityResponse {
    fn from(day: DayAvailability) -> Self {
        let (status, start, end, reason, message) = match day.availability {
            Availability::Open { start, end } => (
                "open",
                Some(start.to_string()),
                Some(end.to_string()),
                None,
                format!("Open {}-{}", start, end),
            ),
            Availability::Closed { reason } => {
                ("closed", None, None, Some(reason), reason.describe().to_string())
            }
        };

        Self {
            date: day.date.to_string(),
            day: day.date.day_name().to_string(),
            status: status.to_string(),
            start,
            end,
            reason,
            message,
            overridden: day.overridden,
        }
    }
}

/// Get my working hours
#[utoipa::path(
    get,
    path = "/working-hours/me",
    tag = "working-hours",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stored working hours, or the default schedule", body = ScheduleDocument)
    )
)]
pub async fn get_my_working_hours(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ScheduleDocument>> {
    let document = state.services.working_hours.get_for_user(&claims.sub).await?;
    Ok(Json(document))
}

/// Replace my working hours
#[utoipa::path(
    put,
    path = "/working-hours/me",
    tag = "working-hours",
    security(("bearer_auth" = [])),
    request_body = ScheduleDocument,
    responses(
        (status = 200, description = "Working hours saved", body = ScheduleDocument),
        (status = 400, description = "Malformed document")
    )
)]
pub async fn put_my_working_hours(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(payload): Json<Value>,
) -> AppResult<Json<ScheduleDocument>> {
    let document = state
        .services
        .working_hours
        .save_for_user(&claims.sub, payload)
        .await?;
    Ok(Json(document))
}

/// Resolve my availability for one date
#[utoipa::path(
    get,
    path = "/working-hours/me/availability",
    tag = "working-hours",
    security(("bearer_auth" = [])),
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Effective working hours", body = AvailabilityResponse),
        (status = 400, description = "Invalid date")
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let date = CalendarDate::parse(&query.date)?;
    let day = state
        .services
        .working_hours
        .availability_for(&claims.sub, date)
        .await?;
    Ok(Json(day.into()))
}

/// Resolve my availability for a range of dates
#[utoipa::path(
    get,
    path = "/working-hours/me/calendar",
    tag = "working-hours",
    security(("bearer_auth" = [])),
    params(CalendarQuery),
    responses(
        (status = 200, description = "Effective working hours per date", body = Vec<AvailabilityResponse>),
        (status = 400, description = "Invalid date or range")
    )
)]
pub async fn get_calendar(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<Vec<AvailabilityResponse>>> {
    let from = CalendarDate::parse(&query.from)?;
    let to = CalendarDate::parse(&query.to)?;
    let days = state
        .services
        .working_hours
        .calendar_for(&claims.sub, from, to)
        .await?;
    Ok(Json(days.into_iter().map(AvailabilityResponse::from).collect()))
}

/// Check whether an appointment fits my working hours
#[utoipa::path(
    post,
    path = "/working-hours/me/booking-check",
    tag = "working-hours",
    security(("bearer_auth" = [])),
    request_body = BookingRequest,
    responses(
        (status = 200, description = "Appointment fits", body = AvailabilityResponse),
        (status = 422, description = "Outside working hours")
    )
)]
pub async fn check_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BookingRequest>,
) -> AppResult<Json<AvailabilityResponse>> {
    let day = state
        .services
        .working_hours
        .check_booking(&claims.sub, &request)
        .await?;
    Ok(Json(day.into()))
}
