//! Working hours service: stored documents and per-user resolution

use serde_json::Value;

use super::resolution;
use crate::{
    config::ScheduleConfig,
    error::{AppError, AppResult, ScheduleError},
    models::{
        availability::{BookingRequest, DayAvailability},
        time::CalendarDate,
        working_hours::{OverrideSet, ScheduleDocument, WeeklyTemplate},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct WorkingHoursService {
    repository: Repository,
    config: ScheduleConfig,
}

impl WorkingHoursService {
    pub fn new(repository: Repository, config: ScheduleConfig) -> Self {
        Self { repository, config }
    }

    /// Stored document, normalized, or `None` when the user never saved one
    async fn load_stored(&self, user_sub: &str) -> AppResult<Option<ScheduleDocument>> {
        let Some(raw) = self.repository.working_hours.get(user_sub).await? else {
            return Ok(None);
        };

        let normalized =
            ScheduleDocument::normalize_with_default_timezone(&raw, &self.config.default_timezone);
        for warning in &normalized.warnings {
            tracing::warn!(user = %user_sub, "Stored working hours normalized: {}", warning);
        }
        Ok(Some(normalized.document))
    }

    /// Current document, falling back to the default schedule
    pub async fn get_for_user(&self, user_sub: &str) -> AppResult<ScheduleDocument> {
        Ok(self
            .load_stored(user_sub)
            .await?
            .unwrap_or_else(|| ScheduleDocument::with_timezone(&self.config.default_timezone)))
    }

    /// Strictly parse and persist a document. Unknown timezones are rejected.
    ///
    /// Reversed ranges are saved as-is unless `reject_invalid_ranges` is set.
    pub async fn save_for_user(&self, user_sub: &str, raw: Value) -> AppResult<ScheduleDocument> {
        let document: ScheduleDocument = serde_json::from_value(raw)
            .map_err(|e| AppError::Validation(format!("Invalid working hours: {}", e)))?;
        document.tz()?;

        let range_errors = document.range_errors();
        if !range_errors.is_empty() {
            if self.config.reject_invalid_ranges {
                let messages: Vec<String> = range_errors.iter().map(ToString::to_string).collect();
                return Err(AppError::Validation(messages.join("; ")));
            }
            tracing::warn!(
                user = %user_sub,
                count = range_errors.len(),
                "Saving working hours with invalid ranges"
            );
        }

        self.repository.working_hours.upsert(user_sub, &document).await?;
        tracing::info!(user = %user_sub, overrides = document.overrides.len(), "Working hours saved");
        Ok(document)
    }

    /// The user's template and overrides; both empty when nothing is stored
    async fn resolution_inputs(&self, user_sub: &str) -> AppResult<(Option<WeeklyTemplate>, OverrideSet)> {
        Ok(match self.load_stored(user_sub).await? {
            Some(doc) => (Some(doc.weekly), doc.overrides),
            None => (None, OverrideSet::new()),
        })
    }

    pub async fn availability_for(&self, user_sub: &str, date: CalendarDate) -> AppResult<DayAvailability> {
        let (weekly, overrides) = self.resolution_inputs(user_sub).await?;
        Ok(resolution::resolve_with(
            weekly.as_ref(),
            &overrides,
            date,
            CalendarDate::weekday,
        ))
    }

    pub async fn calendar_for(
        &self,
        user_sub: &str,
        from: CalendarDate,
        to: CalendarDate,
    ) -> AppResult<Vec<DayAvailability>> {
        let (weekly, overrides) = self.resolution_inputs(user_sub).await?;
        Ok(resolution::resolve_range(weekly.as_ref(), &overrides, from, to)?)
    }

    /// Gate for new appointments
    pub async fn check_booking(&self, user_sub: &str, request: &BookingRequest) -> AppResult<DayAvailability> {
        let (weekly, overrides) = self.resolution_inputs(user_sub).await?;
        resolution::check_booking(weekly.as_ref(), &overrides, request).map_err(|e| {
            if let ScheduleError::OutsideWorkingHours { .. } = &e {
                tracing::debug!(user = %user_sub, "Booking rejected: {}", e);
            }
            AppError::from(e)
        })
    }
}
