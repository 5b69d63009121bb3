//! Business logic services

pub mod resolution;
pub mod working_hours;

use crate::{config::ScheduleConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub working_hours: working_hours::WorkingHoursService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, schedule_config: ScheduleConfig) -> Self {
        Self {
            working_hours: working_hours::WorkingHoursService::new(repository, schedule_config),
        }
    }
}
