//! Repository layer for database operations

pub mod working_hours;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub working_hours: working_hours::WorkingHoursRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            working_hours: working_hours::WorkingHoursRepository::new(pool.clone()),
            pool,
        }
    }
}
