//! Working hours documents, one JSONB row per user subject

use serde_json::Value;
use sqlx::{types::Json, Pool, Postgres};

use crate::{error::AppResult, models::working_hours::ScheduleDocument};

#[derive(Clone)]
pub struct WorkingHoursRepository {
    pool: Pool<Postgres>,
}

impl WorkingHoursRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Raw stored document for a user, if any. Left as JSON so readers can
    /// normalize whatever shape was persisted.
    pub async fn get(&self, user_sub: &str) -> AppResult<Option<Value>> {
        let row: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT document FROM working_hours WHERE user_sub = $1")
                .bind(user_sub)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(Json(document),)| document))
    }

    /// Insert or replace a user's document
    pub async fn upsert(&self, user_sub: &str, document: &ScheduleDocument) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO working_hours (user_sub, document)
            VALUES ($1, $2)
            ON CONFLICT (user_sub)
            DO UPDATE SET document = EXCLUDED.document, modif_date = NOW()
            "#,
        )
        .bind(user_sub)
        .bind(Json(document))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
