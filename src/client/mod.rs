//! Client side of the working hours API: the persistence boundary and the
//! in-memory draft store built on it

pub mod draft;
pub mod session;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, Response};
use serde_json::Value;

use crate::{config::ClientConfig, error::ScheduleError, models::working_hours::ScheduleDocument};

pub use draft::{DraftPhase, DraftStatus, DraftView, ExitGuard, LoadOutcome, ScheduleDraftStore};
pub use session::Session;

/// Remote persistence of the signed-in user's working hours
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleApi: Send + Sync {
    /// Current document as stored, in whatever shape the server returns
    async fn fetch_schedule(&self) -> Result<Value, ScheduleError>;

    /// Replace the stored document
    async fn put_schedule(&self, document: &ScheduleDocument) -> Result<(), ScheduleError>;
}

/// [`ScheduleApi`] over HTTP
#[derive(Clone)]
pub struct HttpScheduleApi {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpScheduleApi {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn from_config(config: &ClientConfig, session: Session) -> Self {
        Self::new(config.api_base.clone(), session)
    }

    fn url(&self) -> String {
        format!("{}/working-hours/me", self.base_url)
    }

    async fn check(response: Response) -> Result<Response, ScheduleError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: Option<Value> = response.json().await.ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string());
        Err(ScheduleError::PersistenceUnavailable(message))
    }
}

fn transport(e: reqwest::Error) -> ScheduleError {
    ScheduleError::PersistenceUnavailable(e.to_string())
}

#[async_trait]
impl ScheduleApi for HttpScheduleApi {
    async fn fetch_schedule(&self) -> Result<Value, ScheduleError> {
        let response = self
            .client
            .get(self.url())
            .header(AUTHORIZATION, self.session.bearer())
            .send()
            .await
            .map_err(transport)?;

        Self::check(response).await?.json().await.map_err(transport)
    }

    async fn put_schedule(&self, document: &ScheduleDocument) -> Result<(), ScheduleError> {
        let response = self
            .client
            .put(self.url())
            .header(AUTHORIZATION, self.session.bearer())
            .json(document)
            .send()
            .await
            .map_err(transport)?;

        Self::check(response).await?;
        Ok(())
    }
}
